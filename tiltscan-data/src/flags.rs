#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Error flags reported in the error byte of a status packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviceErrorFlag {
    /// Supply voltage is out of the configured range
    InputVoltage,
    /// Goal position is outside the CW/CCW angle limits
    AngleLimit,
    /// Internal temperature is above the limit
    Overheating,
    /// A command parameter is out of range
    Range,
    /// Checksum of the instruction packet is wrong
    Checksum,
    /// The load cannot be handled with the set torque
    Overload,
    /// Undefined instruction, or action without reg_write
    Instruction,
}
