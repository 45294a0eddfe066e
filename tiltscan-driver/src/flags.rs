use std::fmt;
use tiltscan_data::DeviceErrorFlag;

const FLAG_BITS: [(u8, DeviceErrorFlag); 7] = [
    (0x01, DeviceErrorFlag::InputVoltage),
    (0x02, DeviceErrorFlag::AngleLimit),
    (0x04, DeviceErrorFlag::Overheating),
    (0x08, DeviceErrorFlag::Range),
    (0x10, DeviceErrorFlag::Checksum),
    (0x20, DeviceErrorFlag::Overload),
    (0x40, DeviceErrorFlag::Instruction),
];

pub(crate) fn to_flags(value: u8) -> Vec<DeviceErrorFlag> {
    FLAG_BITS
        .iter()
        .filter(|(bit, _)| value & bit != 0)
        .map(|(_, flag)| *flag)
        .collect()
}

/// Raw error byte of a status packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceError(pub u8);

impl DeviceError {
    pub fn flags(&self) -> Vec<DeviceErrorFlag> {
        to_flags(self.0)
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#010b} {:?}", self.0, self.flags())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_flags() {
        assert!(to_flags(0x00).is_empty());
        assert_eq!(to_flags(0x20), vec![DeviceErrorFlag::Overload]);
        assert_eq!(
            to_flags(0x05),
            vec![DeviceErrorFlag::InputVoltage, DeviceErrorFlag::Overheating]
        );
        // Bit 7 is unused.
        assert!(to_flags(0x80).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            DeviceError(0x02).to_string(),
            "0b00000010 [AngleLimit]"
        );
    }
}
