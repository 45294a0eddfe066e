#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Supported servo models.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ServoModel {
    /// MX-28 and friends: 4096 counts over 360 degrees.
    #[default]
    Mx28,
    /// AX-12: 1024 counts over 300 degrees.
    Ax12,
}

/// Largest raw position the model accepts.
pub fn model_max_position(model: ServoModel) -> u16 {
    match model {
        ServoModel::Mx28 => 4095,
        ServoModel::Ax12 => 1023,
    }
}

/// Degrees per raw position count.
pub fn model_raw_to_degree(model: ServoModel) -> f64 {
    match model {
        ServoModel::Mx28 => 360. / 4096.,
        ServoModel::Ax12 => 300. / 1024.,
    }
}
