pub mod cloud;
pub mod flags;
pub mod scan;
pub mod servo_models;

pub use cloud::{Point3, PointCloud};
pub use flags::DeviceErrorFlag;
pub use scan::{RangeSample, RangeScan};
pub use servo_models::{model_max_position, model_raw_to_degree, ServoModel};
