//! Startup configuration, loaded from TOML.
//!
//! Every field has a default matching the reference hardware (an MX-28 on
//! `/dev/ttyUSB1` sweeping between 200 and 500), so a config file only needs the
//! values that differ.

use crate::constants::{BROADCAST_ID, SUPPORTED_PROTOCOL_VERSION};
use crate::error::TiltScanError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tiltscan_data::{model_max_position, model_raw_to_degree, ServoModel};

/// Slowest accepted sweep tick.
pub const MAX_TICK_PERIOD: Duration = Duration::from_secs(3600);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltScanConfig {
    pub actuator: ActuatorConfig,
    pub sweep: SweepConfig,
    pub fusion: FusionConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Serial port name such as `/dev/ttyUSB0`.
    pub port: String,
    pub baud_rate: u32,
    pub id: u8,
    pub protocol_version: f32,
    pub model: ServoModel,
    /// Raw moving speed written once at startup.
    pub moving_speed: u16,
    /// Angle reported to the fuser until the first successful position read.
    pub initial_position: u16,
    pub release_torque_on_shutdown: bool,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        ActuatorConfig {
            port: String::from("/dev/ttyUSB1"),
            baud_rate: 1_000_000,
            id: 1,
            protocol_version: 1.0,
            model: ServoModel::Mx28,
            moving_speed: 100,
            initial_position: 0,
            release_torque_on_shutdown: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub min_position: u16,
    pub max_position: u16,
    /// The active setpoint flips once `|goal - present|` drops below this.
    pub settle_threshold: u16,
    pub tick_rate_hz: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            min_position: 200,
            max_position: 500,
            settle_threshold: 10,
            tick_rate_hz: 5.,
        }
    }
}

impl SweepConfig {
    /// Time between two ticks, capped at [`MAX_TICK_PERIOD`].
    pub fn period(&self) -> Duration {
        Duration::try_from_secs_f64(1. / self.tick_rate_hz)
            .map_or(MAX_TICK_PERIOD, |period| period.min(MAX_TICK_PERIOD))
    }
}

/// What to do with samples that carry no return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRangePolicy {
    /// Project the raw value anyway, so every sample yields a point.
    #[default]
    Propagate,
    /// Leave the sample out of the cloud.
    Skip,
}

/// How the vertical component is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZProjection {
    /// `z = r cos(elevation)`. Points keep their measured distance from the origin.
    #[default]
    Spherical,
    /// `z = r cos(elevation) cos(azimuth)`, as the first scanner firmware did.
    AzimuthScaled,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Expected number of samples per scan. Other lengths are processed with a warning.
    pub samples_per_scan: usize,
    pub angle_increment_deg: f64,
    /// Raw position at which the scan plane is horizontal (elevation 90 degrees).
    pub origin_position: u16,
    /// Degrees per raw count. Follows `actuator.model` when a config file leaves it out.
    pub raw_to_deg: f64,
    pub frame_id: String,
    pub invalid_range_policy: InvalidRangePolicy,
    pub projection: ZProjection,
    /// Round the elevation to whole degrees before projecting.
    pub round_elevation: bool,
}

impl Default for FusionConfig {
    fn default() -> Self {
        FusionConfig {
            samples_per_scan: 360,
            angle_increment_deg: 1.,
            origin_position: 330,
            raw_to_deg: 0.087890625,
            frame_id: String::from("base_link"),
            invalid_range_policy: InvalidRangePolicy::Propagate,
            projection: ZProjection::Spherical,
            round_elevation: false,
        }
    }
}

fn invalid(message: String) -> TiltScanError {
    TiltScanError::InvalidConfig(message)
}

impl TiltScanConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<TiltScanConfig, TiltScanError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| invalid(format!("cannot read {}: {}", path.display(), e)))?;
        TiltScanConfig::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<TiltScanConfig, TiltScanError> {
        let mut config: TiltScanConfig = toml::from_str(contents)?;
        let table: toml::Table = contents.parse()?;
        let has_raw_to_deg = table
            .get("fusion")
            .and_then(|fusion| fusion.get("raw_to_deg"))
            .is_some();
        if !has_raw_to_deg {
            config.fusion.raw_to_deg = model_raw_to_degree(config.actuator.model);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TiltScanError> {
        let actuator = &self.actuator;
        let sweep = &self.sweep;
        let fusion = &self.fusion;

        if actuator.protocol_version != SUPPORTED_PROTOCOL_VERSION {
            return Err(invalid(format!(
                "protocol version {} is not supported",
                actuator.protocol_version
            )));
        }
        if actuator.id == BROADCAST_ID {
            return Err(invalid(format!(
                "id {} is the broadcast id and never answers reads",
                BROADCAST_ID
            )));
        }
        let max_position = model_max_position(actuator.model);
        for setpoint in [sweep.min_position, sweep.max_position] {
            if setpoint > max_position {
                return Err(invalid(format!(
                    "setpoint {} exceeds {} for {:?}",
                    setpoint, max_position, actuator.model
                )));
            }
        }
        if sweep.min_position == sweep.max_position {
            return Err(invalid(String::from("sweep setpoints must differ")));
        }
        if sweep.settle_threshold == 0 {
            return Err(invalid(String::from("settle_threshold must be positive")));
        }
        let min_tick_rate_hz = 1. / MAX_TICK_PERIOD.as_secs_f64();
        if !(sweep.tick_rate_hz.is_finite() && sweep.tick_rate_hz >= min_tick_rate_hz) {
            return Err(invalid(format!(
                "tick_rate_hz must be at least {}, got {}",
                min_tick_rate_hz, sweep.tick_rate_hz
            )));
        }
        if !(fusion.raw_to_deg.is_finite() && fusion.raw_to_deg > 0.) {
            return Err(invalid(format!(
                "raw_to_deg must be positive, got {}",
                fusion.raw_to_deg
            )));
        }
        let model_raw_to_deg = model_raw_to_degree(actuator.model);
        if f64::abs(fusion.raw_to_deg - model_raw_to_deg) > 1e-12 {
            log::warn!(
                "raw_to_deg {} differs from {} for {:?}",
                fusion.raw_to_deg,
                model_raw_to_deg,
                actuator.model
            );
        }
        if !fusion.angle_increment_deg.is_finite() {
            return Err(invalid(String::from("angle_increment_deg must be finite")));
        }
        if fusion.frame_id.is_empty() {
            return Err(invalid(String::from("frame_id must not be empty")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_are_valid() {
        let config = TiltScanConfig::default();
        config.validate().unwrap();
        assert_eq!(config.sweep.period(), Duration::from_millis(200));
    }

    #[test]
    fn test_partial_toml() {
        let config = TiltScanConfig::from_toml(
            r#"
            [actuator]
            port = "/dev/ttyUSB0"
            model = "Ax12"

            [sweep]
            min_position = 100
            max_position = 900

            [fusion]
            invalid_range_policy = "skip"
            projection = "azimuth_scaled"
            "#,
        )
        .unwrap();
        assert_eq!(config.actuator.port, "/dev/ttyUSB0");
        assert_eq!(config.actuator.model, ServoModel::Ax12);
        assert_eq!(config.actuator.baud_rate, 1_000_000);
        assert_eq!(config.sweep.max_position, 900);
        assert_eq!(config.sweep.settle_threshold, 10);
        assert_eq!(config.fusion.invalid_range_policy, InvalidRangePolicy::Skip);
        assert_eq!(config.fusion.projection, ZProjection::AzimuthScaled);
        assert_eq!(config.fusion.frame_id, "base_link");
        assert!(f64::abs(config.fusion.raw_to_deg * 1024. - 300.) < 1e-12);
    }

    #[test]
    fn test_explicit_raw_to_deg_wins() {
        let config = TiltScanConfig::from_toml(
            r#"
            [actuator]
            model = "Ax12"
            [fusion]
            raw_to_deg = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(config.fusion.raw_to_deg, 0.1);

        let config = TiltScanConfig::from_toml("[sweep]\nmax_position = 600").unwrap();
        assert_eq!(config.fusion.raw_to_deg, 0.087890625);
    }

    #[test]
    fn test_rejects_broadcast_id() {
        let mut config = TiltScanConfig::default();
        config.actuator.id = BROADCAST_ID;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = TiltScanConfig::from_toml("[actuator]\nid = 254").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_tick_rate_bounds() {
        let mut config = TiltScanConfig::default();
        for rate in [1e-30, 1e-4, -5., f64::NAN, f64::INFINITY] {
            config.sweep.tick_rate_hz = rate;
            assert!(config.validate().is_err(), "accepted {rate} Hz");
            assert!(config.sweep.period() <= MAX_TICK_PERIOD);
        }

        config.sweep.tick_rate_hz = 1. / 3600.;
        config.validate().unwrap();
        assert!(config.sweep.period() <= MAX_TICK_PERIOD);

        config.sweep.tick_rate_hz = 1e-30;
        assert_eq!(config.sweep.period(), MAX_TICK_PERIOD);
    }

    #[test]
    fn test_setpoint_out_of_range() {
        let err = TiltScanConfig::from_toml(
            r#"
            [actuator]
            model = "Ax12"
            [sweep]
            max_position = 2000
            "#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = TiltScanConfig::default();
        config.sweep.tick_rate_hz = 0.;
        assert!(config.validate().is_err());

        let mut config = TiltScanConfig::default();
        config.sweep.max_position = config.sweep.min_position;
        assert!(config.validate().is_err());

        let mut config = TiltScanConfig::default();
        config.actuator.protocol_version = 2.0;
        assert!(config.validate().is_err());

        let mut config = TiltScanConfig::default();
        config.fusion.raw_to_deg = -1.;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error_kind() {
        let err = TiltScanConfig::from_toml("[sweep]\nmin_position = \"low\"").unwrap_err();
        assert!(matches!(err, TiltScanError::ConfigParseError(_)));
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
