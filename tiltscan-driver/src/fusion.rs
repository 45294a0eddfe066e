use crate::angle::AngleState;
use crate::config::{FusionConfig, InvalidRangePolicy, ZProjection};
use crate::numeric::degree_to_radian;
use std::sync::Arc;
use tiltscan_data::{Point3, PointCloud, RangeScan};

/// Elevation of the scan plane in degrees for a raw actuator position.
///
/// `origin` is the raw position at which the scan plane is horizontal (90 degrees).
pub fn elevation_deg(raw: f64, origin: u16, raw_to_deg: f64) -> f64 {
    90. - (raw - f64::from(origin)) * raw_to_deg
}

/// Inverse of [`elevation_deg`]. The result is fractional.
pub fn raw_from_elevation(elevation_deg: f64, origin: u16, raw_to_deg: f64) -> f64 {
    f64::from(origin) + (90. - elevation_deg) / raw_to_deg
}

/// Projects one range sample. Both angles are in radians.
pub fn project(range: f64, azimuth: f64, elevation: f64, projection: ZProjection) -> Point3 {
    let (sin_az, cos_az) = azimuth.sin_cos();
    let (sin_el, cos_el) = elevation.sin_cos();
    let z = match projection {
        ZProjection::Spherical => range * cos_el,
        ZProjection::AzimuthScaled => range * cos_el * cos_az,
    };
    Point3::new(range * cos_az * sin_el, range * sin_az * sin_el, z)
}

/// Turns 2D scans into 3D clouds using the latest known actuator position.
pub struct ScanFuser {
    angle: Arc<AngleState>,
    config: FusionConfig,
}

impl ScanFuser {
    pub fn new(angle: Arc<AngleState>, config: FusionConfig) -> ScanFuser {
        ScanFuser { angle, config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn elevation_for(&self, raw: u16) -> f64 {
        let elevation = elevation_deg(
            f64::from(raw),
            self.config.origin_position,
            self.config.raw_to_deg,
        );
        if self.config.round_elevation {
            elevation.round()
        } else {
            elevation
        }
    }

    /// Builds a cloud from `scan` with the position cached right now.
    pub fn fuse(&self, scan: &RangeScan) -> PointCloud {
        self.fuse_at(scan, self.angle.load())
    }

    /// Builds a cloud from `scan` as if the actuator were at `raw`.
    pub fn fuse_at(&self, scan: &RangeScan, raw: u16) -> PointCloud {
        if scan.len() != self.config.samples_per_scan {
            log::warn!(
                "Expected {} samples per scan but received {}",
                self.config.samples_per_scan,
                scan.len()
            );
        }

        let elevation = self.elevation_for(raw);
        let elevation_rad = degree_to_radian(elevation);
        let points = scan
            .samples()
            .enumerate()
            .filter(|(_, sample)| match self.config.invalid_range_policy {
                InvalidRangePolicy::Propagate => true,
                InvalidRangePolicy::Skip => sample.is_valid(),
            })
            .map(|(i, sample)| {
                let azimuth = degree_to_radian(i as f64 * self.config.angle_increment_deg);
                project(sample.raw(), azimuth, elevation_rad, self.config.projection)
            })
            .collect();

        PointCloud {
            frame_id: self.config.frame_id.clone(),
            points,
            source_position: raw,
            elevation_deg: elevation,
        }
    }
}
