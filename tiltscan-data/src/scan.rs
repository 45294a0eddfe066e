#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One sweep of the 2D range sensor.
///
/// Sample `i` was taken at azimuth `i * angle_increment`, where the increment is a
/// property of the sensor setup rather than of the message.
#[derive(Clone, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangeScan {
    /// Measured distance per sample. Zero or non-finite values mean "no return".
    pub ranges: Vec<f64>,
}

/// A range sample classified at the input boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RangeSample {
    /// A usable distance.
    Valid(f64),
    /// The sensor reported no echo. The raw value is kept so it can be propagated.
    NoReturn(f64),
}

impl RangeSample {
    pub fn classify(raw: f64) -> RangeSample {
        if raw.is_finite() && raw > 0. {
            RangeSample::Valid(raw)
        } else {
            RangeSample::NoReturn(raw)
        }
    }

    /// The distance as received, whatever its validity.
    pub fn raw(&self) -> f64 {
        match *self {
            RangeSample::Valid(r) | RangeSample::NoReturn(r) => r,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, RangeSample::Valid(_))
    }
}

impl RangeScan {
    pub fn new(ranges: Vec<f64>) -> RangeScan {
        RangeScan { ranges }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = RangeSample> + '_ {
        self.ranges.iter().map(|r| RangeSample::classify(*r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(RangeSample::classify(1.5), RangeSample::Valid(1.5));
        assert_eq!(RangeSample::classify(0.), RangeSample::NoReturn(0.));
        assert_eq!(RangeSample::classify(-1.), RangeSample::NoReturn(-1.));
        assert!(!RangeSample::classify(f64::INFINITY).is_valid());
        assert!(RangeSample::classify(f64::NAN).raw().is_nan());
    }

    #[test]
    fn test_samples_keep_order() {
        let scan = RangeScan::new(vec![1., 0., 2.]);
        let valid: Vec<bool> = scan.samples().map(|s| s.is_valid()).collect();
        assert_eq!(valid, vec![true, false, true]);
        assert_eq!(scan.len(), 3);
    }
}
