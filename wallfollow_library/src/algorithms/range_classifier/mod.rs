//! Range Classifier
//!
//! Maps a single forward range reading to a zone relative to the stand-off
//! distance and the corner threshold.
//!
//! # Example
//!
//! ```rust
//! use wallfollow_library::algorithms::range_classifier::{RangeClassifier, Zone, ZoneBands};
//! use wallfollow_library::RangeSample;
//!
//! let classifier = RangeClassifier::new(ZoneBands {
//!     corner_threshold: 1.9,
//!     desired: 3.0,
//!     tolerance: 0.3,
//! });
//!
//! assert_eq!(classifier.classify(RangeSample::new(2.5, 10.0)), Ok(Zone::TooClose));
//! assert!(classifier.classify(RangeSample::new(f32::NAN, 10.0)).is_err());
//! ```

use crate::messages::RangeSample;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification bucket for a valid range reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// Obstacle ahead is closer than the corner threshold
    CornerThreat,
    /// Closer than the stand-off band
    TooClose,
    /// Farther than the stand-off band
    TooFar,
    /// Inside the stand-off band (bounds inclusive)
    OnTarget,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::CornerThreat => "corner threat",
            Zone::TooClose => "too close",
            Zone::TooFar => "too far",
            Zone::OnTarget => "on target",
        };
        f.write_str(name)
    }
}

/// Reading the sensor could not vouch for
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidSample {
    #[error("Out of range: NaN")]
    NotANumber,

    #[error("Out of range: {0}")]
    Infinite(f32),

    #[error("Out of range: {distance} exceeds sensor maximum {max_valid}")]
    BeyondMax { distance: f32, max_valid: f32 },

    #[error("Out of range: scan has no beams")]
    EmptyScan,
}

/// Distance thresholds, in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneBands {
    pub corner_threshold: f32,
    pub desired: f32,
    pub tolerance: f32,
}

/// Classify a distance. First match wins:
/// corner threat, too close, too far, on target.
pub fn classify(
    distance: f32,
    max_valid: f32,
    corner_threshold: f32,
    desired: f32,
    tolerance: f32,
) -> Result<Zone, InvalidSample> {
    if distance.is_nan() {
        return Err(InvalidSample::NotANumber);
    }
    if distance.is_infinite() {
        return Err(InvalidSample::Infinite(distance));
    }
    if distance > max_valid {
        return Err(InvalidSample::BeyondMax {
            distance,
            max_valid,
        });
    }

    let zone = if distance < corner_threshold {
        Zone::CornerThreat
    } else if distance < desired - tolerance {
        Zone::TooClose
    } else if distance > desired + tolerance {
        Zone::TooFar
    } else {
        Zone::OnTarget
    };
    Ok(zone)
}

/// Classifier bound to a fixed set of thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeClassifier {
    bands: ZoneBands,
}

impl RangeClassifier {
    pub fn new(bands: ZoneBands) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &ZoneBands {
        &self.bands
    }

    pub fn classify(&self, sample: RangeSample) -> Result<Zone, InvalidSample> {
        classify(
            sample.distance,
            sample.max_valid,
            self.bands.corner_threshold,
            self.bands.desired,
            self.bands.tolerance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: f32 = 10.0;

    fn classifier() -> RangeClassifier {
        RangeClassifier::new(ZoneBands {
            corner_threshold: 1.9,
            desired: 3.0,
            tolerance: 0.3,
        })
    }

    fn zone(distance: f32) -> Result<Zone, InvalidSample> {
        classifier().classify(RangeSample::new(distance, MAX))
    }

    #[test]
    fn test_each_zone() {
        assert_eq!(zone(1.5), Ok(Zone::CornerThreat));
        assert_eq!(zone(2.5), Ok(Zone::TooClose));
        assert_eq!(zone(3.5), Ok(Zone::TooFar));
        assert_eq!(zone(3.0), Ok(Zone::OnTarget));
    }

    #[test]
    fn test_corner_threshold_is_exclusive() {
        assert_eq!(zone(1.9), Ok(Zone::TooClose));
        assert_eq!(zone(1.899), Ok(Zone::CornerThreat));
    }

    #[test]
    fn test_band_edges_are_on_target() {
        let bands = *classifier().bands();
        assert_eq!(zone(bands.desired - bands.tolerance), Ok(Zone::OnTarget));
        assert_eq!(zone(bands.desired + bands.tolerance), Ok(Zone::OnTarget));
    }

    #[test]
    fn test_corner_takes_precedence_over_too_close() {
        // Corner threshold above the band: every close reading is a corner
        let result = classify(2.5, MAX, 2.8, 3.0, 0.3);
        assert_eq!(result, Ok(Zone::CornerThreat));
    }

    #[test]
    fn test_invalid_readings() {
        assert_eq!(zone(f32::NAN), Err(InvalidSample::NotANumber));
        assert_eq!(
            zone(f32::INFINITY),
            Err(InvalidSample::Infinite(f32::INFINITY))
        );
        assert_eq!(
            zone(f32::NEG_INFINITY),
            Err(InvalidSample::Infinite(f32::NEG_INFINITY))
        );
        assert_eq!(
            zone(10.5),
            Err(InvalidSample::BeyondMax {
                distance: 10.5,
                max_valid: MAX
            })
        );
    }

    #[test]
    fn test_max_range_itself_is_valid() {
        assert_eq!(zone(MAX), Ok(Zone::TooFar));
    }

    #[test]
    fn test_total_over_valid_domain() {
        let mut d = 0.0_f32;
        while d <= MAX {
            assert!(zone(d).is_ok(), "no zone for {}", d);
            d += 0.01;
        }
    }

    #[test]
    fn test_invalid_message_matches_log_text() {
        assert_eq!(InvalidSample::Infinite(f32::INFINITY).to_string(), "Out of range: inf");
    }
}
