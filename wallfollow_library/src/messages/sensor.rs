use serde::{Deserialize, Serialize};

/// Planar laser scan
///
/// Beams sweep counter-clockwise from `angle_min`; the beam in the middle of
/// `ranges` points straight ahead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaserScan {
    pub angle_min: f32,       // rad
    pub angle_max: f32,       // rad
    pub angle_increment: f32, // rad between beams
    pub range_min: f32,       // m
    pub range_max: f32,       // m
    pub ranges: Vec<f32>,     // m, NaN or inf for no return
}

impl LaserScan {
    /// Index of the forward beam
    pub fn front_index(&self) -> usize {
        self.ranges.len() / 2
    }

    /// The forward beam as a range sample, `None` for a scan without beams
    pub fn front_sample(&self) -> Option<RangeSample> {
        self.ranges
            .get(self.front_index())
            .map(|&distance| RangeSample::new(distance, self.range_max))
    }

    /// Bearing of beam `index` relative to the sensor's forward axis
    pub fn angle_of(&self, index: usize) -> f32 {
        self.angle_min + index as f32 * self.angle_increment
    }
}

/// One forward range reading together with the sensor's validity limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSample {
    pub distance: f32,  // m, may be NaN or infinite
    pub max_valid: f32, // m
}

impl RangeSample {
    pub fn new(distance: f32, max_valid: f32) -> Self {
        Self {
            distance,
            max_valid,
        }
    }
}
