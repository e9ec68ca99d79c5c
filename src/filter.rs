//! Calibration offset and plausibility bounds for raw sensor values.
//!
//! The offset is applied first, then the value is converted to reporting
//! units, then bounds are checked. Values outside the bounds are dropped,
//! never clamped.

use crate::config::ConfigProvider;
use crate::constants::*;

/// Add a calibration offset expressed in the raw value's units
pub fn apply(raw: i32, calibration_offset: i32) -> i32 {
    raw.saturating_add(calibration_offset)
}

/// Inclusive bounds check in reporting units
pub fn in_range(value: f64, min: f64, max: f64) -> bool {
    value >= min && value <= max
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdFilter {
    /// Offset in raw units
    pub offset: i32,
    pub min: f64,
    pub max: f64,
    /// Raw units per reporting unit
    pub divisor: f64,
}

impl ThresholdFilter {
    /// Temperature filter from the current configuration
    pub fn temperature(config: &impl ConfigProvider) -> Self {
        ThresholdFilter {
            offset: config.temperature_calibration_offset() as i32 * TEMPERATURE_RAW_PER_OFFSET_STEP,
            min: config.temperature_min() as f64,
            max: config.temperature_max() as f64,
            divisor: TEMPERATURE_RAW_PER_DEGREE as f64,
        }
    }

    /// Calibrated raw value, or `None` when it falls outside the bounds
    pub fn filter(&self, raw: i32) -> Option<i32> {
        let calibrated = apply(raw, self.offset);
        in_range(calibrated as f64 / self.divisor, self.min, self.max).then_some(calibrated)
    }
}
