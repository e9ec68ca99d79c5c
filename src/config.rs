//! Configuration parameters consumed by the driver.
//!
//! Values are read through [`ConfigProvider`] on every use so a change in the
//! backing store takes effect on the next read.

use crate::constants::*;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Typed access to persisted settings, each with a fallback default
pub trait ConfigProvider {
    /// Seconds between scheduled reports
    fn report_interval(&self) -> u32;

    /// Temperature calibration offset, tenths of a degree
    fn temperature_calibration_offset(&self) -> i16;

    /// Lowest plausible temperature, whole degrees
    fn temperature_min(&self) -> i32;

    /// Highest plausible temperature, whole degrees
    fn temperature_max(&self) -> i32;

    /// Whether the sensor should run automatic baseline correction
    fn baseline_correction_enabled(&self) -> bool;
}

/// Settings store. Unset fields report their default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub report_interval: Option<u32>,
    pub temperature_calibration_offset: Option<i16>,
    pub temperature_min: Option<i32>,
    pub temperature_max: Option<i32>,
    pub baseline_correction: Option<bool>,
}

impl Settings {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

impl ConfigProvider for Settings {
    fn report_interval(&self) -> u32 {
        self.report_interval.unwrap_or(DEFAULT_REPORT_INTERVAL_S)
    }

    fn temperature_calibration_offset(&self) -> i16 {
        self.temperature_calibration_offset
            .unwrap_or(DEFAULT_TEMPERATURE_OFFSET)
    }

    fn temperature_min(&self) -> i32 {
        self.temperature_min.unwrap_or(DEFAULT_TEMPERATURE_MIN)
    }

    fn temperature_max(&self) -> i32 {
        self.temperature_max.unwrap_or(DEFAULT_TEMPERATURE_MAX)
    }

    fn baseline_correction_enabled(&self) -> bool {
        self.baseline_correction.unwrap_or(DEFAULT_BASELINE_CORRECTION)
    }
}
