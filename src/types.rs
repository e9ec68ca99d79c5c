use crate::constants::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A well-formed 9-byte protocol frame
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Wrap bytes without checking them. Use [`crate::frame::validate`] for
    /// anything read off the wire.
    pub(crate) const fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Frame(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Command byte of a response frame
    pub fn command(&self) -> u8 {
        self.0[1]
    }

    pub fn checksum_byte(&self) -> u8 {
        self.0[FRAME_LEN - 1]
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", hex(&self.0))
    }
}

/// Hex dump used for TX/RX logging
pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect::<Vec<_>>().join(" ")
}

/// Commands the driver can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    MeasureConcentration,
    EnableBaselineCorrection,
    DisableBaselineCorrection,
}

impl CommandKind {
    /// Command byte, echoed at offset 1 of the response
    pub fn op_code(&self) -> u8 {
        match self {
            CommandKind::MeasureConcentration => MEASURE_CMD,
            CommandKind::EnableBaselineCorrection | CommandKind::DisableBaselineCorrection => BASELINE_CMD,
        }
    }

    /// Mode-set command that moves the sensor to `enabled`
    pub fn baseline(enabled: bool) -> Self {
        if enabled {
            CommandKind::EnableBaselineCorrection
        } else {
            CommandKind::DisableBaselineCorrection
        }
    }
}

/// Locally tracked state of the sensor's baseline correction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeState {
    #[default]
    Unknown,
    Enabled,
    Disabled,
}

impl ModeState {
    pub fn matches(&self, desired: bool) -> bool {
        matches!(
            (self, desired),
            (ModeState::Enabled, true) | (ModeState::Disabled, false)
        )
    }
}

impl From<bool> for ModeState {
    fn from(enabled: bool) -> Self {
        if enabled {
            ModeState::Enabled
        } else {
            ModeState::Disabled
        }
    }
}

/// A single concentration reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Measured concentration in parts per million
    pub ppm: i32,
    /// Implied decimal digits of the packed value
    pub precision: u8,
    pub taken_at: DateTime<Utc>,
}

impl Reading {
    /// `ppm` scaled by 10^precision, the integer the host packs.
    /// Saturates rather than wrapping on absurd precisions.
    pub fn scaled_value(&self) -> i32 {
        10i32
            .checked_pow(self.precision as u32)
            .and_then(|factor| self.ppm.checked_mul(factor))
            .unwrap_or(if self.ppm < 0 { i32::MIN } else { i32::MAX })
    }
}
