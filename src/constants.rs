//! Protocol constants for NDIR sensor communication.
//!
//! This module defines the wire-level constants of the 9-byte command
//! protocol, the timing of a single exchange, serial port configuration and
//! the fallback values of every configuration parameter.

/// Length of every frame, in both directions
pub const FRAME_LEN: usize = 9;

/// Start marker at offset 0 of every frame
pub const START_BYTE: u8 = 0xFF;

/// Sensor address byte at offset 1 of outbound frames
pub const SENSOR_ADDRESS: u8 = 0x01;

/// Read gas concentration command
pub const MEASURE_CMD: u8 = 0x86;

/// Automatic baseline correction on/off command
pub const BASELINE_CMD: u8 = 0x79;

/// Argument of `BASELINE_CMD` that turns baseline correction on
pub const BASELINE_ON: u8 = 0xA0;

/// Argument of `BASELINE_CMD` that turns baseline correction off
pub const BASELINE_OFF: u8 = 0x00;

/// Outbound measurement frame (checksum pre-computed)
pub const MEASURE_FRAME: [u8; FRAME_LEN] = [0xFF, 0x01, 0x86, 0x00, 0x00, 0x00, 0x00, 0x00, 0x79];

/// Outbound frame enabling baseline correction (checksum pre-computed)
pub const BASELINE_ON_FRAME: [u8; FRAME_LEN] = [0xFF, 0x01, 0x79, 0xA0, 0x00, 0x00, 0x00, 0x00, 0xE6];

/// Outbound frame disabling baseline correction (checksum pre-computed)
pub const BASELINE_OFF_FRAME: [u8; FRAME_LEN] = [0xFF, 0x01, 0x79, 0x00, 0x00, 0x00, 0x00, 0x00, 0x86];

/// Baud rate (9600 bps)
pub const BAUD_RATE: u32 = 9600;

/// Blocking write timeout in milliseconds
pub const TIMEOUT_MS: u64 = 1000;

/// Delay between writing a command and polling for the reply
pub const SETTLE_INTERVAL_MS: u64 = 150;

/// Non-blocking reads allowed per exchange before giving up
pub const READS_PER_COMMAND: u8 = 3;

/// Size of the per-read receive buffer. Larger than a frame so oversized
/// replies are detected instead of truncated.
pub const RX_BUFFER_LEN: usize = 32;

/// Default report interval in seconds
pub const DEFAULT_REPORT_INTERVAL_S: u32 = 120;

/// Default temperature calibration offset, tenths of a degree
pub const DEFAULT_TEMPERATURE_OFFSET: i16 = 0;

/// Default lower temperature bound, whole degrees
pub const DEFAULT_TEMPERATURE_MIN: i32 = -30;

/// Default upper temperature bound, whole degrees.
///
/// Shipped equal to the lower bound, which discards every reading. Kept as
/// shipped; deployments are expected to configure a real upper bound.
pub const DEFAULT_TEMPERATURE_MAX: i32 = -30;

/// Baseline correction is on unless configured otherwise
pub const DEFAULT_BASELINE_CORRECTION: bool = true;

/// Raw temperature readings are thousandths of a degree
pub const TEMPERATURE_RAW_PER_DEGREE: i32 = 1000;

/// Raw temperature units per step of the configured calibration offset
pub const TEMPERATURE_RAW_PER_OFFSET_STEP: i32 = 10;

/// Byte width of a packed concentration value
pub const CONCENTRATION_WIDTH: u8 = 4;

/// Byte width of a packed temperature value
pub const TEMPERATURE_WIDTH: u8 = 4;
