//! # NDIR Protocol Library
//!
//! A Rust library for driving NDIR CO2 sensor modules over a half-duplex
//! serial link using the common 9-byte `0xFF`-prefixed command protocol.
//!
//! ## Features
//!
//! - Build and validate fixed-length checksummed frames
//! - Run one command/response exchange at a time with a settle delay and a
//!   bounded non-blocking read budget
//! - Keep the sensor's automatic baseline correction in step with configuration
//!   without re-sending the mode command on every read
//! - Calibrate and bounds-check temperature readings
//! - Pack values for a host sensor framework and poll them on a report interval
//!
//! ## Example
//!
//! ```no_run
//! use ndir_protocol::Co2Sensor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut sensor = Co2Sensor::open("/dev/ttyUSB0")?;
//!     let reading = sensor.read(true, 0).await?;
//!     println!("CO2: {} ppm", reading.ppm);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constants;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod frame;
pub mod host;
pub mod mode;
pub mod poller;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod types;

pub use config::{ConfigProvider, Settings};
pub use error::{FrameError, NdirError, ReadError, Result, SessionError};
pub use protocol::Co2Sensor;
pub use session::{ProtocolSession, SessionTiming};
pub use transport::{SerialTransport, Transport};
pub use types::*;
