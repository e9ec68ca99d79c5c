//! Error types for NDIR protocol operations.

use thiserror::Error;

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, NdirError>;

/// A byte sequence that is not a well-formed frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Frame is not exactly 9 bytes long
    #[error("Wrong frame length: {len} bytes (expected 9)")]
    WrongLength {
        /// Length of the rejected byte sequence
        len: usize,
    },

    /// Trailing checksum byte does not match the computed one
    #[error("Checksum mismatch: computed {computed:#04x}, frame carries {received:#04x}")]
    ChecksumMismatch {
        /// Checksum computed over offsets 1..=7
        computed: u8,
        /// Checksum byte found at offset 8
        received: u8,
    },
}

/// One command/response exchange failed.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The transport rejected the outbound frame. Never retried.
    #[error("Write failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// No bytes arrived before the read budget ran out
    #[error("No response after {attempts} reads")]
    NoResponse {
        /// Number of non-blocking reads performed
        attempts: u8,
    },

    /// Bytes arrived but not a whole frame
    #[error("Malformed response length: {len} bytes (expected 9)")]
    MalformedLength {
        /// Number of bytes received
        len: usize,
    },

    /// A full frame arrived with a bad checksum
    #[error("Response checksum mismatch: computed {computed:#04x}, received {received:#04x}")]
    ChecksumMismatch {
        /// Checksum computed over offsets 1..=7
        computed: u8,
        /// Checksum byte found at offset 8
        received: u8,
    },

    /// A valid frame answered a different command (stale reply)
    #[error("Unexpected response to command {expected:#04x}: got {actual:#04x}")]
    UnexpectedCommand {
        /// Command byte that was sent
        expected: u8,
        /// Command byte echoed by the response
        actual: u8,
    },
}

impl From<FrameError> for SessionError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::WrongLength { len } => SessionError::MalformedLength { len },
            FrameError::ChecksumMismatch { computed, received } => {
                SessionError::ChecksumMismatch { computed, received }
            }
        }
    }
}

/// A measurement could not be obtained this cycle.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The measurement exchange failed
    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(#[from] SessionError),
}

/// Error types for driver setup and operation.
#[derive(Error, Debug)]
pub enum NdirError {
    /// Serial port communication error
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// A protocol exchange failed
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// A measurement could not be obtained
    #[error("Read error: {0}")]
    Read(#[from] ReadError),
}
