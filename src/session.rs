//! One command/response exchange over an unreliable half-duplex link.

use crate::constants::*;
use crate::error::SessionError;
use crate::frame::{encode, validate};
use crate::transport::Transport;
use crate::types::{hex, CommandKind, Frame};
use log::{debug, warn};
use std::time::Duration;

/// Timing of a single exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    /// Wait between the write and the first read
    pub settle: Duration,
    /// Non-blocking reads allowed before `NoResponse`
    pub reads_per_command: u8,
}

impl Default for SessionTiming {
    fn default() -> Self {
        SessionTiming {
            settle: Duration::from_millis(SETTLE_INTERVAL_MS),
            reads_per_command: READS_PER_COMMAND,
        }
    }
}

/// Runs exchanges on an exclusively owned transport, one at a time
pub struct ProtocolSession<T> {
    transport: T,
    timing: SessionTiming,
    rx: [u8; RX_BUFFER_LEN],
}

impl<T: Transport> ProtocolSession<T> {
    pub fn new(transport: T) -> Self {
        Self::with_timing(transport, SessionTiming::default())
    }

    pub fn with_timing(transport: T, timing: SessionTiming) -> Self {
        ProtocolSession {
            transport,
            timing,
            rx: [0; RX_BUFFER_LEN],
        }
    }

    pub fn timing(&self) -> SessionTiming {
        self.timing
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Throw away whatever input is queued. Errors are logged, not returned:
    /// a failed drain only risks a stale reply, which validation catches.
    pub fn drain(&mut self) -> usize {
        match self.transport.drain() {
            Ok(0) => 0,
            Ok(dropped) => {
                warn!("Discarded {} stale bytes from the link", dropped);
                dropped
            }
            Err(e) => {
                warn!("Input drain failed: {}", e);
                0
            }
        }
    }

    /// Send `kind` and return its validated reply
    pub async fn execute(&mut self, kind: CommandKind) -> Result<Frame, SessionError> {
        self.drain();

        let request = encode(kind);
        debug!("Sending:  {}", hex(request.as_bytes()));
        self.transport
            .write_all(request.as_bytes())
            .map_err(SessionError::WriteFailed)?;

        tokio::time::sleep(self.timing.settle).await;

        let result = self.receive(kind);
        if matches!(
            result,
            Err(SessionError::NoResponse { .. }) | Err(SessionError::UnexpectedCommand { .. })
        ) {
            // A late or stale reply must not be read as the next exchange's answer
            self.drain();
        }
        result
    }

    fn receive(&mut self, kind: CommandKind) -> Result<Frame, SessionError> {
        let mut attempts = 0;
        let len = loop {
            if attempts == self.timing.reads_per_command {
                debug!("No reply to {:?} after {} reads", kind, attempts);
                return Err(SessionError::NoResponse { attempts });
            }
            attempts += 1;

            match self.transport.read_available(&mut self.rx) {
                Ok(0) => continue,
                Ok(len) => break len,
                Err(e) => debug!("Read attempt {} failed: {}", attempts, e),
            }
        };

        let bytes = &self.rx[..len];
        debug!("Received: {}", hex(bytes));

        if len != FRAME_LEN {
            return Err(SessionError::MalformedLength { len });
        }
        let frame = validate(bytes)?;

        if frame.command() != kind.op_code() {
            return Err(SessionError::UnexpectedCommand {
                expected: kind.op_code(),
                actual: frame.command(),
            });
        }

        Ok(frame)
    }
}
