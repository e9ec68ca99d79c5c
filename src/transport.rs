//! Byte-stream transport between the driver and the sensor.
//!
//! The driver only needs three primitives from the link: a blocking write, a
//! non-blocking read that returns whatever is queued right now, and a drain
//! that throws queued input away.

use crate::constants::*;
use crate::error::Result;
use serialport::{ClearBuffer, DataBits, Parity, SerialPort, StopBits};
use std::io::{self, Read, Write};
use std::time::Duration;

/// Duplex byte channel owned by one driver instance
pub trait Transport {
    /// Write every byte or fail
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Copy whatever input is queued into `buf` without waiting.
    /// `Ok(0)` means nothing has arrived yet.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Discard queued input, returning how many bytes were dropped
    fn drain(&mut self) -> io::Result<usize>;
}

/// Transport over a local UART
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open `port_name` at 9600 8N1
    pub fn open(port_name: &str) -> Result<Self> {
        let port = serialport::new(port_name, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(Duration::from_millis(TIMEOUT_MS))
            .open()?;

        Ok(SerialTransport { port })
    }

    /// List available serial ports
    pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
        Ok(serialport::available_ports()?)
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }

    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let queued = self.port.bytes_to_read()? as usize;
        if queued == 0 {
            return Ok(0);
        }
        let len = queued.min(buf.len());
        self.port.read(&mut buf[..len])
    }

    fn drain(&mut self) -> io::Result<usize> {
        let queued = self.port.bytes_to_read()? as usize;
        self.port.clear(ClearBuffer::Input)?;
        Ok(queued)
    }
}

/// In-memory transports for tests and demos without hardware.
pub mod mock {
    use super::Transport;
    use crate::constants::*;
    use crate::frame::{checksum, validate};
    use std::collections::{HashSet, VecDeque};
    use std::io;

    /// One scripted outcome of `read_available`
    #[derive(Debug, Clone)]
    pub enum ReadStep {
        Bytes(Vec<u8>),
        Empty,
        Fail(io::ErrorKind),
    }

    /// Plays back a fixed sequence of reads and records everything else.
    /// Once the script runs out every read returns zero bytes.
    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        pub script: VecDeque<ReadStep>,
        pub writes: Vec<Vec<u8>>,
        pub residual: Vec<u8>,
        pub fail_writes: bool,
        pub reads: usize,
        pub drains: usize,
    }

    impl ScriptedTransport {
        pub fn new(script: impl IntoIterator<Item = ReadStep>) -> Self {
            ScriptedTransport {
                script: script.into_iter().collect(),
                ..Default::default()
            }
        }

        /// Transport whose writes always fail
        pub fn broken() -> Self {
            ScriptedTransport {
                fail_writes: true,
                ..Default::default()
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "link down"));
            }
            self.writes.push(bytes.to_vec());
            Ok(())
        }

        fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            match self.script.pop_front() {
                Some(ReadStep::Bytes(bytes)) => {
                    let len = bytes.len().min(buf.len());
                    buf[..len].copy_from_slice(&bytes[..len]);
                    Ok(len)
                }
                Some(ReadStep::Fail(kind)) => Err(io::Error::from(kind)),
                Some(ReadStep::Empty) | None => Ok(0),
            }
        }

        fn drain(&mut self) -> io::Result<usize> {
            self.drains += 1;
            Ok(std::mem::take(&mut self.residual).len())
        }
    }

    /// Behaves like a healthy sensor: answers each valid command with a
    /// well-formed reply and remembers its baseline correction setting.
    #[derive(Debug)]
    pub struct SimulatedSensor {
        pub ppm: u16,
        pub baseline: Option<bool>,
        /// Command bytes the sensor ignores
        pub silent: HashSet<u8>,
        pub writes: Vec<Vec<u8>>,
        pub pending: Vec<u8>,
        pub reads: usize,
        pub drains: usize,
    }

    impl SimulatedSensor {
        pub fn new(ppm: u16) -> Self {
            SimulatedSensor {
                ppm,
                baseline: None,
                silent: HashSet::new(),
                writes: Vec::new(),
                pending: Vec::new(),
                reads: 0,
                drains: 0,
            }
        }

        /// Number of frames written with the given command byte and argument
        pub fn count(&self, command: u8, argument: u8) -> usize {
            self.writes
                .iter()
                .filter(|w| w.len() == FRAME_LEN && w[2] == command && w[3] == argument)
                .count()
        }

        fn reply(command: u8, payload: [u8; 6]) -> Vec<u8> {
            let mut bytes = vec![START_BYTE, command];
            bytes.extend_from_slice(&payload);
            bytes.push(0);
            bytes[FRAME_LEN - 1] = checksum(&bytes);
            bytes
        }
    }

    impl Transport for SimulatedSensor {
        fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
            self.writes.push(bytes.to_vec());
            let Ok(frame) = validate(bytes) else {
                return Ok(());
            };
            let command = frame.as_bytes()[2];
            if self.silent.contains(&command) {
                return Ok(());
            }
            match command {
                MEASURE_CMD => {
                    let [hi, lo] = self.ppm.to_be_bytes();
                    self.pending
                        .extend(Self::reply(MEASURE_CMD, [hi, lo, 0x41, 0x00, 0x00, 0x00]));
                }
                BASELINE_CMD => {
                    self.baseline = Some(frame.as_bytes()[3] == BASELINE_ON);
                    self.pending.extend(Self::reply(BASELINE_CMD, [0x01, 0, 0, 0, 0, 0]));
                }
                _ => {}
            }
            Ok(())
        }

        fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            let len = self.pending.len().min(buf.len());
            buf[..len].copy_from_slice(&self.pending[..len]);
            self.pending.drain(..len);
            Ok(len)
        }

        fn drain(&mut self) -> io::Result<usize> {
            self.drains += 1;
            Ok(std::mem::take(&mut self.pending).len())
        }
    }
}
