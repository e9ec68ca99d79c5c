use crate::error::{ReadError, Result};
use crate::frame::decode_concentration;
use crate::mode::ModeController;
use crate::session::{ProtocolSession, SessionTiming};
use crate::transport::{SerialTransport, Transport};
use crate::types::*;
use chrono::Utc;
use log::{debug, warn};

/// Main NDIR CO2 sensor interface
pub struct Co2Sensor<T> {
    session: ProtocolSession<T>,
    mode: ModeController,
}

impl Co2Sensor<SerialTransport> {
    /// Open a sensor on a local serial port
    pub fn open(port_name: &str) -> Result<Self> {
        Ok(Self::new(SerialTransport::open(port_name)?))
    }

    /// List available serial ports
    pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
        SerialTransport::list_ports()
    }
}

impl<T: Transport> Co2Sensor<T> {
    /// Attach to a sensor. Anything already queued on the link is discarded.
    pub fn new(transport: T) -> Self {
        Self::with_timing(transport, SessionTiming::default())
    }

    pub fn with_timing(transport: T, timing: SessionTiming) -> Self {
        let mut session = ProtocolSession::with_timing(transport, timing);
        session.drain();
        Co2Sensor {
            session,
            mode: ModeController::new(),
        }
    }

    /// Re-attach: drain the link and forget the tracked baseline mode
    pub fn reinitialize(&mut self) {
        self.session.drain();
        self.mode.reset();
    }

    pub fn mode(&self) -> ModeState {
        self.mode.state()
    }

    pub fn transport(&self) -> &T {
        self.session.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.session.transport_mut()
    }

    /// Read the gas concentration.
    ///
    /// Baseline correction is brought in line with `desired_abc` first. A
    /// failure there is logged and the measurement still goes ahead.
    pub async fn read(&mut self, desired_abc: bool, precision: u8) -> std::result::Result<Reading, ReadError> {
        if let Err(e) = self.mode.converge(&mut self.session, desired_abc).await {
            warn!("Baseline correction update failed, measuring anyway: {}", e);
        }

        let frame = self
            .session
            .execute(CommandKind::MeasureConcentration)
            .await?;
        let ppm = decode_concentration(&frame);
        debug!("Concentration: {} ppm", ppm);

        Ok(Reading {
            ppm,
            precision,
            taken_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::error::SessionError;
    use crate::transport::mock::SimulatedSensor;

    #[tokio::test(start_paused = true)]
    async fn first_read_converges_then_measures() {
        let mut sensor = Co2Sensor::new(SimulatedSensor::new(656));
        let reading = sensor.read(true, 0).await.unwrap();

        assert_eq!(reading.ppm, 656);
        assert_eq!(reading.precision, 0);
        assert_eq!(sensor.mode(), ModeState::Enabled);
        assert_eq!(
            sensor.transport().writes,
            vec![BASELINE_ON_FRAME.to_vec(), MEASURE_FRAME.to_vec()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn later_reads_only_measure() {
        let mut sensor = Co2Sensor::new(SimulatedSensor::new(800));
        sensor.read(true, 0).await.unwrap();
        sensor.read(true, 0).await.unwrap();
        sensor.read(true, 0).await.unwrap();

        assert_eq!(sensor.transport().count(BASELINE_CMD, BASELINE_ON), 1);
        assert_eq!(sensor.transport().count(MEASURE_CMD, 0x00), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn config_change_toggles_mode_once() {
        let mut sensor = Co2Sensor::new(SimulatedSensor::new(800));
        sensor.read(true, 0).await.unwrap();
        sensor.read(false, 0).await.unwrap();
        sensor.read(false, 0).await.unwrap();

        assert_eq!(sensor.transport().count(BASELINE_CMD, BASELINE_OFF), 1);
        assert_eq!(sensor.transport().baseline, Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn mode_failure_does_not_block_measurement() {
        let mut transport = SimulatedSensor::new(512);
        transport.silent.insert(BASELINE_CMD);
        let mut sensor = Co2Sensor::new(transport);

        let reading = sensor.read(true, 0).await.unwrap();
        assert_eq!(reading.ppm, 512);
        assert_eq!(sensor.mode(), ModeState::Unknown);

        // convergence is retried on the next read
        sensor.transport_mut().silent.clear();
        sensor.read(true, 0).await.unwrap();
        assert_eq!(sensor.transport().count(BASELINE_CMD, BASELINE_ON), 2);
        assert_eq!(sensor.mode(), ModeState::Enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn measurement_failure_is_sensor_unavailable() {
        let mut transport = SimulatedSensor::new(512);
        transport.silent.insert(MEASURE_CMD);
        let mut sensor = Co2Sensor::new(transport);

        let err = sensor.read(true, 0).await.unwrap_err();
        assert!(matches!(
            err,
            ReadError::SensorUnavailable(SessionError::NoResponse { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn attach_drains_stale_input() {
        let mut transport = SimulatedSensor::new(400);
        transport.pending = vec![0xFF, 0x86, 0x01];
        let sensor = Co2Sensor::new(transport);

        assert!(sensor.transport().pending.is_empty());
        assert_eq!(sensor.transport().drains, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reinitialize_resets_tracked_mode() {
        let mut sensor = Co2Sensor::new(SimulatedSensor::new(400));
        sensor.read(false, 0).await.unwrap();
        assert_eq!(sensor.mode(), ModeState::Disabled);

        sensor.reinitialize();
        assert_eq!(sensor.mode(), ModeState::Unknown);

        sensor.read(false, 0).await.unwrap();
        assert_eq!(sensor.transport().count(BASELINE_CMD, BASELINE_OFF), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn precision_scales_packed_value() {
        let mut sensor = Co2Sensor::new(SimulatedSensor::new(656));
        let reading = sensor.read(true, 2).await.unwrap();
        assert_eq!(reading.ppm, 656);
        assert_eq!(reading.scaled_value(), 65600);
    }
}
