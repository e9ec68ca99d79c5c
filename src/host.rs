//! Adapters between the drivers and the host sensor framework.
//!
//! The host asks each registered sensor for a result record holding a raw
//! big-endian payload, its precision and its byte width. A sensor that has
//! nothing trustworthy to report returns `None`; the host then skips the
//! report for this cycle.

use crate::config::ConfigProvider;
use crate::constants::*;
use crate::descriptor::{SensorDescriptor, SensorId, SensorRegistry, TYPE_AIR_TEMPERATURE};
use crate::filter::ThresholdFilter;
use crate::protocol::Co2Sensor;
use crate::transport::Transport;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Precision of packed CO2 values (whole ppm)
pub const CO2_PRECISION: u8 = 0;

/// Precision of packed temperature values (thousandths of a degree)
pub const TEMPERATURE_PRECISION: u8 = 3;

/// One value handed to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorResult {
    /// Big-endian value bytes
    pub raw: Vec<u8>,
    pub precision: u8,
    /// Byte width of `raw`
    pub size: u8,
}

impl SensorResult {
    /// Pack the low `size` bytes of `value`, big-endian
    pub fn pack(value: i32, precision: u8, size: u8) -> Self {
        let bytes = value.to_be_bytes();
        let width = (size as usize).clamp(1, bytes.len());
        SensorResult {
            raw: bytes[bytes.len() - width..].to_vec(),
            precision,
            size: width as u8,
        }
    }

    /// Sign-extended integer carried by `raw`
    pub fn value(&self) -> i32 {
        let fill = if self.raw.first().is_some_and(|b| b & 0x80 != 0) {
            0xFF
        } else {
            0x00
        };
        let mut bytes = [fill; 4];
        let start = 4 - self.raw.len().min(4);
        bytes[start..].copy_from_slice(&self.raw[self.raw.len() - (4 - start)..]);
        i32::from_be_bytes(bytes)
    }
}

/// A sensor slot as seen by the host framework
pub trait HostSensor {
    fn id(&self) -> SensorId;

    /// Called once when the slot is registered. Returns the descriptor to
    /// register under.
    fn init(&mut self) -> SensorDescriptor;

    /// Produce this cycle's value, reading configuration afresh
    fn read<C: ConfigProvider>(&mut self, config: &C) -> impl Future<Output = Option<SensorResult>>;
}

/// Run a sensor's init callback and register it
pub fn register<S: HostSensor>(registry: &mut SensorRegistry, sensor: &mut S) -> usize {
    let descriptor = sensor.init();
    registry.register(sensor.id(), descriptor)
}

/// Descriptor of a host-supported type the CO2 slot is registered under
/// before its override is applied
fn generic_descriptor() -> SensorDescriptor {
    SensorDescriptor {
        type_code: TYPE_AIR_TEMPERATURE,
        byte_offset: 0,
        scales: vec![0, 1],
    }
}

/// CO2 concentration slot
pub struct Co2HostSensor<T> {
    sensor: Co2Sensor<T>,
}

impl<T: Transport> Co2HostSensor<T> {
    pub fn new(sensor: Co2Sensor<T>) -> Self {
        Co2HostSensor { sensor }
    }

    pub fn sensor(&self) -> &Co2Sensor<T> {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut Co2Sensor<T> {
        &mut self.sensor
    }
}

impl<T: Transport> HostSensor for Co2HostSensor<T> {
    fn id(&self) -> SensorId {
        SensorId::Co2
    }

    fn init(&mut self) -> SensorDescriptor {
        self.sensor.reinitialize();
        generic_descriptor()
    }

    async fn read<C: ConfigProvider>(&mut self, config: &C) -> Option<SensorResult> {
        match self
            .sensor
            .read(config.baseline_correction_enabled(), CO2_PRECISION)
            .await
        {
            Ok(reading) => Some(SensorResult::pack(
                reading.scaled_value(),
                reading.precision,
                CONCENTRATION_WIDTH,
            )),
            Err(e) => {
                warn!("No CO2 value this cycle: {}", e);
                None
            }
        }
    }
}

/// Source of raw temperature samples in thousandths of a degree
pub trait TemperatureSource {
    fn read_raw(&mut self) -> Option<i32>;
}

/// Calibrated and bounds-checked temperature slot
pub struct TemperatureHostSensor<S> {
    source: S,
}

impl<S: TemperatureSource> TemperatureHostSensor<S> {
    pub fn new(source: S) -> Self {
        TemperatureHostSensor { source }
    }
}

impl<S: TemperatureSource> HostSensor for TemperatureHostSensor<S> {
    fn id(&self) -> SensorId {
        SensorId::AirTemperature
    }

    fn init(&mut self) -> SensorDescriptor {
        generic_descriptor()
    }

    async fn read<C: ConfigProvider>(&mut self, config: &C) -> Option<SensorResult> {
        let raw = self.source.read_raw()?;
        let filter = ThresholdFilter::temperature(config);
        match filter.filter(raw) {
            Some(calibrated) => Some(SensorResult::pack(
                calibrated,
                TEMPERATURE_PRECISION,
                TEMPERATURE_WIDTH,
            )),
            None => {
                debug!(
                    "Discarding temperature {} outside [{}, {}]",
                    raw, filter.min, filter.max
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::descriptor::{OverrideTable, TYPE_CO2_LEVEL};
    use crate::transport::mock::SimulatedSensor;

    struct Fixed(Option<i32>);

    impl TemperatureSource for Fixed {
        fn read_raw(&mut self) -> Option<i32> {
            self.0
        }
    }

    #[test]
    fn packs_big_endian_four_bytes() {
        let result = SensorResult::pack(656, 0, 4);
        assert_eq!(result.raw, vec![0x00, 0x00, 0x02, 0x90]);
        assert_eq!(result.size, 4);
        assert_eq!(result.value(), 656);
    }

    #[test]
    fn narrow_packing_keeps_sign() {
        let result = SensorResult::pack(-250, 1, 2);
        assert_eq!(result.raw, vec![0xFF, 0x06]);
        assert_eq!(result.value(), -250);
    }

    #[tokio::test(start_paused = true)]
    async fn co2_slot_reports_ppm() {
        let mut slot = Co2HostSensor::new(Co2Sensor::new(SimulatedSensor::new(656)));
        let result = slot.read(&Settings::default()).await.unwrap();

        assert_eq!(result, SensorResult::pack(656, 0, 4));
        assert_eq!(slot.sensor().transport().baseline, Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn co2_slot_follows_configured_baseline_mode() {
        let mut slot = Co2HostSensor::new(Co2Sensor::new(SimulatedSensor::new(700)));
        let mut settings = Settings::default();

        slot.read(&settings).await.unwrap();
        settings.baseline_correction = Some(false);
        slot.read(&settings).await.unwrap();

        assert_eq!(slot.sensor().transport().baseline, Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn co2_slot_reports_nothing_on_failure() {
        let mut transport = SimulatedSensor::new(700);
        transport.silent.insert(MEASURE_CMD);
        let mut slot = Co2HostSensor::new(Co2Sensor::new(transport));

        assert_eq!(slot.read(&Settings::default()).await, None);
    }

    #[test]
    fn co2_slot_registers_as_co2_after_override() {
        let mut registry = SensorRegistry::new();
        let mut slot = Co2HostSensor::new(Co2Sensor::new(SimulatedSensor::new(400)));
        register(&mut registry, &mut slot);

        assert_eq!(
            registry.descriptor(SensorId::Co2).unwrap().type_code,
            TYPE_AIR_TEMPERATURE
        );
        registry.apply_overrides(&OverrideTable::air_quality());
        assert_eq!(
            registry.descriptor(SensorId::Co2).unwrap().type_code,
            TYPE_CO2_LEVEL
        );
    }

    #[tokio::test]
    async fn temperature_slot_reports_calibrated_value() {
        let settings = Settings {
            temperature_calibration_offset: Some(50),
            temperature_min: Some(-30),
            temperature_max: Some(60),
            ..Default::default()
        };
        let mut slot = TemperatureHostSensor::new(Fixed(Some(21000)));
        let result = slot.read(&settings).await.unwrap();

        assert_eq!(result.value(), 21500);
        assert_eq!(result.precision, TEMPERATURE_PRECISION);
    }

    #[tokio::test]
    async fn temperature_slot_discards_with_shipped_defaults() {
        // Suspected defect: default bounds [-30, -30] reject every reading.
        let mut slot = TemperatureHostSensor::new(Fixed(Some(21000)));
        assert_eq!(slot.read(&Settings::default()).await, None);
    }

    #[tokio::test]
    async fn temperature_slot_without_sample_reports_nothing() {
        let mut slot = TemperatureHostSensor::new(Fixed(None));
        assert_eq!(slot.read(&Settings::default()).await, None);
    }
}
