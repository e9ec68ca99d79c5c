//! Sensor descriptors as advertised to the host framework.
//!
//! The host only registers sensors of types it knows about. Sensors it has
//! no type for are registered under a supported type and then rewritten by an
//! explicit override step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Logical identity of a sensor slot on this device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SensorId {
    AirTemperature,
    Co2,
    Pressure,
}

/// What the host reports about one sensor slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    /// Multilevel sensor type code
    pub type_code: u8,
    /// Offset of the value within the report payload
    pub byte_offset: u8,
    /// Scale identifiers supported by the slot
    pub scales: Vec<u8>,
}

/// Multilevel sensor type: air temperature
pub const TYPE_AIR_TEMPERATURE: u8 = 0x01;

/// Multilevel sensor type: barometric pressure
pub const TYPE_BAROMETRIC_PRESSURE: u8 = 0x09;

/// Multilevel sensor type: CO2 level
pub const TYPE_CO2_LEVEL: u8 = 0x11;

/// Replacement descriptors keyed by sensor identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideTable {
    entries: BTreeMap<SensorId, SensorDescriptor>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: SensorId, descriptor: SensorDescriptor) -> Self {
        self.entries.insert(id, descriptor);
        self
    }

    pub fn get(&self, id: SensorId) -> Option<&SensorDescriptor> {
        self.entries.get(&id)
    }

    /// Overrides for the CO2 and pressure slots, both registered under a
    /// temperature type
    pub fn air_quality() -> Self {
        OverrideTable::new()
            .with(
                SensorId::Co2,
                SensorDescriptor {
                    type_code: TYPE_CO2_LEVEL,
                    byte_offset: 0,
                    // 0 = ppm
                    scales: vec![0],
                },
            )
            .with(
                SensorId::Pressure,
                SensorDescriptor {
                    type_code: TYPE_BAROMETRIC_PRESSURE,
                    byte_offset: 0,
                    // 0 = kPa, 1 = inches of mercury
                    scales: vec![0, 1],
                },
            )
    }
}

/// Sensors registered with the host, in registration order
#[derive(Debug, Default)]
pub struct SensorRegistry {
    slots: Vec<(SensorId, SensorDescriptor)>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generic registration under a host-supported descriptor
    pub fn register(&mut self, id: SensorId, descriptor: SensorDescriptor) -> usize {
        self.slots.push((id, descriptor));
        self.slots.len() - 1
    }

    /// Rewrite registered descriptors that have an override.
    /// Returns the number of slots changed.
    pub fn apply_overrides(&mut self, table: &OverrideTable) -> usize {
        let mut changed = 0;
        for (id, descriptor) in &mut self.slots {
            if let Some(replacement) = table.get(*id) {
                if descriptor != replacement {
                    *descriptor = replacement.clone();
                    changed += 1;
                }
            }
        }
        changed
    }

    pub fn descriptor(&self, id: SensorId) -> Option<&SensorDescriptor> {
        self.slots.iter().find(|(slot, _)| *slot == id).map(|(_, d)| d)
    }

    pub fn slots(&self) -> &[(SensorId, SensorDescriptor)] {
        &self.slots
    }
}
