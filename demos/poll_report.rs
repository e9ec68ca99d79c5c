//! Report Polling Example
//!
//! This example runs the periodic reporting loop against a sensor:
//! - Registers the CO2 slot and applies the descriptor overrides
//! - Loads settings from an optional TOML file
//! - Prints every host record as it is produced
//!
//! Usage:
//!   cargo run --example poll_report -- /dev/ttyUSB0
//!   cargo run --example poll_report -- /dev/ttyUSB0 settings.toml
//!   cargo run --example poll_report -- sim                # No hardware
//!
//! Set RUST_LOG environment variable to control logging:
//!   RUST_LOG=debug cargo run --example poll_report -- sim

use log::info;
use ndir_protocol::descriptor::{OverrideTable, SensorRegistry};
use ndir_protocol::host::{register, Co2HostSensor};
use ndir_protocol::poller::{self, Report};
use ndir_protocol::transport::mock::SimulatedSensor;
use ndir_protocol::{Co2Sensor, ConfigProvider, Result, Settings, Transport};
use tokio::sync::mpsc;

async fn poll<T: Transport>(sensor: Co2Sensor<T>, settings: Settings) {
    let mut registry = SensorRegistry::new();
    let mut slot = Co2HostSensor::new(sensor);
    register(&mut registry, &mut slot);
    registry.apply_overrides(&OverrideTable::air_quality());
    for (id, descriptor) in registry.slots() {
        info!("Registered {:?} as {:?}", id, descriptor);
    }

    info!("Reporting every {} s", settings.report_interval());
    let (tx, mut rx) = mpsc::channel::<Report>(8);
    let printer = async move {
        while let Some(report) = rx.recv().await {
            println!(
                "{} {:?}: {} (precision {}, raw {:02X?})",
                report.timestamp.format("%Y-%m-%d %H:%M:%S"),
                report.sensor,
                report.result.value(),
                report.result.precision,
                report.result.raw
            );
        }
    };

    tokio::join!(poller::run(&mut slot, &settings, tx), printer);
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let port_name = args.next().unwrap_or_else(|| "sim".to_string());
    let settings = match args.next() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if port_name == "sim" {
        info!("Using simulated sensor");
        poll(Co2Sensor::new(SimulatedSensor::new(612)), settings).await;
    } else {
        info!("Connecting to sensor on {}...", port_name);
        poll(Co2Sensor::open(&port_name)?, settings).await;
    }

    Ok(())
}
