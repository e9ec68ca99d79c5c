//! Single Reading Example
//!
//! This example takes one CO2 reading from a sensor on a serial port:
//! - Interactive serial port selection (or command-line argument)
//! - Baseline correction set from the command line (default on)
//! - Reading printed as JSON
//!
//! Usage:
//!   cargo run --example read_co2                        # Interactive mode
//!   cargo run --example read_co2 -- /dev/ttyUSB0        # Specify port
//!   cargo run --example read_co2 -- /dev/ttyUSB0 off    # Baseline correction off
//!
//! Set RUST_LOG environment variable to control logging:
//!   RUST_LOG=debug cargo run --example read_co2

use inquire::Select;
use log::{error, info};
use ndir_protocol::{Co2Sensor, Result};

/// Interactive serial port selection using inquire
fn select_port() -> Result<String> {
    let ports = Co2Sensor::list_ports()?;

    if ports.is_empty() {
        eprintln!("No serial ports found!");
        std::process::exit(1);
    }

    let port_names: Vec<String> = ports
        .iter()
        .map(|p| format!("{} - {:?}", p.port_name, p.port_type))
        .collect();

    let selection = Select::new("Select a serial port:", port_names)
        .prompt()
        .map_err(|e| std::io::Error::other(format!("Selection cancelled: {}", e)))?;

    // Extract just the port name (before " - ")
    Ok(selection
        .split(" - ")
        .next()
        .unwrap_or(&selection)
        .to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let port_name = match args.next() {
        Some(name) => name,
        None => select_port()?,
    };
    let baseline = !matches!(args.next().as_deref(), Some("off"));

    info!("Connecting to sensor on {}...", port_name);
    let mut sensor = Co2Sensor::open(&port_name)?;

    match sensor.read(baseline, 0).await {
        Ok(reading) => {
            info!("CO2: {} ppm (baseline correction {:?})", reading.ppm, sensor.mode());
            match serde_json::to_string_pretty(&reading) {
                Ok(json) => println!("{}", json),
                Err(e) => error!("Failed to serialize reading: {}", e),
            }
        }
        Err(e) => error!("No reading: {}", e),
    }

    Ok(())
}
