//! Periodic reporting loop.
//!
//! Reads a sensor slot once per configured report interval and forwards every
//! value it produces. A cycle without a value is simply skipped; the next
//! cycle is the retry.

use crate::config::ConfigProvider;
use crate::descriptor::SensorId;
use crate::host::{HostSensor, SensorResult};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;

/// A value produced by one reporting cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub sensor: SensorId,
    pub result: SensorResult,
    pub timestamp: DateTime<Utc>,
}

/// Poll `sensor` until the receiving side of `reports` is dropped.
///
/// The interval is re-read from `config` after every cycle.
pub async fn run<S, C>(sensor: &mut S, config: &C, reports: mpsc::Sender<Report>)
where
    S: HostSensor,
    C: ConfigProvider,
{
    loop {
        match sensor.read(config).await {
            Some(result) => {
                let report = Report {
                    sensor: sensor.id(),
                    result,
                    timestamp: Utc::now(),
                };
                if reports.send(report).await.is_err() {
                    info!("Report receiver closed, stopping {:?} poller", sensor.id());
                    return;
                }
            }
            None => debug!("No {:?} value this cycle", sensor.id()),
        }

        if reports.is_closed() {
            info!("Report receiver closed, stopping {:?} poller", sensor.id());
            return;
        }

        let interval = Duration::from_secs(config.report_interval().max(1) as u64);
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::constants::*;
    use crate::host::Co2HostSensor;
    use crate::protocol::Co2Sensor;
    use crate::transport::mock::SimulatedSensor;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn reports_once_per_interval() {
        let mut slot = Co2HostSensor::new(Co2Sensor::new(SimulatedSensor::new(656)));
        let settings = Settings {
            report_interval: Some(30),
            ..Default::default()
        };
        let (tx, mut rx) = mpsc::channel(4);

        let collect = async move {
            let mut seen = Vec::new();
            while seen.len() < 3 {
                let report = rx.recv().await.unwrap();
                seen.push((Instant::now(), report));
            }
            seen
        };

        let ((), seen) = tokio::join!(run(&mut slot, &settings, tx), collect);

        assert!(seen.iter().all(|(_, r)| r.sensor == SensorId::Co2));
        assert!(seen.iter().all(|(_, r)| r.result.value() == 656));
        let gap = seen[1].0 - seen[0].0;
        assert!(gap >= Duration::from_secs(30));
        assert!(gap < Duration::from_secs(31));

        // one baseline exchange for the whole run
        assert_eq!(slot.sensor().transport().count(BASELINE_CMD, BASELINE_ON), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_cycles_are_skipped() {
        let mut transport = SimulatedSensor::new(656);
        transport.silent.insert(MEASURE_CMD);
        let mut slot = Co2HostSensor::new(Co2Sensor::new(transport));
        let settings = Settings {
            report_interval: Some(10),
            ..Default::default()
        };
        let (tx, mut rx) = mpsc::channel(4);

        let wait = async move {
            let got = tokio::time::timeout(Duration::from_secs(35), rx.recv()).await;
            drop(rx);
            got
        };
        let ((), got) = tokio::join!(run(&mut slot, &settings, tx), wait);

        assert!(got.is_err(), "no report expected while the sensor is silent");
        assert!(slot.sensor().transport().count(MEASURE_CMD, 0x00) >= 3);
    }
}
