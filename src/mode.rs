//! Baseline correction mode tracking.

use crate::error::SessionError;
use crate::session::ProtocolSession;
use crate::transport::Transport;
use crate::types::{CommandKind, ModeState};
use log::{debug, info};

/// Keeps the sensor's baseline correction in step with the desired setting.
///
/// The tracked state only changes after the sensor acknowledged a mode-set
/// command, so a failed exchange is retried on the next call.
#[derive(Debug, Default)]
pub struct ModeController {
    state: ModeState,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ModeState {
        self.state
    }

    /// Forget the tracked mode; the next `converge` always talks to the sensor
    pub fn reset(&mut self) {
        self.state = ModeState::Unknown;
    }

    pub async fn converge<T: Transport>(
        &mut self,
        session: &mut ProtocolSession<T>,
        desired: bool,
    ) -> Result<(), SessionError> {
        if self.state.matches(desired) {
            return Ok(());
        }

        let kind = CommandKind::baseline(desired);
        debug!("Baseline correction {:?} -> {}, sending {:?}", self.state, desired, kind);
        session.execute(kind).await?;

        self.state = ModeState::from(desired);
        info!("Baseline correction {}", if desired { "enabled" } else { "disabled" });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::transport::mock::SimulatedSensor;

    fn enables(session: &ProtocolSession<SimulatedSensor>) -> usize {
        session.transport().count(BASELINE_CMD, BASELINE_ON)
    }

    fn disables(session: &ProtocolSession<SimulatedSensor>) -> usize {
        session.transport().count(BASELINE_CMD, BASELINE_OFF)
    }

    #[tokio::test(start_paused = true)]
    async fn converges_only_when_desired_mode_changes() {
        let mut session = ProtocolSession::new(SimulatedSensor::new(400));
        let mut mode = ModeController::new();
        assert_eq!(mode.state(), ModeState::Unknown);

        mode.converge(&mut session, true).await.unwrap();
        assert_eq!((enables(&session), disables(&session)), (1, 0));
        assert_eq!(mode.state(), ModeState::Enabled);

        mode.converge(&mut session, true).await.unwrap();
        assert_eq!(session.transport().writes.len(), 1);

        mode.converge(&mut session, false).await.unwrap();
        assert_eq!((enables(&session), disables(&session)), (1, 1));
        assert_eq!(mode.state(), ModeState::Disabled);
        assert_eq!(session.transport().baseline, Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_state_converges_to_disabled_too() {
        let mut session = ProtocolSession::new(SimulatedSensor::new(400));
        let mut mode = ModeController::new();

        mode.converge(&mut session, false).await.unwrap();
        assert_eq!(disables(&session), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_exchange_keeps_prior_state() {
        let mut sensor = SimulatedSensor::new(400);
        sensor.silent.insert(BASELINE_CMD);
        let mut session = ProtocolSession::new(sensor);
        let mut mode = ModeController::new();

        let err = mode.converge(&mut session, true).await.unwrap_err();
        assert!(matches!(err, SessionError::NoResponse { .. }));
        assert_eq!(mode.state(), ModeState::Unknown);

        // retried on the next call
        session.transport_mut().silent.clear();
        mode.converge(&mut session, true).await.unwrap();
        assert_eq!(enables(&session), 2);
        assert_eq!(mode.state(), ModeState::Enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_forces_a_fresh_exchange() {
        let mut session = ProtocolSession::new(SimulatedSensor::new(400));
        let mut mode = ModeController::new();

        mode.converge(&mut session, true).await.unwrap();
        mode.reset();
        mode.converge(&mut session, true).await.unwrap();
        assert_eq!(enables(&session), 2);
    }
}
