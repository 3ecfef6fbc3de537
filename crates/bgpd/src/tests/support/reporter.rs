//! Test double for [`HealthReporter`] that records lifecycle events.

use std::sync::Mutex;

use bgp_config::{Config, ControlEndpoint};

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    NeighborsLoaded(usize),
    ListenerReady(ControlEndpoint),
    ReactorStopped,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn neighbors_loaded(&self, count: usize) {
        self.record(HealthEvent::NeighborsLoaded(count));
    }

    fn listener_ready(&self, endpoint: &ControlEndpoint) {
        self.record(HealthEvent::ListenerReady(endpoint.clone()));
    }

    fn reactor_stopped(&self) {
        self.record(HealthEvent::ReactorStopped);
    }
}
