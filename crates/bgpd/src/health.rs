//! Structured health reporting for daemon lifecycle events.

use std::sync::Arc;

use bgp_config::{Config, ControlEndpoint};

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the neighbor configuration is in memory.
    fn neighbors_loaded(&self, count: usize);

    /// Invoked when the control socket accepts connections.
    fn listener_ready(&self, endpoint: &ControlEndpoint);

    /// Invoked after the reactor loop returns.
    fn reactor_stopped(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn neighbors_loaded(&self, count: usize) {
        (**self).neighbors_loaded(count);
    }

    fn listener_ready(&self, endpoint: &ControlEndpoint) {
        (**self).listener_ready(endpoint);
    }

    fn reactor_stopped(&self) {
        (**self).reactor_stopped();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            socket = %config.daemon_socket(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            neighbor_file = config.neighbor_file().map(|path| path.as_str()),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn neighbors_loaded(&self, count: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "neighbors_loaded",
            count,
            "neighbor configuration loaded"
        );
    }

    fn listener_ready(&self, endpoint: &ControlEndpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            endpoint = %endpoint,
            "control channel ready"
        );
    }

    fn reactor_stopped(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "reactor_stopped",
            "reactor stopped"
        );
    }
}
