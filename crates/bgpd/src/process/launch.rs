//! Supervises daemon launch sequencing.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Runs the daemon using the production collaborators.
///
/// # Errors
///
/// Returns a [`LaunchError`] when signal handlers, bootstrap or the control
/// socket fail. Errors after the reactor starts are handled in the loop.
pub fn run_daemon() -> Result<(), LaunchError> {
    let shutdown = SystemShutdownSignal::install()?;
    let reporter = Arc::new(StructuredHealthReporter::new());
    run_daemon_with(&SystemConfigLoader, reporter, &shutdown)
}

/// Runs the daemon with injected collaborators until `shutdown` fires.
///
/// # Errors
///
/// Returns a [`LaunchError`] when bootstrap or the control socket fail.
pub fn run_daemon_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    info!(target: PROCESS_TARGET, "starting daemon runtime");
    let daemon = bootstrap_with(loader, Arc::clone(&reporter))?;
    let listener = SocketListener::bind(daemon.config().daemon_socket())?;
    reporter.listener_ready(listener.endpoint());

    let mut reactor = daemon.into_reactor(listener);
    reactor.run(shutdown);
    drop(reactor);

    reporter.reactor_stopped();
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
