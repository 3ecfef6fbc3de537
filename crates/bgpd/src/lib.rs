//! Control-channel core of the `bgpd` route server.
//!
//! The daemon keeps BGP sessions with its peers and exposes a line-oriented
//! control channel on a unix or TCP socket. Operators send commands such as
//! `show neighbor summary` or `teardown 10.0.0.1 6` and receive text lines
//! followed by a `done` or `error` marker.
//!
//! Everything runs on one thread. The [`Reactor`] interleaves socket I/O
//! with an [`scheduler::AsyncCommandScheduler`] that advances every
//! multi-line response by one line per iteration, so a large response never
//! stalls other clients. Commands are resolved through an explicit
//! [`dispatch::CommandRegistry`] and read session state through the
//! [`peers::SessionSnapshotProvider`] contract; rendering lives in
//! [`format`].
//!
//! Startup mirrors the usual layering: [`bootstrap_with`] loads the
//! [`bgp_config::Config`], installs structured telemetry, prepares the socket
//! directory and parses the neighbor file, reporting each stage through a
//! [`HealthReporter`].

mod bootstrap;
pub mod dispatch;
pub mod format;
mod health;
pub mod peers;
mod process;
mod reactor;
pub mod scheduler;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon, run_daemon_with,
};
pub use reactor::Reactor;
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{ConnectionStream, ListenerError, ServiceRegistry, SocketListener};

#[cfg(test)]
mod tests;
