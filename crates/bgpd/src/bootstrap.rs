//! Daemon bootstrap orchestration.

use std::sync::Arc;

use bgp_config::{BgpConfiguration, Config, ConfigurationError, SocketPreparationError};
use ortho_config::OrthoError;
use thiserror::Error;

use crate::dispatch::{CommandDispatcher, CommandRegistry, DispatchError};
use crate::health::HealthReporter;
use crate::peers::PeerTable;
use crate::reactor::Reactor;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::SocketListener;

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a configuration resolved elsewhere.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Socket preparation failed.
    #[error("failed to prepare daemon socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: SocketPreparationError,
    },
    /// The neighbor configuration file was rejected.
    #[error("failed to load neighbor configuration: {source}")]
    Neighbors {
        /// Located parse or read error.
        #[source]
        source: ConfigurationError,
    },
    /// The command table could not be built.
    #[error("failed to register commands: {source}")]
    Commands {
        /// Registration error.
        #[source]
        source: DispatchError,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Daemon {
    config: Config,
    configuration: BgpConfiguration,
    registry: CommandRegistry,
    telemetry: TelemetryHandle,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Neighbor configuration; empty when no file is configured.
    #[must_use]
    pub fn configuration(&self) -> &BgpConfiguration {
        &self.configuration
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Builds the reactor serving `listener`, with one idle session per
    /// configured neighbor.
    #[must_use]
    pub fn into_reactor(self, listener: SocketListener) -> Reactor<PeerTable> {
        let peers = PeerTable::from_configuration(&self.configuration);
        Reactor::new(
            listener,
            CommandDispatcher::new(self.registry),
            peers,
            self.configuration,
            self.config.reactor_idle(),
        )
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// # Errors
///
/// Returns the first [`BootstrapError`] encountered; it is also passed to
/// the reporter.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    let result = bootstrap_steps(loader, reporter.as_ref());
    match &result {
        Ok(daemon) => reporter.bootstrap_succeeded(daemon.config()),
        Err(error) => reporter.bootstrap_failed(error),
    }
    result
}

fn bootstrap_steps(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
) -> Result<Daemon, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    config
        .daemon_socket()
        .prepare_filesystem()
        .map_err(|source| BootstrapError::Socket { source })?;

    let configuration = match config.neighbor_file() {
        Some(path) => {
            BgpConfiguration::load(path).map_err(|source| BootstrapError::Neighbors { source })?
        }
        None => BgpConfiguration::default(),
    };
    reporter.neighbors_loaded(configuration.neighbors().len());

    let registry =
        CommandRegistry::standard().map_err(|source| BootstrapError::Commands { source })?;

    Ok(Daemon {
        config,
        configuration,
        registry,
        telemetry,
    })
}
