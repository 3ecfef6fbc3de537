//! Configuration for the `bgpd` route server.
//!
//! Two layers live here. [`Config`] holds the daemon's own settings (control
//! socket, logging, reactor pacing) and is resolved by `ortho_config` from
//! defaults, an optional TOML file, `BGPD_*` environment variables and CLI
//! flags, in increasing order of precedence. [`BgpConfiguration`] is the
//! neighbor file named by [`Config::neighbor_file`]: `family` and `neighbor`
//! blocks validated against the implemented address family table.

mod defaults;
mod error;
mod family;
mod logging;
mod neighbor;
mod parser;
mod socket;
mod tokeniser;

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_CONTROL_PORT, DEFAULT_LOG_FILTER, DEFAULT_REACTOR_IDLE_MS, default_control_endpoint,
    default_log_filter, default_log_filter_string, default_log_format, default_reactor_idle,
    default_reactor_idle_ms,
};
pub use error::ConfigurationError;
pub use family::{Afi, Families, Family, FamilyDeclaration, FamilyError, Safi, UnknownFamilyToken};
pub use logging::{LogFormat, LogFormatParseError};
pub use neighbor::{DEFAULT_HOLD_TIME, NeighborConfig};
pub use parser::BgpConfiguration;
pub use socket::{ControlEndpoint, SocketParseError, SocketPreparationError};
pub use tokeniser::Location;

/// Daemon settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "BGPD")]
pub struct Config {
    /// Control channel endpoint.
    #[serde(default = "default_control_endpoint")]
    #[ortho_config(default = default_control_endpoint())]
    pub daemon_socket: ControlEndpoint,
    /// `tracing_subscriber::EnvFilter` directive.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Neighbor configuration file.
    #[serde(default)]
    pub neighbor_file: Option<Utf8PathBuf>,
    /// Reactor sleep after an iteration that did no work, in milliseconds.
    #[serde(default = "default_reactor_idle_ms")]
    #[ortho_config(default = default_reactor_idle_ms())]
    pub reactor_idle_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon_socket: default_control_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            neighbor_file: None,
            reactor_idle_ms: default_reactor_idle_ms(),
        }
    }
}

impl Config {
    /// Resolves the configuration from the process arguments, the
    /// environment and any configuration file.
    ///
    /// # Errors
    ///
    /// Returns the `ortho_config` error when a layer fails to parse or merge.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Resolves the configuration from `args` in place of the process
    /// arguments.
    ///
    /// # Errors
    ///
    /// Returns the `ortho_config` error when a layer fails to parse or merge.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Control channel endpoint.
    #[must_use]
    pub fn daemon_socket(&self) -> &ControlEndpoint {
        &self.daemon_socket
    }

    /// Log filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Neighbor configuration file, when one is configured.
    #[must_use]
    pub fn neighbor_file(&self) -> Option<&Utf8Path> {
        self.neighbor_file.as_deref()
    }

    /// Reactor idle interval.
    #[must_use]
    pub fn reactor_idle(&self) -> Duration {
        Duration::from_millis(self.reactor_idle_ms)
    }
}
