//! Structured logging for the route server.
//!
//! The configured filter is extended with per-target floors for the
//! scheduler and the dispatcher. Both emit a debug event for every task
//! step and command, so a broad `debug` filter would otherwise bury the
//! session events. A filter that names either target explicitly keeps
//! its own level for it.

use std::io::{self, IsTerminal};

use bgp_config::{Config, LogFormat};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Levels applied to chatty daemon targets unless the filter names them.
const TARGET_FLOORS: [(&str, &str); 2] = [
    (concat!(env!("CARGO_PKG_NAME"), "::scheduler"), "info"),
    (concat!(env!("CARGO_PKG_NAME"), "::dispatch"), "info"),
];

/// Marker that the daemon subscriber is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors raised while installing the daemon subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// `log_filter` is not a valid `EnvFilter` expression.
    #[error("invalid log filter '{filter}': {reason}")]
    Filter {
        /// Filter after the target floors were added.
        filter: String,
        /// Parser message.
        reason: String,
    },
    /// Another global subscriber won the race.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the daemon subscriber once per process.
///
/// Later calls return a fresh [`TelemetryHandle`] and leave the installed
/// subscriber alone, so a reloaded configuration cannot change the format.
///
/// # Errors
///
/// Returns a [`TelemetryError`] when the filter is invalid or another
/// subscriber is already installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| TelemetryHandle)
}

/// Directives for `configured` plus a floor for every unnamed chatty target.
fn filter_directives(configured: &str) -> Vec<String> {
    let mut directives: Vec<String> = configured
        .split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .map(str::to_owned)
        .collect();
    let named = |target: &str| {
        directives.iter().any(|directive| {
            directive
                .strip_prefix(target)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(['=', '[']))
        })
    };
    let floors: Vec<String> = TARGET_FLOORS
        .iter()
        .filter(|&&(target, _)| !named(target))
        .map(|&(target, level)| format!("{target}={level}"))
        .collect();
    directives.extend(floors);
    directives
}

fn daemon_filter(configured: &str) -> Result<EnvFilter, TelemetryError> {
    let filter = filter_directives(configured).join(",");
    EnvFilter::try_new(&filter).map_err(|error| TelemetryError::Filter {
        filter,
        reason: error.to_string(),
    })
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = daemon_filter(config.log_filter())?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn default_filter_gains_target_floors() {
        assert_eq!(
            filter_directives("info"),
            ["info", "bgpd::scheduler=info", "bgpd::dispatch=info"]
        );
    }

    #[rstest]
    #[case("debug,bgpd::scheduler=trace", &["debug", "bgpd::scheduler=trace", "bgpd::dispatch=info"])]
    #[case("bgpd::dispatch[command]=debug", &["bgpd::dispatch[command]=debug", "bgpd::scheduler=info"])]
    #[case("bgpd::scheduler", &["bgpd::scheduler", "bgpd::dispatch=info"])]
    fn named_targets_keep_their_level(#[case] configured: &str, #[case] expected: &[&str]) {
        assert_eq!(filter_directives(configured), expected);
    }

    #[test]
    fn longer_target_names_do_not_count_as_named() {
        let directives = filter_directives("bgpd::schedulers=warn");
        assert!(directives.contains(&"bgpd::scheduler=info".to_owned()));
    }

    #[test]
    fn blank_pieces_are_dropped() {
        assert_eq!(
            filter_directives(" warn , ,"),
            ["warn", "bgpd::scheduler=info", "bgpd::dispatch=info"]
        );
    }

    #[test]
    fn invalid_filter_reports_the_composed_expression() {
        let error = daemon_filter("bgpd=loud").expect_err("level is not valid");
        match error {
            TelemetryError::Filter { filter, .. } => {
                assert!(filter.starts_with("bgpd=loud,"));
            }
            TelemetryError::Subscriber(_) => panic!("unexpected subscriber error"),
        }
    }
}
