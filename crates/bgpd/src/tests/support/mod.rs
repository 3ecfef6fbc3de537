//! Test harness utilities shared by unit and behavioural suites.

pub mod capture;
mod config_loader;
mod reporter;
mod sessions;
pub mod sink;
pub mod snapshots;
mod world;

pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::CommandWorld;

/// Removes the quotes `rstest-bdd` leaves around quoted placeholders.
pub fn strip_quotes(value: &str) -> &str {
    value.trim_matches('"')
}
