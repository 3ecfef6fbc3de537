//! Built-in values applied when no configuration layer sets a field.

use std::time::Duration;

use camino::Utf8PathBuf;

#[cfg(unix)]
use dirs::runtime_dir;
#[cfg(unix)]
use libc::geteuid;

use crate::logging::LogFormat;
use crate::socket::ControlEndpoint;

/// Control port used where Unix domain sockets are unavailable.
pub const DEFAULT_CONTROL_PORT: u16 = 9179;

/// Default `EnvFilter` directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Milliseconds the reactor sleeps after an iteration that did no work.
pub const DEFAULT_REACTOR_IDLE_MS: u64 = 10;

/// Default `EnvFilter` directive.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned default filter for serde and the derive defaults.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default log output format.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default idle interval in milliseconds.
#[must_use]
pub const fn default_reactor_idle_ms() -> u64 {
    DEFAULT_REACTOR_IDLE_MS
}

/// Default idle interval of the reactor loop.
#[must_use]
pub const fn default_reactor_idle() -> Duration {
    Duration::from_millis(DEFAULT_REACTOR_IDLE_MS)
}

/// Control socket used when none is configured.
///
/// Unix hosts use `$XDG_RUNTIME_DIR/bgpd/bgpd.sock`, falling back to a
/// per-user directory below the system temporary directory.
#[must_use]
pub fn default_control_endpoint() -> ControlEndpoint {
    platform_control_endpoint()
}

#[cfg(unix)]
fn platform_control_endpoint() -> ControlEndpoint {
    let mut base = match runtime_dir().and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok()) {
        Some(dir) => dir,
        None => {
            let mut fallback = Utf8PathBuf::from_path_buf(std::env::temp_dir())
                .unwrap_or_else(|_| Utf8PathBuf::from("/tmp"));
            fallback.push(format!("bgpd-uid-{}", effective_uid()));
            fallback
        }
    };
    base.push("bgpd");
    ControlEndpoint::unix(base.join("bgpd.sock"))
}

#[cfg(unix)]
fn effective_uid() -> u32 {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { geteuid() }
}

#[cfg(not(unix))]
fn platform_control_endpoint() -> ControlEndpoint {
    ControlEndpoint::tcp("127.0.0.1", DEFAULT_CONTROL_PORT)
}
