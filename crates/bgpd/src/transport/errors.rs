//! Failures binding the control channel listener.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Reasons the control channel could not start listening.
///
/// Every variant names the endpoint as configured so the operator can match
/// the message against `daemon_socket`.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The control host did not resolve.
    #[error("control host {host}:{port} did not resolve: {source}")]
    Resolve {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
        /// Resolver failure.
        #[source]
        source: io::Error,
    },
    /// The control host resolved to no addresses.
    #[error("control host {host}:{port} resolved to no addresses")]
    ResolveEmpty {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
    },
    /// No resolved address accepted the bind; carries the last failure.
    #[error("cannot listen for control clients on {addr}: {source}")]
    BindTcp {
        /// Last address tried.
        addr: SocketAddr,
        /// Bind failure.
        #[source]
        source: io::Error,
    },
    /// The reactor polls the listener, so it must not block.
    #[error("cannot make the control listener non-blocking: {source}")]
    NonBlocking {
        /// `set_nonblocking` failure.
        #[source]
        source: io::Error,
    },
    /// Unix control sockets need a unix host.
    #[cfg(not(unix))]
    #[error("control socket {endpoint} needs unix domain socket support")]
    UnsupportedUnix {
        /// Endpoint as configured.
        endpoint: String,
    },
    /// Binding the unix control socket failed.
    #[cfg(unix)]
    #[error("cannot listen for control clients on {path}: {source}")]
    BindUnix {
        /// Socket path.
        path: String,
        /// Bind failure.
        #[source]
        source: io::Error,
    },
    /// Another daemon answers on the socket path.
    #[cfg(unix)]
    #[error("control socket {path} is held by a running daemon")]
    UnixInUse {
        /// Socket path.
        path: String,
    },
    /// Something other than a socket sits at the path; it is never removed.
    #[cfg(unix)]
    #[error("control socket path {path} exists and is not a socket")]
    UnixNotSocket {
        /// Offending path.
        path: String,
    },
    #[cfg(unix)]
    #[error("cannot inspect control socket path {path}: {source}")]
    UnixMetadata {
        /// Socket path.
        path: String,
        /// Metadata failure.
        #[source]
        source: io::Error,
    },
    /// Probing a leftover socket failed for a reason other than refusal.
    #[cfg(unix)]
    #[error("cannot check whether control socket {path} is live: {source}")]
    UnixConnect {
        /// Socket path.
        path: String,
        /// Connect failure.
        #[source]
        source: io::Error,
    },
    /// A leftover socket from a dead daemon could not be removed.
    #[cfg(unix)]
    #[error("cannot remove stale control socket {path}: {source}")]
    UnixCleanup {
        /// Socket path.
        path: String,
        /// Removal failure.
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_messages_name_the_configured_endpoint() {
        let error = ListenerError::ResolveEmpty {
            host: "routes.invalid".to_owned(),
            port: 5000,
        };
        assert_eq!(
            error.to_string(),
            "control host routes.invalid:5000 resolved to no addresses"
        );
    }

    #[cfg(unix)]
    #[test]
    fn stale_socket_failure_keeps_its_source() {
        use std::error::Error as _;

        let error = ListenerError::UnixCleanup {
            path: "/run/bgpd.sock".to_owned(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(error.to_string().starts_with("cannot remove stale control socket /run/bgpd.sock"));
        assert!(error.source().is_some());
    }
}
