//! Control channel endpoints.
//!
//! Operators talk to the daemon over a line-oriented control socket. The
//! endpoint is written as a URL: `unix:///run/bgpd/bgpd.sock` or
//! `tcp://127.0.0.1:9179`.

use std::fmt;
use std::fs::DirBuilder;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Address the control channel listens on.
///
/// Serialised as its URL text so configuration files, environment variables
/// and CLI flags all share one spelling.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum ControlEndpoint {
    /// Unix domain socket.
    Unix {
        /// Socket file path.
        path: Utf8PathBuf,
    },
    /// TCP socket, intended for loopback use.
    Tcp {
        /// Host name or address to bind.
        host: String,
        /// Port to bind; `0` picks an ephemeral port.
        port: u16,
    },
}

impl ControlEndpoint {
    /// Builds a Unix domain socket endpoint.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// Builds a TCP endpoint.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Socket path for Unix endpoints.
    #[must_use]
    pub fn unix_path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Unix { path } => Some(path.as_ref()),
            Self::Tcp { .. } => None,
        }
    }

    /// Creates the parent directory of a Unix socket with mode `0700`.
    ///
    /// TCP endpoints need no preparation.
    ///
    /// # Errors
    ///
    /// Returns [`SocketPreparationError`] when the path has no parent or the
    /// directory cannot be created.
    pub fn prepare_filesystem(&self) -> Result<(), SocketPreparationError> {
        let Some(path) = self.unix_path() else {
            return Ok(());
        };
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .ok_or_else(|| SocketPreparationError::MissingParent {
                path: path.to_path_buf(),
            })?;

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }

        match builder.create(parent.as_std_path()) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(source) => Err(SocketPreparationError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            }),
        }
    }
}

impl fmt::Display for ControlEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix { path } => write!(formatter, "unix://{path}"),
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
        }
    }
}

impl FromStr for ControlEndpoint {
    type Err = SocketParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input)?;
        match url.scheme() {
            "unix" => match url.path() {
                "" | "/" => Err(SocketParseError::MissingUnixPath(input.to_owned())),
                path => Ok(Self::unix(path)),
            },
            "tcp" => {
                let host = url
                    .host_str()
                    .ok_or_else(|| SocketParseError::MissingHost(input.to_owned()))?;
                let port = url
                    .port()
                    .ok_or_else(|| SocketParseError::MissingPort(input.to_owned()))?;
                Ok(Self::tcp(host, port))
            }
            other => Err(SocketParseError::UnsupportedScheme(other.to_owned())),
        }
    }
}

impl TryFrom<String> for ControlEndpoint {
    type Error = SocketParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ControlEndpoint> for String {
    fn from(endpoint: ControlEndpoint) -> Self {
        endpoint.to_string()
    }
}

/// Errors encountered while parsing a [`ControlEndpoint`].
#[derive(Debug, Error)]
pub enum SocketParseError {
    /// Scheme was neither `unix` nor `tcp`.
    #[error("unsupported socket scheme '{0}'")]
    UnsupportedScheme(String),
    /// TCP host was missing.
    #[error("missing TCP host in '{0}'")]
    MissingHost(String),
    /// TCP port was missing.
    #[error("missing TCP port in '{0}'")]
    MissingPort(String),
    /// Unix socket path was absent.
    #[error("missing Unix socket path in '{0}'")]
    MissingUnixPath(String),
    /// Text is not a URL.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Errors raised while preparing the socket directory.
#[derive(Debug, Error)]
pub enum SocketPreparationError {
    /// Socket path has no parent directory.
    #[error("socket path '{path}' has no parent directory")]
    MissingParent {
        /// Configured path.
        path: Utf8PathBuf,
    },
    /// Directory creation failed.
    #[error("failed to create socket directory '{path}': {source}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn displays_unix_endpoint() {
        let endpoint = ControlEndpoint::unix("/run/bgpd/bgpd.sock");
        assert_eq!(endpoint.to_string(), "unix:///run/bgpd/bgpd.sock");
    }

    #[rstest]
    #[case("tcp://127.0.0.1:9179", ControlEndpoint::tcp("127.0.0.1", 9179))]
    #[case("unix:///tmp/bgpd.sock", ControlEndpoint::unix("/tmp/bgpd.sock"))]
    fn parses_endpoints(#[case] text: &str, #[case] expected: ControlEndpoint) {
        let parsed: ControlEndpoint = text.parse().expect("valid endpoint");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case("udp://127.0.0.1:9179")]
    #[case("tcp://127.0.0.1")]
    #[case("unix://")]
    #[case("not a url")]
    fn rejects_invalid_endpoints(#[case] text: &str) {
        assert!(text.parse::<ControlEndpoint>().is_err());
    }

    #[test]
    fn prepares_socket_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let socket = dir.path().join("nested").join("bgpd.sock");
        let path = Utf8PathBuf::from_path_buf(socket).expect("utf8 path");
        let endpoint = ControlEndpoint::unix(path.clone());
        endpoint.prepare_filesystem().expect("prepare");
        endpoint.prepare_filesystem().expect("prepare is idempotent");
        assert!(path.parent().expect("parent").exists());
    }

    #[test]
    fn rejects_socket_without_parent() {
        let endpoint = ControlEndpoint::unix("bgpd.sock");
        let error = endpoint.prepare_filesystem().expect_err("no parent");
        assert!(matches!(error, SocketPreparationError::MissingParent { .. }));
    }
}
