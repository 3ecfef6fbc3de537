//! Configuration loaders for success and failure scenarios.

use std::ffi::OsString;
use std::fs;
use std::sync::Arc;

use bgp_config::{Config, ControlEndpoint};
use camino::Utf8PathBuf;
use ortho_config::OrthoError;
use tempfile::TempDir;

use crate::bootstrap::ConfigLoader;

/// Loader rooted in a temporary directory, listening on loopback TCP.
pub struct TestConfigLoader {
    dir: TempDir,
    neighbor_file: Option<Utf8PathBuf>,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temporary directory");
        Self {
            dir,
            neighbor_file: None,
        }
    }

    /// Writes `source` as the neighbor file the loaded config points at.
    pub fn with_neighbors(mut self, source: &str) -> Self {
        let path = self.dir.path().join("neighbors.conf");
        fs::write(&path, source).expect("failed to write neighbor file");
        self.neighbor_file =
            Some(Utf8PathBuf::from_path_buf(path).expect("temporary path was not valid UTF-8"));
        self
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            daemon_socket: ControlEndpoint::tcp("127.0.0.1", 0),
            neighbor_file: self.neighbor_file.clone(),
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing an invalid socket URL.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("bgpd"),
            OsString::from("--daemon-socket"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}
