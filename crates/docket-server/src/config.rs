use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use docket_store::StoreConfig;

use crate::error::{ServerError, ServerResult};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8676;

/// Server configuration, loadable from TOML.
///
/// ```toml
/// bind_addr = "0.0.0.0:8676"
/// data_dir = "/var/lib/docket"
/// ```
///
/// Missing keys fall back to [`ServerConfig::default`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            data_dir: StoreConfig::default().data_dir,
        }
    }
}

impl ServerConfig {
    /// Read a TOML configuration file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    /// Parse a TOML configuration document.
    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Storage settings derived from this configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.data_dir)
    }
}
