use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding every stored file.
    pub storage_root: PathBuf,
    /// Largest request body accepted by the upload endpoint.
    pub max_upload_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)),
            storage_root: PathBuf::from("storage"),
            max_upload_bytes: 100 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> ServerResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> ServerResult<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.storage_root.as_os_str().is_empty() {
            return Err(ServerError::Config("storage_root cannot be empty".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ServerError::Config(
                "max_upload_bytes must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Upload limit as a body size for the HTTP layer.
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_upload_bytes).unwrap_or(usize::MAX)
    }
}
