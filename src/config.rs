//! Server configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! environment overrides. The binary applies its command-line flags last.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::http::mime::MimeTable;

/// Environment variable naming the YAML configuration file.
pub const CONFIG_ENV: &str = "TINYHTTPD_CONFIG";
pub const PORT_ENV: &str = "TINYHTTPD_PORT";
pub const WEBROOT_ENV: &str = "TINYHTTPD_WEBROOT";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    /// Empty means every interface.
    pub bind_address: String,
    pub web_root: String,
    /// File served for a bare `/`.
    pub index: String,
    pub backlog: u32,
    /// Per-byte receive timeout, in seconds.
    pub connection_timeout: u64,
    pub verbose: bool,
    /// Extra `.ext: content/type` entries merged over the built-in table.
    pub mime_types: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: String::new(),
            web_root: "/tmp".to_string(),
            index: "index.html".to_string(),
            backlog: 1024,
            connection_timeout: 10,
            verbose: false,
            mime_types: HashMap::new(),
        }
    }
}

impl Config {
    /// Loads defaults, the file named by `TINYHTTPD_CONFIG` if set, then the
    /// environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load_from(path.as_deref())
    }

    /// Like [`Config::load`] but with an explicit (optional) file.
    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut cfg = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                Self::from_yaml(&text)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => Self::default(),
        };

        cfg.apply_env()?;
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        // An empty document deserializes to unit, not to a map.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(port) = std::env::var(PORT_ENV) {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid {PORT_ENV} value '{port}'"))?;
        }

        if let Ok(web_root) = std::env::var(WEBROOT_ENV) {
            self.web_root = web_root;
        }

        Ok(())
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout)
    }

    /// The built-in MIME table with this configuration's entries applied.
    pub fn mime_table(&self) -> MimeTable {
        let mut table = MimeTable::default();
        table.extend(self.mime_types.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        table
    }
}
