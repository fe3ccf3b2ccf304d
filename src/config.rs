use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP API binds to.
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Directory holding the JSON record collections.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Timeout for MX lookups, in seconds.
    #[serde(default = "default_mx_timeout_seconds")]
    pub mx_timeout_seconds: u64,
}

fn default_listen() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_mx_timeout_seconds() -> u64 {
    crate::dns::DEFAULT_MX_TIMEOUT_SECONDS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            data_dir: default_data_dir(),
            mx_timeout_seconds: default_mx_timeout_seconds(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file. A missing file yields the
    /// defaults so the one-shot CLI modes work without any setup.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            log::info!("Configuration file {path} not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {path}"))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {path}"))?;
        Ok(config)
    }

    pub fn generate_default(path: &str) -> Result<()> {
        let content = serde_yaml::to_string(&Self::default())?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {path}"))?;
        Ok(())
    }
}
