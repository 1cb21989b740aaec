use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Tunables that may come from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Largest accepted upload body (in bytes)
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,

    /// Directory holding the UI's CSS/JS
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Print the connect URL as a QR code on startup
    #[serde(default = "default_show_terminal_qr")]
    pub show_terminal_qr: bool,
}

fn default_max_upload_size() -> usize {
    1024 * 1024 * 1024 // 1 GiB
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_show_terminal_qr() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_upload_size: default_max_upload_size(),
            assets_dir: default_assets_dir(),
            show_terminal_qr: default_show_terminal_qr(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
