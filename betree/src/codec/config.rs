use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    encoding::DEFAULT_MAX_DEPTH,
    utils::error::{BetResult, Error},
};

/// Name of the environment variable holding the path to the codec configuration file.
/// If not set, defaults to `$XDG_CONFIG_HOME/betree/codec.toml` or
/// `$HOME/.config/betree/codec.toml`.
pub const ENV_CODEC_CONFIG_PATH: &str = "BETREE_CONFIG_PATH";

/// Tuning knobs of the transport codec.
///
/// Missing fields in a configuration file take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// zstd level used when serializing.
    pub compression_level: i32,
    /// Upper bound on the decompressed payload accepted when deserializing.
    pub max_decoded_bytes: usize,
    /// Upper bound on tree nesting accepted when deserializing.
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            compression_level: zstd::DEFAULT_COMPRESSION_LEVEL,
            max_decoded_bytes: 16 * 1024 * 1024,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CodecConfig {
    /// Get the default path to the codec configuration file.
    pub fn default_path() -> PathBuf {
        if let Ok(config_path) = std::env::var(ENV_CODEC_CONFIG_PATH) {
            return config_path.into();
        }

        let mut path = PathBuf::new();
        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
            path.push(xdg_config_home);
        } else if let Ok(home) = std::env::var("HOME") {
            path.push(home);
            path.push(".config");
        }

        path.push("betree");
        path.push("codec.toml");
        path
    }

    pub fn from_toml_str(toml_str: &str, file: &str) -> BetResult<Self> {
        toml::from_str(toml_str).map_err(|e| Error::ConfigParseError {
            source: e,
            file: file.to_string(),
        })
    }

    /// Load a configuration from a TOML file.
    pub fn load_from_toml(path: &Path) -> BetResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml_str, &path.display().to_string())
    }

    /// Load from [`CodecConfig::default_path`] if that file exists, otherwise use defaults.
    pub fn load_or_default() -> BetResult<Self> {
        let path = Self::default_path();
        if path.is_file() {
            Self::load_from_toml(&path)
        } else {
            Ok(Self::default())
        }
    }
}
