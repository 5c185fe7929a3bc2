//! Configuration loading and management
//!
//! Handles parsing of `.trk.toml` configuration files. Every section has
//! serde defaults so a missing or partial file still yields a runnable
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Configuration file name looked up in the working directory
pub const CONFIG_FILE: &str = ".trk.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the REST API binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Storage backend configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Identity resolution configuration
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Local fallback namespace configuration
    #[serde(default)]
    pub local: LocalConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            storage: StorageConfig::default(),
            identity: IdentityConfig::default(),
            local: LocalConfig::default(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3001".to_string()
}

/// Which persistence backend serves the REST contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process collections, nothing durable
    Memory,
    /// One JSON document per record, per-record write granularity
    Document,
    /// Single workbook file, one sheet per kind, whole-sheet overwrite
    #[default]
    Workbook,
}

impl BackendKind {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "document" => Ok(BackendKind::Document),
            "workbook" => Ok(BackendKind::Workbook),
            other => Err(Error::InvalidArgument(format!(
                "unknown storage backend: {other} (expected memory, document or workbook)"
            ))),
        }
    }
}

/// Storage-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend selection
    #[serde(default)]
    pub backend: BackendKind,

    /// Root directory for durable state
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "trk")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".trk"))
}

/// Identity resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Request header carrying the user scope key
    #[serde(default = "default_identity_header")]
    pub header: String,

    /// Scope used when the header is absent
    #[serde(default = "default_identity_fallback")]
    pub fallback: String,

    /// Reject requests without an identity header instead of defaulting
    #[serde(default)]
    pub required: bool,
}

fn default_identity_header() -> String {
    crate::identity::DEFAULT_USER_HEADER.to_string()
}

fn default_identity_fallback() -> String {
    crate::identity::FALLBACK_SCOPE.to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            header: default_identity_header(),
            fallback: default_identity_fallback(),
            required: false,
        }
    }
}

/// Local fallback namespace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Prefix for namespaced collection keys
    #[serde(default = "default_local_prefix")]
    pub prefix: String,
}

fn default_local_prefix() -> String {
    crate::local::DEFAULT_LOCAL_PREFIX.to_string()
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            prefix: default_local_prefix(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, `.trk.toml` in
    /// the working directory is used when present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(Error::InvalidConfig(format!(
                        "config file not found: {}",
                        explicit.display()
                    )));
                }
                Self::parse_file(explicit)
            }
            None => {
                let implicit = Path::new(CONFIG_FILE);
                if implicit.exists() {
                    Self::parse_file(implicit)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    fn parse_file(path: &Path) -> Result<Config> {
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_runnable() {
        let config = Config::default();
        assert_eq!(config.bind, "127.0.0.1:3001");
        assert_eq!(config.storage.backend, BackendKind::Workbook);
        assert_eq!(config.identity.header, "x-user-id");
        assert!(!config.identity.required);
        assert_eq!(config.local.prefix, "tracker");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            bind = "0.0.0.0:8080"

            [storage]
            backend = "document"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.bind, "0.0.0.0:8080");
        assert_eq!(parsed.storage.backend, BackendKind::Document);
        assert_eq!(parsed.identity.fallback, "shared");
    }

    #[test]
    fn backend_parse_rejects_unknown_names() {
        assert!(BackendKind::parse("workbook").is_ok());
        assert!(matches!(
            BackendKind::parse("sqlite"),
            Err(Error::InvalidArgument(_))
        ));
    }
}
