//! Service configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use vouch_core::CredentialConfig;
use vouch_identity::NetworkResolverConfig;

/// Full configuration for the Vouch service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VouchConfig {
    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// DID registry resolution.
    #[serde(default)]
    pub resolver: NetworkResolverConfig,

    /// Identity directory service.
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Content-addressed career store.
    #[serde(default)]
    pub content_store: ContentStoreConfig,

    /// Credential issuance and verification.
    #[serde(default)]
    pub credentials: CredentialConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Rocksdb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Path to the data directory (rocksdb backend only).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_directory_host")]
    pub host: String,
    #[serde(default = "default_directory_port")]
    pub port: u16,
    #[serde(default = "default_directory_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentStoreConfig {
    /// Prefix the content hash is appended to.
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_api_addr() -> String {
    "0.0.0.0".into()
}
fn default_api_port() -> u16 {
    60071
}
fn default_backend() -> StorageBackend {
    StorageBackend::Memory
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_directory_host() -> String {
    "localhost".into()
}
fn default_directory_port() -> u16 {
    8080
}
fn default_directory_api_version() -> String {
    "v0".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_url_prefix() -> String {
    "https://ipfs.io/ipfs/".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            host: default_directory_host(),
            port: default_directory_port(),
            api_version: default_directory_api_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ContentStoreConfig {
    fn default() -> Self {
        Self {
            url_prefix: default_url_prefix(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl DirectoryConfig {
    /// API root of the directory, e.g. `http://localhost:8080/api/v0`.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/api/{}", self.host, self.port, self.api_version)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ContentStoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl VouchConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: VouchConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `INFURA_PID`, `BROCCOLI_HOST`, `BROCCOLI_PORT` and
    /// `IPFS_URL_PREFIX` from the process environment.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(pid) = lookup("INFURA_PID").filter(|v| !v.is_empty()) {
            self.resolver.infura_project_id = Some(pid);
        }
        if let Some(host) = lookup("BROCCOLI_HOST").filter(|v| !v.is_empty()) {
            self.directory.host = host;
        }
        if let Some(port) = lookup("BROCCOLI_PORT").filter(|v| !v.is_empty()) {
            self.directory.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("BROCCOLI_PORT is not a port: {}", port))?;
        }
        if let Some(prefix) = lookup("IPFS_URL_PREFIX").filter(|v| !v.is_empty()) {
            self.content_store.url_prefix = prefix;
        }
        Ok(())
    }

    /// Get the API socket address string.
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.listen_addr, self.api.port)
    }
}
