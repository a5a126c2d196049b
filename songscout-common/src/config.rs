//! Configuration loading and root folder resolution
//!
//! Root folder priority:
//! 1. Command-line argument
//! 2. `SONGSCOUT_ROOT_FOLDER` environment variable
//! 3. `root_folder` in the TOML config file
//! 4. OS-dependent default
//!
//! A missing TOML file is not an error; defaults are used instead.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{Error, Result};

pub const ENV_ROOT_FOLDER: &str = "SONGSCOUT_ROOT_FOLDER";
pub const ENV_DELETE_PASSWORD: &str = "SONGSCOUT_DELETE_PASSWORD";
pub const ENV_LOCAL_INDEX_URL: &str = "SONGSCOUT_LOCAL_INDEX_URL";

/// SQLite file created inside the root folder
pub const DATABASE_FILE: &str = "songscout.db";

const DEFAULT_PROXY_ENDPOINTS: [&str; 3] = [
    "https://music-api.gdstudio.xyz/api.php",
    "https://api.liumingye.cn/music/api.php",
    "https://music.aityp.com/api.php",
];

/// Contents of `config.toml`
///
/// Every section is optional; absent keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub server: ServerConfig,
    pub proxy: ProxyConfig,
    pub fallback: FallbackConfig,
    pub local_index: LocalIndexConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5002,
        }
    }
}

/// Multi-endpoint music proxy API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Tried in order; a failing endpoint hands over to the next one
    pub endpoints: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_PROXY_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            timeout_secs: 15,
        }
    }
}

/// Platform-specific search used when the proxy has nothing for NetEase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub netease_search_url: String,
    pub timeout_secs: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            netease_search_url: "https://music.163.com/api/search/get/web".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Elasticsearch-compatible local song index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalIndexConfig {
    pub enabled: bool,
    pub url: String,
    pub index: String,
    pub timeout_secs: u64,
}

impl Default for LocalIndexConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://localhost:9200".to_string(),
            index: "music_data".to_string(),
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Required by the delete endpoint; deletion is disabled when unset
    pub delete_password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load `path` (or the default location), falling back to defaults when no file exists
    ///
    /// Returns the path actually read, if any. A file that exists but fails to
    /// parse is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
            return Ok((Self::default(), None));
        };

        if !path.exists() {
            return Ok((Self::default(), None));
        }

        let config = Self::load(&path)?;
        Ok((config, Some(path)))
    }

    /// Delete password, with the environment variable taking precedence
    pub fn delete_password(&self) -> Option<String> {
        std::env::var(ENV_DELETE_PASSWORD)
            .ok()
            .or_else(|| self.admin.delete_password.clone())
            .filter(|p| !p.trim().is_empty())
    }

    /// Local index URL, with the environment variable taking precedence
    pub fn local_index_url(&self) -> String {
        std::env::var(ENV_LOCAL_INDEX_URL).unwrap_or_else(|_| self.local_index.url.clone())
    }

    /// Reject configurations the service cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.proxy.endpoints.is_empty() {
            return Err(Error::Config("proxy.endpoints must list at least one URL".to_string()));
        }
        if self.proxy.timeout_secs == 0
            || self.fallback.timeout_secs == 0
            || self.local_index.timeout_secs == 0
        {
            return Err(Error::Config("timeouts must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// `~/.config/songscout/config.toml` (platform equivalent elsewhere)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("songscout").join("config.toml"))
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("songscout"))
        .unwrap_or_else(|| PathBuf::from("./songscout_data"))
}

/// Resolves the root folder from CLI, environment, TOML and defaults
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, config: &TomlConfig) -> Self {
        Self {
            cli_arg,
            toml_root: config.root_folder.clone(),
        }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ENV_ROOT_FOLDER) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            return path.clone();
        }

        default_root_folder()
    }
}

/// Creates the root folder and locates files inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.server.port, 5002);
        assert_eq!(config.proxy.endpoints.len(), 3);
        assert_eq!(config.local_index.index, "music_data");
        assert!(config.admin.delete_password.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [local_index]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert!(!config.local_index.enabled);
        assert_eq!(config.local_index.url, "http://localhost:9200");
        assert_eq!(config.proxy.timeout_secs, 15);
    }

    #[test]
    fn test_validate_rejects_empty_endpoints() {
        let mut config = TomlConfig::default();
        config.proxy.endpoints.clear();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        assert!(TomlConfig::default().validate().is_ok());

        let mut config = TomlConfig::default();
        config.local_index.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = TomlConfig::default();
        config.fallback.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_database_path_inside_root() {
        let init = RootFolderInitializer::new(PathBuf::from("/tmp/songscout-root"));
        assert_eq!(init.database_path(), PathBuf::from("/tmp/songscout-root/songscout.db"));
    }
}
