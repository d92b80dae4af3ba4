//! TOML-based configuration for eavql.
//!
//! Supports a config file (eavql.toml) with environment variable expansion
//! in path values.
//!
//! Example configuration:
//! ```toml
//! [server]
//! listen_addr = "0.0.0.0:8080"
//! user_header = "x-user-id"
//!
//! [database]
//! path = "${EAVQL_DATA}/reports.db"
//! dialect = "sqlite"
//!
//! [metadata]
//! cache_ttl_seconds = 300
//! relationships_path = "relationships.toml"
//!
//! [reports]
//! default_page_size = 50
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sql::Dialect;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "EAVQL_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub metadata: MetadataSettings,
    pub reports: ReportSettings,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to bind.
    pub listen_addr: String,

    /// Header carrying the requesting user id.
    pub user_header: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            user_header: "x-user-id".to_string(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file path (supports ${ENV_VAR} expansion, ":memory:" allowed).
    pub path: String,

    /// SQL dialect reports are compiled for; the report server requires `sqlite`.
    pub dialect: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "eavql.db".to_string(),
            dialect: "sqlite".to_string(),
        }
    }
}

/// Metadata configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// Cache TTL in seconds.
    pub cache_ttl_seconds: u64,

    /// Relationship catalog path (supports ${ENV_VAR} expansion).
    pub relationships_path: String,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 300,
            relationships_path: "relationships.toml".to_string(),
        }
    }
}

/// Report execution defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Page size used when a run request gives none.
    pub default_page_size: i64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            default_page_size: 50,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `EAVQL_CONFIG`
    /// 2. `./eavql.toml`
    /// 3. `~/.config/eavql/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("eavql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("eavql").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Load from `path` when given, otherwise search the default locations.
    pub fn load_from(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// The configured dialect.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        self.database
            .dialect
            .parse()
            .map_err(|e| SettingsError::InvalidConfig(format!("database.dialect: {}", e)))
    }

    /// The database path with environment variables expanded.
    pub fn database_path(&self) -> Result<PathBuf, SettingsError> {
        expand_env_vars(&self.database.path).map(PathBuf::from)
    }

    /// The relationship catalog path with environment variables expanded.
    pub fn relationships_path(&self) -> Result<PathBuf, SettingsError> {
        expand_env_vars(&self.metadata.relationships_path).map(PathBuf::from)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.metadata.cache_ttl_seconds)
    }

    /// The default page size, which must be positive.
    pub fn default_page_size(&self) -> Result<i64, SettingsError> {
        match self.reports.default_page_size {
            size if size > 0 => Ok(size),
            size => Err(SettingsError::InvalidConfig(format!(
                "reports.default_page_size must be positive, got {}",
                size
            ))),
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        // Check for ${VAR} or $VAR
        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            // $VAR (ends at non-alphanumeric/underscore)
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
