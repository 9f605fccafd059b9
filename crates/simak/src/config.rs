//! Configuration management for simak.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "simak";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "simak.db";

/// Shared admin secret of the register.
pub const DEFAULT_ADMIN_PASSWORD: &str = "brigif4dr";

/// Default Generative Language API base URL.
pub const DEFAULT_ASSISTANT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default assistant model.
pub const DEFAULT_ASSISTANT_MODEL: &str = "gemini-3-flash-preview";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SIMAK_`, sections split by `__`)
/// 2. TOML config file at `~/.config/simak/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Assistant configuration.
    pub assistant: AssistantConfig,
    /// Simulation hooks.
    pub simulation: SimulationConfig,
}

/// What to do when a stored payload cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptStatePolicy {
    /// Refuse to start.
    #[default]
    Fail,
    /// Log a warning and fall back to the default value.
    Reset,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/simak/simak.db`
    pub database_path: Option<PathBuf>,
    /// Handling of corrupt stored payloads.
    pub on_corrupt: CorruptStatePolicy,
    /// Minutes of inactivity after which the session expires.
    /// Set to 0 to keep sessions until logout.
    pub session_idle_minutes: u32,
}

/// Authentication configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared admin password, compared in cleartext. Never serialized.
    #[serde(skip_serializing)]
    pub admin_password: String,
}

/// Assistant provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// API key for the provider. Falls back to `GEMINI_API_KEY` / `API_KEY`.
    /// Never serialized.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL of the Generative Language API.
    pub endpoint: String,
    /// Model name.
    pub model: String,
    /// Request timeout in seconds. Set to 0 to wait indefinitely.
    pub timeout_secs: u64,
}

/// Simulation hooks for exercising UI states.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Artificial delay before a save is acknowledged, in milliseconds.
    pub save_latency_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            on_corrupt: CorruptStatePolicy::Fail,
            session_idle_minutes: 60,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ASSISTANT_ENDPOINT.to_string(),
            model: DEFAULT_ASSISTANT_MODEL.to_string(),
            timeout_secs: 0,
        }
    }
}

impl Config {
    /// Load configuration from all sources, reading the TOML layer from
    /// `config_path` or the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SIMAK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.auth.admin_password.is_empty() {
            return Err(Error::ConfigValidation {
                message: "auth.admin_password must not be empty".to_string(),
            });
        }

        let endpoint = &self.assistant.endpoint;
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(Error::ConfigValidation {
                message: format!("assistant.endpoint must be an http(s) URL: {endpoint}"),
            });
        }

        if self.assistant.model.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "assistant.model must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the session idle timeout, or `None` if sessions never expire.
    #[must_use]
    pub fn session_idle(&self) -> Option<chrono::Duration> {
        if self.storage.session_idle_minutes == 0 {
            None
        } else {
            Some(chrono::Duration::minutes(i64::from(
                self.storage.session_idle_minutes,
            )))
        }
    }

    /// Get the assistant request timeout, or `None` to wait indefinitely.
    #[must_use]
    pub fn assistant_timeout(&self) -> Option<Duration> {
        if self.assistant.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.assistant.timeout_secs))
        }
    }

    /// Resolve the assistant API key from config or the environment.
    #[must_use]
    pub fn assistant_api_key(&self) -> Option<String> {
        self.assistant
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Get the simulated save latency.
    #[must_use]
    pub fn save_latency(&self) -> Duration {
        Duration::from_millis(self.simulation.save_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.on_corrupt, CorruptStatePolicy::Fail);
        assert_eq!(config.auth.admin_password, DEFAULT_ADMIN_PASSWORD);
        assert_eq!(config.assistant.model, DEFAULT_ASSISTANT_MODEL);
        assert_eq!(config.simulation.save_latency_ms, 0);
    }

    #[test]
    fn test_default_storage_config() {
        let storage = StorageConfig::default();

        assert!(storage.database_path.is_none());
        assert_eq!(storage.session_idle_minutes, 60);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_password() {
        let mut config = Config::default();
        config.auth.admin_password = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("admin_password"));
    }

    #[test]
    fn test_validate_bad_endpoint() {
        let mut config = Config::default();
        config.assistant.endpoint = "ftp://example.com".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("assistant.endpoint"));
    }

    #[test]
    fn test_validate_blank_model() {
        let mut config = Config::default();
        config.assistant.model = " ".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config.database_path().to_string_lossy().contains("simak.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_session_idle() {
        let mut config = Config::default();
        assert_eq!(config.session_idle(), Some(chrono::Duration::minutes(60)));

        config.storage.session_idle_minutes = 0;
        assert!(config.session_idle().is_none());
    }

    #[test]
    fn test_assistant_timeout() {
        let mut config = Config::default();
        assert!(config.assistant_timeout().is_none());

        config.assistant.timeout_secs = 30;
        assert_eq!(config.assistant_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_configured_api_key_wins() {
        let mut config = Config::default();
        config.assistant.api_key = Some("from-config".to_string());
        assert_eq!(config.assistant_api_key().as_deref(), Some("from-config"));
    }

    #[test]
    fn test_save_latency() {
        let mut config = Config::default();
        assert_eq!(config.save_latency(), Duration::ZERO);
        config.simulation.save_latency_ms = 500;
        assert_eq!(config.save_latency(), Duration::from_millis(500));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("simak"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.auth, AuthConfig::default());
        assert_eq!(config.storage.on_corrupt, CorruptStatePolicy::Fail);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [storage]
            on_corrupt = "reset"
            session_idle_minutes = 5

            [simulation]
            save_latency_ms = 250
            "#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.storage.on_corrupt, CorruptStatePolicy::Reset);
        assert_eq!(config.storage.session_idle_minutes, 5);
        assert_eq!(config.simulation.save_latency_ms, 250);
        assert_eq!(config.assistant.model, DEFAULT_ASSISTANT_MODEL);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[assistant]\nendpoint = \"ftp://example\"\n").unwrap();
        assert!(matches!(
            Config::load_from(Some(path.clone())),
            Err(Error::ConfigValidation { .. })
        ));

        std::fs::write(&path, "[storage\n").unwrap();
        assert!(matches!(
            Config::load_from(Some(path)),
            Err(Error::ConfigLoad(_))
        ));
    }

    #[test]
    fn test_policy_deserialize() {
        let policy: CorruptStatePolicy = serde_json::from_str("\"reset\"").unwrap();
        assert_eq!(policy, CorruptStatePolicy::Reset);
    }

    #[test]
    fn test_config_serialize_omits_secrets() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("session_idle_minutes"));
        assert!(!json.contains("api_key"));
        assert!(!json.contains(DEFAULT_ADMIN_PASSWORD));

        let mut config = Config::default();
        config.assistant.api_key = Some("AIza-rahasia".to_string());
        config.auth.admin_password = "sandi-khusus".to_string();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(!json.contains("AIza-rahasia"));
        assert!(!json.contains("sandi-khusus"));
        assert!(!json.contains("admin_password"));
    }
}
