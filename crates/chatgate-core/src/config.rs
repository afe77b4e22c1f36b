use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ChatgateError, Result};

/// Top-level configuration for chatgate.
///
/// Loaded from `~/.chatgate/config.toml` by default. Every section falls
/// back to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatgateConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl ChatgateConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ChatgateConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ChatgateError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.filter.validate()
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the thread store snapshot.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.chatgate".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Which histories an exact fingerprint match is looked up in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExactMatchScope {
    /// Any actor's retained message blocks an identical one from anyone.
    #[default]
    Global,
    /// Only the sender's own retained messages count.
    PerActor,
}

/// Duplicate filter tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Sliding window, in seconds, during which a message stays comparable.
    pub time_window_seconds: f64,
    /// Hard cap on retained messages per actor.
    pub max_history_per_actor: usize,
    /// Minimum word-set Jaccard score treated as a near-duplicate.
    pub similarity_threshold: f64,
    pub exact_match_scope: ExactMatchScope,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            time_window_seconds: 300.0,
            max_history_per_actor: 10,
            similarity_threshold: 0.8,
            exact_match_scope: ExactMatchScope::Global,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.time_window_seconds.is_finite() && self.time_window_seconds > 0.0) {
            return Err(ChatgateError::Config(format!(
                "filter.time_window_seconds must be positive, got {}",
                self.time_window_seconds
            )));
        }
        if self.max_history_per_actor == 0 {
            return Err(ChatgateError::Config(
                "filter.max_history_per_actor must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ChatgateError::Config(format!(
                "filter.similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

/// Message routing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Display name used in command replies.
    pub bot_name: String,
    /// Actors allowed to run `/clear_all`.
    pub admin_ids: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            bot_name: "chatgate".to_string(),
            admin_ids: Vec::new(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub port: u16,
    /// Requests allowed per one-second window. 0 disables the limit.
    pub rate_limit_per_sec: u64,
    /// Seconds between background sweeps of idle actors. 0 disables.
    pub sweep_interval_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3040,
            rate_limit_per_sec: 50,
            sweep_interval_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ChatgateConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert!((config.filter.time_window_seconds - 300.0).abs() < f64::EPSILON);
        assert_eq!(config.filter.max_history_per_actor, 10);
        assert!((config.filter.similarity_threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.filter.exact_match_scope, ExactMatchScope::Global);
        assert_eq!(config.router.bot_name, "chatgate");
        assert!(config.router.admin_ids.is_empty());
        assert_eq!(config.api.port, 3040);
        assert_eq!(config.api.sweep_interval_secs, 0);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/srv/chatgate"
log_level = "debug"

[filter]
time_window_seconds = 60.0
max_history_per_actor = 5
similarity_threshold = 0.75
exact_match_scope = "per_actor"

[router]
bot_name = "Support Bot"
admin_ids = ["1001", "1002"]

[api]
port = 8080
rate_limit_per_sec = 10
sweep_interval_secs = 900
"#;
        let file = create_temp_config(content);
        let config = ChatgateConfig::load(file.path()).unwrap();
        assert_eq!(config.general.data_dir, "/srv/chatgate");
        assert_eq!(config.general.log_level, "debug");
        assert!((config.filter.time_window_seconds - 60.0).abs() < f64::EPSILON);
        assert_eq!(config.filter.max_history_per_actor, 5);
        assert!((config.filter.similarity_threshold - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.filter.exact_match_scope, ExactMatchScope::PerActor);
        assert_eq!(config.router.bot_name, "Support Bot");
        assert_eq!(config.router.admin_ids, vec!["1001", "1002"]);
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.rate_limit_per_sec, 10);
        assert_eq!(config.api.sweep_interval_secs, 900);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[filter]
max_history_per_actor = 3
"#;
        let file = create_temp_config(content);
        let config = ChatgateConfig::load(file.path()).unwrap();
        assert_eq!(config.filter.max_history_per_actor, 3);
        // Remaining fields use defaults
        assert!((config.filter.time_window_seconds - 300.0).abs() < f64::EPSILON);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_load_rejects_threshold_out_of_range() {
        let file = create_temp_config("[filter]\nsimilarity_threshold = 1.5\n");
        let err = ChatgateConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ChatgateError::Config(_)));
        assert!(err.to_string().contains("similarity_threshold"));
    }

    #[test]
    fn test_load_rejects_zero_history_cap() {
        let file = create_temp_config("[filter]\nmax_history_per_actor = 0\n");
        let err = ChatgateConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("max_history_per_actor"));
    }

    #[test]
    fn test_load_rejects_non_positive_window() {
        let file = create_temp_config("[filter]\ntime_window_seconds = 0.0\n");
        assert!(ChatgateConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_rejects_unknown_scope() {
        let file = create_temp_config("[filter]\nexact_match_scope = \"sometimes\"\n");
        assert!(ChatgateConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = ChatgateConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.data_dir, "~/.chatgate");
        assert_eq!(config.filter.max_history_per_actor, 10);
    }

    #[test]
    fn test_load_or_default_invalid_values_fall_back() {
        let file = create_temp_config("[filter]\nsimilarity_threshold = -0.1\n");
        let config = ChatgateConfig::load_or_default(file.path());
        assert!((config.filter.similarity_threshold - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        let mut config = ChatgateConfig::default();
        config.filter.exact_match_scope = ExactMatchScope::PerActor;
        config.router.admin_ids = vec!["42".to_string()];
        config.save(&path).unwrap();

        assert!(path.exists());
        let reloaded = ChatgateConfig::load(&path).unwrap();
        assert_eq!(reloaded.filter.exact_match_scope, ExactMatchScope::PerActor);
        assert_eq!(reloaded.router.admin_ids, vec!["42"]);
    }

    #[test]
    fn test_config_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = ChatgateConfig::load(file.path()).unwrap();
        assert_eq!(config.api.port, 3040);
        assert_eq!(config.filter.max_history_per_actor, 10);
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let file = create_temp_config("this is {{ not valid TOML");
        assert!(ChatgateConfig::load(file.path()).is_err());
    }
}
