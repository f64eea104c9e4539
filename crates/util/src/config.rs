//! Mention widget configuration.
//!
//! Configuration is a small JSON document holding the trigger character, the
//! search-term pattern, and menu behavior. It is read from the standard
//! configuration directory (`~/.config/mentions/config.json` on most
//! platforms) unless `MENTIONS_CONFIG_PATH` points elsewhere. A missing file
//! yields defaults; an unparsable file is logged and replaced by defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::{config_dir, home_dir};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "MENTIONS_CONFIG_PATH";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default pattern the search term after the trigger character must match.
pub const DEFAULT_SEARCH_PATTERN: &str = r"^\w*$";

/// Error surfaced when loading or validating configuration fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The configured search pattern is not a valid regular expression.
    #[error("invalid search pattern '{pattern}': {source}")]
    InvalidSearchPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Input configuration for a mention widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MentionConfig {
    /// Character which opens the choices menu.
    pub trigger_character: char,
    /// Regular expression the search text after the trigger must match; no
    /// match hides the menu.
    pub search_pattern: String,
    /// Whether to close the menu when the text control loses focus.
    pub close_menu_on_blur: bool,
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            trigger_character: '@',
            search_pattern: DEFAULT_SEARCH_PATTERN.to_string(),
            close_menu_on_blur: false,
        }
    }
}

impl MentionConfig {
    /// Load from the default location (env override or config directory).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    /// Load from an explicit path. Missing files yield defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(config) => config,
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Failed to parse mentions config; using defaults"
                    );
                    MentionConfig::default()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => MentionConfig::default(),
            Err(error) => return Err(ConfigError::Io(error)),
        };
        config.search_regex()?;
        Ok(config)
    }

    /// Persist the config as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Compile the search pattern.
    pub fn search_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.search_pattern).map_err(|source| ConfigError::InvalidSearchPattern {
            pattern: self.search_pattern.clone(),
            source,
        })
    }
}

/// Resolve the config path, honoring `MENTIONS_CONFIG_PATH`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return resolve_user_path(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mentions")
        .join(CONFIG_FILE_NAME)
}

/// Expand a leading `~` (alone or followed by a separator) to the home directory.
fn resolve_user_path(raw: &str) -> PathBuf {
    let Some(rest) = raw.strip_prefix('~') else {
        return PathBuf::from(raw);
    };
    let Some(home) = home_dir() else {
        return PathBuf::from(raw);
    };
    if rest.is_empty() {
        return home;
    }
    match rest.strip_prefix(['/', '\\']) {
        Some(relative) => home.join(relative),
        // `~user/...` is left to the platform
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = MentionConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, MentionConfig::default());
        assert_eq!(config.trigger_character, '@');
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r##"{"trigger_character": "#", "close_menu_on_blur": true}"##).unwrap();
        let config = MentionConfig::load_from(&path).unwrap();
        assert_eq!(config.trigger_character, '#');
        assert!(config.close_menu_on_blur);
        assert_eq!(config.search_pattern, DEFAULT_SEARCH_PATTERN);
    }

    #[test]
    fn invalid_json_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(MentionConfig::load_from(&path).unwrap(), MentionConfig::default());
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"search_pattern": "(unclosed"}"#).unwrap();
        let error = MentionConfig::load_from(&path).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidSearchPattern { .. }));
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = MentionConfig {
            trigger_character: '[',
            search_pattern: r"^[^\]]*\]?$".into(),
            close_menu_on_blur: true,
        };
        config.save_to(&path).unwrap();
        assert_eq!(MentionConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn default_path_honors_env_override() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("~/custom/mentions.json"), || {
            assert_eq!(default_config_path(), resolve_user_path("~/custom/mentions.json"));
        });
        temp_env::with_var(CONFIG_PATH_ENV, Some("   "), || {
            assert!(default_config_path().ends_with(Path::new("mentions").join(CONFIG_FILE_NAME)));
        });
        temp_env::with_var(CONFIG_PATH_ENV, Some(" /etc/mentions.json "), || {
            assert_eq!(default_config_path(), PathBuf::from("/etc/mentions.json"));
        });
    }

    #[test]
    fn user_paths_expand_home() {
        assert_eq!(resolve_user_path("relative/config.json"), PathBuf::from("relative/config.json"));
        assert_eq!(resolve_user_path("~other/config.json"), PathBuf::from("~other/config.json"));
        if let Some(home) = home_dir() {
            assert_eq!(resolve_user_path("~"), home);
            assert_eq!(resolve_user_path("~/custom/mentions.json"), home.join("custom/mentions.json"));
            assert_eq!(resolve_user_path("~\\custom"), home.join("custom"));
        }
    }
}
