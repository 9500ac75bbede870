use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;
use super::settings::{Language, Settings};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Delay between automatic polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Raw `Cookie` header value, copied from a logged-in browser session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
    #[serde(default = "default_true")]
    pub open_browser_on_login: bool,
}

/// Startup values for the in-memory display [`Settings`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub romanize: bool,
    #[serde(default = "default_true")]
    pub show_openings: bool,
    #[serde(default = "default_true")]
    pub show_endings: bool,
    #[serde(default = "default_true")]
    pub show_inserts: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            session_cookie: None,
            open_browser_on_login: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let s = Settings::default();
        Self {
            language: s.language,
            romanize: s.romanize,
            show_openings: s.show_openings,
            show_endings: s.show_endings,
            show_inserts: s.show_inserts,
        }
    }
}

impl DisplayConfig {
    pub fn initial_settings(&self) -> Settings {
        Settings {
            language: self.language,
            romanize: self.romanize,
            show_openings: self.show_openings,
            show_endings: self.show_endings,
            show_inserts: self.show_inserts,
        }
    }
}

fn default_base_url() -> String {
    "http://whatanime.ddns.net:8000".to_string()
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
