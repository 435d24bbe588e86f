use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::paths::Paths;

pub const SERVICE_URL_ENV: &str = "TABPLANNER_SERVICE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Forwarded as the `model` query parameter when set.
    #[serde(default)]
    pub model: Option<String>,
    /// No timeout unless configured.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// `Some("")` forces a direct connection even when `network.proxy` is set.
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: None,
            timeout_secs: None,
            proxy: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub no_proxy: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDefaults {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_limit() -> u32 {
    5
}

fn default_temperature() -> f64 {
    0.2
}

impl Default for PlanDefaults {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorsConfig {
    #[serde(default = "default_bookmark_cap")]
    pub bookmark_cap: usize,
    #[serde(default = "default_history_max_results")]
    pub history_max_results: usize,
    #[serde(default = "default_history_lookback_days")]
    pub history_lookback_days: u32,
}

fn default_bookmark_cap() -> usize {
    200
}

fn default_history_max_results() -> usize {
    20
}

fn default_history_lookback_days() -> u32 {
    7
}

impl Default for CollectorsConfig {
    fn default() -> Self {
        Self {
            bookmark_cap: default_bookmark_cap(),
            history_max_results: default_history_max_results(),
            history_lookback_days: default_history_lookback_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserConfig {
    /// chrome | chromium | brave | edge
    #[serde(default = "default_engine")]
    pub engine: String,
    /// Profile directory holding `Bookmarks` and `History`. Derived from
    /// `engine` when unset.
    #[serde(default)]
    pub profile_dir: Option<String>,
    /// DevTools remote debugging port of a running browser.
    #[serde(default)]
    pub debug_port: Option<u16>,
}

fn default_engine() -> String {
    "chrome".to_string()
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            profile_dir: None,
            debug_port: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    /// auto | whisper | whisper_cpp | api
    #[serde(default = "default_voice_backend")]
    pub backend: String,
    /// Whisper model size for the local backends.
    #[serde(default = "default_voice_model")]
    pub model: String,
    #[serde(default = "default_max_seconds")]
    pub max_seconds: u32,
    /// OpenAI key for the `api` backend; `OPENAI_API_KEY` is used otherwise.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_voice_backend() -> String {
    "auto".to_string()
}

fn default_voice_model() -> String {
    "base".to_string()
}

fn default_max_seconds() -> u32 {
    8
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            backend: default_voice_backend(),
            model: default_voice_model(),
            max_seconds: default_max_seconds(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub defaults: PlanDefaults,
    #[serde(default)]
    pub collectors: CollectorsConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        let mut config = if config_path.exists() {
            Self::load(&config_path)?
        } else {
            debug!(path = %config_path.display(), "No config file, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                self.service.base_url = url.to_string();
            }
        }
    }

    /// Base URL without a trailing slash.
    pub fn service_url(&self) -> String {
        self.service.base_url.trim().trim_end_matches('/').to_string()
    }

    pub fn service_model(&self) -> Option<String> {
        self.service
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    pub fn profile_dir_override(&self) -> Option<PathBuf> {
        self.browser
            .profile_dir
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(expand_home)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
