//! MCP tools for the ALCF AI assistant
//!
//! Asks ask.alcf.anl.gov questions by driving its chat page in a headless
//! Chrome via chromiumoxide, and serves the answers to MCP clients.

mod browser;
pub mod browser_setup;
pub mod detector;
pub mod driver;
pub mod orchestrator;
pub mod query;
pub mod server;
pub mod shaper;
mod tools;
mod utils;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::detector::DetectorConfig;
use crate::driver::LocatorSet;
use crate::utils::constants::{
    ASK_ALCF_URL, DEFAULT_DEBOUNCE_MS, DEFAULT_ELEMENT_TIMEOUT_MS, DEFAULT_GRACE_WINDOW_MS,
    DEFAULT_NAVIGATION_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_MS,
};

/// Environment variable naming the YAML config file.
pub const CONFIG_ENV: &str = "ALCF_MCP_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub locators: LocatorSet,
}

/// Where the chat page lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_url")]
    pub url: String,
}

/// Browser security and launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Disable web security features (Same-Origin Policy, etc.)
    /// WARNING: Only enable for trusted content
    #[serde(default)]
    pub disable_security: bool,

    /// Window dimensions
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,

    #[serde(default = "default_window_height")]
    pub height: u32,
}

/// Driver and detector timings, all in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Budget for loading the entry page, independent of the query timeout
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// How long to wait for the chat input to render
    #[serde(default = "default_element_timeout_ms")]
    pub element_timeout_ms: u64,

    /// How long the indicator may take to appear before the answer counts as instant
    #[serde(default = "default_grace_window_ms")]
    pub grace_window_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Pause between completion and extraction
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_service_url() -> String {
    ASK_ALCF_URL.to_string()
}

fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_navigation_timeout_ms() -> u64 {
    DEFAULT_NAVIGATION_TIMEOUT_MS
}

fn default_element_timeout_ms() -> u64 {
    DEFAULT_ELEMENT_TIMEOUT_MS
}

fn default_grace_window_ms() -> u64 {
    DEFAULT_GRACE_WINDOW_MS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_settle_ms() -> u64 {
    DEFAULT_SETTLE_MS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: default_service_url(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            disable_security: false,
            window: WindowConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: default_navigation_timeout_ms(),
            element_timeout_ms: default_element_timeout_ms(),
            grace_window_ms: default_grace_window_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl ServiceConfig {
    /// Origin identifier reported in every response: the URL's host.
    pub fn source(&self) -> String {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.url.clone())
    }
}

impl TimingConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn detector(&self) -> DetectorConfig {
        DetectorConfig {
            grace_window: Duration::from_millis(self.grace_window_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.service.url)
            .with_context(|| format!("service.url '{}' is not a valid URL", self.service.url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("service.url must use http or https, got '{}'", url.scheme());
        }
        if !(50..1000).contains(&self.timing.poll_interval_ms) {
            anyhow::bail!(
                "timing.poll_interval_ms must be between 50 and 999, got {}",
                self.timing.poll_interval_ms
            );
        }
        if self.timing.navigation_timeout_ms == 0 || self.timing.element_timeout_ms == 0 {
            anyhow::bail!("timing.navigation_timeout_ms and timing.element_timeout_ms must be positive");
        }
        if self.locators.input.is_empty() || self.locators.answer.is_empty() {
            anyhow::bail!("locators.input and locators.answer must not be empty");
        }
        Ok(())
    }
}

/// Load config from YAML.
///
/// An explicit `path` must exist. Otherwise `$ALCF_MCP_CONFIG`, then
/// `./config.yaml`; a missing default file yields the built-in defaults.
pub fn load_yaml_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let (config_path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match std::env::var_os(CONFIG_ENV) {
            Some(p) => (PathBuf::from(p), true),
            None => (PathBuf::from("config.yaml"), false),
        },
    };

    let config = if config_path.exists() {
        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        serde_yaml::from_str::<Config>(&contents)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?
    } else if required {
        anyhow::bail!("Config file {} does not exist", config_path.display());
    } else {
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

pub use driver::{ChatSession, ChromeLauncher, GenerationProbe, SessionLauncher};
pub use orchestrator::QueryOrchestrator;
pub use query::{OutputFormat, Query, RunOptions, SystemName};
pub use server::AlcfServer;
pub use shaper::{Response, ShapedResponse};
pub use tools::{ALCF_ASK_QUESTION, ALCF_GET_SYSTEM_INFO, AskQuestionArgs, SystemInfoArgs};
pub use utils::constants;
pub use utils::{AskError, ErrorKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_ask_alcf() {
        let config = Config::default();
        assert_eq!(config.service.url, "https://ask.alcf.anl.gov");
        assert_eq!(config.service.source(), "ask.alcf.anl.gov");
        assert!(config.browser.headless);
        assert_eq!(config.timing.navigation_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "timing:\n  grace_window_ms: 2000\nbrowser:\n  headless: false\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.timing.detector().grace_window, Duration::from_secs(2));
        assert_eq!(config.timing.poll_interval_ms, 500);
        assert!(!config.browser.headless);
        assert_eq!(config.browser.window.width, 1280);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = Config::default();
        config.timing.poll_interval_ms = 1000;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.service.url = "ftp://ask.alcf.anl.gov".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let missing = std::env::temp_dir().join(format!("alcf_mcp_missing_{}.yaml", uuid::Uuid::new_v4()));
        assert!(load_yaml_config(Some(&missing)).is_err());
    }
}
