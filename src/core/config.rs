use crate::errors::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub site: SiteConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub args: Vec<String>,
    pub navigation_timeout_ms: u64,
    pub element_timeout_ms: u64,
    /// Delay inserted after every page interaction, for recordings.
    pub slow_mo_ms: u64,
}

/// Where to go and what to wait for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub search_selector: String,
    pub query: String,
    pub infobox_selector: String,
    pub row_selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub highlight: bool,
    pub highlight_pause_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Config {
    /// Reads a JSON config; missing fields fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Visible browser, slowed down so a screen recording can follow along.
    pub fn demo() -> Self {
        let mut config = Config::default();
        config.browser.headless = false;
        config.browser.slow_mo_ms = 2000;
        config
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.site.base_url).map_err(|e| {
            ProbeError::ConfigurationError(format!(
                "invalid base_url '{}': {}",
                self.site.base_url, e
            ))
        })?;

        for (name, value) in [
            ("search_selector", &self.site.search_selector),
            ("infobox_selector", &self.site.infobox_selector),
            ("row_selector", &self.site.row_selector),
        ] {
            if value.trim().is_empty() {
                return Err(ProbeError::ConfigurationError(format!(
                    "{} must not be empty",
                    name
                )));
            }
        }

        for (name, value) in [
            ("navigation_timeout_ms", self.browser.navigation_timeout_ms),
            ("element_timeout_ms", self.browser.element_timeout_ms),
        ] {
            if value == 0 {
                return Err(ProbeError::ConfigurationError(format!(
                    "{} must be positive",
                    name
                )));
            }
        }

        Ok(())
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            user_agent: None,
            args: vec![],
            navigation_timeout_ms: 30000,
            element_timeout_ms: 30000,
            slow_mo_ms: 0,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ru.wikipedia.org/".to_string(),
            search_selector: "input[name='search']".to_string(),
            query: "Земля".to_string(),
            infobox_selector: "table.infobox".to_string(),
            row_selector: "tr".to_string(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            highlight: true,
            highlight_pause_ms: 3000,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}
