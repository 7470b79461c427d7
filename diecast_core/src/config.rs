//! Process-wide configuration.
//!
//! Loaded once at startup and passed into the renderer, adapters and
//! aggregator at construction time. Every field has a default, so an empty
//! (or missing) config file yields a working setup.

use crate::error::ConfigError;
use crate::relevance::DEFAULT_RELEVANCE_THRESHOLD;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Default Values
// ============================================================================

/// Outer bound on a single adapter's whole fetch, in seconds.
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 120;

/// Page navigation timeout, in seconds.
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 30;

/// Readiness (selector wait) timeout, in seconds.
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";

pub const ENV_CONFIG_PATH: &str = "DIECAST_CONFIG";
pub const ENV_EBAY_CLIENT_ID: &str = "EBAY_CLIENT_ID";
pub const ENV_EBAY_CLIENT_SECRET: &str = "EBAY_CLIENT_SECRET";

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub source_timeout_secs: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            source_timeout_secs: DEFAULT_SOURCE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// WebDriver endpoint (e.g. `http://localhost:9515` for chromedriver).
    /// When unset, pages are fetched with plain HTTP instead.
    pub webdriver_url: Option<String>,
    pub navigation_timeout_secs: u64,
    pub ready_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            webdriver_url: None,
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            ready_timeout_secs: DEFAULT_READY_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl RenderConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }
}

/// Settings shared by the rendered-page adapters.
///
/// A config section only overrides the keys it names; everything else keeps
/// that shop's own default (see [`ShopOverrides`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopConfig {
    pub enabled: bool,

    pub base_url: String,

    pub relevance_threshold: u8,

    /// Upper bound on pages visited per search.
    pub max_pages: u32,

    /// Pause between sequential page loads.
    pub page_delay_ms: u64,

    /// Extra wait after the page reports ready, for late-loading prices.
    pub settle_ms: u64,
}

impl ShopConfig {
    fn new(base_url: &str, max_pages: u32, page_delay_ms: u64, settle_ms: u64) -> Self {
        Self {
            enabled: true,
            base_url: base_url.to_string(),
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            max_pages,
            page_delay_ms,
            settle_ms,
        }
    }

    pub fn stmdiecast() -> Self {
        Self::new("https://www.stmdiecast.com", 20, 2000, 0)
    }

    pub fn livecarmodel() -> Self {
        Self::new("https://livecarmodel.com", 10, 0, 2000)
    }

    pub fn replicarz() -> Self {
        Self::new("https://www.replicarz.com", 1, 0, 0)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// The keys present in one `[shop]` section.
#[derive(Debug, Default, Deserialize)]
struct ShopOverrides {
    enabled: Option<bool>,
    base_url: Option<String>,
    relevance_threshold: Option<u8>,
    max_pages: Option<u32>,
    page_delay_ms: Option<u64>,
    settle_ms: Option<u64>,
}

impl ShopOverrides {
    fn apply(self, mut shop: ShopConfig) -> ShopConfig {
        if let Some(enabled) = self.enabled {
            shop.enabled = enabled;
        }
        if let Some(base_url) = self.base_url {
            shop.base_url = base_url;
        }
        if let Some(threshold) = self.relevance_threshold {
            shop.relevance_threshold = threshold;
        }
        if let Some(max_pages) = self.max_pages {
            shop.max_pages = max_pages;
        }
        if let Some(delay) = self.page_delay_ms {
            shop.page_delay_ms = delay;
        }
        if let Some(settle) = self.settle_ms {
            shop.settle_ms = settle;
        }
        shop
    }
}

fn shop_section<'de, D>(deserializer: D, defaults: ShopConfig) -> Result<ShopConfig, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ShopOverrides::deserialize(deserializer)?.apply(defaults))
}

fn stmdiecast_section<'de, D: Deserializer<'de>>(d: D) -> Result<ShopConfig, D::Error> {
    shop_section(d, ShopConfig::stmdiecast())
}

fn livecarmodel_section<'de, D: Deserializer<'de>>(d: D) -> Result<ShopConfig, D::Error> {
    shop_section(d, ShopConfig::livecarmodel())
}

fn replicarz_section<'de, D: Deserializer<'de>>(d: D) -> Result<ShopConfig, D::Error> {
    shop_section(d, ShopConfig::replicarz())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EbayConfig {
    pub enabled: bool,
    pub api_base: String,
    pub token_url: String,
    pub scope: String,
    pub marketplace_id: String,
    pub limit: u32,
    pub request_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
}

impl Default for EbayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: "https://api.ebay.com".to_string(),
            token_url: "https://api.ebay.com/identity/v1/oauth2/token".to_string(),
            scope: "https://api.ebay.com/oauth/api_scope".to_string(),
            marketplace_id: "EBAY_US".to_string(),
            limit: 50,
            request_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            client_id: None,
            client_secret: None,
        }
    }
}

impl EbayConfig {
    pub fn has_credentials(&self) -> bool {
        matches!(
            (&self.client_id, &self.client_secret),
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty()
        )
    }
}

// ============================================================================
// DiecastConfig
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiecastConfig {
    pub aggregator: AggregatorConfig,
    pub render: RenderConfig,
    #[serde(deserialize_with = "stmdiecast_section")]
    pub stmdiecast: ShopConfig,
    #[serde(deserialize_with = "livecarmodel_section")]
    pub livecarmodel: ShopConfig,
    #[serde(deserialize_with = "replicarz_section")]
    pub replicarz: ShopConfig,
    pub ebay: EbayConfig,
}

impl Default for DiecastConfig {
    fn default() -> Self {
        Self {
            aggregator: AggregatorConfig::default(),
            render: RenderConfig::default(),
            stmdiecast: ShopConfig::stmdiecast(),
            livecarmodel: ShopConfig::livecarmodel(),
            replicarz: ShopConfig::replicarz(),
            ebay: EbayConfig::default(),
        }
    }
}

impl DiecastConfig {
    /// Default config file location (`~/.config/diecast/config.toml` on Unix).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("diecast").join("config.toml"))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolve the config source: explicit path, then `$DIECAST_CONFIG`, then
    /// the default location if it exists, then built-in defaults.
    /// Environment credential overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from);
        let path = explicit
            .map(Path::to_path_buf)
            .or(env_path)
            .or_else(|| Self::default_path().filter(|p| p.exists()));

        let mut config = match path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading configuration");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Fill eBay credentials from `EBAY_CLIENT_ID` / `EBAY_CLIENT_SECRET`.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup(ENV_EBAY_CLIENT_ID).filter(|v| !v.is_empty()) {
            self.ebay.client_id = Some(id);
        }
        if let Some(secret) = lookup(ENV_EBAY_CLIENT_SECRET).filter(|v| !v.is_empty()) {
            self.ebay.client_secret = Some(secret);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, shop) in [
            ("stmdiecast", &self.stmdiecast),
            ("livecarmodel", &self.livecarmodel),
            ("replicarz", &self.replicarz),
        ] {
            if shop.relevance_threshold > 100 {
                return Err(ConfigError::Invalid(format!(
                    "{}.relevance_threshold must be between 0 and 100 (got {})",
                    name, shop.relevance_threshold
                )));
            }
            if shop.max_pages == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{}.max_pages must be at least 1",
                    name
                )));
            }
            url::Url::parse(&shop.base_url).map_err(|e| {
                ConfigError::Invalid(format!("{}.base_url is not a valid URL: {}", name, e))
            })?;
        }

        if self.aggregator.source_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "aggregator.source_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.render.navigation_timeout_secs == 0 || self.render.ready_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "render timeouts must be greater than zero".to_string(),
            ));
        }
        if self.ebay.limit == 0 || self.ebay.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "ebay.limit and ebay.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
