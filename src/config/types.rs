use serde::Deserialize;
use std::time::Duration;

/// Default per-attempt timeout for every fetch mechanism
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default per-attempt timeout while following an enrichment link
pub const DEFAULT_ENRICHMENT_TIMEOUT_SECS: u64 = 5;

/// Default endpoint of the scraping-proxy API
pub const DEFAULT_PROXY_ENDPOINT: &str = "https://api.scraperapi.com/";

/// Desktop Chrome user agent used by the direct and browser-emulation mechanisms
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Main configuration structure for jobfetch
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub deployment: Deployment,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// Where the process runs, which decides the order of fetch mechanisms
///
/// Production deployments are assumed to run from a data-center IP that job portals
/// block readily; local deployments are assumed to have a residential IP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    Production,
    #[default]
    Local,
}

impl Deployment {
    /// Parses a deployment name as found in environment variables
    ///
    /// Only `production` and `prod` select [`Deployment::Production`]; everything else
    /// is treated as local.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Local,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// HTTP behavior shared by all fetch mechanisms
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-attempt timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Per-attempt timeout in seconds during the enrichment hop
    #[serde(rename = "enrichment-timeout-secs")]
    pub enrichment_timeout_secs: u64,

    /// TCP connect timeout in seconds
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Upper bound on the length of extracted raw text, in characters
    #[serde(rename = "max-text-chars")]
    pub max_text_chars: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            enrichment_timeout_secs: DEFAULT_ENRICHMENT_TIMEOUT_SECS,
            connect_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "de-DE,de;q=0.9,en;q=0.8".to_string(),
            max_text_chars: 20_000,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.enrichment_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Scraping-proxy API configuration
///
/// The proxy mechanism only runs when `api_key` is set. `render_js` and `premium`
/// are billed at a multiple of a plain request and stay off unless enabled here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    #[serde(rename = "api-key")]
    pub api_key: Option<String>,

    pub endpoint: String,

    /// Two-letter country code for the exit IP
    #[serde(rename = "country-code")]
    pub country_code: Option<String>,

    #[serde(rename = "render-js")]
    pub render_js: bool,

    pub premium: bool,

    /// Per-attempt timeout in seconds for proxied requests
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_PROXY_ENDPOINT.to_string(),
            country_code: Some("de".to_string()),
            render_js: false,
            premium: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ProxyConfig {
    /// Returns true when an API key is configured
    pub fn is_enabled(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
