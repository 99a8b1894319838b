use crate::config::types::{Config, Deployment};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable holding the scraping-proxy API key
pub const PROXY_KEY_ENV: &str = "JOBFETCH_PROXY_API_KEY";

/// Environment variables consulted, in order, for the deployment name
pub const DEPLOYMENT_ENV: &[&str] = &["JOBFETCH_ENV", "ENVIRONMENT"];

/// Loads and parses a configuration file from the given path
///
/// Missing sections and keys fall back to their defaults, so an empty file is a valid
/// configuration.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use jobfetch::config::load_config;
///
/// let config = load_config(Path::new("jobfetch.toml")).unwrap();
/// println!("Timeout: {}s", config.fetch.timeout_secs);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

impl Config {
    /// Overlays process environment settings on top of this configuration
    ///
    /// `JOBFETCH_PROXY_API_KEY` replaces the proxy key, and the first of
    /// `JOBFETCH_ENV` / `ENVIRONMENT` that is set decides the deployment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Same as [`Config::apply_env_overrides`] with an injectable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(PROXY_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.proxy.api_key = Some(key.trim().to_string());
        }

        if let Some(name) = DEPLOYMENT_ENV.iter().find_map(|var| lookup(var)) {
            self.deployment = Deployment::from_name(&name);
        }
    }

    /// Builds the default configuration with environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        validate(&config)?;
        Ok(config)
    }
}
