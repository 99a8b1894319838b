//! Configuration module for jobfetch
//!
//! This module handles loading, parsing, and validating TOML configuration files, and
//! overlaying the proxy key and deployment name from the process environment.
//!
//! # Example
//!
//! ```no_run
//! use jobfetch::config::load_config;
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("jobfetch.toml")).unwrap();
//! config.apply_env_overrides();
//! println!("Proxy enabled: {}", config.proxy.is_enabled());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, Deployment, FetchConfig, ProxyConfig, DEFAULT_ENRICHMENT_TIMEOUT_SECS,
    DEFAULT_PROXY_ENDPOINT, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_config, parse_config, DEPLOYMENT_ENV, PROXY_KEY_ENV};
pub use validation::validate;
