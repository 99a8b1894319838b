//! HTTP fetcher implementation
//!
//! This module executes single GET attempts for the fetch orchestrator:
//! - Building one pooled HTTP client per fetch mechanism
//! - Building scraping-proxy request URLs
//! - Classifying each outcome as success, transient or permanent failure

use crate::config::{Config, FetchConfig, ProxyConfig};
use crate::{ConfigError, JobFetchError};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL,
    UPGRADE_INSECURE_REQUESTS,
};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

const HTML_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects (the target URL for proxied requests)
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value, empty when absent
    pub content_type: String,
    /// Page body content
    pub body: String,
}

/// Why a single fetch attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Worth retrying with the next mechanism (403, timeout, connection error)
    Transient {
        reason: String,
        status_code: Option<u16>,
    },
    /// The target answered with an error that another mechanism will not change
    Permanent { status_code: u16 },
}

impl AttemptFailure {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Classifies an HTTP status
///
/// # Classification
///
/// | Status | Result |
/// |--------|--------|
/// | 2xx | `None` (success) |
/// | 403 | Transient: the portal blocked this client, another one may pass |
/// | 404, 429, other 4xx/5xx | Permanent |
pub fn classify_status(status: StatusCode) -> Option<AttemptFailure> {
    if status.is_success() {
        None
    } else if status == StatusCode::FORBIDDEN {
        Some(AttemptFailure::Transient {
            reason: "HTTP 403 Forbidden".to_string(),
            status_code: Some(status.as_u16()),
        })
    } else {
        Some(AttemptFailure::Permanent {
            status_code: status.as_u16(),
        })
    }
}

/// Classifies a request error; every network-level error is transient
fn classify_error(error: &reqwest::Error) -> AttemptFailure {
    let reason = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection error".to_string()
    } else {
        error.to_string()
    };

    AttemptFailure::Transient {
        reason,
        status_code: None,
    }
}

fn header_value(value: &str, field: &str) -> Result<HeaderValue, JobFetchError> {
    HeaderValue::from_str(value).map_err(|_| {
        JobFetchError::Config(ConfigError::Validation(format!(
            "{} is not a valid header value",
            field
        )))
    })
}

/// Builds the client for plain direct requests
///
/// Sends a desktop browser User-Agent with a German-first Accept-Language.
pub fn build_direct_client(config: &FetchConfig) -> Result<Client, JobFetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value(&config.accept_language, "fetch.accept-language")?,
    );

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Builds the browser-emulation client used to get past simple bot walls
///
/// Sends the complete header set of a top-level Chrome navigation and keeps cookies
/// between requests, so challenge cookies set by a first response are replayed.
pub fn build_browser_client(config: &FetchConfig) -> Result<Client, JobFetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value(&config.accept_language, "fetch.accept-language")?,
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-ch-ua"),
        HeaderValue::from_static(
            "\"Chromium\";v=\"124\", \"Google Chrome\";v=\"124\", \"Not-A.Brand\";v=\"99\"",
        ),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static("?0"),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-platform"),
        HeaderValue::from_static("\"Windows\""),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .cookie_store(true)
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Builds the client that talks to the scraping-proxy API
pub fn build_proxy_client(config: &Config) -> Result<Client, JobFetchError> {
    let client = Client::builder()
        .connect_timeout(config.fetch.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Builds the proxy API request URL for a target page
///
/// Returns `None` when no API key is configured.
pub fn proxy_request_url(config: &ProxyConfig, target: &Url) -> Option<Url> {
    let api_key = config.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;

    let mut params: Vec<(&str, &str)> = vec![("api_key", api_key), ("url", target.as_str())];
    if let Some(country) = config.country_code.as_deref() {
        params.push(("country_code", country));
    }
    if config.render_js {
        params.push(("render", "true"));
    }
    if config.premium {
        params.push(("premium", "true"));
    }

    Url::parse_with_params(&config.endpoint, &params).ok()
}

/// Executes one GET request and classifies the outcome
///
/// # Arguments
///
/// * `client` - The mechanism's pooled client
/// * `request_url` - The URL to request (the proxy API URL for proxied fetches)
/// * `headers` - Extra headers for this request only
/// * `timeout` - Upper bound for the whole attempt
pub async fn fetch_once(
    client: &Client,
    request_url: &Url,
    headers: &HeaderMap,
    timeout: Duration,
) -> Result<FetchedPage, AttemptFailure> {
    let response = client
        .get(request_url.clone())
        .headers(headers.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| classify_error(&e))?;

    let status = response.status();
    if let Some(failure) = classify_status(status) {
        return Err(failure);
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = response.text().await.map_err(|e| classify_error(&e))?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body,
    })
}
