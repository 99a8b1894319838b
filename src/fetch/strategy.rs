//! Fetch strategy orchestration
//!
//! The orchestrator owns one pooled client per mechanism and walks an ordered list of
//! mechanisms for each fetch, escalating only on transient failures.

use crate::config::{Config, Deployment};
use crate::fetch::fetcher::{
    build_browser_client, build_direct_client, build_proxy_client, fetch_once,
    proxy_request_url, AttemptFailure, FetchedPage,
};
use crate::JobFetchError;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use url::Url;

/// A way of getting a page from the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mechanism {
    /// Plain request from this process
    Direct,
    /// Request routed through the scraping-proxy API
    Proxy,
    /// Request with a full browser header set and a cookie store
    BrowserEmulation,
}

impl Mechanism {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Proxy => "proxy",
            Self::BrowserEmulation => "browser-emulation",
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single attempt as recorded in the attempt log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success { status_code: u16, body_len: usize },
    TransientFailure { reason: String },
    PermanentFailure { status_code: u16 },
}

/// One rung of the resilience ladder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    pub mechanism: Mechanism,
    pub outcome: AttemptOutcome,
}

/// Returns the mechanisms to try, in order
///
/// # Order
///
/// | Deployment | Order |
/// |------------|-------|
/// | Production | proxy → browser emulation → direct |
/// | Local | direct → proxy → browser emulation |
///
/// The proxy is left out entirely when no API key is configured.
pub fn mechanism_order(deployment: Deployment, proxy_enabled: bool) -> Vec<Mechanism> {
    let order: &[Mechanism] = match deployment {
        Deployment::Production => &[
            Mechanism::Proxy,
            Mechanism::BrowserEmulation,
            Mechanism::Direct,
        ],
        Deployment::Local => &[
            Mechanism::Direct,
            Mechanism::Proxy,
            Mechanism::BrowserEmulation,
        ],
    };

    order
        .iter()
        .copied()
        .filter(|m| proxy_enabled || *m != Mechanism::Proxy)
        .collect()
}

/// Maps a non-success HTTP status on the target page to a user-facing error
pub fn status_error(url: &str, status_code: u16) -> JobFetchError {
    let url = url.to_string();
    match status_code {
        403 => JobFetchError::Blocked { url },
        404 => JobFetchError::NotFound { url },
        429 => JobFetchError::RateLimited { url },
        status => JobFetchError::Http { url, status },
    }
}

/// Runs fetch mechanisms in environment-dependent order
///
/// The orchestrator is immutable after construction; clients are connection-pooled and
/// safe to share between tasks.
pub struct FetchOrchestrator {
    config: Config,
    order: Vec<Mechanism>,
    direct: Client,
    browser: Client,
    proxy: Client,
}

impl FetchOrchestrator {
    /// Creates an orchestrator for the given configuration
    ///
    /// # Returns
    ///
    /// * `Ok(FetchOrchestrator)` - All clients were built
    /// * `Err(JobFetchError)` - A client could not be built from the configuration
    pub fn new(config: &Config) -> Result<Self, JobFetchError> {
        let order = mechanism_order(config.deployment, config.proxy.is_enabled());
        tracing::debug!(
            "Fetch order for {:?} deployment: {}",
            config.deployment,
            order
                .iter()
                .map(Mechanism::as_str)
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        Ok(Self {
            config: config.clone(),
            order,
            direct: build_direct_client(&config.fetch)?,
            browser: build_browser_client(&config.fetch)?,
            proxy: build_proxy_client(config)?,
        })
    }

    /// The mechanisms this orchestrator tries, in order
    pub fn order(&self) -> &[Mechanism] {
        &self.order
    }

    /// Fetches a page, escalating through the mechanisms on transient failures
    ///
    /// `timeout_cap` lowers every per-attempt timeout (used by the enrichment hop).
    pub async fn fetch(
        &self,
        url: &Url,
        headers: &HeaderMap,
        timeout_cap: Option<Duration>,
    ) -> Result<FetchedPage, JobFetchError> {
        self.fetch_with_report(url, headers, timeout_cap).await.0
    }

    /// Same as [`FetchOrchestrator::fetch`], also returning the attempt log
    ///
    /// # Escalation Rules
    ///
    /// | Attempt result | Action |
    /// |----------------|--------|
    /// | Success | Return the page |
    /// | HTTP 403, timeout, connection error | Try the next mechanism |
    /// | Any proxy API failure | Try the next mechanism |
    /// | HTTP 404, 429, other 4xx/5xx | Return the classified error immediately |
    /// | Ladder exhausted | `Blocked` if any target answered 403, else `Unreachable` |
    pub async fn fetch_with_report(
        &self,
        url: &Url,
        headers: &HeaderMap,
        timeout_cap: Option<Duration>,
    ) -> (Result<FetchedPage, JobFetchError>, Vec<FetchAttempt>) {
        let mut attempts = Vec::with_capacity(self.order.len());
        let mut blocked = false;

        for &mechanism in &self.order {
            tracing::debug!("Fetching {} via {}", url, mechanism);

            match self.attempt(mechanism, url, headers, timeout_cap).await {
                Ok(page) => {
                    tracing::info!(
                        "Fetched {} via {} ({} bytes, HTTP {})",
                        url,
                        mechanism,
                        page.body.len(),
                        page.status_code
                    );
                    attempts.push(FetchAttempt {
                        mechanism,
                        outcome: AttemptOutcome::Success {
                            status_code: page.status_code,
                            body_len: page.body.len(),
                        },
                    });
                    return (Ok(page), attempts);
                }
                Err(AttemptFailure::Transient {
                    reason,
                    status_code,
                }) => {
                    tracing::warn!("{} fetch of {} failed ({}), escalating", mechanism, url, reason);
                    blocked |= status_code == Some(403);
                    attempts.push(FetchAttempt {
                        mechanism,
                        outcome: AttemptOutcome::TransientFailure { reason },
                    });
                }
                Err(AttemptFailure::Permanent { status_code }) => {
                    tracing::warn!(
                        "{} fetch of {} returned HTTP {}, not escalating",
                        mechanism,
                        url,
                        status_code
                    );
                    attempts.push(FetchAttempt {
                        mechanism,
                        outcome: AttemptOutcome::PermanentFailure { status_code },
                    });
                    return (Err(status_error(url.as_str(), status_code)), attempts);
                }
            }
        }

        tracing::warn!(
            "All {} fetch mechanisms failed for {}",
            attempts.len(),
            url
        );
        let url = url.to_string();
        let error = if blocked {
            JobFetchError::Blocked { url }
        } else {
            JobFetchError::Unreachable { url }
        };
        (Err(error), attempts)
    }

    async fn attempt(
        &self,
        mechanism: Mechanism,
        url: &Url,
        headers: &HeaderMap,
        timeout_cap: Option<Duration>,
    ) -> Result<FetchedPage, AttemptFailure> {
        let cap = |timeout: Duration| timeout_cap.map_or(timeout, |c| c.min(timeout));

        match mechanism {
            Mechanism::Direct => {
                fetch_once(&self.direct, url, headers, cap(self.config.fetch.timeout())).await
            }
            Mechanism::BrowserEmulation => {
                fetch_once(&self.browser, url, headers, cap(self.config.fetch.timeout())).await
            }
            Mechanism::Proxy => self.attempt_proxy(url, cap(self.config.proxy.timeout())).await,
        }
    }

    /// Proxy failures describe the proxy service rather than the target page, so they
    /// are all reported as transient and never as a target 403
    async fn attempt_proxy(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, AttemptFailure> {
        let request_url = proxy_request_url(&self.config.proxy, url).ok_or_else(|| {
            AttemptFailure::Transient {
                reason: "proxy not configured".to_string(),
                status_code: None,
            }
        })?;

        // Extra headers stay with the direct mechanisms; the proxy sets its own.
        match fetch_once(&self.proxy, &request_url, &HeaderMap::new(), timeout).await {
            Ok(mut page) => {
                page.final_url = url.to_string();
                Ok(page)
            }
            Err(AttemptFailure::Transient { reason, .. }) => Err(AttemptFailure::Transient {
                reason: format!("proxy: {}", reason),
                status_code: None,
            }),
            Err(AttemptFailure::Permanent { status_code }) => Err(AttemptFailure::Transient {
                reason: format!("proxy answered HTTP {}", status_code),
                status_code: None,
            }),
        }
    }
}
