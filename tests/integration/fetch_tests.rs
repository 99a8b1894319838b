//! Integration tests for the fetch orchestrator
//!
//! These tests use wiremock to stand in for both the job portal and the
//! scraping-proxy API, and check how the orchestrator escalates between mechanisms.

use jobfetch::config::{Config, Deployment};
use jobfetch::fetch::{AttemptOutcome, FetchOrchestrator, Mechanism};
use jobfetch::JobFetchError;
use reqwest::header::HeaderMap;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JOB_PAGE: &str = "<html><head><title>Koch (m/w/d)</title></head><body><h1>Koch</h1></body></html>";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("jobfetch=debug")
        .with_test_writer()
        .try_init();
}

/// Creates a configuration whose proxy endpoint points at the mock server
fn create_test_config(server: &MockServer, deployment: Deployment, with_proxy: bool) -> Config {
    let mut config = Config::default();
    config.deployment = deployment;
    config.fetch.timeout_secs = 2;
    config.fetch.enrichment_timeout_secs = 1;
    config.proxy.endpoint = format!("{}/proxy", server.uri());
    config.proxy.timeout_secs = 2;
    if with_proxy {
        config.proxy.api_key = Some("test-key".to_string());
    }
    config
}

fn job_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/job/42", server.uri())).unwrap()
}

fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body, "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_direct_fetch_succeeds() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/42"))
        .respond_with(html_response(JOB_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Deployment::Local, false);
    let orchestrator = FetchOrchestrator::new(&config).unwrap();
    let page = orchestrator
        .fetch(&job_url(&server), &HeaderMap::new(), None)
        .await
        .unwrap();

    assert_eq!(page.status_code, 200);
    assert_eq!(page.body, JOB_PAGE);
    assert!(page.content_type.starts_with("text/html"));
    assert_eq!(page.final_url, job_url(&server).to_string());
}

#[tokio::test]
async fn test_not_found_does_not_escalate() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/42"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/proxy"))
        .respond_with(html_response(JOB_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Deployment::Local, true);
    let orchestrator = FetchOrchestrator::new(&config).unwrap();
    let (result, attempts) = orchestrator
        .fetch_with_report(&job_url(&server), &HeaderMap::new(), None)
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, JobFetchError::NotFound { .. }), "{:?}", err);
    assert!(err.to_string().contains("check the URL"));
    assert_eq!(attempts.len(), 1);
    assert_eq!(
        attempts[0].outcome,
        AttemptOutcome::PermanentFailure { status_code: 404 }
    );
}

#[tokio::test]
async fn test_rate_limit_does_not_escalate() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/42"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Deployment::Local, false);
    let orchestrator = FetchOrchestrator::new(&config).unwrap();
    let err = orchestrator
        .fetch(&job_url(&server), &HeaderMap::new(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, JobFetchError::RateLimited { .. }), "{:?}", err);
    assert_eq!(err.status_code(), Some(429));
}

#[tokio::test]
async fn test_forbidden_escalates_to_proxy() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/42"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/proxy"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("country_code", "de"))
        .respond_with(html_response(JOB_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Deployment::Local, true);
    let orchestrator = FetchOrchestrator::new(&config).unwrap();
    let url = job_url(&server);
    let (result, attempts) = orchestrator
        .fetch_with_report(&url, &HeaderMap::new(), None)
        .await;

    let page = result.unwrap();
    assert_eq!(page.body, JOB_PAGE);
    // The proxied page reports the target, not the proxy API URL.
    assert_eq!(page.final_url, url.to_string());

    let mechanisms: Vec<Mechanism> = attempts.iter().map(|a| a.mechanism).collect();
    assert_eq!(mechanisms, vec![Mechanism::Direct, Mechanism::Proxy]);
}

#[tokio::test]
async fn test_forbidden_escalates_to_browser_emulation() {
    init_tracing();
    let server = MockServer::start().await;

    // Only a request carrying navigation headers gets past the wall.
    Mock::given(method("GET"))
        .and(path("/job/42"))
        .and(header("sec-fetch-mode", "navigate"))
        .respond_with(html_response(JOB_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/job/42"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Deployment::Local, false);
    let orchestrator = FetchOrchestrator::new(&config).unwrap();
    let (result, attempts) = orchestrator
        .fetch_with_report(&job_url(&server), &HeaderMap::new(), None)
        .await;

    assert_eq!(result.unwrap().body, JOB_PAGE);
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[1].mechanism, Mechanism::BrowserEmulation);
}

#[tokio::test]
async fn test_exhausted_ladder_after_forbidden_is_blocked() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/42"))
        .respond_with(ResponseTemplate::new(403))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/proxy"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Deployment::Local, true);
    let orchestrator = FetchOrchestrator::new(&config).unwrap();
    let (result, attempts) = orchestrator
        .fetch_with_report(&job_url(&server), &HeaderMap::new(), None)
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, JobFetchError::Blocked { .. }), "{:?}", err);
    assert!(err.suggests_manual_paste());
    assert_eq!(attempts.len(), 3);
    assert!(attempts
        .iter()
        .all(|a| matches!(a.outcome, AttemptOutcome::TransientFailure { .. })));
}

#[tokio::test]
async fn test_connection_errors_are_unreachable() {
    init_tracing();
    let server = MockServer::start().await;
    let config = create_test_config(&server, Deployment::Local, false);
    let url = job_url(&server);
    drop(server);

    let orchestrator = FetchOrchestrator::new(&config).unwrap();
    let err = orchestrator
        .fetch(&url, &HeaderMap::new(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, JobFetchError::Unreachable { .. }), "{:?}", err);
    assert!(err.to_string().contains("paste it manually"));
}

#[tokio::test]
async fn test_production_tries_proxy_first() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/proxy"))
        .respond_with(html_response(JOB_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/job/42"))
        .respond_with(html_response(JOB_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Deployment::Production, true);
    let orchestrator = FetchOrchestrator::new(&config).unwrap();
    let (result, attempts) = orchestrator
        .fetch_with_report(&job_url(&server), &HeaderMap::new(), None)
        .await;

    assert!(result.is_ok());
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].mechanism, Mechanism::Proxy);
}

#[tokio::test]
async fn test_timeouts_escalate_then_fail() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/42"))
        .respond_with(html_response(JOB_PAGE).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, Deployment::Local, false);
    config.fetch.timeout_secs = 1;
    let orchestrator = FetchOrchestrator::new(&config).unwrap();
    let (result, attempts) = orchestrator
        .fetch_with_report(&job_url(&server), &HeaderMap::new(), None)
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, JobFetchError::Unreachable { .. }), "{:?}", err);
    assert_eq!(attempts.len(), 2);
}

#[tokio::test]
async fn test_timeout_cap_applies() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/42"))
        .respond_with(html_response(JOB_PAGE).set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;

    let config = create_test_config(&server, Deployment::Local, false);
    let orchestrator = FetchOrchestrator::new(&config).unwrap();
    let url = job_url(&server);

    let capped = orchestrator
        .fetch(&url, &HeaderMap::new(), Some(Duration::from_millis(200)))
        .await;
    assert!(matches!(capped, Err(JobFetchError::Unreachable { .. })));

    let uncapped = orchestrator.fetch(&url, &HeaderMap::new(), None).await;
    assert!(uncapped.is_ok());
}

#[tokio::test]
async fn test_extra_headers_reach_target() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/42"))
        .and(header("x-requested-by", "jobfetch-test"))
        .respond_with(html_response(JOB_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Deployment::Local, false);
    let orchestrator = FetchOrchestrator::new(&config).unwrap();

    let mut headers = HeaderMap::new();
    headers.insert("x-requested-by", "jobfetch-test".parse().unwrap());
    let page = orchestrator
        .fetch(&job_url(&server), &headers, None)
        .await
        .unwrap();
    assert_eq!(page.status_code, 200);
}
