//! Fetch layer for job pages
//!
//! This module contains everything that touches the network:
//! - Single GET attempts with outcome classification (`fetcher`)
//! - The environment-dependent resilience ladder (`strategy`)

mod fetcher;
mod strategy;

pub use fetcher::{
    build_browser_client, build_direct_client, build_proxy_client, classify_status, fetch_once,
    proxy_request_url, AttemptFailure, FetchedPage,
};
pub use strategy::{
    mechanism_order, status_error, AttemptOutcome, FetchAttempt, FetchOrchestrator, Mechanism,
};
