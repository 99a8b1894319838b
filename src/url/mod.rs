//! URL handling module for jobfetch
//!
//! This module rewrites known search-result URLs to canonical posting URLs and
//! provides the host classification used to avoid naming a job board or
//! applicant-tracking vendor as the employer.

mod domain;
mod normalize;

pub use domain::{company_from_domain, host_matches, is_job_platform_host, strip_www};
pub use normalize::{normalize_job_url, parse_job_url};
