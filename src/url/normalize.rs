use crate::UrlError;
use url::Url;

/// Host of the national employment service whose search URLs carry a posting id
const EMPLOYMENT_SERVICE_HOST: &str = "arbeitsagentur.de";

/// Canonical detail-page prefix on the employment service
const EMPLOYMENT_SERVICE_DETAIL: &str = "https://www.arbeitsagentur.de/jobsuche/jobdetail/";

/// Normalizes a job URL before it is fetched
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; prepend `https://` when the scheme is missing
///    (pasted URLs such as `www.stepstone.de/...`)
/// 2. Parse the URL; reject non-HTTP(S) schemes and URLs without a host
/// 3. Rewrite employment-service search results that carry an `id` query parameter
///    (`/jobsuche/suche?...&id=<refnr>`) to the posting's detail page
///
/// Every other URL passes through unchanged. Applying the function to its own output
/// returns the same URL.
///
/// # Examples
///
/// ```
/// use jobfetch::url::normalize_job_url;
///
/// let url = normalize_job_url(
///     "https://www.arbeitsagentur.de/jobsuche/suche?angebotsart=1&id=10000-1199512346-S",
/// )
/// .unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://www.arbeitsagentur.de/jobsuche/jobdetail/10000-1199512346-S"
/// );
/// ```
pub fn normalize_job_url(url_str: &str) -> Result<Url, UrlError> {
    let url = parse_job_url(url_str)?;

    if let Some(reference) = search_result_reference(&url) {
        let detail = format!("{}{}", EMPLOYMENT_SERVICE_DETAIL, reference);
        tracing::debug!("Rewrote search result URL {} to {}", url, detail);
        return Url::parse(&detail).map_err(|e| UrlError::Parse(e.to_string()));
    }

    Ok(url)
}

/// Parses a user-supplied job URL, tolerating a missing scheme
pub fn parse_job_url(url_str: &str) -> Result<Url, UrlError> {
    let trimmed = url_str.trim();

    let url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", trimmed))
            .map_err(|e| UrlError::Parse(e.to_string()))?,
        Err(e) => return Err(UrlError::Parse(e.to_string())),
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}

/// Returns the posting reference of an employment-service search URL, if any
fn search_result_reference(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    if host != EMPLOYMENT_SERVICE_HOST && !host.ends_with(".arbeitsagentur.de") {
        return None;
    }

    if !url.path().starts_with("/jobsuche/suche") {
        return None;
    }

    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty() && value.chars().all(is_reference_char))
}

fn is_reference_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
