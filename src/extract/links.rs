//! Link and contact extraction
//!
//! Works on its own cleaned copy of the page: navigation, header, footer and script
//! noise is detached before any link or text is collected, so the document the
//! parsers see is never modified.

use crate::extract::text::{document_text, element_text, truncate_chars};
use crate::posting::{EmailLink, PageLink, RawJobPosting};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static NOISE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script, style, noscript, nav, header, footer").expect("valid noise selector")
});

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// Substrings of hrefs or anchor texts that mark an application link
const APPLICATION_KEYWORDS: &[&str] = &["apply", "bewerb", "karriere", "career", "application"];

/// Parses the page and detaches every noise element
pub fn cleaned_document(html: &str) -> Html {
    let mut document = Html::parse_document(html);

    let noise: Vec<_> = document.select(&NOISE_SELECTOR).map(|el| el.id()).collect();
    for id in noise {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    document
}

/// Extracts links, mailto contacts and the page text
///
/// # Link Rules
///
/// - `javascript:`, `data:` and fragment-only hrefs are skipped
/// - `mailto:` hrefs are kept as-is and also yield one [`EmailLink`] per address
/// - Other hrefs are resolved against `base_url`; only http(s) results are kept
/// - Every list keeps first-seen order without duplicates
pub fn extract_page_content(html: &str, base_url: &Url, max_text_chars: usize) -> RawJobPosting {
    let document = cleaned_document(html);

    let mut all_links = Vec::new();
    let mut email_links = Vec::new();
    let mut application_links = Vec::new();
    let mut seen_links = HashSet::new();
    let mut seen_emails = HashSet::new();
    let mut seen_applications = HashSet::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        let text = element_text(anchor).unwrap_or_default();

        if let Some(addresses) = mailto_addresses(href) {
            if seen_links.insert(href.to_string()) {
                all_links.push(href.to_string());
            }
            for email in addresses {
                if seen_emails.insert(email.clone()) {
                    email_links.push(EmailLink {
                        email,
                        text: text.clone(),
                    });
                }
            }
            continue;
        }

        let Some(absolute) = resolve_link(href, base_url) else {
            continue;
        };

        if is_application_link(&absolute, &text) && seen_applications.insert(absolute.clone()) {
            application_links.push(PageLink {
                url: absolute.clone(),
                text,
            });
        }
        if seen_links.insert(absolute.clone()) {
            all_links.push(absolute);
        }
    }

    let text = document_text(&document);
    let text = truncate_chars(&text, max_text_chars).to_string();

    RawJobPosting {
        text,
        all_links,
        email_links,
        application_links,
        source_url: base_url.to_string(),
    }
}

/// Returns the addresses of a `mailto:` href, or `None` for other hrefs
pub(crate) fn mailto_addresses(href: &str) -> Option<Vec<String>> {
    let scheme = href.get(..7)?;
    if !scheme.eq_ignore_ascii_case("mailto:") {
        return None;
    }

    let target = href[7..].split('?').next().unwrap_or_default();
    let addresses = target
        .split(',')
        .map(|address| address.trim().replace("%40", "@"))
        .filter(|address| address.contains('@'))
        .collect();

    Some(addresses)
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns `None` for special schemes, fragment-only anchors and invalid URLs.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("tel:") || lower.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute.to_string()),
        _ => None,
    }
}

fn is_application_link(url: &str, text: &str) -> bool {
    let url = url.to_lowercase();
    let text = text.to_lowercase();
    APPLICATION_KEYWORDS
        .iter()
        .any(|keyword| url.contains(keyword) || text.contains(keyword))
}
