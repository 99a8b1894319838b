//! Heuristic parser for pages no board parser claims
//!
//! Fields are collected in phases of decreasing reliability. A field set by an earlier
//! phase is never overwritten by a later one.
//!
//! | Phase | Source |
//! |-------|--------|
//! | 1 | JSON-LD `JobPosting` |
//! | 2 | OpenGraph `og:title`, `og:description`, `og:site_name` |
//! | 3 | `<meta name="title|description|author">` |
//! | 4 | `<title>` split into job title and company |
//! | 5 | CSS class and test-id patterns |
//! | 6 | First `<h1>`, then a company derived from the domain once a title is known |
//!
//! Salary, requirements and contact details come from text scans afterwards.

use crate::extract::{
    clean_text, element_text, meta_content, section_after_heading, select_text,
};
use crate::parsers::{complete_from_text, extract_json_ld};
use crate::posting::PartialPosting;
use crate::url::company_from_domain;
use scraper::{Html, Selector};
use url::Url;

/// Separators between job title and company in `<title>`, tried in order
const TITLE_SEPARATORS: &[&str] = &[" - ", "|", " at ", " bei "];

/// Badge and tag texts recognized as employment types
const EMPLOYMENT_KEYWORDS: &[&str] = &[
    "vollzeit",
    "teilzeit",
    "full-time",
    "full time",
    "part-time",
    "part time",
    "minijob",
    "werkstudent",
    "praktikum",
    "internship",
    "ausbildung",
    "befristet",
    "unbefristet",
    "festanstellung",
    "freelance",
    "freiberuflich",
    "contract",
    "remote",
];

/// Headings that introduce the requirements section
const REQUIREMENT_HEADINGS: &[&str] = &[
    "profil",
    "anforderungen",
    "voraussetzungen",
    "qualifikation",
    "das bringst du mit",
    "das bringen sie mit",
    "was du mitbringst",
    "was sie mitbringen",
    "requirements",
    "qualifications",
    "your profile",
    "what you bring",
];

const TITLE_PATTERNS: &[&str] = &[
    "[class*='job-title']",
    "[data-testid*='job-title']",
    "[id*='job-title']",
];

const COMPANY_PATTERNS: &[&str] = &[
    "[class*='company-name']",
    "[data-testid*='company-name']",
    "[class*='employer-name']",
];

const LOCATION_PATTERNS: &[&str] = &[
    "[class*='job-location']",
    "[data-testid*='job-location']",
    "[id*='job-location']",
];

const DESCRIPTION_PATTERNS: &[&str] = &[
    "[class*='job-description']",
    "[data-testid*='job-description']",
    "[id*='job-description']",
];

const BADGE_PATTERNS: &str = "[class*='badge'], [class*='tag'], [class*='employment-type']";

/// Splits a page title into job title and company
///
/// The first separator that occurs with text on both sides wins.
///
/// # Examples
///
/// ```
/// use jobfetch::parsers::split_title;
///
/// assert_eq!(
///     split_title("Data Engineer | Acme GmbH"),
///     Some(("Data Engineer".to_string(), "Acme GmbH".to_string()))
/// );
/// assert_eq!(split_title("Karriere"), None);
/// ```
pub fn split_title(title: &str) -> Option<(String, String)> {
    TITLE_SEPARATORS.iter().find_map(|separator| {
        let (job, company) = title.split_once(separator)?;
        Some((clean_text(job)?, clean_text(company)?))
    })
}

/// Parser of last resort, claimed by no board
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericParser;

impl GenericParser {
    /// Extracts what the page offers; absent data leaves fields unset
    ///
    /// `denylist` adds board system addresses to the generic email filter.
    pub fn parse(&self, document: &Html, url: &Url, denylist: &[&str]) -> PartialPosting {
        let mut fields = extract_json_ld(document).unwrap_or_default();

        fields.fill_missing(open_graph(document));
        fields.fill_missing(meta_tags(document));
        fields.fill_missing(title_tag(document));
        fields.fill_missing(css_patterns(document));
        fields.fill_missing(heuristics(document));

        // A domain alone does not make a posting.
        if fields.company.is_none() && fields.title.is_some() {
            fields.company = url.host_str().and_then(company_from_domain);
        }

        if fields.requirements.is_none() {
            fields.requirements = section_after_heading(document, REQUIREMENT_HEADINGS);
        }
        complete_from_text(&mut fields, document, denylist);

        fields
    }
}

fn open_graph(document: &Html) -> PartialPosting {
    PartialPosting {
        title: meta_content(document, "property", "og:title"),
        description: meta_content(document, "property", "og:description"),
        company: meta_content(document, "property", "og:site_name"),
        ..Default::default()
    }
}

fn meta_tags(document: &Html) -> PartialPosting {
    PartialPosting {
        title: meta_content(document, "name", "title"),
        description: meta_content(document, "name", "description"),
        company: meta_content(document, "name", "author"),
        ..Default::default()
    }
}

fn title_tag(document: &Html) -> PartialPosting {
    let title = select_text(document, &["title"]);
    match title.as_deref().and_then(split_title) {
        Some((title, company)) => PartialPosting {
            title: Some(title),
            company: Some(company),
            ..Default::default()
        },
        None => PartialPosting {
            title,
            ..Default::default()
        },
    }
}

fn css_patterns(document: &Html) -> PartialPosting {
    PartialPosting {
        title: select_text(document, TITLE_PATTERNS),
        company: select_text(document, COMPANY_PATTERNS),
        location: select_text(document, LOCATION_PATTERNS),
        description: select_text(document, DESCRIPTION_PATTERNS),
        employment_type: employment_badges(document),
        ..Default::default()
    }
}

/// Collects short badge texts that name an employment type
fn employment_badges(document: &Html) -> Option<String> {
    let selector = Selector::parse(BADGE_PATTERNS).ok()?;

    let mut found: Vec<String> = Vec::new();
    for badge in document.select(&selector) {
        let Some(text) = element_text(badge) else {
            continue;
        };
        if text.chars().count() > 40 {
            continue;
        }
        let lower = text.to_lowercase();
        if EMPLOYMENT_KEYWORDS.iter().any(|k| lower.contains(k)) && !found.contains(&text) {
            found.push(text);
        }
    }

    clean_text(&found.join(", "))
}

fn heuristics(document: &Html) -> PartialPosting {
    PartialPosting {
        title: select_text(document, &["h1"]),
        ..Default::default()
    }
}
