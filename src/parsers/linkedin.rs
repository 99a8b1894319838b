//! Parser for LinkedIn job postings
//!
//! Covers both the public guest layout (`top-card-layout__*`) and the logged-in
//! unified top card (`job-details-jobs-unified-top-card__*`).

use crate::extract::{element_text, normalize_date, select_attr, select_text};
use crate::parsers::{complete_from_text, extract_json_ld, BoardId, JobBoardParser, ParseError};
use crate::posting::PartialPosting;
use crate::url::host_matches;
use scraper::{Html, Selector};
use url::Url;

const TITLE_SELECTORS: &[&str] = &[
    "h1.top-card-layout__title",
    ".job-details-jobs-unified-top-card__job-title",
    "h1[data-test-id='job-title']",
    ".jobs-unified-top-card__job-title",
];

const COMPANY_SELECTORS: &[&str] = &[
    "a.topcard__org-name-link",
    ".job-details-jobs-unified-top-card__company-name",
    ".top-card-layout__card .top-card-layout__second-subline a",
    ".jobs-unified-top-card__company-name",
];

const LOCATION_SELECTORS: &[&str] = &[
    ".topcard__flavor--bullet",
    ".job-details-jobs-unified-top-card__bullet",
    "[data-test-id='job-location']",
    ".jobs-unified-top-card__bullet",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    ".show-more-less-html__markup",
    ".jobs-box__html-content",
    ".jobs-description__container",
    ".description__text",
    "[data-test-id='job-description']",
];

/// Criteria subheaders naming the employment type, English and German UI
const EMPLOYMENT_CRITERIA: &[&str] = &["employment type", "beschäftigungsverhältnis"];

#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedInParser;

impl JobBoardParser for LinkedInParser {
    fn id(&self) -> BoardId {
        BoardId::LinkedIn
    }

    /// Matches `/jobs/view/{id}` and collection pages with a `currentJobId`
    fn matches(&self, url: &Url) -> bool {
        if !url
            .host_str()
            .is_some_and(|host| host_matches(host, "linkedin.com"))
        {
            return false;
        }

        let path = url.path();
        let view = path
            .strip_prefix("/jobs/view/")
            .is_some_and(|rest| !rest.trim_matches('/').is_empty());
        let selected = path.starts_with("/jobs/")
            && url
                .query_pairs()
                .any(|(key, value)| key == "currentJobId" && !value.is_empty());

        view || selected
    }

    fn parse(&self, document: &Html, _url: &Url) -> Result<PartialPosting, ParseError> {
        let mut fields = extract_json_ld(document).unwrap_or_default();
        fields.fill_missing(PartialPosting {
            title: select_text(document, TITLE_SELECTORS),
            company: select_text(document, COMPANY_SELECTORS),
            location: select_text(document, LOCATION_SELECTORS),
            description: select_text(document, DESCRIPTION_SELECTORS),
            posted_date: select_attr(document, "time[datetime]", "datetime")
                .and_then(|date| normalize_date(&date)),
            employment_type: job_criterion(document, EMPLOYMENT_CRITERIA),
            ..Default::default()
        });
        complete_from_text(&mut fields, document, self.email_denylist());
        Ok(fields)
    }

    fn email_denylist(&self) -> &'static [&'static str] {
        &["@linkedin.com"]
    }
}

/// Reads a value from the "job criteria" list of the guest layout
fn job_criterion(document: &Html, names: &[&str]) -> Option<String> {
    let item_selector = Selector::parse("li.description__job-criteria-item").ok()?;
    let header_selector = Selector::parse(".description__job-criteria-subheader").ok()?;
    let value_selector = Selector::parse(".description__job-criteria-text").ok()?;

    document.select(&item_selector).find_map(|item| {
        let header = item.select(&header_selector).next().and_then(element_text)?;
        if !names.contains(&header.to_lowercase().as_str()) {
            return None;
        }
        item.select(&value_selector).next().and_then(element_text)
    })
}
