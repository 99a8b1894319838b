//! Parser for Indeed postings

use crate::extract::{element_text, select_text};
use crate::parsers::{complete_from_text, extract_json_ld, BoardId, JobBoardParser, ParseError};
use crate::posting::PartialPosting;
use crate::url::host_matches;
use scraper::{Html, Selector};
use url::Url;

const HOSTS: &[&str] = &["indeed.com", "indeed.de"];

/// Paths that show a single posting when given a job key
const POSTING_PATHS: &[&str] = &["/viewjob", "/rc/clk", "/pagead/clk", "/m/viewjob"];

const TITLE_SELECTORS: &[&str] = &[
    "h1.jobsearch-JobInfoHeader-title",
    "[data-testid='jobsearch-JobInfoHeader-title']",
    "h1",
];
const COMPANY_SELECTORS: &[&str] = &[
    "[data-testid='inlineHeader-companyName']",
    "[data-company-name='true']",
    ".jobsearch-CompanyInfoContainer a",
];
const LOCATION_SELECTORS: &[&str] = &[
    "[data-testid='inlineHeader-companyLocation']",
    "[data-testid='job-location']",
    "[data-testid='jobsearch-JobInfoHeader-companyLocation']",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct IndeedParser;

impl JobBoardParser for IndeedParser {
    fn id(&self) -> BoardId {
        BoardId::Indeed
    }

    fn matches(&self, url: &Url) -> bool {
        let on_board = url
            .host_str()
            .is_some_and(|host| HOSTS.iter().any(|base| host_matches(host, base)));
        let has_job_key = url
            .query_pairs()
            .any(|(key, value)| (key == "jk" || key == "vjk") && !value.is_empty());

        on_board && has_job_key && POSTING_PATHS.contains(&url.path())
    }

    fn parse(&self, document: &Html, _url: &Url) -> Result<PartialPosting, ParseError> {
        let mut fields = extract_json_ld(document).unwrap_or_default();
        fields.fill_missing(landmarks(document));
        complete_from_text(&mut fields, document, self.email_denylist());
        Ok(fields)
    }

    fn email_denylist(&self) -> &'static [&'static str] {
        &["@indeed.com", "@indeed.de"]
    }
}

fn landmarks(document: &Html) -> PartialPosting {
    let (salary, employment_type) = salary_and_job_type(document);

    PartialPosting {
        title: select_text(document, TITLE_SELECTORS),
        company: select_text(document, COMPANY_SELECTORS),
        location: select_text(document, LOCATION_SELECTORS),
        description: select_text(document, &["#jobDescriptionText"]),
        salary,
        employment_type,
        ..Default::default()
    }
}

/// Splits the `#salaryInfoAndJobType` spans into salary and job type
///
/// The salary span is the one carrying a digit.
fn salary_and_job_type(document: &Html) -> (Option<String>, Option<String>) {
    let Ok(selector) = Selector::parse("#salaryInfoAndJobType span") else {
        return (None, None);
    };

    let mut salary = None;
    let mut job_type = None;
    for text in document.select(&selector).filter_map(element_text) {
        let text = text.trim_start_matches('-').trim().to_string();
        if text.is_empty() {
            continue;
        }
        if text.chars().any(|c| c.is_ascii_digit()) {
            salary.get_or_insert(text);
        } else {
            job_type.get_or_insert(text);
        }
    }

    (salary, job_type)
}
