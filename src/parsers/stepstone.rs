//! Parser for StepStone postings
//!
//! StepStone marks its layout with `data-at` attributes, which survive redesigns far
//! better than its generated class names.

use crate::extract::{clean_text, find_posted_date, normalize_date, select_text};
use crate::parsers::{complete_from_text, extract_json_ld, BoardId, JobBoardParser, ParseError};
use crate::posting::PartialPosting;
use crate::url::host_matches;
use scraper::Html;
use url::Url;

const HOSTS: &[&str] = &["stepstone.de", "stepstone.at", "stepstone.com"];

#[derive(Debug, Clone, Copy, Default)]
pub struct StepStoneParser;

impl JobBoardParser for StepStoneParser {
    fn id(&self) -> BoardId {
        BoardId::StepStone
    }

    /// Detail pages look like `/stellenangebote--{slug}--{id}-inline.html`
    fn matches(&self, url: &Url) -> bool {
        let on_board = url
            .host_str()
            .is_some_and(|host| HOSTS.iter().any(|base| host_matches(host, base)));
        let path = url.path();
        on_board && path.starts_with("/stellenangebote--") && path.ends_with(".html")
    }

    fn parse(&self, document: &Html, _url: &Url) -> Result<PartialPosting, ParseError> {
        let mut fields = extract_json_ld(document).unwrap_or_default();
        fields.fill_missing(landmarks(document));
        complete_from_text(&mut fields, document, self.email_denylist());
        Ok(fields)
    }

    fn email_denylist(&self) -> &'static [&'static str] {
        &["@stepstone.de", "@stepstone.at", "@stepstone.com"]
    }
}

fn landmarks(document: &Html) -> PartialPosting {
    let contract = select_text(document, &["[data-at='metadata-contract-type']"]);
    let work_type = select_text(document, &["[data-at='metadata-work-type']"]);
    let employment_type = match (contract, work_type) {
        (Some(contract), Some(work)) => clean_text(&format!("{}, {}", contract, work)),
        (contract, work) => contract.or(work),
    };

    let posted_date = select_text(document, &["[data-at='metadata-online-date']"])
        .and_then(|text| find_posted_date(&text).or_else(|| normalize_date(&text)));

    PartialPosting {
        title: select_text(document, &["[data-at='header-job-title']", "h1"]),
        company: select_text(
            document,
            &[
                "[data-at='metadata-company-name']",
                "[data-at='header-company-name']",
            ],
        ),
        location: select_text(document, &["[data-at='metadata-location']"]),
        description: select_text(
            document,
            &[
                "[data-at='section-text-description-content']",
                "[data-at='job-ad-content']",
            ],
        ),
        requirements: select_text(document, &["[data-at='section-text-profile-content']"]),
        salary: select_text(document, &["[data-at='metadata-salary']"]),
        employment_type,
        posted_date,
        ..Default::default()
    }
}
