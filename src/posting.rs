//! Job posting records produced by the pipeline
//!
//! [`StructuredJobPosting`] is the normalized output of structured mode and
//! [`RawJobPosting`] the output of raw mode. Parsers produce a [`PartialPosting`],
//! which the pipeline merges and completes.

use crate::parsers::BoardId;
use serde::{Serialize, Serializer};
use std::fmt;

/// Where the fields of a posting came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobSource {
    /// A registered job-board parser
    Board(BoardId),
    /// The heuristic fallback parser
    Generic,
    /// Text pasted by the user
    Manual,
}

impl JobSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Board(board) => board.as_str(),
            Self::Generic => "generic",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl PartialEq<&str> for JobSource {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A `mailto:` link found on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailLink {
    pub email: String,
    pub text: String,
}

/// An absolute link together with its anchor text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub url: String,
    pub text: String,
}

/// Output of raw mode: page text and links, no structured fields
#[derive(Debug, Clone, Serialize)]
pub struct RawJobPosting {
    pub text: String,
    pub all_links: Vec<String>,
    pub email_links: Vec<EmailLink>,
    pub application_links: Vec<PageLink>,
    pub source_url: String,
}

/// Fields a parser managed to extract
///
/// Every field is optional. `external_url` is not part of the final record: it points
/// at the employer's own posting and drives the enrichment hop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialPosting {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub contact_email: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub posted_date: Option<String>,
    pub application_deadline: Option<String>,
    pub employment_type: Option<String>,
    pub salary: Option<String>,
    pub reference_number: Option<String>,
    pub external_url: Option<String>,
}

/// Assigns `source` to `target` only when `target` is still empty
fn fill(target: &mut Option<String>, source: Option<String>) {
    if target.is_none() {
        *target = source;
    }
}

impl PartialPosting {
    /// Fills every field that is still missing from `other`
    ///
    /// Fields already set are never overwritten, which lets extraction phases run in
    /// priority order with the first successful phase winning per field.
    pub fn fill_missing(&mut self, other: PartialPosting) {
        fill(&mut self.title, other.title);
        fill(&mut self.company, other.company);
        fill(&mut self.location, other.location);
        fill(&mut self.description, other.description);
        fill(&mut self.requirements, other.requirements);
        fill(&mut self.contact_email, other.contact_email);
        fill(&mut self.contact_person, other.contact_person);
        fill(&mut self.contact_phone, other.contact_phone);
        fill(&mut self.posted_date, other.posted_date);
        fill(&mut self.application_deadline, other.application_deadline);
        fill(&mut self.employment_type, other.employment_type);
        fill(&mut self.salary, other.salary);
        fill(&mut self.reference_number, other.reference_number);
        fill(&mut self.external_url, other.external_url);
    }

    /// Fills only the contact fields and the description from an enrichment page
    pub fn fill_from_enrichment(&mut self, other: PartialPosting) {
        fill(&mut self.contact_person, other.contact_person);
        fill(&mut self.contact_email, other.contact_email);
        fill(&mut self.contact_phone, other.contact_phone);
        fill(&mut self.description, other.description);
    }

    /// Returns true if no semantic field is set
    pub fn is_empty(&self) -> bool {
        let fields = [
            &self.title,
            &self.company,
            &self.location,
            &self.description,
            &self.requirements,
            &self.contact_email,
            &self.contact_person,
            &self.contact_phone,
            &self.posted_date,
            &self.application_deadline,
            &self.employment_type,
            &self.salary,
            &self.reference_number,
        ];
        fields.iter().all(|field| field.is_none())
    }
}

/// Normalized job posting returned by structured mode
///
/// Semantic fields are `None` when unknown and serialize as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct StructuredJobPosting {
    pub source: JobSource,
    pub url: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub contact_email: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    /// ISO 8601 date (`YYYY-MM-DD`)
    pub posted_date: Option<String>,
    /// ISO 8601 date (`YYYY-MM-DD`)
    pub application_deadline: Option<String>,
    pub employment_type: Option<String>,
    pub salary: Option<String>,
    pub reference_number: Option<String>,
    pub raw_text: String,
    pub all_links: Vec<String>,
    pub email_links: Vec<EmailLink>,
    pub application_links: Vec<PageLink>,
}

impl StructuredJobPosting {
    /// Creates a record with every semantic field unset
    pub fn empty(source: JobSource, url: impl Into<String>) -> Self {
        Self {
            source,
            url: url.into(),
            title: None,
            company: None,
            location: None,
            description: None,
            requirements: None,
            contact_email: None,
            contact_person: None,
            contact_phone: None,
            posted_date: None,
            application_deadline: None,
            employment_type: None,
            salary: None,
            reference_number: None,
            raw_text: String::new(),
            all_links: Vec::new(),
            email_links: Vec::new(),
            application_links: Vec::new(),
        }
    }

    /// Wraps posting text the user pasted because the page could not be fetched
    ///
    /// The text becomes `raw_text`; no fields are extracted and the URL is empty.
    pub fn manual(text: impl Into<String>) -> Self {
        let mut posting = Self::empty(JobSource::Manual, String::new());
        posting.raw_text = text.into().trim().to_string();
        posting
    }

    /// Builds the final record from extracted fields and page content
    pub fn from_parts(
        source: JobSource,
        url: impl Into<String>,
        fields: PartialPosting,
        page: RawJobPosting,
    ) -> Self {
        Self {
            source,
            url: url.into(),
            title: fields.title,
            company: fields.company,
            location: fields.location,
            description: fields.description,
            requirements: fields.requirements,
            contact_email: fields.contact_email,
            contact_person: fields.contact_person,
            contact_phone: fields.contact_phone,
            posted_date: fields.posted_date,
            application_deadline: fields.application_deadline,
            employment_type: fields.employment_type,
            salary: fields.salary,
            reference_number: fields.reference_number,
            raw_text: page.text,
            all_links: page.all_links,
            email_links: page.email_links,
            application_links: page.application_links,
        }
    }

    /// Returns true if the record carries no semantic field at all
    ///
    /// Callers decide whether such a record counts as a failure.
    pub fn has_no_fields(&self) -> bool {
        [
            &self.title,
            &self.company,
            &self.location,
            &self.description,
            &self.requirements,
            &self.contact_email,
            &self.contact_person,
            &self.contact_phone,
            &self.posted_date,
            &self.application_deadline,
            &self.employment_type,
            &self.salary,
            &self.reference_number,
        ]
        .iter()
        .all(|field| field.is_none())
    }
}
