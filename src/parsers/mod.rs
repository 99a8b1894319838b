//! Job-board parsers and the registry that selects them
//!
//! Each known board gets a [`JobBoardParser`] with a URL predicate and a parse
//! function. The [`ParserRegistry`] keeps them in an ordered list; the first parser
//! whose predicate matches wins, and unmatched pages go to the [`GenericParser`].

mod arbeitsagentur;
mod generic;
mod indeed;
mod jsonld;
mod linkedin;
mod stepstone;
mod xing;

pub use arbeitsagentur::ArbeitsagenturParser;
pub use generic::{split_title, GenericParser};
pub use indeed::IndeedParser;
pub use jsonld::{extract_json_ld, map_employment_type};
pub use linkedin::LinkedInParser;
pub use stepstone::StepStoneParser;
pub use xing::XingParser;

use crate::extract::{document_text, scan_text, select_contact_email};
use crate::posting::PartialPosting;
use scraper::{Html, Selector};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

/// Identifier of a supported job board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardId {
    /// Bundesagentur für Arbeit job search
    Arbeitsagentur,
    StepStone,
    Indeed,
    LinkedIn,
    Xing,
}

impl BoardId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arbeitsagentur => "arbeitsagentur",
            Self::StepStone => "stepstone",
            Self::Indeed => "indeed",
            Self::LinkedIn => "linkedin",
            Self::Xing => "xing",
        }
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural problems that make a page unusable as a job posting
///
/// Missing fields are never a parse error; parsers leave them unset.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("the page is empty")]
    EmptyDocument,

    #[error("the page is not HTML ({0})")]
    UnsupportedContent(String),

    #[error("the page body is binary data")]
    BinaryContent,
}

/// Content types that can never hold an HTML posting
const NON_HTML_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/octet-stream",
    "application/zip",
    "application/msword",
    "application/vnd.",
    "image/",
    "audio/",
    "video/",
    "font/",
];

/// Checks that a fetched body can be parsed as an HTML posting
///
/// # Rejected Bodies
///
/// | Body | Error |
/// |------|-------|
/// | Empty or whitespace only | `EmptyDocument` |
/// | Content-Type of a document, image or archive | `UnsupportedContent` |
/// | Starts with `%PDF` | `UnsupportedContent` |
/// | NUL bytes near the start | `BinaryContent` |
pub fn ensure_parseable(body: &str, content_type: &str) -> Result<(), ParseError> {
    if body.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }

    let content_type = content_type.to_ascii_lowercase();
    if let Some(kind) = NON_HTML_CONTENT_TYPES
        .iter()
        .find(|kind| content_type.starts_with(*kind))
    {
        tracing::debug!("Rejecting body with content type {}", kind);
        let mime = content_type.split(';').next().unwrap_or_default().trim();
        return Err(ParseError::UnsupportedContent(mime.to_string()));
    }

    if body.trim_start().starts_with("%PDF") {
        return Err(ParseError::UnsupportedContent("application/pdf".to_string()));
    }

    let head: String = body.chars().take(1024).collect();
    if head.contains('\0') {
        return Err(ParseError::BinaryContent);
    }

    Ok(())
}

/// A parser for one job board
///
/// Implementations must be cheap to share: the registry holds them as trait objects
/// and the pipeline calls them from any task.
pub trait JobBoardParser: Send + Sync {
    /// The board this parser handles
    fn id(&self) -> BoardId;

    /// Returns true for the board's posting detail URLs only
    ///
    /// Home, search and contact pages of the board must not match.
    fn matches(&self, url: &Url) -> bool;

    /// Extracts whatever fields the page carries
    fn parse(&self, document: &Html, url: &Url) -> Result<PartialPosting, ParseError>;

    /// The board's own system addresses, never reported as a contact
    ///
    /// Entries starting with `@` deny a whole domain.
    fn email_denylist(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether the pipeline may follow `external_url` to the employer's posting
    fn follows_external_links(&self) -> bool {
        false
    }
}

/// Ordered list of job-board parsers
pub struct ParserRegistry {
    parsers: Vec<Box<dyn JobBoardParser>>,
}

impl Default for ParserRegistry {
    /// Registers every supported board; order is the tie-break
    fn default() -> Self {
        Self::empty()
            .with_parser(ArbeitsagenturParser)
            .with_parser(StepStoneParser)
            .with_parser(IndeedParser)
            .with_parser(LinkedInParser)
            .with_parser(XingParser)
    }
}

impl ParserRegistry {
    /// Creates a registry without parsers; every page goes to the generic parser
    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Appends a parser after the ones already registered
    pub fn with_parser<P: JobBoardParser + 'static>(mut self, parser: P) -> Self {
        self.parsers.push(Box::new(parser));
        self
    }

    /// Returns the first parser whose predicate matches
    pub fn find(&self, url: &Url) -> Option<&dyn JobBoardParser> {
        self.parsers
            .iter()
            .find(|parser| parser.matches(url))
            .map(|parser| &**parser)
    }

    /// Returns the id of the first matching board
    pub fn detect(&self, url: &Url) -> Option<BoardId> {
        self.find(url).map(|parser| parser.id())
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

static DEFAULT_REGISTRY: LazyLock<ParserRegistry> = LazyLock::new(ParserRegistry::default);

/// Detects the job board a URL belongs to
///
/// The URL is normalized first, so search links carrying a posting id are detected
/// like the detail page they point to. Unparseable URLs return `None`.
///
/// # Examples
///
/// ```
/// use jobfetch::{detect_job_board, BoardId};
///
/// assert_eq!(
///     detect_job_board("https://www.stepstone.de/stellenangebote--Koch-Berlin-Acme--123456-inline.html"),
///     Some(BoardId::StepStone)
/// );
/// assert_eq!(detect_job_board("https://www.stepstone.de/"), None);
/// ```
pub fn detect_job_board(url: &str) -> Option<BoardId> {
    let url = crate::url::normalize_job_url(url).ok()?;
    DEFAULT_REGISTRY.detect(&url)
}

/// Fills gaps in board-parser output with the text scans every board shares
///
/// Runs the regex scans over the rendered text and picks a contact email from mailto
/// links and addresses in the text, minus the board's denylist.
pub(crate) fn complete_from_text(
    fields: &mut PartialPosting,
    document: &Html,
    denylist: &[&str],
) {
    let text = document_text(document);
    fields.fill_missing(scan_text(&text));

    if fields.contact_email.is_none() {
        let addresses = mailto_addresses(document)
            .into_iter()
            .chain(crate::extract::find_emails(&text))
            .collect::<Vec<_>>();
        fields.contact_email = select_contact_email(addresses.iter().map(String::as_str), denylist);
    }
}

fn mailto_addresses(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(crate::extract::mailto_addresses)
        .flatten()
        .collect()
}

/// Returns true if the last path segment ends in a run of at least `digits` digits
pub(crate) fn ends_with_numeric_id(path: &str, digits: usize) -> bool {
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let segment = segment.split('.').next().unwrap_or_default();
    let trailing = segment
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .count();
    trailing >= digits
}
