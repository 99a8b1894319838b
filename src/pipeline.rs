//! Job posting pipeline
//!
//! [`JobFetcher`] ties the pieces together: URL normalization, the fetch
//! orchestrator, parser selection, link extraction, the enrichment hop and the final
//! record. Parsed documents never live across an `.await`; all HTML work happens in
//! synchronous helpers.

use crate::config::{validate, Config};
use crate::extract::{extract_page_content, select_contact_email};
use crate::fetch::{FetchOrchestrator, FetchedPage};
use crate::parsers::{ensure_parseable, BoardId, GenericParser, ParseError, ParserRegistry};
use crate::posting::{JobSource, PartialPosting, RawJobPosting, StructuredJobPosting};
use crate::url::{normalize_job_url, parse_job_url};
use crate::{JobFetchError, Result};
use async_recursion::async_recursion;
use reqwest::header::HeaderMap;
use scraper::Html;
use url::Url;

/// How many external hops a single request may take
pub const MAX_ENRICHMENT_DEPTH: u8 = 1;

/// Everything extracted from one fetched page
struct PageExtraction {
    source: JobSource,
    fields: PartialPosting,
    content: RawJobPosting,
    follows_external_links: bool,
}

impl PageExtraction {
    fn needs_enrichment(&self) -> bool {
        self.follows_external_links
            && self.fields.contact_person.is_none()
            && self.fields.external_url.is_some()
    }

    fn into_posting(self, url: &Url) -> StructuredJobPosting {
        StructuredJobPosting::from_parts(self.source, url.as_str(), self.fields, self.content)
    }
}

/// The URL the body was actually served from, after redirects
fn link_base(page: &FetchedPage, requested: &Url) -> Url {
    Url::parse(&page.final_url).unwrap_or_else(|_| requested.clone())
}

fn unparseable(url: &Url, error: ParseError) -> JobFetchError {
    JobFetchError::Unparseable {
        url: url.to_string(),
        reason: error.to_string(),
    }
}

/// Fetches job postings and turns them into structured records
///
/// Holds only immutable configuration, pooled HTTP clients and the parser registry,
/// so one instance can serve any number of concurrent tasks.
///
/// # Example
///
/// ```no_run
/// use jobfetch::{Config, JobFetcher};
///
/// # async fn run() -> jobfetch::Result<()> {
/// let fetcher = JobFetcher::new(Config::default())?;
/// let posting = fetcher
///     .fetch_structured_job_posting("https://www.arbeitsagentur.de/jobsuche/jobdetail/10000-1199512346-S")
///     .await?;
/// println!("{:?} at {:?}", posting.title, posting.company);
/// # Ok(())
/// # }
/// ```
pub struct JobFetcher {
    config: Config,
    orchestrator: FetchOrchestrator,
    registry: ParserRegistry,
}

impl JobFetcher {
    /// Creates a fetcher with every supported job board registered
    pub fn new(config: Config) -> Result<Self> {
        Self::with_registry(config, ParserRegistry::default())
    }

    /// Creates a fetcher with a custom parser registry
    pub fn with_registry(config: Config, registry: ParserRegistry) -> Result<Self> {
        validate(&config)?;
        let orchestrator = FetchOrchestrator::new(&config)?;

        Ok(Self {
            config,
            orchestrator,
            registry,
        })
    }

    /// Creates a fetcher from the default configuration plus environment overrides
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn orchestrator(&self) -> &FetchOrchestrator {
        &self.orchestrator
    }

    /// Returns the board whose parser would handle this URL
    pub fn detect_job_board(&self, url: &str) -> Option<BoardId> {
        let url = normalize_job_url(url).ok()?;
        self.registry.detect(&url)
    }

    /// Fetches a page and returns its text and links without field extraction
    pub async fn fetch_job_posting(&self, url: &str) -> Result<RawJobPosting> {
        let url = normalize_job_url(url)?;
        tracing::info!("Fetching raw job posting from {}", url);

        let page = self.orchestrator.fetch(&url, &HeaderMap::new(), None).await?;
        ensure_parseable(&page.body, &page.content_type).map_err(|e| unparseable(&url, e))?;

        let mut content = extract_page_content(
            &page.body,
            &link_base(&page, &url),
            self.config.fetch.max_text_chars,
        );
        content.source_url = url.to_string();
        Ok(content)
    }

    /// Fetches a page and extracts a structured job posting
    ///
    /// # Returns
    ///
    /// * `Ok(StructuredJobPosting)` - The page was fetched; fields the page does not
    ///   carry are `None`
    /// * `Err(JobFetchError)` - The URL is invalid, every fetch mechanism failed, or the
    ///   body is not an HTML page
    pub async fn fetch_structured_job_posting(&self, url: &str) -> Result<StructuredJobPosting> {
        let url = normalize_job_url(url)?;
        tracing::info!("Fetching structured job posting from {}", url);

        let extraction = self.extract_at_depth(&url, 0).await?;
        Ok(extraction.into_posting(&url))
    }

    /// Extracts a structured job posting from HTML fetched elsewhere
    ///
    /// Runs the same parsers as [`JobFetcher::fetch_structured_job_posting`] but never
    /// touches the network, so no enrichment hop is taken.
    pub fn parse_job_html(&self, html: &str, url: &str) -> Result<StructuredJobPosting> {
        let url = normalize_job_url(url)?;
        let extraction = self.extract_page(html, "", &url, &url)?;
        Ok(extraction.into_posting(&url))
    }

    #[async_recursion]
    async fn extract_at_depth(&self, url: &Url, depth: u8) -> Result<PageExtraction> {
        let timeout_cap = (depth > 0).then(|| self.config.fetch.enrichment_timeout());
        let page = self
            .orchestrator
            .fetch(url, &HeaderMap::new(), timeout_cap)
            .await?;

        let base = link_base(&page, url);
        let mut extraction = self.extract_page(&page.body, &page.content_type, url, &base)?;

        if depth < MAX_ENRICHMENT_DEPTH && extraction.needs_enrichment() {
            if let Some(target) = extraction.fields.external_url.clone() {
                self.enrich(&mut extraction, &target, depth).await;
            }
        } else if extraction.needs_enrichment() {
            tracing::debug!("Not following {:?}: enrichment depth reached", extraction.fields.external_url);
        }

        Ok(extraction)
    }

    /// Fills missing contact fields and the description from the employer's page
    ///
    /// Failures are logged and leave the extraction unchanged.
    async fn enrich(&self, extraction: &mut PageExtraction, target: &str, depth: u8) {
        let target = match parse_job_url(target) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("Skipping enrichment, invalid external URL {}: {}", target, e);
                return;
            }
        };

        tracing::info!("Following external posting {} for contact details", target);
        match self.extract_at_depth(&target, depth + 1).await {
            Ok(external) => extraction.fields.fill_from_enrichment(external.fields),
            Err(e) => tracing::warn!("Enrichment from {} failed: {}", target, e),
        }
    }

    /// Parses one page with the matching board parser or the generic parser
    ///
    /// `url` selects the parser; relative links resolve against `base`.
    fn extract_page(
        &self,
        body: &str,
        content_type: &str,
        url: &Url,
        base: &Url,
    ) -> Result<PageExtraction> {
        ensure_parseable(body, content_type).map_err(|e| unparseable(url, e))?;

        let mut content = extract_page_content(body, base, self.config.fetch.max_text_chars);
        content.source_url = url.to_string();
        let document = Html::parse_document(body);
        let parser = self.registry.find(url);
        let denylist = parser.map(|p| p.email_denylist()).unwrap_or_default();

        let (source, mut fields) = match parser {
            Some(parser) => {
                tracing::debug!("Parsing {} with the {} parser", url, parser.id());
                let mut fields = parser
                    .parse(&document, url)
                    .map_err(|e| unparseable(url, e))?;

                // On a board page the generic company guess is the board itself.
                let mut generic = GenericParser.parse(&document, url, denylist);
                generic.company = None;
                generic.external_url = None;
                fields.fill_missing(generic);

                (JobSource::Board(parser.id()), fields)
            }
            None => {
                tracing::debug!("No board parser for {}, using the generic parser", url);
                (JobSource::Generic, GenericParser.parse(&document, url, denylist))
            }
        };

        if fields.contact_email.is_none() {
            fields.contact_email = select_contact_email(
                content.email_links.iter().map(|link| link.email.as_str()),
                denylist,
            );
        }

        if fields.is_empty() {
            tracing::warn!("No job posting fields found on {}", url);
        } else {
            tracing::info!("Extracted job posting from {} (source: {})", url, source);
        }

        Ok(PageExtraction {
            source,
            fields,
            content,
            follows_external_links: parser.is_some_and(|p| p.follows_external_links()),
        })
    }
}
