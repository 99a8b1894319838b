//! Integration tests for the job posting pipeline
//!
//! A wiremock server plays the job portal and the employer's career page; the tests
//! run raw mode, structured mode and the enrichment hop end to end.

use jobfetch::config::Config;
use jobfetch::extract::select_attr;
use jobfetch::parsers::{BoardId, JobBoardParser, ParseError, ParserRegistry};
use jobfetch::{JobFetchError, JobFetcher, JobSource, PartialPosting};
use scraper::Html;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("jobfetch=debug")
        .with_test_writer()
        .try_init();
}

fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body, "text/html; charset=utf-8")
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.fetch.timeout_secs = 2;
    config.fetch.enrichment_timeout_secs = 1;
    config
}

/// Board parser for pages under `/board/` on the mock server
///
/// Reads the title from `h1` and the employer link from `a#employer-posting`.
struct MockBoardParser;

impl JobBoardParser for MockBoardParser {
    fn id(&self) -> BoardId {
        BoardId::Arbeitsagentur
    }

    fn matches(&self, url: &Url) -> bool {
        url.host_str() == Some("127.0.0.1") && url.path().starts_with("/board/")
    }

    fn parse(&self, document: &Html, _url: &Url) -> Result<PartialPosting, ParseError> {
        Ok(PartialPosting {
            title: jobfetch::extract::select_text(document, &["h1"]),
            company: Some("Bäckerei Korn".to_string()),
            external_url: select_attr(document, "a#employer-posting", "href"),
            ..Default::default()
        })
    }

    fn email_denylist(&self) -> &'static [&'static str] {
        &["@board.example"]
    }

    fn follows_external_links(&self) -> bool {
        true
    }
}

fn board_fetcher() -> JobFetcher {
    let registry = ParserRegistry::empty().with_parser(MockBoardParser);
    JobFetcher::with_registry(test_config(), registry).unwrap()
}

#[tokio::test]
async fn test_raw_mode_collects_text_and_links() {
    init_tracing();
    let server = MockServer::start().await;
    let base = server.uri();

    let body = format!(
        r#"<html><head><title>Koch</title><script>var x = 1;</script></head><body>
            <nav><a href="/home">Start</a></nav>
            <h1>Koch (m/w/d)</h1>
            <p>Wir suchen Verstärkung für unsere Küche.</p>
            <a href="/bewerbung/42">Jetzt bewerben</a>
            <a href="{base}/team">Team</a>
            <a href="mailto:Jobs@Restaurant-Sonne.de?subject=Koch">Schreiben Sie uns</a>
        </body></html>"#
    );

    Mock::given(method("GET"))
        .and(path("/stellen/koch"))
        .respond_with(html_response(body))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = JobFetcher::new(test_config()).unwrap();
    let raw = fetcher
        .fetch_job_posting(&format!("{}/stellen/koch", base))
        .await
        .unwrap();

    assert_eq!(raw.source_url, format!("{}/stellen/koch", base));
    assert!(raw.text.contains("Koch (m/w/d)"));
    assert!(raw.text.contains("Wir suchen Verstärkung"));
    assert!(!raw.text.contains("var x"));
    assert!(raw.all_links.contains(&format!("{}/bewerbung/42", base)));
    assert!(raw.all_links.contains(&format!("{}/team", base)));
    assert_eq!(raw.email_links.len(), 1);
    assert_eq!(raw.email_links[0].email, "Jobs@Restaurant-Sonne.de");
    assert!(raw
        .application_links
        .iter()
        .any(|link| link.url == format!("{}/bewerbung/42", base)));
}

#[tokio::test]
async fn test_structured_mode_generic_page() {
    init_tracing();
    let server = MockServer::start().await;

    let body = r#"<html><head>
        <title>Servicekraft (m/w/d) - Café Mitte</title>
        <script type="application/ld+json">{
            "@context": "https://schema.org",
            "@type": "JobPosting",
            "title": "Servicekraft (m/w/d)",
            "hiringOrganization": {"@type": "Organization", "name": "Café Mitte GmbH"},
            "jobLocation": {"@type": "Place", "address": {"postalCode": "10115", "addressLocality": "Berlin"}},
            "datePosted": "2024-05-02",
            "employmentType": "PART_TIME",
            "description": "<p>Service im Café.</p>"
        }</script>
    </head><body>
        <h1>Servicekraft (m/w/d)</h1>
        <p>Bewerbungen bis 31.05.2024 an <a href="mailto:bewerbung@cafe-mitte.de">bewerbung@cafe-mitte.de</a></p>
        <p>Telefon: 030 1234567</p>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/jobs/servicekraft"))
        .respond_with(html_response(body.to_string()))
        .mount(&server)
        .await;

    let url = format!("{}/jobs/servicekraft", server.uri());
    let fetcher = JobFetcher::new(test_config()).unwrap();
    let posting = fetcher.fetch_structured_job_posting(&url).await.unwrap();

    assert_eq!(posting.source, JobSource::Generic);
    assert_eq!(posting.url, url);
    assert_eq!(posting.title.as_deref(), Some("Servicekraft (m/w/d)"));
    assert_eq!(posting.company.as_deref(), Some("Café Mitte GmbH"));
    assert_eq!(posting.location.as_deref(), Some("10115 Berlin"));
    assert_eq!(posting.posted_date.as_deref(), Some("2024-05-02"));
    assert_eq!(posting.employment_type.as_deref(), Some("Teilzeit"));
    assert_eq!(posting.description.as_deref(), Some("Service im Café."));
    assert_eq!(posting.contact_email.as_deref(), Some("bewerbung@cafe-mitte.de"));
    assert_eq!(posting.contact_phone.as_deref(), Some("030 1234567"));
    assert!(posting.raw_text.contains("Servicekraft"));
    assert_eq!(posting.email_links.len(), 1);
}

#[tokio::test]
async fn test_structured_mode_serializes_missing_fields_as_null() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(html_response("<html><body></body></html>".to_string()))
        .mount(&server)
        .await;

    let fetcher = JobFetcher::new(test_config()).unwrap();
    let posting = fetcher
        .fetch_structured_job_posting(&format!("{}/empty", server.uri()))
        .await
        .unwrap();
    assert!(posting.has_no_fields());

    let json = serde_json::to_value(&posting).unwrap();
    assert_eq!(json["source"], "generic");
    assert!(json["title"].is_null());
    assert!(json["contact_email"].is_null());
    assert_eq!(json["all_links"], serde_json::json!([]));
}

#[tokio::test]
async fn test_pdf_is_unparseable() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stelle.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("%PDF-1.7 ...", "application/pdf"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/stelle.pdf", server.uri());
    let fetcher = JobFetcher::new(test_config()).unwrap();

    let structured = fetcher.fetch_structured_job_posting(&url).await.unwrap_err();
    assert!(
        matches!(structured, JobFetchError::Unparseable { .. }),
        "{:?}",
        structured
    );

    let raw = fetcher.fetch_job_posting(&url).await.unwrap_err();
    assert!(matches!(raw, JobFetchError::Unparseable { .. }), "{:?}", raw);
}

#[tokio::test]
async fn test_not_found_surfaces_from_pipeline() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = JobFetcher::new(test_config()).unwrap();
    let err = fetcher
        .fetch_structured_job_posting(&format!("{}/gone", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, JobFetchError::NotFound { .. }), "{:?}", err);
}

#[tokio::test]
async fn test_invalid_url_is_rejected_before_fetching() {
    let fetcher = JobFetcher::new(test_config()).unwrap();
    let err = fetcher
        .fetch_structured_job_posting("ftp://example.com/job")
        .await
        .unwrap_err();
    assert!(matches!(err, JobFetchError::Url(_)), "{:?}", err);
}

#[tokio::test]
async fn test_enrichment_fills_contact_from_employer_page() {
    init_tracing();
    let server = MockServer::start().await;
    let base = server.uri();

    let board_page = format!(
        r#"<html><body>
            <h1>Bäcker (m/w/d)</h1>
            <p>Fragen? <a href="mailto:service@board.example">Service</a></p>
            <a id="employer-posting" href="{base}/karriere/baecker">Zur Stellenanzeige</a>
        </body></html>"#
    );
    let employer_page = format!(
        r#"<html><body>
            <h1>Bäcker (m/w/d)</h1>
            <p>Ansprechpartnerin: Frau Anna Schmidt</p>
            <p>Telefon: 040 9876543</p>
            <p><a href="mailto:anna.schmidt@baeckerei-korn.de">E-Mail schreiben</a></p>
        </body></html>"#
    );

    Mock::given(method("GET"))
        .and(path("/board/baecker"))
        .respond_with(html_response(board_page))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/karriere/baecker"))
        .respond_with(html_response(employer_page))
        .expect(1)
        .mount(&server)
        .await;

    let posting = board_fetcher()
        .fetch_structured_job_posting(&format!("{}/board/baecker", base))
        .await
        .unwrap();

    assert_eq!(posting.source, JobSource::Board(BoardId::Arbeitsagentur));
    assert_eq!(posting.url, format!("{}/board/baecker", base));
    assert_eq!(posting.title.as_deref(), Some("Bäcker (m/w/d)"));
    assert_eq!(posting.company.as_deref(), Some("Bäckerei Korn"));
    assert_eq!(posting.contact_person.as_deref(), Some("Frau Anna Schmidt"));
    assert_eq!(posting.contact_phone.as_deref(), Some("040 9876543"));
    assert_eq!(
        posting.contact_email.as_deref(),
        Some("anna.schmidt@baeckerei-korn.de")
    );
    // Links and text describe the board page only.
    assert!(posting.raw_text.contains("Zur Stellenanzeige"));
    assert!(!posting.raw_text.contains("Anna Schmidt"));
}

#[tokio::test]
async fn test_enrichment_stops_after_one_hop() {
    init_tracing();
    let server = MockServer::start().await;
    let base = server.uri();

    // Every page is a board page without a contact person that links onwards.
    let first = format!(
        r#"<html><body>
            <h1>Bäcker (m/w/d)</h1>
            <a id="employer-posting" href="{base}/board/partner">Zur Stellenanzeige</a>
        </body></html>"#
    );
    let second = format!(
        r#"<html><body>
            <h1>Bäcker (m/w/d)</h1>
            <p>Telefon: 040 1112223</p>
            <a id="employer-posting" href="{base}/board/third">Zur Stellenanzeige</a>
        </body></html>"#
    );

    Mock::given(method("GET"))
        .and(path("/board/baecker"))
        .respond_with(html_response(first))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/board/partner"))
        .respond_with(html_response(second))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/board/third"))
        .respond_with(html_response(
            "<html><body><p>Ansprechpartner: Herr Tim Berg</p></body></html>".to_string(),
        ))
        .expect(0)
        .mount(&server)
        .await;

    let posting = board_fetcher()
        .fetch_structured_job_posting(&format!("{}/board/baecker", base))
        .await
        .unwrap();

    assert_eq!(posting.contact_phone.as_deref(), Some("040 1112223"));
    assert_eq!(posting.contact_person, None);
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    init_tracing();
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/job/42"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "/careers/de/stelle-42.html"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/careers/de/stelle-42.html"))
        .respond_with(html_response(
            r#"<html><body><h1>Koch (m/w/d)</h1><a href="bewerben.html">Jetzt bewerben</a></body></html>"#
                .to_string(),
        ))
        .mount(&server)
        .await;

    let requested = format!("{}/job/42", base);
    let expected_link = format!("{}/careers/de/bewerben.html", base);
    let fetcher = JobFetcher::new(test_config()).unwrap();

    let raw = fetcher.fetch_job_posting(&requested).await.unwrap();
    assert_eq!(raw.all_links, vec![expected_link.clone()]);
    assert_eq!(raw.application_links[0].url, expected_link);
    assert_eq!(raw.source_url, requested);

    let posting = fetcher.fetch_structured_job_posting(&requested).await.unwrap();
    assert_eq!(posting.all_links, vec![expected_link]);
    assert_eq!(posting.url, requested);
}

#[tokio::test]
async fn test_failed_enrichment_keeps_board_fields() {
    init_tracing();
    let server = MockServer::start().await;
    let base = server.uri();

    let board_page = format!(
        r#"<html><body>
            <h1>Bäcker (m/w/d)</h1>
            <a id="employer-posting" href="{base}/karriere/weg">Zur Stellenanzeige</a>
        </body></html>"#
    );

    Mock::given(method("GET"))
        .and(path("/board/baecker"))
        .respond_with(html_response(board_page))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/karriere/weg"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let posting = board_fetcher()
        .fetch_structured_job_posting(&format!("{}/board/baecker", base))
        .await
        .unwrap();

    assert_eq!(posting.title.as_deref(), Some("Bäcker (m/w/d)"));
    assert_eq!(posting.company.as_deref(), Some("Bäckerei Korn"));
    assert_eq!(posting.contact_person, None);
    assert_eq!(posting.contact_email, None);
}

#[tokio::test]
async fn test_board_denylist_filters_contact_email() {
    init_tracing();
    let server = MockServer::start().await;

    let board_page = r#"<html><body>
        <h1>Verkäufer (m/w/d)</h1>
        <p>Ansprechpartner: Herr Tim Berg</p>
        <a href="mailto:service@board.example">Hilfe</a>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/board/verkaeufer"))
        .respond_with(html_response(board_page.to_string()))
        .mount(&server)
        .await;

    let posting = board_fetcher()
        .fetch_structured_job_posting(&format!("{}/board/verkaeufer", server.uri()))
        .await
        .unwrap();

    assert_eq!(posting.contact_person.as_deref(), Some("Herr Tim Berg"));
    assert_eq!(posting.contact_email, None);
    assert_eq!(posting.email_links.len(), 1);
}
