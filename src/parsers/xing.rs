//! Parser for XING job postings

use crate::extract::select_text;
use crate::parsers::{
    complete_from_text, ends_with_numeric_id, extract_json_ld, BoardId, JobBoardParser,
    ParseError,
};
use crate::posting::PartialPosting;
use crate::url::host_matches;
use scraper::Html;
use url::Url;

#[derive(Debug, Clone, Copy, Default)]
pub struct XingParser;

impl JobBoardParser for XingParser {
    fn id(&self) -> BoardId {
        BoardId::Xing
    }

    /// Detail pages are `/jobs/{slug}-{numeric id}`
    fn matches(&self, url: &Url) -> bool {
        let on_board = url
            .host_str()
            .is_some_and(|host| host_matches(host, "xing.com"));
        let slug = url
            .path()
            .strip_prefix("/jobs/")
            .map(|rest| rest.trim_end_matches('/'))
            .unwrap_or_default();

        on_board && !slug.is_empty() && !slug.contains('/') && ends_with_numeric_id(slug, 4)
    }

    fn parse(&self, document: &Html, _url: &Url) -> Result<PartialPosting, ParseError> {
        let mut fields = extract_json_ld(document).unwrap_or_default();
        fields.fill_missing(PartialPosting {
            title: select_text(document, &["h1[data-testid='job-details-title']", "h1"]),
            company: select_text(
                document,
                &[
                    "[data-testid='job-details-company-info-name']",
                    "[data-testid='header-company-name']",
                ],
            ),
            location: select_text(
                document,
                &[
                    "[data-testid='job-details-location']",
                    "[data-testid='job-fact-location']",
                ],
            ),
            employment_type: select_text(
                document,
                &[
                    "[data-testid='job-details-employment-type']",
                    "[data-testid='job-fact-employment-type']",
                ],
            ),
            salary: select_text(
                document,
                &["[data-testid='salary-info']", "[data-testid='job-fact-salary']"],
            ),
            description: select_text(
                document,
                &["[data-testid='expandable-content']", ".html-description"],
            ),
            ..Default::default()
        });
        complete_from_text(&mut fields, document, self.email_denylist());
        Ok(fields)
    }

    fn email_denylist(&self) -> &'static [&'static str] {
        &["@xing.com", "@xing.de", "@new-work.se"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_job_slugs() {
        assert!(XingParser.matches(
            &Url::parse("https://www.xing.com/jobs/berlin-software-engineer-123456789").unwrap()
        ));
        for url in [
            "https://www.xing.com/",
            "https://www.xing.com/jobs/",
            "https://www.xing.com/jobs/search?keywords=koch",
            "https://www.xing.com/jobs/find/berlin-123456",
            "https://www.xing.com/contact",
        ] {
            assert!(!XingParser.matches(&Url::parse(url).unwrap()), "{}", url);
        }
    }

    #[test]
    fn test_reads_test_ids() {
        let html = r#"<html><body>
            <h1 data-testid="job-details-title">Pflegefachkraft (m/w/d)</h1>
            <p data-testid="job-details-company-info-name">Klinikum Süd</p>
            <p data-testid="job-details-location">München</p>
            <p data-testid="job-details-employment-type">Vollzeit</p>
            <p data-testid="salary-info">42.000 € – 52.000 €</p>
            <div data-testid="expandable-content"><p>Pflege mit Herz.</p></div>
            <p>Ihr Kontakt: Herr Jonas Becker, Telefon 089 4455667</p>
        </body></html>"#;

        let url = Url::parse("https://www.xing.com/jobs/muenchen-pflegefachkraft-123456789").unwrap();
        let fields = XingParser.parse(&Html::parse_document(html), &url).unwrap();
        assert_eq!(fields.title.as_deref(), Some("Pflegefachkraft (m/w/d)"));
        assert_eq!(fields.company.as_deref(), Some("Klinikum Süd"));
        assert_eq!(fields.location.as_deref(), Some("München"));
        assert_eq!(fields.employment_type.as_deref(), Some("Vollzeit"));
        assert_eq!(fields.salary.as_deref(), Some("42.000 € – 52.000 €"));
        assert_eq!(fields.description.as_deref(), Some("Pflege mit Herz."));
        assert_eq!(fields.contact_person.as_deref(), Some("Herr Jonas Becker"));
        assert_eq!(fields.contact_phone.as_deref(), Some("089 4455667"));
    }
}
