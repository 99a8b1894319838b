//! Parser for the Federal Employment Agency job search (`arbeitsagentur.de`)
//!
//! Detail pages are rendered by an Angular app that embeds the posting as transfer
//! state in `<script id="ng-state">`. Server-rendered markup uses stable
//! `detail-kopfbereich-*` and `detail-beschreibung-*` ids. Many postings are short
//! stubs pointing at the employer's own page, which is exposed as `external_url`.

use crate::extract::{
    clean_text, html_fragment_text, labelled_value, normalize_date, select_attr, select_text,
};
use crate::parsers::{complete_from_text, extract_json_ld, BoardId, JobBoardParser, ParseError};
use crate::posting::PartialPosting;
use crate::url::host_matches;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use url::Url;

const HOST: &str = "arbeitsagentur.de";
const DETAIL_PATH: &str = "/jobsuche/jobdetail/";

const TITLE_SELECTORS: &[&str] = &["#detail-kopfbereich-titel", "h1"];
const COMPANY_SELECTORS: &[&str] = &["#detail-kopfbereich-firma", "#detail-arbeitgeber-name"];
const LOCATION_SELECTORS: &[&str] = &["#detail-kopfbereich-arbeitsort", "#detail-arbeitsort"];
const DESCRIPTION_SELECTORS: &[&str] = &[
    "#detail-beschreibung-beschreibung",
    "#detail-beschreibung-text-container",
];
const EXTERNAL_LINK_SELECTORS: &[&str] = &[
    "a#detail-beschreibung-externe-url-btn",
    "a[id*='externe-url']",
    "a[id*='externeUrl']",
];

/// Working-time models of the agency mapped to display labels
const WORKING_TIME_LABELS: &[(&str, &str)] = &[
    ("VOLLZEIT", "Vollzeit"),
    ("TEILZEIT", "Teilzeit"),
    ("SCHICHT", "Schichtarbeit"),
    ("NACHT", "Nachtarbeit"),
    ("WOCHENENDE", "Wochenendarbeit"),
    ("HEIM_TELEARBEIT", "Homeoffice"),
    ("MINIJOB", "Minijob"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ArbeitsagenturParser;

impl JobBoardParser for ArbeitsagenturParser {
    fn id(&self) -> BoardId {
        BoardId::Arbeitsagentur
    }

    fn matches(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|host| host_matches(host, HOST))
            && url
                .path()
                .strip_prefix(DETAIL_PATH)
                .is_some_and(|reference| !reference.trim_matches('/').is_empty())
    }

    fn parse(&self, document: &Html, url: &Url) -> Result<PartialPosting, ParseError> {
        let mut fields = extract_json_ld(document).unwrap_or_default();
        if let Some(state) = transfer_state(document) {
            fields.fill_missing(state);
        }
        fields.fill_missing(landmarks(document, url));
        complete_from_text(&mut fields, document, self.email_denylist());

        Ok(fields)
    }

    fn email_denylist(&self) -> &'static [&'static str] {
        &[
            "noreply@arbeitsagentur.de",
            "no-reply@arbeitsagentur.de",
            "jobboerse@arbeitsagentur.de",
            "service@arbeitsagentur.de",
            "datenschutz@arbeitsagentur.de",
        ]
    }

    fn follows_external_links(&self) -> bool {
        true
    }
}

/// Reads the posting out of the Angular transfer state
fn transfer_state(document: &Html) -> Option<PartialPosting> {
    let raw = select_text_raw(document, "script#ng-state")?;
    let state: Value = serde_json::from_str(&raw).ok()?;
    let posting = find_posting_object(&state)?;
    tracing::debug!("Found agency transfer state");

    Some(PartialPosting {
        title: string_field(posting, &["stellenangebotsTitel", "titel"]).and_then(clean_text),
        company: string_field(posting, &["firma", "arbeitgeber"]).and_then(clean_text),
        description: string_field(
            posting,
            &["stellenangebotsBeschreibung", "stellenbeschreibung"],
        )
        .and_then(html_fragment_text),
        location: ["arbeitsorte", "stellenlokationen", "arbeitsort"]
            .iter()
            .find_map(|key| posting.get(*key).and_then(place_label)),
        reference_number: string_field(posting, &["referenznummer", "refnr"])
            .and_then(clean_text),
        posted_date: string_field(
            posting,
            &["datumErsteVeroeffentlichung", "aktuelleVeroeffentlichungsdatum"],
        )
        .and_then(normalize_date),
        employment_type: posting.get("arbeitszeitmodelle").and_then(working_time),
        salary: string_field(posting, &["verguetung", "gehalt"]).and_then(clean_text),
        external_url: string_field(posting, &["externeUrl", "allianzpartnerUrl"])
            .and_then(|href| external_target(href, None)),
        ..Default::default()
    })
}

fn string_field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
}

fn select_text_raw(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let script = document.select(&selector).next()?;
    let raw = script.text().collect::<String>();
    (!raw.trim().is_empty()).then_some(raw)
}

/// Finds the object describing the posting anywhere in the transfer state
fn find_posting_object(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(object)
            if object.contains_key("stellenangebotsTitel")
                || (object.contains_key("titel") && object.contains_key("referenznummer")) =>
        {
            Some(object)
        }
        Value::Object(object) => object.values().find_map(find_posting_object),
        Value::Array(items) => items.iter().find_map(find_posting_object),
        _ => None,
    }
}

/// Renders the first work place as `"{plz} {ort}"`
fn place_label(value: &Value) -> Option<String> {
    let place = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let place = place.get("adresse").unwrap_or(place);

    let field = |key: &str| place.get(key).and_then(Value::as_str).and_then(clean_text);
    match (field("plz"), field("ort")) {
        (Some(code), Some(city)) => Some(format!("{} {}", code, city)),
        (None, Some(city)) => Some(city),
        _ => field("region"),
    }
}

fn working_time(value: &Value) -> Option<String> {
    let mut labels: Vec<&str> = Vec::new();
    for model in value.as_array()?.iter().filter_map(Value::as_str) {
        let model = model.to_ascii_uppercase();
        if let Some((_, label)) = WORKING_TIME_LABELS
            .iter()
            .find(|(prefix, _)| model.starts_with(prefix))
        {
            if !labels.contains(label) {
                labels.push(*label);
            }
        }
    }
    clean_text(&labels.join(", "))
}

/// Resolves an employer link; links back to the agency are not external
fn external_target(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    let target = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };

    let external = matches!(target.scheme(), "http" | "https")
        && target
            .host_str()
            .is_some_and(|host| !host_matches(host, HOST));
    external.then(|| target.to_string())
}

fn reference_from_path(url: &Url) -> Option<String> {
    let reference = url.path().strip_prefix(DETAIL_PATH)?.trim_matches('/');
    clean_text(reference)
}

fn landmarks(document: &Html, url: &Url) -> PartialPosting {
    let external_url = EXTERNAL_LINK_SELECTORS.iter().find_map(|selector| {
        select_attr(document, selector, "href").and_then(|href| external_target(&href, Some(url)))
    });

    PartialPosting {
        title: select_text(document, TITLE_SELECTORS),
        company: select_text(document, COMPANY_SELECTORS),
        location: select_text(document, LOCATION_SELECTORS),
        description: select_text(document, DESCRIPTION_SELECTORS),
        employment_type: labelled_value(document, &["arbeitszeit"]),
        salary: labelled_value(document, &["gehalt", "vergütung"]),
        contact_person: labelled_value(document, &["ansprechpartner"]),
        reference_number: reference_from_path(url),
        external_url,
        ..Default::default()
    }
}
