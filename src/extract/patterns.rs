//! Regex scans over rendered page text

use crate::extract::text::clean_text;
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

pub static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}")
        .expect("valid email regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:tel(?:efon)?|phone|fon|mobil|rufnummer)\.?\s*:?\s*(\+?\(?\d[\d /().\-]{5,}\d)",
    )
    .expect("valid phone regex")
});

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:referenz(?:nummer)?|ref\.?\s*-?\s*nr\.?|kennziffer|stellen-?id|job-?id|reference(?:\s+(?:no\.?|number))?)\s*[:#]?\s*([A-Z0-9][A-Z0-9_/\-]{2,})",
    )
    .expect("valid reference regex")
});

/// Reference shape used by the Federal Employment Agency (`10000-1199512346-S`)
pub static AGENCY_REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4,5}-[0-9A-Z_]{6,}-S)\b").expect("valid agency reference regex")
});

static POSTED_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:veröffentlicht(?:\s+am)?|online\s+seit|erschienen(?:\s+am)?|eingestellt\s+am|posted(?:\s+on)?|published(?:\s+on)?)\s*:?\s*(\d{1,2}\.\s?\d{1,2}\.\s?\d{4})",
    )
    .expect("valid posted date regex")
});

static DEADLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:bewerbungsfrist|bewerbungsschluss|bewerben\s+bis|bewerbung\s+bis|deadline|apply\s+by)\s*(?:zum|am)?\s*:?\s*(\d{1,2}\.\s?\d{1,2}\.\s?\d{4})",
    )
    .expect("valid deadline regex")
});

static GERMAN_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\.\s?(\d{1,2})\.\s?(\d{4})$").expect("valid date regex")
});

static MONTH_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\.?\s+(\p{L}+)\s+(\d{4})$").expect("valid month date regex")
});

static CONTACT_PERSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?i:ansprechpartner(?:in)?|ansprechperson|kontaktperson|ihre?\s+kontakt(?:person)?|contact\s+person|recruiter(?:in)?))[ \t]*:?[ \t]*((?:(?i:frau|herr|mr\.?|mrs\.?|ms\.?)[ \t]+)?(?:(?i:dr\.|prof\.)[ \t]+)?\p{Lu}[\p{L}'\-]+(?:[ \t]+\p{Lu}[\p{L}'\-]+)?)",
    )
    .expect("valid contact person regex")
});

const AMOUNT: &str = r"(?:\d{1,3}(?:\.\d{3})+|\d{2,6})(?:,\d{1,2})?(?:\s?k)?";
const CURRENCY: &str = r"(?:€|EUR|Euro)";

static SALARY_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i){cur}?\s?{amt}\s?{cur}?\s*(?:-|–|bis)\s*{cur}?\s?{amt}\s?{cur}",
        amt = AMOUNT,
        cur = CURRENCY
    ))
    .expect("valid salary range regex")
});

static SALARY_SINGLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:ab|bis\s+zu|from|up\s+to|gehalt:?|vergütung:?)\s+{amt}\s?{cur}",
        amt = AMOUNT,
        cur = CURRENCY
    ))
    .expect("valid salary regex")
});

const GERMAN_MONTHS: &[(&str, u32)] = &[
    ("januar", 1),
    ("jänner", 1),
    ("februar", 2),
    ("märz", 3),
    ("april", 4),
    ("mai", 5),
    ("juni", 6),
    ("juli", 7),
    ("august", 8),
    ("september", 9),
    ("oktober", 10),
    ("november", 11),
    ("dezember", 12),
];

/// Normalizes a date to ISO 8601 (`YYYY-MM-DD`)
///
/// Accepts RFC 3339 timestamps, ISO dates (optionally followed by a time),
/// `dd.mm.yyyy` and `d. Monat yyyy` with German month names.
pub fn normalize_date(value: &str) -> Option<String> {
    let value = value.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive().format("%Y-%m-%d").to_string());
    }

    if let Some(prefix) = value.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    let date = if let Some(caps) = GERMAN_DATE_RE.captures(value) {
        NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            caps[2].parse().ok()?,
            caps[1].parse().ok()?,
        )
    } else if let Some(caps) = MONTH_DATE_RE.captures(value) {
        let month_name = caps[2].to_lowercase();
        let month = GERMAN_MONTHS
            .iter()
            .find(|(name, _)| *name == month_name)
            .map(|(_, number)| *number)?;
        NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[1].parse().ok()?)
    } else {
        None
    }?;

    Some(date.format("%Y-%m-%d").to_string())
}

/// Finds a labelled phone number
pub fn find_phone(text: &str) -> Option<String> {
    PHONE_RE
        .captures_iter(text)
        .filter_map(|caps| clean_text(&caps[1]))
        .find(|number| number.chars().filter(char::is_ascii_digit).count() >= 6)
}

/// Finds a labelled reference number, or an agency-shaped reference anywhere
pub fn find_reference(text: &str) -> Option<String> {
    REFERENCE_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .find(|value| value.chars().any(|c| c.is_ascii_digit()))
        .or_else(|| AGENCY_REFERENCE_RE.captures(text).map(|caps| caps[1].to_string()))
}

/// Finds a labelled publication date, normalized to ISO 8601
pub fn find_posted_date(text: &str) -> Option<String> {
    POSTED_DATE_RE
        .captures_iter(text)
        .find_map(|caps| normalize_date(&caps[1]))
}

/// Finds a labelled application deadline, normalized to ISO 8601
pub fn find_deadline(text: &str) -> Option<String> {
    DEADLINE_RE
        .captures_iter(text)
        .find_map(|caps| normalize_date(&caps[1]))
}

/// Field labels that follow a contact heading but are not names
const CONTACT_FIELD_LABELS: &[&str] = &[
    "telefon", "tel", "telefonnummer", "e-mail", "email", "mail", "fax", "mobil", "adresse",
    "anschrift", "phone", "kontakt",
];

/// Finds a named contact person following a contact label on the same line
pub fn find_contact_person(text: &str) -> Option<String> {
    CONTACT_PERSON_RE
        .captures_iter(text)
        .filter_map(|caps| clean_text(&caps[1]))
        .find(|name| {
            !name
                .split_whitespace()
                .any(|word| CONTACT_FIELD_LABELS.contains(&word.to_lowercase().as_str()))
        })
}

/// Finds a salary range or a single bounded salary value
pub fn find_salary(text: &str) -> Option<String> {
    SALARY_RANGE_RE
        .find(text)
        .or_else(|| SALARY_SINGLE_RE.find(text))
        .and_then(|m| clean_text(m.as_str()))
}

/// Returns every email address in the text, in order of appearance
pub fn find_emails(text: &str) -> Vec<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .collect()
}

/// Scans rendered text for every field the regexes can recognize
pub fn scan_text(text: &str) -> crate::posting::PartialPosting {
    crate::posting::PartialPosting {
        contact_person: find_contact_person(text),
        contact_phone: find_phone(text),
        posted_date: find_posted_date(text),
        application_deadline: find_deadline(text),
        salary: find_salary(text),
        reference_number: find_reference(text),
        ..Default::default()
    }
}
