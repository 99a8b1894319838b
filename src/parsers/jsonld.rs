//! schema.org `JobPosting` extraction from JSON-LD script blocks

use crate::extract::{clean_text, html_fragment_text, normalize_date};
use crate::posting::PartialPosting;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use std::sync::LazyLock;

static LD_JSON_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script[type='application/ld+json']").expect("valid JSON-LD selector")
});

/// Extracts the first `JobPosting` found in the page's JSON-LD blocks
///
/// A `JobPosting` may be the top-level object, an element of a top-level array or an
/// entry of an `@graph`. Blocks that do not parse as JSON are skipped.
pub fn extract_json_ld(document: &Html) -> Option<PartialPosting> {
    document.select(&LD_JSON_SELECTOR).find_map(|script| {
        let raw = script.text().collect::<String>();
        let value = parse_lenient(&raw)?;
        let posting = find_job_posting(&value)?;
        tracing::debug!("Found JSON-LD JobPosting");
        Some(posting_fields(posting))
    })
}

/// Parses JSON, retrying with raw control characters replaced
///
/// Many sites embed descriptions with literal newlines inside JSON strings.
fn parse_lenient(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    serde_json::from_str(raw).ok().or_else(|| {
        let sanitized: String = raw
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        serde_json::from_str(&sanitized).ok()
    })
}

fn is_job_posting(object: &Map<String, Value>) -> bool {
    match object.get("@type") {
        Some(Value::String(kind)) => kind == "JobPosting",
        Some(Value::Array(kinds)) => kinds.iter().any(|k| k.as_str() == Some("JobPosting")),
        _ => false,
    }
}

fn find_job_posting(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(object) if is_job_posting(object) => Some(object),
        Value::Object(object) => object.get("@graph").and_then(find_job_posting),
        Value::Array(items) => items.iter().find_map(find_job_posting),
        _ => None,
    }
}

fn posting_fields(posting: &Map<String, Value>) -> PartialPosting {
    let mut fields = PartialPosting {
        title: posting.get("title").and_then(text_value),
        description: posting
            .get("description")
            .and_then(Value::as_str)
            .and_then(html_fragment_text),
        company: posting.get("hiringOrganization").and_then(organization_name),
        location: location(posting),
        posted_date: posting
            .get("datePosted")
            .and_then(Value::as_str)
            .and_then(normalize_date),
        application_deadline: posting
            .get("validThrough")
            .and_then(Value::as_str)
            .and_then(normalize_date),
        employment_type: posting.get("employmentType").and_then(employment_type),
        salary: posting.get("baseSalary").and_then(format_salary),
        reference_number: posting.get("identifier").and_then(identifier),
        requirements: ["qualifications", "experienceRequirements", "skills"]
            .iter()
            .find_map(|key| posting.get(*key).and_then(requirement_text)),
        ..Default::default()
    };

    if let Some(Value::Object(contact)) = posting.get("applicationContact") {
        fields.contact_person = contact.get("name").and_then(text_value);
        fields.contact_email = contact
            .get("email")
            .and_then(Value::as_str)
            .map(|email| email.trim().trim_start_matches("mailto:").to_lowercase())
            .filter(|email| email.contains('@'));
        fields.contact_phone = contact.get("telephone").and_then(text_value);
    }

    fields
}

/// Cleans a string or number value
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => html_fragment_text(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn organization_name(value: &Value) -> Option<String> {
    match value {
        Value::Object(organization) => organization.get("name").and_then(text_value),
        Value::String(name) => clean_text(name),
        Value::Array(items) => items.iter().find_map(organization_name),
        _ => None,
    }
}

/// Renders `jobLocation` as `"{postalCode} {locality}"`, several places joined by `"; "`
///
/// Falls back to `"Remote"` for telecommute postings without a place.
fn location(posting: &Map<String, Value>) -> Option<String> {
    let places: Vec<String> = match posting.get("jobLocation") {
        Some(Value::Array(items)) => items.iter().filter_map(place_name).collect(),
        Some(value) => place_name(value).into_iter().collect(),
        None => Vec::new(),
    };

    let mut unique: Vec<String> = Vec::new();
    for place in places {
        if !unique.contains(&place) {
            unique.push(place);
        }
    }

    if !unique.is_empty() {
        return Some(unique.join("; "));
    }

    let remote = posting
        .get("jobLocationType")
        .and_then(Value::as_str)
        .is_some_and(|kind| kind.eq_ignore_ascii_case("TELECOMMUTE"));
    remote.then(|| "Remote".to_string())
}

fn place_name(value: &Value) -> Option<String> {
    let address = match value {
        Value::Object(place) => place.get("address").unwrap_or(value),
        Value::String(name) => return clean_text(name),
        _ => return None,
    };

    match address {
        Value::String(text) => clean_text(text),
        Value::Object(address) => {
            let field = |key: &str| address.get(key).and_then(text_value);
            let locality = field("addressLocality");

            match (field("postalCode"), locality) {
                (Some(code), Some(city)) => Some(format!("{} {}", code, city)),
                (None, Some(city)) => Some(city),
                (_, None) => field("addressRegion").or_else(|| {
                    address.get("addressCountry").and_then(|country| match country {
                        Value::Object(country) => country.get("name").and_then(text_value),
                        other => text_value(other),
                    })
                }),
            }
        }
        _ => None,
    }
}

/// Maps schema.org employment types to their German labels
///
/// Unknown values are kept as they are.
pub fn map_employment_type(value: &str) -> String {
    let label = match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
        "FULL_TIME" => "Vollzeit",
        "PART_TIME" => "Teilzeit",
        "CONTRACTOR" => "Freiberuflich",
        "TEMPORARY" => "Befristet",
        "INTERN" => "Praktikum",
        "VOLUNTEER" => "Ehrenamt",
        "PER_DIEM" => "Tageweise",
        "OTHER" => "Sonstiges",
        _ => return value.trim().to_string(),
    };
    label.to_string()
}

fn employment_type(value: &Value) -> Option<String> {
    let labels: Vec<String> = match value {
        Value::String(kind) => kind
            .split(',')
            .filter(|kind| !kind.trim().is_empty())
            .map(map_employment_type)
            .collect(),
        Value::Array(kinds) => kinds
            .iter()
            .filter_map(Value::as_str)
            .filter(|kind| !kind.trim().is_empty())
            .map(map_employment_type)
            .collect(),
        _ => Vec::new(),
    };

    clean_text(&labels.join(", "))
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::Object(identifier) => identifier.get("value").and_then(text_value),
        other => text_value(other),
    }
}

fn requirement_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => html_fragment_text(text),
        Value::Object(object) => object
            .get("description")
            .or_else(|| object.get("name"))
            .and_then(requirement_text),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(requirement_text).collect();
            clean_text(&parts.join("; "))
        }
        _ => None,
    }
}

/// Renders a number without a fractional part when it is whole
fn format_amount(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => match (number.as_i64(), number.as_f64()) {
            (Some(whole), _) => Some(whole.to_string()),
            (None, Some(float)) if float.fract() == 0.0 => Some(format!("{:.0}", float)),
            (None, Some(float)) => Some(float.to_string()),
            _ => None,
        },
        Value::String(text) => clean_text(text),
        _ => None,
    }
}

/// Renders `baseSalary` as `"{min}-{max} {currency}"` or `"{value} {currency}"`
fn format_salary(value: &Value) -> Option<String> {
    let salary = match value {
        Value::Object(salary) => salary,
        other => return format_amount(other),
    };

    let currency = salary
        .get("currency")
        .and_then(Value::as_str)
        .and_then(clean_text);

    let amount = match salary.get("value") {
        Some(Value::Object(quantity)) => {
            let min = quantity.get("minValue").and_then(format_amount);
            let max = quantity.get("maxValue").and_then(format_amount);
            match (min, max) {
                (Some(min), Some(max)) if min == max => Some(min),
                (Some(min), Some(max)) => Some(format!("{}-{}", min, max)),
                (Some(single), None) | (None, Some(single)) => Some(single),
                (None, None) => quantity.get("value").and_then(format_amount),
            }
        }
        Some(other) => format_amount(other),
        None => None,
    }?;

    match currency {
        Some(currency) => Some(format!("{} {}", amount, currency)),
        None => Some(amount),
    }
}
