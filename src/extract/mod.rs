//! Page content extraction
//!
//! This module provides the building blocks every parser uses:
//! - Text cleaning and selector helpers (`text`)
//! - Regex scans for phones, dates, salaries and references (`patterns`)
//! - Contact email selection (`email`)
//! - Link, mailto and raw text extraction from a cleaned DOM copy (`links`)

mod email;
mod links;
mod patterns;
mod text;

pub use email::{is_contact_candidate, select_contact_email};
pub use links::{cleaned_document, extract_page_content};
pub(crate) use links::mailto_addresses;
pub use patterns::{
    find_contact_person, find_deadline, find_emails, find_phone, find_posted_date,
    find_reference, find_salary, normalize_date, scan_text, AGENCY_REFERENCE_RE,
};
pub use text::{
    block_text, clean_text, document_text, element_text, html_fragment_text, labelled_value,
    meta_content, section_after_heading, select_attr, select_text, truncate_chars,
};
