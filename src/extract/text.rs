//! Text cleaning and DOM text helpers shared by all parsers

use scraper::{ElementRef, Html, Selector};

/// Characters that render as nothing but break string comparisons
const INVISIBLE_CHARS: &[char] = &[
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{2060}', // word joiner
    '\u{FEFF}', // byte order mark
    '\u{00AD}', // soft hyphen
];

/// Elements that render as their own block of text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt", "figcaption",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "li", "main", "nav", "ol",
    "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Elements whose text is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Cleans an extracted string
///
/// Strips zero-width characters, collapses every whitespace run to a single space and
/// trims. Returns `None` when nothing is left, so absence is never an empty string.
///
/// # Examples
///
/// ```
/// use jobfetch::extract::clean_text;
///
/// assert_eq!(clean_text("  Senior\u{200B}   Engineer\n"), Some("Senior Engineer".to_string()));
/// assert_eq!(clean_text(" \u{FEFF} "), None);
/// ```
pub fn clean_text(text: &str) -> Option<String> {
    let visible: String = text.chars().filter(|c| !INVISIBLE_CHARS.contains(c)).collect();
    let collapsed = visible.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Returns the cleaned text content of an element
pub fn element_text(element: ElementRef<'_>) -> Option<String> {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Returns the cleaned text of the first element matching any selector
///
/// Selectors are tried in order; a selector whose first match has no text is skipped.
pub fn select_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        let selector = Selector::parse(selector).ok()?;
        document.select(&selector).find_map(element_text)
    })
}

/// Returns the trimmed attribute value of the first element matching a selector
pub fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .find_map(clean_text)
}

/// Returns the content of a `<meta>` tag identified by `property` or `name`
pub fn meta_content(document: &Html, key: &str, value: &str) -> Option<String> {
    select_attr(document, &format!("meta[{}=\"{}\"]", key, value), "content")
}

/// Finds the value of a labelled pair (`dt`/`dd` or `th`/`td`)
///
/// The label matches when its lowercase text, stripped of a trailing colon, starts
/// with one of `labels`.
pub fn labelled_value(document: &Html, labels: &[&str]) -> Option<String> {
    let selector = Selector::parse("dt, th").ok()?;

    document.select(&selector).find_map(|label| {
        let text = element_text(label)?.to_lowercase();
        let text = text.trim_end_matches(':').trim();
        if !labels.iter().any(|wanted| text.starts_with(wanted)) {
            return None;
        }

        let value_tag = if label.value().name() == "dt" { "dd" } else { "td" };
        label
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|sibling| sibling.value().name() == value_tag)
            .and_then(element_text)
    })
}

/// Collects the text of the section following a heading that contains a keyword
///
/// Headings are `h2`-`h4`, or `strong`/`b` that make up a whole paragraph. The section
/// runs until the next heading element.
pub fn section_after_heading(document: &Html, keywords: &[&str]) -> Option<String> {
    let selector = Selector::parse("h2, h3, h4, p > strong, p > b").ok()?;

    document.select(&selector).find_map(|heading| {
        let title = element_text(heading)?.to_lowercase();
        if title.chars().count() > 80 || !keywords.iter().any(|k| title.contains(k)) {
            return None;
        }

        let anchor = match heading.value().name() {
            "strong" | "b" => heading.parent().and_then(ElementRef::wrap)?,
            _ => heading,
        };

        let mut parts = Vec::new();
        for sibling in anchor.next_siblings().filter_map(ElementRef::wrap) {
            if matches!(sibling.value().name(), "h1" | "h2" | "h3" | "h4") {
                break;
            }
            if let Some(text) = element_text(sibling) {
                parts.push(text);
            }
        }

        clean_text(&parts.join(" "))
    })
}

/// Renders the visible text below `root` as lines
///
/// Text nodes sharing the nearest block ancestor stay on one line, `<br>` breaks a
/// line, hidden elements are skipped, each line is cleaned and empty lines dropped.
pub fn block_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    let mut current_block = None;

    for node in root.descendants() {
        if let Some(element) = node.value().as_element() {
            if element.name() == "br" {
                out.push('\n');
            }
            continue;
        }
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name()))
            .is_some_and(|name| HIDDEN_ELEMENTS.contains(&name));
        if hidden {
            continue;
        }

        let block = node
            .ancestors()
            .find(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|e| BLOCK_ELEMENTS.contains(&e.name()))
            })
            .map(|ancestor| ancestor.id());
        if block != current_block {
            out.push('\n');
            current_block = block;
        }
        out.push_str(text);
    }

    out.lines()
        .filter_map(clean_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the visible text of a document's body (or the whole document)
pub fn document_text(document: &Html) -> String {
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());
    block_text(body.unwrap_or_else(|| document.root_element()))
}

/// Converts an HTML fragment (as found in JSON descriptions) to cleaned text
pub fn html_fragment_text(fragment: &str) -> Option<String> {
    if !fragment.contains('<') {
        return clean_text(fragment);
    }
    let parsed = Html::parse_fragment(fragment);
    clean_text(&block_text(parsed.root_element()))
}

/// Truncates a string to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
