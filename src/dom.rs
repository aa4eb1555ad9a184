//! Small DOM helpers shared by the extractors and the normalizer.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Recursively collect all text from an element and its descendants.
pub fn collect_text(el: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for child in el.children() {
        match child.value() {
            Node::Text(text) => parts.push((&*text.text).to_string()),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    parts.push(collect_text(child_el));
                }
            }
            _ => {}
        }
    }
    parts.join("")
}

/// Collapse whitespace and trim.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed, whitespace-collapsed text of an element.
pub fn element_text(el: ElementRef<'_>) -> String {
    normalize_text(&collect_text(el))
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Cut `s` to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Parse a selector, logging and skipping the ones scraper rejects.
pub fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::debug!(selector = css, error = ?e, "skipping unparseable selector");
            None
        }
    }
}

/// First element matching `css` whose text is non-empty.
pub fn first_text(document: &Html, css: &str) -> Option<String> {
    let sel = parse_selector(css)?;
    let text = document
        .select(&sel)
        .map(element_text)
        .find(|text| !text.is_empty());
    text
}

pub fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}
