//! Turns raw HTML into bounded, flattened text for the model prompt.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::dom::{char_len, element_text, is_heading, parse_selector, truncate_chars};
use crate::error::ExtractionError;
use crate::models::NormalizedText;

pub const MAX_CHARS: usize = 12_000;
pub const ELLIPSIS: &str = "...";
const MIN_CONTENT_CHARS: usize = 100;
const HEAD_SENTENCES: usize = 8;
const TAIL_SENTENCES: usize = 2;
const MIN_SECTION_FRAGMENT: usize = 10;
const MIN_FALLBACK_FRAGMENT: usize = 20;
const MIN_STRUCTURED_PARTS: usize = 3;

static BOILERPLATE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script, style, nav, header, footer, aside").unwrap());

static BLOCKS: Lazy<Selector> = Lazy::new(|| Selector::parse("p, div, li").unwrap());

static HEADINGS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());

const CONTAINER_SELECTORS: &[&str] = &[
    r#"[class*="job-description"], [id*="job-description"]"#,
    r#"[class*="description"], [id*="description"]"#,
    r#"[class*="content"], [id*="content"]"#,
    r#"[class*="posting"], [id*="posting"]"#,
    "main",
    "article",
    ".content",
    "#content",
    ".job-content",
    ".posting-content",
    "body",
];

pub fn normalize(html: &str) -> Result<NormalizedText, ExtractionError> {
    let mut document = Html::parse_document(html);
    strip_boilerplate(&mut document);

    let container = find_container(&document);
    let text = collapse_whitespace(&structured_parts(container).join("\n\n"));

    let len = char_len(&text);
    tracing::debug!(chars = len, "extracted text content");
    if len < MIN_CONTENT_CHARS {
        tracing::warn!(chars = len, preview = %truncate_chars(&text, 200), "content too short, page likely blocked or script-rendered");
        return Err(ExtractionError::EmptyOrBlockedContent);
    }

    Ok(apply_budget(text))
}

/// Detach non-content subtrees so nothing downstream can see them.
fn strip_boilerplate(document: &mut Html) {
    let ids: Vec<_> = document.select(&BOILERPLATE).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn find_container(document: &Html) -> ElementRef<'_> {
    CONTAINER_SELECTORS
        .iter()
        .filter_map(|css| parse_selector(css))
        .find_map(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element())
}

/// Headings followed by their sibling blocks, or every sizeable block when the
/// page has too little heading structure.
fn structured_parts(container: ElementRef<'_>) -> Vec<String> {
    let mut parts = Vec::new();

    for heading in container.select(&HEADINGS) {
        let heading_text = element_text(heading);
        if !heading_text.is_empty() {
            parts.push(format!("\n## {heading_text}"));
        }

        let siblings = heading.next_siblings().filter_map(ElementRef::wrap);
        for sibling in siblings.take_while(|el| !is_heading(el.value().name())) {
            if matches!(sibling.value().name(), "p" | "div" | "li") {
                let content = element_text(sibling);
                if char_len(&content) > MIN_SECTION_FRAGMENT {
                    parts.push(content);
                }
            }
        }
    }

    if parts.len() < MIN_STRUCTURED_PARTS {
        parts.extend(
            container
                .select(&BLOCKS)
                .map(element_text)
                .filter(|content| char_len(content) > MIN_FALLBACK_FRAGMENT),
        );
    }

    parts
}

/// Strip every line, split on double spaces, drop empties, join with one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep the head and tail sentences of long text, never exceeding
/// `MAX_CHARS` plus the ellipsis.
pub fn apply_budget(text: String) -> NormalizedText {
    if char_len(&text) <= MAX_CHARS {
        return NormalizedText {
            content: text,
            truncated: false,
        };
    }

    let sentences: Vec<&str> = text.split(". ").collect();
    let kept = if sentences.len() > HEAD_SENTENCES + TAIL_SENTENCES {
        let tail = &sentences[sentences.len() - TAIL_SENTENCES..];
        let joined = sentences[..HEAD_SENTENCES]
            .iter()
            .chain(tail)
            .copied()
            .collect::<Vec<_>>()
            .join(". ");
        truncate_chars(&joined, MAX_CHARS).to_string()
    } else {
        truncate_chars(&text, MAX_CHARS).to_string()
    };

    tracing::debug!(
        original_chars = char_len(&text),
        kept_chars = char_len(&kept),
        sentences = sentences.len(),
        "applied length budget"
    );

    NormalizedText {
        content: format!("{kept}{ELLIPSIS}"),
        truncated: true,
    }
}
