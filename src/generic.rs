//! Heuristic extraction for pages with no site profile.
//!
//! Company and location come from keyword proximity: a text node containing a
//! keyword nominates its parent element. This is a weak heuristic that both
//! over- and under-matches ("inc" hits "including"); it is kept exactly as is.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::dom::{char_len, element_text, parse_selector, truncate_chars};
use crate::models::PartialRecord;

const TITLE_LEN: (usize, usize) = (5, 200);
const PARENT_TEXT_LEN: (usize, usize) = (2, 100);
const MIN_DESCRIPTION_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 2000;

const COMPANY_KEYWORDS: &[&str] = &[
    "company",
    "employer",
    "organization",
    "corporation",
    "inc",
    "llc",
    "ltd",
    "corp",
];

const LOCATION_KEYWORDS: &[&str] = &[
    "location", "address", "city", "state", "country", "remote", "hybrid", "onsite",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"div[class*="description"]"#,
    r#"div[class*="content"]"#,
    r#"div[class*="details"]"#,
    r#"section[class*="description"]"#,
    r#"article[class*="description"]"#,
];

static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());

static COMPANY_RES: Lazy<Vec<Regex>> = Lazy::new(|| keyword_regexes(COMPANY_KEYWORDS));
static LOCATION_RES: Lazy<Vec<Regex>> = Lazy::new(|| keyword_regexes(LOCATION_KEYWORDS));

fn keyword_regexes(keywords: &[&str]) -> Vec<Regex> {
    keywords
        .iter()
        .map(|k| Regex::new(&format!("(?i){}", regex::escape(k))).unwrap())
        .collect()
}

pub fn extract_generic(document: &Html) -> PartialRecord {
    PartialRecord {
        job_title: find_title(document),
        company: find_near_keyword(document, &COMPANY_RES),
        location: find_near_keyword(document, &LOCATION_RES),
        description: find_description(document),
        ..Default::default()
    }
}

fn within(len: usize, (min, max): (usize, usize)) -> bool {
    (min..=max).contains(&len)
}

fn find_title(document: &Html) -> Option<String> {
    document
        .select(&H1)
        .map(element_text)
        .find(|text| within(char_len(text), TITLE_LEN))
}

/// Keywords are tried in order; within a keyword, text nodes in document order.
fn find_near_keyword(document: &Html, keywords: &[Regex]) -> Option<String> {
    keywords.iter().find_map(|re| {
        document.root_element().descendants().find_map(|node| {
            let text = node.value().as_text()?;
            if !re.is_match(text) {
                return None;
            }
            let parent = node.parent().and_then(ElementRef::wrap)?;
            let parent_text = element_text(parent);
            within(char_len(&parent_text), PARENT_TEXT_LEN).then_some(parent_text)
        })
    })
}

fn find_description(document: &Html) -> Option<String> {
    DESCRIPTION_SELECTORS.iter().find_map(|css| {
        let sel = parse_selector(css)?;
        let text = document
            .select(&sel)
            .map(element_text)
            .find(|text| char_len(text) > MIN_DESCRIPTION_LEN)?;
        Some(truncate_chars(&text, MAX_DESCRIPTION_LEN).to_string())
    })
}
