//! Model-backed extraction and description enhancement.
//!
//! The model is asked for a fixed JSON shape. Its answer is treated as
//! untrusted: fields are allow-listed, placeholders become `null`, and fields
//! that tend to be guessed (salary, benefits, experience level) are dropped
//! unless the source text supports them.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::dom::truncate_chars;
use crate::error::ExtractionError;
use crate::llm::{ChatClient, ChatRequest, LlmError, Message};
use crate::models::{EnhancedDescription, ExtractedRecord, NormalizedText, PartialRecord, SourceStrategy};

const EXTRACT_MAX_TOKENS: u32 = 600;
const ENHANCE_MAX_TOKENS: u32 = 800;
const ENHANCE_TEMPERATURE: f32 = 0.1;

const SUMMARY_MAX: usize = 800;
const REQUIREMENTS_MAX: usize = 600;
const RESPONSIBILITIES_MAX: usize = 600;
const BENEFITS_MAX: usize = 400;

const EXTRACT_SYSTEM: &str = "You extract facts from job postings. Report only what the posting text \
states, never inferred or typical values. Respond with a single JSON object and nothing else.";

const EXTRACT_INSTRUCTIONS: &str = r#"Read the job posting below and return a JSON object with exactly these keys:
- "job_title": the position title as written
- "company": the hiring company as named
- "location": the work location if stated (city, region, country, remote, hybrid or onsite)
- "job_description": a clean description built only from the posting's own text
- "salary": the pay or compensation only if the posting states it
- "requirements": the stated requirements, qualifications and skills
- "benefits": the stated benefits or perks
- "experience_level": Entry, Mid, Senior or Executive, only if the posting says so

Rules:
- Any key whose value is not written in the posting must be null.
- Never estimate salary, benefits or experience level from market knowledge.
- Never add generic job description text.

Job posting text:
"#;

const ENHANCE_SYSTEM: &str = "You are an experienced recruiter who restructures job descriptions \
into clear sections. Respond with a single JSON object and nothing else.";

const ENHANCE_INSTRUCTIONS: &str = r#"Reorganize the job description below into a JSON object with these keys:
- "enhanced_description": a concise summary of the role, at most 800 characters
- "key_requirements": essential qualifications and skills as one string of "•" bullets, at most 600 characters
- "key_responsibilities": main duties as one string of "•" bullets, at most 600 characters
- "benefits": compensation and perks as one string of "•" bullets, at most 400 characters

Use plain professional language, drop marketing filler, and set a key to null when the description has nothing for it.

Job description:
"#;

const PLACEHOLDERS: &[&str] = &[
    "null",
    "none",
    "n/a",
    "na",
    "unknown",
    "not specified",
    "not mentioned",
    "not stated",
    "not provided",
    "not available",
];

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d(?:[\d,.]*\d)?").unwrap());

static BENEFITS_EVIDENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(benefits?|perks?|insurance|health|dental|vision|401\s?\(?k|pension|pto|paid time off|vacation|holidays?|leave|equity|stock|bonus|wellness|allowance|stipend)\b")
        .unwrap()
});

static SENIORITY_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(intern|internship|entry|junior|graduate|mid|intermediate|senior|lead|staff|principal|executive|director|head)\b")
        .unwrap()
});

/// Words after a seniority term that make it describe someone else's role.
static NOT_A_LEVEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[\s-]+(management|managers?|leadership|leaders|executives|stakeholders)\b").unwrap()
});

#[derive(Clone)]
pub struct AiNormalizer {
    client: ChatClient,
    model: String,
}

impl AiNormalizer {
    pub fn new(client: ChatClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub async fn extract_with_ai(
        &self,
        text: &NormalizedText,
        url: &str,
    ) -> Result<ExtractedRecord, ExtractionError> {
        let request = ChatRequest::new(&self.model)
            .message(Message::system(EXTRACT_SYSTEM))
            .message(Message::user(format!("{EXTRACT_INSTRUCTIONS}{}", text.content)))
            .temperature(0.0)
            .max_tokens(EXTRACT_MAX_TOKENS);

        let reply = self.client.chat_completion(&request).await.map_err(completion_error)?;
        let object = parse_object(&reply)?;
        let partial = ground_fields(&object, &text.content);

        tracing::info!(
            url,
            job_title = ?partial.job_title,
            company = ?partial.company,
            "model extraction parsed"
        );
        let record = ExtractedRecord::from_partial(url, SourceStrategy::Ai, None, partial);
        if !record.success {
            tracing::warn!(url, response = %reply, "model returned neither title nor company");
        }
        Ok(record)
    }

    pub async fn enhance(
        &self,
        description: &str,
        job_title: Option<&str>,
        company: Option<&str>,
    ) -> Result<EnhancedDescription, ExtractionError> {
        if description.trim().is_empty() {
            return Err(ExtractionError::EmptyDescription);
        }

        let mut context = String::new();
        if let Some(title) = job_title.filter(|t| !t.trim().is_empty()) {
            context.push_str(&format!("Job title: {title}\n"));
        }
        if let Some(company) = company.filter(|c| !c.trim().is_empty()) {
            context.push_str(&format!("Company: {company}\n"));
        }

        let request = ChatRequest::new(&self.model)
            .message(Message::system(ENHANCE_SYSTEM))
            .message(Message::user(format!(
                "{context}{ENHANCE_INSTRUCTIONS}{description}"
            )))
            .temperature(ENHANCE_TEMPERATURE)
            .max_tokens(ENHANCE_MAX_TOKENS);

        let reply = self.client.chat_completion(&request).await.map_err(completion_error)?;
        let object = parse_object(&reply)?;

        let section = |key: &str, max: usize| {
            field_text(&object, key).map(|s| truncate_chars(&s, max).trim_end().to_string())
        };
        Ok(EnhancedDescription {
            success: true,
            enhanced_description: section("enhanced_description", SUMMARY_MAX),
            key_requirements: section("key_requirements", REQUIREMENTS_MAX),
            key_responsibilities: section("key_responsibilities", RESPONSIBILITIES_MAX),
            benefits: section("benefits", BENEFITS_MAX),
            error: None,
        })
    }
}

fn completion_error(e: LlmError) -> ExtractionError {
    ExtractionError::Completion(e.to_string())
}

/// Remove an optional ```json / ``` fence around the reply.
pub fn strip_code_fence(reply: &str) -> &str {
    let mut s = reply.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

fn parse_object(reply: &str) -> Result<Map<String, Value>, ExtractionError> {
    let body = strip_code_fence(reply);
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => {
            tracing::error!(response = %reply, "model reply is JSON but not an object");
            Err(ExtractionError::MalformedResponse(format!(
                "expected object, got {}",
                json_kind(&other)
            )))
        }
        Err(e) => {
            tracing::error!(error = %e, response = %reply, "failed to parse model reply as JSON");
            Err(ExtractionError::MalformedResponse(e.to_string()))
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A field's text, or `None` for null, placeholders, objects and blanks.
fn field_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match object.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => return None,
    };
    let lowered = text.to_lowercase();
    if text.is_empty() || PLACEHOLDERS.contains(&lowered.as_str()) {
        return None;
    }
    Some(text)
}

/// Copy the allow-listed fields, dropping inference-prone ones the source
/// text gives no evidence for.
fn ground_fields(object: &Map<String, Value>, source: &str) -> PartialRecord {
    let salary = field_text(object, "salary").filter(|salary| salary_is_stated(salary, source));
    let benefits = field_text(object, "benefits").filter(|_| BENEFITS_EVIDENCE.is_match(source));
    let experience_level =
        field_text(object, "experience_level").filter(|level| level_is_stated(level, source));

    PartialRecord {
        job_title: field_text(object, "job_title"),
        company: field_text(object, "company"),
        location: field_text(object, "location"),
        description: field_text(object, "job_description"),
        salary,
        requirements: field_text(object, "requirements"),
        benefits,
        experience_level,
    }
}

/// Digit runs with thousands separators removed, so `120,000` and `120000`
/// compare equal.
fn numbers(text: &str) -> Vec<String> {
    NUMBER
        .find_iter(text)
        .map(|m| m.as_str().replace(',', ""))
        .collect()
}

/// Every figure in the salary must occur in the source. A salary without
/// figures ("Competitive") must occur there verbatim.
fn salary_is_stated(salary: &str, source: &str) -> bool {
    let wanted = numbers(salary);
    if wanted.is_empty() {
        return whole_word_positions(salary, source).next().is_some();
    }
    let stated: HashSet<String> = numbers(source).into_iter().collect();
    wanted.iter().all(|n| stated.contains(n))
}

/// The level, or one of its seniority words, must occur in the source as a
/// whole word that is not qualifying someone else ("senior management").
fn level_is_stated(level: &str, source: &str) -> bool {
    std::iter::once(level)
        .chain(SENIORITY_WORDS.find_iter(level).map(|m| m.as_str()))
        .any(|candidate| {
            whole_word_positions(candidate, source).any(|end| !NOT_A_LEVEL.is_match(&source[end..]))
        })
}

/// End offsets of case-insensitive whole-word occurrences of `needle`.
fn whole_word_positions<'a>(needle: &str, haystack: &'a str) -> impl Iterator<Item = usize> + 'a {
    let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(needle.trim()))).ok();
    re.into_iter()
        .flat_map(move |re| re.find_iter(haystack).map(|m| m.end()).collect::<Vec<_>>())
}
