use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{serialize_error, ExtractionError};

// ── HTTP requests ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
    #[serde(default)]
    pub mode: ExtractionMode,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    pub description: String,
    pub job_title: Option<String>,
    pub company: Option<String>,
}

/// Which strategies a request may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Selectors and heuristics, then the model if a credential is configured.
    #[default]
    Auto,
    /// Selectors and heuristics only.
    Scrape,
    /// The model only.
    Ai,
}

// ── Pipeline values ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RawPage {
    pub url: String,
    pub html: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub content: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStrategy {
    KnownSite,
    Generic,
    Ai,
}

/// Fields recovered by one strategy, before the success gate is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecord {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub salary: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub experience_level: Option<String>,
}

impl PartialRecord {
    /// Title or company must be present for any strategy to count as a success.
    pub fn has_minimal_fields(&self) -> bool {
        let present = |f: &Option<String>| f.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.job_title) || present(&self.company)
    }
}

// ── Public result types ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedRecord {
    pub success: bool,
    pub url: String,
    pub source_strategy: Option<SourceStrategy>,
    pub site: Option<String>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub salary: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub experience_level: Option<String>,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<ExtractionError>,
}

impl ExtractedRecord {
    /// Build the record for a strategy's output, applying the minimal-fields gate.
    pub fn from_partial(
        url: &str,
        strategy: SourceStrategy,
        site: Option<&str>,
        partial: PartialRecord,
    ) -> Self {
        let error = (!partial.has_minimal_fields()).then_some(ExtractionError::MinimalFieldsMissing);
        Self {
            success: error.is_none(),
            url: url.to_string(),
            source_strategy: Some(strategy),
            site: site.map(str::to_string),
            job_title: partial.job_title,
            company: partial.company,
            location: partial.location,
            description: partial.description,
            salary: partial.salary,
            requirements: partial.requirements,
            benefits: partial.benefits,
            experience_level: partial.experience_level,
            error,
        }
    }

    /// A failure that happened before any strategy ran.
    pub fn failure(url: &str, error: ExtractionError) -> Self {
        Self::failed(url, None, error)
    }

    /// A strategy ran but could not produce fields.
    pub fn strategy_failure(url: &str, strategy: SourceStrategy, error: ExtractionError) -> Self {
        Self::failed(url, Some(strategy), error)
    }

    fn failed(url: &str, source_strategy: Option<SourceStrategy>, error: ExtractionError) -> Self {
        Self {
            success: false,
            url: url.to_string(),
            source_strategy,
            site: None,
            job_title: None,
            company: None,
            location: None,
            description: None,
            salary: None,
            requirements: None,
            benefits: None,
            experience_level: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnhancedDescription {
    pub success: bool,
    pub enhanced_description: Option<String>,
    pub key_requirements: Option<String>,
    pub key_responsibilities: Option<String>,
    pub benefits: Option<String>,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<ExtractionError>,
}

impl EnhancedDescription {
    pub fn failure(error: ExtractionError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_requires_title_or_company() {
        let mut partial = PartialRecord {
            location: Some("Remote".into()),
            description: Some("Long description".into()),
            ..Default::default()
        };
        assert!(!partial.has_minimal_fields());

        partial.company = Some("   ".into());
        assert!(!partial.has_minimal_fields());

        partial.company = Some("Acme".into());
        assert!(partial.has_minimal_fields());
    }

    #[test]
    fn test_gate_is_identical_for_every_strategy() {
        for strategy in [SourceStrategy::KnownSite, SourceStrategy::Generic, SourceStrategy::Ai] {
            let record = ExtractedRecord::from_partial(
                "https://jobs.example.com/1",
                strategy,
                None,
                PartialRecord::default(),
            );
            assert!(!record.success);
            assert_eq!(record.error, Some(ExtractionError::MinimalFieldsMissing));
            assert_eq!(record.source_strategy, Some(strategy));
        }
    }

    #[test]
    fn test_record_serializes_error_as_message() {
        let record = ExtractedRecord::failure("notaurl", ExtractionError::InvalidUrl);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "invalid URL");
        assert_eq!(json["url"], "notaurl");
        assert!(json["job_title"].is_null());
        assert!(json["source_strategy"].is_null());
    }

    #[test]
    fn test_strategy_failure_keeps_the_strategy() {
        let record = ExtractedRecord::strategy_failure(
            "https://jobs.example.com/1",
            SourceStrategy::Ai,
            ExtractionError::EmptyOrBlockedContent,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["source_strategy"], "ai");
        assert_eq!(json["error"], "empty or blocked content");
        assert!(json["site"].is_null());
    }

    #[test]
    fn test_mode_defaults_to_auto() {
        let req: ExtractRequest = serde_json::from_str(r#"{"url":"https://a.b/c"}"#).unwrap();
        assert_eq!(req.mode, ExtractionMode::Auto);
        let req: ExtractRequest =
            serde_json::from_str(r#"{"url":"https://a.b/c","mode":"scrape"}"#).unwrap();
        assert_eq!(req.mode, ExtractionMode::Scrape);
    }
}
