use scraper::Html;
use url::Url;

use crate::ai::AiNormalizer;
use crate::config::Config;
use crate::error::ExtractionError;
use crate::fetch::Fetcher;
use crate::generic::extract_generic;
use crate::llm::ChatClient;
use crate::models::{EnhancedDescription, ExtractedRecord, ExtractionMode, RawPage, SourceStrategy};
use crate::normalize::normalize;
use crate::sites::{classify, SiteProfile};
use crate::structured;

// ── Pipeline ─────────────────────────────────────────────────────────────────

/// Fetch, classify and extract one job posting per call.
///
/// Holds only immutable handles, so a single instance serves concurrent
/// requests.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: Fetcher,
    ai: Option<AiNormalizer>,
}

impl Pipeline {
    pub fn new(fetcher: Fetcher, ai: Option<AiNormalizer>) -> Self {
        Self { fetcher, ai }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let fetcher = Fetcher::new(config.fetch_timeout, config.insecure_ssl)?;
        let ai = match &config.openai_api_key {
            Some(key) => {
                let client = ChatClient::new(key.clone(), config.completion_timeout)?
                    .with_base_url(config.openai_base_url.clone());
                Some(AiNormalizer::new(client, config.model.clone()))
            }
            None => {
                tracing::info!("no model credential configured, AI extraction disabled");
                None
            }
        };
        Ok(Self::new(fetcher, ai))
    }

    /// Never fails: every error becomes a `success: false` record.
    pub async fn extract(&self, url: &str, mode: ExtractionMode) -> ExtractedRecord {
        match self.try_extract(url, mode).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(url, error = ?e, "extraction failed");
                ExtractedRecord::failure(url, e)
            }
        }
    }

    async fn try_extract(
        &self,
        url: &str,
        mode: ExtractionMode,
    ) -> Result<ExtractedRecord, ExtractionError> {
        let parsed = validate_url(url)?;
        let profile = classify(&parsed);
        let strategies = plan(mode, profile, self.ai.is_some())?;
        tracing::debug!(url, ?strategies, "planned extraction");

        let page = self.fetcher.fetch(&parsed).await?;

        // The parsed DOM is not Send; keep it out of any await.
        let heuristic = match run_heuristics(url, &page, profile, &strategies) {
            Some(record) if record.success => return Ok(record),
            other => other,
        };

        match (&self.ai, strategies.contains(&SourceStrategy::Ai)) {
            (Some(ai), true) => {
                let result = match normalize(&page.html) {
                    Ok(text) => {
                        tracing::info!(
                            url,
                            chars = text.content.chars().count(),
                            truncated = text.truncated,
                            "sending normalized text to model"
                        );
                        ai.extract_with_ai(&text, url).await
                    }
                    Err(e) => Err(e),
                };
                Ok(result.unwrap_or_else(|e| {
                    tracing::warn!(url, error = ?e, "model extraction failed");
                    ExtractedRecord::strategy_failure(url, SourceStrategy::Ai, e)
                }))
            }
            _ => heuristic.ok_or(ExtractionError::MinimalFieldsMissing),
        }
    }

    pub async fn enhance(
        &self,
        description: &str,
        job_title: Option<&str>,
        company: Option<&str>,
    ) -> EnhancedDescription {
        let result = match &self.ai {
            Some(ai) => ai.enhance(description, job_title, company).await,
            None => Err(ExtractionError::MissingCredential),
        };
        result.unwrap_or_else(|e| {
            tracing::warn!(error = ?e, "description enhancement failed");
            EnhancedDescription::failure(e)
        })
    }
}

// ── URL validation ───────────────────────────────────────────────────────────

/// Absolute URL with an explicit `//` authority and a non-empty host.
pub fn validate_url(url: &str) -> Result<Url, ExtractionError> {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed).map_err(|_| ExtractionError::InvalidUrl)?;
    // `http:example.com` parses with a host; require the authority to be written.
    let has_authority = trimmed
        .get(parsed.scheme().len()..)
        .is_some_and(|rest| rest.starts_with("://"));
    match parsed.host_str() {
        Some(host) if has_authority && !host.is_empty() => Ok(parsed),
        _ => Err(ExtractionError::InvalidUrl),
    }
}

// ── Strategy planning ────────────────────────────────────────────────────────

/// Ordered strategies for a request, decided before any network call.
pub fn plan(
    mode: ExtractionMode,
    profile: Option<&SiteProfile>,
    ai_available: bool,
) -> Result<Vec<SourceStrategy>, ExtractionError> {
    let mut strategies = Vec::new();
    if mode == ExtractionMode::Ai {
        if !ai_available {
            return Err(ExtractionError::MissingCredential);
        }
        strategies.push(SourceStrategy::Ai);
        return Ok(strategies);
    }

    if profile.is_some() {
        strategies.push(SourceStrategy::KnownSite);
    }
    strategies.push(SourceStrategy::Generic);
    if mode == ExtractionMode::Auto && ai_available {
        strategies.push(SourceStrategy::Ai);
    }
    Ok(strategies)
}

/// Run the selector and heuristic strategies in order. Returns the first
/// successful record, else the last failed one, else `None` if the plan had
/// no heuristic strategy. Records carry `url` as the caller gave it.
fn run_heuristics(
    url: &str,
    page: &RawPage,
    profile: Option<&SiteProfile>,
    strategies: &[SourceStrategy],
) -> Option<ExtractedRecord> {
    if strategies.iter().all(|s| *s == SourceStrategy::Ai) {
        return None;
    }
    let document = Html::parse_document(&page.html);
    let mut last = None;

    for strategy in strategies {
        let record = match (strategy, profile) {
            (SourceStrategy::KnownSite, Some(profile)) => ExtractedRecord::from_partial(
                url,
                SourceStrategy::KnownSite,
                Some(profile.id),
                structured::extract(&document, profile),
            ),
            (SourceStrategy::Generic, _) => ExtractedRecord::from_partial(
                url,
                SourceStrategy::Generic,
                None,
                extract_generic(&document),
            ),
            _ => continue,
        };

        tracing::info!(
            url,
            strategy = ?strategy,
            success = record.success,
            job_title = ?record.job_title,
            company = ?record.company,
            "heuristic extraction finished"
        );
        if record.success {
            return Some(record);
        }
        last = Some(record);
    }
    last
}

/// Selector and heuristic extraction over already-fetched HTML.
pub fn extract_from_html(html: &str, url: &str) -> ExtractedRecord {
    let profile = validate_url(url).ok().and_then(|u| classify(&u));
    let page = RawPage {
        url: url.to_string(),
        html: html.to_string(),
        fetched_at: chrono::Utc::now(),
    };
    let strategies = [SourceStrategy::KnownSite, SourceStrategy::Generic];
    run_heuristics(url, &page, profile, &strategies)
        .unwrap_or_else(|| ExtractedRecord::failure(url, ExtractionError::MinimalFieldsMissing))
}
