use serde::Serializer;

// ── Fetch errors ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("upstream returned HTTP {0}")]
    HttpStatus(u16),
}

// ── Pipeline errors ──────────────────────────────────────────────────────────

/// Every way an extraction or enhancement can fail.
///
/// The `Display` text is the short, fixed vocabulary that ends up in the
/// `error` field of a failed record. Details live in the variant payloads and
/// in the logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("invalid URL")]
    InvalidUrl,
    #[error("missing credential")]
    MissingCredential,
    #[error("fetch failure")]
    Fetch(#[from] FetchError),
    #[error("empty or blocked content")]
    EmptyOrBlockedContent,
    #[error("AI parse failure")]
    MalformedResponse(String),
    #[error("AI request failure")]
    Completion(String),
    #[error("could not extract basic job information")]
    MinimalFieldsMissing,
    #[error("empty description")]
    EmptyDescription,
}

pub(crate) fn serialize_error<S>(error: &Option<ExtractionError>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(e) => s.serialize_str(&e.to_string()),
        None => s.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failures_share_one_message() {
        let timeout = ExtractionError::from(FetchError::Network("timed out".into()));
        let status = ExtractionError::from(FetchError::HttpStatus(404));
        assert_eq!(timeout.to_string(), "fetch failure");
        assert_eq!(status.to_string(), "fetch failure");
    }

    #[test]
    fn test_parse_failure_hides_detail() {
        let e = ExtractionError::MalformedResponse("expected value at line 1".into());
        assert_eq!(e.to_string(), "AI parse failure");
    }
}
