//! Job-posting extraction: fetch a listing, pick a strategy (known-site
//! selectors, generic heuristics or a language model) and return a normalized
//! record with a success verdict.

pub mod ai;
pub mod config;
pub mod dom;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod generic;
pub mod llm;
pub mod models;
pub mod normalize;
pub mod routes;
pub mod sites;
pub mod structured;

pub use error::{ExtractionError, FetchError};
pub use extract::{extract_from_html, Pipeline};
pub use models::{EnhancedDescription, ExtractedRecord, ExtractionMode, SourceStrategy};
