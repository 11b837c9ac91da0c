//! Language-model backed judgements: "are these the same entity?",
//! "what kind of line is this phone number?" and "whose name is this?".
//!
//! Both traits return `Result`; callers in the engine fail closed (a failed
//! comparison is "not the same", a failed classification is `Unknown`).

mod openai;

use async_trait::async_trait;
use ownertrace_core::{PersonName, PhoneLabel};

use crate::error::ScraperError;

pub use openai::OpenAiOracle;

/// Free-form comparison of two names or addresses.
#[async_trait]
pub trait SemanticOracle: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the oracle cannot be reached or answers
    /// with something other than a boolean.
    async fn same_entity(&self, a: &str, b: &str) -> Result<bool, ScraperError>;
}

/// Phone line-type classification.
#[async_trait]
pub trait PhoneClassifier: Send + Sync {
    /// Classifies a single `(AAA) BBB-CCCC` number.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the classifier cannot be reached.
    async fn classify(&self, number: &str) -> Result<PhoneLabel, ScraperError>;

    /// Classifies many candidates in one request, returning the raw response
    /// lines (expected shape `<number> <sep> <label>`).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the classifier cannot be reached.
    async fn classify_batch(&self, numbers: &[String]) -> Result<Vec<String>, ScraperError>;
}

/// Pulls a first and last name out of a noisy string such as
/// `"JOHN DOE TRUSTEE"`.
#[async_trait]
pub trait NameExtractor: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the extractor cannot be reached or its
    /// answer names neither a first nor a last name.
    async fn extract_name(&self, raw: &str) -> Result<PersonName, ScraperError>;
}

/// Stand-in used when no language model is configured. Every call fails, so
/// matching falls back to heuristics only and all phones are `Unknown`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledOracle;

#[async_trait]
impl SemanticOracle for DisabledOracle {
    async fn same_entity(&self, _a: &str, _b: &str) -> Result<bool, ScraperError> {
        Err(ScraperError::Oracle("no language model configured".to_string()))
    }
}

#[async_trait]
impl PhoneClassifier for DisabledOracle {
    async fn classify(&self, _number: &str) -> Result<PhoneLabel, ScraperError> {
        Err(ScraperError::Oracle("no language model configured".to_string()))
    }

    async fn classify_batch(&self, _numbers: &[String]) -> Result<Vec<String>, ScraperError> {
        Err(ScraperError::Oracle("no language model configured".to_string()))
    }
}

#[async_trait]
impl NameExtractor for DisabledOracle {
    async fn extract_name(&self, _raw: &str) -> Result<PersonName, ScraperError> {
        Err(ScraperError::Oracle("no language model configured".to_string()))
    }
}
