//! Entity extraction client — bounded-retry calls to the oracle
//!
//! Wraps the oracle's `complete` call with the extraction prompt, a retry
//! loop over transport and shape failures, and tolerant parsing of the
//! structured output. Exhaustion is a typed value, not a panic: the
//! builder degrades to a per-paper skip.

use super::retry::{RetryPolicy, Sleeper, TokioSleeper};
use super::vocabulary::ControlledVocabulary;
use crate::oracle::{extract_json, Oracle, OracleError};
use crate::prompts;
use serde::Deserialize;
use std::sync::Arc;

/// Structured entities extracted from one abstract.
///
/// Every field defaults to empty: the oracle may omit any of them, and
/// extra keys in its output are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExtractedEntities {
    #[serde(default)]
    pub methodologies: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.methodologies.is_empty() && self.datasets.is_empty() && self.topics.is_empty()
    }
}

/// All retries used without a parseable response.
#[derive(Debug, thiserror::Error)]
#[error("entity extraction exhausted after {attempts} attempts: {last_error}")]
pub struct ExtractionExhausted {
    pub attempts: u32,
    pub last_error: OracleError,
}

/// Calls the extraction oracle with retry/backoff and normalizes its
/// output into [`ExtractedEntities`].
pub struct EntityExtractionClient {
    oracle: Arc<dyn Oracle>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl EntityExtractionClient {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Extract entities from an abstract, biasing topic naming toward the
    /// vocabulary snapshot taken at call time.
    pub async fn extract(
        &self,
        abstract_text: &str,
        vocabulary: &ControlledVocabulary,
    ) -> Result<ExtractedEntities, ExtractionExhausted> {
        let prompt = prompts::extraction_prompt(abstract_text, &vocabulary.prompt_snapshot());

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(&prompt).await {
                Ok(entities) => return Ok(entities),
                Err(error) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        %error,
                        "extraction attempt failed"
                    );
                    if attempt >= self.policy.max_attempts {
                        return Err(ExtractionExhausted {
                            attempts: attempt,
                            last_error: error,
                        });
                    }
                    self.sleeper.sleep(self.policy.delay).await;
                }
            }
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<ExtractedEntities, OracleError> {
        let raw = self.oracle.complete(prompt).await?;
        let value = extract_json(&raw).ok_or_else(|| {
            OracleError::MalformedResponse("no JSON object in extraction response".to_string())
        })?;
        serde_json::from_value(value)
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))
    }
}
