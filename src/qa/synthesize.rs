//! Answer synthesis — the final oracle call over assembled context

use crate::oracle::{Oracle, OracleError};
use crate::prompts;
use std::sync::Arc;

/// Produces the final natural-language answer from retrieved context.
pub struct AnswerSynthesizer {
    oracle: Arc<dyn Oracle>,
}

impl AnswerSynthesizer {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// One call, no retry — a failure here is the terminal outcome for
    /// the question. The context is passed even when empty: the template
    /// instructs the oracle to say the knowledge base had nothing.
    pub async fn synthesize(
        &self,
        context: &str,
        question: &str,
    ) -> Result<String, OracleError> {
        self.oracle
            .complete(&prompts::synthesis_prompt(context, question))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::ScriptedOracle;

    #[tokio::test]
    async fn returns_oracle_text_verbatim() {
        let synthesizer = AnswerSynthesizer::new(Arc::new(
            ScriptedOracle::new().with_response("GARCH was used by A. Smith."),
        ));
        let answer = synthesizer.synthesize("some context", "who?").await.unwrap();
        assert_eq!(answer, "GARCH was used by A. Smith.");
    }

    #[tokio::test]
    async fn failure_surfaces_without_retry() {
        let oracle = Arc::new(ScriptedOracle::failing());
        let synthesizer = AnswerSynthesizer::new(oracle.clone());

        assert!(synthesizer.synthesize("ctx", "q").await.is_err());
        assert_eq!(oracle.call_count(), 1);
    }
}
