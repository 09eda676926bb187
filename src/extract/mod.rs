//! Entity extraction layer
//!
//! The extraction oracle is unreliable: responses can be late, malformed,
//! or missing fields. This layer turns that into a clean contract — a
//! bounded-retry client returning either structured entities or a typed
//! exhaustion failure — plus the controlled vocabulary that biases each
//! call toward reusing topic names already in the graph.

mod client;
mod retry;
mod vocabulary;

pub use client::{EntityExtractionClient, ExtractedEntities, ExtractionExhausted};
pub use retry::{NoopSleeper, RetryPolicy, Sleeper, TokioSleeper};
pub use vocabulary::ControlledVocabulary;
