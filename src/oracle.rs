//! Oracle client — the external completion capability
//!
//! One trait covers the three call sites (entity extraction, query
//! routing, answer synthesis). Two implementations:
//! - `HttpOracle`: OpenAI-compatible chat-completions endpoint (production)
//! - `ScriptedOracle`: returns preconfigured responses (testing)

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Errors from a single oracle call. All variants are retryable at the
/// extraction layer; routing and synthesis treat any of them as a miss.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OracleError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("response missing field: {0}")]
    MissingField(&'static str),
}

/// The external natural-language completion capability.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Send one prompt, get the raw completion text back.
    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Configuration for the HTTP oracle.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Chat-completions endpoint URL
    pub endpoint: String,
    /// Model name sent in the request payload
    pub model: String,
    /// Bearer token; local endpoints typically need none
    pub api_key: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/v1/chat/completions".to_string(),
            model: "llama3.1:8b".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl OracleConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Production oracle speaking the OpenAI-compatible chat protocol.
pub struct HttpOracle {
    config: OracleConfig,
    client: reqwest::Client,
}

impl HttpOracle {
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Oracle for HttpOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.0,
        });

        let mut request = self.client.post(&self.config.endpoint).json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(OracleError::MissingField("choices[0].message.content"))
    }
}

/// Extract a JSON object from completion text.
///
/// Models sometimes wrap JSON in markdown fences or add explanation text.
/// Tries, in order: direct parse, ```json fenced block, first-`{` to
/// last-`}` span.
pub fn extract_json(text: &str) -> Option<Value> {
    extract_json_with(text, '{', '}', Value::is_object)
}

/// Array variant of [`extract_json`] for calls expecting a JSON list.
pub fn extract_json_array(text: &str) -> Option<Value> {
    extract_json_with(text, '[', ']', Value::is_array)
}

fn extract_json_with(text: &str, open: char, close: char, accept: fn(&Value) -> bool) -> Option<Value> {
    let trimmed = text.trim();

    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        if accept(&v) {
            return Some(v);
        }
    }

    let fenced = if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        after.find("```").map(|end| &after[..end])
    } else if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        after.find("```").map(|end| &after[..end])
    } else {
        None
    };
    if let Some(block) = fenced {
        if let Ok(v) = serde_json::from_str::<Value>(block.trim()) {
            if accept(&v) {
                return Some(v);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
        if start < end {
            if let Ok(v) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                if accept(&v) {
                    return Some(v);
                }
            }
        }
    }

    None
}

/// Scripted oracle for tests — pops queued responses in order, then falls
/// back to a default response, then to a transport failure. Counts every
/// call so retry bounds are observable.
pub struct ScriptedOracle {
    queue: Mutex<VecDeque<Result<String, String>>>,
    default: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            default: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Oracle whose every call fails with a transport error.
    pub fn failing() -> Self {
        Self::new()
    }

    /// Queue a successful response.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(Ok(response.into()));
        self
    }

    /// Queue a transport failure.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(Err(message.into()));
        self
    }

    /// Response returned whenever the queue is empty.
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default = Some(response.into());
        self
    }

    /// How many `complete` calls this oracle has served.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, _prompt: &str) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.queue.lock().unwrap().pop_front() {
            return next.map_err(OracleError::Transport);
        }
        match &self.default {
            Some(response) => Ok(response.clone()),
            None => Err(OracleError::Transport(
                "scripted oracle has no response queued".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_oracle_pops_in_order_then_uses_default() {
        let oracle = ScriptedOracle::new()
            .with_response("first")
            .with_response("second")
            .with_default("fallback");

        assert_eq!(oracle.complete("q").await.unwrap(), "first");
        assert_eq!(oracle.complete("q").await.unwrap(), "second");
        assert_eq!(oracle.complete("q").await.unwrap(), "fallback");
        assert_eq!(oracle.call_count(), 3);
    }

    #[tokio::test]
    async fn scripted_oracle_without_responses_fails() {
        let oracle = ScriptedOracle::failing();
        let err = oracle.complete("q").await.unwrap_err();
        assert!(matches!(err, OracleError::Transport(_)));
    }

    #[test]
    fn extract_json_direct() {
        let v = extract_json(r#"{"topics": ["a"]}"#).unwrap();
        assert_eq!(v["topics"][0], "a");
    }

    #[test]
    fn extract_json_from_fenced_block() {
        let text = "Here you go:\n```json\n{\"methodologies\": [\"GARCH\"]}\n```\nHope that helps.";
        let v = extract_json(text).unwrap();
        assert_eq!(v["methodologies"][0], "GARCH");
    }

    #[test]
    fn extract_json_from_brace_span() {
        let text = "The entities are {\"topics\": []} as requested.";
        assert!(extract_json(text).is_some());
    }

    #[test]
    fn extract_json_rejects_garbage() {
        assert!(extract_json("no json here").is_none());
        // an array is not an object
        assert!(extract_json(r#"["a", "b"]"#).is_none());
    }

    #[test]
    fn extract_json_array_variants() {
        assert!(extract_json_array(r#"["GARCH", "LSTM"]"#).is_some());
        assert!(extract_json_array("```json\n[\"x\"]\n```").is_some());
        assert!(extract_json_array("mentions: [\"a\"] found").is_some());
        assert!(extract_json_array(r#"{"not": "an array"}"#).is_none());
    }
}
