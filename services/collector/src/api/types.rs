use event_filter::Event;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub status: String,
    pub recorded: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformRequest {
    pub event: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformResponse {
    /// `None` when the event was suppressed.
    pub event: Option<Event>,
    pub outcome: String,
    #[serde(default)]
    pub match_kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(default)]
    pub details: Option<Value>,
}
