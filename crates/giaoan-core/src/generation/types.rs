//! Request and error types shared by every [`super::Generator`].

use serde_json::Value;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Sampling temperature for free-text activity calls.
pub const TEXT_TEMPERATURE: f32 = 0.7;
/// Nucleus sampling for free-text activity calls.
pub const TEXT_TOP_P: f32 = 0.9;
/// Sampling temperature for schema-constrained refine calls.
pub const JSON_TEMPERATURE: f32 = 0.6;

/// One generation call: a prompt plus its sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub top_p: Option<f32>,
    /// When set, the model must answer with JSON matching this schema.
    pub response_schema: Option<Value>,
}

impl GenerationRequest {
    /// A free-text request with the activity sampling defaults.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: TEXT_TEMPERATURE,
            top_p: Some(TEXT_TOP_P),
            response_schema: None,
        }
    }

    /// A JSON request constrained by `schema`.
    pub fn json(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: JSON_TEMPERATURE,
            top_p: None,
            response_schema: Some(schema),
        }
    }

    /// Whether the response is expected to be JSON.
    pub fn wants_json(&self) -> bool {
        self.response_schema.is_some()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a single generation call.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request to model API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned no text{}", .reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
    EmptyResponse { reason: Option<String> },

    #[error("could not decode model API response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_request_uses_activity_sampling() {
        let req = GenerationRequest::text("xin chào");
        assert_eq!(req.temperature, 0.7);
        assert_eq!(req.top_p, Some(0.9));
        assert!(!req.wants_json());
    }

    #[test]
    fn json_request_carries_schema() {
        let req = GenerationRequest::json("p", serde_json::json!({"type": "OBJECT"}));
        assert_eq!(req.temperature, 0.6);
        assert_eq!(req.top_p, None);
        assert!(req.wants_json());
    }

    #[test]
    fn empty_response_display_includes_reason() {
        let err = GenerationError::EmptyResponse {
            reason: Some("SAFETY".to_string()),
        };
        assert_eq!(err.to_string(), "model returned no text (SAFETY)");
        let err = GenerationError::EmptyResponse { reason: None };
        assert_eq!(err.to_string(), "model returned no text");
    }
}
