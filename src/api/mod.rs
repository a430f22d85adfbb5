//! Streaming generation layer for the supported LLM backends

mod request;
mod sse;
mod streaming;
mod worker;

pub use request::GenerationRequest;
pub use sse::WireFormat;
pub use streaming::{GenerationEvent, StreamAccumulator};
pub use worker::GenerationClient;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed generation ceiling sent as `max_tokens` and used as the
/// denominator of the progress estimate.
pub const MAX_OUTPUT_TOKENS: usize = 5000;

/// Fixed sampling temperature for all backends.
pub const TEMPERATURE: f32 = 0.7;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API call failed: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Custom headers are not a valid JSON object: {0}")]
    Headers(String),
}

/// The request-target variants the worker knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local inference server, completion-style endpoint
    Ollama,
    /// Hosted chat-completion provider with bearer auth
    SiliconFlow,
    /// User-configured endpoint in either wire shape
    Custom,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "Ollama",
            BackendKind::SiliconFlow => "SiliconFlow",
            BackendKind::Custom => "Custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" | "local" => Some(BackendKind::Ollama),
            "siliconflow" | "sf" => Some(BackendKind::SiliconFlow),
            "custom" => Some(BackendKind::Custom),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!(BackendKind::parse("ollama"), Some(BackendKind::Ollama));
        assert_eq!(BackendKind::parse(" SiliconFlow "), Some(BackendKind::SiliconFlow));
        assert_eq!(BackendKind::parse("custom"), Some(BackendKind::Custom));
        assert_eq!(BackendKind::parse("openrouter"), None);
    }

    #[test]
    fn test_backend_kind_roundtrip() {
        let json = serde_json::to_string(&BackendKind::SiliconFlow).unwrap();
        assert_eq!(json, "\"siliconflow\"");
        let back: BackendKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BackendKind::SiliconFlow);
    }
}
