//! Generation request record

use super::{BackendKind, WireFormat};
use serde::{Deserialize, Serialize};

/// One generation request, constructed fresh per user action and immutable
/// once the worker starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Which backend variant to talk to
    pub backend: BackendKind,

    /// Target endpoint URL
    pub api_url: String,

    /// Bearer key, used by the hosted backend
    pub api_key: Option<String>,

    /// The user's prompt (non-empty, enforced by the shell)
    pub prompt: String,

    /// Model identifier passed through in the request body
    pub model: String,

    /// Wire shape override, only meaningful for the custom backend
    pub format: Option<WireFormat>,

    /// Raw JSON header block merged over the defaults, custom backend only
    pub custom_headers: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        backend: BackendKind,
        api_url: impl Into<String>,
        prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            api_url: api_url.into(),
            api_key: None,
            prompt: prompt.into(),
            model: model.into(),
            format: None,
            custom_headers: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_format(mut self, format: WireFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_custom_headers(mut self, headers: impl Into<String>) -> Self {
        self.custom_headers = Some(headers.into());
        self
    }

    /// The wire shape this request speaks: fixed per backend, selectable
    /// for the custom variant.
    pub fn wire_format(&self) -> WireFormat {
        match self.backend {
            BackendKind::Ollama => WireFormat::Ollama,
            BackendKind::SiliconFlow => WireFormat::OpenAi,
            BackendKind::Custom => self.format.unwrap_or(WireFormat::OpenAi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_per_backend() {
        let req = GenerationRequest::new(BackendKind::Ollama, "u", "p", "m");
        assert_eq!(req.wire_format(), WireFormat::Ollama);

        let req = GenerationRequest::new(BackendKind::SiliconFlow, "u", "p", "m");
        assert_eq!(req.wire_format(), WireFormat::OpenAi);

        let req = GenerationRequest::new(BackendKind::Custom, "u", "p", "m");
        assert_eq!(req.wire_format(), WireFormat::OpenAi);

        let req = req.with_format(WireFormat::Ollama);
        assert_eq!(req.wire_format(), WireFormat::Ollama);
    }
}
