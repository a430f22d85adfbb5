//! Streaming request worker
//!
//! One streaming POST per generation. The response body is consumed as
//! newline-split chunks, decoded through the request's `WireFormat`, and
//! reported back over an event channel: zero or more progress updates, then
//! exactly one terminal event. A cancelled request is simply abandoned.

use super::streaming::{GenerationEvent, StreamAccumulator};
use super::{ApiError, BackendKind, GenerationRequest, WireFormat, MAX_OUTPUT_TOKENS, TEMPERATURE};
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Issues streaming generation requests against any of the supported
/// backends.
pub struct GenerationClient {
    client: Client,
}

impl GenerationClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    fn build_body(request: &GenerationRequest) -> Value {
        match request.wire_format() {
            WireFormat::Ollama => json!({
                "model": request.model,
                "prompt": request.prompt,
                "stream": true,
                "max_tokens": MAX_OUTPUT_TOKENS,
                "temperature": TEMPERATURE,
            }),
            WireFormat::OpenAi => json!({
                "model": request.model,
                "messages": [
                    {
                        "role": "user",
                        "content": request.prompt,
                    }
                ],
                "stream": true,
                "max_tokens": MAX_OUTPUT_TOKENS,
                "temperature": TEMPERATURE,
            }),
        }
    }

    /// Default `Content-Type: application/json`, bearer auth for the hosted
    /// backend, and for the custom backend the user's raw JSON header block
    /// merged over the defaults. A malformed header block fails before any
    /// request is issued.
    fn build_headers(request: &GenerationRequest) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if request.backend == BackendKind::SiliconFlow {
            let key = request.api_key.as_deref().unwrap_or_default();
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| ApiError::Headers(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        if request.backend == BackendKind::Custom {
            if let Some(raw) = request.custom_headers.as_deref().filter(|s| !s.trim().is_empty()) {
                let map: serde_json::Map<String, Value> = serde_json::from_str(raw)
                    .map_err(|e| ApiError::Headers(e.to_string()))?;
                for (name, value) in &map {
                    let value = value
                        .as_str()
                        .ok_or_else(|| {
                            ApiError::Headers(format!("header '{}' is not a string", name))
                        })?;
                    let name = HeaderName::from_bytes(name.as_bytes())
                        .map_err(|e| ApiError::Headers(e.to_string()))?;
                    let value = HeaderValue::from_str(value)
                        .map_err(|e| ApiError::Headers(e.to_string()))?;
                    headers.insert(name, value);
                }
            }
        }

        Ok(headers)
    }

    /// Start one streaming generation. Returns the event channel on a
    /// successful dispatch; pre-flight failures (bad header block, non-2xx
    /// status, transport errors before the first byte) return Err instead.
    pub async fn stream(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<GenerationEvent>, ApiError> {
        let format = request.wire_format();
        let headers = Self::build_headers(&request)?;
        let body = Self::build_body(&request);

        debug!(
            backend = request.backend.name(),
            url = %request.api_url,
            model = %request.model,
            "dispatching generation request"
        );

        let response = self
            .client
            .post(&request.api_url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();
            let mut acc = StreamAccumulator::new(format);

            while let Some(chunk_result) = stream.next().await {
                if cancel.is_cancelled() {
                    debug!("generation cancelled, abandoning stream");
                    return;
                }

                match chunk_result {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));

                        while let Some(newline_pos) = buffer.find('\n') {
                            let line = buffer[..newline_pos].to_string();
                            buffer = buffer[newline_pos + 1..].to_string();

                            if let Some(progress) = acc.push_line(&line) {
                                if tx.send(GenerationEvent::Progress(progress)).await.is_err() {
                                    return; // Receiver dropped
                                }
                            }

                            if acc.is_done() {
                                debug!("stream terminated by sentinel");
                                let _ = tx.send(GenerationEvent::Finished(acc.into_text())).await;
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx
                            .send(GenerationEvent::Failed(format!("stream error: {}", e)))
                            .await;
                        return;
                    }
                }
            }

            // Trailing line without a final newline
            if !buffer.is_empty() && !acc.is_done() {
                if let Some(progress) = acc.push_line(&buffer) {
                    if tx.send(GenerationEvent::Progress(progress)).await.is_err() {
                        return;
                    }
                }
            }

            debug!("stream ended at EOF");
            let _ = tx.send(GenerationEvent::Finished(acc.into_text())).await;
        });

        Ok(rx)
    }
}

impl Default for GenerationClient {
    fn default() -> Self {
        Self::new()
    }
}
