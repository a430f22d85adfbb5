//! Line-level parsing of the streamed response formats
//!
//! Two wire shapes cover all three backends:
//! - Ollama: line-delimited JSON `{"response":"..."}`
//! - OpenAI-compatible: `data: {"choices":[{"delta":{"content":"..."}}]}`,
//!   terminated by the literal `data: [DONE]`

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The wire shape of a streamed response, one strategy per format.
///
/// A line that neither parses as JSON nor contains the expected quoted
/// field is skipped silently; the stream is best-effort by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Completion endpoint, `response` field per line
    Ollama,
    /// Chat-completion SSE, `choices[0].delta.content` per data line
    OpenAi,
}

impl WireFormat {
    pub fn name(&self) -> &'static str {
        match self {
            WireFormat::Ollama => "ollama",
            WireFormat::OpenAi => "openai",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Some(WireFormat::Ollama),
            "openai" => Some(WireFormat::OpenAi),
            _ => None,
        }
    }

    /// Whether this line ends the stream early without error.
    pub fn is_terminator(&self, line: &str) -> bool {
        match self {
            WireFormat::Ollama => false,
            WireFormat::OpenAi => {
                let line = line.trim();
                line.strip_prefix("data: ").unwrap_or(line) == "[DONE]"
            }
        }
    }

    /// Extract the incremental text fragment from one streamed line.
    /// Returns None for empty lines, terminators, and undecodable chunks.
    pub fn extract_fragment(&self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let fragment = match self {
            WireFormat::Ollama => match serde_json::from_str::<Value>(line) {
                Ok(json) => json.get("response").and_then(Value::as_str).map(str::to_owned),
                Err(_) => scan_quoted_value(line, "response"),
            },
            WireFormat::OpenAi => {
                let data = line.strip_prefix("data: ").unwrap_or(line);
                if data == "[DONE]" {
                    return None;
                }
                match serde_json::from_str::<Value>(data) {
                    Ok(json) => json["choices"][0]["delta"]["content"]
                        .as_str()
                        .map(str::to_owned),
                    Err(_) => scan_quoted_value(data, "content"),
                }
            }
        };

        fragment.filter(|f| !f.is_empty())
    }
}

/// Best-effort recovery for chunks that fail JSON parsing: scan for the
/// field's quoted value up to the next double quote. No escape handling.
fn scan_quoted_value(line: &str, field: &str) -> Option<String> {
    let marker = format!("\"{}\":\"", field);
    let start = line.find(&marker)? + marker.len();
    let end = line[start..].find('"')? + start;
    Some(line[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_fragment() {
        let line = r#"{"response":"Hello"}"#;
        assert_eq!(
            WireFormat::Ollama.extract_fragment(line),
            Some("Hello".to_string())
        );
    }

    #[test]
    fn test_ollama_null_response_skipped() {
        let line = r#"{"response":null,"done":false}"#;
        assert_eq!(WireFormat::Ollama.extract_fragment(line), None);
    }

    #[test]
    fn test_ollama_truncated_json_falls_back_to_scan() {
        // Partial read: valid field inside an unterminated object
        let line = r#"{"model":"llama3","response":"frag","done"#;
        assert_eq!(
            WireFormat::Ollama.extract_fragment(line),
            Some("frag".to_string())
        );
    }

    #[test]
    fn test_openai_fragment() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hi"},"index":0}]}"#;
        assert_eq!(
            WireFormat::OpenAi.extract_fragment(line),
            Some("Hi".to_string())
        );
    }

    #[test]
    fn test_openai_done_terminates() {
        assert!(WireFormat::OpenAi.is_terminator("data: [DONE]"));
        assert!(WireFormat::OpenAi.is_terminator("[DONE]"));
        assert_eq!(WireFormat::OpenAi.extract_fragment("data: [DONE]"), None);
    }

    #[test]
    fn test_openai_truncated_json_falls_back_to_scan() {
        let line = r#"data: {"choices":[{"delta":{"content":"part"#;
        // The scan finds the opening quote but no closing quote: skipped
        assert_eq!(WireFormat::OpenAi.extract_fragment(line), None);

        let line = r#"data: {"choices":[{"delta":{"content":"part"},"#;
        assert_eq!(
            WireFormat::OpenAi.extract_fragment(line),
            Some("part".to_string())
        );
    }

    #[test]
    fn test_undecodable_line_skipped() {
        assert_eq!(WireFormat::Ollama.extract_fragment("not json at all"), None);
        assert_eq!(WireFormat::OpenAi.extract_fragment("data: garbage"), None);
        assert_eq!(WireFormat::OpenAi.extract_fragment(""), None);
    }

    #[test]
    fn test_ollama_never_terminates_on_lines() {
        assert!(!WireFormat::Ollama.is_terminator(r#"{"done":true}"#));
        assert!(!WireFormat::Ollama.is_terminator("data: [DONE]"));
    }

    #[test]
    fn test_scan_quoted_value() {
        assert_eq!(
            scan_quoted_value(r#"..."content":"abc"..."#, "content"),
            Some("abc".to_string())
        );
        assert_eq!(scan_quoted_value("no marker here", "content"), None);
    }
}
