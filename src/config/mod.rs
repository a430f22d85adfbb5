//! Persisted settings
//!
//! A single flat JSON object holding the last-used request fields (never the
//! prompt), loaded at startup and overwritten wholesale on save. A missing
//! or malformed file falls back to defaults with a logged diagnostic only.

use crate::api::{BackendKind, WireFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to write settings: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to serialize settings: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Last-used request fields, persisted across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Which backend variant to target
    pub backend: BackendKind,

    /// Endpoint URL
    pub api_url: String,

    /// Bearer key, empty when unused
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Wire shape for the custom backend
    pub api_format: WireFormat,

    /// Raw JSON header block for the custom backend, empty when unused
    pub custom_headers: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Ollama,
            api_url: "http://localhost:11434/api/generate".to_string(),
            api_key: String::new(),
            model: "llama3".to_string(),
            api_format: WireFormat::OpenAi,
            custom_headers: String::new(),
        }
    }
}

impl Settings {
    /// Default settings file path (`<config_dir>/draftsmith/settings.json`)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("draftsmith")
            .join("settings.json")
    }

    /// Load settings from disk. Never fails: a missing or unreadable file
    /// yields the defaults, a malformed one is reported through the log and
    /// likewise falls back.
    pub fn load_from(path: &Path) -> Self {
        let settings = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "settings file malformed, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        settings.with_env_overrides()
    }

    /// Apply environment variable overrides
    fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("DRAFTSMITH_API_KEY") {
            self.api_key = key;
        }
        if let Ok(url) = std::env::var("DRAFTSMITH_API_URL") {
            self.api_url = url;
        }
        if let Ok(model) = std::env::var("DRAFTSMITH_MODEL") {
            self.model = model;
        }
        self
    }

    /// Overwrite the settings file wholesale.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.backend, BackendKind::Ollama);
        assert_eq!(settings.api_url, "http://localhost:11434/api/generate");
        assert!(settings.api_key.is_empty());
        assert_eq!(settings.api_format, WireFormat::OpenAi);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.backend = BackendKind::SiliconFlow;
        settings.api_url = "https://api.siliconflow.cn/v1/chat/completions".to_string();
        settings.model = "deepseek-chat".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.backend, BackendKind::SiliconFlow);
        assert_eq!(loaded.model, "deepseek-chat");
    }

    #[test]
    fn test_settings_file_is_flat_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        Settings::default().save_to(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let obj = raw.as_object().unwrap();
        for key in ["backend", "api_url", "api_key", "model", "api_format", "custom_headers"] {
            assert!(obj.contains_key(key), "missing key {}", key);
        }
        assert!(obj.values().all(|v| !v.is_object() && !v.is_array()));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load_from(&dir.path().join("absent.json"));
        assert_eq!(loaded.backend, Settings::default().backend);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ this is not json").unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.model, Settings::default().model);
    }

    #[test]
    fn test_unknown_backend_value_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"backend":"skynet"}"#).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.backend, BackendKind::Ollama);
    }
}
