//! Interactive terminal shell
//!
//! Owns all user-visible state: the append-only transcript, the persisted
//! settings, and the lifecycle of at most one in-flight generation. Reacts
//! to the worker's events (progress, finished, failed) and treats a closed
//! event channel after a cancel as the cancellation acknowledgement.

pub mod commands;
pub mod progress;
pub mod prompt;
pub mod renderer;
pub mod theme;

use crate::api::{
    BackendKind, GenerationClient, GenerationEvent, GenerationRequest, WireFormat,
};
use crate::config::Settings;

use commands::{classify_input, render_help, InputAction, SlashCommand};
use progress::GenerationGauge;
use prompt::read_prompt_line;
use renderer::TerminalRenderer;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Result of handling a slash command
enum CommandResult {
    Continue,
    Quit,
}

/// Interactive shell: prompt in, streamed generation out
pub struct InteractiveShell {
    settings: Settings,
    settings_path: PathBuf,
    client: GenerationClient,
    renderer: TerminalRenderer,
    /// Append-only display log: markers and generated text
    transcript: Vec<String>,
    /// Whether a generation is in flight, read by the interrupt listener
    generating: Arc<AtomicBool>,
}

/// RAII flag marking a generation as in flight
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn begin(flag: Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl InteractiveShell {
    pub fn new(settings: Settings, settings_path: PathBuf) -> Self {
        Self {
            settings,
            settings_path,
            client: GenerationClient::new(),
            renderer: TerminalRenderer::new(),
            transcript: Vec::new(),
            generating: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run the shell main loop. One prompt is processed at a time; the next
    /// prompt is not read until the previous generation reaches a terminal
    /// event or is cancelled.
    pub async fn run(&mut self) -> Result<()> {
        self.renderer.render_banner(
            env!("CARGO_PKG_VERSION"),
            self.settings.backend.name(),
            &self.settings.model,
        );

        // Long-lived interrupt listener: Ctrl+C at the idle prompt exits the
        // shell; while a generation is in flight its select arm wins and the
        // signal cancels the generation instead.
        let generating = Arc::clone(&self.generating);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !generating.load(Ordering::SeqCst) {
                    println!();
                    std::process::exit(130);
                }
            }
        });

        loop {
            let input = match read_prompt_line(self.renderer.prompt_color()) {
                Some(input) => input,
                None => break, // EOF (Ctrl+D)
            };

            match classify_input(&input) {
                InputAction::Empty => {
                    self.renderer
                        .render_info("Enter a prompt to generate, or /help for commands.");
                }
                InputAction::Command(cmd) => match self.handle_command(cmd) {
                    CommandResult::Continue => continue,
                    CommandResult::Quit => break,
                },
                InputAction::UnknownCommand => {
                    self.renderer
                        .render_error(&format!("Unknown command: {}. Try /help.", input));
                }
                InputAction::Prompt(prompt) => self.generate(&prompt).await,
            }
        }

        Ok(())
    }

    /// Handle a slash command
    fn handle_command(&mut self, cmd: SlashCommand) -> CommandResult {
        match cmd {
            SlashCommand::Help => render_help(&self.renderer),
            SlashCommand::Quit => return CommandResult::Quit,
            SlashCommand::Clear => {
                self.transcript.clear();
                self.renderer.render_success("Transcript cleared.");
            }
            SlashCommand::Transcript => {
                if self.transcript.is_empty() {
                    self.renderer.render_info("Transcript is empty.");
                } else {
                    println!();
                    for entry in &self.transcript {
                        println!("{}", entry);
                    }
                    println!();
                }
            }
            SlashCommand::Save => match self.settings.save_to(&self.settings_path) {
                Ok(()) => self.renderer.render_success(&format!(
                    "Settings saved to {}",
                    self.settings_path.display()
                )),
                Err(e) => self
                    .renderer
                    .render_error(&format!("Failed to save settings: {}", e)),
            },
            SlashCommand::Settings => self.render_settings(),
            SlashCommand::Backend(arg) => match arg {
                Some(value) => match BackendKind::parse(&value) {
                    Some(kind) => {
                        self.settings.backend = kind;
                        self.renderer
                            .render_success(&format!("Backend set to: {}", kind.name()));
                    }
                    None => self.renderer.render_error(&format!(
                        "Unknown backend: {}. Available: ollama, siliconflow, custom",
                        value
                    )),
                },
                None => self
                    .renderer
                    .render_info(&format!("Current backend: {}", self.settings.backend.name())),
            },
            SlashCommand::Url(arg) => match arg {
                Some(value) => {
                    self.settings.api_url = value;
                    self.renderer.render_success("Endpoint URL set.");
                }
                None => self
                    .renderer
                    .render_info(&format!("Current URL: {}", self.settings.api_url)),
            },
            SlashCommand::Key(arg) => match arg {
                Some(value) => {
                    self.settings.api_key = value;
                    self.renderer.render_success("API key set.");
                }
                None => {
                    let state = if self.settings.api_key.is_empty() {
                        "(empty)"
                    } else {
                        "(set)"
                    };
                    self.renderer.render_info(&format!("API key: {}", state));
                }
            },
            SlashCommand::Model(arg) => match arg {
                Some(value) => {
                    self.settings.model = value.clone();
                    self.renderer
                        .render_success(&format!("Model set to: {}", value));
                }
                None => self
                    .renderer
                    .render_info(&format!("Current model: {}", self.settings.model)),
            },
            SlashCommand::Format(arg) => match arg {
                Some(value) => match WireFormat::parse(&value) {
                    Some(format) => {
                        self.settings.api_format = format;
                        self.renderer
                            .render_success(&format!("Custom wire shape set to: {}", format.name()));
                        if self.settings.backend != BackendKind::Custom {
                            self.renderer
                                .render_info("Shape only applies to the custom backend.");
                        }
                    }
                    None => self.renderer.render_error(&format!(
                        "Unknown wire shape: {}. Available: openai, ollama",
                        value
                    )),
                },
                None => self.renderer.render_info(&format!(
                    "Current custom wire shape: {}",
                    self.settings.api_format.name()
                )),
            },
            SlashCommand::Headers(arg) => match arg {
                Some(value) => {
                    // Stored verbatim; the worker validates at dispatch
                    self.settings.custom_headers = value;
                    self.renderer.render_success("Custom headers set.");
                }
                None => {
                    if self.settings.custom_headers.is_empty() {
                        self.renderer.render_info("No custom headers set.");
                    } else {
                        self.renderer
                            .render_info(&format!("Custom headers: {}", self.settings.custom_headers));
                    }
                }
            },
        }
        CommandResult::Continue
    }

    /// Dispatch one generation and consume its events until a terminal
    /// event arrives or the user cancels with Ctrl+C.
    async fn generate(&mut self, prompt: &str) {
        if self.settings.api_url.trim().is_empty() || self.settings.model.trim().is_empty() {
            self.renderer.render_error(
                "Endpoint URL and model must be set before generating (/url, /model).",
            );
            return;
        }

        let _in_flight = InFlightGuard::begin(Arc::clone(&self.generating));

        let request = self.build_request(prompt);
        self.log_marker(&format!(
            "generation started ({}, {})",
            request.backend.name(),
            request.model
        ));

        let cancel = CancellationToken::new();
        let mut rx = match self.client.stream(request, cancel.clone()).await {
            Ok(rx) => rx,
            Err(e) => {
                let entry = format!("error: {}", e);
                self.transcript.push(entry);
                self.renderer.render_error(&format!("Request failed: {}", e));
                return;
            }
        };

        let mut gauge = GenerationGauge::new();
        gauge.start("Generating...");
        let mut cancelled = false;

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(GenerationEvent::Progress(value)) => gauge.set(value),
                    Some(GenerationEvent::Finished(text)) => {
                        gauge.stop();
                        info!(chars = text.chars().count(), "generation finished");
                        self.transcript.push(text.clone());
                        self.renderer.render_generation(&text);
                        self.log_marker("generation complete");
                        break;
                    }
                    Some(GenerationEvent::Failed(reason)) => {
                        gauge.stop();
                        self.transcript.push(format!("error: {}", reason));
                        self.renderer.render_error(&format!("Generation failed: {}", reason));
                        break;
                    }
                    None => {
                        gauge.stop();
                        if cancelled {
                            self.log_marker("generation cancelled");
                        } else {
                            self.log_marker("generation abandoned (stream closed)");
                        }
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c(), if !cancelled => {
                    cancelled = true;
                    cancel.cancel();
                    gauge.set_message("Cancelling...");
                }
            }
        }
    }

    fn build_request(&self, prompt: &str) -> GenerationRequest {
        let mut request = GenerationRequest::new(
            self.settings.backend,
            self.settings.api_url.trim(),
            prompt,
            self.settings.model.trim(),
        );

        if !self.settings.api_key.is_empty() {
            request = request.with_api_key(self.settings.api_key.clone());
        }

        if self.settings.backend == BackendKind::Custom {
            request = request.with_format(self.settings.api_format);
            if !self.settings.custom_headers.trim().is_empty() {
                request = request.with_custom_headers(self.settings.custom_headers.clone());
            }
        }

        request
    }

    /// Append a timestamped marker to the transcript and echo it
    fn log_marker(&mut self, msg: &str) {
        let entry = format!(
            "[{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            msg
        );
        self.renderer.render_marker(&entry);
        self.transcript.push(entry);
    }

    fn render_settings(&self) {
        println!();
        self.renderer.render_system("Current settings:");
        self.renderer
            .render_setting("Backend:", self.settings.backend.name());
        self.renderer.render_setting("URL:", &self.settings.api_url);
        let key = if self.settings.api_key.is_empty() {
            "(empty)"
        } else {
            "(set)"
        };
        self.renderer.render_setting("API key:", key);
        self.renderer.render_setting("Model:", &self.settings.model);
        self.renderer
            .render_setting("Wire shape:", self.settings.api_format.name());
        let headers = if self.settings.custom_headers.is_empty() {
            "(none)"
        } else {
            self.settings.custom_headers.as_str()
        };
        self.renderer.render_setting("Headers:", headers);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell_with(settings: Settings) -> InteractiveShell {
        InteractiveShell::new(settings, PathBuf::from("/tmp/unused.json"))
    }

    #[test]
    fn test_build_request_fixed_backend_ignores_custom_fields() {
        let mut settings = Settings::default();
        settings.backend = BackendKind::Ollama;
        settings.custom_headers = r#"{"X-Test":"1"}"#.to_string();
        settings.api_format = WireFormat::OpenAi;

        let request = shell_with(settings).build_request("a prompt");
        assert_eq!(request.backend, BackendKind::Ollama);
        assert!(request.custom_headers.is_none());
        assert!(request.format.is_none());
        assert_eq!(request.wire_format(), WireFormat::Ollama);
    }

    #[test]
    fn test_build_request_custom_backend_carries_overrides() {
        let mut settings = Settings::default();
        settings.backend = BackendKind::Custom;
        settings.api_url = "http://example/v1/chat".to_string();
        settings.api_format = WireFormat::Ollama;
        settings.custom_headers = r#"{"Authorization":"Bearer x"}"#.to_string();

        let request = shell_with(settings).build_request("a prompt");
        assert_eq!(request.wire_format(), WireFormat::Ollama);
        assert_eq!(
            request.custom_headers.as_deref(),
            Some(r#"{"Authorization":"Bearer x"}"#)
        );
    }

    #[test]
    fn test_empty_api_key_not_forwarded() {
        let request = shell_with(Settings::default()).build_request("p");
        assert!(request.api_key.is_none());
    }

    #[test]
    fn test_in_flight_guard_toggles_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        {
            let _guard = InFlightGuard::begin(Arc::clone(&flag));
            assert!(flag.load(Ordering::SeqCst));
        }
        assert!(!flag.load(Ordering::SeqCst));
    }
}
