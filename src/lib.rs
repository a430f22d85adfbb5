//! Draftsmith - Interactive writing assistant over streaming LLM backends
//!
//! The user types a prompt, the shell streams a long-form generation from a
//! local inference server (Ollama), a hosted chat-completion provider
//! (SiliconFlow), or any user-configured endpoint, and appends the result to
//! an append-only transcript.
//!
//! ## Pieces
//!
//! - **Streaming request worker** (`api`): one streaming POST per request,
//!   incremental line decoding through a per-format strategy, progress and
//!   terminal events over a channel, cooperative cancellation.
//! - **Presentation shell** (`shell`): input validation, the transcript,
//!   slash commands for settings, and a progress gauge.
//! - **Persisted settings** (`config`): a flat JSON record of the last-used
//!   request fields, loaded at startup and overwritten wholesale on save.

pub mod api;
pub mod config;
pub mod shell;

pub use api::{
    ApiError, BackendKind, GenerationClient, GenerationEvent, GenerationRequest,
    StreamAccumulator, WireFormat,
};
pub use config::{ConfigError, Settings};
pub use shell::InteractiveShell;
