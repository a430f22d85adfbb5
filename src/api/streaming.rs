//! Streaming event model and fragment accumulation

use super::sse::WireFormat;
use super::MAX_OUTPUT_TOKENS;
use tracing::debug;

/// An event emitted by an in-flight generation.
///
/// A request yields zero or more `Progress` events followed by exactly one
/// terminal `Finished` or `Failed`. A cancelled request emits no terminal
/// event at all; the closed channel stands in for it.
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    /// Progress estimate, 0..=100
    Progress(u8),
    /// Stream completed, full accumulated text
    Finished(String),
    /// Stream failed, human-readable reason
    Failed(String),
}

/// Accumulates extracted fragments into the result buffer and tracks the
/// progress estimate. Single writer; the buffer only grows, so progress is
/// monotonically non-decreasing.
#[derive(Debug)]
pub struct StreamAccumulator {
    format: WireFormat,
    text: String,
    chars: usize,
    done: bool,
}

impl StreamAccumulator {
    pub fn new(format: WireFormat) -> Self {
        Self {
            format,
            text: String::new(),
            chars: 0,
            done: false,
        }
    }

    /// Feed one response line. Returns the updated progress value when the
    /// line contributed a fragment, None when it was a terminator or was
    /// skipped.
    pub fn push_line(&mut self, line: &str) -> Option<u8> {
        if self.done {
            return None;
        }

        if self.format.is_terminator(line) {
            self.done = true;
            return None;
        }

        match self.format.extract_fragment(line) {
            Some(fragment) => {
                self.chars += fragment.chars().count();
                self.text.push_str(&fragment);
                Some(self.progress())
            }
            None => {
                if !line.trim().is_empty() {
                    debug!(format = self.format.name(), "skipping undecodable stream line");
                }
                None
            }
        }
    }

    /// Progress as `min(100, 100 * chars / ceiling)`.
    pub fn progress(&self) -> u8 {
        std::cmp::min(100, self.chars * 100 / MAX_OUTPUT_TOKENS) as u8
    }

    /// Whether a terminator line has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
