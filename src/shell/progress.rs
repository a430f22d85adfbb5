//! Generation progress gauge

use indicatif::{ProgressBar, ProgressStyle};

/// A 0..100 gauge shown while a generation is in flight
pub struct GenerationGauge {
    bar: ProgressBar,
    active: bool,
}

impl GenerationGauge {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} {bar:30.magenta/238} {pos:>3}% {msg}")
                .unwrap()
                .progress_chars("\u{2501}\u{2578}\u{2500}"),
        );
        Self { bar, active: false }
    }

    /// Show the gauge with a message
    pub fn start(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
        self.bar
            .enable_steady_tick(std::time::Duration::from_millis(80));
        self.active = true;
    }

    /// Update the progress value (0..=100)
    pub fn set(&self, value: u8) {
        self.bar.set_position(u64::from(value.min(100)));
    }

    /// Swap the message, keeping the position
    pub fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    /// Hide and clear the gauge
    pub fn stop(&mut self) {
        if self.active {
            self.bar.finish_and_clear();
            self.active = false;
        }
    }
}

impl Default for GenerationGauge {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for GenerationGauge {
    fn drop(&mut self) {
        self.stop();
    }
}
