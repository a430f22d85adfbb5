//! Draftsmith - interactive writing assistant over streaming LLM backends

use anyhow::Result;
use clap::Parser;
use draftsmith::{config::Settings, shell::InteractiveShell};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "draftsmith")]
#[command(about = "Stream long-form text from local or hosted LLM backends")]
#[command(version)]
struct Cli {
    /// Settings file path (default: the per-user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings_path = cli.config.unwrap_or_else(Settings::default_path);
    let settings = Settings::load_from(&settings_path);

    let mut shell = InteractiveShell::new(settings, settings_path);
    shell.run().await
}
