//! Claw-Log - daily git work logs summarized by an LLM
//!
//! Main entry point for the claw-log CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::auth;

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Claw-Log - daily git work logs summarized by an LLM
#[derive(Parser)]
#[command(name = "claw-log")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ChatGPT subscription login (OAuth)
    Auth(auth::AuthArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = clawlog_config::DataPaths::resolve()?;
    let loaded = clawlog_config::load_config(&paths)?;

    // Console (human-readable) on stderr, daily-rotated JSON file under logs/
    let filter = if cli.verbose {
        "claw_log=debug,clawlog_oauth=debug,clawlog_config=debug,info"
    } else {
        "claw_log=warn,clawlog_oauth=warn,error"
    };

    // File logging is skipped when the log directory cannot be created.
    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix("claw-log.log")
        .build(paths.log_dir());
    let (file_writer, _guard, file_error) = match file_appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_writer.map(|writer| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "claw_log=debug,clawlog_oauth=debug,clawlog_config=debug,info",
                ))
        }))
        .init();

    if let Some(e) = file_error {
        tracing::warn!(error = %e, dir = %paths.log_dir().display(), "File logging disabled");
    }

    tracing::debug!(base = %paths.base().display(), loaded = loaded.loaded, "Configuration resolved");

    let ctx = commands::Context {
        paths,
        config: loaded.config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Auth(args) => auth::run(args, &ctx).await,
    }
}
