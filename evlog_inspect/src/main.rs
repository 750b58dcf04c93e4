use anyhow::Result;
use clap::Parser;
use std::io;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod render;

use cli::{Cli, Command};
use commands::TailOptions;

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut out = io::stdout().lock();
    match cli.command {
        Command::Dump { log, tag, base_dir } => {
            let mut reader = commands::open(&log, base_dir.as_deref())?;
            commands::dump(&mut reader, tag.as_deref(), &mut out)
        }
        Command::Tags { log } => {
            let mut reader = commands::open(&log, None)?;
            commands::tags(&mut reader, &mut out)
        }
        Command::Tail {
            log,
            tag,
            interval_ms,
            from_start,
            count,
        } => {
            let mut reader = commands::open(&log, None)?;
            let opts = TailOptions {
                tag: tag.as_deref(),
                interval: Duration::from_millis(interval_ms),
                from_start,
                count,
            };
            commands::tail(&mut reader, opts, &mut out)
        }
    }
}
