use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "evlog_inspect", about = "Inspect experiment event logs")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print every record in append order
    Dump {
        /// Log file. A relative name is looked up in $EVLOG_SESSION_DIR.
        log: PathBuf,
        /// Only records of this tag, read by offset
        #[arg(long)]
        tag: Option<String>,
        /// Session base dir for external files. Defaults to the log's dir.
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },
    /// List the tags and their record counts
    Tags {
        log: PathBuf,
    },
    /// Follow a log that is being written
    Tail {
        log: PathBuf,
        #[arg(long)]
        tag: Option<String>,
        /// Poll interval when no complete record is available
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
        /// Start from the first record rather than the current end
        #[arg(long)]
        from_start: bool,
        /// Exit after printing this many records
        #[arg(long)]
        count: Option<usize>,
    },
}
