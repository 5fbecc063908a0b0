//! Command-line surface — the primary configuration path; `--config` is the
//! secondary, file-based path handled by `session_core::Config::load`.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "session-structurer", about = "Structure a raw terminal byte stream into line-delimited command/output records")]
pub struct Cli {
    /// Path to the session byte stream (e.g. a FIFO written by the session recorder).
    #[arg(long)]
    pub byte_stream: Option<PathBuf>,

    /// Path to the newline-delimited command stream.
    #[arg(long)]
    pub command_stream: Option<PathBuf>,

    /// Log verbosity fallback when `RUST_LOG` is unset.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write this process's PID here on startup, removed on terminate.
    #[arg(long)]
    pub pid_file: Option<PathBuf>,

    /// Optional TOML config file; CLI flags above take precedence over it.
    #[arg(long)]
    pub config: Option<PathBuf>,
}
