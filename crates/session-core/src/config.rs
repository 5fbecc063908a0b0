//! Configuration surface.
//!
//! The primary configuration path is command-line flags (see the
//! `session-structurer` binary's `Cli`), but a TOML file with
//! `SESSION_STRUCTURER_`-prefixed environment variable overrides is also
//! supported for callers that prefer a config file.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn default_log_level() -> String {
    "info".to_string()
}

/// Paths and knobs external to the pipeline's own design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the session byte stream (in practice a FIFO written by the
    /// session recorder). FIFO creation itself is out of scope — the path
    /// must already exist and be openable for reading.
    pub byte_stream_path: Option<String>,

    /// Path to the command stream (in practice a FIFO whose writer opens,
    /// writes newline-terminated commands, and closes between commands).
    pub command_stream_path: Option<String>,

    /// Log verbosity passed to the `tracing` `EnvFilter` fallback when
    /// `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional path to write this process's PID to on startup (removed on
    /// `terminate`).
    pub pid_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            byte_stream_path: None,
            command_stream_path: None,
            log_level: default_log_level(),
            pid_file: None,
        }
    }
}

impl Config {
    /// Load config from an optional TOML file with
    /// `SESSION_STRUCTURER_*` env var overrides.
    ///
    /// A missing config file is not an error — the defaults (and any env
    /// overrides) are used instead; callers are expected to fill in the two
    /// stream paths via CLI flags in that case.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        let config: Config = figment
            .merge(Env::prefixed("SESSION_STRUCTURER_"))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(config)
    }
}
