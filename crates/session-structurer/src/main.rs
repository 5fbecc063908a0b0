use anyhow::Context;
use clap::Parser;
use session_core::sink::{LineSink, RecordSink};
use session_core::{pipeline, Config, Pipeline};
use tracing::{error, info};

mod cli;
mod pidfile;
mod signals;

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref().and_then(|p| p.to_str()))
        .unwrap_or_else(|e| {
            eprintln!("config load failed ({e}), using defaults");
            Config::default()
        });

    let log_level = cli.log_level.clone().unwrap_or(config.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("session_structurer={log_level},session_core={log_level}").into()),
        )
        .init();

    let byte_stream_path = cli
        .byte_stream
        .as_deref()
        .and_then(|p| p.to_str())
        .map(str::to_string)
        .or(config.byte_stream_path)
        .context("no byte stream path given (--byte-stream or config)")?;

    let command_stream_path = cli
        .command_stream
        .as_deref()
        .and_then(|p| p.to_str())
        .map(str::to_string)
        .or(config.command_stream_path)
        .context("no command stream path given (--command-stream or config)")?;

    let pid_file = cli.pid_file.or_else(|| config.pid_file.map(Into::into));

    let byte_stream = pipeline::open_byte_stream(&byte_stream_path)
        .await
        .map_err(|e| {
            error!(error = %e, code = e.code(), "failed to open byte stream");
            e
        })?;
    let command_stream = pipeline::open_command_stream(&command_stream_path)
        .await
        .map_err(|e| {
            error!(error = %e, code = e.code(), "failed to open command stream");
            e
        })?;

    if let Some(path) = &pid_file {
        pidfile::write(path)?;
    }

    let sink: Box<dyn RecordSink> = Box::new(LineSink::new(std::io::stdout()));

    info!(byte_stream_path, command_stream_path, "starting pipeline");
    let pipeline = Pipeline::spawn(
        byte_stream,
        &command_stream_path,
        command_stream,
        sink,
        pid_file,
    );

    signals::listen(pipeline.control).await
}
