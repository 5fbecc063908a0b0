//! Wires the five components together.
//!
//! Byte Source → byte queue → Line Editor → output queue → Record Assembler
//! → sink; Command Source → command queue → Record Assembler; the Control
//! Plane reaches into the reading flag, the byte queue, and both reset
//! channels.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::AsyncRead;
use tokio::sync::{mpsc, watch};

use crate::control::Control;
use crate::error::{Error, Result};
use crate::sink::RecordSink;
use crate::{assembler, byte_source, command_source, line_editor};

/// Bounded depth of the byte queue.
pub const BYTE_QUEUE_DEPTH: usize = 1024;
/// Bounded depth of the output queue.
pub const OUTPUT_QUEUE_DEPTH: usize = 1;
/// Bounded depth of the command queue.
pub const COMMAND_QUEUE_DEPTH: usize = 1;

/// Open the byte stream endpoint, producing a startup-fatal error on failure.
pub async fn open_byte_stream(path: &str) -> Result<File> {
    File::open(path)
        .await
        .map_err(|source| Error::ByteStreamOpen {
            path: path.to_string(),
            source,
        })
}

/// Open the command stream endpoint, producing a startup-fatal error on failure.
pub async fn open_command_stream(path: &str) -> Result<File> {
    File::open(path)
        .await
        .map_err(|source| Error::CommandStreamOpen {
            path: path.to_string(),
            source,
        })
}

/// A running pipeline: every component task has been spawned, and `control`
/// is the only handle needed to drive start/stop-and-flush/reset/terminate.
pub struct Pipeline {
    pub control: Control,
}

impl Pipeline {
    /// Spawn every component as its own task and return a handle to the
    /// Control Plane. Generic over the byte-stream reader so tests can drive
    /// it with an in-memory duplex instead of a real file.
    pub fn spawn<R>(
        byte_reader: R,
        command_path: impl AsRef<Path>,
        command_initial: File,
        sink: Box<dyn RecordSink>,
        pid_file: Option<PathBuf>,
    ) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let reading = Arc::new(AtomicBool::new(false));
        let counter = Arc::new(AtomicU64::new(0));

        let (byte_tx, byte_rx) = mpsc::channel::<u8>(BYTE_QUEUE_DEPTH);
        let (cmd_tx, cmd_rx) = mpsc::channel::<String>(COMMAND_QUEUE_DEPTH);
        let (out_tx, out_rx) = mpsc::channel::<String>(OUTPUT_QUEUE_DEPTH);
        let (reset_editor_tx, reset_editor_rx) = watch::channel(0u64);
        let (reset_assembler_tx, reset_assembler_rx) = watch::channel(0u64);

        let control = Control::new(
            reading.clone(),
            byte_tx.clone(),
            reset_editor_tx,
            reset_assembler_tx,
            pid_file,
        );

        let command_path = command_path.as_ref().to_path_buf();

        tokio::spawn(byte_source::run(byte_reader, reading, byte_tx));
        tokio::spawn(command_source::run(command_path, command_initial, cmd_tx));
        tokio::spawn(line_editor::run(byte_rx, out_tx, reset_editor_rx));
        tokio::spawn(assembler::run(out_rx, cmd_rx, counter, reset_assembler_rx, sink));

        Self { control }
    }
}
