//! The Control Plane.
//!
//! Translates the four external signals into the internal actions that
//! mutate the shared reading flag and the two reset channels. The signal
//! listener itself (reading actual POSIX signals) lives in the
//! `session-structurer` binary — this type is deliberately unaware of the
//! operating system's signal model, so it can be driven directly from
//! tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::info;

use crate::types::END_OF_COMMAND;

/// Shared handle used by every signal action. Cheap to clone — everything
/// inside is an `Arc` or a channel handle.
#[derive(Clone)]
pub struct Control {
    reading: Arc<AtomicBool>,
    byte_tx: mpsc::Sender<u8>,
    reset_editor: watch::Sender<u64>,
    reset_assembler: watch::Sender<u64>,
    pid_file: Option<PathBuf>,
}

impl Control {
    pub fn new(
        reading: Arc<AtomicBool>,
        byte_tx: mpsc::Sender<u8>,
        reset_editor: watch::Sender<u64>,
        reset_assembler: watch::Sender<u64>,
        pid_file: Option<PathBuf>,
    ) -> Self {
        Self {
            reading,
            byte_tx,
            reset_editor,
            reset_assembler,
            pid_file,
        }
    }

    /// `start` — set the reading flag.
    pub fn start(&self) {
        self.reading.store(true, Ordering::Release);
        info!("start: reading flag set");
    }

    /// `stop-and-flush` — clear the reading flag first (so no further bytes
    /// are admitted), then inject the end-of-command marker. The ordering is
    /// what makes the editor's snapshot correspond exactly to bytes received
    /// between the most recent start and this stop.
    pub async fn stop_and_flush(&self) {
        self.reading.store(false, Ordering::Release);
        if self.byte_tx.send(END_OF_COMMAND).await.is_err() {
            info!("stop-and-flush: byte queue closed, nothing to flush into");
        } else {
            info!("stop-and-flush: end-of-command marker enqueued");
        }
    }

    /// `reset` — snapshot the reading flag, clear it, notify both reset
    /// channels (idempotent: `watch` coalesces repeated sends into a single
    /// pending change), and flush a trailing marker only if bytes were being
    /// admitted at the moment of the reset.
    pub async fn reset(&self) {
        let was_reading = self.reading.swap(false, Ordering::AcqRel);
        self.reset_editor.send_modify(|v| *v = v.wrapping_add(1));
        self.reset_assembler.send_modify(|v| *v = v.wrapping_add(1));
        if was_reading {
            let _ = self.byte_tx.send(END_OF_COMMAND).await;
        }
        info!(was_reading, "reset: reset channels notified");
    }

    /// `terminate` — cleanup only. The caller (the binary's signal listener)
    /// is responsible for the actual process exit; a library has no business
    /// calling `std::process::exit`.
    pub fn cleanup(&self) {
        if let Some(path) = &self.pid_file {
            match std::fs::remove_file(path) {
                Ok(()) => info!(?path, "removed pid file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(?path, error = %e, "failed to remove pid file"),
            }
        }
    }
}
