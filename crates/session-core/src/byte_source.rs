//! The Byte Source.
//!
//! Reads the session byte stream one byte at a time and forwards each byte
//! onto the byte queue only while the reading flag is set. Gating happens
//! here, at the earliest possible point, rather than in the Line Editor —
//! bytes produced while the shell renders a prompt or edits a keystroke must
//! never reach the editor's buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Drive the Byte Source over an already-open stream until end-of-stream or
/// a non-EOF read error, closing `tx` when it returns either way.
pub async fn run<R: AsyncRead + Unpin>(mut reader: R, reading: Arc<AtomicBool>, tx: mpsc::Sender<u8>) {
    let mut forwarded: u64 = 0;
    loop {
        match reader.read_u8().await {
            Ok(byte) => {
                if reading.load(Ordering::Acquire) {
                    if tx.send(byte).await.is_err() {
                        // Consumer gone; nothing left to forward into.
                        break;
                    }
                    forwarded += 1;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                info!(forwarded, "byte source reached end of stream");
                break;
            }
            Err(e) => {
                error!(error = %e, "byte source read error");
                break;
            }
        }
    }
    debug!("byte source task exiting");
}
