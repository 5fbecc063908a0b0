//! The Command Source.
//!
//! Reads newline-delimited command strings from a FIFO-like stream whose
//! writer opens, writes one or more terminated lines, and closes; a
//! subsequent command arrives after the writer re-opens. The source loops:
//! read lines from the current handle until end-of-stream, then re-open the
//! path and continue.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Drive the Command Source against `path`, starting from `initial` (the
/// handle opened during startup validation, so a missing path fails fast
/// before the rest of the pipeline spins up).
pub async fn run(path: impl AsRef<Path>, initial: File, tx: mpsc::Sender<String>) {
    let path = path.as_ref();
    let mut file = initial;

    loop {
        let mut reader = BufReader::new(file);
        let mut got_any_line = false;

        loop {
            let mut line = Vec::new();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => break, // end-of-stream: writer closed, re-open below
                Ok(_) => {
                    got_any_line = true;
                    if line.last() == Some(&b'\n') {
                        line.pop();
                    }
                    if line.is_empty() {
                        // "Lines with zero content ... are not emitted."
                        continue;
                    }
                    let command = String::from_utf8_lossy(&line).into_owned();
                    if tx.send(command).await.is_err() {
                        debug!("command source exiting: consumer gone");
                        return;
                    }
                }
                Err(e) => {
                    error!(error = %e, "command source read error");
                    return;
                }
            }
        }

        if got_any_line {
            debug!("command source: writer closed, re-opening");
        }

        file = match File::open(path).await {
            Ok(f) => f,
            Err(e) => {
                error!(error = %e, path = %path.display(), "command source re-open failed");
                return;
            }
        };
    }
}
