//! The Line Editor.
//!
//! A byte-driven state machine that turns a noisy terminal byte stream into
//! clean per-command output: it tracks an edited text buffer with a cursor,
//! filters terminal control sequences down to the small subset a cooperating
//! shell actually needs (cursor motion, alternate-screen enter/exit), and
//! emits the buffer as a string whenever it sees the in-band end-of-command
//! marker.

use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::types::END_OF_COMMAND;

const ESC: u8 = 0x1B;
const BACKSPACE: u8 = 0x08;
const DEL: u8 = 0x7F;
const NEWLINE: u8 = 0x0A;
const CARRIAGE_RETURN: u8 = 0x0D;

fn is_printable(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte)
}

fn is_csi_terminator(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'~'
}

/// The editor's mode, expressed as a tagged variant rather than a pair of
/// booleans so the "currently mid-escape-sequence" invariants are visible at
/// the type level.
enum Mode {
    Normal,
    /// Saw an ESC byte and is waiting for exactly one more byte to decide
    /// whether a CSI sequence is starting.
    PendingEscape,
    InsideCsi(Vec<u8>),
}

/// Per-instance editor state.
pub struct LineEditor {
    buffer: Vec<u8>,
    cursor: usize,
    mode: Mode,
    in_alternate_screen: bool,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineEditor {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
            mode: Mode::Normal,
            in_alternate_screen: false,
        }
    }

    /// Clear all state: buffer, cursor, in-progress CSI accumulation, and the
    /// alternate-screen flag.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.mode = Mode::Normal;
        self.in_alternate_screen = false;
    }

    #[cfg(test)]
    fn buffer_as_str(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    #[cfg(test)]
    fn cursor(&self) -> usize {
        self.cursor
    }

    fn insert(&mut self, byte: u8) {
        if self.cursor == self.buffer.len() {
            self.buffer.push(byte);
        } else {
            self.buffer.insert(self.cursor, byte);
        }
        self.cursor += 1;
    }

    fn delete_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.buffer.remove(self.cursor - 1);
            self.cursor -= 1;
        }
    }

    fn dispatch_csi(&mut self, sequence: &[u8]) {
        let Some(&terminator) = sequence.last() else {
            return;
        };
        let contains_alt_screen_marker = sequence.windows(5).any(|w| w == b"?1049");

        if terminator == b'h' && contains_alt_screen_marker {
            self.in_alternate_screen = true;
        } else if terminator == b'l' && contains_alt_screen_marker {
            self.in_alternate_screen = false;
        } else if terminator == b'D' {
            if self.cursor > 0 {
                self.cursor -= 1;
            }
        } else if terminator == b'C' {
            if self.cursor < self.buffer.len() {
                self.cursor += 1;
            }
        }
        // All other sequences are silently discarded.
    }

    /// Feed one byte into the state machine. Returns `Some(output)` exactly
    /// when the end-of-command marker was processed in normal mode.
    pub fn handle_byte(&mut self, byte: u8) -> Option<String> {
        match &mut self.mode {
            Mode::PendingEscape => {
                // Any byte other than `[` is an unrecognized escape type and
                // is silently discarded.
                self.mode = if byte == b'[' {
                    Mode::InsideCsi(Vec::new())
                } else {
                    Mode::Normal
                };
                None
            }
            Mode::InsideCsi(buf) => {
                buf.push(byte);
                if is_csi_terminator(byte) {
                    let sequence = std::mem::take(buf);
                    self.mode = Mode::Normal;
                    self.dispatch_csi(&sequence);
                }
                None
            }
            Mode::Normal => {
                if byte == ESC {
                    self.mode = Mode::PendingEscape;
                    return None;
                }
                if self.in_alternate_screen {
                    // Every byte but ESC is discarded; buffer/cursor untouched.
                    return None;
                }
                match byte {
                    END_OF_COMMAND => {
                        let output = self.buffer_as_string();
                        self.buffer.clear();
                        self.cursor = 0;
                        self.in_alternate_screen = false;
                        return Some(output);
                    }
                    BACKSPACE | DEL => self.delete_before_cursor(),
                    NEWLINE | CARRIAGE_RETURN => self.insert(byte),
                    b if is_printable(b) => self.insert(b),
                    _ => {}
                }
                None
            }
        }
    }

    fn buffer_as_string(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }
}

/// Run the Line Editor task: consume bytes from `byte_rx`, emit completed
/// outputs onto `output_tx`, and drain on a reset signal from `reset_rx`.
///
/// Everything here happens inside a single task, so mutual exclusion around
/// `buffer`/`cursor`/mode is structural: only one branch of the `select!`
/// below ever runs at a time, which gives the same serialization a mutex
/// would without needing one (see DESIGN.md).
pub async fn run(
    mut byte_rx: mpsc::Receiver<u8>,
    output_tx: mpsc::Sender<String>,
    mut reset_rx: watch::Receiver<u64>,
) {
    let mut editor = LineEditor::new();

    loop {
        tokio::select! {
            biased;

            changed = reset_rx.changed() => {
                if changed.is_err() {
                    // Control Plane dropped — nothing left to reset for.
                    continue;
                }
                editor.reset();
                while byte_rx.try_recv().is_ok() {}
                debug!("line editor reset");
            }

            maybe_byte = byte_rx.recv() => {
                match maybe_byte {
                    Some(byte) => {
                        if let Some(output) = editor.handle_byte(byte) {
                            if output_tx.send(output).await.is_err() {
                                break;
                            }
                        }
                    }
                    None => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(editor: &mut LineEditor, bytes: &[u8]) -> Option<String> {
        let mut last = None;
        for &b in bytes {
            last = editor.handle_byte(b);
        }
        last
    }

    #[test]
    fn plain_bytes_pass_through_verbatim() {
        let mut editor = LineEditor::new();
        let out = feed(&mut editor, b"hello\r\n\x04");
        assert_eq!(out, Some("hello\r\n".to_string()));
    }

    #[test]
    fn ansi_color_is_stripped() {
        let mut editor = LineEditor::new();
        let input = b"\x1b[32mfile.txt\x1b[0m\r\n\x04";
        let out = feed(&mut editor, input);
        assert_eq!(out, Some("file.txt\r\n".to_string()));
    }

    #[test]
    fn backspace_correction() {
        let mut editor = LineEditor::new();
        let out = feed(&mut editor, b"helloX\x7f\x04");
        assert_eq!(out, Some("hello".to_string()));
    }

    #[test]
    fn repeated_backspace_past_start_is_a_no_op() {
        let mut editor = LineEditor::new();
        feed(&mut editor, &[BACKSPACE, BACKSPACE, BACKSPACE]);
        assert_eq!(editor.buffer_as_str(), "");
        assert_eq!(editor.cursor(), 0);
    }

    #[test]
    fn cursor_editing_with_arrow_keys() {
        // "helo" then left, left, insert 'l' at the gap -> "hello"
        let mut editor = LineEditor::new();
        feed(&mut editor, b"helo");
        feed(&mut editor, b"\x1b[D");
        feed(&mut editor, b"\x1b[D");
        let out = feed(&mut editor, b"l\x04");
        assert_eq!(out, Some("hello".to_string()));
    }

    #[test]
    fn right_arrow_at_end_is_a_no_op() {
        let mut editor = LineEditor::new();
        feed(&mut editor, b"ab");
        feed(&mut editor, b"\x1b[C");
        assert_eq!(editor.cursor(), 2);
    }

    #[test]
    fn left_arrow_at_start_is_a_no_op() {
        let mut editor = LineEditor::new();
        feed(&mut editor, b"\x1b[D");
        assert_eq!(editor.cursor(), 0);
    }

    #[test]
    fn alternate_screen_content_is_filtered() {
        let mut editor = LineEditor::new();
        let input = b"before\x1b[?1049hGARBAGE\x1b[?1049lafter\x04";
        let out = feed(&mut editor, input);
        assert_eq!(out, Some("beforeafter".to_string()));
    }

    #[test]
    fn unknown_csi_sequences_are_consumed_with_no_visible_effect() {
        let mut editor = LineEditor::new();
        let out = feed(&mut editor, b"ab\x1b[2J\x1b[38;5;12mcd\x04");
        assert_eq!(out, Some("abcd".to_string()));
    }

    #[test]
    fn escape_followed_by_non_bracket_is_dropped_silently() {
        let mut editor = LineEditor::new();
        // ESC 'c' (RIS) is not a CSI — the 'c' is discarded, 'X' still inserts.
        let out = feed(&mut editor, b"a\x1bcX\x04");
        assert_eq!(out, Some("aX".to_string()));
    }

    #[test]
    fn reset_clears_state_mid_sequence() {
        let mut editor = LineEditor::new();
        feed(&mut editor, b"garbage");
        editor.reset();
        assert_eq!(editor.buffer_as_str(), "");
        assert_eq!(editor.cursor(), 0);
        let out = feed(&mut editor, b"hello\x04");
        assert_eq!(out, Some("hello".to_string()));
    }
}
