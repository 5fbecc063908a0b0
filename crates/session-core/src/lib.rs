//! session-core — the interactive streaming pipeline that turns a raw
//! terminal byte stream into a line-delimited sequence of structured
//! command/output/timestamp records.
//!
//! Five cooperating components, one task each, joined by typed channels:
//!
//! - [`byte_source`] reads the session byte stream, gated by the reading flag.
//! - [`command_source`] reads newline-delimited commands from a re-openable stream.
//! - [`line_editor`] filters terminal control sequences and emits completed outputs.
//! - [`assembler`] pairs outputs with commands and writes [`types::Record`]s to a sink.
//! - [`control`] translates external start/stop/reset/terminate signals into actions.
//!
//! [`pipeline::Pipeline`] wires all five together; the `session-structurer`
//! binary owns the OS-signal listener and the CLI/config/logging glue around
//! it.

pub mod assembler;
pub mod byte_source;
pub mod command_source;
pub mod config;
pub mod control;
pub mod error;
pub mod line_editor;
pub mod pipeline;
pub mod sink;
pub mod types;

pub use config::Config;
pub use control::Control;
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use sink::{LineSink, RecordSink};
pub use types::Record;
