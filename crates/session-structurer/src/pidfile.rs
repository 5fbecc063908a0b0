//! PID file writer.

use std::path::Path;

use anyhow::Context;

pub fn write(path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, format!("{}\n", std::process::id()))
        .with_context(|| format!("writing pid file {}", path.display()))
}
