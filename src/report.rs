//! Plain-text rendering of a batch, one line per index.
//!
//! ```text
//! Fact #0: Cats sleep 70% of their lives.
//! Error #1: endpoint returned HTTP 503
//! ```

use std::fmt::Display;
use std::io::{self, Write};

use crate::types::{Batch, Outcome};

/// Render a single outcome as `Fact #<index>: <value>` or
/// `Error #<index>: <cause>`
pub fn render_outcome<T: Display>(outcome: &Outcome<T>) -> String {
    match outcome.result() {
        Ok(value) => format!("Fact #{}: {}", outcome.index(), value),
        Err(error) => format!("Error #{}: {}", outcome.index(), error),
    }
}

/// Write every outcome of `batch` to `writer` in index order, one per line
pub fn write_batch<T: Display, W: Write>(writer: &mut W, batch: &Batch<T>) -> io::Result<()> {
    for outcome in batch {
        writeln!(writer, "{}", render_outcome(outcome))?;
    }
    writer.flush()
}
