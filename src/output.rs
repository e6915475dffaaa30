//! Writes path lists to a sink, one per line.
//!
//! The usual reader is a fuzzy finder that exits as soon as a selection is
//! made, so a closed pipe ends output quietly instead of failing.

use std::io::{self, Write};
use tracing::debug;

/// Write each path followed by `\n`. A broken pipe stops output and counts
/// as success; any other write error is returned.
pub fn emit<I, S, W>(paths: I, sink: &mut W) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    W: Write + ?Sized,
{
    match write_lines(paths, sink) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            debug!("Output closed by reader, stopping");
            Ok(())
        }
        other => other,
    }
}

fn write_lines<I, S, W>(paths: I, sink: &mut W) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    W: Write + ?Sized,
{
    for path in paths {
        sink.write_all(path.as_ref().as_bytes())?;
        sink.write_all(b"\n")?;
    }
    sink.flush()
}
