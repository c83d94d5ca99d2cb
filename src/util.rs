// util.rs

use std::io::{self, Write};

/// Writes `s` plus a newline, treating a closed reader as success.
pub fn writeln_ignore_broken_pipe<W: Write, S: AsRef<str>>(mut w: W, s: S) -> io::Result<()> {
    let s = s.as_ref();
    let result = if s.ends_with('\n') { w.write_all(s.as_bytes()) } else { writeln!(w, "{}", s) };
    match result.and_then(|_| w.flush()) {
        Err(ref e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
