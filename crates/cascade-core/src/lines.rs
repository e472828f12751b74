//! The `key=value` line codec.
//!
//! One persisted format serves three callers: batch loading (files, process
//! arguments), serialisation, and the interactive answer reader.  Each line
//! is `<key>=<value>` terminated by `\n`; a line with no `=` at all is
//! shorthand for `<token>=true`.
//!
//! # Split policy
//!
//! Lines are split on the *first* `=` only, so values may legitimately
//! contain `=` (URLs, base64, nested assignments).  The write side never
//! escapes anything, which keeps the round trip exact under this policy:
//! `put_line` of every line produced by [`write_all`] reconstructs the same
//! mapping.
//!
//! # Reading contract
//!
//! [`read_line`] consumes bytes up to and excluding a `\n`, or up to end of
//! stream.  When zero bytes were accumulated the result is absent (`None`),
//! not an empty string.  A truly blank line is therefore indistinguishable
//! from end of input – a quirk of the protocol that callers inherit rather
//! than one this module papers over.

use std::io::{self, Read, Write};

use tracing::debug;

use crate::store::Config;

/// Splits one line into its key/value pair.
///
/// Returns `None` for lines that store nothing: the empty line and lines
/// whose key would be empty (a leading `=`).
///
/// # Examples
///
/// ```rust
/// use cascade_core::lines::parse_line;
///
/// assert_eq!(parse_line("port=80"), Some(("port", "80")));
/// assert_eq!(parse_line("url=http://host?a=b"), Some(("url", "http://host?a=b")));
/// assert_eq!(parse_line("verbose"), Some(("verbose", "true")));
/// assert_eq!(parse_line("=orphan"), None);
/// ```
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    match line.split_once('=') {
        Some(("", _)) => None,
        Some((key, value)) => Some((key, value)),
        None if line.is_empty() => None,
        None => Some((line, "true")),
    }
}

/// Reads one line: bytes until `\n` (excluded) or end of stream.
///
/// Returns `None` when nothing was accumulated – end of stream and a blank
/// line both land here.  Bytes are decoded as UTF-8 lossily.  An I/O error
/// mid-line discards the partial buffer and yields `None`; reading never
/// propagates an error.
pub fn read_line<R: Read + ?Sized>(reader: &mut R) -> Option<String> {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                if byte[0] == b'\n' {
                    break;
                }
                buf.push(byte[0]);
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                debug!(error = %err, "line read failed; treating as end of input");
                return None;
            }
        }
    }
    if buf.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Feeds every line from `reader` into `config` until the stream runs dry.
///
/// Returns the number of lines consumed.  There is no rollback: a source
/// that dies halfway leaves the store with everything read up to that point.
pub fn read_all<R: Read + ?Sized>(config: &Config, reader: &mut R) -> usize {
    let mut count = 0;
    while let Some(line) = read_line(reader) {
        config.put_line(&line);
        count += 1;
    }
    count
}

/// Writes every visible entry of the chain as one `key=value` line.
///
/// Iterates the parent-inclusive key set in sorted order, so output is
/// deterministic for a given chain state.
///
/// # Errors
///
/// Propagates the first write failure; the caller owns reporting it.
pub fn write_all<W: Write + ?Sized>(config: &Config, writer: &mut W) -> io::Result<()> {
    for (key, value) in config.get_all("") {
        writeln!(writer, "{key}={value}")?;
    }
    writer.flush()
}
