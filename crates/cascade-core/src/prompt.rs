//! Interactive resolution endpoints.
//!
//! A chain root may be constructed with a pair of line-oriented endpoints: a
//! readable source and a writable sink.  When a lookup reaches the root and
//! still has no value, the root writes a single question line to the sink –
//!
//! ```text
//! Config: timeout?
//! Config: color? ([blue, green, red])
//! ```
//!
//! – and reads exactly one answer line back from the source.  The answer is
//! taken at face value: an options restriction shapes the question, it does
//! not re-validate the reply.
//!
//! # Failure policy
//!
//! Resolution must never take the host process down.  Every I/O failure on
//! either endpoint is swallowed (logged at debug level) and the lookup
//! degrades to "absent".  A failed question write also skips the read, so a
//! broken sink cannot consume answers blindly.
//!
//! # Testing
//!
//! The real endpoints are usually stdin/stdout, which tests cannot observe.
//! [`RecordingSink`] is the shipped test double: a cloneable sink backed by a
//! shared buffer, so a test can keep one handle and give the other to the
//! store, then assert on exactly which prompts were written.  Any in-memory
//! reader (such as [`std::io::Cursor`]) works as the source side.

use std::collections::BTreeSet;
use std::fmt;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::lines;

/// The optional input/output pair a chain root prompts through.
///
/// Either side may be absent.  Without a sink no resolution happens at all –
/// a question that cannot be asked is not answered from the source either.
/// Without a source the question is still asked but the result is absent.
pub struct PromptEndpoints {
    input: Option<Box<dyn Read + Send>>,
    output: Option<Box<dyn Write + Send>>,
}

impl PromptEndpoints {
    /// Bundles a readable source and a writable sink, each optional.
    pub fn new(
        input: Option<Box<dyn Read + Send>>,
        output: Option<Box<dyn Write + Send>>,
    ) -> Self {
        Self { input, output }
    }

    /// Asks one question and reads one answer line.
    ///
    /// Returns `None` when the sink is missing, the write fails, the source
    /// is missing, or the source is exhausted.
    pub(crate) fn ask(&mut self, key: &str, options: Option<&BTreeSet<String>>) -> Option<String> {
        let output = self.output.as_mut()?;
        let question = render_prompt(key, options);
        if let Err(err) = output
            .write_all(question.as_bytes())
            .and_then(|()| output.flush())
        {
            debug!(key, error = %err, "prompt write failed; treating key as absent");
            return None;
        }
        let input = self.input.as_mut()?;
        lines::read_line(input)
    }
}

impl fmt::Debug for PromptEndpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptEndpoints")
            .field("has_input", &self.input.is_some())
            .field("has_output", &self.output.is_some())
            .finish()
    }
}

/// Renders the question line for `key`.
///
/// Options are rendered sorted and comma-separated so the prompt text is
/// deterministic regardless of how the option set was built.
fn render_prompt(key: &str, options: Option<&BTreeSet<String>>) -> String {
    match options {
        None => format!("Config: {key}?\n"),
        Some(opts) => {
            let rendered = opts
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            format!("Config: {key}? ([{rendered}])\n")
        }
    }
}

/// A cloneable sink that records everything written to it.
///
/// All clones share one buffer behind a mutex, so a test can hand one clone
/// to [`PromptEndpoints`] and read the prompts back through another.
#[derive(Clone, Default)]
pub struct RecordingSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far, decoded as UTF-8 (lossily).
    pub fn contents(&self) -> String {
        let buffer = self
            .buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Write for RecordingSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut buffer = self
            .buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for RecordingSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSink")
            .field("bytes", &self.contents().len())
            .finish()
    }
}
