//! The `?`/`<key>` placeholder language.
//!
//! A stored value whose first character is `?` is a *template*: the text
//! after the `?` may reference other keys with angle-bracket placeholders,
//! and the referenced values are spliced in when the value is read.
//!
//! ```rust
//! use cascade_core::Config;
//!
//! let config = Config::new();
//! config.put("name", "Alice");
//! config.put_line("greeting=?Hello <name>");
//!
//! assert_eq!(config.get("greeting").as_deref(), Some("Hello Alice"));
//! ```
//!
//! # Expansion rules
//!
//! Scanning runs left to right.  Each `<key>` placeholder is resolved with a
//! full [`Config::get`]-style lookup on the node performing the expansion —
//! chain delegation and interactive prompting included.  A placeholder whose
//! key resolves to nothing is kept verbatim, brackets and all.  When the
//! fully expanded result contains no `<`, the leading `?` is stripped;
//! otherwise the `?` stays, marking the value as still-unresolved for the
//! caller.
//!
//! Expansion happens transparently inside `get` at every chain level a
//! `?`-value passes through.  That repetition is load-bearing: a template
//! stored in a parent may use placeholders only the child can satisfy — the
//! parent's expansion leaves them intact and the child's pass fills them in.
//!
//! # Cycles
//!
//! A template may (transitively) reference its own key.  Expansion threads a
//! depth counter through the nested lookups and gives up at [`MAX_DEPTH`],
//! reporting via `tracing` and leaving the value unexpanded, so lookup stays
//! total even on cyclic configurations.

use thiserror::Error;
use tracing::error;

use crate::store::Config;

/// Upper bound on nested template expansions.
///
/// Legitimate configurations nest a handful of levels; anything deeper is a
/// reference cycle in practice.
pub const MAX_DEPTH: usize = 64;

/// Errors surfaced by the checked expansion entry point.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// Expansion recursed past [`MAX_DEPTH`] nested lookups, which means the
    /// template (transitively) references itself.
    #[error("placeholder expansion exceeded {limit} nested lookups; the template likely references its own key")]
    DepthExceeded { limit: usize },
}

impl Config {
    /// Expands `query` against this node and returns the result.
    ///
    /// Text that does not start with `?` passes through unchanged.  On a
    /// cyclic template the original query is returned as-is after the
    /// condition is reported; use [`try_expand`](Config::try_expand) to
    /// observe the cycle as a typed error instead.
    pub fn lookup(&self, query: &str) -> String {
        self.try_expand(query).unwrap_or_else(|err| {
            error!(query, error = %err, "placeholder expansion aborted");
            query.to_string()
        })
    }

    /// Checked variant of [`lookup`](Config::lookup).
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::DepthExceeded`] when the template
    /// (transitively) references its own key.
    pub fn try_expand(&self, query: &str) -> Result<String, TemplateError> {
        expand(self, query, 0)
    }
}

/// One full expansion pass at the given nesting depth.
pub(crate) fn expand(config: &Config, query: &str, depth: usize) -> Result<String, TemplateError> {
    if !query.starts_with('?') {
        return Ok(query.to_string());
    }
    if depth >= MAX_DEPTH {
        return Err(TemplateError::DepthExceeded { limit: MAX_DEPTH });
    }
    let expanded = substitute(config, query, depth)?;
    if expanded.contains('<') {
        // Something stayed unresolved: keep the `?` marker.
        Ok(expanded)
    } else {
        Ok(expanded[1..].to_string())
    }
}

/// Splices resolved values over each well-formed `<key>` in `text`.
///
/// Malformed bracketing (no `<`, no `>`, or a `>` before the first `<`)
/// stops the scan and passes the remainder through untouched.
fn substitute(config: &Config, text: &str, depth: usize) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let (Some(start), Some(end)) = (rest.find('<'), rest.find('>')) else {
            out.push_str(rest);
            return Ok(out);
        };
        if end <= start {
            out.push_str(rest);
            return Ok(out);
        }
        out.push_str(&rest[..start]);
        let key = &rest[start + 1..end];
        match config.try_resolve(key, None, depth + 1)? {
            Some(value) => out.push_str(&value),
            None => {
                // Unresolved: keep the placeholder verbatim.
                out.push('<');
                out.push_str(key);
                out.push('>');
            }
        }
        rest = &rest[end + 1..];
    }
}
