//! # cascade-core
//!
//! A hierarchical, mutable key/value configuration store.  The single central
//! entity is [`Config`]: a flat map of string keys to string values that can
//! delegate misses to an optional parent node, ask an external line-oriented
//! stream for values it cannot find anywhere, and compose values out of other
//! keys through a small placeholder language.
//!
//! This crate has no dependency on files, terminals, or process arguments.
//! The only I/O it ever touches are the abstract [`std::io::Read`] /
//! [`std::io::Write`] endpoints handed to it at construction time; everything
//! file- or CLI-shaped lives in the `cascade-cli` crate.
//!
//! # Architecture overview
//!
//! - **`store`** – The [`Config`] node itself: the concurrent entries map,
//!   the parent delegation chain, and the boolean/number coercion helpers.
//!
//! - **`prompt`** – The interactive resolution protocol.  A chain root that
//!   was given endpoints writes `Config: <key>?` to its sink and reads one
//!   answer line from its source when a key is missing everywhere.
//!
//! - **`template`** – The `?`/`<key>` placeholder language.  A stored value
//!   beginning with `?` is expanded transparently inside [`Config::get`] by
//!   resolving each `<key>` placeholder against the same store.
//!
//! - **`lines`** – The `key=value` line codec shared by batch loading,
//!   serialisation, and the interactive answer reader.
//!
//! # Example
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

pub mod lines;
pub mod prompt;
pub mod store;
pub mod template;

// Re-export the most-used types at the crate root so callers can write
// `cascade_core::Config` instead of spelling out the module paths.
pub use prompt::{PromptEndpoints, RecordingSink};
pub use store::Config;
pub use template::TemplateError;
