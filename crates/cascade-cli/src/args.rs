//! Command-line argument surface.
//!
//! ```text
//! cascade [OPTIONS] [LINE]...
//!
//! Arguments:
//!   [LINE]...  key=value pairs or bare boolean flags, applied before any files
//!
//! Options:
//!   -f, --file <PATH>   Load a line-format file (repeatable, loaded in order)
//!   -g, --get <KEY>     Print the resolved value of KEY (repeatable)
//!   -l, --list          Print every visible key=value line
//!   -w, --write <PATH>  Serialise the store to PATH
//!   -i, --interactive   Ask stdin/stdout for keys nobody has
//! ```
//!
//! With none of `--get`/`--list`/`--write` given, the store is listed – the
//! tool then behaves as a config-file normaliser/merger.

use std::path::PathBuf;

use clap::Parser;

/// Inspect, merge, and resolve cascade configuration.
#[derive(Parser, Debug)]
#[command(name = "cascade", version, about)]
pub struct Cli {
    /// `key=value` pairs or bare boolean flags, applied before any files.
    ///
    /// A bare token is shorthand for `token=true`.  Entries loaded later
    /// (including from files) overwrite earlier ones with the same key.
    pub lines: Vec<String>,

    /// Line-format files to load, in order, after the positional lines.
    #[arg(short, long = "file", value_name = "PATH")]
    pub file: Vec<PathBuf>,

    /// Print the resolved value of each KEY, one per line (blank if absent).
    #[arg(short, long = "get", value_name = "KEY")]
    pub get: Vec<String>,

    /// Print every visible key=value line, sorted.
    #[arg(short, long)]
    pub list: bool,

    /// Serialise the store to PATH after loading.
    #[arg(short, long, value_name = "PATH")]
    pub write: Option<PathBuf>,

    /// Attach stdin/stdout so keys nobody has are asked for interactively.
    #[arg(short, long)]
    pub interactive: bool,
}

impl Cli {
    /// `true` when no explicit action was requested and the default listing
    /// should run.
    pub fn wants_default_listing(&self) -> bool {
        self.get.is_empty() && !self.list && self.write.is_none()
    }
}
