//! `cascade` – inspect, merge, and resolve cascade configuration.
//!
//! Builds a store from positional `key=value` lines and `--file` sources,
//! then runs the requested actions: `--get` prints resolved values (template
//! expansion included), `--list` prints the visible entries, `--write`
//! serialises the store back out.  With `--interactive`, keys nobody has are
//! asked for on stdin/stdout using the store's prompt protocol.
//!
//! ```text
//! $ cascade --file base.conf name=Alice --get greeting
//! Hello Alice
//! ```

use std::io;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cascade_cli::args::Cli;
use cascade_cli::files;
use cascade_core::PromptEndpoints;

fn main() -> anyhow::Result<()> {
    // Structured logging on stderr; level overridden by `RUST_LOG`.  Stdout
    // stays clean for the actual output (and the interactive prompts).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let endpoints = cli
        .interactive
        .then(|| PromptEndpoints::new(Some(Box::new(io::stdin())), Some(Box::new(io::stdout()))));

    let config = files::build(&cli.lines, &cli.file, None, endpoints);

    for key in &cli.get {
        println!("{}", config.get(key).unwrap_or_default());
    }

    if let Some(path) = &cli.write {
        files::save_to(&config, path)
            .with_context(|| format!("writing store to {}", path.display()))?;
    }

    if cli.list || cli.wants_default_listing() {
        for line in config.list() {
            println!("{line}");
        }
    }

    Ok(())
}
