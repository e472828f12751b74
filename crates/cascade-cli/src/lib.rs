//! # cascade-cli
//!
//! Thin I/O glue around [`cascade_core::Config`]: clap argument parsing,
//! file reading/writing wrappers, and stdin/stdout wiring for interactive
//! resolution.  All store behaviour lives in `cascade-core`; this crate only
//! turns process arguments and files into "sequences of lines" and back.

pub mod args;
pub mod files;
