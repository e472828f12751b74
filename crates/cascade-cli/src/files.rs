//! File wrappers and the construction surface.
//!
//! The core store only speaks "sequences of lines"; this module owns the
//! file handles.  Loading failures are deliberately soft at the [`build`]
//! level: a source that cannot be read is reported on the diagnostic channel
//! and skipped, and the store continues in whatever partial state it
//! reached.  Writing is the exception – a failed `--write` is a real error
//! the user asked for, so it propagates.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cascade_core::{lines, Config, PromptEndpoints};
use thiserror::Error;
use tracing::{debug, error};

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// The source could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The target could not be created or written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Loads one line-format file into `config`.
///
/// # Errors
///
/// Returns [`FileError::Read`] when the file cannot be opened.  Errors past
/// the open (a source dying mid-read) follow the line codec's contract and
/// simply end the load early; the lines read so far stay applied.
pub fn load_into(config: &Config, path: &Path) -> Result<usize, FileError> {
    let file = File::open(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    Ok(lines::read_all(config, &mut reader))
}

/// Serialises every visible entry of `config` to `path`.
///
/// # Errors
///
/// Returns [`FileError::Write`] when the file cannot be created or a write
/// fails.
pub fn save_to(config: &Config, path: &Path) -> Result<(), FileError> {
    let file = File::create(path).map_err(|source| FileError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    lines::write_all(config, &mut writer).map_err(|source| FileError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Builds a store from the construction surface: positional lines first,
/// then files in order (so file entries overwrite same-named line entries),
/// with an optional parent chain and optional prompt endpoints on the
/// resulting node.
///
/// Unreadable files are reported and skipped; this function always returns a
/// usable store.
pub fn build(
    line_args: &[String],
    files: &[PathBuf],
    parent: Option<Arc<Config>>,
    endpoints: Option<PromptEndpoints>,
) -> Config {
    let config = match (parent, endpoints) {
        (Some(parent), Some(endpoints)) => Config::with_parent_and_prompt(parent, endpoints),
        (Some(parent), None) => Config::with_parent(parent),
        (None, Some(endpoints)) => Config::with_prompt(endpoints),
        (None, None) => Config::new(),
    };
    config.put_lines(line_args);
    for path in files {
        match load_into(&config, path) {
            Ok(count) => debug!(path = %path.display(), count, "loaded config file"),
            Err(err) => error!(error = %err, "skipping config source"),
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_load_into_missing_file_errors() {
        let config = Config::new();
        let result = load_into(&config, Path::new("/nonexistent/path/cascade.conf"));

        assert!(matches!(result, Err(FileError::Read { .. })));
        assert!(config.get_all("").is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.conf");
        let original = Config::new();
        original.put("key1", "value1");
        original.put("url", "http://host?a=b");

        // Act
        save_to(&original, &path).expect("save must succeed");
        let restored = Config::new();
        let count = load_into(&restored, &path).expect("load must succeed");

        // Assert
        assert_eq!(count, 2);
        assert_eq!(restored.get_all(""), original.get_all(""));
    }

    #[test]
    fn test_build_applies_lines_then_files() {
        // Arrange – the file redefines a key the positional lines also set
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("override.conf");
        fs::write(&path, "key1=from-file\nextra=1\n").expect("seed file");

        // Act
        let config = build(
            &["key1=from-args".to_string(), "flag".to_string()],
            &[path],
            None,
            None,
        );

        // Assert – file entries win, everything else merges
        assert_eq!(config.get("key1").as_deref(), Some("from-file"));
        assert_eq!(config.get("extra").as_deref(), Some("1"));
        assert!(config.get_boolean("flag"));
    }

    #[test]
    fn test_build_skips_unreadable_sources() {
        let config = build(
            &["key1=value1".to_string()],
            &[PathBuf::from("/nonexistent/path/cascade.conf")],
            None,
            None,
        );

        // The bad source is skipped; the store keeps its partial state.
        assert_eq!(config.get("key1").as_deref(), Some("value1"));
    }

    #[test]
    fn test_build_with_parent_delegates_misses() {
        let defaults = Arc::new(Config::new());
        defaults.put("color", "plain");

        let config = build(
            &["verbose".to_string()],
            &[],
            Some(Arc::clone(&defaults)),
            None,
        );

        assert_eq!(config.get("color").as_deref(), Some("plain"));
        assert!(config.get_boolean("verbose"));
        assert!(!defaults.has("verbose"));
    }

    #[test]
    fn test_saved_file_is_sorted_line_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sorted.conf");
        let config = Config::new();
        config.put("b", "2");
        config.put("a", "1");

        save_to(&config, &path).expect("save must succeed");

        assert_eq!(fs::read_to_string(&path).unwrap(), "a=1\nb=2\n");
    }
}
