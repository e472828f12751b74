//! The [`Config`] node: storage, parent delegation, and lookup.
//!
//! A `Config` owns a flat mapping of string keys to string values plus two
//! optional attachments:
//!
//! - a **parent** – another `Config` that misses are delegated to, forming a
//!   fallback chain of arbitrary depth;
//! - **prompt endpoints** – a line-oriented input/output pair that the chain
//!   root may use to ask an external stream for values nobody has.
//!
//! # Lookup order
//!
//! `get` walks local storage first, then ancestors, and only at the terminus
//! of the chain (a node with no parent) falls back to interactive resolution.
//! A value that begins with `?` is a template and is expanded transparently
//! before it is returned (see the [`template`](crate::template) module).
//!
//! # Thread safety
//!
//! The entries map is a [`DashMap`], so a `Config` wrapped in an `Arc` can be
//! read and written from many threads without external locking.  Each `put`
//! is a single atomic upsert; batch operations offer no atomicity across
//! lines.  The prompt endpoints sit behind their own mutex so concurrent
//! interactive lookups cannot interleave their question/answer pairs.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tracing::error;

use crate::lines;
use crate::prompt::PromptEndpoints;
use crate::template::{self, TemplateError};

/// The key that turns on answer caching for interactive resolution.
pub(crate) const SAVE_KEY: &str = "save";

/// A hierarchical key/value configuration node.
///
/// Created empty, with a parent, or with prompt endpoints; seeded from
/// `key=value` lines via [`put_line`](Config::put_line); shared across
/// threads behind an [`Arc`].
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use cascade_core::Config;
///
/// let defaults = Arc::new(Config::new());
/// defaults.put("color", "plain");
///
/// let overrides = Config::with_parent(Arc::clone(&defaults));
/// overrides.put("verbose", "true");
///
/// assert_eq!(overrides.get("color").as_deref(), Some("plain"));
/// assert!(overrides.has("verbose"));
/// assert!(!defaults.has("verbose"));
/// ```
pub struct Config {
    /// Local entries.  Keys are unique; insertion order is irrelevant for
    /// lookup (serialisation sorts through [`get_all`](Config::get_all)).
    entries: DashMap<String, String>,
    /// Read-only delegation target.  Taken by value at construction and never
    /// re-seated, so a node cannot reach itself through its own chain.
    parent: Option<Arc<Config>>,
    /// Interactive endpoints, present only on nodes that may prompt.  One
    /// mutex guards both directions so a prompt and its answer form a single
    /// critical section.
    endpoints: Option<Mutex<PromptEndpoints>>,
}

impl Config {
    /// Creates an empty, parentless, non-interactive node.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            parent: None,
            endpoints: None,
        }
    }

    /// Creates an empty node that delegates misses to `parent`.
    pub fn with_parent(parent: Arc<Config>) -> Self {
        Self {
            entries: DashMap::new(),
            parent: Some(parent),
            endpoints: None,
        }
    }

    /// Creates an empty chain root that may ask `endpoints` for missing keys.
    ///
    /// Endpoints only ever fire on a node without a parent; a node that has a
    /// parent delegates the whole lookup instead.
    pub fn with_prompt(endpoints: PromptEndpoints) -> Self {
        Self {
            entries: DashMap::new(),
            parent: None,
            endpoints: Some(Mutex::new(endpoints)),
        }
    }

    /// Creates an empty node carrying both a parent and endpoints.
    ///
    /// The endpoints stay inert for as long as the parent exists – a node
    /// with a parent delegates every miss unconditionally and never prompts.
    pub fn with_parent_and_prompt(parent: Arc<Config>, endpoints: PromptEndpoints) -> Self {
        Self {
            entries: DashMap::new(),
            parent: Some(parent),
            endpoints: Some(Mutex::new(endpoints)),
        }
    }

    // ── Storage ───────────────────────────────────────────────────────────────

    /// Inserts or overwrites an entry.  An empty key is ignored.
    pub fn put(&self, key: &str, value: &str) {
        if key.is_empty() {
            return;
        }
        self.entries.insert(key.to_string(), value.to_string());
    }

    /// Parses one `key=value` line and stores it.
    ///
    /// The line is split on the *first* `=`, so values may themselves contain
    /// `=`.  A line with no `=` is shorthand for `key=true`.  Lines with an
    /// empty key are dropped silently.
    pub fn put_line(&self, line: &str) {
        if let Some((key, value)) = lines::parse_line(line) {
            self.put(key, value);
        }
    }

    /// Feeds each line to [`put_line`](Config::put_line).
    ///
    /// There is no atomicity across the batch: a line that fails to parse is
    /// dropped without rolling back earlier lines.
    pub fn put_lines<I, S>(&self, batch: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in batch {
            self.put_line(line.as_ref());
        }
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    /// Returns `true` iff the key exists here or anywhere up the chain.
    ///
    /// Never triggers interactive resolution.
    pub fn has(&self, key: &str) -> bool {
        if self.entries.contains_key(key) {
            return true;
        }
        self.parent.as_ref().is_some_and(|parent| parent.has(key))
    }

    /// Returns the value for `key`, walking local storage, then ancestors,
    /// then (at the terminus only) the interactive protocol.
    ///
    /// A missing key is not an error: the result is simply `None`.  Values
    /// beginning with `?` are expanded as templates before being returned.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.try_resolve(key, None, 0) {
            Ok(value) => value,
            Err(err) => self.recover_raw(key, &err),
        }
    }

    /// As [`get`](Config::get), but a local value outside `options` counts as
    /// missing.  The restriction travels with the delegation to the parent
    /// and is rendered into the prompt at the terminus; the answer read back
    /// is *not* re-validated against it.
    pub fn get_constrained(&self, key: &str, options: &BTreeSet<String>) -> Option<String> {
        match self.try_resolve(key, Some(options), 0) {
            Ok(value) => value,
            Err(err) => self.recover_raw(key, &err),
        }
    }

    /// Returns every `(key, value)` pair in the chain whose key starts with
    /// `prefix`, raw (templates are not expanded).
    ///
    /// This is a plain union of the parent's view and the local entries: a
    /// child value does **not** displace a parent's different value for the
    /// same key here, only in single-key [`get`](Config::get).  The returned
    /// set iterates in sorted order, which the line serialiser relies on for
    /// deterministic output.
    pub fn get_all(&self, prefix: &str) -> BTreeSet<(String, String)> {
        let mut all = match &self.parent {
            Some(parent) => parent.get_all(prefix),
            None => BTreeSet::new(),
        };
        for entry in self.entries.iter() {
            if entry.key().starts_with(prefix) {
                all.insert((entry.key().clone(), entry.value().clone()));
            }
        }
        all
    }

    /// Returns every visible entry as a `key=value` string, sorted by key.
    pub fn list(&self) -> Vec<String> {
        self.get_all("")
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect()
    }

    /// Returns a brand-new, parentless, non-interactive node holding the
    /// resolved value of each requested key this chain has.
    ///
    /// The result is a snapshot, not a view: later mutations of either node
    /// do not affect the other.  Resolution runs through the full chain, so
    /// templates expand and a terminus with endpoints may prompt.
    pub fn copy(&self, keys: &[&str]) -> Config {
        let snapshot = Config::new();
        for key in keys {
            if self.has(key) {
                if let Some(value) = self.get(key) {
                    snapshot.put(key, &value);
                }
            }
        }
        snapshot
    }

    // ── Resolution internals ──────────────────────────────────────────────────

    /// Chain lookup with options filtering and template expansion.
    ///
    /// `depth` counts nested template expansions; it is threaded through the
    /// placeholder lookups so that self-referential templates run into
    /// [`TemplateError::DepthExceeded`] instead of unbounded recursion.
    pub(crate) fn try_resolve(
        &self,
        key: &str,
        options: Option<&BTreeSet<String>>,
        depth: usize,
    ) -> Result<Option<String>, TemplateError> {
        let mut value = self.entries.get(key).map(|entry| entry.value().clone());
        if let (Some(candidate), Some(allowed)) = (&value, options) {
            if !allowed.contains(candidate) {
                value = None;
            }
        }
        if value.is_none() {
            value = match &self.parent {
                Some(parent) => parent.try_resolve(key, options, depth)?,
                None => self.prompt_for(key, options),
            };
        }
        match value {
            // A template is re-expanded at every chain level it passes
            // through: placeholders the owner could not satisfy may still be
            // resolvable with this node's entries.
            Some(v) if v.starts_with('?') => template::expand(self, &v, depth).map(Some),
            other => Ok(other),
        }
    }

    /// Last stop of a failed expansion: report, then hand back the raw stored
    /// value so the caller still sees the unresolved template (leading `?`
    /// intact) rather than an error.  Lookup stays total.
    fn recover_raw(&self, key: &str, err: &TemplateError) -> Option<String> {
        error!(key, error = %err, "placeholder expansion aborted; returning raw template");
        self.raw(key)
    }

    /// Chain lookup without options, prompting, or expansion.
    fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .map(|entry| entry.value().clone())
            .or_else(|| self.parent.as_ref().and_then(|parent| parent.raw(key)))
    }

    /// Asks the endpoints for `key` and applies persistence-on-demand.
    ///
    /// Returns `None` on a node without endpoints, without a sink, without a
    /// source, or when any I/O fails: interactive resolution degrades to
    /// "absent", it never errors.
    fn prompt_for(&self, key: &str, options: Option<&BTreeSet<String>>) -> Option<String> {
        let endpoints = self.endpoints.as_ref()?;
        let answer = {
            // A poisoned lock means another prompt panicked mid-question; the
            // endpoints themselves are still usable, so recover rather than
            // propagate the panic.
            let mut guard = endpoints
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.ask(key, options)
        };
        // Once `save=true` is visible, every interactively resolved key is
        // cached in this node and will not be asked for again.  The `save`
        // key itself is never cached.
        if key != SAVE_KEY && answer.is_some() && self.has_boolean(SAVE_KEY) {
            if let Some(value) = &answer {
                self.put(key, value);
            }
        }
        answer
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("entries", &self.entries.len())
            .field("has_parent", &self.parent.is_some())
            .field("interactive", &self.endpoints.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_on_empty_store_is_absent() {
        let config = Config::new();
        assert_eq!(config.get("key1"), None);
    }

    #[test]
    fn test_put_then_get_returns_value() {
        // Arrange
        let config = Config::new();

        // Act
        config.put("key1", "value1");

        // Assert
        assert_eq!(config.get("key1").as_deref(), Some("value1"));
    }

    #[test]
    fn test_put_overwrites_existing_value() {
        let config = Config::new();
        config.put("key1", "value1");
        config.put("key1", "value2");
        assert_eq!(config.get("key1").as_deref(), Some("value2"));
    }

    #[test]
    fn test_put_ignores_empty_key() {
        let config = Config::new();
        config.put("", "value1");
        assert!(config.get_all("").is_empty());
    }

    #[test]
    fn test_put_line_splits_on_first_equals_only() {
        // A value may itself contain `=`.
        let config = Config::new();
        config.put_line("url=http://host?a=b");
        assert_eq!(config.get("url").as_deref(), Some("http://host?a=b"));
    }

    #[test]
    fn test_put_line_without_equals_is_boolean_shorthand() {
        let config = Config::new();
        config.put_line("verbose");
        assert_eq!(config.get("verbose").as_deref(), Some("true"));
    }

    #[test]
    fn test_put_line_with_empty_key_is_dropped() {
        let config = Config::new();
        config.put_line("=value1");
        assert!(config.get_all("").is_empty());
    }

    #[test]
    fn test_put_line_keeps_empty_value() {
        let config = Config::new();
        config.put_line("key1=");
        assert_eq!(config.get("key1").as_deref(), Some(""));
    }

    #[test]
    fn test_has_walks_parent_chain() {
        // Arrange – three-level chain with one key at the top
        let root = Arc::new(Config::new());
        root.put("key1", "value1");
        let middle = Arc::new(Config::with_parent(Arc::clone(&root)));
        let leaf = Config::with_parent(Arc::clone(&middle));

        // Assert – visible from every level, absent keys stay absent
        assert!(leaf.has("key1"));
        assert!(middle.has("key1"));
        assert!(!leaf.has("key2"));
    }

    #[test]
    fn test_get_delegates_to_parent_when_missing() {
        let parent = Arc::new(Config::new());
        parent.put("key1", "value1");
        let child = Config::with_parent(parent);
        child.put("key2", "value2");

        assert_eq!(child.get("key1").as_deref(), Some("value1"));
        assert_eq!(child.get("key2").as_deref(), Some("value2"));
    }

    #[test]
    fn test_get_prefers_local_over_ancestor() {
        let parent = Arc::new(Config::new());
        parent.put("key1", "parent");
        let child = Config::with_parent(parent);
        child.put("key1", "child");

        assert_eq!(child.get("key1").as_deref(), Some("child"));
    }

    #[test]
    fn test_get_all_unions_chain_without_shadowing() {
        // The prefix view is a plain union: the same key may appear once per
        // chain level when the values differ.
        let parent = Arc::new(Config::new());
        parent.put("key1", "parent");
        let child = Config::with_parent(parent);
        child.put("key1", "child");

        let all = child.get_all("key1");
        assert_eq!(all.len(), 2);
        assert!(all.contains(&("key1".to_string(), "parent".to_string())));
        assert!(all.contains(&("key1".to_string(), "child".to_string())));
    }

    #[test]
    fn test_get_all_filters_by_prefix() {
        let config = Config::new();
        config.put("net.port", "80");
        config.put("net.host", "localhost");
        config.put("log.level", "debug");

        let net = config.get_all("net.");
        assert_eq!(net.len(), 2);
        assert!(net.iter().all(|(key, _)| key.starts_with("net.")));
    }

    #[test]
    fn test_get_all_on_empty_store_is_empty() {
        let config = Config::new();
        assert!(config.get_all("key1").is_empty());
    }

    #[test]
    fn test_list_is_sorted_and_formatted() {
        let config = Config::new();
        config.put("b", "2");
        config.put("a", "1");
        config.put("c", "3");

        assert_eq!(config.list(), vec!["a=1", "b=2", "c=3"]);
    }

    #[test]
    fn test_copy_extracts_subset_without_parent() {
        // Arrange – entries spread across two chain levels
        let parent = Arc::new(Config::new());
        parent.put("a", "1");
        let child = Config::with_parent(parent);
        child.put("b", "2");
        child.put("c", "3");

        // Act
        let snapshot = child.copy(&["a", "b"]);

        // Assert – exactly the requested keys, no chain, no extras
        assert_eq!(snapshot.get("a").as_deref(), Some("1"));
        assert_eq!(snapshot.get("b").as_deref(), Some("2"));
        assert_eq!(snapshot.get("c"), None);
        assert_eq!(snapshot.get_all("").len(), 2);
    }

    #[test]
    fn test_copy_skips_missing_keys() {
        let config = Config::new();
        config.put("a", "1");

        let snapshot = config.copy(&["a", "missing"]);
        assert_eq!(snapshot.get_all("").len(), 1);
    }

    #[test]
    fn test_copy_is_a_snapshot_not_a_view() {
        let config = Config::new();
        config.put("a", "1");
        let snapshot = config.copy(&["a"]);

        config.put("a", "2");
        assert_eq!(snapshot.get("a").as_deref(), Some("1"));
    }

    #[test]
    fn test_concurrent_puts_and_gets() {
        use std::thread;

        // Arrange
        let config = Arc::new(Config::new());
        let writers: usize = 4;
        let keys_per_writer: usize = 100;

        // Act – hammer the map from several threads at once
        let handles: Vec<_> = (0..writers)
            .map(|w| {
                let shared = Arc::clone(&config);
                thread::spawn(move || {
                    for k in 0..keys_per_writer {
                        shared.put(&format!("w{w}.k{k}"), "x");
                        let _ = shared.get(&format!("w{w}.k{k}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread panicked");
        }

        // Assert
        assert_eq!(config.get_all("").len(), writers * keys_per_writer);
    }
}
