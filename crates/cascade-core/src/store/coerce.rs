//! Boolean and number coercion on top of string lookup.
//!
//! Every helper here is total: a missing or unparseable value coerces to a
//! falsy default (`false` / `0.0`) instead of erroring.  The fallback runs as
//! an explicit chain – strict parse first, then one retry through the
//! constrained interactive path, then the default – rather than any
//! exception-shaped control flow.

use std::collections::BTreeSet;

use super::node::Config;

/// The option set offered when a boolean value fails to parse.
const BOOLEAN_OPTIONS: [&str; 2] = ["true", "false"];

/// The option set offered when a number fails to parse.  Purely
/// illustrative: it exercises the options-constrained resolution path, it is
/// not validation.
const NUMBER_OPTIONS: [&str; 6] = ["-10.00", "0", "1.0", "200.", "300030.030003", ".."];

fn option_set(options: &[&str]) -> BTreeSet<String> {
    options.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Coerces the resolved value of `key` to a boolean.
    ///
    /// Only the exact tokens `true` and `false` parse.  Anything else causes
    /// one retry through [`get_constrained`](Config::get_constrained) with
    /// the options `{true, false}`; if that also fails to produce a boolean
    /// token, the result is `false`.  A missing key is `false`.
    pub fn get_boolean(&self, key: &str) -> bool {
        match self.get(key) {
            Some(value) => match value.parse::<bool>() {
                Ok(parsed) => parsed,
                Err(_) => self
                    .get_constrained(key, &option_set(&BOOLEAN_OPTIONS))
                    .and_then(|answer| answer.parse::<bool>().ok())
                    .unwrap_or(false),
            },
            None => false,
        }
    }

    /// Returns `true` iff the key exists somewhere in the chain *and* its
    /// coerced boolean value is `true`.
    ///
    /// The existence check runs first, so a missing key never triggers the
    /// interactive protocol from here.
    pub fn has_boolean(&self, key: &str) -> bool {
        self.has(key) && self.get_boolean(key)
    }

    /// Coerces the resolved value of `key` to an `f64`.
    ///
    /// On a parse failure the lookup is retried constrained to a fixed
    /// illustrative set of numeric-looking options; on total failure the
    /// result is `0.0`.
    pub fn get_number(&self, key: &str) -> f64 {
        match self.get(key) {
            Some(value) => match value.parse::<f64>() {
                Ok(parsed) => parsed,
                Err(_) => self
                    .get_constrained(key, &option_set(&NUMBER_OPTIONS))
                    .and_then(|answer| answer.parse::<f64>().ok())
                    .unwrap_or(0.0),
            },
            None => 0.0,
        }
    }

    /// Returns `true` iff the key exists somewhere in the chain and its
    /// coerced number is finite.  `NaN` and the infinities fail this check.
    pub fn has_number(&self, key: &str) -> bool {
        self.has(key) && self.get_number(key).is_finite()
    }
}
