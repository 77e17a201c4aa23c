//! Named patterns and the compiled-regex cache
//!
//! `regex:...` and unknown format names both end up here. A name is looked
//! up in the caller's pattern table first, then in the built-in table below,
//! and is otherwise used as the pattern itself. Patterns written with slash
//! delimiters and trailing flags (`/^a+$/i`) are translated; anything else is
//! anchored at both ends.

use std::sync::Arc;

use indexmap::IndexMap;
use moka::sync::Cache;
use regex::Regex;
use tracing::warn;

use crate::foundation::Scalar;

// ============================================================================
// BUILT-IN PATTERNS
// ============================================================================

const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    ("alpha", "/^[A-Za-z]+$/"),
    ("alphaNum", "/^[A-Za-z0-9]+$/"),
    ("alphaDash", "/^[A-Za-z0-9_-]+$/"),
    ("chs", r"/^[\x{4e00}-\x{9fa5}]+$/u"),
    ("chsAlpha", r"/^[\x{4e00}-\x{9fa5}a-zA-Z]+$/u"),
    ("chsAlphaNum", r"/^[\x{4e00}-\x{9fa5}a-zA-Z0-9]+$/u"),
    ("chsDash", r"/^[\x{4e00}-\x{9fa5}a-zA-Z0-9_-]+$/u"),
    ("mobile", r"/^1[3-9]\d{9}$/"),
    (
        "idCard",
        r"/(^[1-9]\d{5}(18|19|([23]\d))\d{2}((0[1-9])|(10|11|12))(([0-2][1-9])|10|20|30|31)\d{3}[0-9Xx]$)|(^[1-9]\d{5}\d{2}((0[1-9])|(10|11|12))(([0-2][1-9])|10|20|30|31)\d{3}$)/",
    ),
    ("zip", r"/\d{6}/"),
];

/// Built-in pattern for `name`.
#[must_use]
pub fn builtin_pattern(name: &str) -> Option<&'static str> {
    BUILTIN_PATTERNS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, pattern)| *pattern)
}

/// Translates a rule pattern into `regex` syntax.
///
/// `/body/flags` becomes `(?flags)body` with the flags `imsUx` kept and `u`
/// dropped. Undelimited text becomes `^text$`.
#[must_use]
pub fn translate(pattern: &str) -> String {
    if let Some(rest) = pattern.strip_prefix('/')
        && let Some(end) = rest.rfind('/')
    {
        let body = &rest[..end];
        let flags: String = rest[end + 1..]
            .chars()
            .filter(|c| matches!(c, 'i' | 'm' | 's' | 'U' | 'x'))
            .collect();
        return if flags.is_empty() {
            body.to_owned()
        } else {
            format!("(?{flags}){body}")
        };
    }
    format!("^{pattern}$")
}

// ============================================================================
// PATTERN TABLE
// ============================================================================

/// Default compiled-pattern cache capacity.
pub const DEFAULT_CACHE_CAPACITY: u64 = 512;

/// Caller patterns plus a shared cache of compiled expressions.
///
/// Invalid patterns are cached too, as `None`, so the warning is logged once
/// per pattern rather than once per value.
#[derive(Clone)]
pub struct PatternTable {
    custom: IndexMap<String, String>,
    cache: Arc<Cache<String, Option<Regex>>>,
}

impl PatternTable {
    /// Creates a table with the given cache capacity.
    #[must_use]
    pub fn with_capacity(custom: IndexMap<String, String>, capacity: u64) -> Self {
        Self {
            custom,
            cache: Arc::new(Cache::builder().max_capacity(capacity).build()),
        }
    }

    /// Source pattern for a rule name.
    #[must_use]
    pub fn source<'a>(&'a self, rule: &'a str) -> &'a str {
        self.custom
            .get(rule)
            .map(String::as_str)
            .or_else(|| builtin_pattern(rule))
            .unwrap_or(rule)
    }

    /// Returns true when `rule` names a caller or built-in pattern.
    #[must_use]
    pub fn is_named(&self, rule: &str) -> bool {
        self.custom.contains_key(rule) || builtin_pattern(rule).is_some()
    }

    /// Compiled expression for a rule, from the cache when possible.
    #[must_use]
    pub fn compile(&self, rule: &str) -> Option<Regex> {
        let source = translate(self.source(rule));
        self.cache.get_with(source.clone(), || match Regex::new(&source) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!(pattern = %source, error = %err, "invalid validation pattern");
                None
            }
        })
    }

    /// Tests a value against a pattern rule. Arrays and objects never match.
    #[must_use]
    pub fn matches(&self, value: &Scalar<'_>, rule: &str) -> bool {
        let Some(text) = value.as_text() else {
            return false;
        };
        self.compile(rule).is_some_and(|regex| regex.is_match(&text))
    }

    /// Number of compiled patterns currently cached.
    #[must_use]
    pub fn cached(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::with_capacity(IndexMap::new(), DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for PatternTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternTable")
            .field("custom", &self.custom)
            .field("capacity", &self.cache.policy().max_capacity())
            .finish()
    }
}
