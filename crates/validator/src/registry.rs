//! Validator registry
//!
//! Holds everything that gives a rule tag its meaning: the alias table,
//! user-registered extensions, named conditions for `requireCallback`, and
//! the default message for each tag. Built-in primitives are a closed set
//! (see [`Builtin`]); extensions are consulted before them, so an extension
//! registered under a built-in tag replaces it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::foundation::{Check, SharedCheck};
use crate::messages::{Template, default_messages};
use crate::validators::Builtin;

/// Predicate consulted by `requireCallback`, called with `(value, data)`.
pub type Condition = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// What a tag resolves to at dispatch time.
#[derive(Clone, Copy)]
pub enum Resolved<'r> {
    /// A registered extension.
    Extension(&'r dyn Check),
    /// A built-in primitive.
    Builtin(Builtin),
}

/// Alias, extension, condition and default-message tables.
#[derive(Clone)]
pub struct Registry {
    aliases: HashMap<String, String>,
    extensions: HashMap<String, SharedCheck>,
    conditions: HashMap<String, Condition>,
    type_messages: IndexMap<String, Template>,
}

impl Registry {
    /// Registry with the built-in aliases and the English default messages.
    #[must_use]
    pub fn new() -> Self {
        let aliases = [
            (">", "gt"),
            (">=", "egt"),
            ("<", "lt"),
            ("<=", "elt"),
            ("=", "eq"),
            ("same", "eq"),
        ]
        .into_iter()
        .map(|(symbol, tag)| (symbol.to_owned(), tag.to_owned()))
        .collect();

        Self {
            aliases,
            extensions: HashMap::new(),
            conditions: HashMap::new(),
            type_messages: default_messages(),
        }
    }

    // ------------------------------------------------------------------------
    // registration
    // ------------------------------------------------------------------------

    /// Maps `symbol` to the canonical `tag`.
    pub fn register_alias(&mut self, symbol: impl Into<String>, tag: impl Into<String>) {
        self.aliases.insert(symbol.into(), tag.into());
    }

    /// Registers an extension under `tag`. The last registration wins.
    pub fn register_extension(&mut self, tag: impl Into<String>, check: impl Check + 'static) {
        self.register_shared(tag, Arc::new(check));
    }

    /// Registers an already shared extension.
    pub fn register_shared(&mut self, tag: impl Into<String>, check: SharedCheck) {
        let tag = tag.into();
        if Builtin::from_tag(&tag).is_some() {
            warn!(tag = %tag, "extension shadows a built-in validator");
        }
        if self.extensions.insert(tag.clone(), check).is_some() {
            debug!(tag = %tag, "extension replaced");
        }
    }

    /// Registers an extension together with its default message.
    pub fn register_extension_with_message(
        &mut self,
        tag: impl Into<String>,
        check: impl Check + 'static,
        message: impl Into<Template>,
    ) {
        let tag = tag.into();
        self.type_messages.insert(tag.clone(), message.into());
        self.register_extension(tag, check);
    }

    /// Registers a named condition for `requireCallback`.
    pub fn register_condition<F>(&mut self, name: impl Into<String>, condition: F)
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.conditions.insert(name.into(), Arc::new(condition));
    }

    /// Sets the default message for `tag`.
    pub fn set_type_message(&mut self, tag: impl Into<String>, message: impl Into<Template>) {
        self.type_messages.insert(tag.into(), message.into());
    }

    // ------------------------------------------------------------------------
    // lookup
    // ------------------------------------------------------------------------

    /// Canonical tag for `tag`: the alias target, or the tag itself.
    #[must_use]
    pub fn canonical<'a>(&'a self, tag: &'a str) -> &'a str {
        self.aliases.get(tag).map_or(tag, String::as_str)
    }

    /// Returns true when `tag` names a built-in primitive or an extension.
    #[must_use]
    pub fn is_primitive(&self, tag: &str) -> bool {
        Builtin::from_tag(tag).is_some() || self.extensions.contains_key(tag)
    }

    /// Extension registered under `tag`.
    #[must_use]
    pub fn extension(&self, tag: &str) -> Option<&dyn Check> {
        self.extensions.get(tag).map(|check| check.as_ref())
    }

    /// Returns true when an extension is registered under `tag`.
    #[must_use]
    pub fn has_extension(&self, tag: &str) -> bool {
        self.extensions.contains_key(tag)
    }

    /// Resolves a tag: extensions first, then built-ins.
    #[must_use]
    pub fn resolve(&self, tag: &str) -> Option<Resolved<'_>> {
        if let Some(check) = self.extension(tag) {
            return Some(Resolved::Extension(check));
        }
        Builtin::from_tag(tag).map(Resolved::Builtin)
    }

    /// Condition registered under `name`.
    #[must_use]
    pub fn condition(&self, name: &str) -> Option<&Condition> {
        self.conditions.get(name)
    }

    /// Default message for `tag`.
    #[must_use]
    pub fn type_message(&self, tag: &str) -> Option<&Template> {
        self.type_messages.get(tag)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut extensions: Vec<_> = self.extensions.keys().collect();
        extensions.sort();
        let mut conditions: Vec<_> = self.conditions.keys().collect();
        conditions.sort();
        f.debug_struct("Registry")
            .field("aliases", &self.aliases)
            .field("extensions", &extensions)
            .field("conditions", &conditions)
            .field("type_messages", &self.type_messages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{CheckInput, Outcome};

    #[test]
    fn test_default_aliases() {
        let registry = Registry::new();
        assert_eq!(registry.canonical(">="), "egt");
        assert_eq!(registry.canonical("same"), "eq");
        assert_eq!(registry.canonical("max"), "max");
    }

    #[test]
    fn test_extension_wins_over_builtin() {
        let mut registry = Registry::new();
        assert!(matches!(registry.resolve("max"), Some(Resolved::Builtin(Builtin::Max))));
        registry.register_extension("max", |_: &CheckInput<'_>| Outcome::Pass);
        assert!(matches!(registry.resolve("max"), Some(Resolved::Extension(_))));
    }

    #[test]
    fn test_extension_message_registered() {
        let mut registry = Registry::new();
        registry.register_extension_with_message(
            "even",
            |_: &CheckInput<'_>| Outcome::Pass,
            ":attribute must be even",
        );
        assert!(registry.is_primitive("even"));
        assert_eq!(
            registry.type_message("even"),
            Some(&Template::from(":attribute must be even"))
        );
    }

    #[test]
    fn test_unknown_tag_is_not_primitive() {
        let registry = Registry::new();
        assert!(!registry.is_primitive("email"));
        assert!(registry.resolve("email").is_none());
    }
}
