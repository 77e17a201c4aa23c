//! Unparsed rule entries and per-field rule shapes

use std::fmt;

use serde_json::Value;

use crate::foundation::{Outcome, Param, RuleFn};

// ============================================================================
// RULE ENTRY
// ============================================================================

/// One step of a rule chain as written by the caller.
#[derive(Clone, PartialEq)]
pub enum RuleEntry {
    /// Positional text: `"require"`, `"max:25"`, `"email"`.
    Positional(String),
    /// Keyed entry: `max => 25`.
    Keyed(String, Param),
    /// Closure step, optionally named so scenes can address it.
    Closure(Option<String>, RuleFn),
}

impl RuleEntry {
    /// Keyed entry.
    pub fn keyed(tag: impl Into<String>, param: impl Into<Param>) -> Self {
        Self::Keyed(tag.into(), param.into())
    }

    /// Anonymous closure step.
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Outcome + Send + Sync + 'static,
    {
        Self::Closure(None, RuleFn::new(f))
    }

    /// Named closure step.
    pub fn named_closure<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Outcome + Send + Sync + 'static,
    {
        Self::Closure(Some(name.into()), RuleFn::new(f))
    }

    /// Empty positional text, dropped before evaluation.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Positional(text) if text.trim().is_empty())
    }

    /// Splits a pipe chain (`"require|max:25"`) into positional entries.
    #[must_use]
    pub fn split_chain(chain: &str) -> Vec<Self> {
        chain
            .split('|')
            .filter(|part| !part.is_empty())
            .map(|part| Self::Positional(part.to_owned()))
            .collect()
    }
}

impl fmt::Debug for RuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positional(text) => write!(f, "{text:?}"),
            Self::Keyed(tag, param) => write!(f, "{tag}:{param}"),
            Self::Closure(Some(name), _) => write!(f, "{name}(closure)"),
            Self::Closure(None, _) => f.write_str("(closure)"),
        }
    }
}

impl From<&str> for RuleEntry {
    fn from(text: &str) -> Self {
        Self::Positional(text.to_owned())
    }
}

impl From<String> for RuleEntry {
    fn from(text: String) -> Self {
        Self::Positional(text)
    }
}

impl<P: Into<Param>> From<(&str, P)> for RuleEntry {
    fn from((tag, param): (&str, P)) -> Self {
        Self::keyed(tag, param)
    }
}

// ============================================================================
// DESCRIBED RULES
// ============================================================================

/// A rule chain carrying its own title and per-step messages.
///
/// # Examples
///
/// ```rust,ignore
/// let rules = Rules::new()
///     .rule("require").message("please tell us your age")
///     .keyed("between", "18,120")
///     .title("Age");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rules {
    entries: Vec<RuleEntry>,
    messages: Vec<Option<String>>,
    title: Option<String>,
}

impl Rules {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, entry: RuleEntry) -> Self {
        self.entries.push(entry);
        self.messages.push(None);
        self
    }

    /// Appends positional steps; a pipe chain adds several.
    #[must_use = "builder methods must be chained or built"]
    pub fn rule(self, chain: &str) -> Self {
        RuleEntry::split_chain(chain)
            .into_iter()
            .fold(self, Self::push)
    }

    /// Appends one step.
    #[must_use = "builder methods must be chained or built"]
    pub fn entry(self, entry: impl Into<RuleEntry>) -> Self {
        self.push(entry.into())
    }

    /// Appends a keyed step.
    #[must_use = "builder methods must be chained or built"]
    pub fn keyed(self, tag: impl Into<String>, param: impl Into<Param>) -> Self {
        self.push(RuleEntry::keyed(tag, param))
    }

    /// Appends a named closure step.
    #[must_use = "builder methods must be chained or built"]
    pub fn closure<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Outcome + Send + Sync + 'static,
    {
        self.push(RuleEntry::named_closure(name, f))
    }

    /// Sets the message for the most recently added step.
    #[must_use = "builder methods must be chained or built"]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(slot) = self.messages.last_mut() {
            *slot = Some(message.into());
        }
        self
    }

    /// Sets the field title.
    #[must_use = "builder methods must be chained or built"]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The steps in order.
    #[must_use]
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// Message bound to step `index`.
    #[must_use]
    pub fn message_at(&self, index: usize) -> Option<&str> {
        self.messages.get(index).and_then(Option::as_deref)
    }

    /// Title override.
    #[must_use]
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

// ============================================================================
// FIELD RULE
// ============================================================================

/// Everything a rule table can hold for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Ordered chain of steps.
    Chain(Vec<RuleEntry>),
    /// A single closure called with `(value, data)`.
    Closure(RuleFn),
    /// A chain with its own title and per-step messages.
    Described(Rules),
    /// Rules applied to every record of a list-of-records field.
    Nested(super::RuleTable),
}

impl FieldRule {
    /// Closure rule.
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Outcome + Send + Sync + 'static,
    {
        Self::Closure(RuleFn::new(f))
    }

    /// `true` when the rule has no step to run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Chain(entries) => entries.iter().all(RuleEntry::is_blank),
            Self::Described(rules) => rules.entries().iter().all(RuleEntry::is_blank),
            Self::Nested(table) => table.is_empty(),
            Self::Closure(_) => false,
        }
    }
}

impl Default for FieldRule {
    fn default() -> Self {
        Self::Chain(Vec::new())
    }
}

impl From<&str> for FieldRule {
    fn from(chain: &str) -> Self {
        Self::Chain(RuleEntry::split_chain(chain))
    }
}

impl From<String> for FieldRule {
    fn from(chain: String) -> Self {
        Self::from(chain.as_str())
    }
}

impl From<Vec<RuleEntry>> for FieldRule {
    fn from(entries: Vec<RuleEntry>) -> Self {
        Self::Chain(entries)
    }
}

impl<const N: usize> From<[RuleEntry; N]> for FieldRule {
    fn from(entries: [RuleEntry; N]) -> Self {
        Self::Chain(entries.into())
    }
}

impl From<Rules> for FieldRule {
    fn from(rules: Rules) -> Self {
        Self::Described(rules)
    }
}

impl From<super::RuleTable> for FieldRule {
    fn from(table: super::RuleTable) -> Self {
        Self::Nested(table)
    }
}

impl From<RuleFn> for FieldRule {
    fn from(f: RuleFn) -> Self {
        Self::Closure(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_chain() {
        let entries = RuleEntry::split_chain("require|max:25|");
        assert_eq!(
            entries,
            vec![RuleEntry::from("require"), RuleEntry::from("max:25")]
        );
    }

    #[test]
    fn test_described_rules_bind_messages_to_steps() {
        let rules = Rules::new()
            .rule("require")
            .message("tell us")
            .keyed("max", 5)
            .title("Name");
        assert_eq!(rules.entries().len(), 2);
        assert_eq!(rules.message_at(0), Some("tell us"));
        assert_eq!(rules.message_at(1), None);
        assert_eq!(rules.title_text(), Some("Name"));
    }

    #[test]
    fn test_empty_rule() {
        assert!(FieldRule::from("").is_empty());
        assert!(!FieldRule::from("require").is_empty());
        assert!(!FieldRule::closure(|_, _| Outcome::Pass).is_empty());
    }
}
