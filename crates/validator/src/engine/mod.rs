//! Rule evaluation
//!
//! [`Engine`] is a borrowed view over a validator's read-only configuration.
//! It walks a rule table against one [`ValidationContext`](crate::foundation::ValidationContext):
//!
//! - [`evaluator`]: table walk, titles, batch and fail-fast policy
//! - [`chain`]: one field's ordered steps, scene deltas, message rendering
//! - [`nested`]: list-of-records fields

mod chain;
mod evaluator;
mod nested;

use indexmap::IndexMap;

use crate::messages::{MessageCatalog, Template};
use crate::rules::RuleTable;
use crate::validators::Env;

/// Borrowed configuration for one evaluation.
#[derive(Clone, Copy)]
pub(crate) struct Engine<'v> {
    /// Table that positional field names resolve against.
    pub base: &'v RuleTable,
    /// Caller message overrides.
    pub messages: &'v IndexMap<String, Template>,
    /// Field display titles.
    pub titles: &'v IndexMap<String, String>,
    /// Registry, patterns and collaborators.
    pub env: Env<'v>,
}

impl<'v> Engine<'v> {
    fn catalog(&self) -> MessageCatalog<'v> {
        MessageCatalog::new(
            self.messages,
            self.env.registry,
            self.env.collaborators.catalog(),
        )
    }
}
