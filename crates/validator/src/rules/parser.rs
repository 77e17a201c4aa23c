//! Turns raw entries into executable steps

use crate::foundation::{Param, RuleFn};
use crate::registry::Registry;

use super::entry::RuleEntry;

/// Tag of the generic format check (`email`, `alpha`, custom patterns).
pub const FORMAT_TAG: &str = "is";

/// A parsed rule step.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleStep {
    /// A tagged check.
    Check {
        /// Canonical tag used for dispatch.
        tag: String,
        /// Name used for message lookup and scene removal.
        name: String,
        /// Parameter.
        param: Param,
    },
    /// A closure step.
    Closure {
        /// Optional name.
        name: Option<String>,
        /// The closure.
        f: RuleFn,
    },
}

impl RuleStep {
    /// Step name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Check { name, .. } => Some(name),
            Self::Closure { name, .. } => name.as_deref(),
        }
    }
}

/// Rule parser bound to a registry's alias and primitive tables.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'r> {
    registry: &'r Registry,
}

impl<'r> Parser<'r> {
    /// Creates a parser.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Parses one entry.
    ///
    /// - `tag => param` keeps the tag (after alias resolution).
    /// - `"tag:param"` splits on the first colon.
    /// - A bare primitive name runs with an empty parameter.
    /// - Anything else is a format check named after the text.
    #[must_use]
    pub fn parse(&self, entry: &RuleEntry) -> RuleStep {
        match entry {
            RuleEntry::Closure(name, f) => RuleStep::Closure {
                name: name.clone(),
                f: f.clone(),
            },
            RuleEntry::Keyed(tag, param) => {
                let tag = self.registry.canonical(tag).to_owned();
                RuleStep::Check {
                    name: tag.clone(),
                    tag,
                    param: param.clone(),
                }
            }
            RuleEntry::Positional(text) => self.parse_text(text.trim()),
        }
    }

    fn parse_text(&self, text: &str) -> RuleStep {
        if let Some(at) = text.find(':').filter(|at| *at > 0) {
            let tag = self.registry.canonical(&text[..at]).to_owned();
            return RuleStep::Check {
                name: tag.clone(),
                tag,
                param: Param::Text(text[at + 1..].to_owned()),
            };
        }
        let canonical = self.registry.canonical(text);
        if self.registry.is_primitive(canonical) {
            return RuleStep::Check {
                tag: canonical.to_owned(),
                name: canonical.to_owned(),
                param: Param::Empty,
            };
        }
        RuleStep::Check {
            tag: FORMAT_TAG.to_owned(),
            name: text.to_owned(),
            param: Param::Text(text.to_owned()),
        }
    }

    /// Name an entry would parse to, without building the step.
    #[must_use]
    pub fn name_of(&self, entry: &RuleEntry) -> Option<String> {
        self.parse(entry).name().map(str::to_owned)
    }
}
