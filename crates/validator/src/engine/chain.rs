//! One field's rule chain

use serde_json::Value;
use tracing::trace;

use crate::foundation::{
    CheckInput, CollaboratorError, FieldError, Message, Outcome, Param, ValidationContext,
    ValidationError, is_absent,
};
use crate::messages::substitute_soft;
use crate::rules::{FieldRule, Parser, RuleEntry, RuleStep, Rules};
use crate::validators::dispatch;
use crate::validators::require::runs_on_absent;

use super::Engine;

impl Engine<'_> {
    /// Runs `entries` for `field` in order and returns the first failure.
    ///
    /// Steps appended by the scene run after the field's own steps; removed
    /// steps are skipped unless the scene appends them back. A step other
    /// than `must`, `require*` or an extension passes vacuously when the
    /// value is absent.
    pub(super) fn check_chain(
        &self,
        field: &str,
        value: &Value,
        entries: &[RuleEntry],
        described: Option<&Rules>,
        title: &str,
        ctx: &ValidationContext<'_>,
    ) -> Result<Option<FieldError>, CollaboratorError> {
        let delta = ctx.delta();
        if delta.is_removed_entirely(field) {
            return Ok(None);
        }

        let parser = Parser::new(self.env.registry);
        let appended = delta.appended(field);
        let appended_names: Vec<String> =
            appended.iter().filter_map(|e| parser.name_of(e)).collect();

        let mut steps: Vec<&RuleEntry> = entries.iter().collect();
        for extra in appended {
            if !steps.contains(&extra) {
                steps.push(extra);
            }
        }

        let empty = Param::Empty;
        for (index, entry) in steps.into_iter().enumerate() {
            if entry.is_blank() {
                continue;
            }
            let step = parser.parse(entry);
            let (name, param, outcome) = match &step {
                RuleStep::Closure { name, f } => {
                    (name.as_deref().unwrap_or(""), &empty, f.call(value, ctx.data()))
                }
                RuleStep::Check { tag, name, param } => {
                    if delta.removes(field, name) && !appended_names.contains(name) {
                        trace!(field, rule = %name, "step removed by scene");
                        continue;
                    }
                    let required = runs_on_absent(name) || self.env.registry.has_extension(tag);
                    if !required && is_absent(value) {
                        trace!(field, rule = %name, "absent value, step skipped");
                        continue;
                    }
                    let input = CheckInput {
                        value,
                        param,
                        data: ctx.data(),
                        field,
                        title,
                    };
                    (name.as_str(), param, dispatch(tag, &input, &self.env)?)
                }
            };
            trace!(field, rule = name, passed = outcome.is_pass(), "rule step");

            let message = match outcome {
                Outcome::Pass => continue,
                Outcome::Fail => self.step_message(field, title, name, param, described, index)?,
                Outcome::Message(message) => substitute_soft(message, title, param),
            };
            let error = FieldError::new(field, message);
            return Ok(Some(if name.is_empty() {
                error
            } else {
                error.with_rule(name)
            }));
        }
        Ok(None)
    }

    /// Runs a rule against a bare value: no record, no scene, absent values
    /// are not skipped. Returns the first non-passing outcome.
    pub(crate) fn check_standalone(
        &self,
        value: &Value,
        rule: &FieldRule,
    ) -> Result<Outcome, ValidationError> {
        static NULL: Value = Value::Null;
        let entries = match rule {
            FieldRule::Closure(f) => return Ok(f.call(value, &NULL)),
            FieldRule::Nested(table) => {
                let ctx = ValidationContext::builder(&NULL).build();
                return Ok(self
                    .check_nested("", value, table, "", &ctx)?
                    .map_or(Outcome::Pass, |error| Outcome::Message(error.message)));
            }
            FieldRule::Chain(entries) => entries.as_slice(),
            FieldRule::Described(rules) => rules.entries(),
        };

        let parser = Parser::new(self.env.registry);
        for entry in entries.iter().filter(|e| !e.is_blank()) {
            let outcome = match parser.parse(entry) {
                RuleStep::Closure { f, .. } => f.call(value, &NULL),
                RuleStep::Check { tag, param, .. } => {
                    dispatch(&tag, &CheckInput::standalone(value, &param), &self.env)?
                }
            };
            if !outcome.is_pass() {
                return Ok(outcome);
            }
        }
        Ok(Outcome::Pass)
    }

    /// Message for a failed step: the step's own message, else the catalog.
    fn step_message(
        &self,
        field: &str,
        title: &str,
        name: &str,
        param: &Param,
        described: Option<&Rules>,
        index: usize,
    ) -> Result<Message, CollaboratorError> {
        let catalog = self.catalog();
        match described.and_then(|rules| rules.message_at(index)) {
            Some(text) => catalog.render_text(text, title, param),
            None => catalog.render(field, title, name, param),
        }
    }
}
