//! Rule-table walk

use std::borrow::Cow;

use tracing::trace;

use crate::foundation::{
    FieldError, FieldErrors, Outcome, Param, ValidationContext, ValidationError, Verdict, lookup,
};
use crate::messages::substitute_soft;
use crate::rules::{FieldRule, RuleTable, TableEntry, split_key};

use super::Engine;

impl Engine<'_> {
    /// Evaluates `table` against the context's data.
    ///
    /// Fail-fast mode returns the first failure; batch mode keeps going and
    /// returns one failure per field. Under the raising policy failures come
    /// back as `Err`.
    pub(crate) fn evaluate(
        &self,
        table: &RuleTable,
        ctx: &ValidationContext<'_>,
    ) -> Result<Verdict, ValidationError> {
        let table = self.with_appended_fields(table, ctx);
        let mut errors = FieldErrors::new();

        for entry in table.entries() {
            let (key, rule) = match entry {
                TableEntry::Field { key, rule } => (key.as_str(), rule),
                TableEntry::Name(name) => match self.base.find(name) {
                    Some(found) => found,
                    None => {
                        trace!(field = %name, "positional field has no base rule");
                        continue;
                    }
                },
            };
            if rule.is_empty() {
                continue;
            }

            let (field, inline_title) = split_key(key);
            if !ctx.delta().allows(field) {
                continue;
            }
            let title = self.title(field, inline_title, ctx.prefix());
            let value = lookup(ctx.data(), field);

            let failure = match rule {
                FieldRule::Closure(f) => {
                    self.closure_failure(field, &title, f.call(value, ctx.data()))?
                }
                FieldRule::Chain(entries) => {
                    self.check_chain(field, value, entries, None, &title, ctx)?
                }
                FieldRule::Described(rules) => {
                    let title = rules.title_text().unwrap_or(&*title);
                    self.check_chain(field, value, rules.entries(), Some(rules), title, ctx)?
                }
                FieldRule::Nested(items) => self.check_nested(field, value, items, &title, ctx)?,
            };

            let Some(error) = failure else {
                continue;
            };
            if ctx.is_batch() {
                errors.add(error);
            } else if ctx.fails_with_exception() {
                return Err(ValidationError::Field(error));
            } else {
                return Ok(Verdict::Single(error));
            }
        }

        if errors.is_empty() {
            Ok(Verdict::Valid)
        } else if ctx.fails_with_exception() {
            Err(ValidationError::Fields(errors))
        } else {
            Ok(Verdict::Batch(errors))
        }
    }

    /// Adds fields that only appear in the scene's append list.
    fn with_appended_fields<'t>(
        &self,
        table: &'t RuleTable,
        ctx: &ValidationContext<'_>,
    ) -> Cow<'t, RuleTable> {
        let mut table = Cow::Borrowed(table);
        for field in ctx.delta().appended_fields() {
            if !table.contains(field) {
                let entries = ctx.delta().appended(field).to_vec();
                table.to_mut().insert(field, FieldRule::Chain(entries));
            }
        }
        table
    }

    /// Display title: inline `field|Title`, then `titles["prefix.field"]`,
    /// then `titles["field"]`, then the dotted path.
    fn title<'a>(&'a self, field: &'a str, inline: Option<&'a str>, prefix: &str) -> Cow<'a, str> {
        if let Some(title) = inline {
            return Cow::Borrowed(title);
        }
        if !prefix.is_empty()
            && let Some(title) = self.titles.get(&format!("{prefix}.{field}"))
        {
            return Cow::Borrowed(title);
        }
        if let Some(title) = self.titles.get(field) {
            return Cow::Borrowed(title);
        }
        if prefix.is_empty() {
            Cow::Borrowed(field)
        } else {
            Cow::Owned(format!("{prefix}.{field}"))
        }
    }

    /// Failure produced by a whole-field closure.
    fn closure_failure(
        &self,
        field: &str,
        title: &str,
        outcome: Outcome,
    ) -> Result<Option<FieldError>, ValidationError> {
        let empty = Param::Empty;
        let message = match outcome {
            Outcome::Pass => return Ok(None),
            Outcome::Fail => self.catalog().render(field, title, "", &empty)?,
            Outcome::Message(message) => substitute_soft(message, title, &empty),
        };
        Ok(Some(FieldError::new(field, message)))
    }
}
