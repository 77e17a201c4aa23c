//! List-of-records fields

use serde_json::Value;

use crate::foundation::{FieldError, Param, ValidationContext, ValidationError, Verdict};
use crate::messages::NESTED_TAG;
use crate::rules::RuleTable;

use super::Engine;

impl Engine<'_> {
    /// Runs the item table against every record of `field`.
    ///
    /// The value must be a list of records. Each record is evaluated
    /// fail-fast; the first failing record fails the field and the error
    /// carries its location as `field.index.inner`.
    pub(super) fn check_nested(
        &self,
        field: &str,
        value: &Value,
        table: &RuleTable,
        title: &str,
        ctx: &ValidationContext<'_>,
    ) -> Result<Option<FieldError>, ValidationError> {
        let records = match value {
            Value::Array(items) if items.iter().all(Value::is_object) => items,
            _ => {
                let message = self.catalog().render(field, title, NESTED_TAG, &Param::Empty)?;
                return Ok(Some(FieldError::new(field, message).with_rule(NESTED_TAG)));
            }
        };

        let item_table = table.item_table();
        for (index, record) in records.iter().enumerate() {
            let item_ctx = ctx.nested(record, field);
            let Some(inner) = first_failure(self.evaluate(&item_table, &item_ctx)?) else {
                continue;
            };
            let inner_path = inner.path.as_deref().unwrap_or(&inner.field);
            let path = format!("{field}.{index}.{inner_path}");
            return Ok(Some(FieldError {
                field: field.to_owned(),
                path: Some(path),
                ..inner
            }));
        }
        Ok(None)
    }
}

fn first_failure(verdict: Verdict) -> Option<FieldError> {
    match verdict {
        Verdict::Valid => None,
        Verdict::Single(error) => Some(error),
        Verdict::Batch(errors) => errors.into_iter().next(),
    }
}
