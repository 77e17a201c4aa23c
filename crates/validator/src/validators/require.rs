//! Requirement validators
//!
//! `must` and the conditional `require*` family. These run even when the
//! value is absent; everything else skips absent values.

use tracing::warn;

use crate::foundation::{CheckInput, Scalar, is_blank, is_empty, lookup};
use crate::registry::Registry;

/// Returns true for step names that must run on absent values.
#[must_use]
pub fn runs_on_absent(name: &str) -> bool {
    name == "must" || name.starts_with("require")
}

/// `must` / `require`: present and non-empty. `0`, `false` and `"0"` count
/// as present.
pub fn must(input: &CheckInput<'_>) -> bool {
    !is_blank(input.value)
}

/// `requireIf:field,value`: required when `field` loosely equals `value`.
pub fn require_if(input: &CheckInput<'_>) -> bool {
    let (Some(field), expected) = (input.param.part(0), input.param.parts().get(1).copied())
    else {
        return true;
    };
    let other = Scalar::from_value(lookup(input.data, field));
    if other.loose_eq(&Scalar::text(expected.unwrap_or(""))) {
        must(input)
    } else {
        true
    }
}

/// `requireWith:field`: required when `field` is non-empty.
pub fn require_with(input: &CheckInput<'_>) -> bool {
    let other = lookup(input.data, &input.param.as_text());
    if is_empty(other) { true } else { must(input) }
}

/// `requireWithout:field`: required when `field` is empty.
pub fn require_without(input: &CheckInput<'_>) -> bool {
    let other = lookup(input.data, &input.param.as_text());
    if is_empty(other) { must(input) } else { true }
}

/// `requireCallback:name`: required when the named condition holds.
///
/// An unknown condition fails the step.
pub fn require_callback(input: &CheckInput<'_>, registry: &Registry) -> bool {
    let name = input.param.as_text();
    let Some(condition) = registry.condition(&name) else {
        warn!(condition = %name, field = input.field, "requireCallback names an unknown condition");
        return false;
    };
    if condition(input.value, input.data) {
        must(input)
    } else {
        true
    }
}
