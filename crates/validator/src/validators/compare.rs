//! Comparison validators: ordering, equality, membership and ranges

use std::cmp::Ordering;

use serde_json::Value;

use crate::foundation::{CheckInput, Scalar, lookup, operand};

use super::date;

// ============================================================================
// ORDERING
// ============================================================================

fn ordering(input: &CheckInput<'_>) -> Option<Ordering> {
    let param = input.param.as_text();
    let other = operand(input.data, &param);
    Scalar::from_value(input.value).compare(&other)
}

/// `gt`: strictly greater than a literal or another field.
pub fn gt(input: &CheckInput<'_>) -> bool {
    ordering(input) == Some(Ordering::Greater)
}

/// `egt`: greater than or equal.
pub fn egt(input: &CheckInput<'_>) -> bool {
    matches!(ordering(input), Some(Ordering::Greater | Ordering::Equal))
}

/// `lt`: strictly less than.
pub fn lt(input: &CheckInput<'_>) -> bool {
    ordering(input) == Some(Ordering::Less)
}

/// `elt`: less than or equal.
pub fn elt(input: &CheckInput<'_>) -> bool {
    matches!(ordering(input), Some(Ordering::Less | Ordering::Equal))
}

// ============================================================================
// EQUALITY
// ============================================================================

/// `eq`: loosely equal to a literal or another field.
pub fn eq(input: &CheckInput<'_>) -> bool {
    let param = input.param.as_text();
    Scalar::from_value(input.value).loose_eq(&operand(input.data, &param))
}

/// `different`: loosely different from another field.
pub fn different(input: &CheckInput<'_>) -> bool {
    !eq(input)
}

/// Field a `confirm` rule compares against when no parameter is given:
/// `password_confirm` pairs with `password` and the other way round.
#[must_use]
pub fn confirm_target(field: &str) -> String {
    match field.find("_confirm") {
        Some(at) if at > 0 => field[..at].to_owned(),
        _ => format!("{field}_confirm"),
    }
}

/// `confirm` / `confirmed`: strictly equal to the paired field.
pub fn confirm(input: &CheckInput<'_>) -> bool {
    let target = match input.param.part(0) {
        Some(name) => name.to_owned(),
        None => confirm_target(input.field),
    };
    lookup(input.data, &target) == input.value
}

// ============================================================================
// MEMBERSHIP
// ============================================================================

/// Loose membership of `value` in comma-separated `items`.
pub fn contains<'p>(value: &Value, items: impl IntoIterator<Item = &'p str>) -> bool {
    if value.is_array() || value.is_object() {
        return false;
    }
    let scalar = Scalar::from_value(value);
    items
        .into_iter()
        .any(|item| scalar.loose_eq(&Scalar::text(item)))
}

/// `in`.
pub fn in_list(input: &CheckInput<'_>) -> bool {
    contains(input.value, input.param.parts())
}

/// `notIn`.
pub fn not_in_list(input: &CheckInput<'_>) -> bool {
    !in_list(input)
}

// ============================================================================
// RANGES
// ============================================================================

/// Orders a value against a bound: numerically, then as dates, then as
/// text.
fn order_against(value: &Value, bound: &str) -> Option<Ordering> {
    let scalar = Scalar::from_value(value);
    let bound_scalar = Scalar::text(bound);
    if let (Some(a), Some(b)) = (scalar.as_number(), bound_scalar.as_number()) {
        return a.partial_cmp(&b);
    }
    let text = scalar.as_text()?;
    if let (Some(a), Some(b)) = (date::parse(&text), date::parse(bound)) {
        return Some(a.cmp(&b));
    }
    Some(text.as_ref().cmp(bound))
}

fn bounds<'a>(input: &'a CheckInput<'_>) -> Option<(&'a str, &'a str)> {
    let parts = input.param.parts();
    match parts.as_slice() {
        [min, max, ..] => Some((*min, *max)),
        _ => None,
    }
}

/// `between:min,max`, inclusive.
pub fn between(input: &CheckInput<'_>) -> bool {
    let Some((min, max)) = bounds(input) else {
        return false;
    };
    let lower = order_against(input.value, min);
    let upper = order_against(input.value, max);
    matches!(lower, Some(Ordering::Greater | Ordering::Equal))
        && matches!(upper, Some(Ordering::Less | Ordering::Equal))
}

/// `notBetween:min,max`: below min or above max.
pub fn not_between(input: &CheckInput<'_>) -> bool {
    let Some((min, max)) = bounds(input) else {
        return false;
    };
    order_against(input.value, min) == Some(Ordering::Less)
        || order_against(input.value, max) == Some(Ordering::Greater)
}
