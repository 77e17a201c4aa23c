//! Value normalization and data-path lookup
//!
//! Input data arrives as a decoded [`serde_json::Value`]. Checks never
//! compare raw JSON values with ad-hoc coercion; they normalize both sides to
//! a [`Scalar`] first and compare per variant pair.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value;

static NULL: Value = Value::Null;

// ============================================================================
// SCALAR
// ============================================================================

/// A comparison-ready view of a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar<'a> {
    /// Missing or `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Any finite number.
    Number(f64),
    /// Text, borrowed from the data or owned when synthesized.
    Text(Cow<'a, str>),
    /// Arrays and objects. Never equal to anything but themselves.
    Compound(&'a Value),
}

impl<'a> Scalar<'a> {
    /// Normalizes a JSON value.
    #[must_use]
    pub fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(Cow::Borrowed(s)),
            Value::Array(_) | Value::Object(_) => Self::Compound(value),
        }
    }

    /// Wraps literal text.
    #[must_use]
    pub fn text(text: impl Into<Cow<'a, str>>) -> Self {
        Self::Text(text.into())
    }

    /// Numeric view: numbers and numeric-looking text.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Text view used by membership tests, patterns and character classes.
    ///
    /// Booleans render as `"1"` / `"0"`, `null` as the empty string.
    #[must_use]
    pub fn as_text(&self) -> Option<Cow<'a, str>> {
        match self {
            Self::Null => Some(Cow::Borrowed("")),
            Self::Bool(true) => Some(Cow::Borrowed("1")),
            Self::Bool(false) => Some(Cow::Borrowed("0")),
            Self::Number(n) => Some(Cow::Owned(render_number(*n))),
            Self::Text(s) => Some(s.clone()),
            Self::Compound(_) => None,
        }
    }

    /// Truthiness of a boolean operand compared loosely against this value.
    fn truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => !s.is_empty() && s != "0",
            Self::Compound(v) => !is_blank(v),
        }
    }

    /// Ordering between two scalars.
    ///
    /// Numeric when both sides have a numeric view, lexical when both are
    /// text, otherwise undefined.
    #[must_use]
    pub fn compare(&self, other: &Scalar<'_>) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.partial_cmp(&b);
        }
        match (self, other) {
            (Self::Text(a), Scalar::Text(b)) => Some(a.as_ref().cmp(b.as_ref())),
            _ => None,
        }
    }

    /// Loose equality: `1 == "1"`, `true == "yes"`, `null == null`.
    #[must_use]
    pub fn loose_eq(&self, other: &Scalar<'_>) -> bool {
        match (self, other) {
            (Self::Null, Scalar::Null) => true,
            (Self::Bool(a), b) => *a == b.truthy(),
            (a, Scalar::Bool(b)) => a.truthy() == *b,
            (Self::Compound(a), Scalar::Compound(b)) => a == b,
            (Self::Compound(_), _) | (_, Scalar::Compound(_)) => false,
            (Self::Null, Scalar::Text(s)) => s.is_empty(),
            (Self::Text(s), Scalar::Null) => s.is_empty(),
            (Self::Null, b) => !b.truthy(),
            (a, Scalar::Null) => !a.truthy(),
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x == y,
                _ => a.as_text() == b.as_text(),
            },
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Parses numeric text the way form input is usually interpreted.
///
/// Accepts surrounding whitespace, a sign, a fraction and an exponent.
/// Rejects `inf`, `nan` and anything without a digit.
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if trimmed.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Renders a number without a trailing `.0` for integral values.
#[must_use]
pub fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// `null` or the empty string. Optional checks skip these values.
#[must_use]
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// What a `require` check rejects: absent values and empty collections.
///
/// `0`, `false` and `"0"` are present.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        other => is_absent(other),
    }
}

/// Broad emptiness used by conditional requirements: blank values plus
/// `0`, `false` and `"0"`.
#[must_use]
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        other => is_blank(other),
    }
}

/// Reads a possibly dotted path (`user.name`, `items.0.qty`) from `data`.
///
/// Missing segments resolve to `null`.
#[must_use]
pub fn lookup<'a>(data: &'a Value, path: &str) -> &'a Value {
    if let Some(direct) = data.as_object().and_then(|map| map.get(path)) {
        return direct;
    }
    let mut current = data;
    for segment in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return &NULL,
        }
    }
    current
}

/// Resolves a comparison operand written in a rule parameter.
///
/// A numeric parameter is a literal. Otherwise it names another field when
/// that field holds a value, and falls back to the literal text.
#[must_use]
pub fn operand<'a>(data: &'a Value, param: &'a str) -> Scalar<'a> {
    if parse_number(param).is_some() {
        return Scalar::text(param);
    }
    match lookup(data, param) {
        Value::Null => Scalar::text(param),
        other => Scalar::from_value(other),
    }
}
