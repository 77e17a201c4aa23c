//! Rule parameters
//!
//! Everything after the colon in `between:1,10`, or the value of a keyed
//! entry such as `max => 25`.

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;
use smallvec::SmallVec;

use super::value::render_number;

/// Parameter attached to a rule step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Param {
    /// No parameter (`require`, `email`).
    #[default]
    Empty,
    /// Scalar text. Comma-separated text doubles as a list.
    Text(String),
    /// Explicit list, e.g. `in => ["a", "b"]`.
    List(Vec<String>),
}

impl Param {
    /// `true` when there is nothing to read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    /// `true` for scalar (non-list) parameters.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_))
    }

    /// The parameter as one string; lists are joined with commas.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Text(text) => Cow::Borrowed(text),
            Self::List(items) => Cow::Owned(items.join(",")),
        }
    }

    /// Comma-split parts (`"1,10"` → `["1", "10"]`).
    #[must_use]
    pub fn parts(&self) -> SmallVec<[&str; 4]> {
        match self {
            Self::Empty => SmallVec::new(),
            Self::Text(text) => text.split(',').collect(),
            Self::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Part `index`, if present and non-empty.
    #[must_use]
    pub fn part(&self, index: usize) -> Option<&str> {
        self.parts().get(index).copied().filter(|p| !p.is_empty())
    }

    /// `true` when the parameter carries more than one part.
    #[must_use]
    pub fn is_listy(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Text(text) => text.find(',').is_some_and(|at| at > 0),
            Self::List(_) => true,
        }
    }

    /// Converts a JSON parameter from a rule document.
    ///
    /// Scalars become text, arrays become lists of rendered scalars and
    /// `null` is empty. Objects are kept as their JSON text.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Array(items) => Self::List(items.iter().map(scalar_text).collect()),
            other => Self::Text(scalar_text(other)),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_owned(),
        Value::Bool(false) => "0".to_owned(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), render_number),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Param {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Param {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for Param {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<bool> for Param {
    fn from(flag: bool) -> Self {
        Self::Text(if flag { "1" } else { "0" }.to_owned())
    }
}

macro_rules! param_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Param {
                fn from(n: $ty) -> Self {
                    Self::Text(n.to_string())
                }
            }
        )*
    };
}

param_from_number!(i32, i64, u32, u64, usize, f64);

impl From<Vec<String>> for Param {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for Param {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Param {
    fn from(items: [&str; N]) -> Self {
        Self::List(items.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl From<&Value> for Param {
    fn from(value: &Value) -> Self {
        Self::from_json(value)
    }
}
