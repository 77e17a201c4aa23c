//! Message templates and placeholder substitution
//!
//! Placeholders: `:attribute` is the field title, `:1` `:2` `:3` are the
//! first three comma-separated parameter parts, `:rule` is the whole scalar
//! parameter.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::foundation::{Message, Param};

/// An unrendered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Template {
    /// Text with placeholders, or a `{%key}` catalog reference.
    Text(String),
    /// Structured template; each value is rendered independently.
    ///
    /// As a per-field override, a map keyed by rule tag selects the message
    /// for that tag.
    Map(IndexMap<String, String>),
}

impl Template {
    /// Entry of a map template.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Self::Map(map) => map.get(key).map(String::as_str),
            Self::Text(_) => None,
        }
    }
}

impl From<&str> for Template {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Template {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Template {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Catalog key of a `{%key}` reference.
#[must_use]
pub fn catalog_key(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("{%")?;
    Some(inner.strip_suffix('}').unwrap_or(inner))
}

/// Fills the placeholders of a rule message.
#[must_use]
pub fn substitute(text: &str, title: &str, param: &Param) -> String {
    if !text.contains(':') {
        return text.to_owned();
    }
    let parts = if param.is_listy() { param.parts() } else { Default::default() };
    let part = |i: usize| parts.get(i).copied().unwrap_or("");

    let mut out = text
        .replace(":attribute", title)
        .replace(":1", part(0))
        .replace(":2", part(1))
        .replace(":3", part(2));
    if param.is_scalar() && out.contains(":rule") {
        out = out.replace(":rule", &param.as_text());
    }
    out
}

/// Fills `:attribute` and `:rule` in a message returned by a check.
#[must_use]
pub fn substitute_soft(message: Message, title: &str, param: &Param) -> Message {
    let fill = |text: String| {
        if !text.contains(':') {
            return text;
        }
        let mut out = text.replace(":attribute", title);
        if param.is_scalar() {
            out = out.replace(":rule", &param.as_text());
        }
        out
    };
    match message {
        Message::Text(text) => Message::Text(fill(text)),
        Message::Map(map) => Message::Map(map.into_iter().map(|(k, v)| (k, fill(v))).collect()),
    }
}
