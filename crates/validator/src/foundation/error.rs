//! Error types for validation failures
//!
//! A rejected field produces a [`FieldError`] carrying the rendered message.
//! Batch mode gathers them into [`FieldErrors`], keyed by field in rule
//! order. [`ValidationError`] is what the raising entry points return.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// MESSAGE
// ============================================================================

/// A rendered failure message.
///
/// Usually text; a message template may also be a structured map (for
/// example a code plus a text) and keeps that shape after rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Message {
    /// Plain text.
    Text(String),
    /// Structured message, every value rendered.
    Map(IndexMap<String, String>),
}

impl Message {
    /// Text form, if this is a plain message.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Map(_) => None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Map(map) => {
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl PartialEq<str> for Message {
    fn eq(&self, other: &str) -> bool {
        self.as_text() == Some(other)
    }
}

impl PartialEq<&str> for Message {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

// ============================================================================
// FIELD ERROR
// ============================================================================

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as written in the rule table.
    pub field: String,

    /// Rendered message.
    pub message: Message,

    /// Name of the failing rule step, when one is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,

    /// Location inside nested data (`items.1.qty`) for item-level failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl FieldError {
    /// Creates an error for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<Message>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
            path: None,
        }
    }

    /// Records the failing rule step.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Records the nested location.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.message, f)
    }
}

// ============================================================================
// FIELD ERRORS
// ============================================================================

/// Failures gathered in batch mode, one per field, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: IndexMap<String, FieldError>,
}

impl FieldErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error; a later error for the same field replaces the earlier.
    pub fn add(&mut self, error: FieldError) {
        self.errors.insert(error.field.clone(), error);
    }

    /// The error recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    /// The message recorded for `field`.
    #[must_use]
    pub fn message(&self, field: &str) -> Option<&Message> {
        self.errors.get(field).map(|e| &e.message)
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failed field names in rule order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Iterates errors in rule order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.values()
    }

    /// Field → message map.
    #[must_use]
    pub fn messages(&self) -> IndexMap<&str, &Message> {
        self.errors
            .iter()
            .map(|(k, e)| (k.as_str(), &e.message))
            .collect()
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        let mut errors = Self::new();
        for error in iter {
            errors.add(error);
        }
        errors
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = indexmap::map::IntoValues<String, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_values()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for (field, error) in &self.errors {
            writeln!(f, "  {field}: {}", error.message)?;
        }
        Ok(())
    }
}

// ============================================================================
// VERDICT
// ============================================================================

/// Outcome of a non-raising evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every field passed.
    Valid,
    /// Fail-fast mode: the first failure.
    Single(FieldError),
    /// Batch mode: every failure.
    Batch(FieldErrors),
}

impl Verdict {
    /// Returns true when nothing failed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// First failure message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Valid => None,
            Self::Single(error) => Some(&error.message),
            Self::Batch(errors) => errors.iter().next().map(|e| &e.message),
        }
    }

    /// Failure for `field`, if any.
    #[must_use]
    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        match self {
            Self::Valid => None,
            Self::Single(error) => (error.field == field).then_some(error),
            Self::Batch(errors) => errors.get(field),
        }
    }

    /// Converts the verdict into the raising form.
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            Self::Valid => Ok(()),
            Self::Single(error) => Err(ValidationError::Field(error)),
            Self::Batch(errors) => Err(ValidationError::Fields(errors)),
        }
    }
}

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// Error returned by raising entry points.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One field failed (fail-fast).
    #[error("{0}")]
    Field(FieldError),

    /// Several fields failed (batch).
    #[error("{0}")]
    Fields(FieldErrors),

    /// Strict mode found an input key no rule covers.
    #[error("{field} invalid")]
    UnexpectedField {
        /// The offending key.
        field: String,
    },

    /// An external capability failed while answering a check.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl ValidationError {
    /// First message carried by this error.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Field(error) => Some(&error.message),
            Self::Fields(errors) => errors.iter().next().map(|e| &e.message),
            Self::UnexpectedField { .. } | Self::Collaborator(_) => None,
        }
    }

    /// Field errors carried by this error, in rule order.
    #[must_use]
    pub fn field_errors(&self) -> Vec<&FieldError> {
        match self {
            Self::Field(error) => vec![error],
            Self::Fields(errors) => errors.iter().collect(),
            Self::UnexpectedField { .. } | Self::Collaborator(_) => Vec::new(),
        }
    }
}

// ============================================================================
// COLLABORATOR ERROR
// ============================================================================

/// External capabilities a check may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Record store behind `unique`.
    Store,
    /// Uploaded-file inspection.
    Files,
    /// Request token verification.
    Tokens,
    /// Localized text catalog.
    Catalog,
    /// DNS lookups behind `activeUrl`.
    Dns,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Store => "record store",
            Self::Files => "file inspector",
            Self::Tokens => "token checker",
            Self::Catalog => "text catalog",
            Self::Dns => "dns resolver",
        })
    }
}

/// A collaborator failed to answer.
#[derive(Debug, Error)]
#[error("{capability} failed: {source}")]
pub struct CollaboratorError {
    /// Which capability failed.
    pub capability: Capability,
    /// Underlying failure.
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl CollaboratorError {
    /// Wraps an error raised by `capability`.
    pub fn new(
        capability: Capability,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            capability,
            source: source.into(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_builder() {
        let error = FieldError::new("qty", "qty must be greater than 0")
            .with_rule("gt")
            .with_path("items.1.qty");
        assert_eq!(error.rule.as_deref(), Some("gt"));
        assert_eq!(error.path.as_deref(), Some("items.1.qty"));
        assert_eq!(error.to_string(), "qty must be greater than 0");
    }

    #[test]
    fn test_field_errors_keep_rule_order() {
        let errors: FieldErrors = [
            FieldError::new("name", "name required"),
            FieldError::new("age", "age must be number"),
        ]
        .into_iter()
        .collect();

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(errors.message("age").map(ToString::to_string), Some("age must be number".into()));
    }

    #[test]
    fn test_map_message_display() {
        let mut map = IndexMap::new();
        map.insert("code".to_owned(), "E1".to_owned());
        map.insert("msg".to_owned(), "bad".to_owned());
        assert_eq!(Message::Map(map).to_string(), "code: E1, msg: bad");
    }

    #[test]
    fn test_verdict_into_result() {
        assert!(Verdict::Valid.into_result().is_ok());
        let err = Verdict::Single(FieldError::new("a", "nope"))
            .into_result()
            .unwrap_err();
        assert!(matches!(err, ValidationError::Field(_)));
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_unexpected_field_display() {
        let err = ValidationError::UnexpectedField { field: "extra".into() };
        assert_eq!(err.to_string(), "extra invalid");
    }

    #[test]
    fn test_collaborator_error_display() {
        let err = CollaboratorError::new(Capability::Store, "connection refused");
        assert_eq!(err.to_string(), "record store failed: connection refused");
    }
}
