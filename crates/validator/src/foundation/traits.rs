//! Core validation traits
//!
//! [`Check`] is the seam for anything that can answer a single rule step:
//! registered extensions, conditional-require predicates and the closures
//! users put directly into rule tables.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::error::{CollaboratorError, Message};
use super::param::Param;

// ============================================================================
// OUTCOME
// ============================================================================

/// Result of one rule step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The value satisfies the step.
    Pass,
    /// The value fails; the message comes from the catalog.
    Fail,
    /// The value fails with a caller-provided message.
    Message(Message),
}

impl Outcome {
    /// Returns true for [`Outcome::Pass`].
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Fails with the given message.
    pub fn fail_with(message: impl Into<Message>) -> Self {
        Self::Message(message.into())
    }
}

impl From<bool> for Outcome {
    fn from(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }
}

impl From<Result<(), String>> for Outcome {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::Pass,
            Err(message) => Self::Message(Message::Text(message)),
        }
    }
}

/// Result of a check that may consult a collaborator.
pub type CheckResult = Result<Outcome, CollaboratorError>;

// ============================================================================
// CHECK INPUT
// ============================================================================

/// Everything a check may look at.
#[derive(Debug, Clone, Copy)]
pub struct CheckInput<'a> {
    /// Value under test.
    pub value: &'a Value,
    /// The step's parameter.
    pub param: &'a Param,
    /// Full input data, for cross-field checks.
    pub data: &'a Value,
    /// Field name.
    pub field: &'a str,
    /// Display title of the field.
    pub title: &'a str,
}

impl<'a> CheckInput<'a> {
    /// Input for a standalone value with no surrounding record.
    #[must_use]
    pub fn standalone(value: &'a Value, param: &'a Param) -> Self {
        static NULL: Value = Value::Null;
        Self {
            value,
            param,
            data: &NULL,
            field: "",
            title: "",
        }
    }

    /// Same input with a different parameter.
    #[must_use]
    pub fn with_param(self, param: &'a Param) -> Self {
        Self { param, ..self }
    }
}

// ============================================================================
// CHECK TRAIT
// ============================================================================

/// Something that can answer a rule step.
///
/// Any `Fn(&CheckInput<'_>) -> Outcome` closure is a `Check`. Implement the
/// trait directly when the answer depends on a fallible capability.
///
/// # Examples
///
/// ```rust,ignore
/// use vigil_validator::prelude::*;
///
/// let even = |input: &CheckInput<'_>| {
///     Outcome::from(input.value.as_i64().is_some_and(|n| n % 2 == 0))
/// };
/// let validator = Validator::builder().extend("even", even).build();
/// ```
pub trait Check: Send + Sync {
    /// Evaluates the step.
    fn check(&self, input: &CheckInput<'_>) -> CheckResult;
}

impl<F> Check for F
where
    F: Fn(&CheckInput<'_>) -> Outcome + Send + Sync,
{
    fn check(&self, input: &CheckInput<'_>) -> CheckResult {
        Ok(self(input))
    }
}

/// Shared, type-erased check.
pub type SharedCheck = Arc<dyn Check>;

// ============================================================================
// RULE CLOSURES
// ============================================================================

/// A closure placed directly in a rule table, called with `(value, data)`.
#[derive(Clone)]
pub struct RuleFn(Arc<dyn Fn(&Value, &Value) -> Outcome + Send + Sync>);

impl RuleFn {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Outcome + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invokes the closure.
    #[must_use]
    pub fn call(&self, value: &Value, data: &Value) -> Outcome {
        (self.0)(value, data)
    }
}

impl PartialEq for RuleFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RuleFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RuleFn(..)")
    }
}
