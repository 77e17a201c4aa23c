//! Per-call evaluation state
//!
//! A [`ValidationContext`] is built fresh for every evaluation and dropped
//! with the verdict. The long-lived [`Validator`](crate::Validator) only
//! holds read-only configuration, so one instance can serve concurrent
//! callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scene::SceneDelta;

// ============================================================================
// OPTIONS
// ============================================================================

/// Options for [`Validator::check`](crate::Validator::check).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// Evaluate every field and collect one error per failing field.
    pub batch: bool,
    /// Return failures as `Err` instead of a failing [`Verdict`](super::Verdict).
    pub fail_exception: bool,
    /// Scene selecting the rules to run.
    pub scene: Option<String>,
}

impl CheckOptions {
    /// Fail-fast, non-raising options with no scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables batch mode.
    #[must_use = "builder methods must be chained or built"]
    pub fn batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    /// Enables the raising policy.
    #[must_use = "builder methods must be chained or built"]
    pub fn fail_exception(mut self, fail_exception: bool) -> Self {
        self.fail_exception = fail_exception;
        self
    }

    /// Selects a scene.
    #[must_use = "builder methods must be chained or built"]
    pub fn scene(mut self, scene: impl Into<String>) -> Self {
        self.scene = Some(scene.into());
        self
    }
}

/// Options for [`Validator::validate`](crate::Validator::validate).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateOptions {
    /// Evaluate every field and collect one error per failing field.
    pub batch: bool,
    /// Raise on the first failure even in batch mode.
    pub fail_exception: bool,
    /// Drop rule-covered fields whose value is `null` from the cleaned data.
    pub filter_nulls: bool,
    /// Reject input keys that no rule covers.
    pub security: bool,
}

impl ValidateOptions {
    /// Fail-fast options with no filtering.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables batch mode.
    #[must_use = "builder methods must be chained or built"]
    pub fn batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    /// Enables the raising policy in batch mode.
    #[must_use = "builder methods must be chained or built"]
    pub fn fail_exception(mut self, fail_exception: bool) -> Self {
        self.fail_exception = fail_exception;
        self
    }

    /// Enables null filtering.
    #[must_use = "builder methods must be chained or built"]
    pub fn filter_nulls(mut self, filter_nulls: bool) -> Self {
        self.filter_nulls = filter_nulls;
        self
    }

    /// Enables security mode.
    #[must_use = "builder methods must be chained or built"]
    pub fn security(mut self, security: bool) -> Self {
        self.security = security;
        self
    }
}

// ============================================================================
// CONTEXT
// ============================================================================

/// Immutable state for one evaluation.
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    data: &'a Value,
    delta: SceneDelta,
    batch: bool,
    fail_exception: bool,
    prefix: String,
}

impl<'a> ValidationContext<'a> {
    /// Starts a context over `data`.
    #[must_use]
    pub fn builder(data: &'a Value) -> ValidationContextBuilder<'a> {
        ValidationContextBuilder {
            context: Self {
                data,
                delta: SceneDelta::default(),
                batch: false,
                fail_exception: false,
                prefix: String::new(),
            },
        }
    }

    /// Input data.
    #[must_use]
    pub fn data(&self) -> &'a Value {
        self.data
    }

    /// Scene delta in force.
    #[must_use]
    pub fn delta(&self) -> &SceneDelta {
        &self.delta
    }

    /// Batch mode.
    #[must_use]
    pub fn is_batch(&self) -> bool {
        self.batch
    }

    /// Raising policy.
    #[must_use]
    pub fn fails_with_exception(&self) -> bool {
        self.fail_exception
    }

    /// Dotted path of the enclosing field, empty at the top level.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Context for one record of a nested field: fail-fast, non-raising,
    /// no scene delta.
    #[must_use]
    pub fn nested<'b>(&self, item: &'b Value, prefix: impl Into<String>) -> ValidationContext<'b> {
        ValidationContext {
            data: item,
            delta: SceneDelta::default(),
            batch: false,
            fail_exception: false,
            prefix: prefix.into(),
        }
    }
}

/// Builder for [`ValidationContext`].
#[derive(Debug, Clone)]
pub struct ValidationContextBuilder<'a> {
    context: ValidationContext<'a>,
}

impl<'a> ValidationContextBuilder<'a> {
    /// Applies a scene delta.
    #[must_use = "builder methods must be chained or built"]
    pub fn delta(mut self, delta: SceneDelta) -> Self {
        self.context.delta = delta;
        self
    }

    /// Sets batch mode.
    #[must_use = "builder methods must be chained or built"]
    pub fn batch(mut self, batch: bool) -> Self {
        self.context.batch = batch;
        self
    }

    /// Sets the raising policy.
    #[must_use = "builder methods must be chained or built"]
    pub fn fail_exception(mut self, fail_exception: bool) -> Self {
        self.context.fail_exception = fail_exception;
        self
    }

    /// Sets the path prefix.
    #[must_use = "builder methods must be chained or built"]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.context.prefix = prefix.into();
        self
    }

    /// Finishes the context.
    #[must_use]
    pub fn build(self) -> ValidationContext<'a> {
        self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_sets_flags() {
        let data = json!({"a": 1});
        let ctx = ValidationContext::builder(&data)
            .batch(true)
            .fail_exception(true)
            .prefix("order")
            .build();
        assert!(ctx.is_batch());
        assert!(ctx.fails_with_exception());
        assert_eq!(ctx.prefix(), "order");
        assert_eq!(ctx.data()["a"], 1);
    }

    #[test]
    fn test_nested_clears_modes() {
        let data = json!({"items": [{"qty": 1}]});
        let ctx = ValidationContext::builder(&data)
            .batch(true)
            .delta(SceneDelta::new().only(["items"]))
            .build();
        let item = &data["items"][0];
        let nested = ctx.nested(item, "items.0");
        assert!(!nested.is_batch());
        assert!(nested.delta().is_empty());
        assert_eq!(nested.prefix(), "items.0");
        assert_eq!(nested.data()["qty"], 1);
    }

    #[test]
    fn test_options_builders() {
        let opts = CheckOptions::new().batch(true).scene("edit");
        assert!(opts.batch);
        assert_eq!(opts.scene.as_deref(), Some("edit"));

        let opts = ValidateOptions::new().security(true).filter_nulls(true);
        assert!(opts.security && opts.filter_nulls);
        assert!(!opts.batch);
    }
}
