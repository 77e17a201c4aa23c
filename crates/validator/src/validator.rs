//! The configured validator
//!
//! [`Validator`] owns read-only configuration: the base rule table, scenes,
//! message overrides, field titles, custom patterns, the [`Registry`] and
//! the [`Collaborators`]. Every call builds its own
//! [`ValidationContext`], so one validator can be shared across threads.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::collaborators::Collaborators;
use crate::engine::Engine;
use crate::foundation::{
    Check, CheckOptions, Outcome, ValidateOptions, ValidationContext, ValidationError, Verdict,
};
use crate::messages::Template;
use crate::registry::Registry;
use crate::rules::{FieldRule, RuleTable, TableEntry};
use crate::scene::{Scene, SceneDelta};
use crate::schema::Schema;
use crate::validators::Env;
use crate::validators::pattern::{DEFAULT_CACHE_CAPACITY, PatternTable};

/// Rules a [`Validator::validate`] call runs.
#[derive(Debug, Clone, Copy, Default)]
pub enum Target<'t> {
    /// The base rule table.
    #[default]
    Base,
    /// A named scene: a static scene runs its fields' base rules, any other
    /// scene applies its delta to the base table. Unknown names fall back
    /// to the base table.
    Scene(&'t str),
    /// An explicit table.
    Rules(&'t RuleTable),
}

/// A configured validator.
///
/// # Examples
///
/// ```rust,ignore
/// use vigil_validator::prelude::*;
/// use serde_json::json;
///
/// let validator = Validator::builder()
///     .rule("name|Name", "require|max:25")
///     .rule("age", "number|between:1,120")
///     .build();
///
/// let verdict = validator.check(&json!({"name": "", "age": 30}), &CheckOptions::new())?;
/// assert_eq!(verdict.message().unwrap(), "Name is required");
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    rules: RuleTable,
    scenes: IndexMap<String, Scene>,
    messages: IndexMap<String, Template>,
    titles: IndexMap<String, String>,
    patterns: PatternTable,
    registry: Registry,
    collaborators: Collaborators,
}

impl Validator {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    fn engine(&self) -> Engine<'_> {
        Engine {
            base: &self.rules,
            messages: &self.messages,
            titles: &self.titles,
            env: Env {
                registry: &self.registry,
                patterns: &self.patterns,
                collaborators: &self.collaborators,
            },
        }
    }

    /// Delta for a scene name. Unknown scenes apply no delta.
    fn scene_delta(&self, name: &str) -> SceneDelta {
        match self.scenes.get(name) {
            Some(scene) => scene.resolve(),
            None => {
                warn!(scene = name, "unknown scene, using the base rules");
                SceneDelta::default()
            }
        }
    }

    // ------------------------------------------------------------------------
    // evaluation
    // ------------------------------------------------------------------------

    /// Validates `data` against the base rules, narrowed by `opts.scene`.
    ///
    /// # Errors
    ///
    /// Failures come back as `Err` only under `fail_exception`; a failing
    /// collaborator always does.
    pub fn check(&self, data: &Value, opts: &CheckOptions) -> Result<Verdict, ValidationError> {
        self.evaluate(data, &RuleTable::new(), opts)
    }

    /// Validates `data` against `table`, or against the base rules when
    /// `table` is empty.
    ///
    /// # Errors
    ///
    /// See [`Validator::check`].
    pub fn evaluate(
        &self,
        data: &Value,
        table: &RuleTable,
        opts: &CheckOptions,
    ) -> Result<Verdict, ValidationError> {
        let table = if table.is_empty() { &self.rules } else { table };
        let delta = opts
            .scene
            .as_deref()
            .map(|name| self.scene_delta(name))
            .unwrap_or_default();
        let ctx = ValidationContext::builder(data)
            .delta(delta)
            .batch(opts.batch)
            .fail_exception(opts.fail_exception)
            .build();

        debug!(
            fields = table.len(),
            batch = opts.batch,
            scene = opts.scene.as_deref(),
            "validation started"
        );
        let result = self.engine().evaluate(table, &ctx);
        match &result {
            Ok(Verdict::Valid) => debug!("validation passed"),
            Ok(Verdict::Single(error)) => debug!(field = %error.field, "validation failed"),
            Ok(Verdict::Batch(errors)) => debug!(failures = errors.len(), "validation failed"),
            Err(err) => debug!(error = %err, "validation raised"),
        }
        result
    }

    /// Validates `data` and returns the cleaned data.
    ///
    /// Security mode rejects input keys that the selected rules do not name;
    /// null filtering drops rule-covered keys whose value is `null`.
    ///
    /// # Errors
    ///
    /// Any failure, [`ValidationError::UnexpectedField`] in security mode,
    /// or a collaborator failure.
    pub fn validate(
        &self,
        data: &Value,
        target: Target<'_>,
        opts: &ValidateOptions,
    ) -> Result<Value, ValidationError> {
        let (table, delta) = self.target_rules(target);
        let ctx = ValidationContext::builder(data)
            .delta(delta)
            .batch(opts.batch)
            .fail_exception(opts.fail_exception)
            .build();

        debug!(
            fields = table.len(),
            batch = opts.batch,
            security = opts.security,
            "validation started"
        );
        self.engine().evaluate(&table, &ctx)?.into_result()?;

        let mut fields = table.field_names();
        fields.extend(ctx.delta().appended_fields().map(str::to_owned));

        if opts.security
            && let Value::Object(map) = data
            && let Some(extra) = map.keys().find(|key| !fields.contains(*key))
        {
            debug!(field = %extra, "unexpected field");
            return Err(ValidationError::UnexpectedField {
                field: extra.clone(),
            });
        }

        let mut cleaned = data.clone();
        if opts.filter_nulls
            && let Value::Object(map) = &mut cleaned
        {
            for field in &fields {
                if map.get(field).is_some_and(Value::is_null) {
                    map.shift_remove(field);
                }
            }
        }
        debug!("validation passed");
        Ok(cleaned)
    }

    /// Rule table and delta a target selects.
    fn target_rules<'t>(&'t self, target: Target<'t>) -> (Cow<'t, RuleTable>, SceneDelta) {
        match target {
            Target::Base => (Cow::Borrowed(&self.rules), SceneDelta::default()),
            Target::Rules(table) => (Cow::Borrowed(table), SceneDelta::default()),
            Target::Scene(name) => match self.scenes.get(name) {
                Some(Scene::Fields(fields)) => {
                    let names = fields
                        .iter()
                        .fold(RuleTable::new(), |table, field| table.name(field.clone()));
                    (Cow::Owned(names), SceneDelta::default())
                }
                Some(scene) => (Cow::Borrowed(&self.rules), scene.resolve()),
                None => {
                    warn!(scene = name, "unknown scene, using the base rules");
                    (Cow::Borrowed(&self.rules), SceneDelta::default())
                }
            },
        }
    }

    /// Checks one bare value against a rule with no surrounding record.
    ///
    /// Steps run in order and absent values are not skipped. Returns the
    /// first non-passing outcome.
    ///
    /// # Errors
    ///
    /// A collaborator failure.
    pub fn check_value(
        &self,
        value: &Value,
        rule: impl Into<FieldRule>,
    ) -> Result<Outcome, ValidationError> {
        self.engine().check_standalone(value, &rule.into())
    }

    // ------------------------------------------------------------------------
    // queries
    // ------------------------------------------------------------------------

    /// Returns true when a scene named `name` exists.
    #[must_use]
    pub fn has_scene(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    /// Fields a scene covers: its static list, or the base rule fields.
    #[must_use]
    pub fn scene_fields(&self, name: &str) -> Vec<String> {
        self.scenes
            .get(name)
            .and_then(Scene::field_list)
            .map_or_else(|| self.rules.field_names(), <[String]>::to_vec)
    }

    /// Scene names in definition order.
    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.scenes.keys().map(String::as_str)
    }

    /// The base rule table.
    #[must_use]
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// The registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The pattern table.
    #[must_use]
    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`Validator`].
#[derive(Debug, Clone)]
pub struct ValidatorBuilder {
    rules: RuleTable,
    scenes: IndexMap<String, Scene>,
    messages: IndexMap<String, Template>,
    titles: IndexMap<String, String>,
    patterns: IndexMap<String, String>,
    registry: Registry,
    collaborators: Collaborators,
    cache_capacity: u64,
}

impl ValidatorBuilder {
    /// Empty configuration with the default registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: RuleTable::new(),
            scenes: IndexMap::new(),
            messages: IndexMap::new(),
            titles: IndexMap::new(),
            patterns: IndexMap::new(),
            registry: Registry::new(),
            collaborators: Collaborators::new(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Replaces the base rule table.
    #[must_use = "builder methods must be chained or built"]
    pub fn rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    /// Adds or replaces the rule for `key` (`field` or `field|Title`).
    #[must_use = "builder methods must be chained or built"]
    pub fn rule(mut self, key: impl Into<String>, rule: impl Into<FieldRule>) -> Self {
        self.rules.insert(key, rule);
        self
    }

    /// Sets the display title of `field`.
    #[must_use = "builder methods must be chained or built"]
    pub fn title(mut self, field: impl Into<String>, title: impl Into<String>) -> Self {
        self.titles.insert(field.into(), title.into());
        self
    }

    /// Sets several titles.
    #[must_use = "builder methods must be chained or built"]
    pub fn titles<I, K, V>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.titles
            .extend(titles.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Overrides a message. `key` is `field.rule`, or `field` for a whole
    /// field (text, or a map keyed by rule).
    #[must_use = "builder methods must be chained or built"]
    pub fn message(mut self, key: impl Into<String>, message: impl Into<Template>) -> Self {
        self.messages.insert(key.into(), message.into());
        self
    }

    /// Overrides several messages.
    #[must_use = "builder methods must be chained or built"]
    pub fn messages<I, K, V>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Template>,
    {
        self.messages
            .extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds a static scene.
    #[must_use = "builder methods must be chained or built"]
    pub fn scene<I, S>(mut self, name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scenes.insert(name.into(), Scene::fields(fields));
        self
    }

    /// Adds a scene with a fixed delta.
    #[must_use = "builder methods must be chained or built"]
    pub fn scene_delta(mut self, name: impl Into<String>, delta: SceneDelta) -> Self {
        self.scenes.insert(name.into(), Scene::Delta(delta));
        self
    }

    /// Adds a scene whose delta is built on selection.
    #[must_use = "builder methods must be chained or built"]
    pub fn scene_with<F>(mut self, name: impl Into<String>, selector: F) -> Self
    where
        F: Fn() -> SceneDelta + Send + Sync + 'static,
    {
        self.scenes.insert(name.into(), Scene::selector(selector));
        self
    }

    /// Registers a named pattern for `regex:name` and format checks.
    #[must_use = "builder methods must be chained or built"]
    pub fn pattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.patterns.insert(name.into(), pattern.into());
        self
    }

    /// Replaces the registry.
    #[must_use = "builder methods must be chained or built"]
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Maps an alias to a tag.
    #[must_use = "builder methods must be chained or built"]
    pub fn alias(mut self, symbol: impl Into<String>, tag: impl Into<String>) -> Self {
        self.registry.register_alias(symbol, tag);
        self
    }

    /// Registers an extension.
    #[must_use = "builder methods must be chained or built"]
    pub fn extend(mut self, tag: impl Into<String>, check: impl Check + 'static) -> Self {
        self.registry.register_extension(tag, check);
        self
    }

    /// Registers an extension with its default message.
    #[must_use = "builder methods must be chained or built"]
    pub fn extend_with_message(
        mut self,
        tag: impl Into<String>,
        check: impl Check + 'static,
        message: impl Into<Template>,
    ) -> Self {
        self.registry
            .register_extension_with_message(tag, check, message);
        self
    }

    /// Registers a condition for `requireCallback`.
    #[must_use = "builder methods must be chained or built"]
    pub fn condition<F>(mut self, name: impl Into<String>, condition: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.registry.register_condition(name, condition);
        self
    }

    /// Sets the default message for a tag.
    #[must_use = "builder methods must be chained or built"]
    pub fn type_message(mut self, tag: impl Into<String>, message: impl Into<Template>) -> Self {
        self.registry.set_type_message(tag, message);
        self
    }

    /// Sets the external capabilities.
    #[must_use = "builder methods must be chained or built"]
    pub fn collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    /// Bounds the compiled-pattern cache.
    #[must_use = "builder methods must be chained or built"]
    pub fn pattern_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Merges a loaded schema. Later entries replace earlier ones.
    #[must_use = "builder methods must be chained or built"]
    pub fn schema(mut self, schema: Schema) -> Self {
        for entry in schema.rules.entries() {
            match entry {
                TableEntry::Field { key, rule } => self.rules.insert(key.clone(), rule.clone()),
                TableEntry::Name(name) => self.rules = self.rules.name(name.clone()),
            }
        }
        self.messages.extend(schema.messages);
        self.titles.extend(schema.titles);
        self.scenes.extend(schema.scenes);
        self.patterns.extend(schema.patterns);
        for (symbol, tag) in schema.aliases {
            self.registry.register_alias(symbol, tag);
        }
        for (tag, message) in schema.type_messages {
            self.registry.set_type_message(tag, message);
        }
        self
    }

    /// Finishes the validator.
    #[must_use]
    pub fn build(self) -> Validator {
        Validator {
            rules: self.rules,
            scenes: self.scenes,
            messages: self.messages,
            titles: self.titles,
            patterns: PatternTable::with_capacity(self.patterns, self.cache_capacity),
            registry: self.registry,
            collaborators: self.collaborators,
        }
    }
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
