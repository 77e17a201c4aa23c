//! Scenes
//!
//! A scene is a named view over the base rule table: an allow-list of fields
//! plus per-field rule steps to append or remove. A scene is either a static
//! field list or a selector that builds a [`SceneDelta`] when the scene is
//! selected. Selectors return the delta; they never touch validator state.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::rules::RuleEntry;

/// Steps removed from one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The whole field is skipped unless steps are appended for it.
    All,
    /// Only steps with these names are skipped.
    Rules(Vec<String>),
}

/// Changes a scene applies to the base rule table.
///
/// # Examples
///
/// ```rust,ignore
/// let delta = SceneDelta::new()
///     .only(["name", "age"])
///     .remove("age", "between")
///     .append("age", "gt:17");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDelta {
    only: Vec<String>,
    append: IndexMap<String, Vec<RuleEntry>>,
    remove: IndexMap<String, Removal>,
}

/// Name a removal entry addresses: the tag before any `:` parameter.
fn removal_name(rule: &str) -> &str {
    let rule = rule.trim();
    match rule.find(':') {
        Some(at) if at > 0 => &rule[..at],
        _ => rule,
    }
}

impl SceneDelta {
    /// Empty delta.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts evaluation to `fields`.
    #[must_use = "builder methods must be chained or built"]
    pub fn only<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a pipe chain of steps to `field`.
    #[must_use = "builder methods must be chained or built"]
    pub fn append(self, field: impl Into<String>, chain: &str) -> Self {
        self.append_entries(field, RuleEntry::split_chain(chain))
    }

    /// Appends steps to `field`. A later call for the same field replaces
    /// the earlier one.
    #[must_use = "builder methods must be chained or built"]
    pub fn append_entries(
        mut self,
        field: impl Into<String>,
        entries: impl IntoIterator<Item = RuleEntry>,
    ) -> Self {
        self.append
            .insert(field.into(), entries.into_iter().collect());
        self
    }

    /// Removes the steps of a pipe chain (`"max|between"`) from `field`.
    #[must_use = "builder methods must be chained or built"]
    pub fn remove(mut self, field: impl Into<String>, chain: &str) -> Self {
        let names = chain
            .split('|')
            .map(removal_name)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect();
        self.remove.insert(field.into(), Removal::Rules(names));
        self
    }

    /// Removes every step of `field`.
    #[must_use = "builder methods must be chained or built"]
    pub fn remove_all(mut self, field: impl Into<String>) -> Self {
        self.remove.insert(field.into(), Removal::All);
        self
    }

    /// Allow-list; empty means every field.
    #[must_use]
    pub fn only_fields(&self) -> &[String] {
        &self.only
    }

    /// Returns true when `field` passes the allow-list.
    #[must_use]
    pub fn allows(&self, field: &str) -> bool {
        self.only.is_empty() || self.only.iter().any(|f| f == field)
    }

    /// Steps appended to `field`.
    #[must_use]
    pub fn appended(&self, field: &str) -> &[RuleEntry] {
        self.append.get(field).map_or(&[], Vec::as_slice)
    }

    /// Fields with appended steps, in insertion order.
    pub fn appended_fields(&self) -> impl Iterator<Item = &str> {
        self.append.keys().map(String::as_str)
    }

    /// Returns true when `field` is removed entirely and nothing is
    /// appended back.
    #[must_use]
    pub fn is_removed_entirely(&self, field: &str) -> bool {
        matches!(self.remove.get(field), Some(Removal::All)) && self.appended(field).is_empty()
    }

    /// Returns true when the step `name` of `field` is removed.
    #[must_use]
    pub fn removes(&self, field: &str, name: &str) -> bool {
        match self.remove.get(field) {
            Some(Removal::All) => true,
            Some(Removal::Rules(names)) => names.iter().any(|n| n == name),
            None => false,
        }
    }

    /// Returns true when the delta changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.only.is_empty() && self.append.is_empty() && self.remove.is_empty()
    }
}

/// Builds a delta when its scene is selected.
pub type Selector = Arc<dyn Fn() -> SceneDelta + Send + Sync>;

/// A named scene.
#[derive(Clone)]
pub enum Scene {
    /// Static allow-list of fields.
    Fields(Vec<String>),
    /// Fixed delta.
    Delta(SceneDelta),
    /// Delta computed on selection.
    Selector(Selector),
}

impl Scene {
    /// Scene from a field list.
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fields(fields.into_iter().map(Into::into).collect())
    }

    /// Scene from a selector.
    pub fn selector<F>(f: F) -> Self
    where
        F: Fn() -> SceneDelta + Send + Sync + 'static,
    {
        Self::Selector(Arc::new(f))
    }

    /// The delta this scene applies.
    #[must_use]
    pub fn resolve(&self) -> SceneDelta {
        match self {
            Self::Fields(fields) => SceneDelta::new().only(fields.iter().cloned()),
            Self::Delta(delta) => delta.clone(),
            Self::Selector(select) => select(),
        }
    }

    /// Static field list, when the scene has one.
    #[must_use]
    pub fn field_list(&self) -> Option<&[String]> {
        match self {
            Self::Fields(fields) => Some(fields),
            Self::Delta(_) | Self::Selector(_) => None,
        }
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
            Self::Delta(delta) => f.debug_tuple("Delta").field(delta).finish(),
            Self::Selector(_) => f.write_str("Selector(..)"),
        }
    }
}

impl From<SceneDelta> for Scene {
    fn from(delta: SceneDelta) -> Self {
        Self::Delta(delta)
    }
}

impl<S: Into<String>> FromIterator<S> for Scene {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::fields(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_names_drop_params() {
        let delta = SceneDelta::new().remove("age", "between:1,10|max");
        assert!(delta.removes("age", "between"));
        assert!(delta.removes("age", "max"));
        assert!(!delta.removes("age", "min"));
        assert!(!delta.removes("name", "max"));
    }

    #[test]
    fn test_remove_all_unless_appended() {
        let delta = SceneDelta::new().remove_all("age");
        assert!(delta.is_removed_entirely("age"));

        let delta = delta.append("age", "gt:17");
        assert!(!delta.is_removed_entirely("age"));
        assert_eq!(delta.appended("age"), &[RuleEntry::from("gt:17")]);
    }

    #[test]
    fn test_only_allows() {
        let delta = SceneDelta::new().only(["name"]);
        assert!(delta.allows("name"));
        assert!(!delta.allows("age"));
        assert!(SceneDelta::new().allows("anything"));
    }

    #[test]
    fn test_scene_resolve() {
        let scene = Scene::fields(["name", "email"]);
        assert_eq!(scene.resolve().only_fields(), ["name", "email"]);
        assert_eq!(scene.field_list().map(<[String]>::len), Some(2));

        let scene = Scene::selector(|| SceneDelta::new().only(["id"]).remove("id", "require"));
        let delta = scene.resolve();
        assert!(delta.removes("id", "require"));
        assert!(scene.field_list().is_none());
    }
}
