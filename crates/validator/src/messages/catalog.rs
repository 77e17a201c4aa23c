//! Message lookup and rendering

use std::borrow::Cow;

use indexmap::IndexMap;
use tracing::warn;

use crate::collaborators::TextCatalog;
use crate::foundation::{CollaboratorError, Message, Param};
use crate::registry::Registry;

use super::template::{Template, catalog_key, substitute};

/// Resolves the message for a failed step.
///
/// Lookup order, first hit wins:
///
/// 1. override `"field.rule"`
/// 2. override `field` as a map containing `rule`
/// 3. override `field`
/// 4. the default message for `rule`
/// 5. the `require` default, for any `require*` rule
/// 6. `"<title> is invalid"`
#[derive(Clone, Copy)]
pub struct MessageCatalog<'a> {
    overrides: &'a IndexMap<String, Template>,
    registry: &'a Registry,
    text: Option<&'a dyn TextCatalog>,
}

impl<'a> MessageCatalog<'a> {
    /// Creates a catalog over caller overrides and registry defaults.
    #[must_use]
    pub fn new(
        overrides: &'a IndexMap<String, Template>,
        registry: &'a Registry,
        text: Option<&'a dyn TextCatalog>,
    ) -> Self {
        Self {
            overrides,
            registry,
            text,
        }
    }

    fn template(&self, field: &str, rule: &str) -> Option<Cow<'a, Template>> {
        if let Some(found) = self.overrides.get(&format!("{field}.{rule}")) {
            return Some(Cow::Borrowed(found));
        }
        if let Some(per_field) = self.overrides.get(field) {
            if let Some(text) = per_field.get(rule) {
                return Some(Cow::Owned(Template::from(text)));
            }
            return Some(Cow::Borrowed(per_field));
        }
        if let Some(default) = self.registry.type_message(rule) {
            return Some(Cow::Borrowed(default));
        }
        if rule.starts_with("require") {
            return self.registry.type_message("require").map(Cow::Borrowed);
        }
        None
    }

    /// Renders the message for `field` failing `rule` with `param`.
    pub fn render(
        &self,
        field: &str,
        title: &str,
        rule: &str,
        param: &Param,
    ) -> Result<Message, CollaboratorError> {
        match self.template(field, rule) {
            Some(template) => self.render_template(&template, title, param),
            None => Ok(Message::Text(format!("{title} is invalid"))),
        }
    }

    /// Renders a template.
    pub fn render_template(
        &self,
        template: &Template,
        title: &str,
        param: &Param,
    ) -> Result<Message, CollaboratorError> {
        match template {
            Template::Text(text) => self.render_text(text, title, param),
            Template::Map(map) => {
                let mut rendered = IndexMap::with_capacity(map.len());
                for (key, text) in map {
                    let value = match self.render_text(text, title, param)? {
                        Message::Text(text) => text,
                        other => other.to_string(),
                    };
                    rendered.insert(key.clone(), value);
                }
                Ok(Message::Map(rendered))
            }
        }
    }

    /// Renders text, resolving a `{%key}` reference first.
    pub fn render_text(
        &self,
        text: &str,
        title: &str,
        param: &Param,
    ) -> Result<Message, CollaboratorError> {
        let resolved = self.resolve(text)?;
        Ok(Message::Text(substitute(&resolved, title, param)))
    }

    fn resolve<'t>(&self, text: &'t str) -> Result<Cow<'t, str>, CollaboratorError> {
        let Some(key) = catalog_key(text) else {
            return Ok(Cow::Borrowed(text));
        };
        match self.text {
            Some(catalog) => catalog.lookup(key).map(Cow::Owned),
            None => {
                warn!(key, "message references a text catalog but none is configured");
                Ok(Cow::Owned(key.to_owned()))
            }
        }
    }
}
