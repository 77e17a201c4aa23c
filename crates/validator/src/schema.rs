//! Schema documents
//!
//! Loads rule tables, scenes, messages and patterns from JSON (and TOML with
//! the `toml` feature) so a validator can be configured without code.
//!
//! ```json
//! {
//!   "rules": {
//!     "name|Name": "require|max:25",
//!     "age": ["number", {"between": "1,120"}],
//!     "items": {"*.qty": "require|gt:0"},
//!     "code": {"rules": "require|alphaNum", "title": "Code", "messages": ["give us a code"]}
//!   },
//!   "messages": {"age.between": ":attribute out of range"},
//!   "titles": {"age": "Age"},
//!   "scenes": {
//!     "edit": ["name", "age"],
//!     "signup": {"only": ["name"], "append": {"name": "alphaDash"}, "remove": {"age": true}}
//!   },
//!   "patterns": {"sku": "/^[A-Z]{3}-\\d+$/"},
//!   "type_messages": {"gt": ":attribute is too small"},
//!   "aliases": {"ge": "egt"}
//! }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::foundation::Param;
use crate::messages::Template;
use crate::rules::{FieldRule, ITEM_PREFIX, RuleEntry, RuleTable, Rules};
use crate::scene::{Scene, SceneDelta};

/// Malformed schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The JSON text does not parse or has the wrong shape.
    #[error("invalid JSON schema: {0}")]
    Json(#[from] serde_json::Error),

    /// The TOML text does not parse or has the wrong shape.
    #[cfg(feature = "toml")]
    #[error("invalid TOML schema: {0}")]
    Toml(#[from] toml::de::Error),

    /// A rule value has no rule meaning.
    #[error("invalid rule for `{field}`: {reason}")]
    InvalidRule {
        /// Field key.
        field: String,
        /// What is wrong.
        reason: String,
    },
}

impl SchemaError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}

/// A loaded schema, ready to merge into a
/// [`ValidatorBuilder`](crate::ValidatorBuilder).
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Base rule table.
    pub rules: RuleTable,
    /// Message overrides.
    pub messages: IndexMap<String, Template>,
    /// Field titles.
    pub titles: IndexMap<String, String>,
    /// Named scenes.
    pub scenes: IndexMap<String, Scene>,
    /// Named patterns.
    pub patterns: IndexMap<String, String>,
    /// Default messages per tag.
    pub type_messages: IndexMap<String, Template>,
    /// Tag aliases.
    pub aliases: IndexMap<String, String>,
}

// ============================================================================
// RAW DOCUMENT
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SchemaDoc {
    rules: RulesDoc,
    messages: IndexMap<String, Template>,
    titles: IndexMap<String, String>,
    scenes: IndexMap<String, SceneDoc>,
    patterns: IndexMap<String, String>,
    type_messages: IndexMap<String, Template>,
    aliases: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RulesDoc {
    Names(Vec<String>),
    Table(IndexMap<String, Value>),
}

impl Default for RulesDoc {
    fn default() -> Self {
        Self::Table(IndexMap::new())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SceneDoc {
    Fields(Vec<String>),
    Delta {
        #[serde(default)]
        only: Vec<String>,
        #[serde(default)]
        append: IndexMap<String, Value>,
        #[serde(default)]
        remove: IndexMap<String, RemoveDoc>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoveDoc {
    All(bool),
    Chain(String),
    List(Vec<String>),
}

// ============================================================================
// LOADING
// ============================================================================

impl Schema {
    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Malformed JSON or a rule value with no rule meaning.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDoc = serde_json::from_str(text)?;
        Self::from_doc(doc)
    }

    /// Converts an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`Schema::from_json_str`].
    pub fn from_json_value(value: Value) -> Result<Self, SchemaError> {
        let doc: SchemaDoc = serde_json::from_value(value)?;
        Self::from_doc(doc)
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Malformed TOML or a rule value with no rule meaning.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(text: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDoc = toml::from_str(text)?;
        Self::from_doc(doc)
    }

    fn from_doc(doc: SchemaDoc) -> Result<Self, SchemaError> {
        let rules = match doc.rules {
            RulesDoc::Names(names) => names.into_iter().fold(RuleTable::new(), RuleTable::name),
            RulesDoc::Table(table) => table_from_map(table.iter())?,
        };

        let mut scenes = IndexMap::with_capacity(doc.scenes.len());
        for (name, scene) in doc.scenes {
            let scene = match scene {
                SceneDoc::Fields(fields) => Scene::Fields(fields),
                SceneDoc::Delta {
                    only,
                    append,
                    remove,
                } => Scene::Delta(scene_delta(only, &append, remove)?),
            };
            scenes.insert(name, scene);
        }

        Ok(Self {
            rules,
            messages: doc.messages,
            titles: doc.titles,
            scenes,
            patterns: doc.patterns,
            type_messages: doc.type_messages,
            aliases: doc.aliases,
        })
    }
}

fn table_from_map<'a>(
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
) -> Result<RuleTable, SchemaError> {
    let mut table = RuleTable::new();
    for (key, value) in entries {
        table.insert(key.clone(), field_rule(key, value)?);
    }
    Ok(table)
}

/// Converts one rule value.
///
/// - string: pipe chain
/// - array: ordered steps, strings positional, single-key objects keyed
/// - object with `*.` keys: nested item table
/// - object with a `rules` key: chain with its own title and step messages
/// - any other object: keyed steps in order
fn field_rule(field: &str, value: &Value) -> Result<FieldRule, SchemaError> {
    match value {
        Value::String(chain) => Ok(FieldRule::from(chain.as_str())),
        Value::Array(items) => Ok(FieldRule::Chain(entries_from_array(field, items)?)),
        Value::Object(map) if map.keys().any(|k| k.starts_with(ITEM_PREFIX)) => {
            Ok(FieldRule::Nested(table_from_map(map.iter())?))
        }
        Value::Object(map) if map.contains_key("rules") => described(field, map),
        Value::Object(map) => Ok(FieldRule::Chain(
            map.iter()
                .map(|(tag, param)| RuleEntry::Keyed(tag.clone(), Param::from_json(param)))
                .collect(),
        )),
        other => Err(SchemaError::invalid(
            field,
            format!("expected a string, list or table, found {other}"),
        )),
    }
}

fn entries_from_array(field: &str, items: &[Value]) -> Result<Vec<RuleEntry>, SchemaError> {
    items
        .iter()
        .map(|item| match item {
            Value::String(text) => Ok(RuleEntry::Positional(text.clone())),
            Value::Object(map) if map.len() == 1 => {
                let (tag, param) = map.iter().next().ok_or_else(|| {
                    SchemaError::invalid(field, "keyed step without a tag")
                })?;
                Ok(RuleEntry::Keyed(tag.clone(), Param::from_json(param)))
            }
            other => Err(SchemaError::invalid(
                field,
                format!("a step must be a string or a single-key table, found {other}"),
            )),
        })
        .collect()
}

fn described(field: &str, map: &Map<String, Value>) -> Result<FieldRule, SchemaError> {
    let entries = match map.get("rules") {
        Some(Value::String(chain)) => RuleEntry::split_chain(chain),
        Some(Value::Array(items)) => entries_from_array(field, items)?,
        _ => return Err(SchemaError::invalid(field, "`rules` must be a string or list")),
    };
    let messages: Vec<Option<String>> = match map.get("messages") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().filter(|s| !s.is_empty()).map(str::to_owned))
            .collect(),
        Some(_) => return Err(SchemaError::invalid(field, "`messages` must be a list")),
    };

    let mut rules = Rules::new();
    for (index, entry) in entries.into_iter().enumerate() {
        rules = rules.entry(entry);
        if let Some(Some(message)) = messages.get(index) {
            rules = rules.message(message.clone());
        }
    }
    if let Some(title) = map.get("title").and_then(Value::as_str) {
        rules = rules.title(title);
    }
    Ok(FieldRule::Described(rules))
}

fn scene_delta(
    only: Vec<String>,
    append: &IndexMap<String, Value>,
    remove: IndexMap<String, RemoveDoc>,
) -> Result<SceneDelta, SchemaError> {
    let mut delta = SceneDelta::new().only(only);
    for (field, value) in append {
        let entries = match field_rule(field, value)? {
            FieldRule::Chain(entries) => entries,
            _ => return Err(SchemaError::invalid(field, "appended rules must be a chain")),
        };
        delta = delta.append_entries(field.clone(), entries);
    }
    for (field, removal) in remove {
        delta = match removal {
            RemoveDoc::All(true) => delta.remove_all(field),
            RemoveDoc::All(false) => delta,
            RemoveDoc::Chain(chain) => delta.remove(field, &chain),
            RemoveDoc::List(names) => delta.remove(field, &names.join("|")),
        };
    }
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::TableEntry;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"{
        "rules": {
            "name|Name": "require|max:25",
            "age": ["number", {"between": "1,120"}],
            "score": {"gt": 5},
            "items": {"*.qty": "require|gt:0"},
            "code": {"rules": "require|alphaNum", "title": "Code", "messages": ["give us a code"]}
        },
        "messages": {"age.between": ":attribute out of range", "name": {"max": "too long"}},
        "scenes": {
            "edit": ["name", "age"],
            "signup": {"only": ["name"], "append": {"name": "alphaDash"}, "remove": {"age": true, "score": "gt"}}
        },
        "aliases": {"ge": "egt"}
    }"#;

    #[test]
    fn test_rule_shapes() {
        let schema = Schema::from_json_str(DOC).unwrap();
        let keys: Vec<_> = schema.rules.entries().iter().map(TableEntry::key).collect();
        assert_eq!(keys, ["name|Name", "age", "score", "items", "code"]);

        let (_, age) = schema.rules.find("age").unwrap();
        assert_eq!(
            age,
            &FieldRule::Chain(vec![
                RuleEntry::from("number"),
                RuleEntry::keyed("between", "1,120"),
            ])
        );

        let (_, score) = schema.rules.find("score").unwrap();
        assert_eq!(score, &FieldRule::Chain(vec![RuleEntry::keyed("gt", "5")]));

        let (_, items) = schema.rules.find("items").unwrap();
        assert!(matches!(items, FieldRule::Nested(table) if table.contains("*.qty")));

        let (_, code) = schema.rules.find("code").unwrap();
        let FieldRule::Described(rules) = code else {
            panic!("expected described rules");
        };
        assert_eq!(rules.title_text(), Some("Code"));
        assert_eq!(rules.message_at(0), Some("give us a code"));
        assert_eq!(rules.message_at(1), None);
    }

    #[test]
    fn test_scenes_and_messages() {
        let schema = Schema::from_json_str(DOC).unwrap();
        assert_eq!(
            schema.scenes["edit"].field_list(),
            Some(&["name".to_owned(), "age".to_owned()][..])
        );
        let delta = schema.scenes["signup"].resolve();
        assert!(delta.is_removed_entirely("age"));
        assert!(delta.removes("score", "gt"));
        assert_eq!(delta.appended("name"), &[RuleEntry::from("alphaDash")]);
        assert_eq!(schema.messages["name"].get("max"), Some("too long"));
        assert_eq!(schema.aliases["ge"], "egt");
    }

    #[test]
    fn test_positional_rules() {
        let schema = Schema::from_json_str(r#"{"rules": ["name", "age"]}"#).unwrap();
        assert_eq!(schema.rules.field_names(), ["name", "age"]);
        assert!(matches!(schema.rules.entries()[0], TableEntry::Name(_)));
    }

    #[test]
    fn test_invalid_rule_value() {
        let err = Schema::from_json_str(r#"{"rules": {"age": 5}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRule { ref field, .. } if field == "age"));

        let err = Schema::from_json_str(r#"{"rules": {"age": [5]}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRule { .. }));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let err = Schema::from_json_str(r#"{"rulez": {}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Json(_)));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_document() {
        let schema = Schema::from_toml_str(
            r#"
            [rules]
            "name|Name" = "require|max:25"
            age = ["number", { between = "1,120" }]

            [scenes]
            edit = ["name"]
            "#,
        )
        .unwrap();
        assert_eq!(schema.rules.field_names(), ["name", "age"]);
        assert!(schema.scenes.contains_key("edit"));
    }
}
