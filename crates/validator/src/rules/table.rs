//! Rule tables
//!
//! An ordered mapping from field keys to rules. A key may carry its title
//! after a pipe (`"age|Age"`); a key starting with `*.` addresses fields of
//! each record inside a list-of-records field.

use super::entry::FieldRule;

/// Prefix marking item-level keys in a nested table.
pub const ITEM_PREFIX: &str = "*.";

/// One row of a rule table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEntry {
    /// Key with its rule.
    Field {
        /// `field` or `field|Title`.
        key: String,
        /// The rule.
        rule: FieldRule,
    },
    /// Positional field name; its rule is looked up in the base table.
    Name(String),
}

impl TableEntry {
    /// The raw key, title suffix included.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Field { key, .. } | Self::Name(key) => key,
        }
    }

    /// The field name, without a title suffix.
    #[must_use]
    pub fn field(&self) -> &str {
        split_key(self.key()).0
    }
}

/// Splits `"field|Title"` into the field and its inline title.
#[must_use]
pub fn split_key(key: &str) -> (&str, Option<&str>) {
    match key.find('|') {
        Some(at) if at > 0 => (&key[..at], Some(&key[at + 1..])),
        _ => (key, None),
    }
}

/// Ordered rule table.
///
/// # Examples
///
/// ```rust,ignore
/// let table = RuleTable::new()
///     .field("name|Name", "require|max:25")
///     .field("age", "number|between:1,120");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTable {
    entries: Vec<TableEntry>,
}

impl RuleTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the rule for `key`.
    #[must_use = "builder methods must be chained or built"]
    pub fn field(mut self, key: impl Into<String>, rule: impl Into<FieldRule>) -> Self {
        self.insert(key, rule);
        self
    }

    /// Adds a positional field name resolved against the base table.
    #[must_use = "builder methods must be chained or built"]
    pub fn name(mut self, field: impl Into<String>) -> Self {
        self.entries.push(TableEntry::Name(field.into()));
        self
    }

    /// Adds or replaces the rule for `key` in place.
    pub fn insert(&mut self, key: impl Into<String>, rule: impl Into<FieldRule>) {
        let key = key.into();
        let rule = rule.into();
        let position = self
            .entries
            .iter()
            .position(|entry| matches!(entry, TableEntry::Field { key: k, .. } if *k == key));
        match position {
            Some(index) => self.entries[index] = TableEntry::Field { key, rule },
            None => self.entries.push(TableEntry::Field { key, rule }),
        }
    }

    /// Entries in order.
    #[must_use]
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the entry for `field`, matching either the raw key or the key
    /// without its title suffix. Returns the raw key and the rule.
    #[must_use]
    pub fn find(&self, field: &str) -> Option<(&str, &FieldRule)> {
        self.entries.iter().find_map(|entry| match entry {
            TableEntry::Field { key, rule } if key == field || split_key(key).0 == field => {
                Some((key.as_str(), rule))
            }
            _ => None,
        })
    }

    /// Returns true when some entry names `field`.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.entries.iter().any(|entry| entry.field() == field)
    }

    /// Field names in order, title suffixes removed.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.field().to_owned())
            .collect()
    }

    /// Copy of the table with the `*.` prefix stripped from every key.
    #[must_use]
    pub fn item_table(&self) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|entry| match entry {
                TableEntry::Field { key, rule } => TableEntry::Field {
                    key: key.strip_prefix(ITEM_PREFIX).unwrap_or(key).to_owned(),
                    rule: rule.clone(),
                },
                TableEntry::Name(name) => {
                    TableEntry::Name(name.strip_prefix(ITEM_PREFIX).unwrap_or(name).to_owned())
                }
            })
            .collect();
        Self { entries }
    }
}

impl<K, R> FromIterator<(K, R)> for RuleTable
where
    K: Into<String>,
    R: Into<FieldRule>,
{
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, rule) in iter {
            table.insert(key, rule);
        }
        table
    }
}

impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a TableEntry;
    type IntoIter = std::slice::Iter<'a, TableEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
