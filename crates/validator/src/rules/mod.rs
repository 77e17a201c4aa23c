//! Rule tables, rule entries and the rule parser
//!
//! - **Entries**: [`RuleEntry`], what a caller writes for one step
//! - **Field rules**: [`FieldRule`], a chain, closure, described chain or nested table
//! - **Tables**: [`RuleTable`], ordered field keys with their rules
//! - **Parsing**: [`Parser`] turns entries into [`RuleStep`]s

mod entry;
mod parser;
mod table;

pub use entry::{FieldRule, RuleEntry, Rules};
pub use parser::{FORMAT_TAG, Parser, RuleStep};
pub use table::{ITEM_PREFIX, RuleTable, TableEntry, split_key};
