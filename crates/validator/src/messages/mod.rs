//! Failure messages
//!
//! Default per-tag messages, caller overrides, placeholder substitution and
//! `{%key}` references into an external text catalog.

mod catalog;
mod defaults;
mod template;

pub use catalog::MessageCatalog;
pub use defaults::{NESTED_TAG, default_messages};
pub use template::{Template, catalog_key, substitute, substitute_soft};
