//! # vigil-validator
//!
//! Declarative, rule-table validation for keyed request data.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vigil_validator::prelude::*;
//! use serde_json::json;
//!
//! let validator = Validator::builder()
//!     .rule("name|Name", "require|max:25")
//!     .rule("age", "number|between:1,120")
//!     .rule("email", "require|email")
//!     .scene("edit", ["name", "age"])
//!     .build();
//!
//! let data = json!({"name": "Ada", "age": 36, "email": "ada@example.com"});
//! assert!(validator.check(&data, &CheckOptions::new())?.is_valid());
//! ```
//!
//! ## Rules
//!
//! A field's rule is a pipe chain (`"require|max:25"`), an ordered list of
//! positional and keyed steps, a closure, a [`Rules`](rules::Rules) chain
//! with its own title and messages, or a nested table whose `*.` keys
//! apply to every record of a list.
//!
//! ## Built-in Validators
//!
//! - **Requirement**: `require`, `must`, `requireIf`, `requireWith`,
//!   `requireWithout`, `requireCallback`
//! - **Comparison**: `gt`, `egt`, `lt`, `elt`, `eq`, `different`, `confirm`,
//!   `in`, `notIn`, `between`, `notBetween`
//! - **Length**: `length`, `min`, `max`
//! - **Format**: `email`, `url`, `ip`, `mac`, `number`, `integer`, `float`,
//!   `boolean`, `accepted`, `alpha`, `alphaNum`, `alphaDash`, `chs*`,
//!   `mobile`, `idCard`, `zip`, `regex`, `filter`, `dateFormat`
//! - **Date**: `date`, `after`, `before`, `afterWith`, `beforeWith`, `expire`
//! - **Collaborator-backed**: `unique`, `token`, `file`, `image`,
//!   `fileExt`, `fileMime`, `fileSize`, `activeUrl`
//!
//! Extensions registered on the [`Registry`] take precedence over every
//! built-in with the same tag.

pub mod collaborators;
mod engine;
pub mod foundation;
pub mod messages;
pub mod prelude;
pub mod registry;
pub mod rules;
pub mod scene;
pub mod schema;
pub mod validator;
pub mod validators;

pub use collaborators::Collaborators;
pub use foundation::{CheckOptions, ValidateOptions, ValidationError, Verdict};
pub use registry::Registry;
pub use schema::{Schema, SchemaError};
pub use validator::{Target, Validator, ValidatorBuilder};
