//! Core validation types
//!
//! The building blocks every other module works with:
//!
//! - **Values**: [`Scalar`], dotted-path [`lookup`], emptiness tests
//! - **Parameters**: [`Param`], the argument of a rule step
//! - **Checks**: the [`Check`] trait, [`CheckInput`], [`Outcome`]
//! - **Errors**: [`FieldError`], [`FieldErrors`], [`Verdict`], [`ValidationError`]
//! - **Context**: per-call options and the immutable [`ValidationContext`]
//!
//! # Examples
//!
//! ```rust,ignore
//! use vigil_validator::foundation::{Scalar, lookup};
//! use serde_json::json;
//!
//! let data = json!({"user": {"age": "42"}});
//! let age = Scalar::from_value(lookup(&data, "user.age"));
//! assert_eq!(age.as_number(), Some(42.0));
//! ```

pub mod context;
pub mod error;
pub mod param;
pub mod traits;
pub mod value;

pub use context::{CheckOptions, ValidateOptions, ValidationContext, ValidationContextBuilder};
pub use error::{
    Capability, CollaboratorError, FieldError, FieldErrors, Message, ValidationError, Verdict,
};
pub use param::Param;
pub use traits::{Check, CheckInput, CheckResult, Outcome, RuleFn, SharedCheck};
pub use value::{
    Scalar, is_absent, is_blank, is_empty, lookup, operand, parse_number, render_number,
};
