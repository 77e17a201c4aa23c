//! Prelude module for convenient imports.
//!
//! Provides a single `use vigil_validator::prelude::*;` import that brings
//! in the validator, rule builders, options, results and the extension
//! traits.
//!
//! # Examples
//!
//! ```rust,ignore
//! use vigil_validator::prelude::*;
//!
//! let validator = Validator::builder()
//!     .rule("age", Rules::new().rule("require").message("age please").keyed("egt", 18))
//!     .build();
//! ```

// ============================================================================
// FOUNDATION: Values, checks, results
// ============================================================================

pub use crate::foundation::{
    Check, CheckInput, CheckOptions, CheckResult, CollaboratorError, FieldError, FieldErrors,
    Message, Outcome, Param, ValidateOptions, ValidationError, Verdict,
};

// ============================================================================
// RULES: Tables, chains, scenes
// ============================================================================

pub use crate::rules::{FieldRule, RuleEntry, RuleTable, Rules};
pub use crate::scene::{Scene, SceneDelta};

// ============================================================================
// CONFIGURATION: Validator, registry, schema
// ============================================================================

pub use crate::messages::Template;
pub use crate::registry::Registry;
pub use crate::schema::{Schema, SchemaError};
pub use crate::validator::{Target, Validator, ValidatorBuilder};

// ============================================================================
// COLLABORATORS: External capabilities
// ============================================================================

pub use crate::collaborators::{
    Collaborators, DnsResolver, FileInspector, FileMeta, ImageInfo, ImageKind, InlineFiles,
    RecordType, RowCounter, SystemResolver, TextCatalog, TokenChecker, UniqueQuery,
};
