//! Built-in validators
//!
//! The closed set of primitive tags. Each variant of [`Builtin`] maps to a
//! function in one of the submodules:
//!
//! - **Comparison**: `gt`, `egt`, `lt`, `elt`, `eq`, `different`, `confirm`,
//!   `in`, `notIn`, `between`, `notBetween`
//! - **Length**: `length`, `min`, `max`
//! - **Date**: `after`, `before`, `afterWith`, `beforeWith`, `expire`, `dateFormat`
//! - **Network**: `ip`, `allowIp`, `denyIp`, `activeUrl`
//! - **Format**: `is`, `regex`, `filter`, `string`, `arrayHasOnlyInts`, `intOrArrayInt`
//! - **Requirement**: `must`, `requireIf`, `requireWith`, `requireWithout`, `requireCallback`
//! - **Files**: `fileExt`, `fileMime`, `fileSize`, `image`
//! - **Application state**: `unique`, `token`

pub mod compare;
pub mod date;
pub mod file;
pub mod format;
pub mod length;
pub mod network;
pub mod pattern;
pub mod require;
pub mod store;

use tracing::debug;

use crate::collaborators::Collaborators;
use crate::foundation::{CheckInput, CheckResult, Outcome, Scalar};
use crate::registry::{Registry, Resolved};

pub use pattern::PatternTable;

/// Everything a built-in may consult besides its input.
#[derive(Clone, Copy)]
pub struct Env<'v> {
    /// Extensions, conditions, aliases.
    pub registry: &'v Registry,
    /// Named patterns and the compiled-pattern cache.
    pub patterns: &'v PatternTable,
    /// External capabilities.
    pub collaborators: &'v Collaborators,
}

macro_rules! builtins {
    ($($variant:ident => $tag:literal),* $(,)?) => {
        /// Built-in primitive tags.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Builtin {
            $($variant),*
        }

        impl Builtin {
            /// Built-in for a canonical tag.
            #[must_use]
            pub fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $($tag => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// The tag.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag),*
                }
            }

            /// Every built-in.
            pub const ALL: &'static [Builtin] = &[$(Self::$variant),*];
        }
    };
}

builtins! {
    Must => "must",
    Is => "is",
    Gt => "gt",
    Egt => "egt",
    Lt => "lt",
    Elt => "elt",
    Eq => "eq",
    Different => "different",
    Confirm => "confirm",
    Confirmed => "confirmed",
    In => "in",
    NotIn => "notIn",
    Between => "between",
    NotBetween => "notBetween",
    Length => "length",
    Min => "min",
    Max => "max",
    After => "after",
    Before => "before",
    AfterWith => "afterWith",
    BeforeWith => "beforeWith",
    Expire => "expire",
    DateFormat => "dateFormat",
    Ip => "ip",
    AllowIp => "allowIp",
    DenyIp => "denyIp",
    ActiveUrl => "activeUrl",
    Regex => "regex",
    Filter => "filter",
    String => "string",
    ArrayHasOnlyInts => "arrayHasOnlyInts",
    IntOrArrayInt => "intOrArrayInt",
    RequireIf => "requireIf",
    RequireWith => "requireWith",
    RequireWithout => "requireWithout",
    RequireCallback => "requireCallback",
    FileExt => "fileExt",
    FileMime => "fileMime",
    FileSize => "fileSize",
    Image => "image",
    Unique => "unique",
    Token => "token",
}

impl Builtin {
    /// Runs the built-in.
    pub fn run(self, input: &CheckInput<'_>, env: &Env<'_>) -> CheckResult {
        let passed = match self {
            Self::Must => require::must(input),
            Self::Is => return format::is(input, &input.param.as_text(), env),
            Self::Gt => compare::gt(input),
            Self::Egt => compare::egt(input),
            Self::Lt => compare::lt(input),
            Self::Elt => compare::elt(input),
            Self::Eq => compare::eq(input),
            Self::Different => compare::different(input),
            Self::Confirm | Self::Confirmed => compare::confirm(input),
            Self::In => compare::in_list(input),
            Self::NotIn => compare::not_in_list(input),
            Self::Between => compare::between(input),
            Self::NotBetween => compare::not_between(input),
            Self::Length => length::length(input, env)?,
            Self::Min => length::min(input, env)?,
            Self::Max => length::max(input, env)?,
            Self::After => date::after(input),
            Self::Before => date::before(input),
            Self::AfterWith => date::after_with(input),
            Self::BeforeWith => date::before_with(input),
            Self::Expire => date::expire(input),
            Self::DateFormat => date::date_format(input),
            Self::Ip => network::ip(input),
            Self::AllowIp => network::allow_ip(input),
            Self::DenyIp => network::deny_ip(input),
            Self::ActiveUrl => network::active_url(input, env)?,
            Self::Regex => env
                .patterns
                .matches(&Scalar::from_value(input.value), &input.param.as_text()),
            Self::Filter => format::filter(input, env),
            Self::String => format::string(input.value),
            Self::ArrayHasOnlyInts => format::array_has_only_ints(input.value),
            Self::IntOrArrayInt => format::int_or_array_int(input.value),
            Self::RequireIf => require::require_if(input),
            Self::RequireWith => require::require_with(input),
            Self::RequireWithout => require::require_without(input),
            Self::RequireCallback => require::require_callback(input, env.registry),
            Self::FileExt => file::file_ext(input, env)?,
            Self::FileMime => file::file_mime(input, env)?,
            Self::FileSize => file::file_size(input, env)?,
            Self::Image => file::image(input, env)?,
            Self::Unique => store::unique(input, env)?,
            Self::Token => {
                let name = input.param.part(0).unwrap_or(store::DEFAULT_TOKEN);
                store::token(input, name, env)?
            }
        };
        Ok(Outcome::from(passed))
    }
}

/// Dispatches a tagged step: extension first, then built-in, then the
/// generic format check named after the tag.
pub fn dispatch(tag: &str, input: &CheckInput<'_>, env: &Env<'_>) -> CheckResult {
    match env.registry.resolve(tag) {
        Some(Resolved::Extension(check)) => check.check(input),
        Some(Resolved::Builtin(builtin)) => builtin.run(input, env),
        None => {
            let outcome = format::is(input, tag, env)?;
            if !outcome.is_pass() {
                debug!(tag, field = input.field, "tag failed as a format check");
            }
            Ok(outcome)
        }
    }
}
