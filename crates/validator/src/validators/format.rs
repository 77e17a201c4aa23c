//! Format checks
//!
//! A rule that is neither a built-in tag nor a registered extension is a
//! format name: `email`, `boolean`, `alphaNum`, `chsDash`, a caller pattern
//! name, or a literal pattern. [`is`] resolves it in this order:
//!
//! 1. fixed formats (`require`, `accepted`, `date`, `boolean`, `number`, ...)
//! 2. an extension registered under the exact name
//! 3. character classes (`alpha`, `digit`, `xdigit`, ...)
//! 4. filters (`email`, `ip`, `integer`, `url`, `macAddr`, `float`)
//! 5. patterns: caller table, built-in table, or the name itself

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::foundation::{CheckInput, CheckResult, Outcome, Param, Scalar, is_blank, parse_number};

use super::network::{IpFamily, is_ip};
use super::{Env, date, file, network, store};
use crate::collaborators::RecordType;

// ============================================================================
// REGEXES
// ============================================================================

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email regex is valid")
});

static MAC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[0-9A-Fa-f]{2}(?:[:-][0-9A-Fa-f]{2}){5}|[0-9A-Fa-f]{4}\.[0-9A-Fa-f]{4}\.[0-9A-Fa-f]{4})$",
    )
    .expect("mac regex is valid")
});

// ============================================================================
// NAME NORMALIZATION
// ============================================================================

/// `alpha_num` / `alpha-num` → `alphaNum`.
#[must_use]
pub fn camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' || c == '-' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ============================================================================
// CHARACTER CLASSES
// ============================================================================

/// Character classes tested over every character of the value's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Alnum,
    Alpha,
    Cntrl,
    Digit,
    Graph,
    Lower,
    Print,
    Punct,
    Space,
    Upper,
    Xdigit,
}

impl CharClass {
    /// Class named `name`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "alnum" => Self::Alnum,
            "alpha" => Self::Alpha,
            "cntrl" => Self::Cntrl,
            "digit" => Self::Digit,
            "graph" => Self::Graph,
            "lower" => Self::Lower,
            "print" => Self::Print,
            "punct" => Self::Punct,
            "space" => Self::Space,
            "upper" => Self::Upper,
            "xdigit" => Self::Xdigit,
            _ => return None,
        })
    }

    fn accepts(self, c: char) -> bool {
        match self {
            Self::Alnum => c.is_ascii_alphanumeric(),
            Self::Alpha => c.is_ascii_alphabetic(),
            Self::Cntrl => c.is_ascii_control(),
            Self::Digit => c.is_ascii_digit(),
            Self::Graph => c.is_ascii_graphic(),
            Self::Lower => c.is_ascii_lowercase(),
            Self::Print => c.is_ascii_graphic() || c == ' ',
            Self::Punct => c.is_ascii_punctuation(),
            Self::Space => c.is_ascii_whitespace() || c == '\x0b',
            Self::Upper => c.is_ascii_uppercase(),
            Self::Xdigit => c.is_ascii_hexdigit(),
        }
    }

    /// Returns true when the text is non-empty and every character belongs
    /// to the class.
    #[must_use]
    pub fn matches(self, text: &str) -> bool {
        !text.is_empty() && text.chars().all(|c| self.accepts(c))
    }
}

// ============================================================================
// FILTERS
// ============================================================================

/// Built-in input filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Email,
    Ip,
    Integer,
    Url,
    Mac,
    Float,
}

impl Filter {
    /// Filter named `name`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "email" | "validate_email" => Self::Email,
            "ip" | "validate_ip" => Self::Ip,
            "integer" | "int" | "validate_int" => Self::Integer,
            "url" | "validate_url" => Self::Url,
            "macAddr" | "mac" | "validate_mac" => Self::Mac,
            "float" | "validate_float" => Self::Float,
            _ => return None,
        })
    }

    /// Applies the filter. `flag` refines it; only `ip` reads one
    /// (`ipv4` / `ipv6`).
    #[must_use]
    pub fn accepts(self, value: &Value, flag: Option<&str>) -> bool {
        let Some(text) = Scalar::from_value(value).as_text() else {
            return false;
        };
        let text = text.as_ref();
        match self {
            Self::Email => EMAIL_REGEX.is_match(text),
            Self::Ip => is_ip(text, flag.map_or(IpFamily::Any, IpFamily::parse)),
            Self::Integer => is_integer(text.trim()),
            Self::Url => is_url(text),
            Self::Mac => MAC_REGEX.is_match(text),
            Self::Float => is_float(text.trim()),
        }
    }
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return false;
    }
    text.parse::<i64>().is_ok()
}

fn is_float(text: &str) -> bool {
    !text.is_empty()
        && text.bytes().any(|b| b.is_ascii_digit())
        && !text.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
        && text.parse::<f64>().is_ok_and(f64::is_finite)
}

fn is_url(text: &str) -> bool {
    match url::Url::parse(text) {
        Ok(url) => url.has_host() || matches!(url.scheme(), "mailto" | "news" | "file"),
        Err(_) => false,
    }
}

/// `filter:name[,flag]`.
pub fn filter(input: &CheckInput<'_>, env: &Env<'_>) -> bool {
    let Some(name) = input.param.part(0) else {
        return false;
    };
    match Filter::from_name(name) {
        Some(filter) => filter.accepts(input.value, input.param.part(1)),
        None => env.patterns.matches(&Scalar::from_value(input.value), name),
    }
}

// ============================================================================
// FIXED FORMATS
// ============================================================================

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Array(_) | Value::Object(_) => None,
        other => Scalar::from_value(other).as_text().map(|t| t.into_owned()),
    }
}

/// `accepted`: `1`, `on` or `yes`.
pub fn accepted(value: &Value) -> bool {
    text_of(value).is_some_and(|t| matches!(t.as_str(), "1" | "on" | "yes"))
}

/// `boolean`: `true`, `false`, `0`, `1`, `"0"` or `"1"`.
pub fn boolean(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Number(n) => n.as_i64().is_some_and(|n| n == 0 || n == 1),
        Value::String(s) => s == "0" || s == "1",
        _ => false,
    }
}

/// `number`: only decimal digits.
pub fn number(value: &Value) -> bool {
    match value {
        Value::Bool(_) => false,
        other => text_of(other).is_some_and(|t| CharClass::Digit.matches(&t)),
    }
}

/// `array`: a list or a keyed object.
pub fn array(value: &Value) -> bool {
    value.is_array() || value.is_object()
}

/// `string`: a JSON string.
pub fn string(value: &Value) -> bool {
    value.is_string()
}

/// `arrayHasOnlyInts`: a list whose items are all numeric.
pub fn array_has_only_ints(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().all(is_numeric))
}

/// `intOrArrayInt`: a numeric scalar, or a list of numerics.
pub fn int_or_array_int(value: &Value) -> bool {
    is_numeric(value) || array_has_only_ints(value)
}

/// A JSON number or numeric text.
fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(text) => parse_number(text).is_some(),
        _ => false,
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// The generic format check.
pub fn is(input: &CheckInput<'_>, rule: &str, env: &Env<'_>) -> CheckResult {
    let value = input.value;
    let normalized = camel(rule);
    let passed = match normalized.as_str() {
        "require" | "required" => !is_blank(value),
        "accepted" => accepted(value),
        "date" => date::is_date(value),
        "activeUrl" => network::check_host(value, RecordType::Mx, env)?,
        "boolean" | "bool" => boolean(value),
        "number" => number(value),
        "alphaNum" => text_of(value).is_some_and(|t| CharClass::Alnum.matches(&t)),
        "array" => array(value),
        "string" => string(value),
        "file" => file::inspect(value, env)?.is_some(),
        "image" => file::is_common_image(value, env)?,
        "token" => store::token(input, store::DEFAULT_TOKEN, env)?,
        name => {
            let extension = env
                .registry
                .extension(rule)
                .or_else(|| env.registry.extension(name));
            if let Some(check) = extension {
                let empty = Param::Empty;
                return check.check(&input.with_param(&empty));
            }
            if let Some(class) = CharClass::from_name(name) {
                text_of(value).is_some_and(|t| class.matches(&t))
            } else if let Some(filter) = Filter::from_name(name) {
                filter.accepts(value, None)
            } else {
                env.patterns.matches(&Scalar::from_value(value), rule)
            }
        }
    };
    Ok(Outcome::from(passed))
}
