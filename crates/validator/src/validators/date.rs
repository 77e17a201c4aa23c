//! Date validators
//!
//! Dates are parsed from the usual textual forms (ISO dates and datetimes,
//! slashed dates, RFC 2822/3339), the keywords `now`, `today`,
//! `tomorrow`, `yesterday`, and `@<unix seconds>`.

use chrono::format::{Parsed, StrftimeItems};
use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::foundation::{CheckInput, Scalar, lookup, parse_number};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y%m%d%H%M%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d"];

/// Parses a date or datetime; dates alone mean midnight.
#[must_use]
pub fn parse(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let now = Local::now().naive_local();
    match text.to_ascii_lowercase().as_str() {
        "now" => return Some(now),
        "today" => return Some(now.date().and_time(NaiveTime::MIN)),
        "tomorrow" => return now.date().checked_add_days(Days::new(1)).map(midnight),
        "yesterday" => return now.date().checked_sub_days(Days::new(1)).map(midnight),
        _ => {}
    }
    if let Some(seconds) = text.strip_prefix('@') {
        return from_timestamp(seconds);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(midnight)
        })
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn from_timestamp(seconds: &str) -> Option<NaiveDateTime> {
    let seconds = seconds.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(seconds, 0).map(|utc| utc.with_timezone(&Local).naive_local())
}

fn value_date(value: &Value) -> Option<NaiveDateTime> {
    match Scalar::from_value(value) {
        Scalar::Text(text) => parse(&text),
        _ => None,
    }
}

/// `date`: the value parses as a date.
pub fn is_date(value: &Value) -> bool {
    value_date(value).is_some()
}

/// `after:date`: not earlier than the given date.
pub fn after(input: &CheckInput<'_>) -> bool {
    match (value_date(input.value), parse(&input.param.as_text())) {
        (Some(value), Some(bound)) => value >= bound,
        _ => false,
    }
}

/// `before:date`: not later than the given date.
pub fn before(input: &CheckInput<'_>) -> bool {
    match (value_date(input.value), parse(&input.param.as_text())) {
        (Some(value), Some(bound)) => value <= bound,
        _ => false,
    }
}

fn other_date(input: &CheckInput<'_>) -> Option<NaiveDateTime> {
    let other = lookup(input.data, &input.param.as_text());
    if other.is_null() {
        return None;
    }
    value_date(other)
}

/// `afterWith:field`: not earlier than another field's date.
pub fn after_with(input: &CheckInput<'_>) -> bool {
    match (value_date(input.value), other_date(input)) {
        (Some(value), Some(bound)) => value >= bound,
        _ => false,
    }
}

/// `beforeWith:field`: not later than another field's date.
pub fn before_with(input: &CheckInput<'_>) -> bool {
    match (value_date(input.value), other_date(input)) {
        (Some(value), Some(bound)) => value <= bound,
        _ => false,
    }
}

fn bound(text: &str) -> Option<NaiveDateTime> {
    if parse_number(text).is_some() {
        return from_timestamp(text);
    }
    parse(text)
}

/// `expire:start,end`: the current time lies inside the window. Bounds are
/// dates or unix timestamps.
pub fn expire(input: &CheckInput<'_>) -> bool {
    let parts = input.param.parts();
    let (Some(start), Some(end)) = (parts.first(), parts.get(1)) else {
        return false;
    };
    let (Some(start), Some(end)) = (bound(start), bound(end)) else {
        return false;
    };
    let now = Local::now().naive_local();
    start <= now && now <= end
}

// ============================================================================
// DATE FORMAT
// ============================================================================

/// Translates a date-format string (`Y-m-d H:i:s` style) into chrono
/// strftime syntax.
#[must_use]
pub fn translate_format(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        let spec = match c {
            'd' | 'j' => "%d",
            'D' => "%a",
            'l' => "%A",
            'N' => "%u",
            'w' => "%w",
            'z' => "%j",
            'm' | 'n' => "%m",
            'M' => "%b",
            'F' => "%B",
            'y' => "%y",
            'Y' => "%Y",
            'a' | 'A' => "%p",
            'g' | 'h' => "%I",
            'G' | 'H' => "%H",
            'i' => "%M",
            's' => "%S",
            'v' => "%3f",
            'u' => "%6f",
            'O' | 'P' => "%z",
            'T' | 'e' => "%Z",
            'U' => "%s",
            '%' => "%%",
            '\\' => {
                if let Some(escaped) = chars.next() {
                    push_literal(&mut out, escaped);
                }
                continue;
            }
            other => {
                push_literal(&mut out, other);
                continue;
            }
        };
        out.push_str(spec);
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// `dateFormat:fmt`: the value matches the format exactly and names a real
/// date.
pub fn date_format(input: &CheckInput<'_>) -> bool {
    let Scalar::Text(text) = Scalar::from_value(input.value) else {
        return false;
    };
    let format = translate_format(&input.param.as_text());
    let mut parsed = Parsed::new();
    if chrono::format::parse(&mut parsed, &text, StrftimeItems::new(&format)).is_err() {
        return false;
    }
    match parsed.to_naive_date() {
        Ok(_) => true,
        Err(err) => err.kind() == chrono::format::ParseErrorKind::NotEnough,
    }
}
