//! Default English messages, one per rule tag

use indexmap::IndexMap;

use super::template::Template;

/// Tag used for the message of a nested field whose value is not a list of
/// records.
pub const NESTED_TAG: &str = "nested";

const DEFAULTS: &[(&str, &str)] = &[
    ("must", ":attribute must be provided"),
    ("require", ":attribute is required"),
    ("mobile", ":attribute is not a valid mobile number"),
    ("token", "invalid token"),
    ("number", ":attribute must be numeric"),
    ("integer", ":attribute must be an integer"),
    ("float", ":attribute must be a float"),
    ("boolean", ":attribute must be a boolean"),
    ("email", ":attribute is not a valid email address"),
    ("array", ":attribute must be an array"),
    ("accepted", ":attribute must be yes, on or 1"),
    ("date", ":attribute is not a valid date"),
    ("file", ":attribute is not a valid uploaded file"),
    ("image", ":attribute is not a valid image"),
    ("alpha", ":attribute may only contain letters"),
    ("alphaNum", ":attribute may only contain letters and digits"),
    ("alphaDash", ":attribute may only contain letters, digits, underscores and dashes"),
    ("activeUrl", ":attribute is not a resolvable domain"),
    ("chs", ":attribute may only contain Chinese characters"),
    ("chsAlpha", ":attribute may only contain Chinese characters and letters"),
    ("chsAlphaNum", ":attribute may only contain Chinese characters, letters and digits"),
    ("chsDash", ":attribute may only contain Chinese characters, letters, digits, underscores and dashes"),
    ("url", ":attribute is not a valid URL"),
    ("ip", ":attribute is not a valid IP address"),
    ("dateFormat", ":attribute must match the date format :rule"),
    ("in", ":attribute must be one of :rule"),
    ("notIn", ":attribute must not be one of :rule"),
    ("between", ":attribute must be between :1 and :2"),
    ("notBetween", ":attribute must not be between :1 and :2"),
    ("length", ":attribute length does not match :rule"),
    ("max", ":attribute length must not exceed :rule"),
    ("min", ":attribute length must be at least :rule"),
    ("after", ":attribute must not be earlier than :rule"),
    ("before", ":attribute must not be later than :rule"),
    ("afterWith", ":attribute must not be earlier than :rule"),
    ("beforeWith", ":attribute must not be later than :rule"),
    ("expire", "not within the validity period :rule"),
    ("allowIp", "access from this IP is not allowed"),
    ("denyIp", "access from this IP is denied"),
    ("confirm", ":attribute does not match its confirmation :rule"),
    ("confirmed", ":attribute does not match its confirmation :rule"),
    ("different", ":attribute must differ from :rule"),
    ("egt", ":attribute must be greater than or equal to :rule"),
    ("gt", ":attribute must be greater than :rule"),
    ("elt", ":attribute must be less than or equal to :rule"),
    ("lt", ":attribute must be less than :rule"),
    ("eq", ":attribute must be equal to :rule"),
    ("regex", ":attribute does not match the required pattern"),
    ("filter", ":attribute is not valid"),
    ("fileSize", "uploaded file size is not allowed"),
    ("fileExt", "uploaded file extension is not allowed"),
    ("fileMime", "uploaded file type is not allowed"),
    ("unique", ":attribute already exists"),
    ("arrayHasOnlyInts", ":attribute may only be a list of integers"),
    ("intOrArrayInt", ":attribute must be an integer or a list of integers"),
    ("string", ":attribute must be a string"),
    (NESTED_TAG, ":attribute must be a list of records"),
];

/// The built-in message table.
#[must_use]
pub fn default_messages() -> IndexMap<String, Template> {
    DEFAULTS
        .iter()
        .map(|(tag, text)| ((*tag).to_owned(), Template::from(*text)))
        .collect()
}
