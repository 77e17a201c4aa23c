//! Network validators: IP addresses, IP allow/deny lists, resolvable hosts

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use serde_json::Value;
use tracing::warn;

use crate::collaborators::RecordType;
use crate::foundation::{CheckInput, CollaboratorError, Scalar};

use super::Env;
use super::compare::contains;

/// IP address families accepted by `ip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    V4,
    V6,
    Any,
}

impl IpFamily {
    /// Parses `ipv4` / `ipv6`; anything else accepts both.
    #[must_use]
    pub fn parse(flag: &str) -> Self {
        match flag.trim().to_ascii_lowercase().as_str() {
            "ipv4" | "v4" | "4" => Self::V4,
            "ipv6" | "v6" | "6" => Self::V6,
            _ => Self::Any,
        }
    }
}

/// Returns true when `text` is an address of the given family.
#[must_use]
pub fn is_ip(text: &str, family: IpFamily) -> bool {
    match family {
        IpFamily::V4 => text.parse::<Ipv4Addr>().is_ok(),
        IpFamily::V6 => text.parse::<Ipv6Addr>().is_ok(),
        IpFamily::Any => text.parse::<IpAddr>().is_ok(),
    }
}

fn value_text(value: &Value) -> Option<String> {
    match Scalar::from_value(value) {
        Scalar::Text(text) => Some(text.into_owned()),
        _ => None,
    }
}

/// `ip` / `ip:ipv4` / `ip:ipv6`.
pub fn ip(input: &CheckInput<'_>) -> bool {
    let family = input.param.part(0).map_or(IpFamily::Any, IpFamily::parse);
    value_text(input.value).is_some_and(|text| is_ip(&text, family))
}

/// `allowIp:a,b`: the value is one of the listed addresses.
pub fn allow_ip(input: &CheckInput<'_>) -> bool {
    contains(input.value, input.param.parts())
}

/// `denyIp:a,b`: the value is none of the listed addresses.
pub fn deny_ip(input: &CheckInput<'_>) -> bool {
    !contains(input.value, input.param.parts())
}

/// `activeUrl[:RECORD]`: the host has a DNS record (MX by default).
pub fn active_url(input: &CheckInput<'_>, env: &Env<'_>) -> Result<bool, CollaboratorError> {
    let record = input
        .param
        .part(0)
        .and_then(RecordType::parse)
        .unwrap_or(RecordType::Mx);
    check_host(input.value, record, env)
}

pub(crate) fn check_host(
    value: &Value,
    record: RecordType,
    env: &Env<'_>,
) -> Result<bool, CollaboratorError> {
    let Some(host) = value_text(value) else {
        return Ok(false);
    };
    let Some(dns) = env.collaborators.dns() else {
        warn!(host = %host, "activeUrl needs a DNS resolver but none is configured");
        return Ok(false);
    };
    dns.has_record(&host, record)
}
