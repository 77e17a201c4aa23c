//! External capabilities
//!
//! Some rules cannot be answered from the data alone: `unique` needs a
//! record store, file rules need to look at uploads, `token` needs the
//! session, `activeUrl` needs DNS and `{%key}` messages need a localized
//! catalog. Each capability is a trait; a [`Collaborators`] bundle holds the
//! ones an application provides. A rule whose collaborator is missing fails
//! and logs a warning.

use std::fmt;
use std::net::ToSocketAddrs;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::foundation::CollaboratorError;

// ============================================================================
// UNIQUE QUERY
// ============================================================================

/// Query handed to the record store by `unique`.
///
/// The store must count rows of `table` where every condition holds and,
/// when `exclude` is set, whose `exclude.0` column differs from `exclude.1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniqueQuery {
    /// Table (or collection) name.
    pub table: String,
    /// `column = value` conditions.
    pub conditions: Vec<(String, Value)>,
    /// `column != value` exclusion, usually the record's own primary key.
    pub exclude: Option<(String, Value)>,
}

/// Counts conflicting records for `unique`.
pub trait RowCounter: Send + Sync {
    /// Number of rows matching the query.
    fn count(&self, query: &UniqueQuery) -> Result<u64, CollaboratorError>;
}

// ============================================================================
// FILES
// ============================================================================

/// Image kinds recognized by `image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Gif,
    Jpeg,
    Png,
    Bmp,
    Webp,
    /// Anything else, by extension.
    #[serde(untagged)]
    Other(String),
}

impl ImageKind {
    /// Canonical extension (`jpeg` for JPEG).
    #[must_use]
    pub fn extension(&self) -> &str {
        match self {
            Self::Gif => "gif",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Webp => "webp",
            Self::Other(ext) => ext,
        }
    }

    /// Kinds accepted by a bare `image` rule.
    #[must_use]
    pub fn is_common(&self) -> bool {
        matches!(self, Self::Gif | Self::Jpeg | Self::Png | Self::Bmp)
    }
}

/// Decoded image header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub kind: ImageKind,
}

/// What the file inspector knows about an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Extension without the dot.
    pub extension: String,
    /// MIME type.
    pub mime: String,
    /// Size in bytes.
    pub size: u64,
    /// Image header, when the file is an image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInfo>,
}

/// Recognizes uploaded-file handles in the input data.
///
/// Returns `Ok(None)` when the value is not a file.
pub trait FileInspector: Send + Sync {
    /// Inspects a value that may be a file handle.
    fn inspect(&self, handle: &Value) -> Result<Option<FileMeta>, CollaboratorError>;
}

/// Treats objects shaped like [`FileMeta`] as file handles.
///
/// Useful when an upstream layer already stored upload metadata in the
/// request data.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineFiles;

impl FileInspector for InlineFiles {
    fn inspect(&self, handle: &Value) -> Result<Option<FileMeta>, CollaboratorError> {
        if !handle.is_object() {
            return Ok(None);
        }
        Ok(serde_json::from_value(handle.clone()).ok())
    }
}

// ============================================================================
// TOKENS, TEXT, DNS
// ============================================================================

/// Verifies request tokens for `token`.
pub trait TokenChecker: Send + Sync {
    /// Returns true when the token stored under `name` in `data` is valid.
    fn verify(&self, name: &str, data: &Value) -> Result<bool, CollaboratorError>;
}

/// Resolves `{%key}` message references.
pub trait TextCatalog: Send + Sync {
    /// Localized text for `key`.
    fn lookup(&self, key: &str) -> Result<String, CollaboratorError>;
}

/// DNS record types `activeUrl` can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Mx,
    Ns,
    Soa,
    Ptr,
    Cname,
    Aaaa,
    A6,
    Srv,
    Naptr,
    Txt,
    Any,
}

impl RecordType {
    /// Parses a record name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name.to_ascii_uppercase().as_str() {
            "A" => Self::A,
            "MX" => Self::Mx,
            "NS" => Self::Ns,
            "SOA" => Self::Soa,
            "PTR" => Self::Ptr,
            "CNAME" => Self::Cname,
            "AAAA" => Self::Aaaa,
            "A6" => Self::A6,
            "SRV" => Self::Srv,
            "NAPTR" => Self::Naptr,
            "TXT" => Self::Txt,
            "ANY" => Self::Any,
            _ => return None,
        })
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::A => "A",
            Self::Mx => "MX",
            Self::Ns => "NS",
            Self::Soa => "SOA",
            Self::Ptr => "PTR",
            Self::Cname => "CNAME",
            Self::Aaaa => "AAAA",
            Self::A6 => "A6",
            Self::Srv => "SRV",
            Self::Naptr => "NAPTR",
            Self::Txt => "TXT",
            Self::Any => "ANY",
        })
    }
}

/// Answers whether a host has a DNS record of a given type.
pub trait DnsResolver: Send + Sync {
    /// Returns true when `host` has at least one `record`.
    fn has_record(&self, host: &str, record: RecordType) -> Result<bool, CollaboratorError>;
}

/// Resolver backed by the operating system.
///
/// Only address records can be answered this way: `A`, `AAAA` and `ANY`.
/// Other record types report `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl DnsResolver for SystemResolver {
    fn has_record(&self, host: &str, record: RecordType) -> Result<bool, CollaboratorError> {
        let wants: fn(&std::net::SocketAddr) -> bool = match record {
            RecordType::A => std::net::SocketAddr::is_ipv4,
            RecordType::Aaaa => std::net::SocketAddr::is_ipv6,
            RecordType::Any => |_| true,
            other => {
                debug!(%other, "system resolver only answers address records");
                return Ok(false);
            }
        };
        match (host, 0).to_socket_addrs() {
            Ok(mut addrs) => Ok(addrs.any(|addr| wants(&addr))),
            Err(err) => {
                debug!(host, error = %err, "host did not resolve");
                Ok(false)
            }
        }
    }
}

// ============================================================================
// BUNDLE
// ============================================================================

/// The collaborators available to a validator.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub(crate) store: Option<Arc<dyn RowCounter>>,
    pub(crate) files: Option<Arc<dyn FileInspector>>,
    pub(crate) tokens: Option<Arc<dyn TokenChecker>>,
    pub(crate) catalog: Option<Arc<dyn TextCatalog>>,
    pub(crate) dns: Option<Arc<dyn DnsResolver>>,
}

impl Collaborators {
    /// No collaborators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the record store.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_store(mut self, store: impl RowCounter + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Sets the file inspector.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_files(mut self, files: impl FileInspector + 'static) -> Self {
        self.files = Some(Arc::new(files));
        self
    }

    /// Sets the token checker.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_tokens(mut self, tokens: impl TokenChecker + 'static) -> Self {
        self.tokens = Some(Arc::new(tokens));
        self
    }

    /// Sets the text catalog.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_catalog(mut self, catalog: impl TextCatalog + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    /// Sets the DNS resolver.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_dns(mut self, dns: impl DnsResolver + 'static) -> Self {
        self.dns = Some(Arc::new(dns));
        self
    }

    /// The record store.
    #[must_use]
    pub fn store(&self) -> Option<&dyn RowCounter> {
        self.store.as_deref()
    }

    /// The file inspector.
    #[must_use]
    pub fn files(&self) -> Option<&dyn FileInspector> {
        self.files.as_deref()
    }

    /// The token checker.
    #[must_use]
    pub fn tokens(&self) -> Option<&dyn TokenChecker> {
        self.tokens.as_deref()
    }

    /// The text catalog.
    #[must_use]
    pub fn catalog(&self) -> Option<&dyn TextCatalog> {
        self.catalog.as_deref()
    }

    /// The DNS resolver.
    #[must_use]
    pub fn dns(&self) -> Option<&dyn DnsResolver> {
        self.dns.as_deref()
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("store", &self.store.is_some())
            .field("files", &self.files.is_some())
            .field("tokens", &self.tokens.is_some())
            .field("catalog", &self.catalog.is_some())
            .field("dns", &self.dns.is_some())
            .finish()
    }
}
