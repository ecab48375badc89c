//! Registrar data types
//!
//! Records are kept exactly as the registrar returned them so the backup
//! snapshot can be replayed by hand. Fields are only interpreted through the
//! accessors below, which tolerate missing or oddly typed values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// TTL used when a record carries none
pub const DEFAULT_TTL: u32 = 3600;

/// Status value the registrar reports for a successful call
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Status recorded when the registrar response has no `status` field
pub const STATUS_UNKNOWN: &str = "UNKNOWN";

/// A DNS record as returned by the registrar
///
/// Serializes back to the exact JSON the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DnsRecord(Value);

impl DnsRecord {
    /// Wrap a raw JSON value
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// Full host name of the record (empty if absent)
    pub fn name(&self) -> &str {
        self.str_field("name")
    }

    /// Record type, e.g. `A` or `MX` (empty if absent)
    pub fn record_type(&self) -> &str {
        self.str_field("type")
    }

    /// Record value, typically an address for `A` records (empty if absent)
    pub fn value(&self) -> &str {
        self.str_field("value")
    }

    /// Time-to-live in seconds
    ///
    /// Accepts numbers and numeric strings; anything else yields [`DEFAULT_TTL`].
    pub fn ttl(&self) -> u32 {
        match self.0.get("ttl") {
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(DEFAULT_TTL),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(DEFAULT_TTL),
            _ => DEFAULT_TTL,
        }
    }

    /// Whether this is an `A` record pointing at exactly `ip`
    ///
    /// Plain string equality: no normalization, no case folding.
    pub fn is_a_record_for(&self, ip: &str) -> bool {
        self.record_type() == "A" && self.value() == ip
    }

    /// The raw JSON value
    pub fn raw(&self) -> &Value {
        &self.0
    }

    fn str_field(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or("")
    }
}

impl From<Value> for DnsRecord {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}

/// Outcome reported by a mutating registrar call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    /// Server status string (`SUCCESS`, `FAILURE`, ...)
    pub status: String,
    /// Server message, possibly empty
    pub message: String,
}

impl ApiStatus {
    /// Build a status from explicit parts
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Extract `status` / `message` from a response object
    ///
    /// Missing fields fall back to `UNKNOWN` and an empty message.
    pub fn from_response(response: &serde_json::Map<String, Value>) -> Self {
        let field = |key: &str| response.get(key).and_then(Value::as_str).map(str::to_owned);
        Self {
            status: field("status").unwrap_or_else(|| STATUS_UNKNOWN.to_string()),
            message: field("message").unwrap_or_default(),
        }
    }

    /// Status for a call whose response never arrived or could not be read
    pub fn unknown() -> Self {
        Self::new(STATUS_UNKNOWN, "")
    }

    /// Whether the registrar reported success
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}
