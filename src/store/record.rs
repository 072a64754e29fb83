//! Record structure for stored builds

use crate::clock;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open map of caller-supplied build fields
pub type Payload = Map<String, Value>;

/// Constant tag stamped on every record
pub const RECORD_KIND: &str = "wow-talent-build";

/// Keys a payload must carry to be accepted
pub const REQUIRED_FIELDS: [&str; 5] = [
    "name",
    "className",
    "assignedPoints",
    "totalPoints",
    "availablePoints",
];

/// Keys owned by the store, stripped from incoming payloads
const RESERVED_FIELDS: [&str; 6] = [
    "id",
    "originalId",
    "timestamp",
    "createdAt",
    "expiresAt",
    "kind",
];

/// A single stored build
///
/// Serialized flat: the store metadata sits next to the payload fields in
/// one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Identifier assigned by the store
    pub id: String,

    /// Identifier the caller sent, kept as an opaque value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<Value>,

    /// Creation instant, RFC 3339
    #[serde(default)]
    pub timestamp: String,

    /// Creation instant, epoch milliseconds
    pub created_at: i64,

    /// `created_at` plus the record lifetime
    pub expires_at: i64,

    /// Older files carry no tag, those records get the current one
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Everything else the caller sent
    #[serde(flatten)]
    pub payload: Payload,
}

impl Record {
    /// Build a record from a validated payload
    ///
    /// Reserved keys are removed from the payload; a non-null caller `id`
    /// survives as `original_id`.
    pub fn new(id: impl Into<String>, mut payload: Payload, now: i64, lifetime_ms: i64) -> Self {
        let original_id = payload.remove("id").filter(|v| !v.is_null());

        for key in RESERVED_FIELDS {
            payload.remove(key);
        }

        Record {
            id: id.into(),
            original_id,
            timestamp: clock::to_iso(now),
            created_at: now,
            expires_at: now.saturating_add(lifetime_ms),
            kind: RECORD_KIND.to_string(),
            payload,
        }
    }

    /// Age of the record in milliseconds
    pub fn age(&self, now: i64) -> i64 {
        now.saturating_sub(self.created_at)
    }

    /// Check if the record has outlived the given lifetime
    pub fn is_expired(&self, now: i64, lifetime_ms: i64) -> bool {
        self.age(now) >= lifetime_ms
    }

    /// Milliseconds until `expires_at`, negative once past it
    pub fn time_left(&self, now: i64) -> i64 {
        self.expires_at.saturating_sub(now)
    }
}

fn default_kind() -> String {
    RECORD_KIND.to_string()
}

/// Check that a payload is non-empty and carries every required key
///
/// Only presence is checked; a key mapped to `null` counts as present.
pub fn validate(payload: &Payload) -> Result<(), ValidationError> {
    if payload.is_empty() {
        return Err(ValidationError::EmptyPayload);
    }

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !payload.contains_key(**field))
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}
