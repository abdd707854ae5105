//! Self-describing blob encoding.
//!
//! A blob is a JSON envelope carrying a format version and the kind of
//! sequence it holds:
//!
//! ```json
//! { "version": 1, "kind": "pending_ratings", "items": [ ... ] }
//! ```
//!
//! A bare JSON array is the unversioned legacy layout. It is accepted as
//! version 0 and rewritten in the current format on the next write.

use super::StoreError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Current blob format version.
pub const BLOB_VERSION: u32 = 1;

/// Which sequence a blob holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    ReviewItems,
    PendingRatings,
}

impl BlobKind {
    fn as_str(self) -> &'static str {
        match self {
            BlobKind::ReviewItems => "review_items",
            BlobKind::PendingRatings => "pending_ratings",
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    kind: &'a str,
    items: &'a [T],
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: u32,
    kind: String,
    items: Vec<T>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnyBlob<T> {
    Envelope(Envelope<T>),
    Legacy(Vec<T>),
}

/// Encode `items` as a current-version blob of the given kind.
pub fn encode_blob<T: Serialize>(kind: BlobKind, items: &[T]) -> Result<Vec<u8>, StoreError> {
    let envelope = EnvelopeRef {
        version: BLOB_VERSION,
        kind: kind.as_str(),
        items,
    };
    serde_json::to_vec(&envelope).map_err(|e| StoreError::Encode(e.to_string()))
}

/// Decode a blob written by [`encode_blob`] or by the legacy layout.
pub fn decode_blob<T: DeserializeOwned>(kind: BlobKind, bytes: &[u8]) -> Result<Vec<T>, StoreError> {
    // Check the version before committing to an item shape, so a newer
    // format is reported as such instead of as a parse failure.
    let raw: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| StoreError::Decode(e.to_string()))?;
    if let Some(version) = raw.get("version").and_then(|v| v.as_u64()) {
        if version != u64::from(BLOB_VERSION) {
            return Err(StoreError::UnsupportedVersion(
                u32::try_from(version).unwrap_or(u32::MAX),
            ));
        }
    }

    match serde_json::from_value::<AnyBlob<T>>(raw) {
        Ok(AnyBlob::Envelope(envelope)) => {
            if envelope.kind != kind.as_str() {
                return Err(StoreError::WrongKind {
                    expected: kind.as_str().to_string(),
                    found: envelope.kind,
                });
            }
            debug_assert_eq!(envelope.version, BLOB_VERSION);
            Ok(envelope.items)
        }
        Ok(AnyBlob::Legacy(items)) => {
            info!(
                "Migrating legacy {} blob ({} entries)",
                kind.as_str(),
                items.len()
            );
            Ok(items)
        }
        Err(e) => Err(StoreError::Decode(e.to_string())),
    }
}
