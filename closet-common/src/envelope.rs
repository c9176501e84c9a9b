//! Recognition wire envelopes
//!
//! JSON payloads exchanged with the label-recognition worker over the
//! message channel. Field names are part of the wire contract; the worker
//! is not part of this repository.

use serde::{Deserialize, Serialize};

/// Outbound request: an item's label image, base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRequest {
    pub user: String,
    pub id: String,
    #[serde(rename = "raw-image")]
    pub raw_image: String,
}

/// Inbound response: the recognized label text for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelResponse {
    pub user: String,
    pub id: String,
    pub text: String,
}
