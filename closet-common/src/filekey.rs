//! Blob key derivation
//!
//! Every wardrobe item owns exactly two blobs in the content repository,
//! one per role. Keys are derived from (user, role, item id) so the same
//! item always maps to the same pair of keys, and a fresh item id yields
//! fresh keys.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Which of an item's two blobs a key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// The main garment photo
    Image,
    /// The care/brand label photo sent for recognition
    Label,
}

impl FileRole {
    fn as_str(self) -> &'static str {
        match self {
            FileRole::Image => "image",
            FileRole::Label => "label",
        }
    }
}

/// Derive the content-repository key for one of an item's blobs.
///
/// `hex(sha256(user + "_" + role + "_" + id))`, lowercase. The digest is a
/// content identifier, not a security boundary.
pub fn derive_file_key(user: &str, role: FileRole, id: Uuid) -> String {
    let hash = Sha256::digest(format!("{}_{}_{}", user, role.as_str(), id).as_bytes());
    format!("{:x}", hash)
}
