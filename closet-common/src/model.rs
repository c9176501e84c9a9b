//! Closet document model
//!
//! One closet per user, persisted as a single JSON document. The wardrobe
//! and outfit sequences keep insertion order; readers see them in the order
//! the entries were added.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One clothing entry with its two backing blobs.
///
/// `label_text` starts empty and is only ever filled in by the recognition
/// response path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardrobeItem {
    pub id: Uuid,
    pub main_file: String,
    pub label_file: String,
    pub description: String,
    #[serde(default)]
    pub label_text: Option<String>,
}

/// A paired top/bottom reference with like/dislike counters.
///
/// The top/bottom ids are stored as given; they are not validated against
/// the wardrobe sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outfit {
    pub id: Uuid,
    pub top_id: Uuid,
    pub bottom_id: Uuid,
    pub description: String,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub dislike_count: u32,
}

/// The full closet document for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Closet {
    pub user: String,
    #[serde(default)]
    pub wardrobes: Vec<WardrobeItem>,
    #[serde(default)]
    pub outfits: Vec<Outfit>,
}

impl Closet {
    /// Empty closet for a user that has no persisted document yet.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            wardrobes: Vec::new(),
            outfits: Vec::new(),
        }
    }

    pub fn find_wardrobe(&self, id: Uuid) -> Option<&WardrobeItem> {
        self.wardrobes.iter().find(|w| w.id == id)
    }

    pub fn find_outfit(&self, id: Uuid) -> Option<&Outfit> {
        self.outfits.iter().find(|o| o.id == id)
    }
}

/// Read projection of a wardrobe item.
///
/// Carries the blob keys, not the blob bytes; callers fetch image content
/// through the file endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardrobeView {
    pub id: Uuid,
    pub description: String,
    pub main_file: String,
    pub label_file: String,
    pub label_text: Option<String>,
}

impl From<&WardrobeItem> for WardrobeView {
    fn from(item: &WardrobeItem) -> Self {
        Self {
            id: item.id,
            description: item.description.clone(),
            main_file: item.main_file.clone(),
            label_file: item.label_file.clone(),
            label_text: item.label_text.clone(),
        }
    }
}

/// Read projection of an outfit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutfitView {
    pub id: Uuid,
    pub top_id: Uuid,
    pub bottom_id: Uuid,
    pub description: String,
    pub like_count: u32,
    pub dislike_count: u32,
}

impl From<&Outfit> for OutfitView {
    fn from(outfit: &Outfit) -> Self {
        Self {
            id: outfit.id,
            top_id: outfit.top_id,
            bottom_id: outfit.bottom_id,
            description: outfit.description.clone(),
            like_count: outfit.like_count,
            dislike_count: outfit.dislike_count,
        }
    }
}
