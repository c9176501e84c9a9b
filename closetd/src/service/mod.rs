//! Closet service
//!
//! The orchestration layer. Every compound operation spans the metadata
//! repository and (for wardrobe items) the content repository; the two are
//! kept consistent by serializing each user's read-modify-write sequence
//! through a per-user lock. Reads take no lock and inherit whatever
//! read-after-write consistency the metadata repository offers.
//!
//! There is no rollback: if closet persistence fails after the blobs were
//! written, or blob deletion fails during a wardrobe delete, the blobs are
//! orphaned in the content repository.

mod locks;

use std::sync::Arc;

use base64::prelude::{Engine, BASE64_STANDARD};
use closet_common::model::{Closet, Outfit, OutfitView, WardrobeItem, WardrobeView};
use closet_common::{derive_file_key, Error, FileRole, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::bridge::LabelPublisher;
use crate::repo::{ClosetRepository, FileHandler, FileRepository};
use locks::UserLocks;

/// Orchestrates closet mutations across the metadata and content
/// repositories and hands label images to the recognition bridge.
pub struct ClosetService {
    db: Arc<dyn ClosetRepository>,
    files: Arc<dyn FileRepository>,
    recognizer: Arc<dyn LabelPublisher>,
    locks: UserLocks,
}

impl ClosetService {
    pub fn new(
        db: Arc<dyn ClosetRepository>,
        files: Arc<dyn FileRepository>,
        recognizer: Arc<dyn LabelPublisher>,
    ) -> Self {
        Self {
            db,
            files,
            recognizer,
            locks: UserLocks::new(),
        }
    }

    /// Add a wardrobe item: write both image blobs, append the item to the
    /// user's closet (creating the closet on first add), then submit a
    /// best-effort recognition request for the label image.
    pub async fn add_wardrobe(
        &self,
        user: &str,
        description: &str,
        main_image: &[u8],
        label_image: &[u8],
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();

        info!("adding wardrobe user={} id={}", user, id);

        let main_key = derive_file_key(user, FileRole::Image, id);
        let label_key = derive_file_key(user, FileRole::Label, id);

        {
            let lock = self.locks.lock_for(user);
            let _guard = lock.lock().await;

            let (mut closet, inserting) = match self.db.fetch(user).await {
                Ok(closet) => (closet, false),
                Err(Error::UserNotFound { .. }) => (Closet::new(user), true),
                Err(e) => return Err(e),
            };

            // A freshly generated id must not map onto existing blobs.
            for key in [&main_key, &label_key] {
                match self.files.get(key).await {
                    Err(Error::NoSuchFileOrDirectory { .. }) => {}
                    Ok(_) => {
                        return Err(Error::DuplicateFile {
                            file: key.to_string(),
                        })
                    }
                    Err(e) => return Err(e),
                }
            }

            self.files.put(&main_key, main_image).await?;
            self.files.put(&label_key, label_image).await?;

            closet.wardrobes.push(WardrobeItem {
                id,
                main_file: main_key,
                label_file: label_key,
                description: description.to_string(),
                label_text: None,
            });

            if inserting {
                self.db.create(user, &closet).await?;
            } else {
                self.db.replace(user, &closet).await?;
            }
        }

        // Best-effort: a failed submission leaves the item without label
        // text but never fails the add.
        let encoded = BASE64_STANDARD.encode(label_image);
        if let Err(e) = self.recognizer.publish_label(user, id, &encoded).await {
            warn!(
                "failed to submit recognition request user={} id={}: {}",
                user, id, e
            );
        }

        info!("done adding wardrobe user={} id={}", user, id);

        Ok(id)
    }

    /// Remove a wardrobe item and (best-effort) its two backing blobs.
    ///
    /// Blob deletion failures are logged and swallowed; the metadata
    /// removal proceeds regardless. An id with no matching entry leaves
    /// the sequence unchanged and still persists.
    pub async fn delete_wardrobe(&self, user: &str, id: Uuid) -> Result<()> {
        info!("deleting wardrobe user={} id={}", user, id);

        let lock = self.locks.lock_for(user);
        let _guard = lock.lock().await;

        let mut closet = self.db.fetch(user).await?;

        if closet.wardrobes.is_empty() {
            return Err(Error::EmptyCloset);
        }

        let items = std::mem::take(&mut closet.wardrobes);
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            if item.id == id {
                for key in [&item.main_file, &item.label_file] {
                    if let Err(e) = self.files.delete(key).await {
                        warn!("failed to delete blob {}: {}", key, e);
                    }
                }
            } else {
                kept.push(item);
            }
        }
        closet.wardrobes = kept;

        self.db.replace(user, &closet).await?;

        info!("done deleting wardrobe user={} id={}", user, id);

        Ok(())
    }

    pub async fn get_wardrobe(&self, user: &str, id: Uuid) -> Result<WardrobeView> {
        let closet = self.db.fetch(user).await?;

        if closet.wardrobes.is_empty() {
            return Err(Error::EmptyCloset);
        }

        closet
            .find_wardrobe(id)
            .map(WardrobeView::from)
            .ok_or(Error::ItemNotFound { id: id.to_string() })
    }

    pub async fn get_all_wardrobe(&self, user: &str) -> Result<Vec<WardrobeView>> {
        let closet = self.db.fetch(user).await?;

        if closet.wardrobes.is_empty() {
            return Err(Error::EmptyCloset);
        }

        Ok(closet.wardrobes.iter().map(WardrobeView::from).collect())
    }

    /// Handler-based blob retrieval; pure delegation to the content
    /// repository.
    pub async fn get_file(&self, key: &str, handler: FileHandler<'_>) -> Result<()> {
        self.files.get_via_handler(key, handler).await
    }

    /// Add an outfit to an existing closet.
    ///
    /// Unlike wardrobe adds, a missing closet is not created here; the
    /// call fails with `UserNotFound`.
    pub async fn add_outfit(
        &self,
        user: &str,
        top_id: Uuid,
        bottom_id: Uuid,
        description: &str,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();

        info!("adding outfit user={} id={}", user, id);

        let lock = self.locks.lock_for(user);
        let _guard = lock.lock().await;

        let mut closet = self.db.fetch(user).await?;

        closet.outfits.push(Outfit {
            id,
            top_id,
            bottom_id,
            description: description.to_string(),
            like_count: 0,
            dislike_count: 0,
        });

        self.db.replace(user, &closet).await?;

        info!("done adding outfit user={} id={}", user, id);

        Ok(id)
    }

    pub async fn delete_outfit(&self, user: &str, id: Uuid) -> Result<()> {
        info!("deleting outfit user={} id={}", user, id);

        let lock = self.locks.lock_for(user);
        let _guard = lock.lock().await;

        let mut closet = self.db.fetch(user).await?;

        if closet.outfits.is_empty() {
            return Err(Error::EmptyOutfits);
        }

        closet.outfits.retain(|o| o.id != id);

        self.db.replace(user, &closet).await?;

        info!("done deleting outfit user={} id={}", user, id);

        Ok(())
    }

    pub async fn get_outfit(&self, user: &str, id: Uuid) -> Result<OutfitView> {
        let closet = self.db.fetch(user).await?;

        if closet.outfits.is_empty() {
            return Err(Error::EmptyOutfits);
        }

        closet
            .find_outfit(id)
            .map(OutfitView::from)
            .ok_or(Error::ItemNotFound { id: id.to_string() })
    }

    pub async fn get_all_outfits(&self, user: &str) -> Result<Vec<OutfitView>> {
        let closet = self.db.fetch(user).await?;

        if closet.outfits.is_empty() {
            return Err(Error::EmptyOutfits);
        }

        Ok(closet.outfits.iter().map(OutfitView::from).collect())
    }

    /// Apply a recognition result to the matching item.
    ///
    /// Invoked by the bridge's receive loop. Runs under the same per-user
    /// lock as the public mutations; a response naming no current item is
    /// a no-op that still persists the (unchanged) closet.
    pub async fn apply_recognized_text(
        &self,
        user: &str,
        id: Uuid,
        text: &str,
    ) -> Result<()> {
        info!("applying recognized text user={} id={}", user, id);

        let lock = self.locks.lock_for(user);
        let _guard = lock.lock().await;

        let mut closet = self.db.fetch(user).await?;

        if closet.wardrobes.is_empty() {
            return Err(Error::EmptyCloset);
        }

        for item in closet.wardrobes.iter_mut() {
            if item.id == id {
                item.label_text = Some(text.to_string());
            }
        }

        self.db.replace(user, &closet).await?;

        Ok(())
    }
}
