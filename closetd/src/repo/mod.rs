//! Repository collaborator boundaries
//!
//! The closet service is written against these traits; the concrete
//! adapters (SQLite document store, flat-directory blob store) live in the
//! submodules, and tests substitute mocks.

mod files;
mod sqlite;

pub use files::FsFileRepository;
pub use sqlite::{connect, init_schema, SqliteClosetRepository};

use async_trait::async_trait;
use closet_common::model::Closet;
use closet_common::Result;
use std::path::Path;
use tokio::io::AsyncRead;

/// Handler invoked with the full on-disk path of a blob.
///
/// Used by the HTTP layer to serve image content without the repository
/// taking a position on how the bytes leave the process.
pub type FileHandler<'a> = Box<dyn FnOnce(&Path) -> Result<()> + Send + 'a>;

/// Metadata repository: one closet document per user, keyed by user.
///
/// `create` on an already-present user is not exercised by the service;
/// existence is always checked first via `fetch`.
#[async_trait]
pub trait ClosetRepository: Send + Sync {
    async fn create(&self, user: &str, closet: &Closet) -> Result<()>;

    /// Fetch the user's closet. Fails with `UserNotFound` if no document
    /// exists and `RepositoryUnavailable` if the store cannot be reached.
    async fn fetch(&self, user: &str) -> Result<Closet>;

    async fn replace(&self, user: &str, closet: &Closet) -> Result<()>;

    /// Remove the user's whole closet document.
    async fn remove_all(&self, user: &str) -> Result<()>;
}

/// Content repository: named binary blobs.
///
/// `get` and `delete` fail with `NoSuchFileOrDirectory` when the key has no
/// blob; `put` overwrites silently, so callers that care check first.
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    async fn put_from_reader(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    async fn get_via_handler(&self, key: &str, handler: FileHandler<'_>) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}
