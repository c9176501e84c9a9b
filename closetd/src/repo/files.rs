//! Flat-directory blob store
//!
//! Image blobs live as individual files in one directory, named by their
//! derived key. Keys are hex digests, so there is no traversal or
//! collision concern with user-supplied names.

use async_trait::async_trait;
use closet_common::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::debug;

use super::FileHandler;

/// Content repository over a single directory.
pub struct FsFileRepository {
    dir: PathBuf,
}

impl FsFileRepository {
    /// Create the repository, making the directory if it does not exist.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl super::FileRepository for FsFileRepository {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        let mut file = fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        debug!("wrote blob {} ({} bytes)", key, bytes.len());
        Ok(())
    }

    async fn put_from_reader(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<()> {
        let path = self.path_for(key);
        let mut file = fs::File::create(&path).await?;
        tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NoSuchFileOrDirectory { file: key.into() })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_via_handler(&self, key: &str, handler: FileHandler<'_>) -> Result<()> {
        let path = self.path_for(key);
        if !path.exists() {
            return Err(Error::NoSuchFileOrDirectory { file: key.into() });
        }
        handler(&path)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NoSuchFileOrDirectory { file: key.into() })
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::FileRepository;

    async fn temp_repo() -> (tempfile::TempDir, FsFileRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsFileRepository::new(dir.path()).await.unwrap();
        (dir, repo)
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let (_dir, repo) = temp_repo().await;
        repo.put("abc123", &[0xAA, 0xBB, 0xCC]).await.unwrap();
        assert_eq!(repo.get("abc123").await.unwrap(), vec![0xAA, 0xBB, 0xCC]);
    }

    #[tokio::test]
    async fn get_of_missing_key_is_no_such_file() {
        let (_dir, repo) = temp_repo().await;
        let err = repo.get("missing").await.unwrap_err();
        assert!(matches!(err, Error::NoSuchFileOrDirectory { .. }));
    }

    #[tokio::test]
    async fn delete_of_missing_key_is_no_such_file() {
        let (_dir, repo) = temp_repo().await;
        let err = repo.delete("missing").await.unwrap_err();
        assert!(matches!(err, Error::NoSuchFileOrDirectory { .. }));
    }

    #[tokio::test]
    async fn delete_removes_the_blob() {
        let (_dir, repo) = temp_repo().await;
        repo.put("abc123", b"image").await.unwrap();
        repo.delete("abc123").await.unwrap();
        assert!(repo.get("abc123").await.is_err());
    }

    #[tokio::test]
    async fn put_from_reader_streams_content() {
        let (_dir, repo) = temp_repo().await;
        let mut reader: &[u8] = b"streamed image bytes";
        repo.put_from_reader("streamkey", &mut reader).await.unwrap();
        assert_eq!(repo.get("streamkey").await.unwrap(), b"streamed image bytes");
    }

    #[tokio::test]
    async fn handler_sees_the_blob_path() {
        let (_dir, repo) = temp_repo().await;
        repo.put("abc123", b"image").await.unwrap();

        let mut served = None;
        repo.get_via_handler(
            "abc123",
            Box::new(|path| {
                served = Some(std::fs::read(path)?);
                Ok(())
            }),
        )
        .await
        .unwrap();

        assert_eq!(served.unwrap(), b"image");
    }

    #[tokio::test]
    async fn handler_is_not_invoked_for_missing_key() {
        let (_dir, repo) = temp_repo().await;
        let mut invoked = false;
        let err = repo
            .get_via_handler(
                "missing",
                Box::new(|_| {
                    invoked = true;
                    Ok(())
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoSuchFileOrDirectory { .. }));
        assert!(!invoked);
    }
}
