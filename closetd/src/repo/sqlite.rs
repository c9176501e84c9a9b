//! SQLite-backed closet document store
//!
//! One row per user in the `closets` table, the closet serialized as a JSON
//! document. The user column is the primary key, which gives the
//! one-closet-per-user uniqueness the service relies on.

use async_trait::async_trait;
use closet_common::model::Closet;
use closet_common::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::info;

/// Open (creating if missing) the closet database and ensure the schema.
pub async fn connect(db_path: &Path) -> Result<Pool<Sqlite>> {
    info!("Opening closet database at {}", db_path.display());

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create the closets table if it does not exist yet.
pub async fn init_schema(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS closets (
            user TEXT PRIMARY KEY,
            document TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Closet document store over a SQLite pool.
pub struct SqliteClosetRepository {
    pool: Pool<Sqlite>,
    /// Human-readable store identity, reported in unavailability errors.
    server: String,
}

impl SqliteClosetRepository {
    pub fn new(pool: Pool<Sqlite>, server: impl Into<String>) -> Self {
        Self {
            pool,
            server: server.into(),
        }
    }

    fn map_error(&self, err: sqlx::Error) -> Error {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Error::RepositoryUnavailable {
                server: self.server.clone(),
            },
            other => Error::Database(other),
        }
    }
}

#[async_trait]
impl super::ClosetRepository for SqliteClosetRepository {
    async fn create(&self, user: &str, closet: &Closet) -> Result<()> {
        let document = serde_json::to_string(closet)?;
        sqlx::query("INSERT INTO closets (user, document) VALUES (?, ?)")
            .bind(user)
            .bind(document)
            .execute(&self.pool)
            .await
            .map_err(|e| self.map_error(e))?;
        Ok(())
    }

    async fn fetch(&self, user: &str) -> Result<Closet> {
        let row: Option<(String,)> = sqlx::query_as("SELECT document FROM closets WHERE user = ?")
            .bind(user)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.map_error(e))?;

        match row {
            Some((document,)) => Ok(serde_json::from_str(&document)?),
            None => Err(Error::UserNotFound { user: user.into() }),
        }
    }

    async fn replace(&self, user: &str, closet: &Closet) -> Result<()> {
        let document = serde_json::to_string(closet)?;
        let result = sqlx::query("UPDATE closets SET document = ? WHERE user = ?")
            .bind(document)
            .bind(user)
            .execute(&self.pool)
            .await
            .map_err(|e| self.map_error(e))?;

        if result.rows_affected() == 0 {
            return Err(Error::UserNotFound { user: user.into() });
        }
        Ok(())
    }

    async fn remove_all(&self, user: &str) -> Result<()> {
        sqlx::query("DELETE FROM closets WHERE user = ?")
            .bind(user)
            .execute(&self.pool)
            .await
            .map_err(|e| self.map_error(e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::ClosetRepository;
    use closet_common::model::WardrobeItem;
    use uuid::Uuid;

    async fn memory_repo() -> SqliteClosetRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        SqliteClosetRepository::new(pool, "sqlite::memory:")
    }

    #[tokio::test]
    async fn fetch_of_unknown_user_is_user_not_found() {
        let repo = memory_repo().await;
        let err = repo.fetch("nobody").await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound { .. }));
    }

    #[tokio::test]
    async fn create_fetch_replace_round_trip() {
        let repo = memory_repo().await;

        let mut closet = Closet::new("foo");
        repo.create("foo", &closet).await.unwrap();
        assert_eq!(repo.fetch("foo").await.unwrap(), closet);

        closet.wardrobes.push(WardrobeItem {
            id: Uuid::new_v4(),
            main_file: "aa".into(),
            label_file: "bb".into(),
            description: "Leggings".into(),
            label_text: None,
        });
        repo.replace("foo", &closet).await.unwrap();
        assert_eq!(repo.fetch("foo").await.unwrap(), closet);
    }

    #[tokio::test]
    async fn replace_of_unknown_user_is_user_not_found() {
        let repo = memory_repo().await;
        let err = repo.replace("nobody", &Closet::new("nobody")).await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound { .. }));
    }

    #[tokio::test]
    async fn remove_all_deletes_the_document() {
        let repo = memory_repo().await;
        repo.create("foo", &Closet::new("foo")).await.unwrap();
        repo.remove_all("foo").await.unwrap();
        assert!(matches!(
            repo.fetch("foo").await.unwrap_err(),
            Error::UserNotFound { .. }
        ));
    }
}
