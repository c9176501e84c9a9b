//! Common error types for closetd

use thiserror::Error;

/// Common result type for closet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds surfaced by the closet service and its collaborators.
///
/// Callers branch on the variant, never on the message text.
#[derive(Error, Debug)]
pub enum Error {
    /// No closet document exists for the user
    #[error("User {user} not found")]
    UserNotFound { user: String },

    /// The closet exists but holds no entry with this identifier
    #[error("Item {id} not found")]
    ItemNotFound { id: String },

    /// Blob missing from the content repository
    #[error("File {file} not found")]
    NoSuchFileOrDirectory { file: String },

    /// Metadata repository cannot be reached
    #[error("Repository {server} is unavailable")]
    RepositoryUnavailable { server: String },

    /// A blob with this key already exists
    #[error("Duplicate file name {file}")]
    DuplicateFile { file: String },

    /// Closet has no wardrobe items
    #[error("Empty closet")]
    EmptyCloset,

    /// Closet has no outfits
    #[error("Empty outfits")]
    EmptyOutfits,

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document or envelope (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Message channel publish/subscribe error
    #[error("Channel error: {0}")]
    Channel(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
