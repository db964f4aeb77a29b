//! store::traits
//!
//! Content store trait: a versioned object store addressed by path.
//!
//! # Design
//!
//! The `ContentStore` trait is async because every implementation worth
//! having talks to a remote API. A store is bound to one branch at
//! construction, so callers never pass refs around.
//!
//! Writes are guarded by revision tokens:
//! - `create` fails with [`StoreError::AlreadyExists`] rather than overwrite
//! - `update` and `delete` take the revision the caller last read and fail
//!   with [`StoreError::Conflict`] if someone else wrote in between
//!
//! There is no multi-file transaction. Callers that touch several files
//! must order their writes so a partial failure leaves a servable site.
//!
//! # Example
//!
//! ```ignore
//! use gallerist::store::{ContentStore, StoreError};
//!
//! async fn touch(store: &dyn ContentStore, path: &str) -> Result<(), StoreError> {
//!     let file = store.read(path).await?;
//!     store.update(path, "Touch", &file.content, &file.revision).await?;
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::Revision;

/// Errors from content store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested path does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A create targeted a path that already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The expected revision is stale.
    #[error("revision conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The store answered with something that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// A file read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Store path (no leading slash)
    pub path: String,
    /// Raw file bytes
    pub content: Vec<u8>,
    /// Revision to hand back on update or delete
    pub revision: Revision,
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Final path segment
    pub name: String,
    /// Full store path
    pub path: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Versioned object store bound to a single branch.
///
/// Paths are store paths: no leading slash, `/`-separated.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Get the store name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Branch all operations apply to.
    fn branch(&self) -> &str;

    /// Read a file and its current revision.
    ///
    /// Fails with [`StoreError::NotFound`] if absent.
    async fn read(&self, path: &str) -> Result<StoredFile, StoreError>;

    /// Create a new file. Never overwrites.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the path exists.
    async fn create(&self, path: &str, message: &str, content: &[u8])
        -> Result<Revision, StoreError>;

    /// Replace a file's content, provided it is still at `expected`.
    ///
    /// Fails with [`StoreError::Conflict`] if `expected` is stale.
    async fn update(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
        expected: &Revision,
    ) -> Result<Revision, StoreError>;

    /// Delete a file, provided it is still at `expected`.
    ///
    /// Fails with [`StoreError::NotFound`] if already absent.
    async fn delete(&self, path: &str, message: &str, expected: &Revision)
        -> Result<(), StoreError>;

    /// List the direct children of a directory.
    async fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, StoreError>;

    /// Public URL serving a file's raw bytes, if the store has one.
    fn raw_url(&self, _path: &str) -> Option<String> {
        None
    }
}
