//! gallery
//!
//! Gallery index reconciliation, album provisioning, and the operator-facing
//! service that strings them together.
//!
//! # Architecture
//!
//! - [`entries`]: pure edits of index metadata (no I/O)
//! - [`reconciler`]: read-modify-write of one index document against a store
//! - [`album`]: creation of a new gallery and its registry entry
//! - [`service`]: session-gated pipelines (upload, delete, ...) that report
//!   an [`Outcome`] instead of failing
//!
//! # Consistency
//!
//! Every write carries the revision read just before it. A concurrent
//! writer makes the late write fail with [`ReconcileError::UpdateConflict`];
//! callers may re-read and try again once via [`retry_on_conflict`].

pub mod album;
pub mod entries;
pub mod reconciler;
pub mod service;

use std::fmt;
use std::future::Future;

use thiserror::Error;
use tracing::warn;

use crate::core::document::DocumentError;
use crate::core::types::TypeError;
use crate::mirror::MirrorError;
use crate::store::StoreError;

pub use album::AlbumProvisioner;
pub use reconciler::GalleryIndexReconciler;
pub use service::Curator;

/// Errors from reconciling a gallery document.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("malformed document {path}: {source}")]
    MalformedDocument {
        path: String,
        #[source]
        source: DocumentError,
    },

    #[error("failed to read {path}: {source}")]
    StoreRead {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to write {path}: {source}")]
    StoreWrite {
        path: String,
        #[source]
        source: StoreError,
    },

    /// The document changed between read and write.
    #[error("{path} was changed by someone else; reload and try again")]
    UpdateConflict { path: String },

    #[error("{path} already exists")]
    AlreadyExists { path: String },

    #[error("failed to prepare {path} in the local mirror: {source}")]
    Mirror {
        path: String,
        #[source]
        source: MirrorError,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ReconcileError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ReconcileError::UpdateConflict { .. })
    }
}

impl From<TypeError> for ReconcileError {
    fn from(err: TypeError) -> Self {
        ReconcileError::InvalidInput(err.to_string())
    }
}

/// A non-fatal problem encountered while an operation still succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Something to delete was already gone.
    NotFoundIgnorable { path: String },
    /// A removal matched a number of entries other than one.
    CountMismatch { image_path: String, removed: usize },
    /// An image was stored but its index entry could not be written.
    OrphanedImage { path: String, reason: String },
    /// A best-effort store deletion failed for a reason other than absence.
    DeleteFailure { path: String, reason: String },
    MirrorFailure { path: String, reason: String },
    ThumbnailFailure { path: String, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NotFoundIgnorable { path } => write!(f, "{} was already absent", path),
            Warning::CountMismatch {
                image_path,
                removed,
            } => write!(
                f,
                "expected to remove one entry for {}, removed {}",
                image_path, removed
            ),
            Warning::OrphanedImage { path, reason } => {
                write!(f, "{} is stored but not indexed: {}", path, reason)
            }
            Warning::DeleteFailure { path, reason } => {
                write!(f, "could not delete {}: {}", path, reason)
            }
            Warning::MirrorFailure { path, reason } => {
                write!(f, "local mirror update failed for {}: {}", path, reason)
            }
            Warning::ThumbnailFailure { path, reason } => {
                write!(f, "thumbnail for {} failed: {}", path, reason)
            }
        }
    }
}

/// Result of an operator-facing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    pub warnings: Vec<Warning>,
}

impl Outcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            warnings: Vec::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = Warning>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Run `op`, and run it once more if it lost an update race.
///
/// `op` must re-read whatever it writes; the second attempt sees the
/// concurrent change.
pub async fn retry_on_conflict<T, F, Fut>(mut op: F) -> Result<T, ReconcileError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ReconcileError>>,
{
    match op().await {
        Err(err) if err.is_conflict() => {
            warn!(error = %err, "write conflict; retrying once");
            op().await
        }
        other => other,
    }
}
