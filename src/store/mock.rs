//! store::mock
//!
//! In-memory content store for deterministic testing.
//!
//! # Design
//!
//! Files live in an ordered map keyed by store path. Every write assigns a
//! fresh revision (`rev-1`, `rev-2`, ...), and `update`/`delete` enforce
//! the expected revision exactly like a real store would. Failures can be
//! injected per operation, either persistently or for the next call only.
//!
//! # Example
//!
//! ```
//! use gallerist::store::mock::MockStore;
//! use gallerist::store::ContentStore;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = MockStore::new().with_file("images/index.html", "---\n---\n");
//! let file = store.read("images/index.html").await.unwrap();
//! assert_eq!(file.revision.as_str(), "rev-1");
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::traits::{ContentStore, DirEntry, EntryKind, StoreError, StoredFile};
use crate::core::paths::store_path;
use crate::core::types::Revision;

/// Mock content store for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping. Clones share state.
#[derive(Debug, Clone)]
pub struct MockStore {
    inner: Arc<Mutex<MockStoreInner>>,
}

#[derive(Debug)]
struct MockStoreInner {
    /// Stored files by path.
    files: BTreeMap<String, MockFile>,
    /// Counter for revision tokens.
    next_revision: u64,
    /// Persistent failure configuration.
    fail_on: Vec<FailOn>,
    /// One-shot failures, consumed on first match.
    fail_next: Vec<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

#[derive(Debug, Clone)]
struct MockFile {
    content: Vec<u8>,
    revision: Revision,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    Read(StoreError),
    Create(StoreError),
    Update(StoreError),
    Delete(StoreError),
    List(StoreError),
}

impl FailOn {
    fn matches(&self, op: OpKind) -> Option<StoreError> {
        let (kind, error) = match self {
            FailOn::Read(e) => (OpKind::Read, e),
            FailOn::Create(e) => (OpKind::Create, e),
            FailOn::Update(e) => (OpKind::Update, e),
            FailOn::Delete(e) => (OpKind::Delete, e),
            FailOn::List(e) => (OpKind::List, e),
        };
        (kind == op).then(|| error.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Read,
    Create,
    Update,
    Delete,
    List,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Read { path: String },
    Create { path: String, message: String },
    Update { path: String, message: String, expected: String },
    Delete { path: String, message: String },
    List { path: String },
}

impl MockOperation {
    /// Whether this operation writes to the store.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            MockOperation::Create { .. } | MockOperation::Update { .. } | MockOperation::Delete { .. }
        )
    }

    /// Commit message of a write.
    pub fn message(&self) -> Option<&str> {
        match self {
            MockOperation::Create { message, .. }
            | MockOperation::Update { message, .. }
            | MockOperation::Delete { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl MockStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockStoreInner {
                files: BTreeMap::new(),
                next_revision: 1,
                fail_on: Vec::new(),
                fail_next: Vec::new(),
                operations: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a file. Does not record an operation.
    pub fn with_file(self, path: &str, content: impl AsRef<[u8]>) -> Self {
        self.put_file(path, content);
        self
    }

    /// Overwrite a file out of band, as a concurrent writer would.
    ///
    /// Returns the new revision.
    pub fn put_file(&self, path: &str, content: impl AsRef<[u8]>) -> Revision {
        let mut inner = self.lock();
        let revision = inner.bump();
        inner.files.insert(
            store_path(path),
            MockFile {
                content: content.as_ref().to_vec(),
                revision: revision.clone(),
            },
        );
        revision
    }

    /// Fail every call of an operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on.push(fail_on);
        self
    }

    /// Fail the next call of an operation only.
    pub fn fail_next(&self, fail_on: FailOn) {
        self.lock().fail_next.push(fail_on);
    }

    /// Clear all failure configuration.
    pub fn clear_failures(&self) {
        let mut inner = self.lock();
        inner.fail_on.clear();
        inner.fail_next.clear();
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Recorded write operations only.
    pub fn writes(&self) -> Vec<MockOperation> {
        self.operations().into_iter().filter(MockOperation::is_write).collect()
    }

    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Current bytes of a file (for test verification).
    pub fn file_content(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().files.get(&store_path(path)).map(|f| f.content.clone())
    }

    /// Current content of a file as text.
    pub fn file_text(&self, path: &str) -> Option<String> {
        self.file_content(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Current revision of a file.
    pub fn revision_of(&self, path: &str) -> Option<Revision> {
        self.lock().files.get(&store_path(path)).map(|f| f.revision.clone())
    }

    /// All stored paths in order.
    pub fn paths(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lock().files.contains_key(&store_path(path))
    }

    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, op: OpKind) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(pos) = inner.fail_next.iter().position(|f| f.matches(op).is_some()) {
            let failure = inner.fail_next.remove(pos);
            if let Some(error) = failure.matches(op) {
                return Err(error);
            }
        }
        match inner.fail_on.iter().find_map(|f| f.matches(op)) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl MockStoreInner {
    fn bump(&mut self) -> Revision {
        let revision = Revision::new(format!("rev-{}", self.next_revision));
        self.next_revision += 1;
        revision
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MockStore {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn branch(&self) -> &str {
        "main"
    }

    async fn read(&self, path: &str) -> Result<StoredFile, StoreError> {
        let path = store_path(path);
        self.record(MockOperation::Read { path: path.clone() });
        self.check_fail(OpKind::Read)?;

        let inner = self.lock();
        let file = inner
            .files
            .get(&path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        Ok(StoredFile {
            path: path.clone(),
            content: file.content.clone(),
            revision: file.revision.clone(),
        })
    }

    async fn create(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
    ) -> Result<Revision, StoreError> {
        let path = store_path(path);
        self.record(MockOperation::Create {
            path: path.clone(),
            message: message.to_string(),
        });
        self.check_fail(OpKind::Create)?;

        let mut inner = self.lock();
        if inner.files.contains_key(&path) {
            return Err(StoreError::AlreadyExists(path));
        }
        let revision = inner.bump();
        inner.files.insert(
            path,
            MockFile {
                content: content.to_vec(),
                revision: revision.clone(),
            },
        );
        Ok(revision)
    }

    async fn update(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
        expected: &Revision,
    ) -> Result<Revision, StoreError> {
        let path = store_path(path);
        self.record(MockOperation::Update {
            path: path.clone(),
            message: message.to_string(),
            expected: expected.to_string(),
        });
        self.check_fail(OpKind::Update)?;

        let mut inner = self.lock();
        match inner.files.get(&path) {
            None => return Err(StoreError::NotFound(path)),
            Some(file) if &file.revision != expected => {
                return Err(StoreError::Conflict(format!(
                    "{} is at {}, not {}",
                    path, file.revision, expected
                )))
            }
            Some(_) => {}
        }
        let revision = inner.bump();
        inner.files.insert(
            path,
            MockFile {
                content: content.to_vec(),
                revision: revision.clone(),
            },
        );
        Ok(revision)
    }

    async fn delete(
        &self,
        path: &str,
        message: &str,
        expected: &Revision,
    ) -> Result<(), StoreError> {
        let path = store_path(path);
        self.record(MockOperation::Delete {
            path: path.clone(),
            message: message.to_string(),
        });
        self.check_fail(OpKind::Delete)?;

        let mut inner = self.lock();
        match inner.files.get(&path) {
            None => Err(StoreError::NotFound(path)),
            Some(file) if &file.revision != expected => Err(StoreError::Conflict(format!(
                "{} is at {}, not {}",
                path, file.revision, expected
            ))),
            Some(_) => {
                inner.files.remove(&path);
                Ok(())
            }
        }
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, StoreError> {
        let dir = store_path(path);
        self.record(MockOperation::List { path: dir.clone() });
        self.check_fail(OpKind::List)?;

        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };

        let inner = self.lock();
        let mut dirs = BTreeSet::new();
        let mut entries = Vec::new();
        for key in inner.files.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    dirs.insert(child.to_string());
                }
                None => entries.push(DirEntry {
                    name: rest.to_string(),
                    path: key.clone(),
                    kind: EntryKind::File,
                }),
            }
        }

        if dirs.is_empty() && entries.is_empty() {
            return Err(StoreError::NotFound(dir));
        }

        entries.extend(dirs.into_iter().map(|name| DirEntry {
            path: format!("{}{}", prefix, name),
            name,
            kind: EntryKind::Dir,
        }));
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_read() {
        let store = MockStore::new();
        let rev = store.create("/images/a.jpg", "Add a.jpg", b"abc").await.unwrap();

        let file = store.read("images/a.jpg").await.unwrap();
        assert_eq!(file.content, b"abc");
        assert_eq!(file.revision, rev);
        assert_eq!(file.path, "images/a.jpg");
    }

    #[tokio::test]
    async fn create_never_overwrites() {
        let store = MockStore::new().with_file("a.txt", "one");
        let result = store.create("a.txt", "again", b"two").await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
        assert_eq!(store.file_text("a.txt").as_deref(), Some("one"));
    }

    #[tokio::test]
    async fn update_requires_current_revision() {
        let store = MockStore::new().with_file("a.txt", "one");
        let stale = store.revision_of("a.txt").unwrap();
        store.put_file("a.txt", "concurrent");

        let result = store.update("a.txt", "edit", b"mine", &stale).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.file_text("a.txt").as_deref(), Some("concurrent"));
    }

    #[tokio::test]
    async fn update_assigns_new_revision() {
        let store = MockStore::new().with_file("a.txt", "one");
        let rev = store.revision_of("a.txt").unwrap();
        let next = store.update("a.txt", "edit", b"two", &rev).await.unwrap();
        assert_ne!(rev, next);
        assert_eq!(store.revision_of("a.txt"), Some(next));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let store = MockStore::new();
        let result = store.delete("gone.jpg", "Delete", &Revision::new("rev-1")).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_directory_children() {
        let store = MockStore::new()
            .with_file("images/index.html", "")
            .with_file("images/beach/index.html", "")
            .with_file("images/albums/beach/a.jpg", "");

        let entries = store.list_directory("images").await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| (e.name.as_str(), e.is_dir())).collect();
        assert_eq!(
            names,
            vec![("albums", true), ("beach", true), ("index.html", false)]
        );
        assert_eq!(entries[1].path, "images/beach");
    }

    #[tokio::test]
    async fn list_unknown_directory_is_not_found() {
        let store = MockStore::new().with_file("images/index.html", "");
        assert!(matches!(
            store.list_directory("nowhere").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn fail_next_is_consumed() {
        let store = MockStore::new().with_file("a.txt", "one");
        store.fail_next(FailOn::Read(StoreError::RateLimited));

        assert_eq!(store.read("a.txt").await.unwrap_err(), StoreError::RateLimited);
        assert!(store.read("a.txt").await.is_ok());
    }

    #[tokio::test]
    async fn fail_on_persists() {
        let store = MockStore::new().fail_on(FailOn::Create(StoreError::AuthRequired));
        for _ in 0..2 {
            assert_eq!(
                store.create("x", "m", b"").await.unwrap_err(),
                StoreError::AuthRequired
            );
        }
        store.clear_failures();
        assert!(store.create("x", "m", b"").await.is_ok());
    }

    #[tokio::test]
    async fn records_operations() {
        let store = MockStore::new();
        store.create("a", "Add a", b"").await.unwrap();
        let _ = store.read("a").await;

        let ops = store.operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].message(), Some("Add a"));
        assert_eq!(store.writes().len(), 1);

        store.clear_operations();
        assert!(store.operations().is_empty());
    }
}
