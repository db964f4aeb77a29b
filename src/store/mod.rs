//! store
//!
//! Abstraction over the remote repository that serves the site.
//!
//! # Architecture
//!
//! The `ContentStore` trait is the only way gallery code touches the
//! remote. Reconciliation logic never sees HTTP, and tests run against
//! [`mock::MockStore`] instead of the network.
//!
//! # Modules
//!
//! - `traits`: Core `ContentStore` trait, errors, and file types
//! - [`github`]: GitHub implementation over the Contents API
//! - [`mock`]: In-memory implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use gallerist::store::{ContentStore, GitHubStore};
//!
//! let store = GitHubStore::new("brik", "gallery", "gh-pages").with_token(token);
//! for entry in store.list_directory("images").await? {
//!     println!("{}", entry.name);
//! }
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use github::GitHubStore;
pub use traits::*;
