//! store::github
//!
//! GitHub implementation of [`ContentStore`] over the REST Contents API.
//!
//! # Design
//!
//! Every operation maps to one request against
//! `/repos/{owner}/{repo}/contents/{path}`:
//! - read and list: `GET` with `ref=<branch>`
//! - create and update: `PUT` with base64 content (update carries `sha`)
//! - delete: `DELETE` with `sha`
//!
//! The blob `sha` is the revision token. GitHub rejects a `PUT` without
//! `sha` on an existing file with 422, and a stale `sha` with 409; both
//! are mapped onto the store's typed errors.
//!
//! Files over 1 MB come back without inline content. Those are fetched a
//! second time with the raw media type.
//!
//! # Rate Limiting
//!
//! Returns `StoreError::RateLimited` when limits are hit. No automatic retry.
//!
//! # Example
//!
//! ```ignore
//! use gallerist::store::{ContentStore, GitHubStore};
//!
//! let store = GitHubStore::new("brik", "gallery", "gh-pages").with_token(token);
//! let index = store.read("images/beach/index.html").await?;
//! ```

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::traits::{ContentStore, DirEntry, EntryKind, StoreError, StoredFile};
use crate::core::paths::store_path;
use crate::core::types::Revision;

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Base URL for raw file links.
const RAW_BASE: &str = "https://raw.githubusercontent.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "gallerist-cli";

/// Media type for JSON responses.
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Media type that returns file bytes directly.
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

/// Which operation a response belongs to; decides how 409/422 map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

/// GitHub content store.
pub struct GitHubStore {
    /// HTTP client for making requests
    client: Client,
    /// Personal access token or app token
    token: Option<String>,
    /// Repository owner (user or organization)
    owner: String,
    /// Repository name
    repo: String,
    /// Branch all reads and writes target
    branch: String,
    /// API base URL (configurable for GitHub Enterprise and tests)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubStore")
            .field("has_token", &self.token.is_some())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubStore {
    /// Create an unauthenticated store for a repository branch.
    ///
    /// Reads work against public repositories; writes need [`with_token`].
    ///
    /// [`with_token`]: GitHubStore::with_token
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token: None,
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
        self
    }

    /// Use a custom API base URL (e.g., `https://github.example.com/api/v3`).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Create a store from a remote URL.
    ///
    /// Returns `None` for non-GitHub URLs.
    ///
    /// ```
    /// use gallerist::store::GitHubStore;
    /// use gallerist::store::ContentStore;
    ///
    /// let store = GitHubStore::from_remote_url("git@github.com:brik/gallery.git", "main");
    /// assert_eq!(store.unwrap().branch(), "main");
    /// ```
    pub fn from_remote_url(url: &str, branch: impl Into<String>) -> Option<Self> {
        let (owner, repo) = parse_github_url(url)?;
        Some(Self::new(owner, repo, branch))
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Build common headers for API requests.
    fn headers(&self, accept: &'static str) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| StoreError::AuthFailed("token contains invalid characters".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Headers for a mutating request; requires a token.
    fn write_headers(&self) -> Result<HeaderMap, StoreError> {
        if self.token.is_none() {
            return Err(StoreError::AuthRequired);
        }
        self.headers(JSON_MEDIA_TYPE)
    }

    /// Build the contents URL for a store path, segment-encoded.
    fn contents_url(&self, path: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| StoreError::NetworkError(format!("invalid API base URL: {}", e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::NetworkError("API base URL cannot be a base".into()))?;
            segments
                .pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }

    /// Contents URL with `ref=<branch>` for reads.
    fn read_url(&self, path: &str) -> Result<Url, StoreError> {
        let mut url = self.contents_url(path)?;
        url.query_pairs_mut().append_pair("ref", &self.branch);
        Ok(url)
    }

    async fn get_contents(&self, path: &str) -> Result<ContentsResponse, StoreError> {
        let response = self
            .client
            .get(self.read_url(path)?)
            .headers(self.headers(JSON_MEDIA_TYPE)?)
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        self.handle_response(response, Operation::Read).await
    }

    /// Fetch file bytes with the raw media type.
    async fn get_raw(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let response = self
            .client
            .get(self.read_url(path)?)
            .headers(self.headers(RAW_MEDIA_TYPE)?)
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return self
                .handle_error_response(response, status, Operation::Read)
                .await;
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn put_contents(
        &self,
        path: &str,
        body: &PutBody<'_>,
        operation: Operation,
    ) -> Result<Revision, StoreError> {
        let response = self
            .client
            .put(self.contents_url(path)?)
            .headers(self.write_headers()?)
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        let written: WriteResponse = self.handle_response(response, operation).await?;
        Ok(Revision::new(written.content.sha))
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
        operation: Operation,
    ) -> Result<T, StoreError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                StoreError::Decode(format!("failed to parse response: {}", e))
            })
        } else {
            self.handle_error_response(response, status, operation)
                .await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
        operation: Operation,
    ) -> Result<T, StoreError> {
        let url_path = response.url().path().to_string();

        // Try to get error message from body
        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };
        let mentions_sha = message.contains("sha");

        Err(match status {
            StatusCode::UNAUTHORIZED => StoreError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN if message.to_lowercase().contains("rate limit") => {
                StoreError::RateLimited
            }
            StatusCode::FORBIDDEN => StoreError::AuthFailed(format!("Permission denied: {}", message)),
            StatusCode::NOT_FOUND => StoreError::NotFound(url_path),
            StatusCode::CONFLICT => StoreError::Conflict(message),
            StatusCode::UNPROCESSABLE_ENTITY if operation == Operation::Create => {
                StoreError::AlreadyExists(message)
            }
            StatusCode::UNPROCESSABLE_ENTITY
                if mentions_sha && matches!(operation, Operation::Update | Operation::Delete) =>
            {
                StoreError::Conflict(message)
            }
            StatusCode::TOO_MANY_REQUESTS => StoreError::RateLimited,
            _ if status.is_server_error() => StoreError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => StoreError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl ContentStore for GitHubStore {
    fn name(&self) -> &'static str {
        "github"
    }

    fn branch(&self) -> &str {
        &self.branch
    }

    async fn read(&self, path: &str) -> Result<StoredFile, StoreError> {
        let path = store_path(path);
        let item = match self.get_contents(&path).await? {
            ContentsResponse::File(item) => item,
            ContentsResponse::Listing(_) => {
                return Err(StoreError::Decode(format!("{} is a directory", path)))
            }
        };

        let content = match (item.encoding.as_deref(), item.content.as_deref()) {
            (Some("base64"), Some(encoded)) if !encoded.is_empty() => decode_base64(encoded)?,
            _ if item.size == 0 => Vec::new(),
            _ => self.get_raw(&path).await?,
        };

        Ok(StoredFile {
            path,
            content,
            revision: Revision::new(item.sha),
        })
    }

    async fn create(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
    ) -> Result<Revision, StoreError> {
        let path = store_path(path);
        let body = PutBody {
            message,
            content: STANDARD.encode(content),
            branch: &self.branch,
            sha: None,
        };
        self.put_contents(&path, &body, Operation::Create).await
    }

    async fn update(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
        expected: &Revision,
    ) -> Result<Revision, StoreError> {
        let path = store_path(path);
        let body = PutBody {
            message,
            content: STANDARD.encode(content),
            branch: &self.branch,
            sha: Some(expected.as_str()),
        };
        self.put_contents(&path, &body, Operation::Update).await
    }

    async fn delete(
        &self,
        path: &str,
        message: &str,
        expected: &Revision,
    ) -> Result<(), StoreError> {
        let path = store_path(path);
        let body = DeleteBody {
            message,
            sha: expected.as_str(),
            branch: &self.branch,
        };

        let response = self
            .client
            .delete(self.contents_url(&path)?)
            .headers(self.write_headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            self.handle_error_response(response, status, Operation::Delete)
                .await
        }
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, StoreError> {
        let path = store_path(path);
        match self.get_contents(&path).await? {
            ContentsResponse::Listing(items) => Ok(items.into_iter().map(DirEntry::from).collect()),
            ContentsResponse::File(_) => {
                Err(StoreError::Decode(format!("{} is not a directory", path)))
            }
        }
    }

    fn raw_url(&self, path: &str) -> Option<String> {
        Some(format!(
            "{}/{}/{}/{}/{}",
            RAW_BASE,
            self.owner,
            self.repo,
            self.branch,
            store_path(path)
        ))
    }
}

/// Decode GitHub's line-wrapped base64.
fn decode_base64(encoded: &str) -> Result<Vec<u8>, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| StoreError::Decode(format!("invalid base64 content: {}", e)))
}

// =============================================================================
// GitHub API types
// =============================================================================

/// A `GET contents` response: a file object or a directory array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<ContentItem>),
    File(ContentItem),
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    name: String,
    path: String,
    sha: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

impl From<ContentItem> for DirEntry {
    fn from(item: ContentItem) -> Self {
        let kind = if item.kind == "dir" {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        DirEntry {
            name: item.name,
            path: item.path,
            kind,
        }
    }
}

#[derive(Debug, Serialize)]
struct PutBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteBody<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    content: WrittenContent,
}

#[derive(Debug, Deserialize)]
struct WrittenContent {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// Parse a GitHub URL into (owner, repo).
///
/// Supports SSH (`git@github.com:owner/repo.git`) and HTTPS
/// (`https://github.com/owner/repo.git`), with or without `.git`.
///
/// ```
/// use gallerist::store::github::parse_github_url;
///
/// let (owner, repo) = parse_github_url("git@github.com:brik/gallery.git").unwrap();
/// assert_eq!(owner, "brik");
/// assert_eq!(repo, "gallery");
/// ```
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"))
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))?;
    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);

    let (owner, repo) = rest.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}
