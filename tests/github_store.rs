//! HTTP-level tests for the GitHub content store.
//!
//! A wiremock server stands in for the Contents API so request shapes and
//! status mapping can be checked without network access.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gallerist::core::types::Revision;
use gallerist::store::{ContentStore, EntryKind, GitHubStore, StoreError};

const INDEX: &str = "/repos/brik/gallery/contents/images/beach/index.html";
const IMAGE: &str = "/repos/brik/gallery/contents/images/albums/beach/a.jpg";

fn store(server: &MockServer) -> GitHubStore {
    GitHubStore::new("brik", "gallery", "main")
        .with_token("ghp_test")
        .with_api_base(server.uri())
}

fn file_item(path: &str, sha: &str, content: &[u8]) -> Value {
    // GitHub wraps base64 at 60 columns.
    let encoded = STANDARD.encode(content);
    let wrapped: Vec<String> = encoded
        .as_bytes()
        .chunks(60)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect();
    json!({
        "name": path.rsplit('/').next().unwrap(),
        "path": path,
        "sha": sha,
        "type": "file",
        "size": content.len(),
        "encoding": "base64",
        "content": wrapped.join("\n"),
    })
}

fn written(sha: &str) -> Value {
    json!({ "content": { "sha": sha } })
}

fn error(message: &str) -> Value {
    json!({ "message": message })
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
        .collect()
}

// =============================================================================
// Reads
// =============================================================================

mod reads {
    use super::*;

    #[tokio::test]
    async fn read_decodes_content_at_branch() {
        let server = MockServer::start().await;
        let text = "---\ntitle: Beach\nimages: []\n---\n<div class=\"gallery-grid\"></div>\n".repeat(3);
        Mock::given(method("GET"))
            .and(path(INDEX))
            .and(query_param("ref", "main"))
            .and(header("authorization", "Bearer ghp_test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(file_item("images/beach/index.html", "abc123", text.as_bytes())),
            )
            .expect(1)
            .mount(&server)
            .await;

        let file = store(&server).read("/images/beach/index.html").await.unwrap();

        assert_eq!(file.path, "images/beach/index.html");
        assert_eq!(file.content, text.as_bytes());
        assert_eq!(file.revision, Revision::new("abc123"));
    }

    #[tokio::test]
    async fn large_file_is_fetched_raw() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(IMAGE))
            .and(header("accept", "application/vnd.github+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "a.jpg",
                "path": "images/albums/beach/a.jpg",
                "sha": "big1",
                "type": "file",
                "size": 2_000_000,
                "encoding": "none",
                "content": "",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(IMAGE))
            .and(header("accept", "application/vnd.github.raw"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"raw-jpeg".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let file = store(&server).read("images/albums/beach/a.jpg").await.unwrap();

        assert_eq!(file.content, b"raw-jpeg");
        assert_eq!(file.revision, Revision::new("big1"));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(INDEX))
            .respond_with(ResponseTemplate::new(404).set_body_json(error("Not Found")))
            .mount(&server)
            .await;

        let err = store(&server).read("images/beach/index.html").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn lists_directories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/brik/gallery/contents/images"))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "name": "beach", "path": "images/beach", "sha": "d1", "type": "dir" },
                { "name": "index.html", "path": "images/index.html", "sha": "f1", "type": "file", "size": 10 },
            ])))
            .mount(&server)
            .await;

        let entries = store(&server).list_directory("images").await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "beach");
        assert_eq!(entries[0].kind, EntryKind::Dir);
        assert_eq!(entries[1].path, "images/index.html");
        assert_eq!(entries[1].kind, EntryKind::File);
    }

    #[tokio::test]
    async fn reads_work_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(INDEX))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(file_item("images/beach/index.html", "s1", b"---\n---\n")),
            )
            .mount(&server)
            .await;

        let anonymous = GitHubStore::new("brik", "gallery", "main").with_api_base(server.uri());
        assert!(anonymous.read("images/beach/index.html").await.is_ok());

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }
}

// =============================================================================
// Writes
// =============================================================================

mod writes {
    use super::*;

    #[tokio::test]
    async fn create_sends_content_without_sha() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(IMAGE))
            .and(body_partial_json(json!({
                "message": "Add a.jpg",
                "branch": "main",
                "content": STANDARD.encode(b"jpeg-bytes"),
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(written("new1")))
            .expect(1)
            .mount(&server)
            .await;

        let revision = store(&server)
            .create("images/albums/beach/a.jpg", "Add a.jpg", b"jpeg-bytes")
            .await
            .unwrap();

        assert_eq!(revision, Revision::new("new1"));
        let bodies = request_bodies(&server).await;
        assert!(bodies[0].get("sha").is_none());
    }

    #[tokio::test]
    async fn update_carries_expected_revision() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(INDEX))
            .and(body_partial_json(json!({ "sha": "old1", "branch": "main" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(written("new2")))
            .expect(1)
            .mount(&server)
            .await;

        let revision = store(&server)
            .update("images/beach/index.html", "Update index.html", b"---\n---\n", &Revision::new("old1"))
            .await
            .unwrap();
        assert_eq!(revision, Revision::new("new2"));
    }

    #[tokio::test]
    async fn delete_sends_sha_and_branch() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(IMAGE))
            .and(body_partial_json(json!({
                "message": "Delete a.jpg",
                "sha": "s9",
                "branch": "main",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": null })))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .delete("images/albums/beach/a.jpg", "Delete a.jpg", &Revision::new("s9"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn writes_without_token_send_nothing() {
        let server = MockServer::start().await;
        let anonymous = GitHubStore::new("brik", "gallery", "main").with_api_base(server.uri());

        let create = anonymous.create("images/a.jpg", "Add a.jpg", b"x").await;
        let delete = anonymous.delete("images/a.jpg", "Delete a.jpg", &Revision::new("s")).await;

        assert_eq!(create.unwrap_err(), StoreError::AuthRequired);
        assert_eq!(delete.unwrap_err(), StoreError::AuthRequired);
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

// =============================================================================
// Status mapping
// =============================================================================

mod status_mapping {
    use super::*;

    async fn put_responding(status: u16, message: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(status).set_body_json(error(message)))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn stale_revision_is_conflict() {
        let server = put_responding(409, "is at abc but expected def").await;
        let err = store(&server)
            .update("images/beach/index.html", "m", b"x", &Revision::new("def"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn unprocessable_sha_on_update_is_conflict() {
        let server = put_responding(422, "Invalid request.\n\n\"sha\" wasn't supplied.").await;
        let err = store(&server)
            .update("images/beach/index.html", "m", b"x", &Revision::new("def"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn unprocessable_create_is_already_exists() {
        let server = put_responding(422, "Invalid request.\n\n\"sha\" wasn't supplied.").await;
        let err = store(&server)
            .create("images/beach/index.html", "m", b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn bad_token_is_auth_failed() {
        let server = put_responding(401, "Bad credentials").await;
        let err = store(&server).create("images/a.jpg", "m", b"x").await.unwrap_err();
        assert!(matches!(err, StoreError::AuthFailed(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn forbidden_rate_limit_is_rate_limited() {
        let server = put_responding(403, "API rate limit exceeded for user").await;
        let err = store(&server).create("images/a.jpg", "m", b"x").await.unwrap_err();
        assert_eq!(err, StoreError::RateLimited);
    }

    #[tokio::test]
    async fn forbidden_otherwise_is_auth_failed() {
        let server = put_responding(403, "Resource not accessible by integration").await;
        let err = store(&server).create("images/a.jpg", "m", b"x").await.unwrap_err();
        assert!(matches!(err, StoreError::AuthFailed(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn server_error_keeps_status() {
        let server = put_responding(502, "Bad Gateway").await;
        let err = store(&server).create("images/a.jpg", "m", b"x").await.unwrap_err();
        assert!(
            matches!(err, StoreError::ApiError { status: 502, .. }),
            "{:?}",
            err
        );
    }
}

// =============================================================================
// Live API (opt-in)
// =============================================================================

/// Reads the album registry of a real repository.
///
/// Run with `GALLERIST_LIVE_REPO=owner/name cargo test --features live_github_tests`.
#[cfg(feature = "live_github_tests")]
mod live {
    use super::*;

    #[tokio::test]
    async fn reads_album_registry() {
        let repo = std::env::var("GALLERIST_LIVE_REPO").expect("GALLERIST_LIVE_REPO not set");
        let (owner, name) = repo.split_once('/').expect("expected owner/name");
        let branch = std::env::var("GALLERIST_LIVE_BRANCH").unwrap_or_else(|_| "main".into());

        let mut store = GitHubStore::new(owner, name, branch);
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            store = store.with_token(token);
        }

        let file = store.read("images/index.html").await.unwrap();
        assert!(file.content.starts_with(b"---"));
    }
}
