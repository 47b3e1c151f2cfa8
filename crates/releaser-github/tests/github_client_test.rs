//! Contract tests for GithubClient against the GitHub releases REST API.
//!
//! Uses wiremock to simulate `api.github.com`.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET | `/repos/{owner}/{repo}/releases` | `list_releases_*` |
//! | GET | `/repos/{owner}/{repo}/releases/assets/{id}` | `download_asset_*` |

use releaser_core::{AssetId, ReleaseSource};
use releaser_github::{GithubClient, GithubConfig, GithubError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> GithubClient {
    let config = GithubConfig::local_mock(&mock_server.uri()).unwrap();
    GithubClient::new(config).unwrap()
}

fn release_json(tag: &str, commit: &str) -> serde_json::Value {
    serde_json::json!({
        "id": 1,
        "tag_name": tag,
        "name": tag.to_uppercase(),
        "target_commitish": commit,
        "draft": false,
        "prerelease": false,
        "assets": [
            {"id": 100, "name": "checksums.txt", "size": 10},
            {"id": 101, "name": format!("proj_{tag}_linux_amd64.tar.gz"), "size": 20}
        ]
    })
}

// ── GET /repos/{owner}/{repo}/releases ───────────────────────────────

#[tokio::test]
async fn list_releases_maps_fields_and_keeps_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases"))
        .and(query_param("page", "1"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            release_json("v2.0.0", "c2"),
            release_json("v1.0.0", "c1"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let releases = client.list_releases("acme", "tool").await.unwrap();

    assert_eq!(releases.len(), 2);
    assert_eq!(releases[0].name, "V2.0.0");
    assert_eq!(releases[0].tag, "v2.0.0");
    assert_eq!(releases[0].commit, "c2");
    assert_eq!(releases[1].assets[1].name, "proj_v1.0.0_linux_amd64.tar.gz");
}

#[tokio::test]
async fn list_releases_follows_full_pages() {
    let mock_server = MockServer::start().await;

    let mut config = GithubConfig::local_mock(&mock_server.uri()).unwrap();
    config.per_page = 2;
    let client = GithubClient::new(config).unwrap();

    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            release_json("v3.0.0", "c3"),
            release_json("v2.0.0", "c2"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([release_json("v1.0.0", "c1")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let releases = client.releases("acme", "tool").await.unwrap();
    let tags: Vec<_> = releases.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(tags, vec!["v3.0.0", "v2.0.0", "v1.0.0"]);
}

#[tokio::test]
async fn list_releases_skips_drafts() {
    let mock_server = MockServer::start().await;

    let mut config = GithubConfig::local_mock(&mock_server.uri()).unwrap();
    config.per_page = 2;
    let client = GithubClient::new(config).unwrap();

    let mut draft = release_json("v3.0.0", "c3");
    draft["draft"] = serde_json::json!(true);

    // A full page still advances pagination even when a draft is dropped.
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([draft, release_json("v2.0.0", "c2")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([release_json("v1.0.0", "c1")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let releases = client.releases("acme", "tool").await.unwrap();
    let tags: Vec<_> = releases.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(tags, vec!["v2.0.0", "v1.0.0"]);
}

#[tokio::test]
async fn list_releases_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases"))
        .and(header("authorization", "Bearer ghp_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = GithubConfig::local_mock(&mock_server.uri()).unwrap();
    config.token = Some(zeroize::Zeroizing::new("ghp_test".into()));
    let client = GithubClient::new(config).unwrap();

    assert!(client.releases("acme", "tool").await.unwrap().is_empty());
}

#[tokio::test]
async fn list_releases_surfaces_api_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/missing/releases"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    match client.releases("acme", "missing").await.unwrap_err() {
        GithubError::ApiError { status, body, .. } => {
            assert_eq!(status, 404);
            assert!(body.contains("Not Found"));
        }
        other => panic!("expected ApiError, got: {other:?}"),
    }
}

#[tokio::test]
async fn list_releases_rejects_malformed_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    assert!(matches!(
        client.releases("acme", "tool").await,
        Err(GithubError::Deserialization { .. })
    ));
}

#[tokio::test]
async fn list_releases_unreachable_is_http_error() {
    let config = GithubConfig::local_mock("http://127.0.0.1:1").unwrap();
    let client = GithubClient::new(config).unwrap();
    assert!(matches!(
        client.releases("acme", "tool").await,
        Err(GithubError::Http { .. })
    ));
}

// ── GET /repos/{owner}/{repo}/releases/assets/{id} ───────────────────

#[tokio::test]
async fn download_asset_requests_octet_stream() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases/assets/101"))
        .and(header("accept", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x1f\x8bbinary".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let bytes = client
        .download_asset("acme", "tool", AssetId(101))
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"\x1f\x8bbinary");
}

#[tokio::test]
async fn download_asset_surfaces_api_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases/assets/7"))
        .respond_with(ResponseTemplate::new(403).set_body_string("rate limited"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    match client.asset("acme", "tool", AssetId(7)).await.unwrap_err() {
        GithubError::ApiError { status, .. } => assert_eq!(status, 403),
        other => panic!("expected ApiError, got: {other:?}"),
    }
}
