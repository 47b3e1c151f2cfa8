//! Contract tests for ReleaserClient against a mocked mirror.

use releaser_client::{ClientError, Platform, ReleaserClient, AGENT_NAME};
use releaser_core::sha256_hex;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn linux() -> Platform {
    Platform::new("linux", "amd64")
}

async fn mount_binary(server: &MockServer, release: &str, body: &'static [u8], checksum: String) {
    Mock::given(method("GET"))
        .and(path(format!("/release/{release}/linux/amd64")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/checksum/{release}/linux/amd64")))
        .respond_with(ResponseTemplate::new(200).set_body_string(checksum))
        .mount(server)
        .await;
}

#[tokio::test]
async fn releases_parses_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/releases"))
        .and(header("user-agent", AGENT_NAME))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"releases": ["v1.0.0", "v2.0.0"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ReleaserClient::new(&server.uri()).unwrap();
    assert_eq!(client.releases().await.unwrap(), vec!["v1.0.0", "v2.0.0"]);
}

#[tokio::test]
async fn latest_returns_body_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_string("v2.0.0"))
        .mount(&server)
        .await;

    let client = ReleaserClient::new(&server.uri()).unwrap();
    assert_eq!(client.latest().await.unwrap(), "v2.0.0");
}

#[tokio::test]
async fn latest_surfaces_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(500).set_body_string("no releases available"))
        .mount(&server)
        .await;

    let client = ReleaserClient::new(&server.uri()).unwrap();
    let err = client.latest().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn download_verified_accepts_matching_checksum() {
    let server = MockServer::start().await;
    mount_binary(&server, "v2.0.0", b"archive", sha256_hex(b"archive")).await;

    let client = ReleaserClient::new(&server.uri()).unwrap();
    let bytes = client.download_verified("v2.0.0", &linux()).await.unwrap();
    assert_eq!(&bytes[..], b"archive");
}

#[tokio::test]
async fn download_verified_tolerates_uppercase_checksum() {
    let server = MockServer::start().await;
    mount_binary(&server, "v2.0.0", b"archive", sha256_hex(b"archive").to_uppercase()).await;

    let client = ReleaserClient::new(&server.uri()).unwrap();
    assert!(client.download_verified("v2.0.0", &linux()).await.is_ok());
}

#[tokio::test]
async fn download_verified_rejects_mismatch() {
    let server = MockServer::start().await;
    mount_binary(&server, "v2.0.0", b"tampered", sha256_hex(b"archive")).await;

    let client = ReleaserClient::new(&server.uri()).unwrap();
    match client.download_verified("v2.0.0", &linux()).await.unwrap_err() {
        ClientError::InvalidChecksum { expected, actual } => {
            assert_eq!(expected, sha256_hex(b"archive"));
            assert_eq!(actual, sha256_hex(b"tampered"));
        }
        other => panic!("expected InvalidChecksum, got: {other:?}"),
    }
}

#[tokio::test]
async fn binary_follows_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/release/v1.0.0/linux/amd64"))
        .respond_with(
            ResponseTemplate::new(307)
                .insert_header("location", format!("{}/upstream/tool.tar.gz", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/upstream/tool.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"old archive".as_slice()))
        .mount(&server)
        .await;

    let client = ReleaserClient::new(&server.uri()).unwrap();
    let bytes = client.binary("v1.0.0", &linux()).await.unwrap();
    assert_eq!(&bytes[..], b"old archive");
}

#[tokio::test]
async fn missing_checksum_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/checksum/v9/linux/amd64"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = ReleaserClient::new(&server.uri()).unwrap();
    assert_eq!(
        client.checksum("v9", &linux()).await.unwrap_err().status(),
        Some(404)
    );
}
