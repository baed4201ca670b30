//! Google Cloud Storage blob store (JSON API)

use async_trait::async_trait;
use report_notifier_domain::{BlobStore, StateError};
use reqwest::{Client, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

pub const DEFAULT_GCS_BASE_URL: &str = "https://storage.googleapis.com";

/// Blob store backed by Google Cloud Storage.
///
/// Authenticates with an OAuth2 access token obtained outside this process
/// (e.g. `gcloud auth print-access-token` or the metadata server).
pub struct GcsBlobStore {
    client: Client,
    access_token: SecretString,
    base_url: Url,
}

impl GcsBlobStore {
    pub fn new(access_token: SecretString) -> Result<Self, StateError> {
        Self::with_base_url(access_token, DEFAULT_GCS_BASE_URL, Duration::from_secs(30))
    }

    /// Point at a different endpoint (emulator, tests)
    pub fn with_base_url(
        access_token: SecretString,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, StateError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StateError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(StateError::Config(format!(
                "Base URL cannot be used as a base: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StateError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            access_token,
            base_url,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn object_url(&self, bucket: &str, key: &str) -> Url {
        let mut url = self.url(&["storage", "v1", "b", bucket, "o", key]);
        url.query_pairs_mut().append_pair("alt", "media");
        url
    }

    fn upload_url(&self, bucket: &str, key: &str) -> Url {
        let mut url = self.url(&["upload", "storage", "v1", "b", bucket, "o"]);
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);
        url
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }
}

async fn check_status(response: Response, bucket: &str, key: &str) -> Result<Response, StateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => Err(StateError::NotFound(format!("gs://{}/{}", bucket, key))),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StateError::NotAuthenticated(
            format!("Storage rejected credentials (HTTP {})", status.as_u16()),
        )),
        _ => Err(StateError::Api {
            status: status.as_u16(),
            body,
        }),
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    async fn load(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StateError> {
        tracing::debug!(bucket = %bucket, key = %key, "Downloading blob");

        let response = self
            .client
            .get(self.object_url(bucket, key))
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        let response = check_status(response, bucket, key).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn save(&self, bucket: &str, key: &str, value: &[u8]) -> Result<(), StateError> {
        tracing::debug!(bucket = %bucket, key = %key, bytes = value.len(), "Uploading blob");

        let response = self
            .client
            .post(self.upload_url(bucket, key))
            .header("Authorization", self.bearer())
            .header("Content-Type", "application/json")
            .body(value.to_vec())
            .send()
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        check_status(response, bucket, key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(uri: &str) -> GcsBlobStore {
        GcsBlobStore::with_base_url(
            SecretString::new("test-token".into()),
            uri,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_downloads_media() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/storage/v1/b/reports-bucket/o/reported_posts.json"))
            .and(query_param("alt", "media"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"["1","2"]"#))
            .mount(&mock_server)
            .await;

        let bytes = store(&mock_server.uri())
            .load("reports-bucket", "reported_posts.json")
            .await
            .unwrap();

        assert_eq!(bytes, br#"["1","2"]"#.to_vec());
    }

    #[tokio::test]
    async fn test_load_missing_blob_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("No such object"))
            .mount(&mock_server)
            .await;

        let result = store(&mock_server.uri())
            .load("reports-bucket", "missing.json")
            .await;

        assert!(matches!(result, Err(StateError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_load_forbidden_is_not_authenticated() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let result = store(&mock_server.uri())
            .load("reports-bucket", "reported_posts.json")
            .await;

        assert!(matches!(result, Err(StateError::NotAuthenticated(_))));
    }

    #[tokio::test]
    async fn test_save_uploads_media() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/storage/v1/b/reports-bucket/o"))
            .and(query_param("uploadType", "media"))
            .and(query_param("name", "state/reported_posts.json"))
            .and(header("Content-Type", "application/json"))
            .and(body_string(r#"["1","2","3"]"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "state/reported_posts.json"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        store(&mock_server.uri())
            .save(
                "reports-bucket",
                "state/reported_posts.json",
                br#"["1","2","3"]"#,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_save_server_error_carries_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
            .mount(&mock_server)
            .await;

        let result = store(&mock_server.uri())
            .save("reports-bucket", "reported_posts.json", b"[]")
            .await;

        match result {
            Err(StateError::Api { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "backend unavailable");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_error() {
        let result = store("http://127.0.0.1:1")
            .load("reports-bucket", "reported_posts.json")
            .await;

        assert!(matches!(result, Err(StateError::Connection(_))));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = GcsBlobStore::with_base_url(
            SecretString::new("t".into()),
            "not a url",
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(StateError::Config(_))));
    }
}
