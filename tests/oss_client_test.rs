//! OSS Client HTTP API Tests
//!
//! Tests for the OSS client against a mock S3-compatible endpoint.
//! These tests verify the HTTP requests made and how responses are mapped.

#[cfg(test)]
mod tests {
    use oss_uploadr::config::StorageConfig;
    use oss_uploadr::storage::{ObjectStore, OssClient, StaticCredentials, StorageError};
    use std::collections::HashMap;
    use std::io::Write;
    use wiremock::matchers::{body_bytes, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Helper to create a client pointing at the mock server
    async fn create_test_client(endpoint: String) -> OssClient {
        let config = StorageConfig {
            region: "cn-hangzhou".to_string(),
            bucket: "test-bucket".to_string(),
            endpoint: Some(endpoint),
            path_style: true,
        };
        let credentials = StaticCredentials::new("LTAI5tEXAMPLE", "EXAMPLEKEYxYz");
        OssClient::new(config, &credentials).await
    }

    fn temp_file(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_object_exists_true() {
        let mock_server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/test-bucket/releases/app.zip"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(mock_server.uri()).await;
        let exists = client
            .object_exists("test-bucket", "releases/app.zip")
            .await
            .unwrap();

        assert!(exists);
    }

    #[tokio::test]
    async fn test_object_exists_false_on_404() {
        let mock_server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/test-bucket/missing.zip"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(mock_server.uri()).await;
        let exists = client
            .object_exists("test-bucket", "missing.zip")
            .await
            .unwrap();

        assert!(!exists);
    }

    #[tokio::test]
    async fn test_object_exists_propagates_access_denied() {
        let mock_server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/test-bucket/secret.zip"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let client = create_test_client(mock_server.uri()).await;
        let result = client.object_exists("test-bucket", "secret.zip").await;

        assert!(matches!(
            result,
            Err(StorageError::RequestError {
                operation: "object_exists",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_head_object_returns_metadata_and_version() {
        let mock_server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/test-bucket/releases/app.zip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-amz-meta-unique-key", "4f2a9c1")
                    .insert_header("x-amz-version-id", "CAEQNhiBgMDJgZCA0BYiIDc4"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(mock_server.uri()).await;
        let info = client
            .head_object("test-bucket", "releases/app.zip")
            .await
            .unwrap();

        assert!(info.exists);
        assert_eq!(info.metadata_value("unique-key"), Some("4f2a9c1"));
        assert_eq!(info.version_id.as_deref(), Some("CAEQNhiBgMDJgZCA0BYiIDc4"));
    }

    #[tokio::test]
    async fn test_put_object_sends_file_and_metadata() {
        let mock_server = MockServer::start().await;
        let content = b"package contents";

        Mock::given(method("PUT"))
            .and(path("/test-bucket/releases/app.zip"))
            .and(header("x-amz-meta-unique-key", "4f2a9c1"))
            .and(body_bytes(content.to_vec()))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("ETag", "\"d41d8cd98f00b204e9800998ecf8427e\"")
                    .insert_header("x-amz-request-id", "5C3D9175B6FC201293AD4890")
                    .insert_header("x-amz-version-id", "CAEQNhiBgMDJgZCA0BYiIDc5"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let file = temp_file(content);
        let client = create_test_client(mock_server.uri()).await;
        let metadata = HashMap::from([("unique-key".to_string(), "4f2a9c1".to_string())]);

        let outcome = client
            .put_object_from_file("test-bucket", "releases/app.zip", file.path(), metadata)
            .await
            .unwrap();

        assert_eq!(outcome.status_code, 200);
        assert_eq!(outcome.request_id.as_deref(), Some("5C3D9175B6FC201293AD4890"));
        assert_eq!(outcome.version_id.as_deref(), Some("CAEQNhiBgMDJgZCA0BYiIDc5"));
        assert_eq!(
            outcome.etag.as_deref(),
            Some("\"d41d8cd98f00b204e9800998ecf8427e\"")
        );
    }

    #[tokio::test]
    async fn test_put_object_without_metadata() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/test-bucket/plain.txt"))
            .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"plain\""))
            .expect(1)
            .mount(&mock_server)
            .await;

        let file = temp_file(b"hello");
        let client = create_test_client(mock_server.uri()).await;

        let outcome = client
            .put_object_from_file("test-bucket", "plain.txt", file.path(), HashMap::new())
            .await
            .unwrap();

        assert_eq!(outcome.status_code, 200);
        assert_eq!(outcome.version_id, None);

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0]
            .headers
            .keys()
            .all(|name| !name.as_str().starts_with("x-amz-meta-")));
    }

    #[tokio::test]
    async fn test_put_object_error_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/test-bucket/denied.zip"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                r#"<?xml version="1.0" encoding="UTF-8"?>
                    <Error>
                        <Code>AccessDenied</Code>
                        <Message>Access Denied</Message>
                        <RequestId>5C3D9175B6FC201293AD4891</RequestId>
                    </Error>"#,
            ))
            .mount(&mock_server)
            .await;

        let file = temp_file(b"data");
        let client = create_test_client(mock_server.uri()).await;

        let err = client
            .put_object_from_file("test-bucket", "denied.zip", file.path(), HashMap::new())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("AccessDenied"));
    }
}
