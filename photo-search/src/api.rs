//! Client abstraction for the photo API gateway.
//!
//! The `PhotoApi` trait exposes the two gateway operations so the flows can be exercised
//! against [`MockPhotoApi`] without making real HTTP calls.

use crate::error::{Error, Result};
use crate::models::{ApiErrorBody, ApiResponse, SearchQuery, SearchResponse, UploadRequest};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use std::time::Duration;
use url::Url;

/// Metadata header the indexer reads custom labels from.
pub const CUSTOM_LABELS_HEADER: &str = "x-amz-meta-customlabels";

/// Operations offered by the photo API gateway.
///
/// # Errors
/// Implementations return an error for transport failures and for any non-2xx status.
#[async_trait]
pub trait PhotoApi: Send + Sync {
    /// `GET /search?q=<q>`
    async fn search_get(&self, query: &SearchQuery) -> Result<ApiResponse<SearchResponse>>;

    /// `PUT /upload/{bucket}/{key}` with the base64 body and metadata headers
    async fn upload_bucket_key_put(&self, request: &UploadRequest) -> Result<ApiResponse<()>>;
}

// ============================================================================
// Production Implementation using reqwest
// ============================================================================

/// Production API client using reqwest.
#[derive(Clone)]
pub struct ReqwestPhotoApi {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestPhotoApi {
    /// Create a client for the gateway rooted at `base_url`.
    ///
    /// Without a timeout, requests use the transport default.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidInput(format!("API URL cannot be a base: {base_url}")));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append escaped path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Turn a failing response into [`Error::Status`], preferring the gateway's error message.
async fn status_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) if !body.is_empty() => body,
        Err(_) => status.canonical_reason().unwrap_or("unknown status").to_string(),
    };

    Error::Status {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl PhotoApi for ReqwestPhotoApi {
    #[tracing::instrument(skip(self), fields(q = %query.q))]
    async fn search_get(&self, query: &SearchQuery) -> Result<ApiResponse<SearchResponse>> {
        let url = self.endpoint(&["search"]);
        tracing::debug!(url = %url, "Executing search request");

        let response = self
            .client
            .get(url.clone())
            .query(query)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Search request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(response).await);
        }

        let body = response.text().await?;
        let data: SearchResponse = serde_json::from_str(&body)?;

        tracing::info!(status = status.as_u16(), results = data.len(), "Search request completed");

        Ok(ApiResponse {
            status: status.as_u16(),
            data,
        })
    }

    #[tracing::instrument(skip(self, request), fields(bucket = %request.bucket, key = %request.key))]
    async fn upload_bucket_key_put(&self, request: &UploadRequest) -> Result<ApiResponse<()>> {
        let url = self.endpoint(&["upload", &request.bucket, &request.key]);

        let content_type = HeaderValue::from_str(&request.content_type_header())
            .map_err(|e| Error::InvalidInput(format!("content type '{}': {e}", request.content_type)))?;
        let labels = HeaderValue::from_str(&request.custom_labels.header_value())
            .map_err(|e| Error::InvalidInput(format!("custom labels '{}': {e}", request.custom_labels)))?;

        tracing::debug!(
            url = %url,
            body_len = request.body.len(),
            content_type = %request.content_type,
            "Executing upload request"
        );

        let response = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, "image/*")
            .header(CUSTOM_LABELS_HEADER, labels)
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Upload request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(response).await);
        }

        tracing::info!(status = status.as_u16(), "Upload request completed");

        Ok(ApiResponse {
            status: status.as_u16(),
            data: (),
        })
    }
}

// ============================================================================
// Test/Mock Implementation
// ============================================================================

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

struct MockReply<T> {
    result: Result<ApiResponse<T>>,
    delay: Option<Duration>,
}

/// Mock API client for testing.
///
/// Replies are queued per operation and handed out in FIFO order. Every call is recorded.
///
/// # Example
/// ```ignore
/// let mock = MockPhotoApi::new();
/// mock.push_search(Ok(ApiResponse {
///     status: 200,
///     data: SearchResponse { keys: vec!["dog.jpg".to_string()] },
/// }));
/// ```
#[derive(Clone, Default)]
pub struct MockPhotoApi {
    search_replies: Arc<Mutex<VecDeque<MockReply<SearchResponse>>>>,
    upload_replies: Arc<Mutex<VecDeque<MockReply<()>>>>,
    search_calls: Arc<Mutex<Vec<SearchQuery>>>,
    upload_calls: Arc<Mutex<Vec<UploadRequest>>>,
}

impl MockPhotoApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_search(&self, result: Result<ApiResponse<SearchResponse>>) {
        self.search_replies.lock().push_back(MockReply { result, delay: None });
    }

    /// Queue a search reply that resolves only after `delay`.
    pub fn push_search_delayed(&self, result: Result<ApiResponse<SearchResponse>>, delay: Duration) {
        self.search_replies.lock().push_back(MockReply {
            result,
            delay: Some(delay),
        });
    }

    pub fn push_upload(&self, result: Result<ApiResponse<()>>) {
        self.upload_replies.lock().push_back(MockReply { result, delay: None });
    }

    pub fn search_calls(&self) -> Vec<SearchQuery> {
        self.search_calls.lock().clone()
    }

    pub fn upload_calls(&self) -> Vec<UploadRequest> {
        self.upload_calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.search_calls.lock().len() + self.upload_calls.lock().len()
    }
}

async fn resolve<T>(reply: Option<MockReply<T>>, operation: &str) -> Result<ApiResponse<T>> {
    let Some(reply) = reply else {
        return Err(Error::Other(anyhow::anyhow!("No mock response configured for {operation}")));
    };
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }
    reply.result
}

#[async_trait]
impl PhotoApi for MockPhotoApi {
    async fn search_get(&self, query: &SearchQuery) -> Result<ApiResponse<SearchResponse>> {
        self.search_calls.lock().push(query.clone());
        let reply = self.search_replies.lock().pop_front();
        resolve(reply, "GET /search").await
    }

    async fn upload_bucket_key_put(&self, request: &UploadRequest) -> Result<ApiResponse<()>> {
        self.upload_calls.lock().push(request.clone());
        let reply = self.upload_replies.lock().pop_front();
        resolve(reply, "PUT /upload").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomLabels;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn upload_request() -> UploadRequest {
        UploadRequest {
            bucket: "image-search-data".to_string(),
            key: "1700000000000-cat.png".to_string(),
            body: "TWFu".to_string(),
            content_type: "image/png".to_string(),
            custom_labels: CustomLabels::parse("cat, sofa"),
        }
    }

    fn client_for(server: &MockServer) -> ReqwestPhotoApi {
        let url = Url::parse(&server.uri()).unwrap();
        ReqwestPhotoApi::new(url, Some(Duration::from_secs(5))).unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_query_and_decodes_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "dogs and cats"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"keys": ["1-dog.jpg", "2-cat.jpg"]}"#))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server);
        let response = api.search_get(&SearchQuery::new("dogs and cats")).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.data.keys, vec!["1-dog.jpg", "2-cat.jpg"]);
    }

    #[tokio::test]
    async fn test_search_error_status_carries_gateway_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"error": "Internal Server Error"}"#))
            .mount(&server)
            .await;

        let api = client_for(&server);
        let err = api.search_get(&SearchQuery::new("trees")).await.unwrap_err();

        match err {
            Error::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_invalid_body_is_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let api = client_for(&server);
        let err = api.search_get(&SearchQuery::new("trees")).await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[tokio::test]
    async fn test_search_respects_base_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"keys": []}"#))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/v1", server.uri())).unwrap();
        let api = ReqwestPhotoApi::new(url, None).unwrap();
        let response = api.search_get(&SearchQuery::new("")).await.unwrap();
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn test_upload_sends_body_and_metadata_headers() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/upload/image-search-data/1700000000000-cat.png"))
            .and(header("content-type", "image/png;base64"))
            .and(header("accept", "image/*"))
            .and(header(CUSTOM_LABELS_HEADER, "cat,sofa"))
            .and(body_string("TWFu"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server);
        let response = api.upload_bucket_key_put(&upload_request()).await.unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_upload_escapes_key_segment() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/upload/image-search-data/1-my%20photo.jpg"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = upload_request();
        request.key = "1-my photo.jpg".to_string();

        let api = client_for(&server);
        api.upload_bucket_key_put(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_forbidden_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let api = client_for(&server);
        let err = api.upload_bucket_key_put(&upload_request()).await.unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn test_upload_rejects_unencodable_labels() {
        let server = MockServer::start().await;
        let mut request = upload_request();
        request.custom_labels = CustomLabels::parse("line\nbreak");

        let api = client_for(&server);
        let err = api.upload_bucket_key_put(&request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_cannot_be_a_base_url() {
        let url = Url::parse("mailto:someone@example.com").unwrap();
        assert!(ReqwestPhotoApi::new(url, None).is_err());
    }

    #[tokio::test]
    async fn test_mock_client_fifo_and_recording() {
        let mock = MockPhotoApi::new();
        mock.push_search(Ok(ApiResponse {
            status: 200,
            data: SearchResponse {
                keys: vec!["first".to_string()],
            },
        }));
        mock.push_search(Ok(ApiResponse {
            status: 200,
            data: SearchResponse::default(),
        }));

        let first = mock.search_get(&SearchQuery::new("a")).await.unwrap();
        let second = mock.search_get(&SearchQuery::new("b")).await.unwrap();
        assert_eq!(first.data.keys, vec!["first"]);
        assert!(second.data.is_empty());

        let calls = mock.search_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].q, "b");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_client_no_response() {
        let mock = MockPhotoApi::new();
        let result = mock.upload_bucket_key_put(&upload_request()).await;
        assert!(result.is_err());
        assert_eq!(mock.upload_calls().len(), 1);
    }
}
