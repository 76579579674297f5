//! Upload flow: a selected file and its label text become one `PUT /upload/{bucket}/{key}`.

use crate::api::PhotoApi;
use crate::encoding::encode_base64;
use crate::error::{Error, Result};
use crate::models::{ApiResponse, CustomLabels, UploadRequest, upload_key};
use crate::view::UploadView;
use std::path::Path;
use std::sync::Arc;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Your image is uploaded successfully!";
pub const UPLOAD_ERROR_MESSAGE: &str = "Error uploading photo. Please try again later.";

const FALLBACK_FILE_NAME: &str = "upload";

/// A file read from disk, ready to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Read the whole file. The MIME type is guessed from the extension.
    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(FALLBACK_FILE_NAME)
            .to_string();
        let content_type = mime_guess::from_path(path).first_or_octet_stream().essence_str().to_string();

        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    /// Shape the upload request for this file.
    pub fn into_request(self, bucket: &str, timestamp_ms: i64, labels: CustomLabels) -> UploadRequest {
        UploadRequest {
            bucket: bucket.to_string(),
            key: upload_key(timestamp_ms, &self.name),
            body: encode_base64(&self.bytes),
            content_type: self.content_type,
            custom_labels: labels,
        }
    }
}

/// What an upload did to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { key: String },
    Failed,
}

pub struct UploadFlow<A> {
    api: Arc<A>,
    bucket: String,
}

impl<A: PhotoApi> UploadFlow<A> {
    pub fn new(api: Arc<A>, bucket: impl Into<String>) -> Self {
        Self {
            api,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    #[tracing::instrument(skip(self, view))]
    pub async fn run<V: UploadView + ?Sized>(&self, view: &V, file: &Path, labels: &str) -> UploadOutcome {
        match self.send(file, labels).await {
            Ok((key, response)) if response.status == 200 => {
                tracing::info!(key = %key, "Photo uploaded");
                view.show_status(UPLOAD_SUCCESS_MESSAGE);
                view.clear_file_selection();
                UploadOutcome::Uploaded { key }
            }
            Ok((key, response)) => {
                tracing::error!(key = %key, status = response.status, "Upload returned unexpected status");
                view.show_status(UPLOAD_ERROR_MESSAGE);
                UploadOutcome::Failed
            }
            Err(e) => {
                tracing::error!(error = %e, "Error uploading photo");
                view.show_status(UPLOAD_ERROR_MESSAGE);
                UploadOutcome::Failed
            }
        }
    }

    async fn send(&self, file: &Path, labels: &str) -> Result<(String, ApiResponse<()>)> {
        if self.bucket.is_empty() {
            return Err(Error::InvalidInput("bucket is not configured".to_string()));
        }

        let image = ImageFile::read(file).await?;
        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        let request = image.into_request(&self.bucket, timestamp_ms, CustomLabels::parse(labels));

        tracing::debug!(key = %request.key, body_len = request.body.len(), "Encoded photo for upload");

        let response = self.api.upload_bucket_key_put(&request).await?;
        Ok((request.key, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPhotoApi;
    use crate::view::Page;
    use std::io::Write;
    use tempfile::TempDir;

    const BUCKET: &str = "image-search-data";

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    fn flow(mock: &MockPhotoApi) -> UploadFlow<MockPhotoApi> {
        UploadFlow::new(Arc::new(mock.clone()), BUCKET)
    }

    #[tokio::test]
    async fn test_read_guesses_content_type() {
        let dir = TempDir::new().unwrap();
        let png = write_file(&dir, "cat.png", b"png");
        let unknown = write_file(&dir, "notes.zzz", b"??");

        let image = ImageFile::read(&png).await.unwrap();
        assert_eq!(image.name, "cat.png");
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes, b"png");

        let image = ImageFile::read(&unknown).await.unwrap();
        assert_eq!(image.content_type, "application/octet-stream");
    }

    #[test]
    fn test_into_request_encodes_and_keys() {
        let image = ImageFile {
            name: "dog.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: b"Ma".to_vec(),
        };

        let request = image.into_request(BUCKET, 42, CustomLabels::parse("dog"));

        assert_eq!(request.bucket, BUCKET);
        assert_eq!(request.key, "42-dog.jpg");
        assert_eq!(request.body, "TWE=");
        assert_eq!(request.content_type_header(), "image/jpeg;base64");
        assert_eq!(request.custom_labels.header_value(), "dog");
    }

    #[tokio::test]
    async fn test_success_shows_message_and_clears_selection() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "beach.jpg", b"Man");
        let mock = MockPhotoApi::new();
        mock.push_upload(Ok(ApiResponse { status: 200, data: () }));
        let page = Page::new();
        page.select_file(&path);

        let outcome = flow(&mock).run(&page, &path, " sand , sea ").await;

        let UploadOutcome::Uploaded { key } = outcome else {
            panic!("expected upload to succeed, got {outcome:?}");
        };
        let (millis, name) = key.split_once('-').unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert_eq!(name, "beach.jpg");

        let state = page.snapshot();
        assert_eq!(state.upload_status.text, UPLOAD_SUCCESS_MESSAGE);
        assert!(state.upload_status.visible);
        assert!(state.file_selection.is_none());

        let calls = mock.upload_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].key, key);
        assert_eq!(calls[0].body, "TWFu");
        assert_eq!(calls[0].content_type, "image/jpeg");
        assert_eq!(calls[0].custom_labels.header_value(), "sand,sea");
    }

    #[tokio::test]
    async fn test_non_200_status_is_failure() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "beach.jpg", b"Man");
        let mock = MockPhotoApi::new();
        mock.push_upload(Ok(ApiResponse { status: 202, data: () }));
        let page = Page::new();
        page.select_file(&path);

        let outcome = flow(&mock).run(&page, &path, "").await;

        assert_eq!(outcome, UploadOutcome::Failed);
        let state = page.snapshot();
        assert_eq!(state.upload_status.text, UPLOAD_ERROR_MESSAGE);
        assert_eq!(state.file_selection, Some(path));
    }

    #[tokio::test]
    async fn test_api_error_is_failure() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "beach.jpg", b"Man");
        let mock = MockPhotoApi::new();
        mock.push_upload(Err(Error::Status {
            status: 403,
            message: "Forbidden".to_string(),
        }));
        let page = Page::new();

        let outcome = flow(&mock).run(&page, &path, "").await;

        assert_eq!(outcome, UploadOutcome::Failed);
        assert_eq!(page.snapshot().upload_status.text, UPLOAD_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_missing_file_fails_without_calling_api() {
        let dir = TempDir::new().unwrap();
        let mock = MockPhotoApi::new();
        let page = Page::new();

        let outcome = flow(&mock).run(&page, &dir.path().join("missing.png"), "").await;

        assert_eq!(outcome, UploadOutcome::Failed);
        assert_eq!(page.snapshot().upload_status.text, UPLOAD_ERROR_MESSAGE);
        assert_eq!(mock.call_count(), 0);
    }
}
