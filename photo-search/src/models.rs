//! Request and response types exchanged with the photo API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Query parameters for `GET /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self { q: q.into() }
    }
}

/// Body of a successful search: the storage keys of matching images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub keys: Vec<String>,
}

impl SearchResponse {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Error body the gateway returns alongside a failing status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Status and decoded payload of a completed API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: T,
}

/// Free-text labels attached to an upload as object metadata.
///
/// The indexer splits the metadata value on commas, so labels are trimmed and empty
/// entries dropped before they are re-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomLabels(Vec<String>);

impl CustomLabels {
    pub fn parse(text: &str) -> Self {
        Self(
            text.split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Value sent in the `x-amz-meta-customlabels` header.
    pub fn header_value(&self) -> String {
        self.0.join(",")
    }
}

impl fmt::Display for CustomLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header_value())
    }
}

/// A fully shaped `PUT /upload/{bucket}/{key}` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub bucket: String,
    pub key: String,
    /// Base64 text of the file content
    pub body: String,
    /// MIME type of the original file, without the `;base64` suffix
    pub content_type: String,
    pub custom_labels: CustomLabels,
}

impl UploadRequest {
    /// `Content-Type` header value: the file's MIME type tagged as base64.
    pub fn content_type_header(&self) -> String {
        format!("{};base64", self.content_type)
    }
}

/// Build an upload key from a timestamp and the original file name.
///
/// Two uploads of the same file name within the same millisecond collide.
pub fn upload_key(timestamp_ms: i64, file_name: &str) -> String {
    format!("{timestamp_ms}-{file_name}")
}
