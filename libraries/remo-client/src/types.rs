//! Types for Remo API requests and responses.

use crate::batch::DEFAULT_BULK_SIZE;
use crate::resolver::ResolvedFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Configuration for connecting to a Remo server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the server (e.g., "http://localhost:8123")
    pub url: String,
    /// Total request timeout
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Byte threshold at which an upload batch is closed
    pub bulk_size: u64,
    /// Number of batches uploaded at the same time
    pub upload_concurrency: usize,
}

impl ServerConfig {
    /// Create a new server config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(10),
            bulk_size: DEFAULT_BULK_SIZE,
            upload_concurrency: 1,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    #[must_use]
    pub fn with_bulk_size(mut self, bulk_size: u64) -> Self {
        self.bulk_size = bulk_size;
        self
    }

    /// Values below 1 are treated as 1.
    #[must_use]
    pub fn with_upload_concurrency(mut self, upload_concurrency: usize) -> Self {
        self.upload_concurrency = upload_concurrency.max(1);
        self
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Form body for the login endpoint.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from successful login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// Opaque token sent back as `Authorization: Token <key>`
    pub key: Option<String>,
}

// =============================================================================
// Upload Types
// =============================================================================

/// Metadata shared by every file of an upload call.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Annotation task, e.g. "Object detection"
    pub annotation_task: Option<String>,
    pub folder_id: Option<i64>,
    pub annotation_set_id: Option<i64>,
    /// Class key to class name mapping, sent as `class_encoding_<key>` fields
    pub class_encoding: Option<BTreeMap<String, String>>,
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_annotation_task(mut self, annotation_task: impl Into<String>) -> Self {
        self.annotation_task = Some(annotation_task.into());
        self
    }

    #[must_use]
    pub fn with_folder_id(mut self, folder_id: i64) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    #[must_use]
    pub fn with_annotation_set_id(mut self, annotation_set_id: i64) -> Self {
        self.annotation_set_id = Some(annotation_set_id);
        self
    }

    #[must_use]
    pub fn with_class_encoding<K, V>(mut self, class_encoding: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.class_encoding = Some(
            class_encoding
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Multipart text fields carried by every batch.
    pub(crate) fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        if let Some(task) = self.annotation_task.as_deref().filter(|t| !t.is_empty()) {
            fields.push(("annotation_task".to_string(), task.to_string()));
        }
        if let Some(encoding) = &self.class_encoding {
            for (key, value) in encoding {
                fields.push((format!("class_encoding_{key}"), value.clone()));
            }
        }
        fields
    }
}

/// JSON body for server-side ingestion of local files or remote URLs.
#[derive(Debug, Serialize)]
pub(crate) struct IngestRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_files: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_task: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_encoding: Option<&'a BTreeMap<String, String>>,
}

impl<'a> IngestRequest<'a> {
    pub fn new(options: &'a UploadOptions) -> Self {
        Self {
            local_files: None,
            urls: None,
            annotation_task: options.annotation_task.as_deref().filter(|t| !t.is_empty()),
            folder_id: options.folder_id,
            class_encoding: options.class_encoding.as_ref(),
        }
    }
}

/// Result of uploading one batch.
#[derive(Debug, Clone)]
pub struct BatchUploadResult {
    /// Position of the batch in submission order
    pub index: usize,
    pub files: Vec<ResolvedFile>,
    pub outcome: BatchOutcome,
}

impl BatchUploadResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Uploaded { .. })
    }
}

/// What the server said about a batch.
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    /// 2xx with a JSON body
    Uploaded { status: u16, body: serde_json::Value },
    /// Non-2xx response, unreadable body, or a failure before a response
    /// arrived (no status)
    Failed { status: Option<u16>, body: String },
}

// =============================================================================
// Annotation Types
// =============================================================================

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationFormat {
    #[default]
    Json,
    Coco,
    Csv,
}

impl fmt::Display for AnnotationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnnotationFormat::Json => "json",
            AnnotationFormat::Coco => "coco",
            AnnotationFormat::Csv => "csv",
        })
    }
}

/// Coordinate system used in exported annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportCoordinates {
    #[default]
    Pixel,
    Percent,
}

impl fmt::Display for ExportCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportCoordinates::Pixel => "pixel",
            ExportCoordinates::Percent => "percent",
        })
    }
}

/// Options for annotation export.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub format: AnnotationFormat,
    pub coordinates: ExportCoordinates,
    /// Use full image paths (e.g. local paths) instead of file names
    pub full_path: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: AnnotationFormat::Json,
            coordinates: ExportCoordinates::Pixel,
            full_path: true,
        }
    }
}

/// New annotations for a single image.
#[derive(Debug, Clone)]
pub enum AnnotationPayload {
    /// Object detection: bounding boxes / polygons
    Objects(Vec<serde_json::Value>),
    /// Image classification: class entries
    Classes(Vec<serde_json::Value>),
}

/// Body of the create-annotation-set endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct CreateAnnotationSetRequest<'a> {
    pub annotation_task: &'a str,
    pub classes: &'a [String],
    pub dataset_id: i64,
    pub name: &'a str,
}

/// List endpoints answer either with a bare array or a paginated page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Page { results: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Page { results } | Listing::Bare(results) => results,
        }
    }
}
