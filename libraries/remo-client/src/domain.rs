//! Server-side resources with convenience methods that forward to the client.

use crate::client::RemoClient;
use crate::error::{RemoError, Result};
use crate::progress::ProgressReport;
use crate::types::{AnnotationPayload, BatchUploadResult, ExportOptions, UploadOptions};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Accept RFC 3339 timestamps as well as offset-less ones (taken as UTC).
/// Anything else becomes `None` instead of failing the whole listing.
fn lenient_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    match NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
    {
        Ok(naive) => Ok(Some(naive.and_utc())),
        Err(_) => {
            debug!(value = %raw, "Ignoring unparseable timestamp");
            Ok(None)
        }
    }
}

/// A dataset as returned by the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Dataset {
    pub id: i64,
    pub name: String,
    /// Number of images
    #[serde(default)]
    pub quantity: Option<u64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {} - '{}'", self.id, self.name)?;
        if let Some(quantity) = self.quantity {
            write!(f, ", #images: {quantity}")?;
        }
        Ok(())
    }
}

impl Dataset {
    /// Upload files, directories or URLs into this dataset.
    pub async fn upload_files<S: AsRef<str>>(
        &self,
        client: &RemoClient,
        inputs: &[S],
        options: &UploadOptions,
    ) -> Result<Vec<BatchUploadResult>> {
        client
            .uploads()
            .bulk_upload_files(self.id, inputs, options)
            .await
    }

    pub async fn upload_files_with_progress<S, F>(
        &self,
        client: &RemoClient,
        inputs: &[S],
        options: &UploadOptions,
        on_progress: F,
    ) -> Result<Vec<BatchUploadResult>>
    where
        S: AsRef<str>,
        F: FnMut(&ProgressReport),
    {
        client
            .uploads()
            .bulk_upload_files_with_progress(self.id, inputs, options, on_progress)
            .await
    }

    pub async fn annotation_sets(&self, client: &RemoClient) -> Result<Vec<AnnotationSet>> {
        client.datasets().list_annotation_sets(self.id).await
    }

    pub async fn images(
        &self,
        client: &RemoClient,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<serde_json::Value>> {
        client
            .datasets()
            .list_dataset_images(self.id, limit, offset)
            .await
    }

    pub async fn create_annotation_set(
        &self,
        client: &RemoClient,
        annotation_task: &str,
        name: &str,
        classes: &[String],
    ) -> Result<AnnotationSet> {
        client
            .annotations()
            .create_annotation_set(annotation_task, self.id, name, classes)
            .await
    }
}

/// An annotation set as returned by the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnnotationSet {
    pub id: i64,
    pub name: String,
    /// Annotation task, e.g. "Object detection"
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub dataset_id: Option<i64>,
    #[serde(default)]
    pub total_classes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub released_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_images: Option<u64>,
    #[serde(default)]
    pub top3_classes: Option<serde_json::Value>,
    #[serde(default)]
    pub total_annotation_objects: Option<u64>,
}

impl fmt::Display for AnnotationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Annotation set {} - '{}', task: {}, #classes: {}",
            self.id,
            self.name,
            self.task.as_deref().unwrap_or("None"),
            self.total_classes
                .map_or_else(|| "None".to_string(), |n| n.to_string()),
        )
    }
}

impl AnnotationSet {
    pub async fn classes(&self, client: &RemoClient) -> Result<Vec<String>> {
        client
            .annotations()
            .list_annotation_set_classes(self.id)
            .await
    }

    pub async fn export_annotations(
        &self,
        client: &RemoClient,
        options: &ExportOptions,
    ) -> Result<Vec<u8>> {
        client
            .annotations()
            .export_annotations(self.id, options)
            .await
    }

    /// Export annotations and write them to `output_file`.
    pub async fn export_annotations_to_file(
        &self,
        client: &RemoClient,
        output_file: &Path,
        options: &ExportOptions,
    ) -> Result<()> {
        let content = self.export_annotations(client, options).await?;
        tokio::fs::write(output_file, &content).await?;
        info!(
            annotation_set_id = self.id,
            path = %output_file.display(),
            bytes = content.len(),
            "Annotations exported"
        );
        Ok(())
    }

    /// Add annotations to an image of this set's dataset.
    ///
    /// Sets fetched without a `dataset_id` fail with
    /// [`RemoError::MissingDatasetId`] and send nothing.
    pub async fn add_annotation(
        &self,
        client: &RemoClient,
        image_id: i64,
        existing: &[serde_json::Value],
        payload: &AnnotationPayload,
    ) -> Result<Option<serde_json::Value>> {
        let Some(dataset_id) = self.dataset_id else {
            return Err(RemoError::MissingDatasetId(self.id));
        };
        client
            .annotations()
            .add_annotation(dataset_id, self.id, image_id, existing, payload)
            .await
    }
}
