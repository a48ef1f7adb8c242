//! Annotation set and annotation operations.

use crate::client::{read_json, RemoClient};
use crate::domain::AnnotationSet;
use crate::endpoints;
use crate::error::Result;
use crate::types::{AnnotationPayload, CreateAnnotationSetRequest, ExportOptions};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Annotation client for Remo.
pub struct AnnotationClient<'a> {
    client: &'a RemoClient,
}

impl<'a> AnnotationClient<'a> {
    pub(crate) fn new(client: &'a RemoClient) -> Self {
        Self { client }
    }

    /// Create an empty annotation set in a dataset.
    pub async fn create_annotation_set(
        &self,
        annotation_task: &str,
        dataset_id: i64,
        name: &str,
        classes: &[String],
    ) -> Result<AnnotationSet> {
        let url = self
            .client
            .url(endpoints::V1_CREATE_ANNOTATION_SET)
            .build();
        debug!(url = %url, dataset_id, name = %name, "Creating annotation set");

        let request = CreateAnnotationSetRequest {
            annotation_task,
            classes,
            dataset_id,
            name,
        };
        let response = self.client.post_json(&url, &request).await?;
        read_json(response, "annotation set").await
    }

    pub async fn get_annotation_set(&self, annotation_set_id: i64) -> Result<AnnotationSet> {
        let url = self
            .client
            .url(&endpoints::v1_annotation_set(annotation_set_id))
            .build();
        self.client.get_json(&url, "annotation set").await
    }

    /// Class names defined in an annotation set.
    pub async fn list_annotation_set_classes(&self, annotation_set_id: i64) -> Result<Vec<String>> {
        let url = self
            .client
            .url(&endpoints::annotation_set(annotation_set_id))
            .build();
        let detail: ClassesResponse = self.client.get_json(&url, "annotation set").await?;
        Ok(detail.classes)
    }

    /// Export annotations; returns the file content as produced by the server.
    pub async fn export_annotations(
        &self,
        annotation_set_id: i64,
        options: &ExportOptions,
    ) -> Result<Vec<u8>> {
        let url = self
            .client
            .url(&endpoints::v1_export_annotations(annotation_set_id))
            .query("annotation_format", options.format.to_string())
            .query("export_coordinates", options.coordinates.to_string())
            .query("full_path", options.full_path.to_string())
            .build();
        debug!(url = %url, "Exporting annotations");

        self.client.get_bytes(&url).await
    }

    /// Add annotations to an image, on top of `existing` ones.
    ///
    /// Returns `None` without contacting the server when there is nothing
    /// to add.
    pub async fn add_annotation(
        &self,
        dataset_id: i64,
        annotation_set_id: i64,
        image_id: i64,
        existing: &[Value],
        payload: &AnnotationPayload,
    ) -> Result<Option<Value>> {
        let body = match payload {
            AnnotationPayload::Objects(objects) if !objects.is_empty() => {
                json!({ "objects": existing.iter().chain(objects).collect::<Vec<_>>() })
            }
            AnnotationPayload::Classes(classes) if !classes.is_empty() => {
                json!({ "classes": existing.iter().chain(classes).collect::<Vec<_>>() })
            }
            _ => return Ok(None),
        };

        let url = self
            .client
            .url(&endpoints::add_annotation(dataset_id, annotation_set_id, image_id))
            .build();
        let response = self.client.post_json(&url, &body).await?;
        read_json(response, "annotation response").await.map(Some)
    }

    pub async fn get_annotation_info(
        &self,
        dataset_id: i64,
        annotation_set_id: i64,
        image_id: i64,
    ) -> Result<Value> {
        let url = self
            .client
            .url(&endpoints::annotation_info(dataset_id, annotation_set_id, image_id))
            .build();
        self.client.get_json(&url, "annotation info").await
    }
}

#[derive(Debug, Deserialize)]
struct ClassesResponse {
    #[serde(default)]
    classes: Vec<String>,
}
