//! Dataset and image operations.

use crate::client::{read_json, RemoClient};
use crate::domain::{AnnotationSet, Dataset};
use crate::endpoints;
use crate::error::Result;
use crate::types::Listing;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Dataset client for Remo.
pub struct DatasetClient<'a> {
    client: &'a RemoClient,
}

impl<'a> DatasetClient<'a> {
    pub(crate) fn new(client: &'a RemoClient) -> Self {
        Self { client }
    }

    /// Create a new, empty dataset.
    pub async fn create_dataset(&self, name: &str) -> Result<Dataset> {
        let url = self.client.url(endpoints::DATASET).build();
        debug!(url = %url, name = %name, "Creating dataset");

        let response = self.client.post_json(&url, &json!({ "name": name })).await?;
        read_json(response, "dataset").await
    }

    pub async fn list_datasets(&self) -> Result<Vec<Dataset>> {
        let url = self.client.url(endpoints::V1_DATASETS).build();
        let listing: Listing<Dataset> = self.client.get_json(&url, "dataset list").await?;
        Ok(listing.into_vec())
    }

    pub async fn get_dataset(&self, dataset_id: i64) -> Result<Dataset> {
        let url = self
            .client
            .url(endpoints::V1_DATASETS)
            .segment(dataset_id)
            .tail_slash(true)
            .build();
        self.client.get_json(&url, "dataset").await
    }

    /// Image records of a dataset, paginated by `limit` / `offset`.
    pub async fn list_dataset_images(
        &self,
        dataset_id: i64,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Value>> {
        let url = self
            .client
            .url(&endpoints::v1_sdk_dataset_images(dataset_id))
            .query("limit", limit)
            .query("offset", offset)
            .build();
        let listing: Listing<Value> = self.client.get_json(&url, "dataset images").await?;
        Ok(listing.into_vec())
    }

    /// Top-level contents (images and folders) of a dataset.
    pub async fn list_dataset_contents(&self, dataset_id: i64, limit: Option<u32>) -> Result<Value> {
        let url = self
            .client
            .url(&endpoints::v1_dataset_images(dataset_id))
            .query("limit", limit)
            .build();
        self.client.get_json(&url, "dataset contents").await
    }

    pub async fn list_dataset_contents_by_folder(
        &self,
        dataset_id: i64,
        folder_id: i64,
        limit: Option<u32>,
    ) -> Result<Value> {
        let url = self
            .client
            .url(&endpoints::dataset_folder_content(dataset_id, folder_id))
            .query("limit", limit)
            .build();
        self.client.get_json(&url, "folder contents").await
    }

    pub async fn list_annotation_sets(&self, dataset_id: i64) -> Result<Vec<AnnotationSet>> {
        let url = self
            .client
            .url(&endpoints::v1_dataset_annotation_sets(dataset_id))
            .build();
        let listing: Listing<AnnotationSet> =
            self.client.get_json(&url, "annotation set list").await?;
        Ok(listing.into_vec())
    }

    pub async fn get_image(&self, image_id: i64) -> Result<Value> {
        let url = self
            .client
            .url(endpoints::V1_SDK_IMAGES)
            .segment(image_id)
            .tail_slash(true)
            .build();
        self.client.get_json(&url, "image").await
    }

    /// Raw image bytes from a server-relative path.
    pub async fn get_image_content(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.client.url(path).build();
        self.client.get_bytes(&url).await
    }

    /// Find images matching all given classes, optionally scoped to a task
    /// and a dataset.
    pub async fn search_images(
        &self,
        classes: &[String],
        task: Option<&str>,
        dataset_id: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Value>> {
        let url = self
            .client
            .url(endpoints::V1_SEARCH)
            .query("tasks", task)
            .query("classes", classes)
            .query("dataset_id", dataset_id)
            .query("limit", limit)
            .build();
        debug!(url = %url, "Searching images");

        let page: SearchResponse = self.client.get_json(&url, "search response").await?;
        Ok(page.results)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Value>,
}
