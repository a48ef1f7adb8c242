//! Dataset upload operations.
//!
//! Bulk uploads go through four stages: inputs are resolved into files,
//! files are split into size-bounded batches, batches are posted as
//! multipart requests with bounded concurrency, and every finished batch
//! advances a single [`UploadStatus`] owned by the collecting loop.

use crate::batch::{split_files_by_size, UploadBatch};
use crate::client::{read_json, RemoClient};
use crate::endpoints;
use crate::error::{RemoError, Result};
use crate::progress::{ProgressReport, UploadStatus};
use crate::resolver::{mime_type_for_file, FileResolver, ResolvedFile};
use crate::types::{BatchOutcome, BatchUploadResult, IngestRequest, UploadOptions};
use futures_util::stream::{self, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::path::Path;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

/// Upload client for Remo datasets.
pub struct UploadClient<'a> {
    client: &'a RemoClient,
}

impl<'a> UploadClient<'a> {
    pub(crate) fn new(client: &'a RemoClient) -> Self {
        Self { client }
    }

    /// Upload a single local file.
    pub async fn upload_file(
        &self,
        dataset_id: i64,
        path: &Path,
        options: &UploadOptions,
    ) -> Result<serde_json::Value> {
        if !path.exists() {
            return Err(RemoError::FileNotFound(path.display().to_string()));
        }
        let size = tokio::fs::metadata(path).await?.len();
        let files = [ResolvedFile::Local {
            path: path.to_path_buf(),
            size,
        }];

        let form = build_form(&files, options).await?;
        let response = self
            .client
            .post_multipart(&self.upload_url(dataset_id, options), form)
            .await?;
        read_json(response, "upload response").await
    }

    /// Upload one batch as a single multipart request.
    ///
    /// Only a missing token is an error. Everything else that goes wrong is
    /// logged and reported through [`BatchOutcome::Failed`].
    pub async fn upload_files(
        &self,
        dataset_id: i64,
        batch: UploadBatch,
        options: &UploadOptions,
    ) -> Result<BatchUploadResult> {
        self.client.auth_header()?;

        let UploadBatch { index, files } = batch;
        let url = self.upload_url(dataset_id, options);
        debug!(
            batch = index,
            files = files.len(),
            bytes = files.iter().map(ResolvedFile::size).sum::<u64>(),
            "Uploading batch"
        );

        let outcome = match self.send_batch(&url, &files, options).await {
            Ok(outcome) => outcome,
            Err(RemoError::NotAuthenticated) => return Err(RemoError::NotAuthenticated),
            Err(e) => BatchOutcome::Failed {
                status: None,
                body: e.to_string(),
            },
        };

        if let BatchOutcome::Failed { status, body } = &outcome {
            warn!(
                batch = index,
                status = ?status,
                response = %body,
                files = ?files.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "Possible error uploading batch"
            );
        }

        Ok(BatchUploadResult {
            index,
            files,
            outcome,
        })
    }

    /// Resolve inputs (files, directories, URLs) and upload them in batches.
    ///
    /// Annotation-task filtering is active when `options` names a task.
    pub async fn bulk_upload_files<S: AsRef<str>>(
        &self,
        dataset_id: i64,
        inputs: &[S],
        options: &UploadOptions,
    ) -> Result<Vec<BatchUploadResult>> {
        self.bulk_upload_files_with_progress(dataset_id, inputs, options, |_| {})
            .await
    }

    /// Same as [`bulk_upload_files`](Self::bulk_upload_files), calling
    /// `on_progress` whenever the completed percentage goes up.
    pub async fn bulk_upload_files_with_progress<S, F>(
        &self,
        dataset_id: i64,
        inputs: &[S],
        options: &UploadOptions,
        on_progress: F,
    ) -> Result<Vec<BatchUploadResult>>
    where
        S: AsRef<str>,
        F: FnMut(&ProgressReport),
    {
        self.bulk_upload_files_with_resolver(
            dataset_id,
            inputs,
            &FileResolver::new(),
            options,
            on_progress,
        )
        .await
    }

    /// Same as [`bulk_upload_files_with_progress`](Self::bulk_upload_files_with_progress),
    /// expanding inputs with a caller-configured `resolver` (directory depth,
    /// missing-path handling, task filter).
    ///
    /// Task filtering still follows `options.annotation_task`.
    pub async fn bulk_upload_files_with_resolver<S, F>(
        &self,
        dataset_id: i64,
        inputs: &[S],
        resolver: &FileResolver,
        options: &UploadOptions,
        on_progress: F,
    ) -> Result<Vec<BatchUploadResult>>
    where
        S: AsRef<str>,
        F: FnMut(&ProgressReport),
    {
        self.client.auth_header()?;

        let files = resolver
            .clone()
            .annotation_task(options.annotation_task.is_some())
            .resolve(inputs)?;
        self.bulk_upload_resolved(dataset_id, files, options, on_progress)
            .await
    }

    /// Batch and upload already resolved files.
    ///
    /// Results are returned in completion order; each carries the batch
    /// `index` for callers that need submission order.
    pub async fn bulk_upload_resolved<F>(
        &self,
        dataset_id: i64,
        files: Vec<ResolvedFile>,
        options: &UploadOptions,
        mut on_progress: F,
    ) -> Result<Vec<BatchUploadResult>>
    where
        F: FnMut(&ProgressReport),
    {
        self.client.auth_header()?;

        let config = self.client.config();
        let mut status = UploadStatus::new(files.len());
        let batches = split_files_by_size(files, config.bulk_size);
        let concurrency = config.upload_concurrency.max(1);

        info!(
            dataset_id,
            files = status.total_count(),
            batches = batches.len(),
            concurrency,
            "Starting bulk upload"
        );

        let mut pending = stream::iter(batches)
            .map(|batch| self.upload_files(dataset_id, batch, options))
            .buffer_unordered(concurrency);

        let mut results = Vec::new();
        while let Some(result) = pending.next().await {
            let result = result?;

            status.update(result.files.len());
            if let Some(report) = status.progress() {
                info!("{}", report);
                on_progress(&report);
            }

            results.push(result);
        }

        let failed = results.iter().filter(|r| !r.is_success()).count();
        info!(
            dataset_id,
            batches = results.len(),
            failed,
            "Bulk upload finished"
        );

        Ok(results)
    }

    /// Ask the server to ingest files that already live on its host.
    pub async fn upload_local_files(
        &self,
        dataset_id: i64,
        local_files: &[String],
        options: &UploadOptions,
    ) -> Result<serde_json::Value> {
        let mut request = IngestRequest::new(options);
        request.local_files = Some(local_files);
        self.ingest(dataset_id, &request, options).await
    }

    /// Ask the server to download and ingest remote URLs.
    pub async fn upload_urls(
        &self,
        dataset_id: i64,
        urls: &[String],
        options: &UploadOptions,
    ) -> Result<serde_json::Value> {
        let mut request = IngestRequest::new(options);
        request.urls = Some(urls);
        self.ingest(dataset_id, &request, options).await
    }

    async fn ingest(
        &self,
        dataset_id: i64,
        request: &IngestRequest<'_>,
        options: &UploadOptions,
    ) -> Result<serde_json::Value> {
        let url = self
            .client
            .url(&endpoints::dataset_upload(dataset_id))
            .query("annotation_set_id", options.annotation_set_id)
            .build();

        let response = self.client.post_json(&url, request).await?;
        read_json(response, "upload response").await
    }

    fn upload_url(&self, dataset_id: i64, options: &UploadOptions) -> String {
        self.client
            .url(&endpoints::dataset_upload(dataset_id))
            .query("folder_id", options.folder_id)
            .query("annotation_set_id", options.annotation_set_id)
            .build()
    }

    async fn send_batch(
        &self,
        url: &str,
        files: &[ResolvedFile],
        options: &UploadOptions,
    ) -> Result<BatchOutcome> {
        let form = build_form(files, options).await?;
        let response = self.client.post_multipart(url, form).await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Ok(BatchOutcome::Failed {
                status: Some(status.as_u16()),
                body: text,
            });
        }

        Ok(match serde_json::from_str(&text) {
            Ok(body) => BatchOutcome::Uploaded {
                status: status.as_u16(),
                body,
            },
            Err(_) => BatchOutcome::Failed {
                status: Some(status.as_u16()),
                body: text,
            },
        })
    }
}

/// Build the multipart body: one `files` part per local file, one `urls`
/// field per remote file, then the shared metadata fields.
///
/// Each local file is opened here and owned by its part's body stream, so it
/// is closed once the request completes or is dropped.
async fn build_form(files: &[ResolvedFile], options: &UploadOptions) -> Result<Form> {
    let mut form = Form::new();

    for file in files {
        match file {
            ResolvedFile::Local { path, size } => {
                let handle = File::open(path).await?;
                let body = Body::wrap_stream(ReaderStream::new(handle));
                let mut part = Part::stream_with_length(body, *size).file_name(file.name());
                if let Some(mime) = mime_type_for_file(path) {
                    part = part.mime_str(mime.essence_str())?;
                }
                form = form.part("files", part);
            }
            ResolvedFile::Remote { url } => {
                form = form.text("urls", url.to_string());
            }
        }
    }

    for (key, value) in options.form_fields() {
        form = form.text(key, value);
    }

    Ok(form)
}
