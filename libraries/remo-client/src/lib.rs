//! Remo Client
//!
//! HTTP client library for the Remo image and annotation server.
//!
//! # Features
//!
//! - **Authentication**: Login with email/password, token sent on every request
//! - **Bulk upload**: Files, directories and URLs, uploaded in size-bounded
//!   batches with bounded concurrency and throughput/ETA progress
//! - **Datasets and annotation sets**: Listing, creation, search and export
//! - **URL building**: Backend path and query conventions
//!
//! # Example
//!
//! ```ignore
//! use remo_client::{RemoClient, ServerConfig, UploadOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::new("http://localhost:8123").with_upload_concurrency(2);
//!     let client = RemoClient::connect(config, "user@example.com", "secret").await?;
//!
//!     let options = UploadOptions::new().with_annotation_task("Object detection");
//!     let results = client
//!         .uploads()
//!         .bulk_upload_files_with_progress(1, &["./images", "./labels.json"], &options, |report| {
//!             println!("{report}");
//!         })
//!         .await?;
//!
//!     let failed = results.iter().filter(|r| !r.is_success()).count();
//!     println!("{} batches, {} failed", results.len(), failed);
//!     Ok(())
//! }
//! ```

mod annotations;
mod auth;
mod batch;
mod client;
mod datasets;
mod domain;
pub mod endpoints;
mod error;
mod progress;
mod resolver;
mod types;
mod upload;
mod url_builder;

// Re-export main types
pub use batch::{split_files_by_size, UploadBatch, DEFAULT_BULK_SIZE};
pub use client::RemoClient;
pub use domain::{AnnotationSet, Dataset};
pub use error::{RemoError, Result};
pub use progress::{ProgressReport, UploadStatus};
pub use resolver::{is_task_compatible, mime_type_for_file, FileResolver, ResolvedFile, TaskFilter};
pub use types::{
    AnnotationFormat, AnnotationPayload, BatchOutcome, BatchUploadResult, ExportCoordinates,
    ExportOptions, LoginResponse, ServerConfig, UploadOptions,
};
pub use url_builder::{QueryValue, UrlBuilder};

// Re-export sub-clients for direct use if needed
pub use annotations::AnnotationClient;
pub use datasets::DatasetClient;
pub use upload::UploadClient;
