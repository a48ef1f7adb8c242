//! Backend endpoint paths, relative to the server base URL.
//!
//! Paths ending in `/` produce URLs with a trailing slash when no query
//! parameters are rendered.

pub const LOGIN: &str = "api/rest-auth/login/";

pub const DATASET: &str = "api/dataset/";
pub const V1_DATASETS: &str = "api/v1/ui/datasets/";
pub const V1_SDK_IMAGES: &str = "api/v1/sdk/images/";
pub const V1_SEARCH: &str = "api/v1/ui/search/";
pub const V1_CREATE_ANNOTATION_SET: &str = "api/v1/ui/annotation-sets/";

pub fn dataset_upload(dataset_id: i64) -> String {
    format!("api/dataset/{dataset_id}/upload/")
}

pub fn v1_sdk_dataset_images(dataset_id: i64) -> String {
    format!("api/v1/sdk/datasets/{dataset_id}/images/")
}

pub fn v1_dataset_images(dataset_id: i64) -> String {
    format!("api/v1/ui/datasets/{dataset_id}/images/")
}

pub fn dataset_folder_content(dataset_id: i64, folder_id: i64) -> String {
    format!("api/v1/ui/datasets/{dataset_id}/folders/{folder_id}/contents/")
}

pub fn v1_dataset_annotation_sets(dataset_id: i64) -> String {
    format!("api/v1/ui/datasets/{dataset_id}/annotation-sets/")
}

pub fn v1_annotation_set(annotation_set_id: i64) -> String {
    format!("api/v1/ui/annotation-sets/{annotation_set_id}/")
}

/// Legacy annotation set detail, the only view that lists classes.
pub fn annotation_set(annotation_set_id: i64) -> String {
    format!("api/annotation-set/{annotation_set_id}/")
}

pub fn v1_export_annotations(annotation_set_id: i64) -> String {
    format!("api/v1/ui/annotation-sets/{annotation_set_id}/export")
}

pub fn add_annotation(dataset_id: i64, annotation_set_id: i64, image_id: i64) -> String {
    format!(
        "api/v1/ui/datasets/{dataset_id}/annotation-sets/{annotation_set_id}/images/{image_id}/annotations/"
    )
}

pub fn annotation_info(dataset_id: i64, annotation_set_id: i64, image_id: i64) -> String {
    format!(
        "api/v1/ui/datasets/{dataset_id}/annotation-sets/{annotation_set_id}/images/{image_id}/"
    )
}
