//! Tests for the Remo client library.
//!
//! These tests use mock servers to verify client behavior without
//! requiring a real server connection.

use remo_client::{
    AnnotationPayload, BatchOutcome, ExportOptions, FileResolver, RemoClient, RemoError,
    ServerConfig, UploadOptions,
};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{any, body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "0123456789abcdef";

fn authed_client(server: &MockServer) -> RemoClient {
    RemoClient::with_token(ServerConfig::new(server.uri()), TOKEN).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("remo_client=debug")
        .with_test_writer()
        .try_init();
}

fn write_files(dir: &Path, names: &[&str], len: usize) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            let file = dir.join(name);
            std::fs::write(&file, vec![b'x'; len]).unwrap();
            file.display().to_string()
        })
        .collect()
}

// =============================================================================
// Authentication Tests
// =============================================================================

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_successful_login() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/rest-auth/login/"))
            .and(body_string_contains("email=user%40example.com"))
            .and(body_string_contains("password=secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "key": "issued_token"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = ServerConfig::new(mock_server.uri());
        let client = RemoClient::connect(config, "user@example.com", "secret")
            .await
            .unwrap();

        assert!(client.is_authenticated());
        assert_eq!(client.token(), Some("issued_token"));
        assert_eq!(client.auth_header().unwrap(), "Token issued_token");
    }

    #[tokio::test]
    async fn test_rejected_login_carries_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/rest-auth/login/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "non_field_errors": ["Unable to log in with provided credentials."]
            })))
            .mount(&mock_server)
            .await;

        let config = ServerConfig::new(mock_server.uri());
        let result = RemoClient::connect(config, "user@example.com", "wrong").await;

        match result {
            Err(RemoError::AuthFailed(body)) => {
                assert!(body.contains("Unable to log in"));
            }
            Err(e) => panic!("Expected AuthFailed, got: {:?}", e),
            Ok(_) => panic!("Expected AuthFailed, got a client"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_leaves_client_unauthenticated() {
        init_tracing();
        let config = ServerConfig::new("http://127.0.0.1:1");
        let client = RemoClient::connect(config, "user@example.com", "secret")
            .await
            .expect("connection failures are not fatal");

        assert!(!client.is_authenticated());
        assert!(matches!(
            client.datasets().list_datasets().await,
            Err(RemoError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_login_timeout_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/rest-auth/login/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"key": "late_token"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        // The server accepted the connection, so a slow reply is not "offline"
        let config = ServerConfig::new(mock_server.uri()).with_timeout(Duration::from_millis(200));
        let result = RemoClient::connect(config, "user@example.com", "secret").await;

        match result {
            Err(RemoError::Request(e)) => assert!(e.is_timeout()),
            Err(e) => panic!("Expected request timeout, got: {:?}", e),
            Ok(_) => panic!("Expected request timeout, got a client"),
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_calls_send_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = RemoClient::new(ServerConfig::new(mock_server.uri())).unwrap();
        let temp = tempfile::TempDir::new().unwrap();
        let inputs = write_files(temp.path(), &["a.jpg"], 4);

        assert!(matches!(
            client.datasets().get_dataset(1).await,
            Err(RemoError::NotAuthenticated)
        ));
        assert!(matches!(
            client
                .uploads()
                .bulk_upload_files(1, &inputs, &UploadOptions::new())
                .await,
            Err(RemoError::NotAuthenticated)
        ));
        assert!(matches!(
            client
                .uploads()
                .upload_urls(1, &["https://example.com/a.jpg".to_string()], &UploadOptions::new())
                .await,
            Err(RemoError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_token_header_is_attached() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/ui/datasets/"))
            .and(header("Authorization", "Token 0123456789abcdef"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"id": 1, "name": "cats", "quantity": 3}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let datasets = authed_client(&mock_server)
            .datasets()
            .list_datasets()
            .await
            .unwrap();

        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].name, "cats");
    }
}

// =============================================================================
// Bulk Upload Tests
// =============================================================================

mod bulk_upload {
    use super::*;

    fn upload_ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"}))
    }

    #[tokio::test]
    async fn test_batches_split_at_threshold() {
        init_tracing();
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/dataset/1/upload/"))
            .and(header("Authorization", "Token 0123456789abcdef"))
            .respond_with(upload_ok())
            .expect(2)
            .mount(&mock_server)
            .await;

        let config = ServerConfig::new(mock_server.uri()).with_bulk_size(8);
        let client = RemoClient::with_token(config, TOKEN).unwrap();

        let temp = tempfile::TempDir::new().unwrap();
        let inputs = write_files(
            temp.path(),
            &["f1.jpg", "f2.jpg", "f3.jpg", "f4.jpg", "f5.jpg"],
            2,
        );

        let mut reported = Vec::new();
        let results = client
            .uploads()
            .bulk_upload_files_with_progress(1, &inputs, &UploadOptions::new(), |report| {
                reported.push(report.percentage);
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].files.len(), 4);
        assert_eq!(results[1].files.len(), 1);
        assert!(results.iter().all(|r| r.is_success()));
        assert_eq!(reported, vec![80, 100]);
    }

    #[tokio::test]
    async fn test_multipart_body_and_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/dataset/7/upload/"))
            .and(query_param("folder_id", "9"))
            .and(query_param("annotation_set_id", "3"))
            .respond_with(upload_ok())
            .expect(1)
            .mount(&mock_server)
            .await;

        let temp = tempfile::TempDir::new().unwrap();
        let mut inputs = write_files(temp.path(), &["cat.jpg"], 16);
        inputs.push("https://example.com/images/dog.jpg".to_string());

        let options = UploadOptions::new()
            .with_annotation_task("Object detection")
            .with_folder_id(9)
            .with_annotation_set_id(3)
            .with_class_encoding([("1", "cat"), ("2", "dog")]);

        let results = authed_client(&mock_server)
            .uploads()
            .bulk_upload_files(7, &inputs, &options)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_success());

        let requests = mock_server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains(r#"name="files"; filename="cat.jpg""#));
        assert!(body.contains("image/jpeg"));
        assert!(body.contains(r#"name="urls""#));
        assert!(body.contains("https://example.com/images/dog.jpg"));
        assert!(body.contains(r#"name="annotation_task""#));
        assert!(body.contains("Object detection"));
        assert!(body.contains(r#"name="class_encoding_1""#));
        assert!(body.contains(r#"name="class_encoding_2""#));
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_stop_pipeline() {
        init_tracing();
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/dataset/1/upload/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("storage full"))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/dataset/1/upload/"))
            .respond_with(upload_ok())
            .mount(&mock_server)
            .await;

        let config = ServerConfig::new(mock_server.uri()).with_bulk_size(4);
        let client = RemoClient::with_token(config, TOKEN).unwrap();

        let temp = tempfile::TempDir::new().unwrap();
        let inputs = write_files(temp.path(), &["a.jpg", "b.jpg", "c.jpg"], 4);

        let mut reported = Vec::new();
        let results = client
            .uploads()
            .bulk_upload_files_with_progress(1, &inputs, &UploadOptions::new(), |report| {
                reported.push(report.percentage);
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        match &results[0].outcome {
            BatchOutcome::Failed { status, body } => {
                assert_eq!(*status, Some(500));
                assert_eq!(body, "storage full");
            }
            other => panic!("Expected failed batch, got: {:?}", other),
        }
        assert!(results[1].is_success());
        assert!(results[2].is_success());

        // Failed batches still count toward progress
        assert_eq!(reported, vec![33, 66, 100]);
    }

    #[tokio::test]
    async fn test_concurrent_batches_all_complete() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/dataset/2/upload/"))
            .respond_with(upload_ok())
            .expect(4)
            .mount(&mock_server)
            .await;

        let config = ServerConfig::new(mock_server.uri())
            .with_bulk_size(1)
            .with_upload_concurrency(3);
        let client = RemoClient::with_token(config, TOKEN).unwrap();

        let temp = tempfile::TempDir::new().unwrap();
        let inputs = write_files(temp.path(), &["a.jpg", "b.jpg", "c.jpg", "d.jpg"], 1);

        let results = client
            .uploads()
            .bulk_upload_files(2, &inputs, &UploadOptions::new())
            .await
            .unwrap();

        let mut indices = results.iter().map(|r| r.index).collect::<Vec<_>>();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(results.iter().all(|r| r.files.len() == 1));
    }

    #[tokio::test]
    async fn test_unreadable_file_fails_only_its_batch() {
        init_tracing();
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/dataset/1/upload/"))
            .respond_with(upload_ok())
            .expect(2)
            .mount(&mock_server)
            .await;

        let config = ServerConfig::new(mock_server.uri()).with_bulk_size(1);
        let client = RemoClient::with_token(config, TOKEN).unwrap();

        let temp = tempfile::TempDir::new().unwrap();
        let inputs = write_files(temp.path(), &["a.jpg", "b.jpg", "c.jpg"], 1);
        let files = FileResolver::new().resolve(&inputs).unwrap();

        // Gone between resolution and upload
        std::fs::remove_file(temp.path().join("b.jpg")).unwrap();

        let mut reported = Vec::new();
        let results = client
            .uploads()
            .bulk_upload_resolved(1, files, &UploadOptions::new(), |report| {
                reported.push(report.percentage);
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(
            results.iter().map(|r| r.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(results[0].is_success());
        assert!(matches!(
            results[1].outcome,
            BatchOutcome::Failed { status: None, .. }
        ));
        assert!(results[2].is_success());
        assert_eq!(reported, vec![33, 66, 100]);
    }

    #[tokio::test]
    async fn test_concurrent_progress_strictly_increases() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/dataset/3/upload/"))
            .respond_with(upload_ok().set_delay(Duration::from_millis(20)))
            .expect(7)
            .mount(&mock_server)
            .await;

        let config = ServerConfig::new(mock_server.uri())
            .with_bulk_size(1)
            .with_upload_concurrency(4);
        let client = RemoClient::with_token(config, TOKEN).unwrap();

        let temp = tempfile::TempDir::new().unwrap();
        let names = ["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg", "f.jpg", "g.jpg"];
        let inputs = write_files(temp.path(), &names, 1);

        let mut reported = Vec::new();
        let results = client
            .uploads()
            .bulk_upload_files_with_progress(3, &inputs, &UploadOptions::new(), |report| {
                assert!(report.current_count <= report.total_count);
                reported.push(report.percentage);
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 7);
        assert!(!reported.is_empty());
        assert!(reported.windows(2).all(|w| w[0] < w[1]), "{:?}", reported);
        assert_eq!(reported.last(), Some(&100));
    }

    #[tokio::test]
    async fn test_custom_resolver_controls_expansion() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/dataset/1/upload/"))
            .respond_with(upload_ok())
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = authed_client(&mock_server);

        let temp = tempfile::TempDir::new().unwrap();
        write_files(temp.path(), &["top.jpg"], 4);
        let nested = temp.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        write_files(&nested, &["deep.jpg"], 4);

        let inputs = vec![
            temp.path().display().to_string(),
            temp.path().join("missing.jpg").display().to_string(),
        ];
        let resolver = FileResolver::new().recursive(false).skip_missing(true);

        let results = client
            .uploads()
            .bulk_upload_files_with_resolver(1, &inputs, &resolver, &UploadOptions::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].files.len(), 1);
        assert_eq!(results[0].files[0].name(), "top.jpg");
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_upload() {
        let mock_server = MockServer::start().await;

        Mock::given(any())
            .respond_with(upload_ok())
            .expect(0)
            .mount(&mock_server)
            .await;

        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("missing.jpg").display().to_string();

        let result = authed_client(&mock_server)
            .uploads()
            .bulk_upload_files(1, &[missing], &UploadOptions::new())
            .await;

        assert!(matches!(result, Err(RemoError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_annotation_task_filters_inputs() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/dataset/1/upload/"))
            .respond_with(upload_ok())
            .expect(1)
            .mount(&mock_server)
            .await;

        let temp = tempfile::TempDir::new().unwrap();
        write_files(temp.path(), &["img.png", "labels.csv", "readme.txt"], 3);

        let options = UploadOptions::new().with_annotation_task("Image classification");
        let results = authed_client(&mock_server)
            .uploads()
            .bulk_upload_files(1, &[temp.path().display().to_string()], &options)
            .await
            .unwrap();

        let names = results[0]
            .files
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["img.png", "labels.csv"]);
    }

    #[tokio::test]
    async fn test_empty_input_uploads_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(any())
            .respond_with(upload_ok())
            .expect(0)
            .mount(&mock_server)
            .await;

        let temp = tempfile::TempDir::new().unwrap();
        let results = authed_client(&mock_server)
            .uploads()
            .bulk_upload_files(1, &[temp.path().display().to_string()], &UploadOptions::new())
            .await
            .unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_single_file_upload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/dataset/4/upload/"))
            .and(body_string_contains("annotation_task"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "uploaded": 1
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let temp = tempfile::TempDir::new().unwrap();
        let inputs = write_files(temp.path(), &["one.jpg"], 8);

        let body = authed_client(&mock_server)
            .uploads()
            .upload_file(
                4,
                Path::new(&inputs[0]),
                &UploadOptions::new().with_annotation_task("Object detection"),
            )
            .await
            .unwrap();

        assert_eq!(body["uploaded"], 1);
    }

    #[tokio::test]
    async fn test_upload_urls_json_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/dataset/5/upload/"))
            .and(query_param("annotation_set_id", "11"))
            .and(body_json(serde_json::json!({
                "urls": ["https://example.com/a.jpg"],
                "annotation_task": "Object detection",
                "folder_id": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "uploaded": 1
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let options = UploadOptions::new()
            .with_annotation_task("Object detection")
            .with_folder_id(2)
            .with_annotation_set_id(11);

        let body = authed_client(&mock_server)
            .uploads()
            .upload_urls(5, &["https://example.com/a.jpg".to_string()], &options)
            .await
            .unwrap();

        assert_eq!(body["uploaded"], 1);
    }

    #[tokio::test]
    async fn test_upload_local_files_json_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/dataset/5/upload/"))
            .and(body_json(serde_json::json!({
                "local_files": ["/data/images"],
                "class_encoding": {"0": "cat"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let options = UploadOptions::new().with_class_encoding([("0", "cat")]);
        authed_client(&mock_server)
            .uploads()
            .upload_local_files(5, &["/data/images".to_string()], &options)
            .await
            .unwrap();
    }
}

// =============================================================================
// Dataset and Annotation Tests
// =============================================================================

mod datasets {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_dataset() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/dataset/"))
            .and(body_json(serde_json::json!({"name": "cats"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 12, "name": "cats"
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/ui/datasets/12/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 12, "name": "cats", "quantity": 40
            })))
            .mount(&mock_server)
            .await;

        let client = authed_client(&mock_server);
        let created = client.datasets().create_dataset("cats").await.unwrap();
        assert_eq!(created.id, 12);

        let fetched = client.datasets().get_dataset(created.id).await.unwrap();
        assert_eq!(fetched.quantity, Some(40));
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/ui/datasets/99/"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
            .mount(&mock_server)
            .await;

        let result = authed_client(&mock_server).datasets().get_dataset(99).await;
        match result {
            Err(RemoError::ServerError { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not found");
            }
            other => panic!("Expected ServerError, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_dataset_images_pagination() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/sdk/datasets/3/images/"))
            .and(query_param("limit", "2"))
            .and(query_param("offset", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 5}, {"id": 6}
            ])))
            .mount(&mock_server)
            .await;

        let images = authed_client(&mock_server)
            .datasets()
            .list_dataset_images(3, Some(2), Some(4))
            .await
            .unwrap();
        assert_eq!(images.len(), 2);
    }

    #[tokio::test]
    async fn test_search_images() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/ui/search/"))
            .and(query_param("classes", "cat,hot dog"))
            .and(query_param("tasks", "Object detection"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"image_id": 1, "dataset_id": 2}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let results = authed_client(&mock_server)
            .datasets()
            .search_images(
                &["cat".to_string(), "hot dog".to_string()],
                Some("Object detection"),
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_annotation_set_classes_and_export() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/annotation-set/8/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 8, "classes": ["cat", "dog"]
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/ui/annotation-sets/8/export"))
            .and(query_param("annotation_format", "csv"))
            .and(query_param("export_coordinates", "percent"))
            .and(query_param("full_path", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_string("file,class\na.jpg,cat\n"))
            .mount(&mock_server)
            .await;

        let client = authed_client(&mock_server);
        let classes = client
            .annotations()
            .list_annotation_set_classes(8)
            .await
            .unwrap();
        assert_eq!(classes, vec!["cat", "dog"]);

        let options = ExportOptions {
            format: remo_client::AnnotationFormat::Csv,
            coordinates: remo_client::ExportCoordinates::Percent,
            full_path: false,
        };
        let content = client
            .annotations()
            .export_annotations(8, &options)
            .await
            .unwrap();
        assert_eq!(content, b"file,class\na.jpg,cat\n");
    }

    #[tokio::test]
    async fn test_add_annotation_merges_existing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/ui/datasets/1/annotation-sets/2/images/3/annotations/"))
            .and(body_json(serde_json::json!({
                "classes": [{"name": "cat"}, {"name": "dog"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = authed_client(&mock_server);
        let existing = vec![serde_json::json!({"name": "cat"})];
        let payload = AnnotationPayload::Classes(vec![serde_json::json!({"name": "dog"})]);

        let response = client
            .annotations()
            .add_annotation(1, 2, 3, &existing, &payload)
            .await
            .unwrap();
        assert!(response.is_some());

        // Nothing new to add: no request
        let empty = client
            .annotations()
            .add_annotation(1, 2, 3, &existing, &AnnotationPayload::Objects(Vec::new()))
            .await
            .unwrap();
        assert!(empty.is_none());
    }

    #[tokio::test]
    async fn test_dataset_proxy_forwards_to_client() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/ui/datasets/4/annotation-sets/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "default", "task": "Object detection", "dataset_id": 4}
            ])))
            .mount(&mock_server)
            .await;

        let client = authed_client(&mock_server);
        let dataset: remo_client::Dataset =
            serde_json::from_value(serde_json::json!({"id": 4, "name": "birds"})).unwrap();

        let sets = dataset.annotation_sets(&client).await.unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].dataset_id, Some(4));
        assert_eq!(
            sets[0].to_string(),
            "Annotation set 1 - 'default', task: Object detection, #classes: None"
        );
    }

    #[tokio::test]
    async fn test_add_annotation_without_dataset_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = authed_client(&mock_server);
        let set: remo_client::AnnotationSet =
            serde_json::from_value(serde_json::json!({"id": 9, "name": "orphan"})).unwrap();
        let payload = AnnotationPayload::Classes(vec![serde_json::json!({"name": "dog"})]);

        let result = set.add_annotation(&client, 3, &[], &payload).await;
        assert!(matches!(result, Err(RemoError::MissingDatasetId(9))));
    }

    #[tokio::test]
    async fn test_export_annotations_to_file() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/ui/annotation-sets/8/export"))
            .and(query_param("annotation_format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"file_name":"a.jpg"}]"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = authed_client(&mock_server);
        let set: remo_client::AnnotationSet =
            serde_json::from_value(serde_json::json!({"id": 8, "name": "boxes"})).unwrap();

        let temp = tempfile::TempDir::new().unwrap();
        let output = temp.path().join("annotations.json");
        set.export_annotations_to_file(&client, &output, &ExportOptions::default())
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            r#"[{"file_name":"a.jpg"}]"#
        );

        // Target directory does not exist
        let bad = temp.path().join("missing").join("annotations.json");
        let result = set
            .export_annotations_to_file(&client, &bad, &ExportOptions::default())
            .await;
        assert!(matches!(result, Err(RemoError::Io(_))));
    }
}
