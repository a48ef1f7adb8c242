//! Main Remo client.

use crate::annotations::AnnotationClient;
use crate::auth::AuthClient;
use crate::datasets::DatasetClient;
use crate::error::{RemoError, Result};
use crate::types::ServerConfig;
use crate::upload::UploadClient;
use crate::url_builder::UrlBuilder;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::Form;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Main client for interacting with a Remo server.
///
/// Owns the HTTP connection pool and the session token. The token is set
/// once, at construction, and every authenticated request carries it as
/// `Authorization: Token <token>`. Without a token those requests fail with
/// [`RemoError::NotAuthenticated`] before anything is sent.
///
/// # Example
///
/// ```ignore
/// use remo_client::{RemoClient, ServerConfig, UploadOptions};
///
/// let config = ServerConfig::new("http://localhost:8123");
/// let client = RemoClient::connect(config, "user@example.com", "secret").await?;
///
/// let dataset = client.datasets().create_dataset("cats").await?;
/// let results = client
///     .uploads()
///     .bulk_upload_files(dataset.id, &["./images"], &UploadOptions::new())
///     .await?;
/// println!("Uploaded {} batches", results.len());
/// ```
pub struct RemoClient {
    http: Client,
    config: ServerConfig,
    token: Option<String>,
}

impl RemoClient {
    /// Create an unauthenticated client with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        // Validate URL
        if config.url.is_empty() {
            return Err(RemoError::InvalidUrl("URL cannot be empty".into()));
        }

        // Parse and normalize URL
        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RemoError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("remo-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RemoError::Request)?;

        Ok(Self {
            http,
            config: ServerConfig { url, ..config },
            token: None,
        })
    }

    /// Create a client and log in.
    ///
    /// If the server cannot be reached the failure is logged and the client
    /// is returned unauthenticated. A rejected login is an error.
    pub async fn connect(config: ServerConfig, email: &str, password: &str) -> Result<Self> {
        let mut client = Self::new(config)?;

        let auth_client = AuthClient::new(&client.http, &client.config.url);
        match auth_client.login(email, password).await {
            Ok(response) => client.token = response.key,
            Err(RemoError::ServerUnreachable(e)) => {
                warn!(url = %client.config.url, error = %e, "Failed to connect to server");
            }
            Err(e) => return Err(e),
        }

        Ok(client)
    }

    /// Create a client from a previously issued token.
    pub fn with_token(config: ServerConfig, token: impl Into<String>) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.token = Some(token.into());
        Ok(client)
    }

    /// The normalized server URL.
    pub fn server_url(&self) -> &str {
        &self.config.url
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Check if the client has a token.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// URL builder rooted at the server base and the given endpoint.
    pub fn url(&self, endpoint: &str) -> UrlBuilder {
        UrlBuilder::new(self.config.url.as_str()).segment(endpoint)
    }

    /// Value of the `Authorization` header.
    pub fn auth_header(&self) -> Result<String> {
        self.token
            .as_ref()
            .map(|token| format!("Token {token}"))
            .ok_or(RemoError::NotAuthenticated)
    }

    /// Authenticated GET.
    pub async fn get(&self, url: &str) -> Result<Response> {
        let auth = self.auth_header()?;
        debug!(url = %url, "GET");

        self.http
            .get(url)
            .header(AUTHORIZATION, auth)
            .send()
            .await
            .map_err(RemoError::from_send)
    }

    /// Authenticated POST with a JSON body.
    pub async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<Response> {
        let auth = self.auth_header()?;
        debug!(url = %url, "POST");

        self.http
            .post(url)
            .header(AUTHORIZATION, auth)
            .json(body)
            .send()
            .await
            .map_err(RemoError::from_send)
    }

    /// Authenticated POST with a multipart body.
    pub async fn post_multipart(&self, url: &str, form: Form) -> Result<Response> {
        let auth = self.auth_header()?;
        debug!(url = %url, "POST multipart");

        self.http
            .post(url)
            .header(AUTHORIZATION, auth)
            .multipart(form)
            .send()
            .await
            .map_err(RemoError::from_send)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self.get(url).await?;
        read_json(response, what).await
    }

    pub(crate) async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url).await?;
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            debug!(url = %url, size = bytes.len(), "Downloaded content");
            Ok(bytes.to_vec())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(RemoError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }

    /// Datasets and images.
    pub fn datasets(&self) -> DatasetClient<'_> {
        DatasetClient::new(self)
    }

    /// Annotation sets and annotations.
    pub fn annotations(&self) -> AnnotationClient<'_> {
        AnnotationClient::new(self)
    }

    /// File uploads.
    pub fn uploads(&self) -> UploadClient<'_> {
        UploadClient::new(self)
    }
}

/// Decode a 2xx JSON body, or turn the response into a `ServerError`.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| RemoError::ParseError(format!("Failed to parse {}: {}", what, e)))
    } else {
        let error_text = response.text().await.unwrap_or_default();
        info!(status = %status, what = %what, "Request rejected by server");
        Err(RemoError::ServerError {
            status: status.as_u16(),
            message: error_text,
        })
    }
}
