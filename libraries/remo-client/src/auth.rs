//! Login against a Remo server.

use crate::endpoints;
use crate::error::{RemoError, Result};
use crate::types::{LoginRequest, LoginResponse};
use crate::url_builder::UrlBuilder;
use reqwest::Client;
use tracing::{debug, info, warn};

/// Authentication client for Remo.
pub struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Login with email and password.
    ///
    /// Any status other than 200 fails with [`RemoError::AuthFailed`]
    /// carrying the response body.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let url = UrlBuilder::new(self.base_url)
            .segment(endpoints::LOGIN)
            .build();
        debug!(url = %url, email = %email, "Attempting login");

        let response = self
            .http
            .post(&url)
            .form(&LoginRequest { email, password })
            .send()
            .await
            .map_err(RemoError::from_send)?;

        let status = response.status();

        if status == reqwest::StatusCode::OK {
            let login_response: LoginResponse = response.json().await.map_err(|e| {
                RemoError::ParseError(format!("Failed to parse login response: {}", e))
            })?;

            if login_response.key.is_some() {
                info!(email = %email, "Login successful");
            } else {
                warn!(email = %email, "Login response carried no token");
            }

            Ok(login_response)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Login failed");
            Err(RemoError::AuthFailed(error_text))
        }
    }
}
