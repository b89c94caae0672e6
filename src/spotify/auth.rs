use base64::{engine::general_purpose, Engine as _};
use reqwest::blocking::Client;
use std::time::Duration;

use super::models::TokenResponse;
use crate::errors::{AppError, AppResult};

pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Client id and secret of a registered application.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", general_purpose::STANDARD.encode(raw.as_bytes()))
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// Authenticated handle used for every API call of one run.
pub struct Session {
    http: Client,
    access_token: String,
    token_type: String,
    expires_in: u64,
}

impl Session {
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }
}

pub fn build_http_client() -> AppResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
        .user_agent(concat!("playlist-features/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Http(format!("Failed to build HTTP client: {}", e)))
}

/// Obtain a session with the client-credentials grant.
pub fn initialize(credentials: &Credentials) -> AppResult<Session> {
    initialize_with(build_http_client()?, TOKEN_URL, credentials)
}

/// Same as [`initialize`] against an explicit token endpoint.
pub fn initialize_with(
    http: Client,
    token_url: &str,
    credentials: &Credentials,
) -> AppResult<Session> {
    if credentials.client_id.trim().is_empty() {
        return Err(AppError::Authentication("client id is empty".to_string()));
    }
    if credentials.client_secret.trim().is_empty() {
        return Err(AppError::Authentication(
            "client secret is empty".to_string(),
        ));
    }

    log::debug!("Requesting access token from {}", token_url);

    let resp = http
        .post(token_url)
        .header("Authorization", credentials.basic_auth_header())
        .form(&[("grant_type", "client_credentials")])
        .send()
        .map_err(|e| AppError::Authentication(format!("Token request failed: {}", e)))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        return Err(AppError::Authentication(format!(
            "Failed to get access token. Status: {}. Text: {}",
            status, text
        )));
    }

    let body: TokenResponse = resp.json().map_err(|e| {
        AppError::Authentication(format!("Failed to parse access token response: {}", e))
    })?;

    if body.access_token.is_empty() {
        return Err(AppError::Authentication(
            "Could not get access token".to_string(),
        ));
    }

    log::info!(
        "Authenticated as client {} (token valid for {}s)",
        credentials.client_id,
        body.expires_in
    );

    Ok(Session {
        http,
        access_token: body.access_token,
        token_type: body.token_type,
        expires_in: body.expires_in,
    })
}

#[cfg(test)]
pub(crate) fn test_session(token: &str) -> Session {
    Session {
        http: Client::new(),
        access_token: token.to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
    }
}
