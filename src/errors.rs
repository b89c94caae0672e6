use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Credentials were empty or rejected by the token endpoint.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Listing a playlist page failed (transport, status or body).
    #[error("Page fetch failed: {0}")]
    PageFetch(String),

    /// The batched audio-feature lookup failed or returned a malformed batch.
    #[error("Feature lookup failed: {0}")]
    FeatureLookup(String),

    /// The HTTP client itself could not be set up (TLS backend, builder).
    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Output(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Output(e.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
