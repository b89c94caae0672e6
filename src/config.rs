use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};
use crate::spotify::auth::{Credentials, TOKEN_URL};
use crate::spotify::client::API_BASE_URL;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "SPOTIFY_CLIENT_SECRET";

/// Everything one acquisition run needs, supplied before it starts.
#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Owner of both playlists.
    pub user_id: String,
    pub playlist_likes_id: String,
    pub playlist_dislikes_id: String,
    pub file_name: PathBuf,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

fn default_api_base_url() -> String {
    API_BASE_URL.to_string()
}

fn default_token_url() -> String {
    TOKEN_URL.to_string()
}

impl Config {
    pub fn from_toml_str(text: &str) -> AppResult<Self> {
        let config: Config = toml::from_str(text)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Credentials from the environment win over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup(CLIENT_ID_ENV).filter(|v| !v.is_empty()) {
            self.client_id = id;
        }
        if let Some(secret) = lookup(CLIENT_SECRET_ENV).filter(|v| !v.is_empty()) {
            self.client_secret = secret;
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("user_id", self.user_id.as_str()),
            ("playlist_likes_id", self.playlist_likes_id.as_str()),
            ("playlist_dislikes_id", self.playlist_dislikes_id.as_str()),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{} must not be empty", name)));
            }
        }
        if self.file_name.as_os_str().is_empty() {
            return Err(AppError::Config("file_name must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.client_id.clone(), self.client_secret.clone())
    }
}
