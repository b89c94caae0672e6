pub mod api;
pub mod auth;
pub mod client;
pub mod models;

pub use api::StreamingApi;
pub use auth::{initialize, Credentials, Session};
pub use client::SpotifyClient;
pub use models::*;
