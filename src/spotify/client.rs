use reqwest::blocking::Response;
use serde::de::DeserializeOwned;

use super::api::StreamingApi;
use super::auth::Session;
use super::models::{AudioFeaturesResponse, FeatureRecord, Page};
use crate::errors::{AppError, AppResult};

pub const API_BASE_URL: &str = "https://api.spotify.com/v1";
/// Largest page the listing endpoint serves; also the feature lookup's id limit.
pub const PAGE_LIMIT: u32 = 100;

pub struct SpotifyClient {
    session: Session,
    api_base: String,
}

impl SpotifyClient {
    pub fn new(session: Session) -> Self {
        Self::with_base_url(session, API_BASE_URL)
    }

    pub fn with_base_url(session: Session, api_base: &str) -> Self {
        Self {
            session,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Extract playlist ID from various Spotify URL formats
    pub fn extract_playlist_id(url_or_id: &str) -> AppResult<String> {
        let trimmed = url_or_id.trim();

        if trimmed.contains("spotify.link/") {
            return Err(AppError::Config(
                "Share links are not supported. Please use the full playlist URL.".to_string(),
            ));
        }

        let candidate = if let Some(rest) = trimmed.strip_prefix("spotify:") {
            // spotify:playlist:<id> or the legacy spotify:user:<owner>:playlist:<id>
            match rest.split(':').collect::<Vec<_>>().as_slice() {
                ["playlist", id] | ["user", _, "playlist", id] => *id,
                _ => "",
            }
        } else if let Some((_, id_part)) = trimmed.split_once("open.spotify.com/playlist/") {
            id_part
                .split(['?', '#'])
                .next()
                .unwrap_or(id_part)
                .trim_end_matches('/')
        } else {
            trimmed
        };

        if !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Ok(candidate.to_string());
        }

        Err(AppError::Config(format!(
            "Could not extract playlist ID from: {}",
            url_or_id
        )))
    }

    fn first_page_url(&self, owner_id: &str, playlist_id: &str) -> String {
        format!(
            "{}/users/{}/playlists/{}/tracks?limit={}",
            self.api_base,
            urlencoding::encode(owner_id),
            urlencoding::encode(playlist_id),
            PAGE_LIMIT
        )
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> reqwest::Result<Response> {
        self.session
            .http()
            .get(url)
            .header("Authorization", self.session.authorization())
            .header("Accept", "application/json")
            .query(query)
            .send()
    }
}

/// Read a successful JSON body or describe why it could not be read.
fn read_json<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T, String> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().unwrap_or_default();
        return Err(format!(
            "Failed to {}. Status: {}. Text: {}",
            what, status, text
        ));
    }
    resp.json::<T>()
        .map_err(|e| format!("Failed to parse {} response: {}", what, e))
}

impl StreamingApi for SpotifyClient {
    fn playlist_tracks(
        &self,
        owner_id: &str,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> AppResult<Page> {
        let url = match cursor {
            Some(next) if !next.is_empty() => next.to_string(),
            _ => self.first_page_url(owner_id, playlist_id),
        };

        log::debug!("Fetching playlist page: {}", url);

        let resp = self
            .get(&url, &[])
            .map_err(|e| AppError::PageFetch(format!("{}: {}", url, e)))?;
        let page: Page = read_json(resp, "list playlist tracks").map_err(AppError::PageFetch)?;

        log::debug!(
            "Playlist {} page at offset {}: {} entries (total {})",
            playlist_id,
            page.offset,
            page.items.len(),
            page.total
        );

        Ok(page)
    }

    fn audio_features(&self, ids: &[String]) -> AppResult<Vec<FeatureRecord>> {
        if ids.is_empty() {
            return Err(AppError::FeatureLookup(
                "refusing to look up an empty batch".to_string(),
            ));
        }
        if ids.len() > PAGE_LIMIT as usize {
            return Err(AppError::FeatureLookup(format!(
                "batch of {} ids exceeds the limit of {}",
                ids.len(),
                PAGE_LIMIT
            )));
        }

        let url = format!("{}/audio-features", self.api_base);
        let joined = ids.join(",");

        let resp = self
            .get(&url, &[("ids", joined.as_str())])
            .map_err(|e| AppError::FeatureLookup(format!("{}: {}", url, e)))?;
        let body: AudioFeaturesResponse =
            read_json(resp, "look up audio features").map_err(AppError::FeatureLookup)?;

        let records = body
            .audio_features
            .into_iter()
            .zip(ids.iter().map(Some).chain(std::iter::repeat(None)))
            .map(|(record, id)| match record {
                Some(map) => FeatureRecord::from(map),
                None => {
                    log::warn!(
                        "No audio features available for track {}",
                        id.map(String::as_str).unwrap_or("?")
                    );
                    FeatureRecord::default()
                }
            })
            .collect();

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::auth::test_session;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry(id: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "added_at": "2021-03-04T05:06:07Z",
            "is_local": id.is_none(),
            "track": { "id": id, "name": "Song" }
        })
    }

    fn features(id: &str, energy: f64) -> serde_json::Value {
        serde_json::json!({
            "danceability": 0.5,
            "energy": energy,
            "key": 7,
            "type": "audio_features",
            "id": id
        })
    }

    #[test]
    fn test_extract_playlist_id() {
        assert_eq!(
            SpotifyClient::extract_playlist_id("spotify:playlist:37i9dQZF1DXcBWIGoYBM5M")
                .unwrap(),
            "37i9dQZF1DXcBWIGoYBM5M"
        );
        assert_eq!(
            SpotifyClient::extract_playlist_id(
                "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc"
            )
            .unwrap(),
            "37i9dQZF1DXcBWIGoYBM5M"
        );
        assert_eq!(
            SpotifyClient::extract_playlist_id(" 37i9dQZF1DXcBWIGoYBM5M ").unwrap(),
            "37i9dQZF1DXcBWIGoYBM5M"
        );
        assert!(SpotifyClient::extract_playlist_id("https://spotify.link/xyz").is_err());
        assert!(SpotifyClient::extract_playlist_id("not a playlist").is_err());
        assert!(SpotifyClient::extract_playlist_id("").is_err());
    }

    #[test]
    fn test_extract_playlist_id_url_suffixes_and_legacy_uri() {
        for input in [
            "https://open.spotify.com/playlist/abc123/",
            "https://open.spotify.com/playlist/abc123#tracks",
            "https://open.spotify.com/playlist/abc123/?si=xyz",
            "spotify:user:bob:playlist:abc123",
        ] {
            assert_eq!(
                SpotifyClient::extract_playlist_id(input).unwrap(),
                "abc123",
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn test_extract_playlist_id_rejects_malformed_ids() {
        for input in [
            "https://open.spotify.com/playlist/",
            "https://open.spotify.com/playlist/?si=xyz",
            "https://open.spotify.com/playlist/abc/def",
            "spotify:playlist:",
            "spotify:playlist:abc/",
            "spotify:user:bob:playlist:",
            "spotify:track:abc123",
        ] {
            assert!(
                matches!(
                    SpotifyClient::extract_playlist_id(input),
                    Err(AppError::Config(_))
                ),
                "input: {}",
                input
            );
        }
    }

    #[tokio::test]
    async fn test_playlist_tracks_follows_cursor() {
        let server = MockServer::start().await;
        let next = format!("{}/playlists/pl1/tracks?offset=2&limit=2", server.uri());

        Mock::given(method("GET"))
            .and(path("/users/owner/playlists/pl1/tracks"))
            .and(query_param("limit", "100"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [entry(Some("a")), entry(Some("b"))],
                "next": next,
                "offset": 0,
                "limit": 2,
                "total": 3
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/playlists/pl1/tracks"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [entry(Some("c"))],
                "next": null,
                "offset": 2,
                "limit": 2,
                "total": 3
            })))
            .expect(1)
            .mount(&server)
            .await;

        let base = server.uri();
        let (first_len, first_has_next, second_len, second_has_next) =
            tokio::task::spawn_blocking(move || {
                let client = SpotifyClient::with_base_url(test_session("tok"), &base);
                let first = client.playlist_tracks("owner", "pl1", None).unwrap();
                let second = client
                    .playlist_tracks("owner", "pl1", first.next.as_deref())
                    .unwrap();
                (
                    first.items.len(),
                    first.has_next(),
                    second.items.len(),
                    second.has_next(),
                )
            })
            .await
            .unwrap();

        assert_eq!(first_len, 2);
        assert!(first_has_next);
        assert_eq!(second_len, 1);
        assert!(!second_has_next);
    }

    #[tokio::test]
    async fn test_playlist_tracks_error_is_page_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/owner/playlists/missing/tracks"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": { "status": 404, "message": "Not found." }
            })))
            .mount(&server)
            .await;

        let base = server.uri();
        let result = tokio::task::spawn_blocking(move || {
            let client = SpotifyClient::with_base_url(test_session("tok"), &base);
            client.playlist_tracks("owner", "missing", None).map(|p| p.items.len())
        })
        .await
        .unwrap();

        match result {
            Err(AppError::PageFetch(msg)) => assert!(msg.contains("404")),
            other => panic!("expected page fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_audio_features_batch_in_request_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/audio-features"))
            .and(query_param("ids", "a,b,c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "audio_features": [features("a", 0.1), null, features("c", 0.3)]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let base = server.uri();
        let records = tokio::task::spawn_blocking(move || {
            let client = SpotifyClient::with_base_url(test_session("tok"), &base);
            let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
            client.audio_features(&ids)
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id(), Some("a"));
        assert!(records[1].is_empty());
        assert_eq!(records[2].id(), Some("c"));
        assert_eq!(records[2].get("energy"), Some(&serde_json::json!(0.3)));
    }

    #[tokio::test]
    async fn test_audio_features_error_is_feature_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/audio-features"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let base = server.uri();
        let result = tokio::task::spawn_blocking(move || {
            let client = SpotifyClient::with_base_url(test_session("tok"), &base);
            client.audio_features(&["a".to_string()]).map(|r| r.len())
        })
        .await
        .unwrap();

        assert!(matches!(result, Err(AppError::FeatureLookup(_))));
    }

    #[test]
    fn test_new_targets_public_api() {
        let client = SpotifyClient::new(test_session("tok"));
        assert_eq!(client.api_base, API_BASE_URL);
        assert_eq!(
            client.first_page_url("some user", "abc123"),
            "https://api.spotify.com/v1/users/some%20user/playlists/abc123/tracks?limit=100"
        );
    }

    #[test]
    fn test_audio_features_refuses_empty_batch() {
        let client = SpotifyClient::with_base_url(test_session("tok"), "http://127.0.0.1:9");
        let result = client.audio_features(&[]);
        assert!(matches!(result, Err(AppError::FeatureLookup(_))));
    }
}
