pub mod collector;
pub mod config;
pub mod errors;
pub mod output;
pub mod spotify;
pub mod table;

use config::Config;
use errors::AppResult;
use spotify::{SpotifyClient, StreamingApi};
use table::{Label, LabeledTable};

/// Collect both playlists and combine them: likes first, then dislikes.
pub fn acquire<A: StreamingApi + ?Sized>(
    api: &A,
    user_id: &str,
    playlist_likes_id: &str,
    playlist_dislikes_id: &str,
) -> AppResult<LabeledTable> {
    log::info!("Collecting liked playlist {}", playlist_likes_id);
    let likes = collector::collect_features(api, user_id, playlist_likes_id)?;

    log::info!("Collecting disliked playlist {}", playlist_dislikes_id);
    let dislikes = collector::collect_features(api, user_id, playlist_dislikes_id)?;

    Ok(likes.label(Label::Yes).concat(dislikes.label(Label::No)))
}

/// Run one acquisition end to end and return the number of rows written.
pub fn run(config: &Config) -> AppResult<usize> {
    let likes_id = SpotifyClient::extract_playlist_id(&config.playlist_likes_id)?;
    let dislikes_id = SpotifyClient::extract_playlist_id(&config.playlist_dislikes_id)?;

    let credentials = config.credentials();
    let session = if config.token_url == spotify::auth::TOKEN_URL {
        spotify::initialize(&credentials)?
    } else {
        spotify::auth::initialize_with(
            spotify::auth::build_http_client()?,
            &config.token_url,
            &credentials,
        )?
    };
    let client = if config.api_base_url == spotify::client::API_BASE_URL {
        SpotifyClient::new(session)
    } else {
        SpotifyClient::with_base_url(session, &config.api_base_url)
    };

    let result = acquire(&client, &config.user_id, &likes_id, &dislikes_id)?;
    output::write_tsv_file(&result, &config.file_name)?;

    Ok(result.len())
}
