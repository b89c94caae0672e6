use super::models::{FeatureRecord, Page};
use crate::errors::AppResult;

/// Operations the feature collector needs from a streaming service.
pub trait StreamingApi {
    /// Fetch one page of a playlist's track listing.
    ///
    /// `cursor` is `None` for the first page and the previous page's
    /// continuation token afterwards.
    fn playlist_tracks(
        &self,
        owner_id: &str,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> AppResult<Page>;

    /// Look up one feature record per id, in request order.
    ///
    /// `ids` must not be empty.
    fn audio_features(&self, ids: &[String]) -> AppResult<Vec<FeatureRecord>>;
}
