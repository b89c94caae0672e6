//! Walks a playlist page by page and gathers the audio features of every
//! track into one table.

use crate::errors::{AppError, AppResult};
use crate::spotify::{Page, StreamingApi};
use crate::table::FeatureTable;

enum PageState {
    /// More pages remain; `None` means the first page has not been fetched.
    Fetching(Option<String>),
    Done,
}

/// Lazy, finite sequence of a playlist's pages.
///
/// Each pull fetches one page. The sequence ends after the first page
/// without a continuation token, or after the first error.
pub struct Pages<'a, A: StreamingApi + ?Sized> {
    api: &'a A,
    owner_id: &'a str,
    playlist_id: &'a str,
    state: PageState,
}

impl<'a, A: StreamingApi + ?Sized> Pages<'a, A> {
    pub fn new(api: &'a A, owner_id: &'a str, playlist_id: &'a str) -> Self {
        Self {
            api,
            owner_id,
            playlist_id,
            state: PageState::Fetching(None),
        }
    }
}

impl<A: StreamingApi + ?Sized> Iterator for Pages<'_, A> {
    type Item = AppResult<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = match std::mem::replace(&mut self.state, PageState::Done) {
            PageState::Fetching(cursor) => cursor,
            PageState::Done => return None,
        };

        let page = match self
            .api
            .playlist_tracks(self.owner_id, self.playlist_id, cursor.as_deref())
        {
            Ok(page) => page,
            Err(e) => return Some(Err(e)),
        };

        if page.has_next() {
            self.state = PageState::Fetching(page.next.clone());
        }

        Some(Ok(page))
    }
}

/// Track ids of a page in entry order, skipping entries without one.
pub fn track_ids(page: &Page) -> Vec<String> {
    page.items
        .iter()
        .filter_map(|entry| {
            let id = entry.track_id();
            if id.is_none() {
                log::warn!(
                    "Skipping playlist entry without a track id (local: {}, added: {})",
                    entry.is_local,
                    entry.added_at.as_deref().unwrap_or("?")
                );
            }
            id.map(str::to_string)
        })
        .collect()
}

/// Collect the feature records of every track in a playlist.
///
/// One feature lookup is issued per non-empty page. Any failure aborts the
/// whole playlist.
pub fn collect_features<A: StreamingApi + ?Sized>(
    api: &A,
    owner_id: &str,
    playlist_id: &str,
) -> AppResult<FeatureTable> {
    let mut table = FeatureTable::new();

    for (page_no, page) in Pages::new(api, owner_id, playlist_id).enumerate() {
        let page = page?;
        let ids = track_ids(&page);

        if ids.is_empty() {
            log::debug!(
                "Page {} of playlist {} has no track ids, skipping lookup",
                page_no + 1,
                playlist_id
            );
            continue;
        }

        let records = api.audio_features(&ids)?;
        if records.len() != ids.len() {
            return Err(AppError::FeatureLookup(format!(
                "requested {} feature records for page {} of playlist {} but got {}",
                ids.len(),
                page_no + 1,
                playlist_id,
                records.len()
            )));
        }

        table.extend(records);

        log::debug!(
            "Page {} of playlist {}: {} tracks ({} collected)",
            page_no + 1,
            playlist_id,
            ids.len(),
            table.len()
        );
    }

    log::info!(
        "Collected {} feature records from playlist {}",
        table.len(),
        playlist_id
    );

    Ok(table)
}
