//! Catalog client: resolve an artist, then fetch its top tracks.

use serde::de::DeserializeOwned;
use url::Url;

use crate::catalog::types::{Artist, Page, TrackRecord};
use crate::config::ApiConfig;
use crate::error::{SearchError, SearchResult};
use crate::remote::{RemoteCallAdapter, Transport};

/// Client for the two catalog endpoints this crate uses.
pub struct CatalogClient<T> {
    adapter: RemoteCallAdapter<T>,
    base_url: Url,
    track_limit: u32,
}

impl<T> Clone for CatalogClient<T> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
            base_url: self.base_url.clone(),
            track_limit: self.track_limit,
        }
    }
}

impl<T: Transport> CatalogClient<T> {
    /// Fails if `api.base_url` is not an absolute base URL.
    pub fn new(adapter: RemoteCallAdapter<T>, api: &ApiConfig) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&api.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(Self {
            adapter,
            base_url,
            track_limit: api.track_limit,
        })
    }

    pub fn adapter(&self) -> &RemoteCallAdapter<T> {
        &self.adapter
    }

    /// `{base}/search/artist?q={name}`
    pub fn artist_search_url(&self, name: &str) -> Url {
        let mut url = self.endpoint(&["search", "artist"]);
        url.query_pairs_mut().append_pair("q", name);
        url
    }

    /// `{base}/artist/{id}/top?limit={track_limit}`
    pub fn top_tracks_url(&self, artist_id: u64) -> Url {
        let id = artist_id.to_string();
        let mut url = self.endpoint(&["artist", id.as_str(), "top"]);
        url.query_pairs_mut()
            .append_pair("limit", &self.track_limit.to_string());
        url
    }

    /// Best match for `name`; the catalog ranks results, so the first wins.
    pub async fn resolve_artist(&self, name: &str) -> SearchResult<Artist> {
        let page: Page<Artist> = self.fetch_page(self.artist_search_url(name)).await?;
        match page.data.into_iter().next() {
            Some(artist) => {
                tracing::debug!(artist_id = artist.id, artist = %artist.name, query = name, "Artist resolved");
                Ok(artist)
            }
            None => Err(SearchError::NotFound(name.to_string())),
        }
    }

    pub async fn top_tracks(&self, artist: &Artist) -> SearchResult<Vec<TrackRecord>> {
        let page: Page<TrackRecord> = self.fetch_page(self.top_tracks_url(artist.id)).await?;
        Ok(page.data)
    }

    /// Resolve then fetch. The second call is only issued once the first
    /// has resolved.
    pub async fn search(&self, query: &str) -> SearchResult<Vec<TrackRecord>> {
        let artist = self.resolve_artist(query).await?;
        let tracks = self.top_tracks(&artist).await?;
        tracing::info!(
            query,
            artist_id = artist.id,
            artist = %artist.name,
            tracks = tracks.len(),
            "Top tracks fetched"
        );
        Ok(tracks)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn fetch_page<D: DeserializeOwned>(&self, url: Url) -> SearchResult<Page<D>> {
        let payload = self.adapter.invoke(url).await?;
        serde_json::from_value(payload)
            .map_err(|e| SearchError::Connection(format!("unexpected payload: {}", e)))
    }
}
