//! Catalog wire types.
//!
//! Field names follow the catalog's JSON; unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// List envelope used by the catalog: `{ "data": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// An artist as returned by the artist search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: u64,
    pub name: String,
}

/// Artist reference embedded in a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

/// Album reference embedded in a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackAlbum {
    /// Medium-size cover image URL.
    #[serde(default)]
    pub cover_medium: String,
}

/// One entry of an artist's top tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub title: String,
    pub artist: TrackArtist,
    pub album: TrackAlbum,
    /// 30-second preview audio URL. Empty when the catalog has none.
    #[serde(default)]
    pub preview: String,
}
