//! Music catalog access.
//!
//! Two endpoints, always used in this order:
//! ```text
//! search/artist?q=<name>     → first artist wins (NotFound when empty)
//! artist/<id>/top?limit=<n>  → top tracks, catalog order preserved
//! ```

pub mod client;
pub mod types;

pub use client::CatalogClient;
pub use types::{Artist, TrackAlbum, TrackArtist, TrackRecord};
