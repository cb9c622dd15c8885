//! Artist top-tracks search against a public music catalog, guarded by a
//! circuit breaker.

pub mod catalog;
pub mod config;
pub mod error;
pub mod observability;
pub mod remote;
pub mod resilience;
pub mod search;

pub use catalog::TrackRecord;
pub use config::SearchConfig;
pub use error::{SearchError, SearchResult};
pub use search::ArtistSearch;
