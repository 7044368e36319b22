//! Lyrics module for turning catalogue songs into timestamped lyrics
//!
//! This module provides:
//! - LRCLIB API client for fetching synced lyrics
//! - LRC format parser producing percentage-positioned lines
//! - A process-lifetime cache with single-flight lookups
//! - A paced background prefetcher that warms the cache

pub mod cache;
pub mod lrclib;
pub mod parser;
pub mod prefetch;

use std::future::Future;

use crate::catalogue::Song;

pub use cache::{LyricsCache, LyricsEntry};
pub use lrclib::LrclibClient;
pub use parser::{LyricLine, ParsedLyrics};
pub use prefetch::PrefetchScheduler;

/// Track identity as the upstream lyrics service understands it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub artist_name: String,
    pub track_name: String,
    pub album_name: String,
    pub duration_secs: u32,
}

impl LookupRequest {
    pub fn for_song(artist_name: &str, song: &Song) -> Self {
        Self {
            artist_name: artist_name.to_string(),
            track_name: song.title.clone(),
            album_name: song.album.clone(),
            duration_secs: song.duration_seconds,
        }
    }
}

/// Where raw synced lyrics come from.
///
/// `Ok(None)` is an explicit "not found"; `Err` is a failed lookup. The cache
/// records both as a miss.
pub trait LyricsSource: Send + Sync + 'static {
    fn fetch_synced(
        &self,
        req: &LookupRequest,
    ) -> impl Future<Output = anyhow::Result<Option<String>>> + Send;
}
