//! Lyrics cache keyed by (artist, title).
//!
//! Every key owns a slot that is filled exactly once. A second `resolve` for a
//! key whose lookup is still running waits on the same slot instead of
//! issuing another request. Misses are stored too, so a failed lookup is never
//! retried. Nothing expires; with no capacity configured the cache grows with
//! every distinct song seen for the life of the process.

use super::{LookupRequest, LyricsSource, ParsedLyrics};
use crate::catalogue::Song;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::OnceCell;

/// Outcome of a lookup once it has happened
#[derive(Debug, Clone)]
pub enum LyricsEntry {
    Found(Arc<ParsedLyrics>),
    Miss,
}

impl LyricsEntry {
    pub fn lyrics(&self) -> Option<&Arc<ParsedLyrics>> {
        match self {
            LyricsEntry::Found(lyrics) => Some(lyrics),
            LyricsEntry::Miss => None,
        }
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, LyricsEntry::Miss)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    artist: String,
    title: String,
}

impl CacheKey {
    fn new(artist: &str, title: &str) -> Self {
        Self {
            artist: artist.to_string(),
            title: title.to_string(),
        }
    }
}

type Slot = Arc<OnceCell<LyricsEntry>>;

pub struct LyricsCache<S> {
    source: S,
    slots: Mutex<LruCache<CacheKey, Slot>>,
}

impl<S: LyricsSource> LyricsCache<S> {
    /// Unbounded, process-lifetime cache
    #[cfg(test)]
    pub fn new(source: S) -> Self {
        Self::with_capacity(source, None)
    }

    /// `Some(n)` evicts the least recently used songs beyond `n` entries
    pub fn with_capacity(source: S, capacity: Option<usize>) -> Self {
        let slots = match capacity.and_then(NonZeroUsize::new) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self {
            source,
            slots: Mutex::new(slots),
        }
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Cache-only read. `None` means the song was never resolved (or its
    /// lookup is still in flight).
    pub fn get(&self, artist: &str, title: &str) -> Option<LyricsEntry> {
        self.slots()
            .get(&CacheKey::new(artist, title))
            .and_then(|slot| slot.get().cloned())
    }

    pub fn is_resolved(&self, artist: &str, title: &str) -> bool {
        self.get(artist, title).is_some()
    }

    /// Number of keys seen, including in-flight lookups
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    /// Return the cached outcome for the song, looking it up at most once.
    pub async fn resolve(&self, artist: &str, song: &Song) -> LyricsEntry {
        let slot = {
            let mut slots = self.slots();
            slots
                .get_or_insert(CacheKey::new(artist, &song.title), || {
                    Arc::new(OnceCell::new())
                })
                .clone()
        };

        if let Some(entry) = slot.get() {
            tracing::debug!(title = %song.title, "lyrics cache hit");
            return entry.clone();
        }

        slot.get_or_init(|| self.lookup(artist, song)).await.clone()
    }

    async fn lookup(&self, artist: &str, song: &Song) -> LyricsEntry {
        let started = Instant::now();
        let req = LookupRequest::for_song(artist, song);
        let outcome = self.source.fetch_synced(&req).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Some(raw)) => match ParsedLyrics::parse(&raw, f64::from(song.duration_seconds)) {
                Some(parsed) => {
                    tracing::info!(title = %song.title, lines = parsed.len(), elapsed_ms, "lyrics found");
                    LyricsEntry::Found(Arc::new(parsed))
                }
                None => {
                    tracing::info!(title = %song.title, elapsed_ms, "synced lyrics unparsable");
                    LyricsEntry::Miss
                }
            },
            Ok(None) => {
                tracing::info!(title = %song.title, elapsed_ms, "no synced lyrics");
                LyricsEntry::Miss
            }
            Err(e) => {
                tracing::warn!(title = %song.title, elapsed_ms, "lyrics lookup failed: {e:#}");
                LyricsEntry::Miss
            }
        }
    }

    fn slots(&self) -> MutexGuard<'_, LruCache<CacheKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
