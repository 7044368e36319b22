//! Turns a round's candidate songs into playable questions, one at a time.
//!
//! Songs already sitting in the lyrics cache are served first; otherwise the
//! pool is drained from the front, resolving lyrics until one yields a
//! phrase. Concurrent callers share the attempt in progress instead of
//! draining the pool independently.

use super::Question;
use super::phrase::select_phrase;
use crate::catalogue::Song;
use crate::lyrics::{LyricsCache, LyricsEntry, LyricsSource};
use futures::future::{BoxFuture, FutureExt, Shared};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Attempt = Shared<BoxFuture<'static, Option<Question>>>;

struct LoaderState {
    pending: VecDeque<Song>,
    used: HashSet<String>,
    rng: StdRng,
    in_flight: Option<Attempt>,
}

struct Inner<S> {
    artist: String,
    cache: Arc<LyricsCache<S>>,
    state: Mutex<LoaderState>,
}

pub struct QuestionLoader<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for QuestionLoader<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: LyricsSource> QuestionLoader<S> {
    pub fn new(artist: &str, songs: Vec<Song>, cache: Arc<LyricsCache<S>>) -> Self {
        Self::with_rng(artist, songs, cache, StdRng::from_os_rng())
    }

    pub fn with_rng(artist: &str, songs: Vec<Song>, cache: Arc<LyricsCache<S>>, rng: StdRng) -> Self {
        Self {
            inner: Arc::new(Inner {
                artist: artist.to_string(),
                cache,
                state: Mutex::new(LoaderState {
                    pending: songs.into(),
                    used: HashSet::new(),
                    rng,
                    in_flight: None,
                }),
            }),
        }
    }

    /// Next playable question, or `None` once the pool is exhausted.
    /// Safe to call again after exhaustion.
    pub async fn next_question(&self) -> Option<Question> {
        let attempt = {
            let mut state = self.inner.state();
            match &state.in_flight {
                Some(attempt) => {
                    tracing::debug!("joining question load in progress");
                    attempt.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let attempt = async move {
                        let question = inner.attempt().await;
                        inner.state().in_flight = None;
                        question
                    }
                    .boxed()
                    .shared();
                    state.in_flight = Some(attempt.clone());
                    attempt
                }
            }
        };
        attempt.await
    }

    /// The next `n` unused songs still waiting in the pool
    pub fn upcoming(&self, n: usize) -> Vec<Song> {
        let state = self.inner.state();
        state
            .pending
            .iter()
            .filter(|s| !state.used.contains(&s.title))
            .take(n)
            .cloned()
            .collect()
    }

    #[cfg(test)]
    pub fn remaining(&self) -> usize {
        self.inner.state().pending.len()
    }

    #[cfg(test)]
    pub fn is_used(&self, title: &str) -> bool {
        self.inner.state().used.contains(title)
    }
}

impl<S: LyricsSource> Inner<S> {
    async fn attempt(&self) -> Option<Question> {
        if let Some(question) = self.take_cached() {
            tracing::debug!(title = %question.song.title, "question served from cache");
            return Some(question);
        }

        loop {
            let song = {
                let mut state = self.state();
                let state = &mut *state;
                loop {
                    match state.pending.pop_front() {
                        Some(song) if state.used.contains(&song.title) => continue,
                        other => break other,
                    }
                }
            };
            let Some(song) = song else {
                tracing::info!(artist = %self.artist, "song pool exhausted");
                return None;
            };

            let entry = self.cache.resolve(&self.artist, &song).await;
            let title = song.title.clone();
            let question = self.make_question(&mut self.state(), song, &entry);
            match question {
                Some(question) => return Some(question),
                None => tracing::debug!(%title, "skipping song without usable lyrics"),
            }
        }
    }

    /// First pooled song whose lyrics are already cached
    fn take_cached(&self) -> Option<Question> {
        let mut state = self.state();
        let index = state.pending.iter().position(|s| {
            !state.used.contains(&s.title)
                && self
                    .cache
                    .get(&self.artist, &s.title)
                    .is_some_and(|e| !e.is_miss())
        })?;
        let song = state.pending.remove(index)?;
        let entry = self.cache.get(&self.artist, &song.title)?;
        self.make_question(&mut state, song, &entry)
    }

    fn make_question(&self, state: &mut LoaderState, song: Song, entry: &LyricsEntry) -> Option<Question> {
        let lyrics = entry.lyrics()?;
        let phrase = select_phrase(lyrics, &mut state.rng)?;
        state.used.insert(song.title.clone());
        Some(Question {
            song,
            phrase,
            lyrics: Arc::clone(lyrics),
        })
    }

    fn state(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::testing::{lrc, song, StubSource};
    use std::time::Duration;

    const ARTIST: &str = "Taylor Swift";

    fn words(title: &str) -> String {
        lrc(&[
            (10, &format!("{title} opening line here")),
            (40, &format!("{title} middle line here")),
            (70, &format!("{title} closing line here")),
        ])
    }

    fn loader(titles: &[&str]) -> QuestionLoader<StubSource> {
        let source = StubSource::new()
            .with_lyrics("Karma", words("karma"))
            .with_lyrics("Style", words("style"))
            .with_lyrics("Willow", words("willow"))
            .with_lyrics("Garbled", "no timestamps")
            .with_latency(Duration::from_millis(30));
        let cache = Arc::new(LyricsCache::new(source));
        let songs = titles.iter().map(|t| song(t, 100)).collect();
        QuestionLoader::with_rng(ARTIST, songs, cache, StdRng::seed_from_u64(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_skips_misses_and_never_repeats() {
        let l = loader(&["Missing", "Karma", "Garbled", "Style", "Karma"]);

        let first = l.next_question().await.unwrap();
        assert_eq!(first.song.title, "Karma");
        assert!(first.phrase.text.starts_with("karma"));
        assert!(l.is_used("Karma"));

        let second = l.next_question().await.unwrap();
        assert_eq!(second.song.title, "Style");

        assert!(l.next_question().await.is_none());
        assert!(l.next_question().await.is_none());
        assert_eq!(l.remaining(), 0);
        assert_eq!(l.inner.cache.source().calls_for("Karma"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_song_is_served_first() {
        let l = loader(&["Karma", "Style", "Willow"]);
        l.inner.cache.resolve(ARTIST, &song("Willow", 100)).await;

        let q = l.next_question().await.unwrap();
        assert_eq!(q.song.title, "Willow");
        assert_eq!(l.inner.cache.source().calls_for("Karma"), 0);
        assert_eq!(l.upcoming(5).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_miss_is_not_a_fast_path_hit() {
        let l = loader(&["Karma", "Missing"]);
        l.inner.cache.resolve(ARTIST, &song("Missing", 100)).await;

        let q = l.next_question().await.unwrap();
        assert_eq!(q.song.title, "Karma");
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_attempt() {
        let l = loader(&["Missing", "Karma", "Style"]);

        let (a, b) = tokio::join!(l.next_question(), l.next_question());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.song.title, "Karma");
        assert_eq!(b.song.title, "Karma");
        assert_eq!(l.inner.cache.source().calls(), 2);

        let c = l.next_question().await.unwrap();
        assert_eq!(c.song.title, "Style");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_pool_is_exhausted() {
        let l = loader(&[]);
        assert!(l.next_question().await.is_none());
        assert!(l.upcoming(3).is_empty());
    }
}
