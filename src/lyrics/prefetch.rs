//! Background cache warming.
//!
//! A single worker drains a FIFO queue of songs, resolving each through the
//! shared [`LyricsCache`] and sleeping a fixed pacing delay between items so
//! the upstream service sees a bounded request rate. `prioritize` jumps the
//! queue and hands back a completion signal.

use super::{LyricsCache, LyricsSource};
use crate::catalogue::Song;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

struct PrefetchItem {
    artist: String,
    song: Song,
    done: Option<oneshot::Sender<()>>,
}

#[derive(Default)]
struct QueueState {
    items: VecDeque<PrefetchItem>,
    running: bool,
}

struct Inner<S> {
    cache: Arc<LyricsCache<S>>,
    delay: Duration,
    state: Mutex<QueueState>,
}

pub struct PrefetchScheduler<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for PrefetchScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: LyricsSource> PrefetchScheduler<S> {
    pub fn new(cache: Arc<LyricsCache<S>>, delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache,
                delay,
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    /// Queue songs at the back, skipping ones already resolved.
    /// Returns how many were queued.
    pub fn enqueue(&self, artist: &str, songs: impl IntoIterator<Item = Song>) -> usize {
        let mut queued = 0;
        {
            let mut state = self.inner.state();
            for song in songs {
                if self.inner.cache.is_resolved(artist, &song.title) {
                    continue;
                }
                state.items.push_back(PrefetchItem {
                    artist: artist.to_string(),
                    song,
                    done: None,
                });
                queued += 1;
            }
        }
        if queued > 0 {
            tracing::debug!(artist, queued, "prefetch queued");
        }
        self.kick();
        queued
    }

    /// Put one song at the front of the queue. The receiver completes once
    /// the song has been processed, or right away if it is already resolved.
    pub fn prioritize(&self, artist: &str, song: Song) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        if self.inner.cache.is_resolved(artist, &song.title) {
            let _ = tx.send(());
            return rx;
        }

        self.inner.state().items.push_front(PrefetchItem {
            artist: artist.to_string(),
            song,
            done: Some(tx),
        });
        self.kick();
        rx
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.inner.state().items.len()
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.inner.state().running
    }

    /// Start the worker unless one is already draining.
    fn kick(&self) {
        let start = {
            let mut state = self.inner.state();
            if state.running || state.items.is_empty() {
                false
            } else {
                state.running = true;
                true
            }
        };
        if start {
            tokio::spawn(Inner::drain(Arc::clone(&self.inner)));
        }
    }
}

impl<S: LyricsSource> Inner<S> {
    async fn drain(self: Arc<Self>) {
        tracing::debug!("prefetch worker started");
        loop {
            let item = {
                let mut state = self.state();
                match state.items.pop_front() {
                    Some(item) => item,
                    None => {
                        state.running = false;
                        break;
                    }
                }
            };

            // Someone else may have resolved it since it was queued
            if !self.cache.is_resolved(&item.artist, &item.song.title) {
                self.cache.resolve(&item.artist, &item.song).await;
            }
            if let Some(done) = item.done {
                let _ = done.send(());
            }

            tokio::time::sleep(self.delay).await;
        }
        tracing::debug!("prefetch worker idle");
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
