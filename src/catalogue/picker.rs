use super::{Artist, Song};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Chooses the candidate songs for a round.
///
/// Remembers, per artist, the last song of the previous pick so the next
/// round never opens with it. Lives as long as the player's session;
/// `reset` forgets everything.
#[derive(Debug, Clone, Default)]
pub struct SongPicker {
    last_picked: HashMap<String, String>,
}

impl SongPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shuffle the artist's songs and return up to `count` of them
    pub fn pick<R: Rng + ?Sized>(&mut self, artist: &Artist, count: usize, rng: &mut R) -> Vec<Song> {
        let mut shuffled = artist.songs.clone();
        shuffled.shuffle(rng);

        if let Some(last) = self.last_picked.get(&artist.id)
            && shuffled.first().is_some_and(|s| &s.title == last)
        {
            shuffled.remove(0);
        }

        shuffled.truncate(count);

        if let Some(last) = shuffled.last() {
            self.last_picked.insert(artist.id.clone(), last.title.clone());
        }
        shuffled
    }

    #[cfg(test)]
    pub fn last_picked(&self, artist_id: &str) -> Option<&str> {
        self.last_picked.get(artist_id).map(String::as_str)
    }

    pub fn reset(&mut self) {
        self.last_picked.clear();
    }
}
