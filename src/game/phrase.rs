//! Picks the lyric line a question is about.
//!
//! Lines of 3..=15 words are preferred, from the middle 20%..80% of those
//! candidates. The pick is then re-anchored to the first line in the song
//! that fuzzily matches it, so a repeated chorus always points at its
//! earliest occurrence.

use crate::lyrics::{LyricLine, ParsedLyrics};
use rand::Rng;

const MIN_WORDS: usize = 3;
const MAX_WORDS: usize = 15;
const OVERLAP_THRESHOLD: f64 = 0.7;

pub fn select_phrase<R: Rng + ?Sized>(lyrics: &ParsedLyrics, rng: &mut R) -> Option<LyricLine> {
    if lyrics.is_empty() {
        return None;
    }

    let interesting: Vec<&LyricLine> = lyrics
        .lines
        .iter()
        .filter(|line| (MIN_WORDS..=MAX_WORDS).contains(&line.text.split_whitespace().count()))
        .collect();

    let pool: Vec<&LyricLine> = if interesting.is_empty() {
        lyrics.lines.iter().collect()
    } else {
        // Middle 20%..80% of the candidates, unless that slice is empty
        let start = interesting.len() * 2 / 10;
        let end = interesting.len() * 8 / 10;
        if start < end {
            interesting[start..end].to_vec()
        } else {
            interesting
        }
    };

    let picked = pool[rng.random_range(0..pool.len())];
    Some(first_occurrence(lyrics, picked).clone())
}

/// First line in `lyrics` similar to `target`, or `target` itself
pub fn first_occurrence<'a>(lyrics: &'a ParsedLyrics, target: &'a LyricLine) -> &'a LyricLine {
    lyrics
        .lines
        .iter()
        .find(|line| is_similar(&line.text, &target.text))
        .unwrap_or(target)
}

/// Lowercase, drop punctuation, collapse whitespace
fn normalize(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .flat_map(char::to_lowercase)
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_similar(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);

    if a == b {
        return true;
    }
    // An empty side would "contain" in everything
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a.contains(&b) || b.contains(&a) {
        return true;
    }

    let words_a: Vec<&str> = a.split(' ').collect();
    let words_b: Vec<&str> = b.split(' ').collect();
    let common = words_a.iter().filter(|w| words_b.contains(w)).count();
    let shorter = words_a.len().min(words_b.len());

    common as f64 / shorter as f64 >= OVERLAP_THRESHOLD
}
