//! The guessing game: question loading, scoring and the round state machine.

pub mod loader;
pub mod phrase;
pub mod score;
pub mod session;

use crate::catalogue::Song;
use crate::lyrics::{LyricLine, ParsedLyrics};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use loader::QuestionLoader;
pub use session::{EndReason, Phase, RoundOutcome, Session};

/// A song with a chosen lyric line, ready to be asked
#[derive(Debug, Clone)]
pub struct Question {
    pub song: Song,
    pub phrase: LyricLine,
    pub lyrics: Arc<ParsedLyrics>,
}

/// How one question of a round went. `guess_percentage` is `None` on timeout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub song_title: String,
    pub guess_percentage: Option<f64>,
    pub actual_percentage: f64,
    pub points: u32,
}
