//! Round state machine.
//!
//! `Session` never awaits anything. Callers feed it events (a loaded
//! question, a countdown tick, a guess, an advance request) and carry out the
//! `Effect`s it returns. Loaded questions are tagged with the round they were
//! requested under and ticks with the question key they were scheduled for;
//! anything carrying a stale tag is dropped.

use super::score::{self, MAX_POINTS};
use super::{Question, RoundResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Every question of the round was played
    Completed,
    /// The song pool ran dry before the round was full
    Exhausted,
}

impl EndReason {
    pub fn label(self) -> &'static str {
        match self {
            EndReason::Completed => "round complete",
            EndReason::Exhausted => "ran out of songs with lyrics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Playing,
    Answered,
    Timeout,
    Finished(EndReason),
}

/// Handed to the results screen and score history once a round ends
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub artist_id: String,
    pub artist_name: String,
    pub score: u32,
    pub max_score: u32,
    pub results: Vec<RoundResult>,
    pub reason: EndReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Load one more question and report it back with `on_loaded(round, ..)`
    RequestQuestion { round: u64 },
    /// (Re)start the countdown; its ticks must carry `question_key`
    StartCountdown { question_key: u64 },
    StopCountdown,
    Finished(RoundOutcome),
}

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub round_length: usize,
    pub countdown_ticks: u32,
    /// Questions to keep loaded beyond the current one
    pub lookahead: usize,
    pub advance_on_timeout: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            round_length: 10,
            countdown_ticks: 10,
            lookahead: 3,
            advance_on_timeout: true,
        }
    }
}

pub struct Session {
    artist_id: String,
    artist_name: String,
    config: SessionConfig,
    round: u64,
    phase: Phase,
    index: usize,
    remaining: u32,
    question_key: u64,
    questions: Vec<Question>,
    results: Vec<RoundResult>,
    loading: bool,
    exhausted: bool,
}

impl Session {
    pub fn new(artist_id: &str, artist_name: &str, round: u64, config: SessionConfig) -> Self {
        Self {
            artist_id: artist_id.to_string(),
            artist_name: artist_name.to_string(),
            config,
            round,
            phase: Phase::Loading,
            index: 0,
            remaining: config.countdown_ticks,
            question_key: 0,
            questions: Vec::new(),
            results: Vec::new(),
            loading: false,
            exhausted: false,
        }
    }

    pub fn start(&mut self) -> Vec<Effect> {
        tracing::debug!(round = self.round, artist = %self.artist_name, "round started");
        self.present_or_load()
    }

    /// A question requested under `round` has arrived; `None` means the
    /// loader is exhausted.
    pub fn on_loaded(&mut self, round: u64, question: Option<Question>) -> Vec<Effect> {
        if round != self.round || self.is_finished() {
            tracing::debug!(round, current = self.round, "discarding stale question");
            return Vec::new();
        }
        self.loading = false;

        match question {
            Some(q) => {
                let duplicate = self.questions.iter().any(|known| known.song.title == q.song.title);
                if !duplicate && self.questions.len() < self.config.round_length {
                    tracing::debug!(title = %q.song.title, buffered = self.questions.len() + 1, "question ready");
                    self.questions.push(q);
                }
            }
            None => self.exhausted = true,
        }

        match self.phase {
            Phase::Loading => self.present_or_load(),
            Phase::Playing | Phase::Answered | Phase::Timeout => self.top_up(),
            Phase::Finished(_) => Vec::new(),
        }
    }

    pub fn tick(&mut self, question_key: u64) -> Vec<Effect> {
        if question_key != self.question_key || self.phase != Phase::Playing {
            return Vec::new();
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return Vec::new();
        }

        let Some(question) = self.questions.get(self.index) else {
            return Vec::new();
        };
        tracing::debug!(title = %question.song.title, "question timed out");
        self.results.push(RoundResult {
            song_title: question.song.title.clone(),
            guess_percentage: None,
            actual_percentage: question.phrase.percentage,
            points: 0,
        });
        self.phase = Phase::Timeout;

        let mut effects = vec![Effect::StopCountdown];
        if self.config.advance_on_timeout {
            effects.extend(self.advance());
        }
        effects
    }

    /// Only accepted while a question is being played
    pub fn guess(&mut self, percentage: f64) -> Vec<Effect> {
        if self.phase != Phase::Playing {
            return Vec::new();
        }
        let Some(question) = self.questions.get(self.index) else {
            return Vec::new();
        };

        let guess = percentage.clamp(0.0, 100.0);
        let actual = question.phrase.percentage;
        let points = score::points(guess, actual);
        tracing::debug!(title = %question.song.title, guess, actual, points, "guess scored");
        self.results.push(RoundResult {
            song_title: question.song.title.clone(),
            guess_percentage: Some(guess),
            actual_percentage: actual,
            points,
        });
        self.phase = Phase::Answered;

        let mut effects = vec![Effect::StopCountdown];
        effects.extend(self.top_up());
        effects
    }

    /// Move past an answered or timed-out question
    pub fn advance(&mut self) -> Vec<Effect> {
        if !matches!(self.phase, Phase::Answered | Phase::Timeout) {
            return Vec::new();
        }
        self.index += 1;
        self.phase = Phase::Loading;
        self.present_or_load()
    }

    fn present_or_load(&mut self) -> Vec<Effect> {
        if self.index >= self.config.round_length {
            return self.finish(EndReason::Completed);
        }
        if self.index < self.questions.len() {
            self.phase = Phase::Playing;
            self.remaining = self.config.countdown_ticks;
            self.question_key += 1;
            let mut effects = vec![Effect::StartCountdown {
                question_key: self.question_key,
            }];
            effects.extend(self.top_up());
            return effects;
        }
        if self.exhausted {
            return self.finish(EndReason::Exhausted);
        }
        self.phase = Phase::Loading;
        self.top_up()
    }

    /// Keep up to `lookahead` questions loaded past the current one, with at
    /// most one request outstanding.
    fn top_up(&mut self) -> Vec<Effect> {
        let target = self
            .config
            .round_length
            .min(self.index + 1 + self.config.lookahead);
        if self.loading || self.exhausted || self.questions.len() >= target {
            return Vec::new();
        }
        self.loading = true;
        vec![Effect::RequestQuestion { round: self.round }]
    }

    fn finish(&mut self, reason: EndReason) -> Vec<Effect> {
        self.phase = Phase::Finished(reason);
        tracing::info!(
            round = self.round,
            answered = self.results.len(),
            score = self.score(),
            reason = reason.label(),
            "round finished"
        );
        vec![Effect::Finished(RoundOutcome {
            artist_id: self.artist_id.clone(),
            artist_name: self.artist_name.clone(),
            score: self.score(),
            max_score: self.max_score(),
            results: self.results.clone(),
            reason,
        })]
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// Zero-based position of the current question
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn round_length(&self) -> usize {
        self.config.round_length
    }

    pub fn question_key(&self) -> u64 {
        self.question_key
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn current(&self) -> Option<&Question> {
        match self.phase {
            Phase::Loading | Phase::Finished(_) => None,
            _ => self.questions.get(self.index),
        }
    }

    #[cfg(test)]
    pub fn loaded(&self) -> usize {
        self.questions.len()
    }

    pub fn results(&self) -> &[RoundResult] {
        &self.results
    }

    pub fn score(&self) -> u32 {
        self.results.iter().map(|r| r.points).sum()
    }

    pub fn max_score(&self) -> u32 {
        self.config.round_length as u32 * MAX_POINTS
    }
}
