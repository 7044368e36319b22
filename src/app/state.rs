use crate::game::RoundOutcome;

/// The guess being composed for the current question, 0..=100
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessInput {
    value: u8,
    typed: String,
}

impl GuessInput {
    const START: u8 = 50;

    pub fn new() -> Self {
        Self {
            value: Self::START,
            typed: String::new(),
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn percentage(&self) -> f64 {
        f64::from(self.value)
    }

    /// Digits typed so far, if the value came from the keyboard
    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn nudge(&mut self, delta: i16) {
        self.typed.clear();
        self.value = (i16::from(self.value) + delta).clamp(0, 100) as u8;
    }

    /// A fourth digit starts a new number
    pub fn digit(&mut self, d: u8) {
        if self.typed.len() >= 3 {
            self.typed.clear();
        }
        self.typed.push(char::from(b'0' + d.min(9)));
        self.sync_typed();
    }

    pub fn erase(&mut self) {
        self.typed.pop();
        self.sync_typed();
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn sync_typed(&mut self) {
        if let Ok(v) = self.typed.parse::<u16>() {
            self.value = v.min(100) as u8;
        }
    }
}

impl Default for GuessInput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub enum Screen {
    Round,
    Results {
        outcome: RoundOutcome,
        previous_best: Option<u32>,
    },
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub artist_name: String,
    pub countdown_ticks: u32,
    pub guess: GuessInput,
    /// One-line message about the previous question, e.g. a timeout
    pub notice: Option<String>,
    pub screen: Screen,
}

impl AppState {
    pub fn new(countdown_ticks: u32) -> Self {
        Self {
            artist_name: String::new(),
            countdown_ticks,
            guess: GuessInput::new(),
            notice: None,
            screen: Screen::Round,
        }
    }
}
