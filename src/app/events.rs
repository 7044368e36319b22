use crate::game::Question;

#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    Round(RoundEvent),
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Resize,
}

/// Completions of work a round started. Each carries the generation it was
/// started under so a superseded round or question can ignore it.
#[derive(Debug, Clone)]
pub enum RoundEvent {
    Loaded {
        round: u64,
        question: Option<Question>,
    },
    Tick {
        round: u64,
        question_key: u64,
    },
}
