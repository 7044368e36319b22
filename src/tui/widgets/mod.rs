use crate::app::state::{AppState, Screen};
use crate::game::Session;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub mod results;
pub mod round;

/// Widest the game panel gets; wider terminals centre it
const MAX_WIDTH: u16 = 76;

pub fn render(frame: &mut Frame, state: &AppState, session: Option<&Session>) {
    let area = centered(frame.area());
    match &state.screen {
        Screen::Round => round::render(frame, state, session, area),
        Screen::Results {
            outcome,
            previous_best,
        } => results::render(frame, outcome, *previous_best, area),
    }
}

fn centered(area: Rect) -> Rect {
    let side = area.width.saturating_sub(MAX_WIDTH) / 2;
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(side),
            Constraint::Min(1),
            Constraint::Length(side),
        ])
        .split(area)[1]
}

/// Cut to `max_len` characters, marking the cut with "..."
pub(crate) fn truncate_str(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Shake It Off", 20), "Shake It Off");
        assert_eq!(truncate_str("Shake It Off", 8), "Shake...");
        assert_eq!(truncate_str("Shake", 2), "Sh");
        assert_eq!(truncate_str("Shake", 0), "");
    }
}
