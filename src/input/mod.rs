use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crate::game::Phase;
use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

/// Forward key presses to the event loop until it goes away. One per process.
pub fn spawn_input_task(tx: mpsc::Sender<Event>) {
    tokio::task::spawn_blocking(move || {
        while !tx.is_closed() {
            if !event::poll(std::time::Duration::from_millis(250)).unwrap_or(false) {
                continue;
            }
            let ev = match event::read() {
                Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => InputEvent::Key(k),
                Ok(CtEvent::Resize(_, _)) => InputEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("terminal read failed: {e}");
                    continue;
                }
            };
            if tx.blocking_send(Event::Input(ev)).is_err() {
                break;
            }
        }
    });
}

pub fn map_input_to_action(phase: Phase, k: KeyEvent) -> Option<Action> {
    if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    if matches!(k.code, KeyCode::Esc | KeyCode::Char('q')) {
        return Some(Action::Quit);
    }

    match phase {
        Phase::Loading => None,
        Phase::Playing => handle_playing(k),
        Phase::Answered | Phase::Timeout => match k.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n') => Some(Action::Next),
            _ => None,
        },
        Phase::Finished(_) => match k.code {
            KeyCode::Enter | KeyCode::Char('r') => Some(Action::PlayAgain),
            KeyCode::Char('n') => Some(Action::NewSession),
            _ => None,
        },
    }
}

fn handle_playing(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Left | KeyCode::Char('h') => Some(Action::Nudge(-1)),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::Nudge(1)),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::PageDown => Some(Action::Nudge(-10)),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::PageUp => Some(Action::Nudge(10)),
        KeyCode::Home => Some(Action::Nudge(-100)),
        KeyCode::End => Some(Action::Nudge(100)),
        KeyCode::Char(c) if c.is_ascii_digit() => Some(Action::Digit(c as u8 - b'0')),
        KeyCode::Backspace => Some(Action::Erase),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Submit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::EndReason;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_slider_keys_only_while_playing() {
        assert_eq!(map_input_to_action(Phase::Playing, key(KeyCode::Left)), Some(Action::Nudge(-1)));
        assert_eq!(map_input_to_action(Phase::Playing, key(KeyCode::Up)), Some(Action::Nudge(10)));
        assert_eq!(map_input_to_action(Phase::Playing, key(KeyCode::Char('7'))), Some(Action::Digit(7)));
        assert_eq!(map_input_to_action(Phase::Playing, key(KeyCode::Enter)), Some(Action::Submit));
        assert_eq!(map_input_to_action(Phase::Loading, key(KeyCode::Left)), None);
        assert_eq!(map_input_to_action(Phase::Answered, key(KeyCode::Char('7'))), None);
    }

    #[test]
    fn test_enter_moves_on_after_an_answer() {
        assert_eq!(map_input_to_action(Phase::Answered, key(KeyCode::Enter)), Some(Action::Next));
        assert_eq!(map_input_to_action(Phase::Timeout, key(KeyCode::Char('n'))), Some(Action::Next));
        assert_eq!(map_input_to_action(Phase::Loading, key(KeyCode::Enter)), None);
    }

    #[test]
    fn test_results_screen_keys() {
        let done = Phase::Finished(EndReason::Completed);
        assert_eq!(map_input_to_action(done, key(KeyCode::Enter)), Some(Action::PlayAgain));
        assert_eq!(map_input_to_action(done, key(KeyCode::Char('r'))), Some(Action::PlayAgain));
        assert_eq!(map_input_to_action(done, key(KeyCode::Char('n'))), Some(Action::NewSession));
        assert_eq!(map_input_to_action(done, key(KeyCode::Left)), None);
    }

    #[test]
    fn test_quit_from_anywhere() {
        assert_eq!(map_input_to_action(Phase::Loading, key(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(map_input_to_action(Phase::Playing, key(KeyCode::Esc)), Some(Action::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_input_to_action(Phase::Playing, ctrl_c), Some(Action::Quit));
    }
}
