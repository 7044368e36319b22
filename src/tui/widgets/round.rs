//! The question screen: phrase, guess slider, countdown and feedback

use super::truncate_str;
use crate::app::state::AppState;
use crate::game::score::Accuracy;
use crate::game::{Phase, Question, RoundResult, Session};
use crate::tui::theme::{self, Palette};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

/// Seconds left at which the countdown turns to the warning colour
const COUNTDOWN_WARNING: u32 = 3;

const TRACK: char = '─';
const GUESS_MARK: char = '●';
const ANSWER_MARK: char = '◆';
const HIT_MARK: char = '◉';

pub fn render(frame: &mut Frame, state: &AppState, session: Option<&Session>, area: Rect) {
    let palette = Palette::default();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme::border_set())
        .border_style(Style::default().fg(palette.border))
        .title(format!(" 🎵 Lyric GeoGuesser: {} ", state.artist_name))
        .title_style(Style::default().fg(palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner)[1];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Question number + score
            Constraint::Length(1),
            Constraint::Length(3), // Phrase
            Constraint::Length(1), // Song
            Constraint::Length(1),
            Constraint::Length(1), // Slider / timeline
            Constraint::Length(1), // Scale
            Constraint::Length(1),
            Constraint::Length(1), // Countdown / feedback
            Constraint::Length(1), // Guess / answer detail
            Constraint::Min(0),
            Constraint::Length(1), // Notice
            Constraint::Length(1), // Key hints
        ])
        .split(padded);

    let width = padded.width as usize;

    let Some(session) = session.filter(|s| s.current().is_some()) else {
        let loading = Line::from(Span::styled(
            "Loading songs...",
            Style::default().fg(palette.fg_secondary),
        ));
        frame.render_widget(Paragraph::new(loading), rows[2]);
        frame.render_widget(Paragraph::new(hint_line(Phase::Loading, &palette)), rows[12]);
        return;
    };
    let Some(question) = session.current() else {
        return;
    };
    let phase = session.phase();

    let header = Line::from(vec![
        Span::styled(
            format!("Question {}/{}", session.index() + 1, session.round_length()),
            Style::default().fg(palette.fg_primary).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(
            format!("Score {}", session.score()),
            Style::default().fg(palette.fg_secondary),
        ),
    ]);
    frame.render_widget(Paragraph::new(header), rows[0]);

    let phrase = Paragraph::new(Line::from(Span::styled(
        format!("\"{}\"", question.phrase.text),
        Style::default().fg(palette.fg_primary).add_modifier(Modifier::BOLD),
    )))
    .wrap(Wrap { trim: true });
    frame.render_widget(phrase, rows[2]);

    let song = format!("from {} ({})", question.song.title, question.song.album);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            truncate_str(&song, width),
            Style::default().fg(palette.fg_secondary),
        ))),
        rows[3],
    );

    let answered = match phase {
        Phase::Answered | Phase::Timeout => session.results().last(),
        _ => None,
    };

    let track = match answered {
        Some(result) => timeline(width, result.guess_percentage, result.actual_percentage),
        None => slider(width, state.guess.percentage()),
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(track, Style::default().fg(palette.accent)))),
        rows[5],
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            scale(width),
            Style::default().fg(palette.fg_secondary),
        ))),
        rows[6],
    );

    match answered {
        Some(result) => {
            frame.render_widget(Paragraph::new(feedback_line(result, &palette)), rows[8]);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    answer_detail(question, result),
                    Style::default().fg(palette.fg_secondary),
                ))),
                rows[9],
            );
        }
        None => {
            let remaining = session.remaining();
            let ratio = f64::from(remaining) / f64::from(state.countdown_ticks.max(1));
            let color = if remaining <= COUNTDOWN_WARNING {
                palette.warning
            } else {
                palette.accent
            };
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(color))
                .ratio(ratio.clamp(0.0, 1.0))
                .label(format!("⏱ {remaining}s"));
            frame.render_widget(gauge, rows[8]);

            let typed = if state.guess.typed().is_empty() { "" } else { " (typed)" };
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::raw("Your guess: "),
                    Span::styled(
                        format!("{}%", state.guess.value()),
                        Style::default().fg(palette.fg_primary).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(typed, Style::default().fg(palette.fg_secondary)),
                ])),
                rows[9],
            );
        }
    }

    if let Some(notice) = &state.notice {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                truncate_str(notice, width),
                Style::default().fg(palette.warning),
            ))),
            rows[11],
        );
    }
    frame.render_widget(Paragraph::new(hint_line(phase, &palette)), rows[12]);
}

fn feedback_line(result: &RoundResult, palette: &Palette) -> Line<'static> {
    if result.guess_percentage.is_none() {
        return Line::from(Span::styled(
            "⌛ Time's up!",
            Style::default().fg(palette.warning).add_modifier(Modifier::BOLD),
        ));
    }
    let accuracy = Accuracy::for_points(result.points);
    Line::from(vec![
        Span::raw(format!("{} ", accuracy.emoji())),
        Span::styled(
            accuracy.label(),
            Style::default()
                .fg(theme::accuracy_color(accuracy))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  +{}", result.points),
            Style::default().fg(palette.fg_primary),
        ),
    ])
}

/// Where the phrase really is: percentage, timestamp and line number
fn answer_detail(question: &Question, result: &RoundResult) -> String {
    let secs = question.phrase.time_secs.max(0.0) as u64;
    let line = question
        .lyrics
        .lines
        .iter()
        .position(|l| l.time_secs == question.phrase.time_secs && l.text == question.phrase.text)
        .map(|i| format!(", line {} of {}", i + 1, question.lyrics.len()))
        .unwrap_or_default();
    format!(
        "Answer {:.1}% at {}:{:02}{line}",
        result.actual_percentage,
        secs / 60,
        secs % 60
    )
}

pub(crate) fn hint_line(phase: Phase, palette: &Palette) -> Line<'static> {
    let text = match phase {
        Phase::Playing => "←/→ move  ↑/↓ ±10  0-9 type  Enter guess  q quit",
        Phase::Answered | Phase::Timeout => "Enter next question  q quit",
        Phase::Loading => "q quit",
        Phase::Finished(_) => "Enter play again  n new session  q quit",
    };
    Line::from(Span::styled(text, Style::default().fg(palette.fg_secondary)))
}

/// Cell of a `width`-cell track that a percentage falls on
fn cell(width: usize, pct: f64) -> usize {
    let last = width.saturating_sub(1) as f64;
    ((pct.clamp(0.0, 100.0) / 100.0) * last).round() as usize
}

/// The 0..100% track with the guess marker on it
pub fn slider(width: usize, guess: f64) -> String {
    let mut track = vec![TRACK; width];
    if width > 0 {
        track[cell(width, guess)] = GUESS_MARK;
    }
    track.into_iter().collect()
}

/// The track after answering: the guess (`●`, absent on timeout) and the
/// answer (`◆`); `◉` where they share a cell
pub fn timeline(width: usize, guess: Option<f64>, actual: f64) -> String {
    let mut track = vec![TRACK; width];
    if width == 0 {
        return String::new();
    }
    let actual_at = cell(width, actual);
    track[actual_at] = ANSWER_MARK;
    if let Some(g) = guess {
        let guess_at = cell(width, g);
        track[guess_at] = if guess_at == actual_at { HIT_MARK } else { GUESS_MARK };
    }
    track.into_iter().collect()
}

fn scale(width: usize) -> String {
    let (left, mid, right) = ("0%", "50%", "100%");
    if width < left.len() + mid.len() + right.len() + 2 {
        return String::new();
    }
    let mid_at = cell(width, 50.0).saturating_sub(1);
    let mut out = String::from(left);
    out.push_str(&" ".repeat(mid_at.saturating_sub(left.len())));
    out.push_str(mid);
    let used = out.chars().count();
    out.push_str(&" ".repeat(width.saturating_sub(used + right.len())));
    out.push_str(right);
    out
}
