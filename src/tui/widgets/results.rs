//! End of round: score, per-question breakdown and the share text

use super::round::hint_line;
use super::truncate_str;
use crate::game::score::{self, Accuracy};
use crate::game::{EndReason, Phase, RoundOutcome};
use crate::tui::theme::{self, Palette};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

const TITLE_WIDTH: usize = 28;

pub fn render(frame: &mut Frame, outcome: &RoundOutcome, previous_best: Option<u32>, area: Rect) {
    let palette = Palette::default();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme::border_set())
        .border_style(Style::default().fg(palette.border))
        .title(format!(" Results: {} ", outcome.artist_name))
        .title_style(Style::default().fg(palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Min(1),
                    Constraint::Length(1),
                ])
                .split(inner)[1],
        );

    let body = Paragraph::new(lines(outcome, previous_best, &palette)).wrap(Wrap { trim: false });
    frame.render_widget(body, rows[0]);
    frame.render_widget(
        Paragraph::new(hint_line(Phase::Finished(outcome.reason), &palette)),
        rows[1],
    );
}

fn lines(outcome: &RoundOutcome, previous_best: Option<u32>, palette: &Palette) -> Vec<Line<'static>> {
    let muted = Style::default().fg(palette.fg_secondary);

    if outcome.results.is_empty() {
        return vec![
            Line::from(Span::styled(
                format!("No playable lyrics found for {}.", outcome.artist_name),
                Style::default().fg(palette.warning),
            )),
            Line::from(Span::styled(
                "Pick another artist (see `lyricguessr artists`), or try again.",
                muted,
            )),
        ];
    }

    let rating = score::star_rating(outcome.score, outcome.max_score);
    let mut out = vec![Line::from(vec![
        Span::styled(
            format!("{}/{}", outcome.score, outcome.max_score),
            Style::default().fg(palette.fg_primary).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(score::stars(rating), Style::default().fg(palette.accent)),
    ])];

    if outcome.reason == EndReason::Exhausted {
        out.push(Line::from(Span::styled(
            format!(
                "Short round: {} after {} of {} questions.",
                outcome.reason.label(),
                outcome.results.len(),
                outcome.max_score / score::MAX_POINTS
            ),
            Style::default().fg(palette.warning),
        )));
    }
    match previous_best {
        Some(best) if outcome.score > best => out.push(Line::from(Span::styled(
            format!("New best! (previous {best})"),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ))),
        Some(best) => out.push(Line::from(Span::styled(format!("Best: {best}"), muted))),
        None => {}
    }
    out.push(Line::default());

    for (i, r) in outcome.results.iter().enumerate() {
        let accuracy = Accuracy::for_points(r.points);
        let guess = r
            .guess_percentage
            .map(|g| format!("{g:.0}%"))
            .unwrap_or_else(|| "--".to_string());
        out.push(Line::from(vec![
            Span::raw(format!("{:2}. {} ", i + 1, accuracy.square())),
            Span::raw(format!(
                "{:<width$}",
                truncate_str(&r.song_title, TITLE_WIDTH),
                width = TITLE_WIDTH
            )),
            Span::styled(
                format!(" {guess:>4} → {:>5.1}% ", r.actual_percentage),
                muted,
            ),
            Span::styled(
                format!("{:>3}", r.points),
                Style::default().fg(theme::accuracy_color(accuracy)),
            ),
        ]));
    }
    out.push(Line::default());

    let share = score::share_text(
        &outcome.artist_name,
        outcome.score,
        outcome.max_score,
        &outcome.results,
    );
    out.extend(share.lines().map(|l| Line::from(Span::styled(l.to_string(), muted))));
    out
}
