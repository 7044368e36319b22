//! Plain stdout listings for the non-interactive commands.

use crate::catalogue::Catalogue;
use crate::game::score;
use crate::lyrics::ParsedLyrics;
use crate::storage::ScoreEntry;

pub fn artists(catalogue: &Catalogue) {
    for a in &catalogue.artists {
        println!("{:<20} {} ({} songs)", a.id, a.name, a.songs.len());
    }
}

pub fn leaderboard(entries: &[ScoreEntry], max_score: u32) {
    if entries.is_empty() {
        println!("No scores yet. Play a round first.");
        return;
    }
    for (i, e) in entries.iter().enumerate() {
        println!(
            "{:2}. {:<24} {:>4}  {}  {}",
            i + 1,
            e.artist_name,
            e.score,
            score::stars(score::star_rating(e.score, max_score)),
            e.date.date()
        );
    }
}

pub fn recent(entries: &[ScoreEntry]) {
    if entries.is_empty() {
        println!("No scores yet. Play a round first.");
        return;
    }
    for e in entries {
        println!(
            "{}  {:<24} {:>4}  {}",
            e.date.date(),
            e.artist_name,
            e.score,
            score::emoji_grid(&e.results)
        );
    }
}

pub fn lyrics_timeline(title: &str, lyrics: &ParsedLyrics, sample: Option<&str>) {
    println!("{title}: {} lines", lyrics.len());
    for line in &lyrics.lines {
        let secs = line.time_secs as u64;
        println!(
            "[{:02}:{:02}] {:>5.1}%  {}",
            secs / 60,
            secs % 60,
            line.percentage,
            line.text
        );
    }
    if let Some(sample) = sample {
        println!("\nSample question: \"{sample}\"");
    }
}
