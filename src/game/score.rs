//! Scoring of a single guess and the presentation of a finished round.

use super::RoundResult;

/// Guesses this close to the answer (in percentage points) score full marks
const PERFECT_DISTANCE: f64 = 2.0;
/// Points lost per percentage point beyond `PERFECT_DISTANCE`
const FALLOFF_PER_POINT: f64 = 10.0;
pub const MAX_POINTS: u32 = 100;

/// Points for a guess: 100 within 2%, then linear down to 0 at 12%.
pub fn points(guess_pct: f64, actual_pct: f64) -> u32 {
    let distance = (guess_pct - actual_pct).abs();
    if distance <= PERFECT_DISTANCE {
        return MAX_POINTS;
    }
    let raw = (f64::from(MAX_POINTS) - (distance - PERFECT_DISTANCE) * FALLOFF_PER_POINT).round();
    raw.max(0.0) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    Perfect,
    Great,
    Good,
    Missed,
}

impl Accuracy {
    pub fn for_points(points: u32) -> Self {
        match points {
            81.. => Accuracy::Perfect,
            61..=80 => Accuracy::Great,
            41..=60 => Accuracy::Good,
            _ => Accuracy::Missed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Accuracy::Perfect => "Perfect!",
            Accuracy::Great => "Great!",
            Accuracy::Good => "Good",
            Accuracy::Missed => "Missed",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Accuracy::Perfect => "🎯",
            Accuracy::Great => "🔥",
            Accuracy::Good => "👍",
            Accuracy::Missed => "😅",
        }
    }

    /// Square used in the shareable result grid
    pub fn square(self) -> &'static str {
        match self {
            Accuracy::Perfect => "🟦",
            Accuracy::Great => "🟨",
            Accuracy::Good => "🟧",
            Accuracy::Missed => "🟥",
        }
    }
}

/// 1..=5 stars for a round total
pub fn star_rating(total: u32, max_score: u32) -> u8 {
    if max_score == 0 {
        return 1;
    }
    let pct = f64::from(total) / f64::from(max_score) * 100.0;
    match pct {
        p if p >= 90.0 => 5,
        p if p >= 75.0 => 4,
        p if p >= 60.0 => 3,
        p if p >= 40.0 => 2,
        _ => 1,
    }
}

pub fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "⭐".repeat(filled), "☆".repeat(5 - filled))
}

pub fn emoji_grid(results: &[RoundResult]) -> String {
    results
        .iter()
        .map(|r| Accuracy::for_points(r.points).square())
        .collect()
}

pub fn share_text(artist_name: &str, score: u32, max_score: u32, results: &[RoundResult]) -> String {
    format!(
        "🎵 Lyric GeoGuesser 🎵\n\nArtist: {artist_name}\nScore: {score}/{max_score} {}\n\n{}\n\nCan you beat my score?\n#LyricGeoGuesser",
        stars(star_rating(score, max_score)),
        emoji_grid(results),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(points: u32) -> RoundResult {
        RoundResult {
            song_title: "Song".into(),
            guess_percentage: Some(50.0),
            actual_percentage: 50.0,
            points,
        }
    }

    #[test]
    fn test_points_curve() {
        assert_eq!(points(50.0, 50.0), 100);
        assert_eq!(points(50.0, 52.0), 100);
        assert_eq!(points(52.0, 50.0), 100);
        assert_eq!(points(50.0, 55.0), 70);
        assert_eq!(points(50.0, 57.0), 50);
        assert_eq!(points(50.0, 62.0), 0);
        assert_eq!(points(50.0, 65.0), 0);
        assert_eq!(points(0.0, 100.0), 0);
        // 2.25 beyond perfect -> 77.5 rounds half away from zero
        assert_eq!(points(50.0, 54.25), 78);
    }

    #[test]
    fn test_points_never_increase_with_distance() {
        let mut last = MAX_POINTS;
        for step in 0..=200 {
            let p = points(0.0, f64::from(step) / 10.0);
            assert!(p <= last);
            last = p;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn test_accuracy_bands() {
        assert_eq!(Accuracy::for_points(100), Accuracy::Perfect);
        assert_eq!(Accuracy::for_points(81), Accuracy::Perfect);
        assert_eq!(Accuracy::for_points(80), Accuracy::Great);
        assert_eq!(Accuracy::for_points(61), Accuracy::Great);
        assert_eq!(Accuracy::for_points(60), Accuracy::Good);
        assert_eq!(Accuracy::for_points(41), Accuracy::Good);
        assert_eq!(Accuracy::for_points(40), Accuracy::Missed);
        assert_eq!(Accuracy::for_points(0).label(), "Missed");
    }

    #[test]
    fn test_star_rating() {
        assert_eq!(star_rating(1000, 1000), 5);
        assert_eq!(star_rating(900, 1000), 5);
        assert_eq!(star_rating(899, 1000), 4);
        assert_eq!(star_rating(750, 1000), 4);
        assert_eq!(star_rating(600, 1000), 3);
        assert_eq!(star_rating(400, 1000), 2);
        assert_eq!(star_rating(399, 1000), 1);
        assert_eq!(star_rating(0, 1000), 1);
        assert_eq!(stars(3), "⭐⭐⭐☆☆");
    }

    #[test]
    fn test_share_text() {
        let results = [result(100), result(70), result(50), result(0)];
        let text = share_text("Taylor Swift", 220, 1000, &results);
        assert!(text.contains("Artist: Taylor Swift"));
        assert!(text.contains("Score: 220/1000 ⭐☆☆☆☆"));
        assert!(text.contains("🟦🟨🟧🟥"));
        assert!(text.ends_with("#LyricGeoGuesser"));
    }
}
