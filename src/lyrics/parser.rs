//! LRC format parser
//!
//! Parses synchronized lyrics in LRC format into a timeline where every line
//! is also positioned as a percentage of the song's duration:
//! [mm:ss.xx] Lyrics line here
//!
//! Example:
//! [00:12.34] Hello world
//! [00:15.00] Another line

/// A single line of lyrics with its position in the song
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    /// Offset from the start of the song in seconds
    pub time_secs: f64,
    /// The lyrics text
    pub text: String,
    /// `time_secs` relative to the song duration, 0..=100 for sane input
    pub percentage: f64,
}

impl LyricLine {
    pub fn new(time_secs: f64, text: impl Into<String>, duration_secs: f64) -> Self {
        Self {
            time_secs,
            text: text.into(),
            percentage: time_secs / duration_secs * 100.0,
        }
    }
}

/// Timestamped lyrics in the order they appear in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLyrics {
    pub lines: Vec<LyricLine>,
}

impl ParsedLyrics {
    /// Parse LRC formatted lyrics.
    ///
    /// Returns `None` when no line survives parsing, or when the duration
    /// cannot anchor a percentage. Lines keep source order; out-of-order
    /// timestamps are not corrected.
    pub fn parse(content: &str, duration_secs: f64) -> Option<Self> {
        if duration_secs.is_nan() || duration_secs <= 0.0 {
            return None;
        }

        let mut lines = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Metadata tags like [ti:Title] fail the timestamp grammar and drop here
            let Some((stamps, text)) = Self::parse_timed_line(line) else {
                continue;
            };

            if text.is_empty() || is_instrumental_marker(text) {
                continue;
            }

            lines.extend(
                stamps
                    .into_iter()
                    .map(|secs| LyricLine::new(secs, text, duration_secs)),
            );
        }

        if lines.is_empty() {
            None
        } else {
            Some(Self { lines })
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Parse a timed line like [00:12.34]Lyrics or [00:12.34][00:15.00]Lyrics
    fn parse_timed_line(line: &str) -> Option<(Vec<f64>, &str)> {
        let mut stamps = Vec::new();
        let mut rest = line;

        while let Some(inner) = rest.strip_prefix('[') {
            let Some(end) = inner.find(']') else {
                break;
            };
            match Self::parse_timestamp(&inner[..end]) {
                Some(secs) => {
                    stamps.push(secs);
                    rest = inner[end + 1..].trim_start();
                }
                None => break,
            }
        }

        if stamps.is_empty() {
            return None;
        }

        Some((stamps, rest.trim()))
    }

    /// Parse "mm:ss.xx" or "mm:ss.xxx" to seconds
    fn parse_timestamp(s: &str) -> Option<f64> {
        let (min, rest) = s.split_once(':')?;
        let (sec, frac) = rest.split_once('.')?;

        if min.len() != 2 || sec.len() != 2 || !(2..=3).contains(&frac.len()) {
            return None;
        }
        if ![min, sec, frac]
            .iter()
            .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
        {
            return None;
        }

        let min: u64 = min.parse().ok()?;
        let sec: u64 = sec.parse().ok()?;
        // Two digits are centiseconds: "34" -> 340ms
        let ms: u64 = format!("{frac:0<3}").parse().ok()?;

        Some((min * 60 + sec) as f64 + ms as f64 / 1000.0)
    }
}

fn is_instrumental_marker(text: &str) -> bool {
    text.trim_matches(|c: char| !c.is_alphanumeric())
        .eq_ignore_ascii_case("instrumental")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(ParsedLyrics::parse_timestamp("00:12.34"), Some(12.34));
        assert_eq!(ParsedLyrics::parse_timestamp("00:12.340"), Some(12.34));
        assert_eq!(ParsedLyrics::parse_timestamp("01:30.05"), Some(90.05));
        assert_eq!(ParsedLyrics::parse_timestamp("00:12"), None);
        assert_eq!(ParsedLyrics::parse_timestamp("0:12.34"), None);
        assert_eq!(ParsedLyrics::parse_timestamp("00:12.3"), None);
        assert_eq!(ParsedLyrics::parse_timestamp("ti:Title"), None);
    }

    #[test]
    fn test_parse_lrc() {
        let lrc = r#"
[ti:Test Song]
[ar:Test Artist]
[00:12.50] Hello there
[00:05.00] Instrumental
[00:15.00]Second line
"#;
        let parsed = ParsedLyrics::parse(lrc, 120.0).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.lines[0].time_secs, 12.5);
        assert_eq!(parsed.lines[0].text, "Hello there");
        assert!((parsed.lines[0].percentage - 10.416_666).abs() < 1e-4);
        assert_eq!(parsed.lines[1].text, "Second line");
    }

    #[test]
    fn test_drops_empty_and_decorated_instrumental() {
        let lrc = "[00:01.00]\n[00:02.00] (INSTRUMENTAL)\n[00:03.00] ♪ instrumental ♪\n[00:04.00] An instrumental break";
        let parsed = ParsedLyrics::parse(lrc, 100.0).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.lines[0].text, "An instrumental break");
    }

    #[test]
    fn test_keeps_source_order() {
        let lrc = "[00:30.00] later\n[00:10.00] earlier";
        let parsed = ParsedLyrics::parse(lrc, 60.0).unwrap();
        assert_eq!(parsed.lines[0].text, "later");
        assert_eq!(parsed.lines[1].text, "earlier");
    }

    #[test]
    fn test_repeated_stamps_expand_in_written_order() {
        let lrc = "[00:10.00][01:10.00] Chorus again";
        let parsed = ParsedLyrics::parse(lrc, 100.0).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.lines[0].time_secs, 10.0);
        assert_eq!(parsed.lines[1].time_secs, 70.0);
        assert!(parsed.lines.iter().all(|l| l.text == "Chorus again"));
    }

    #[test]
    fn test_nothing_parsable_is_absent() {
        assert!(ParsedLyrics::parse("", 100.0).is_none());
        assert!(ParsedLyrics::parse("plain words\nno stamps", 100.0).is_none());
        assert!(ParsedLyrics::parse("[00:01.00] Instrumental", 100.0).is_none());
        assert!(ParsedLyrics::parse("[00:01.00] words", 0.0).is_none());
    }
}
