use crate::game::{RoundOutcome, RoundResult};
use anyhow::Context;
use rusqlite::{Connection, params};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub id: String,
    pub artist_id: String,
    pub artist_name: String,
    pub score: u32,
    pub results: Vec<RoundResult>,
    pub date: OffsetDateTime,
    seq: i64,
}

pub struct ScoreStore {
    conn: Connection,
    history_limit: usize,
}

impl ScoreStore {
    pub fn open(path: &Path, history_limit: usize) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let conn = Connection::open(path).with_context(|| format!("open {}", path.display()))?;
        let s = Self { conn, history_limit };
        s.init_schema()?;
        Ok(s)
    }

    #[cfg(test)]
    pub fn open_in_memory(history_limit: usize) -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory db")?;
        let s = Self { conn, history_limit };
        s.init_schema()?;
        Ok(s)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn
            .execute_batch(
                r#"
CREATE TABLE IF NOT EXISTS scores (
  seq INTEGER PRIMARY KEY AUTOINCREMENT,
  id TEXT NOT NULL UNIQUE,
  artist_id TEXT NOT NULL,
  artist_name TEXT NOT NULL,
  score INTEGER NOT NULL,
  results_json TEXT NOT NULL,
  date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_scores_artist ON scores(artist_id);
"#,
            )
            .context("init schema")?;
        Ok(())
    }

    /// Append a finished round and trim history to the most recent entries
    pub fn save(
        &self,
        artist_id: &str,
        artist_name: &str,
        score: u32,
        results: &[RoundResult],
    ) -> anyhow::Result<ScoreEntry> {
        self.save_at(artist_id, artist_name, score, results, OffsetDateTime::now_utc())
    }

    fn save_at(
        &self,
        artist_id: &str,
        artist_name: &str,
        score: u32,
        results: &[RoundResult],
        date: OffsetDateTime,
    ) -> anyhow::Result<ScoreEntry> {
        let id = format!(
            "{:x}-{:08x}",
            date.unix_timestamp_nanos() / 1_000_000,
            rand::random::<u32>()
        );
        let results_json = serde_json::to_string(results).context("serialize results")?;
        let date_str = date.format(&Rfc3339).context("format date")?;

        self.conn
            .execute(
                r#"
INSERT INTO scores(id, artist_id, artist_name, score, results_json, date)
VALUES(?1, ?2, ?3, ?4, ?5, ?6)
"#,
                params![id, artist_id, artist_name, score, results_json, date_str],
            )
            .context("insert score")?;
        let seq = self.conn.last_insert_rowid();

        self.conn
            .execute(
                "DELETE FROM scores WHERE seq NOT IN (SELECT seq FROM scores ORDER BY seq DESC LIMIT ?1)",
                params![self.history_limit as i64],
            )
            .context("trim score history")?;

        Ok(ScoreEntry {
            id,
            artist_id: artist_id.to_string(),
            artist_name: artist_name.to_string(),
            score,
            results: results.to_vec(),
            date,
            seq,
        })
    }

    /// Every stored entry, oldest first. Rows that no longer decode are skipped.
    pub fn query_all(&self) -> anyhow::Result<Vec<ScoreEntry>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT seq, id, artist_id, artist_name, score, results_json, date FROM scores ORDER BY seq ASC",
            )
            .context("prepare score query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u32>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .context("query scores")?;

        let mut entries = Vec::new();
        for row in rows {
            let (seq, id, artist_id, artist_name, score, results_json, date) = match row {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("skipping unreadable score row: {e}");
                    continue;
                }
            };
            let results = match serde_json::from_str(&results_json) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(%id, "skipping score with corrupt results: {e}");
                    continue;
                }
            };
            let date = match OffsetDateTime::parse(&date, &Rfc3339) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!(%id, "skipping score with corrupt date: {e}");
                    continue;
                }
            };
            entries.push(ScoreEntry {
                id,
                artist_id,
                artist_name,
                score,
                results,
                date,
                seq,
            });
        }
        Ok(entries)
    }

    /// One entry per artist (its highest score, earliest on ties), best first
    pub fn query_best_per_artist(&self) -> anyhow::Result<Vec<ScoreEntry>> {
        let mut best: HashMap<String, ScoreEntry> = HashMap::new();
        for entry in self.query_all()? {
            match best.get(&entry.artist_id) {
                Some(current) if entry.score <= current.score => {}
                _ => {
                    best.insert(entry.artist_id.clone(), entry);
                }
            }
        }

        let mut board: Vec<ScoreEntry> = best.into_values().collect();
        board.sort_by(|a, b| b.score.cmp(&a.score).then(a.seq.cmp(&b.seq)));
        Ok(board)
    }

    /// Newest first
    pub fn query_recent(&self, limit: usize) -> anyhow::Result<Vec<ScoreEntry>> {
        let mut entries = self.query_all()?;
        entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.seq.cmp(&a.seq)));
        entries.truncate(limit);
        Ok(entries)
    }

    pub fn best_for_artist(&self, artist_id: &str) -> anyhow::Result<Option<u32>> {
        let best = self
            .conn
            .query_row(
                "SELECT MAX(score) FROM scores WHERE artist_id=?1",
                params![artist_id],
                |row| row.get::<_, Option<u32>>(0),
            )
            .context("query best score")?;
        Ok(best)
    }
}

/// Score history that never fails its caller.
///
/// Opens the database per operation. Read errors come back as an empty
/// history and failed writes are dropped, both with a warning.
#[derive(Debug, Clone)]
pub struct ScoreBoard {
    path: PathBuf,
    history_limit: usize,
}

impl ScoreBoard {
    pub fn new(path: PathBuf, history_limit: usize) -> Self {
        Self { path, history_limit }
    }

    fn open(&self) -> anyhow::Result<ScoreStore> {
        ScoreStore::open(&self.path, self.history_limit)
    }

    pub fn record(&self, outcome: &RoundOutcome) -> Option<ScoreEntry> {
        let saved = self.open().and_then(|store| {
            store.save(
                &outcome.artist_id,
                &outcome.artist_name,
                outcome.score,
                &outcome.results,
            )
        });
        match saved {
            Ok(entry) => {
                tracing::info!(id = %entry.id, score = entry.score, "score saved");
                Some(entry)
            }
            Err(e) => {
                tracing::warn!("dropping score, save failed: {e:#}");
                None
            }
        }
    }

    pub fn leaderboard(&self) -> Vec<ScoreEntry> {
        self.read("leaderboard", |s| s.query_best_per_artist())
    }

    pub fn recent(&self, limit: usize) -> Vec<ScoreEntry> {
        self.read("recent scores", |s| s.query_recent(limit))
    }

    #[cfg(test)]
    pub fn all(&self) -> Vec<ScoreEntry> {
        self.read("score history", |s| s.query_all())
    }

    pub fn best_for_artist(&self, artist_id: &str) -> Option<u32> {
        match self.open().and_then(|s| s.best_for_artist(artist_id)) {
            Ok(best) => best,
            Err(e) => {
                tracing::warn!("best score unavailable: {e:#}");
                None
            }
        }
    }

    fn read(
        &self,
        what: &str,
        query: impl FnOnce(&ScoreStore) -> anyhow::Result<Vec<ScoreEntry>>,
    ) -> Vec<ScoreEntry> {
        match self.open().and_then(|s| query(&s)) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("{what} unavailable: {e:#}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::EndReason;
    use time::Duration;

    fn results(points: &[u32]) -> Vec<RoundResult> {
        points
            .iter()
            .map(|p| RoundResult {
                song_title: format!("Song {p}"),
                guess_percentage: Some(40.0),
                actual_percentage: 42.5,
                points: *p,
            })
            .collect()
    }

    fn at(minutes: i64) -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + Duration::days(20_000) + Duration::minutes(minutes)
    }

    fn temp_db(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("lyricguessr-test-{}-{name}", std::process::id()))
            .join("scores.sqlite3")
    }

    #[test]
    fn test_save_and_query_all() {
        let store = ScoreStore::open_in_memory(DEFAULT_HISTORY_LIMIT).unwrap();
        let saved = store.save("taylor-swift", "Taylor Swift", 170, &results(&[100, 70])).unwrap();

        let all = store.query_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], saved);
        assert_eq!(all[0].results[1].points, 70);
        assert!(!saved.id.is_empty());
    }

    #[test]
    fn test_history_is_trimmed_to_most_recent() {
        let store = ScoreStore::open_in_memory(3).unwrap();
        for score in 1..=5 {
            store.save("a", "A", score, &[]).unwrap();
        }
        let scores: Vec<u32> = store.query_all().unwrap().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![3, 4, 5]);
    }

    #[test]
    fn test_best_per_artist() {
        let store = ScoreStore::open_in_memory(DEFAULT_HISTORY_LIMIT).unwrap();
        store.save_at("a", "A", 300, &[], at(0)).unwrap();
        let first_top = store.save_at("a", "A", 800, &[], at(1)).unwrap();
        store.save_at("b", "B", 900, &[], at(2)).unwrap();
        store.save_at("a", "A", 800, &[], at(3)).unwrap();
        store.save_at("c", "C", 100, &[], at(4)).unwrap();

        let board = store.query_best_per_artist().unwrap();
        let summary: Vec<(&str, u32)> = board.iter().map(|e| (e.artist_id.as_str(), e.score)).collect();
        assert_eq!(summary, vec![("b", 900), ("a", 800), ("c", 100)]);
        assert_eq!(board[1].id, first_top.id);

        assert_eq!(store.best_for_artist("a").unwrap(), Some(800));
        assert_eq!(store.best_for_artist("nobody").unwrap(), None);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let store = ScoreStore::open_in_memory(DEFAULT_HISTORY_LIMIT).unwrap();
        store.save_at("a", "A", 1, &[], at(10)).unwrap();
        store.save_at("a", "A", 2, &[], at(30)).unwrap();
        store.save_at("a", "A", 3, &[], at(20)).unwrap();

        let recent: Vec<u32> = store.query_recent(2).unwrap().iter().map(|e| e.score).collect();
        assert_eq!(recent, vec![2, 3]);
        assert_eq!(store.query_recent(10).unwrap().len(), 3);
    }

    #[test]
    fn test_corrupt_rows_are_skipped() {
        let store = ScoreStore::open_in_memory(DEFAULT_HISTORY_LIMIT).unwrap();
        store.save("a", "A", 500, &[]).unwrap();
        store
            .conn
            .execute(
                "INSERT INTO scores(id, artist_id, artist_name, score, results_json, date) VALUES('x', 'a', 'A', 999, 'not json', 'yesterday')",
                [],
            )
            .unwrap();

        let all = store.query_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].score, 500);
    }

    #[test]
    fn test_scoreboard_round_trip_on_disk() {
        let path = temp_db("roundtrip");
        let _ = std::fs::remove_file(&path);
        let board = ScoreBoard::new(path.clone(), DEFAULT_HISTORY_LIMIT);

        let outcome = RoundOutcome {
            artist_id: "utada-hikaru".into(),
            artist_name: "Utada Hikaru".into(),
            score: 420,
            max_score: 1000,
            results: results(&[100, 100, 100, 100, 20]),
            reason: EndReason::Exhausted,
        };
        assert!(board.record(&outcome).is_some());

        let reopened = ScoreBoard::new(path.clone(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(reopened.all().len(), 1);
        assert_eq!(reopened.best_for_artist("utada-hikaru"), Some(420));
        assert_eq!(reopened.leaderboard()[0].artist_name, "Utada Hikaru");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_scoreboard_degrades_when_unopenable() {
        // A directory where the database file should be
        let path = temp_db("unopenable");
        std::fs::create_dir_all(&path).unwrap();
        let board = ScoreBoard::new(path.clone(), DEFAULT_HISTORY_LIMIT);

        assert!(board.all().is_empty());
        assert!(board.leaderboard().is_empty());
        assert!(board.recent(5).is_empty());
        assert_eq!(board.best_for_artist("a"), None);
        let outcome = RoundOutcome {
            artist_id: "a".into(),
            artist_name: "A".into(),
            score: 1,
            max_score: 1000,
            results: vec![],
            reason: EndReason::Completed,
        };
        assert!(board.record(&outcome).is_none());
        let _ = std::fs::remove_dir_all(&path);
    }
}
