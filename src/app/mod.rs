pub mod actions;
pub mod events;
pub mod state;
pub mod view;

use crate::catalogue::{Catalogue, SongPicker};
use crate::config::Config;
use crate::game::phrase::select_phrase;
use crate::game::session::{Effect, SessionConfig};
use crate::game::{EndReason, Phase, QuestionLoader, RoundOutcome, Session};
use crate::input;
use crate::lyrics::{LrclibClient, LyricsCache, LyricsEntry, LyricsSource, PrefetchScheduler};
use crate::storage::{ScoreBoard, ScoreEntry};
use crate::tui;
use actions::Action;
use anyhow::Context;
use events::{Event, InputEvent, RoundEvent};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{Terminal, backend::Backend};
use state::{AppState, Screen};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct App<S> {
    cfg: Config,
    catalogue: Catalogue,
    cache: Arc<LyricsCache<S>>,
    prefetch: PrefetchScheduler<S>,
    picker: SongPicker,
    scores: ScoreBoard,
    rng: StdRng,
    round: u64,
    state: AppState,
}

/// What the player picked on the results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replay {
    Again,
    NewSession,
    Quit,
}

impl App<LrclibClient> {
    pub fn new(cfg: Config) -> anyhow::Result<Self> {
        let source = LrclibClient::new(&cfg.lyrics.base_url, cfg.lyrics.timeout())?;
        let catalogue = match &cfg.catalogue.path {
            Some(path) => Catalogue::load(path).context("load catalogue")?,
            None => Catalogue::builtin().clone(),
        };
        Ok(Self::with_source(cfg, catalogue, source))
    }
}

impl<S: LyricsSource> App<S> {
    pub fn with_source(cfg: Config, catalogue: Catalogue, source: S) -> Self {
        let cache = Arc::new(LyricsCache::with_capacity(source, cfg.lyrics.cache_capacity));
        let prefetch = PrefetchScheduler::new(Arc::clone(&cache), cfg.lyrics.prefetch_delay());
        let scores = ScoreBoard::new(cfg.scores_path(), cfg.scores.history_limit);
        let state = AppState::new(cfg.game.countdown_ticks);
        Self {
            cfg,
            catalogue,
            cache,
            prefetch,
            picker: SongPicker::new(),
            scores,
            rng: StdRng::from_os_rng(),
            round: 0,
            state,
        }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    /// Forget which song ended each artist's previous round
    pub fn new_session(&mut self) {
        tracing::info!("new session");
        self.picker.reset();
    }

    /// Play rounds against the keyboard until the player quits
    pub async fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        artist_id: &str,
    ) -> anyhow::Result<Vec<RoundOutcome>> {
        let (tx, rx) = mpsc::channel::<Event>(256);
        input::spawn_input_task(tx.clone());
        self.play(terminal, artist_id, tx, rx).await
    }

    /// Round after round on one event channel; the picker and the lyrics
    /// cache carry over between them
    pub async fn play<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        artist_id: &str,
        tx: mpsc::Sender<Event>,
        mut rx: mpsc::Receiver<Event>,
    ) -> anyhow::Result<Vec<RoundOutcome>> {
        let mut outcomes = Vec::new();
        loop {
            let Some(outcome) = self.play_round(terminal, artist_id, &tx, &mut rx).await? else {
                break;
            };
            let reason = outcome.reason;
            outcomes.push(outcome);

            match self.await_replay(terminal, &mut rx, reason).await? {
                Replay::Again => {}
                Replay::NewSession => self.new_session(),
                Replay::Quit => break,
            }
        }
        Ok(outcomes)
    }

    /// Play one round. `None` if the player quit.
    pub async fn play_round<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        artist_id: &str,
        tx: &mpsc::Sender<Event>,
        rx: &mut mpsc::Receiver<Event>,
    ) -> anyhow::Result<Option<RoundOutcome>> {
        let artist = self
            .catalogue
            .artist(artist_id)
            .cloned()
            .with_context(|| format!("unknown artist '{artist_id}'"))?;

        self.round += 1;
        let songs = self.picker.pick(&artist, self.cfg.game.pool_size, &mut self.rng);
        tracing::info!(artist = %artist.name, round = self.round, candidates = songs.len(), "starting round");

        let mut driver = RoundDriver {
            artist_name: artist.name.clone(),
            round: self.round,
            loader: QuestionLoader::new(&artist.name, songs, Arc::clone(&self.cache)),
            prefetch: self.prefetch.clone(),
            tx: tx.clone(),
            tick: self.cfg.game.tick(),
            initial_prefetch: self.cfg.game.initial_prefetch,
            countdown: None,
            warmup: None,
        };
        let mut session = Session::new(&artist.id, &artist.name, self.round, self.session_config());
        self.state.artist_name = artist.name.clone();
        self.state.notice = None;
        self.state.screen = Screen::Round;

        let mut effects = session.start();
        loop {
            for effect in effects {
                if let Effect::Finished(outcome) = effect {
                    driver.stop_countdown();
                    return Ok(Some(self.finish(terminal, outcome).await?));
                }
                if matches!(effect, Effect::StartCountdown { .. }) {
                    self.state.guess.reset();
                }
                driver.apply(effect);
            }
            tui::draw(terminal, &self.state, Some(&session))?;

            let Some(ev) = rx.recv().await else {
                return Ok(None);
            };
            effects = match ev {
                Event::Input(InputEvent::Key(k)) => {
                    match input::map_input_to_action(session.phase(), k) {
                        Some(Action::Quit) => {
                            tracing::info!(round = self.round, "round abandoned");
                            return Ok(None);
                        }
                        Some(action) => self.apply_action(&mut session, action),
                        None => Vec::new(),
                    }
                }
                Event::Input(InputEvent::Resize) => Vec::new(),
                Event::Round(RoundEvent::Loaded { round, question }) => {
                    session.on_loaded(round, question)
                }
                Event::Round(RoundEvent::Tick {
                    round,
                    question_key,
                }) => {
                    if round != session.round() {
                        Vec::new()
                    } else {
                        let answered = session.results().len();
                        let effects = session.tick(question_key);
                        if let Some(result) = session.results().get(answered) {
                            self.state.notice = Some(format!(
                                "⌛ Time's up! That line from {} was at {:.1}%",
                                result.song_title, result.actual_percentage
                            ));
                        }
                        effects
                    }
                }
            };
        }
    }

    /// Fetch one song's lyrics and print its timeline
    pub async fn show_lyrics(&mut self, artist_id: &str, title: &str) -> anyhow::Result<()> {
        let artist = self
            .catalogue
            .artist(artist_id)
            .with_context(|| format!("unknown artist '{artist_id}'"))?;
        let song = artist
            .songs
            .iter()
            .find(|s| s.title.eq_ignore_ascii_case(title))
            .cloned()
            .with_context(|| format!("'{title}' is not in the catalogue for {}", artist.name))?;
        let artist_name = artist.name.clone();

        match self.cache.resolve(&artist_name, &song).await {
            LyricsEntry::Found(lyrics) => {
                let sample = select_phrase(&lyrics, &mut self.rng);
                view::lyrics_timeline(&song.title, &lyrics, sample.as_ref().map(|l| l.text.as_str()));
                Ok(())
            }
            LyricsEntry::Miss => anyhow::bail!("no synced lyrics for {} by {artist_name}", song.title),
        }
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            round_length: self.cfg.game.questions_per_round,
            countdown_ticks: self.cfg.game.countdown_ticks,
            lookahead: self.cfg.game.lookahead,
            advance_on_timeout: self.cfg.game.advance_on_timeout,
        }
    }

    fn apply_action(&mut self, session: &mut Session, action: Action) -> Vec<Effect> {
        match action {
            Action::Nudge(delta) => self.state.guess.nudge(delta),
            Action::Digit(d) => self.state.guess.digit(d),
            Action::Erase => self.state.guess.erase(),
            Action::Submit => {
                self.state.notice = None;
                return session.guess(self.state.guess.percentage());
            }
            Action::Next => return session.advance(),
            Action::PlayAgain | Action::NewSession | Action::Quit => {}
        }
        Vec::new()
    }

    async fn await_replay<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        rx: &mut mpsc::Receiver<Event>,
        reason: EndReason,
    ) -> anyhow::Result<Replay> {
        while let Some(ev) = rx.recv().await {
            match ev {
                Event::Input(InputEvent::Key(k)) => {
                    match input::map_input_to_action(Phase::Finished(reason), k) {
                        Some(Action::PlayAgain) => return Ok(Replay::Again),
                        Some(Action::NewSession) => return Ok(Replay::NewSession),
                        Some(Action::Quit) => return Ok(Replay::Quit),
                        _ => {}
                    }
                }
                Event::Input(InputEvent::Resize) => tui::draw(terminal, &self.state, None)?,
                // Leftovers of the finished round
                Event::Round(_) => {}
            }
        }
        Ok(Replay::Quit)
    }

    async fn finish<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        outcome: RoundOutcome,
    ) -> anyhow::Result<RoundOutcome> {
        tokio::time::sleep(self.cfg.game.handoff_delay()).await;

        let previous_best = if outcome.results.is_empty() {
            tracing::info!(artist = %outcome.artist_name, "no playable questions, nothing saved");
            None
        } else {
            let scores = self.scores.clone();
            let to_save = outcome.clone();
            let saved = tokio::task::spawn_blocking(move || {
                let previous_best = scores.best_for_artist(&to_save.artist_id);
                let entry: Option<ScoreEntry> = scores.record(&to_save);
                (previous_best, entry)
            })
            .await;
            match saved {
                Ok((best, _)) => best,
                Err(e) => {
                    tracing::warn!("score save task failed: {e}");
                    None
                }
            }
        };

        self.state.screen = Screen::Results {
            outcome: outcome.clone(),
            previous_best,
        };
        tui::draw(terminal, &self.state, None)?;
        Ok(outcome)
    }
}

/// Tasks and handles belonging to the round being played
struct RoundDriver<S> {
    artist_name: String,
    round: u64,
    loader: QuestionLoader<S>,
    prefetch: PrefetchScheduler<S>,
    tx: mpsc::Sender<Event>,
    tick: Duration,
    initial_prefetch: usize,
    countdown: Option<JoinHandle<()>>,
    warmup: Option<JoinHandle<()>>,
}

impl<S: LyricsSource> RoundDriver<S> {
    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::RequestQuestion { round } => self.spawn_load(round),
            Effect::StartCountdown { question_key } => {
                self.start_countdown(question_key);
                if question_key == 1 {
                    self.warm_upcoming();
                }
            }
            Effect::StopCountdown => self.stop_countdown(),
            Effect::Finished(_) => {}
        }
    }

    fn spawn_load(&self, round: u64) {
        let loader = self.loader.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let question = loader.next_question().await;
            let _ = tx.send(Event::Round(RoundEvent::Loaded { round, question })).await;
        });
    }

    /// Put the next pooled song at the head of the prefetch queue, then queue
    /// the few after it once that one has landed. Nothing more is queued if
    /// the round ends first.
    fn warm_upcoming(&mut self) {
        let mut upcoming = self.loader.upcoming(self.initial_prefetch).into_iter();
        let Some(next) = upcoming.next() else {
            return;
        };
        let rest: Vec<_> = upcoming.collect();
        let first = next.title.clone();
        let done = self.prefetch.prioritize(&self.artist_name, next);

        let prefetch = self.prefetch.clone();
        let artist = self.artist_name.clone();
        self.warmup = Some(tokio::spawn(async move {
            if done.await.is_err() {
                tracing::debug!(song = %first, "urgent prefetch dropped");
                return;
            }
            tracing::debug!(song = %first, "next song warm");
            prefetch.enqueue(&artist, rest);
        }));
    }
}

impl<S> RoundDriver<S> {
    fn start_countdown(&mut self, question_key: u64) {
        self.stop_countdown();
        let tx = self.tx.clone();
        let period = self.tick;
        let round = self.round;
        self.countdown = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                interval.tick().await;
                let tick = Event::Round(RoundEvent::Tick {
                    round,
                    question_key,
                });
                if tx.send(tick).await.is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }
}

impl<S> Drop for RoundDriver<S> {
    fn drop(&mut self) {
        self.stop_countdown();
        if let Some(handle) = self.warmup.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Artist;
    use crate::lyrics::testing::{StubSource, lrc, song};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;

    const ARTIST: &str = "test-artist";
    const LYRIC_SONGS: [&str; 3] = ["Track 2", "Track 5", "Track 9"];

    fn data_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lyricguessr-app-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    /// Twelve songs, three of them with lyrics sitting at exactly 50%
    fn app(name: &str, configure: impl FnOnce(&mut Config)) -> App<StubSource> {
        let mut cfg = Config::default();
        cfg.paths.data_dir = data_dir(name);
        configure(&mut cfg);

        let songs = (0..12).map(|i| song(&format!("Track {i}"), 100)).collect();
        let catalogue = Catalogue {
            artists: vec![Artist {
                id: ARTIST.to_string(),
                name: "Test Artist".to_string(),
                songs,
            }],
        };
        let source = StubSource::new()
            .with_lyrics("Track 2", lrc(&[(50, "two is the loneliest")]))
            .with_lyrics("Track 5", lrc(&[(50, "five alive and well")]))
            .with_lyrics("Track 9", lrc(&[(50, "nine lives left now")]))
            .with_failure("Track 7")
            .with_latency(Duration::from_millis(40));
        App::with_source(cfg, catalogue, source)
    }

    fn terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(80, 30)).unwrap()
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn key(code: KeyCode) -> Event {
        Event::Input(InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_unattended_round_times_out_and_is_saved() {
        let mut app = app("timeouts", |_| {});
        let mut terminal = terminal();
        let (tx, mut rx) = mpsc::channel(64);

        let outcome = app
            .play_round(&mut terminal, ARTIST, &tx, &mut rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.reason, EndReason::Exhausted);
        assert_eq!(outcome.results.len(), 3);
        assert!(outcome.results.iter().all(|r| r.guess_percentage.is_none() && r.points == 0));
        assert_eq!(outcome.score, 0);

        let saved = app.scores().all();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].artist_id, ARTIST);
        // Every song was looked up at most once despite prefetch and lookahead
        for i in 0..12 {
            assert!(app.cache.source().calls_for(&format!("Track {i}")) <= 1);
        }
        let shown = screen_text(&terminal);
        assert!(shown.contains("Results: Test Artist"));
        assert!(shown.contains("Short round"));
        let _ = std::fs::remove_dir_all(&app.cfg.paths.data_dir);
    }

    #[tokio::test(start_paused = true)]
    async fn test_guessed_round_completes() {
        let mut app = app("guesses", |cfg| cfg.game.questions_per_round = 3);
        let mut terminal = terminal();
        let (tx, mut rx) = mpsc::channel(64);

        // Enter locks in the slider's starting 50%, then moves on
        let feeder = tx.clone();
        tokio::spawn(async move {
            while feeder.send(key(KeyCode::Enter)).await.is_ok() {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        });

        let outcome = app
            .play_round(&mut terminal, ARTIST, &tx, &mut rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.reason, EndReason::Completed);
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.score, 300);
        assert_eq!(outcome.max_score, 300);
        assert!(outcome.results.iter().all(|r| r.guess_percentage == Some(50.0)));
        let _ = std::fs::remove_dir_all(&app.cfg.paths.data_dir);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slider_keys_set_the_guess() {
        let mut app = app("slider", |cfg| cfg.game.questions_per_round = 1);
        let mut terminal = terminal();
        let (tx, mut rx) = mpsc::channel(64);

        let feeder = tx.clone();
        tokio::spawn(async move {
            // Let the first question load before touching the slider
            tokio::time::sleep(Duration::from_secs(2)).await;
            for code in [KeyCode::Up, KeyCode::Right, KeyCode::Right, KeyCode::Enter] {
                let _ = feeder.send(key(code)).await;
            }
        });

        let outcome = app
            .play_round(&mut terminal, ARTIST, &tx, &mut rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].guess_percentage, Some(62.0));
        assert_eq!(outcome.results[0].points, 0);
        let _ = std::fs::remove_dir_all(&app.cfg.paths.data_dir);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_leaves_without_saving() {
        let mut app = app("quit", |_| {});
        let mut terminal = terminal();
        let (tx, mut rx) = mpsc::channel(64);
        tx.send(key(KeyCode::Char('q'))).await.unwrap();

        assert!(app.play_round(&mut terminal, ARTIST, &tx, &mut rx).await.unwrap().is_none());
        assert!(app.scores().all().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_artist_is_an_error() {
        let mut app = app("unknown", |_| {});
        let mut terminal = terminal();
        let (tx, mut rx) = mpsc::channel(64);
        assert!(app.play_round(&mut terminal, "nobody", &tx, &mut rx).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_round_keeps_continuity_and_cache() {
        let mut app = app("two-rounds", |cfg| cfg.game.pool_size = 12);
        let mut terminal = terminal();
        let (tx, mut rx) = mpsc::channel(64);

        let first = app
            .play_round(&mut terminal, ARTIST, &tx, &mut rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.results.len(), 3);
        let ended_on = app.picker.last_picked(ARTIST).unwrap().to_string();
        // Exhausting a full-catalogue pool looked every song up once
        let lookups = app.cache.source().calls();
        assert_eq!(lookups, 12);

        // The next pick is deterministic given the app's picker and rng
        let artist = app.catalogue.artist(ARTIST).cloned().unwrap();
        let expected = app.picker.clone().pick(&artist, 12, &mut app.rng.clone());
        assert_ne!(expected[0].title, ended_on);

        let second = app
            .play_round(&mut terminal, ARTIST, &tx, &mut rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            app.picker.last_picked(ARTIST),
            expected.last().map(|s| s.title.as_str())
        );
        let playable = expected
            .iter()
            .filter(|s| LYRIC_SONGS.contains(&s.title.as_str()))
            .count();
        assert_eq!(second.results.len(), playable);
        assert_eq!(app.cache.source().calls(), lookups);
        let _ = std::fs::remove_dir_all(&app.cfg.paths.data_dir);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_again_until_quit() {
        let mut app = app("replay", |_| {});
        let mut terminal = terminal();
        let (tx, rx) = mpsc::channel(64);

        // Rounds here last well under a minute of game time
        let feeder = tx.clone();
        tokio::spawn(async move {
            for code in [KeyCode::Enter, KeyCode::Char('n'), KeyCode::Char('q')] {
                tokio::time::sleep(Duration::from_secs(1000)).await;
                if feeder.send(key(code)).await.is_err() {
                    return;
                }
            }
        });

        let outcomes = app.play(&mut terminal, ARTIST, tx, rx).await.unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(app.round, 3);
        assert_eq!(app.scores().all().len(), 3);
        assert!(screen_text(&terminal).contains("Enter play again"));
        let _ = std::fs::remove_dir_all(&app.cfg.paths.data_dir);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_session_forgets_round_continuity() {
        let mut app = app("continuity", |cfg| cfg.game.pool_size = 12);
        let mut terminal = terminal();
        let (tx, mut rx) = mpsc::channel(64);
        tx.send(key(KeyCode::Char('q'))).await.unwrap();
        app.play_round(&mut terminal, ARTIST, &tx, &mut rx).await.unwrap();

        assert!(app.picker.last_picked(ARTIST).is_some());
        app.new_session();
        assert!(app.picker.last_picked(ARTIST).is_none());
    }

    fn driver(source: StubSource, titles: &[&str]) -> (RoundDriver<StubSource>, Arc<LyricsCache<StubSource>>) {
        let cache = Arc::new(LyricsCache::new(source));
        let songs = titles.iter().map(|t| song(t, 100)).collect();
        let (tx, _rx) = mpsc::channel(8);
        let driver = RoundDriver {
            artist_name: "Test Artist".to_string(),
            round: 1,
            loader: QuestionLoader::new("Test Artist", songs, Arc::clone(&cache)),
            prefetch: PrefetchScheduler::new(Arc::clone(&cache), Duration::from_millis(100)),
            tx,
            tick: Duration::from_secs(1),
            initial_prefetch: 3,
            countdown: None,
            warmup: None,
        };
        (driver, cache)
    }

    #[tokio::test(start_paused = true)]
    async fn test_warm_up_fetches_next_song_first() {
        let source = StubSource::new().with_latency(Duration::from_millis(500));
        let (mut driver, cache) = driver(source, &["A", "B", "C", "D"]);

        driver.warm_upcoming();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(cache.source().order(), ["A", "B", "C"]);
        let at = cache.source().call_times();
        assert!(at[1] >= at[0] + Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_warm_up_stops_with_the_round() {
        let source = StubSource::new().with_latency(Duration::from_millis(500));
        let (mut driver, cache) = driver(source, &["A", "B", "C"]);

        driver.warm_upcoming();
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(driver);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(cache.source().order(), ["A"]);
    }
}
