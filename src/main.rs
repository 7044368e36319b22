mod app;
mod catalogue;
mod config;
mod game;
mod input;
mod lyrics;
mod storage;
mod tui;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use game::score::MAX_POINTS;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Parser)]
#[command(
    name = "lyricguessr",
    version,
    about = "Guess where in the song a lyric line is sung"
)]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play rounds of questions for an artist.
    Play {
        /// Artist id as listed by `artists`.
        artist_id: String,
    },
    /// List the artists you can play.
    Artists,
    /// Best score per artist.
    Leaderboard,
    /// Most recent rounds, newest first.
    Recent {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Fetch a song's synced lyrics and print where each line falls.
    Lyrics {
        artist_id: String,
        title: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    // The game screen owns the terminal, so its logs go to a file
    let log_file = matches!(cli.command, Some(Command::Play { .. }))
        .then(|| cfg.paths.data_dir.join("lyricguessr.log"));
    init_logging(cli.verbose, log_file)?;

    let max_score = cfg.game.questions_per_round as u32 * MAX_POINTS;

    match cli.command {
        Some(Command::Play { artist_id }) => {
            let mut app = app::App::new(cfg)?;
            if app.catalogue().artist(&artist_id).is_none() {
                anyhow::bail!("unknown artist '{artist_id}', see `lyricguessr artists`");
            }
            let mut terminal = tui::TerminalGuard::enter().context("init terminal")?;
            let outcomes = app.run(terminal.terminal_mut(), &artist_id).await;
            drop(terminal);
            let outcomes = outcomes?;
            if let Some(last) = outcomes.iter().rev().find(|o| !o.results.is_empty()) {
                println!(
                    "{}",
                    game::score::share_text(&last.artist_name, last.score, last.max_score, &last.results)
                );
            }
        }
        None => {
            let app = app::App::new(cfg)?;
            println!("Pick an artist and run `lyricguessr play <artist-id>`:\n");
            app::view::artists(app.catalogue());
        }
        Some(Command::Artists) => {
            let app = app::App::new(cfg)?;
            app::view::artists(app.catalogue());
        }
        Some(Command::Leaderboard) => {
            let app = app::App::new(cfg)?;
            app::view::leaderboard(&app.scores().leaderboard(), max_score);
        }
        Some(Command::Recent { limit }) => {
            let app = app::App::new(cfg)?;
            app::view::recent(&app.scores().recent(limit));
        }
        Some(Command::Lyrics { artist_id, title }) => {
            let mut app = app::App::new(cfg)?;
            app.show_lyrics(&artist_id, &title).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, log_file: Option<PathBuf>) -> anyhow::Result<()> {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create dir {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("open log {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}
