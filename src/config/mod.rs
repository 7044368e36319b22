use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod defaults;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub lyrics: LyricsConfig,
    pub game: GameConfig,
    pub catalogue: CatalogueConfig,
    pub scores: ScoresConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    /// LRCLIB API root
    pub base_url: String,
    pub timeout_secs: u64,
    /// Pause between background prefetch lookups
    pub prefetch_delay_ms: u64,
    /// Bound on cached songs; unset keeps every song for the life of the process
    pub cache_capacity: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub questions_per_round: usize,
    pub countdown_ticks: u32,
    pub tick_ms: u64,
    /// Candidate songs drawn per round, to absorb lookup misses
    pub pool_size: usize,
    /// Questions loaded ahead of the one being played
    pub lookahead: usize,
    /// Songs handed to the background prefetcher once a round starts
    pub initial_prefetch: usize,
    /// Pause between the last answer and the results screen
    pub handoff_delay_ms: u64,
    pub advance_on_timeout: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueConfig {
    /// TOML catalogue replacing the built-in artists
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoresConfig {
    pub history_limit: usize,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|p| p.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("lyricguessr"));
        Self { data_dir }
    }
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            base_url: crate::lyrics::LrclibClient::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            prefetch_delay_ms: 100,
            cache_capacity: None,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            questions_per_round: 10,
            countdown_ticks: 10,
            tick_ms: 1000,
            pool_size: 25,
            lookahead: 3,
            initial_prefetch: 5,
            handoff_delay_ms: 100,
            advance_on_timeout: true,
        }
    }
}

impl Default for ScoresConfig {
    fn default() -> Self {
        Self {
            history_limit: crate::storage::DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl LyricsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn prefetch_delay(&self) -> Duration {
        Duration::from_millis(self.prefetch_delay_ms)
    }
}

impl GameConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn handoff_delay(&self) -> Duration {
        Duration::from_millis(self.handoff_delay_ms)
    }
}

impl Config {
    pub fn scores_path(&self) -> PathBuf {
        self.paths.data_dir.join("scores.sqlite3")
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "lyricguessr", "lyricguessr")
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = project_dirs().context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn save(cfg: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

/// Read the config, writing the defaults first if the file does not exist
pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = defaults::defaults();
        save(&cfg, &path).context("write default config")?;
        tracing::info!(path = %path.display(), "wrote default config");
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    defaults::validate(&cfg).with_context(|| format!("invalid {}", path.display()))?;
    Ok(cfg)
}
