//! Static per-artist song lists.

use anyhow::Context;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod builtin;
pub mod picker;

pub use picker::SongPicker;

static BUILTIN: Lazy<Catalogue> = Lazy::new(builtin::catalogue);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub album: String,
    pub duration_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub songs: Vec<Song>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalogue {
    #[serde(default, rename = "artist")]
    pub artists: Vec<Artist>,
}

impl Catalogue {
    pub fn builtin() -> &'static Catalogue {
        &BUILTIN
    }

    /// Load a catalogue file (`[[artist]]` tables with `[[artist.songs]]`)
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse {}", path.display()))
    }

    pub fn artist(&self, id: &str) -> Option<&Artist> {
        self.artists.iter().find(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_enough_songs_for_a_round() {
        let cat = Catalogue::builtin();
        let taylor = cat.artist("taylor-swift").unwrap();
        assert_eq!(taylor.name, "Taylor Swift");
        assert!(taylor.songs.len() >= 25);
        assert!(cat.artist("nobody").is_none());
        assert!(cat.artists.iter().all(|a| a.songs.iter().all(|s| s.duration_seconds > 0)));
    }

    #[test]
    fn test_parse_catalogue_toml() {
        let raw = r#"
[[artist]]
id = "band"
name = "The Band"

[[artist.songs]]
title = "Opener"
album = "Debut"
duration_seconds = 200
"#;
        let cat: Catalogue = toml::from_str(raw).unwrap();
        let band = cat.artist("band").unwrap();
        assert_eq!(band.songs[0].title, "Opener");
        assert_eq!(band.songs[0].duration_seconds, 200);
    }
}
