//! LRCLIB API client
//!
//! LRCLIB is a free lyrics API that provides synchronized (LRC format) lyrics.
//! API Documentation: https://lrclib.net/docs

use super::{LookupRequest, LyricsSource};
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

/// LRCLIB API response
#[derive(Debug, Deserialize, Clone)]
pub struct LrclibResponse {
    #[allow(dead_code)]
    id: i64,
    #[allow(dead_code)]
    #[serde(rename = "trackName")]
    track_name: String,
    #[allow(dead_code)]
    #[serde(rename = "plainLyrics")]
    plain_lyrics: Option<String>,
    #[serde(rename = "syncedLyrics")]
    pub synced_lyrics: Option<String>,
}

/// LRCLIB API client
#[derive(Debug, Clone)]
pub struct LrclibClient {
    client: reqwest::Client,
    base_url: String,
}

impl LrclibClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://lrclib.net/api";
    const USER_AGENT: &'static str = "lyricguessr/0.1.0 (https://github.com/lyricguessr)";

    /// Create a new LRCLIB client against `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .timeout(timeout)
            .build()
            .context("build lrclib http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get lyrics with exact match on artist, track, album and duration
    pub async fn get_exact(&self, req: &LookupRequest) -> anyhow::Result<Option<LrclibResponse>> {
        let url = format!(
            "{}/get?artist_name={}&track_name={}&album_name={}&duration={}",
            self.base_url,
            urlencoding::encode(&req.artist_name),
            urlencoding::encode(&req.track_name),
            urlencoding::encode(&req.album_name),
            req.duration_secs
        );

        let response = self.client.get(&url).send().await?;

        if response.status().is_success() {
            let lyrics: LrclibResponse = response.json().await?;
            Ok(Some(lyrics))
        } else if response.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            anyhow::bail!("LRCLIB API error: {}", response.status());
        }
    }
}

impl LyricsSource for LrclibClient {
    async fn fetch_synced(&self, req: &LookupRequest) -> anyhow::Result<Option<String>> {
        // Plain lyrics carry no timestamps, so they are as good as nothing here
        Ok(self
            .get_exact(req)
            .await?
            .and_then(|r| r.synced_lyrics)
            .filter(|s| !s.trim().is_empty()))
    }
}
