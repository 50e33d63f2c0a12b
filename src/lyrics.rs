//! Lyrics lookup for the current track.
//!
//! Lookups run on a worker thread; each one carries the id of the request that
//! started it so an answer for a track that is no longer current is dropped.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::LyricsSettings;
use crate::library::Track;

pub const INVALID_SONG: &str = "Unable to fetch lyrics.\nInvalid song format.";
pub const NO_LYRICS: &str = "No lyrics available.";
pub const LOOKUP_FAILED: &str = "No lyrics available online or\nexternal API error";

#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("invalid lyrics endpoint '{0}'")]
    Endpoint(String),

    #[error("lyrics request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lyrics service answered {0}")]
    Status(reqwest::StatusCode),
}

/// A lookup the event loop should run off-thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsRequest {
    pub id: u64,
    pub artist: String,
    pub title: String,
}

/// The worker's answer to a [`LyricsRequest`].
#[derive(Debug)]
pub struct LyricsResult {
    pub id: u64,
    pub outcome: Result<String, LyricsError>,
}

/// What the lyrics panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsView {
    /// Nothing requested yet, or lookups are disabled.
    Idle,
    Loading,
    Loaded(String),
    Unavailable(&'static str),
}

#[derive(Debug)]
pub struct LyricsState {
    enabled: bool,
    latest_id: u64,
    view: LyricsView,
    pending: Option<LyricsRequest>,
}

impl LyricsState {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            latest_id: 0,
            view: LyricsView::Idle,
            pending: None,
        }
    }

    pub fn view(&self) -> &LyricsView {
        &self.view
    }

    /// Start over for `track`. Any answer still in flight becomes stale.
    pub fn begin(&mut self, track: &Track) {
        self.latest_id += 1;
        self.pending = None;
        if !self.enabled {
            self.view = LyricsView::Idle;
            return;
        }
        match (&track.artist, &track.title) {
            (Some(artist), Some(title)) => {
                self.view = LyricsView::Loading;
                self.pending = Some(LyricsRequest {
                    id: self.latest_id,
                    artist: artist.clone(),
                    title: title.clone(),
                });
            }
            _ => self.view = LyricsView::Unavailable(INVALID_SONG),
        }
    }

    pub fn take_request(&mut self) -> Option<LyricsRequest> {
        self.pending.take()
    }

    /// Apply a worker result. Returns `false` when it was stale and ignored.
    pub fn accept(&mut self, result: LyricsResult) -> bool {
        if result.id != self.latest_id {
            debug!(id = result.id, latest = self.latest_id, "dropping stale lyrics");
            return false;
        }
        self.view = match result.outcome {
            Ok(text) if text.trim().is_empty() => LyricsView::Unavailable(NO_LYRICS),
            Ok(text) => LyricsView::Loaded(text),
            Err(e) => {
                debug!(error = %e, "lyrics lookup failed");
                LyricsView::Unavailable(LOOKUP_FAILED)
            }
        };
        true
    }
}

#[derive(Deserialize)]
struct LyricsBody {
    #[serde(default)]
    lyrics: Option<String>,
}

/// Blocking HTTP client for a lyrics.ovh style service.
#[derive(Debug, Clone)]
pub struct LyricsClient {
    http: reqwest::blocking::Client,
    endpoint: reqwest::Url,
}

impl LyricsClient {
    pub fn new(settings: &LyricsSettings) -> Result<Self, LyricsError> {
        let endpoint = reqwest::Url::parse(&settings.endpoint)
            .map_err(|_| LyricsError::Endpoint(settings.endpoint.clone()))?;
        if endpoint.cannot_be_a_base() {
            return Err(LyricsError::Endpoint(settings.endpoint.clone()));
        }
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("tunebox/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;
        Ok(Self { http, endpoint })
    }

    /// `{endpoint}/{artist}/{title}`, with both parts percent-encoded.
    pub fn url_for(&self, artist: &str, title: &str) -> reqwest::Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(artist).push(title);
        }
        url
    }

    /// Fetch lyrics; an answer without a `lyrics` field is an empty string.
    pub fn fetch(&self, artist: &str, title: &str) -> Result<String, LyricsError> {
        let url = self.url_for(artist, title);
        debug!(%url, "fetching lyrics");
        let response = self.http.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LyricsError::Status(status));
        }
        let body: LyricsBody = response.json()?;
        Ok(body.lyrics.unwrap_or_default())
    }

    pub fn answer(&self, request: &LyricsRequest) -> LyricsResult {
        LyricsResult {
            id: request.id,
            outcome: self.fetch(&request.artist, &request.title),
        }
    }
}
