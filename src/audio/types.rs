//! Audio-related small types and handles.
//!
//! Commands sent to the audio thread, events it reports back, and the
//! playback snapshot it shares with the UI.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the current source; the new one starts paused at 0.
    SetSource(PathBuf),
    /// Resume (or start) the current source.
    Play,
    /// Pause the current source.
    Pause,
    /// Back to the start of the current source, keeping the play/pause state.
    Rewind,
    /// Jump to an absolute position, keeping the play/pause state.
    SeekTo(Duration),
    /// Set output volume in `[0, 1]`.
    SetVolume(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Notifications from the audio thread to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// The source at `path` played to its natural end.
    Ended { path: PathBuf },
    /// The source could not be opened or decoded.
    Failed { path: PathBuf, reason: String },
}

/// Runtime playback information shared with the UI.
#[derive(Debug, Clone)]
pub struct PlaybackInfo {
    /// Position within the current source.
    pub position: Duration,
    /// Length of the current source, when the decoder knows it.
    pub duration: Option<Duration>,
    /// Whether the engine is paused (true before the first play and after the end).
    pub paused: bool,
    /// Number of commands the audio thread has handled so far.
    pub acked: u64,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            position: Duration::ZERO,
            duration: None,
            paused: true,
            acked: 0,
        }
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
