//! The desktop side of the player: inbound host events and the
//! [`HostBridge`] implementation used outside of tests.

use std::path::PathBuf;
use std::sync::mpsc::Sender;

use tracing::{debug, info, warn};

use crate::library::Track;
use crate::mpris::MprisHandle;
use crate::player::{Command, HostBridge, MediaState, TrackInfo, WindowAction};

/// Media keys and transport buttons coming from the desktop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MediaControl {
    Previous,
    PlayPause,
    Play,
    Pause,
    Next,
    Stop,
}

/// Everything the host can tell the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Media(MediaControl),
    Window(WindowAction),
    /// Result of scanning a selected folder; no tracks means no change.
    FolderSelected { dir: PathBuf, tracks: Vec<Track> },
}

impl From<MediaControl> for Command {
    fn from(control: MediaControl) -> Self {
        match control {
            MediaControl::Previous => Command::Prev,
            MediaControl::PlayPause => Command::TogglePlay,
            MediaControl::Play => Command::Play,
            MediaControl::Pause => Command::Pause,
            MediaControl::Next => Command::Next,
            MediaControl::Stop => Command::Stop,
        }
    }
}

/// Desktop host: MPRIS for transport state, freedesktop notifications for
/// "now playing", and window requests looped back to the event loop.
pub struct DesktopBridge {
    mpris: MprisHandle,
    events: Sender<HostEvent>,
    notifications: bool,
}

impl DesktopBridge {
    pub fn new(mpris: MprisHandle, events: Sender<HostEvent>, notifications: bool) -> Self {
        Self {
            mpris,
            events,
            notifications,
        }
    }

    pub fn mpris(&self) -> &MprisHandle {
        &self.mpris
    }

    fn show(&self, summary: &str, body: &str) {
        if !self.notifications {
            return;
        }
        show_notification(summary, body);
    }
}

#[cfg(feature = "notify")]
fn show_notification(summary: &str, body: &str) {
    let shown = notify_rust::Notification::new()
        .appname("tunebox")
        .summary(summary)
        .body(body)
        .show();
    if let Err(e) = shown {
        warn!(error = %e, "desktop notification failed");
    }
}

#[cfg(not(feature = "notify"))]
fn show_notification(summary: &str, body: &str) {
    debug!(summary, body, "notifications not compiled in");
}

impl HostBridge for DesktopBridge {
    fn notify_song(&mut self, title: &str) {
        self.show("Now Playing", title);
    }

    fn track_changed(&mut self, track: &TrackInfo) {
        let body = format!("Now playing: {} by {}", track.title, track.artist);
        self.show("Track Changed", &body);
    }

    fn control_media(&mut self, state: MediaState) {
        debug!(?state, "publishing playback state");
        self.mpris.set_playback(state);
    }

    fn control_window(&mut self, action: WindowAction) {
        info!(?action, "window control");
        if self.events.send(HostEvent::Window(action)).is_err() {
            warn!(?action, "event loop is gone; window action dropped");
        }
    }
}
