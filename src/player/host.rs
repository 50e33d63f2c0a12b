/// Title and artist announced when the track changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub title: String,
    pub artist: String,
}

/// Transport state published to the desktop (media keys, "now playing" widgets).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MediaState {
    Playing,
    Paused,
    Stopped,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WindowAction {
    Close,
    Minimize,
    Maximize,
    Shrink,
}

/// Outbound capabilities of the hosting desktop session.
///
/// Every call is best effort: implementations log failures and move on.
pub trait HostBridge {
    /// Announce the display name of the newly loaded song.
    fn notify_song(&mut self, title: &str);
    /// Announce a newly loaded song with separate title and artist.
    fn track_changed(&mut self, track: &TrackInfo);
    /// Publish the transport state.
    fn control_media(&mut self, state: MediaState);
    /// Ask the host to act on the window.
    fn control_window(&mut self, action: WindowAction);
}
