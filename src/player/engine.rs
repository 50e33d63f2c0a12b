use std::path::Path;
use std::time::Duration;

/// The thing that actually makes sound.
///
/// Commands are fire-and-forget; the getters report the most recent state the
/// engine published.
pub trait MediaEngine {
    /// Replace the source. The new source is loaded paused at position 0.
    fn set_source(&mut self, path: &Path);
    fn play(&mut self);
    fn pause(&mut self);
    /// Back to position 0 without changing the play/pause state.
    fn rewind(&mut self);
    fn seek(&mut self, position: Duration);
    /// Output volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);

    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    fn is_paused(&self) -> bool;
}
