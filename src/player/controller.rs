use std::path::Path;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::audio::{AudioGraph, Band};
use crate::config::{ControlsSettings, NotificationSettings, NotificationStyle, Settings};
use crate::library::Track;
use crate::lyrics::{LyricsRequest, LyricsResult, LyricsState};
use crate::playlist::{Playlist, shift_index};
use crate::visual::RenderLoops;

use super::advance::{next_index, prev_index};
use super::command::Command;
use super::engine::MediaEngine;
use super::host::{HostBridge, MediaState, TrackInfo};

/// Transport state as the user sees it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Speaker icon level, derived from volume and mute.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VolumeIcon {
    Mute,
    Off,
    Low,
    High,
}

/// Owns the playlist and the transport, and drives the media engine, the
/// audio graph and the host bridge.
pub struct Controller<E, B> {
    engine: E,
    host: B,
    graph: AudioGraph,
    playlist: Playlist,
    current_index: usize,
    state: PlaybackState,
    source_loaded: bool,
    // The engine reported that the loaded source cannot be played.
    source_failed: bool,
    volume: f32,
    muted: bool,
    previous_volume: f32,
    shuffle: bool,
    repeat: bool,
    controls: ControlsSettings,
    notifications: NotificationSettings,
    loops: RenderLoops,
    lyrics: LyricsState,
    rng: StdRng,
}

impl<E: MediaEngine, B: HostBridge> Controller<E, B> {
    pub fn new(mut engine: E, host: B, graph: AudioGraph, settings: &Settings) -> Self {
        let volume = settings.audio.initial_volume.clamp(0.0, 1.0);
        engine.set_volume(volume);
        Self {
            engine,
            host,
            graph,
            playlist: Playlist::default(),
            current_index: 0,
            state: PlaybackState::Stopped,
            source_loaded: false,
            source_failed: false,
            volume,
            muted: false,
            previous_volume: volume,
            shuffle: settings.playback.shuffle,
            repeat: settings.playback.repeat,
            controls: settings.controls.clone(),
            notifications: settings.notifications.clone(),
            loops: RenderLoops::default(),
            lyrics: LyricsState::new(settings.lyrics.enabled),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replace the shuffle RNG, e.g. with a seeded one.
    #[cfg(test)]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn host(&self) -> &B {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut B {
        &mut self.host
    }

    pub fn graph(&self) -> &AudioGraph {
        &self.graph
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.get(self.current_index)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    #[cfg(test)]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn render_loops_mut(&mut self) -> &mut RenderLoops {
        &mut self.loops
    }

    #[cfg(test)]
    pub fn render_loops(&self) -> RenderLoops {
        self.loops
    }

    pub fn lyrics(&self) -> &LyricsState {
        &self.lyrics
    }

    pub fn take_lyrics_request(&mut self) -> Option<LyricsRequest> {
        self.lyrics.take_request()
    }

    pub fn accept_lyrics(&mut self, result: LyricsResult) -> bool {
        self.lyrics.accept(result)
    }

    pub fn position(&self) -> Duration {
        if self.source_loaded {
            self.engine.position()
        } else {
            Duration::ZERO
        }
    }

    /// Engine-reported length, falling back to the probed length of the track.
    pub fn duration(&self) -> Option<Duration> {
        if !self.source_loaded {
            return None;
        }
        self.engine
            .duration()
            .or_else(|| self.current_track().and_then(|t| t.duration))
    }

    /// Load the track at `index` without starting it.
    pub fn load(&mut self, index: usize) {
        let Some(track) = self.playlist.get(index) else {
            return;
        };
        info!(index, track = %track.display, "loading track");
        self.current_index = index;
        self.engine.set_source(&track.path);
        self.source_loaded = true;
        self.source_failed = false;
        self.state = PlaybackState::Stopped;

        let track = track.clone();
        self.announce(&track);
        self.lyrics.begin(&track);
    }

    fn announce(&mut self, track: &Track) {
        if !self.notifications.enabled {
            return;
        }
        match (self.notifications.style, &track.artist, &track.title) {
            (NotificationStyle::Rich, Some(artist), Some(title)) => {
                self.host.track_changed(&TrackInfo {
                    title: title.clone(),
                    artist: artist.clone(),
                });
            }
            _ => self.host.notify_song(&track.display),
        }
    }

    pub fn play(&mut self) {
        if self.playlist.is_empty() || self.state == PlaybackState::Playing {
            return;
        }
        if !self.source_loaded {
            self.load(self.current_index);
        }
        if self.source_failed {
            debug!(index = self.current_index, "current source failed, not playing");
            return;
        }
        self.engine.play();
        self.state = PlaybackState::Playing;
        self.loops.start_all();
        self.host.control_media(MediaState::Playing);
    }

    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.engine.pause();
        self.state = PlaybackState::Paused;
        self.host.control_media(MediaState::Paused);
    }

    /// Pause and rewind. The spectrum loop is left to notice the pause itself.
    pub fn stop(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        self.engine.pause();
        if self.source_loaded {
            self.engine.rewind();
        }
        self.state = PlaybackState::Stopped;
        self.loops.equalizer.halt();
        self.host.control_media(MediaState::Stopped);
    }

    pub fn toggle_play(&mut self) {
        if self.state == PlaybackState::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn next(&mut self) {
        let len = self.playlist.len();
        match next_index(self.current_index, len, self.shuffle, self.repeat, &mut self.rng) {
            Some(index) => {
                self.load(index);
                self.play();
            }
            None if len > 0 => {
                debug!("end of playlist");
                self.stop();
            }
            None => {}
        }
    }

    pub fn prev(&mut self) {
        if let Some(index) = prev_index(self.current_index, self.playlist.len()) {
            self.load(index);
            self.play();
        }
    }

    pub fn play_at(&mut self, index: usize) {
        if index < self.playlist.len() {
            self.load(index);
            self.play();
        }
    }

    /// The engine reached the end of `path`. Ignored unless `path` is still
    /// the current track, since a next/prev may already have replaced it.
    pub fn on_track_ended(&mut self, path: &Path) {
        if !self.is_current(path) {
            debug!(path = %path.display(), "ignoring end of a replaced source");
            return;
        }
        if self.repeat {
            self.engine.seek(Duration::ZERO);
            self.engine.play();
            self.state = PlaybackState::Playing;
            self.loops.start_all();
            self.host.control_media(MediaState::Playing);
        } else if self.shuffle || self.current_index + 1 < self.playlist.len() {
            self.next();
        } else {
            self.stop();
        }
    }

    /// The engine could not open `path`. Returns `false` when `path` is no
    /// longer the current track and the report was ignored.
    pub fn on_source_failed(&mut self, path: &Path, reason: &str) -> bool {
        if !self.is_current(path) {
            debug!(path = %path.display(), "ignoring failure of a replaced source");
            return false;
        }
        warn!(index = self.current_index, reason, "playback failed");
        self.source_failed = true;
        if self.state != PlaybackState::Stopped {
            self.host.control_media(MediaState::Stopped);
        }
        self.state = PlaybackState::Stopped;
        self.loops.equalizer.halt();
        true
    }

    fn is_current(&self, path: &Path) -> bool {
        self.source_loaded && self.current_track().is_some_and(|t| t.path == path)
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
    }

    pub fn toggle_repeat(&mut self) {
        self.repeat = !self.repeat;
    }

    /// Clamp to `[0, 1]`; any explicit volume clears mute.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.volume = volume;
        self.muted = false;
        self.engine.set_volume(volume);
    }

    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.muted = false;
            self.volume = self.previous_volume;
        } else {
            self.previous_volume = self.volume;
            self.muted = true;
            self.volume = 0.0;
        }
        self.engine.set_volume(self.volume);
    }

    pub fn volume_icon(&self) -> VolumeIcon {
        if self.muted {
            VolumeIcon::Mute
        } else if self.volume == 0.0 {
            VolumeIcon::Off
        } else if self.volume < 0.5 {
            VolumeIcon::Low
        } else {
            VolumeIcon::High
        }
    }

    pub fn seek_to(&mut self, position: Duration) {
        if !self.source_loaded {
            return;
        }
        let position = match self.duration() {
            Some(d) => position.min(d),
            None => position,
        };
        self.engine.seek(position);
    }

    /// Seek relative to the current position by `delta_secs` (negative = back).
    pub fn seek_by(&mut self, delta_secs: f64) {
        let current = self.position().as_secs_f64();
        let target = (current + delta_secs).max(0.0);
        self.seek_to(Duration::from_secs_f64(target));
    }

    /// Returns the gain actually stored after clamping.
    pub fn set_gain(&mut self, band: Band, gain_db: f32) -> f32 {
        self.graph.set_gain(band, gain_db)
    }

    pub fn adjust_gain(&mut self, band: Band, delta_db: f32) -> f32 {
        let current = self.graph.gain(band);
        self.set_gain(band, current + delta_db)
    }

    pub fn gain(&self, band: Band) -> f32 {
        self.graph.gain(band)
    }

    /// Swap in a new playlist and load its first track. An empty input
    /// leaves everything as it was and returns `false`.
    pub fn replace_playlist<I, T>(&mut self, tracks: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<Track>,
    {
        let playlist = Playlist::load(tracks);
        if playlist.is_empty() {
            debug!("empty folder selection, keeping playlist");
            return false;
        }
        if self.source_loaded {
            self.engine.pause();
            self.engine.rewind();
        }
        info!(tracks = playlist.len(), "playlist replaced");
        self.playlist = playlist;
        self.current_index = 0;
        self.source_loaded = false;
        if self.state != PlaybackState::Stopped {
            self.host.control_media(MediaState::Stopped);
        }
        self.state = PlaybackState::Stopped;
        self.loops.equalizer.halt();
        self.load(0);
        true
    }

    /// Move one track and keep `current_index` on the same logical track.
    pub fn move_track(&mut self, from: usize, to: usize) -> bool {
        if !self.playlist.move_track(from, to) {
            return false;
        }
        self.current_index = shift_index(self.current_index, from, to);
        true
    }

    pub fn dispatch(&mut self, command: Command) {
        debug!(?command, "dispatch");
        match command {
            Command::TogglePlay => self.toggle_play(),
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::Stop => self.stop(),
            Command::Next => self.next(),
            Command::Prev => self.prev(),
            Command::PlayAt(index) => self.play_at(index),
            Command::ToggleShuffle => self.toggle_shuffle(),
            Command::ToggleRepeat => self.toggle_repeat(),
            Command::VolumeUp => self.set_volume(self.volume + self.controls.volume_step),
            Command::VolumeDown => self.set_volume(self.volume - self.controls.volume_step),
            Command::ToggleMute => self.toggle_mute(),
            Command::SeekForward => self.seek_by(self.controls.scrub_seconds as f64),
            Command::SeekBackward => self.seek_by(-(self.controls.scrub_seconds as f64)),
            Command::GainUp(band) => {
                self.adjust_gain(band, self.controls.eq_step_db);
            }
            Command::GainDown(band) => {
                self.adjust_gain(band, -self.controls.eq_step_db);
            }
            Command::MoveTrack { from, to } => {
                self.move_track(from, to);
            }
        }
    }
}
