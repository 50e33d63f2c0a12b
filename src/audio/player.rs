use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::config::AudioSettings;
use crate::player::MediaEngine;

use super::graph::AudioGraph;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, AudioEvent, PlaybackHandle, PlaybackInfo};

/// Handle to the audio thread; the production [`MediaEngine`].
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
    // Commands sent through the engine interface, and the play/pause state
    // they asked for. Used until the audio thread has caught up.
    sent: u64,
    requested_paused: bool,
}

impl AudioPlayer {
    pub fn new(graph: AudioGraph, events: Sender<AudioEvent>, audio_settings: &AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let audio_handle = spawn_audio_thread(
            graph,
            rx,
            events,
            playback_info.clone(),
            audio_settings.initial_volume,
        );

        Self {
            tx,
            playback: playback_info,
            join: Mutex::new(Some(audio_handle)),
            sent: 0,
            requested_paused: true,
        }
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    fn send_logged(&mut self, cmd: AudioCmd) {
        match self.send(cmd) {
            Ok(()) => self.sent += 1,
            Err(e) => warn!(command = ?e.0, "audio thread is gone"),
        }
    }

    fn info(&self) -> PlaybackInfo {
        self.playback
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default()
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl MediaEngine for AudioPlayer {
    fn set_source(&mut self, path: &Path) {
        self.requested_paused = true;
        self.send_logged(AudioCmd::SetSource(path.to_path_buf()));
    }

    fn play(&mut self) {
        self.requested_paused = false;
        self.send_logged(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.requested_paused = true;
        self.send_logged(AudioCmd::Pause);
    }

    fn rewind(&mut self) {
        self.send_logged(AudioCmd::Rewind);
    }

    fn seek(&mut self, position: Duration) {
        self.send_logged(AudioCmd::SeekTo(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send_logged(AudioCmd::SetVolume(volume));
    }

    fn position(&self) -> Duration {
        self.info().position
    }

    fn duration(&self) -> Option<Duration> {
        self.info().duration
    }

    fn is_paused(&self) -> bool {
        let info = self.info();
        if info.acked < self.sent {
            self.requested_paused
        } else {
            info.paused
        }
    }
}
