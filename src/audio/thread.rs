use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, info, warn};

use super::graph::AudioGraph;
use super::sink::create_sink_at;
use super::types::{AudioCmd, AudioEvent, PlaybackHandle};

// How often position is published and end-of-track is checked.
const TICK: Duration = Duration::from_millis(100);

/// Everything the audio thread owns between commands.
struct Engine {
    stream: Option<OutputStream>,
    graph: AudioGraph,
    playback_info: PlaybackHandle,
    events: Sender<AudioEvent>,
    sink: Option<Sink>,
    source: Option<PathBuf>,
    duration: Option<Duration>,
    // Position the current sink was started from; the sink counts from zero.
    offset: Duration,
    paused: bool,
    ended: bool,
    volume: f32,
    acked: u64,
}

impl Engine {
    fn position(&self) -> Duration {
        let played = self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos);
        let pos = self.offset + played;
        match self.duration {
            Some(d) => pos.min(d),
            None => pos,
        }
    }

    fn publish(&self) {
        let position = self.position();
        if let Ok(mut info) = self.playback_info.lock() {
            info.position = position;
            info.duration = self.duration;
            info.paused = self.paused;
            info.acked = self.acked;
        }
    }

    /// Build a fresh sink for the current source at `start_at`.
    fn rebuild(&mut self, start_at: Duration) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.offset = start_at;
        self.ended = false;

        let Some(path) = self.source.clone() else {
            return;
        };
        let Some(stream) = self.stream.as_ref() else {
            let _ = self.events.send(AudioEvent::Failed {
                path,
                reason: "no audio output device".to_string(),
            });
            return;
        };

        self.graph.clear_taps();
        match create_sink_at(stream, &self.graph, &path, start_at) {
            Ok(prepared) => {
                prepared.sink.set_volume(self.volume);
                if !self.paused {
                    prepared.sink.play();
                }
                if prepared.duration.is_some() || start_at.is_zero() {
                    self.duration = prepared.duration;
                }
                self.sink = Some(prepared.sink);
            }
            Err(e) => {
                warn!(error = %e, "could not prepare source");
                self.paused = true;
                let _ = self.events.send(AudioEvent::Failed {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn handle(&mut self, cmd: AudioCmd) -> bool {
        match cmd {
            AudioCmd::SetSource(path) => {
                debug!(path = %path.display(), "set source");
                self.source = Some(path);
                self.duration = None;
                self.paused = true;
                self.rebuild(Duration::ZERO);
            }
            AudioCmd::Play => {
                if self.ended {
                    // Playing past the end restarts the source, like a media element.
                    self.paused = false;
                    self.rebuild(Duration::ZERO);
                } else if let Some(ref s) = self.sink {
                    s.play();
                    self.paused = false;
                }
            }
            AudioCmd::Pause => {
                if let Some(ref s) = self.sink {
                    s.pause();
                }
                self.paused = true;
            }
            AudioCmd::Rewind => {
                if self.source.is_some() {
                    self.rebuild(Duration::ZERO);
                }
            }
            AudioCmd::SeekTo(pos) => {
                // Scrubbing: rebuild the current sink and skip into the file.
                // This uses `Source::skip_duration` (works for common formats).
                if self.source.is_some() {
                    let pos = match self.duration {
                        Some(d) => pos.min(d),
                        None => pos,
                    };
                    self.rebuild(pos);
                }
            }
            AudioCmd::SetVolume(v) => {
                self.volume = v.clamp(0.0, 1.0);
                if let Some(ref s) = self.sink {
                    s.set_volume(self.volume);
                }
            }
            AudioCmd::Quit { fade_out_ms } => {
                if let Some(ref s) = self.sink {
                    if !self.paused {
                        fade_out_sink(s, self.volume, fade_out_ms);
                    }
                    s.stop();
                }
                self.paused = true;
                return false;
            }
        }
        true
    }

    fn tick(&mut self) {
        let finished = matches!(self.sink, Some(ref s) if !self.paused && s.empty());
        if finished && !self.ended {
            self.ended = true;
            self.paused = true;
            if let Some(d) = self.duration {
                self.offset = d;
            }
            if let Some(path) = self.source.clone() {
                let _ = self.events.send(AudioEvent::Ended { path });
            }
        }
    }
}

fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

pub(super) fn spawn_audio_thread(
    graph: AudioGraph,
    rx: Receiver<AudioCmd>,
    events: Sender<AudioEvent>,
    playback_info: PlaybackHandle,
    initial_volume: f32,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped, which would
                // scribble over the TUI.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                error!(error = %e, "no audio output device; playback disabled");
                None
            }
        };

        let mut engine = Engine {
            stream,
            graph,
            playback_info,
            events,
            sink: None,
            source: None,
            duration: None,
            offset: Duration::ZERO,
            paused: true,
            ended: false,
            volume: initial_volume.clamp(0.0, 1.0),
            acked: 0,
        };

        loop {
            match rx.recv_timeout(TICK) {
                Ok(cmd) => {
                    let keep_running = engine.handle(cmd);
                    engine.acked += 1;
                    if !keep_running {
                        engine.publish();
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => engine.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
            engine.publish();
        }
        info!("audio thread stopped");
    })
}
