use super::advance::{next_index, prev_index};
use super::*;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::audio::{AudioGraph, Band};
use crate::config::{NotificationStyle, Settings};
use crate::lyrics::{LyricsResult, LyricsView};

#[derive(Debug, Clone, PartialEq)]
enum EngineCall {
    SetSource(PathBuf),
    Play,
    Pause,
    Rewind,
    Seek(Duration),
    Volume(f32),
}

#[derive(Default)]
struct FakeEngine {
    calls: Vec<EngineCall>,
    position: Duration,
    duration: Option<Duration>,
    paused: bool,
}

impl FakeEngine {
    fn last_source(&self) -> Option<&Path> {
        self.calls.iter().rev().find_map(|c| match c {
            EngineCall::SetSource(p) => Some(p.as_path()),
            _ => None,
        })
    }
}

impl MediaEngine for FakeEngine {
    fn set_source(&mut self, path: &Path) {
        self.calls.push(EngineCall::SetSource(path.to_path_buf()));
        self.position = Duration::ZERO;
        self.paused = true;
    }
    fn play(&mut self) {
        self.calls.push(EngineCall::Play);
        self.paused = false;
    }
    fn pause(&mut self) {
        self.calls.push(EngineCall::Pause);
        self.paused = true;
    }
    fn rewind(&mut self) {
        self.calls.push(EngineCall::Rewind);
        self.position = Duration::ZERO;
    }
    fn seek(&mut self, position: Duration) {
        self.calls.push(EngineCall::Seek(position));
        self.position = position;
    }
    fn set_volume(&mut self, volume: f32) {
        self.calls.push(EngineCall::Volume(volume));
    }
    fn position(&self) -> Duration {
        self.position
    }
    fn duration(&self) -> Option<Duration> {
        self.duration
    }
    fn is_paused(&self) -> bool {
        self.paused
    }
}

#[derive(Debug, Clone, PartialEq)]
enum HostCall {
    Song(String),
    Changed(TrackInfo),
    Media(MediaState),
    Window(WindowAction),
}

#[derive(Default)]
struct RecordingHost {
    calls: Vec<HostCall>,
}

impl RecordingHost {
    fn last_media(&self) -> Option<MediaState> {
        self.calls.iter().rev().find_map(|c| match c {
            HostCall::Media(s) => Some(*s),
            _ => None,
        })
    }
}

impl HostBridge for RecordingHost {
    fn notify_song(&mut self, title: &str) {
        self.calls.push(HostCall::Song(title.to_string()));
    }
    fn track_changed(&mut self, track: &TrackInfo) {
        self.calls.push(HostCall::Changed(track.clone()));
    }
    fn control_media(&mut self, state: MediaState) {
        self.calls.push(HostCall::Media(state));
    }
    fn control_window(&mut self, action: WindowAction) {
        self.calls.push(HostCall::Window(action));
    }
}

fn controller_with(settings: &Settings, names: &[&str]) -> Controller<FakeEngine, RecordingHost> {
    let mut c = Controller::new(
        FakeEngine::default(),
        RecordingHost::default(),
        AudioGraph::new(),
        settings,
    )
    .with_rng(StdRng::seed_from_u64(7));
    c.replace_playlist(names.iter().map(|n| PathBuf::from(format!("/music/{n}"))));
    c
}

fn controller(names: &[&str]) -> Controller<FakeEngine, RecordingHost> {
    controller_with(&Settings::default(), names)
}

fn end_current(c: &mut Controller<FakeEngine, RecordingHost>) {
    let path = c.current_track().map(|t| t.path.clone()).unwrap();
    c.on_track_ended(&path);
}

const THREE: [&str; 3] = ["A - One.mp3", "B - Two.mp3", "C - Three.mp3"];

#[test]
fn replace_loads_first_track_stopped() {
    let c = controller(&THREE);
    assert_eq!(c.playlist().len(), 3);
    assert_eq!(c.current_index(), 0);
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(
        c.engine().last_source(),
        Some(Path::new("/music/A - One.mp3"))
    );
    assert!(!c.engine().calls.contains(&EngineCall::Play));
}

#[test]
fn empty_replacement_is_no_change() {
    let mut c = controller(&THREE);
    c.play_at(1);
    assert!(!c.replace_playlist(Vec::<PathBuf>::new()));
    assert_eq!(c.playlist().len(), 3);
    assert_eq!(c.current_index(), 1);
    assert!(c.is_playing());
}

#[test]
fn transport_is_inert_on_empty_playlist() {
    let mut c = controller(&[]);
    c.play();
    c.next();
    c.prev();
    c.stop();
    c.on_track_ended(Path::new("/music/A - One.mp3"));
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert!(c.engine().calls.iter().all(|call| matches!(call, EngineCall::Volume(_))));
    assert!(c.host().calls.is_empty());
}

#[test]
fn play_pause_publish_media_state() {
    let mut c = controller(&THREE);
    c.play();
    assert!(c.is_playing());
    assert_eq!(c.host().last_media(), Some(MediaState::Playing));
    assert!(c.render_loops().equalizer.is_running());
    assert!(c.render_loops().spectrum.is_running());

    c.pause();
    assert_eq!(c.state(), PlaybackState::Paused);
    assert_eq!(c.host().last_media(), Some(MediaState::Paused));

    c.toggle_play();
    assert!(c.is_playing());
    c.toggle_play();
    assert_eq!(c.state(), PlaybackState::Paused);
}

#[test]
fn stop_rewinds_and_halts_only_the_equalizer() {
    let mut c = controller(&THREE);
    c.play();
    c.stop();
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.position(), Duration::ZERO);
    assert!(c.engine().calls.ends_with(&[EngineCall::Pause, EngineCall::Rewind]));
    assert!(!c.render_loops().equalizer.is_running());
    assert!(c.render_loops().spectrum.is_running());
    assert_eq!(c.host().last_media(), Some(MediaState::Stopped));
}

#[test]
fn next_at_end_without_repeat_stops_in_place() {
    let mut c = controller(&THREE);
    c.play_at(2);
    c.next();
    assert_eq!(c.current_index(), 2);
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn next_at_end_with_repeat_wraps() {
    let mut c = controller(&THREE);
    c.toggle_repeat();
    c.play_at(2);
    c.next();
    assert_eq!(c.current_index(), 0);
    assert!(c.is_playing());
}

#[test]
fn prev_wraps_and_ignores_shuffle() {
    let mut c = controller(&THREE);
    c.toggle_shuffle();
    c.prev();
    assert_eq!(c.current_index(), 2);
    c.prev();
    assert_eq!(c.current_index(), 1);
}

#[test]
fn shuffle_never_repeats_current() {
    let mut c = controller(&THREE);
    c.toggle_shuffle();
    for _ in 0..200 {
        let before = c.current_index();
        c.next();
        assert_ne!(c.current_index(), before);
        assert!(c.current_index() < 3);
    }
}

#[test]
fn shuffle_reaches_every_other_index() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut seen = [false; 5];
    for _ in 0..500 {
        let i = next_index(2, 5, true, false, &mut rng).unwrap();
        seen[i] = true;
    }
    assert_eq!(seen, [true, true, false, true, true]);
}

#[test]
fn advance_policy_edges() {
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(next_index(0, 0, true, true, &mut rng), None);
    assert_eq!(next_index(0, 1, true, false, &mut rng), Some(0));
    assert_eq!(next_index(0, 1, false, false, &mut rng), None);
    assert_eq!(next_index(0, 1, false, true, &mut rng), Some(0));
    assert_eq!(next_index(1, 3, false, false, &mut rng), Some(2));
    assert_eq!(prev_index(0, 3), Some(2));
    assert_eq!(prev_index(0, 0), None);
}

#[test]
fn track_end_with_repeat_replays_same_index() {
    let mut c = controller(&THREE);
    c.toggle_repeat();
    c.play_at(1);
    c.engine_mut().position = Duration::from_secs(180);
    end_current(&mut c);
    assert_eq!(c.current_index(), 1);
    assert_eq!(c.position(), Duration::ZERO);
    assert!(c.is_playing());
    assert!(
        c.engine()
            .calls
            .ends_with(&[EngineCall::Seek(Duration::ZERO), EngineCall::Play])
    );
}

#[test]
fn track_end_advances_then_stops_at_last() {
    let mut c = controller(&THREE);
    c.play_at(1);
    end_current(&mut c);
    assert_eq!(c.current_index(), 2);
    assert!(c.is_playing());
    end_current(&mut c);
    assert_eq!(c.current_index(), 2);
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn track_end_with_shuffle_advances_past_last() {
    let mut c = controller(&THREE);
    c.toggle_shuffle();
    c.play_at(2);
    end_current(&mut c);
    assert!(c.is_playing());
    assert_ne!(c.current_index(), 2);
    assert!(c.current_index() < 3);
}

#[test]
fn mute_round_trip_restores_volume() {
    let mut c = controller(&THREE);
    for v in [0.0, 0.05, 0.33, 0.5, 0.999, 1.0] {
        c.set_volume(v);
        c.toggle_mute();
        assert!(c.is_muted());
        assert_eq!(c.volume(), 0.0);
        assert_eq!(c.volume_icon(), VolumeIcon::Mute);
        c.toggle_mute();
        assert!(!c.is_muted());
        assert_eq!(c.volume(), v);
    }
}

#[test]
fn volume_is_clamped_and_clears_mute() {
    let mut c = controller(&THREE);
    c.toggle_mute();
    c.set_volume(1.7);
    assert!(!c.is_muted());
    assert_eq!(c.volume(), 1.0);
    assert_eq!(c.volume_icon(), VolumeIcon::High);
    c.set_volume(-3.0);
    assert_eq!(c.volume_icon(), VolumeIcon::Off);
    c.set_volume(0.2);
    assert_eq!(c.volume_icon(), VolumeIcon::Low);
    assert_eq!(c.engine().calls.last(), Some(&EngineCall::Volume(0.2)));
}

#[test]
fn seeking_clamps_to_track_bounds() {
    let mut c = controller(&THREE);
    c.engine_mut().duration = Some(Duration::from_secs(100));
    c.seek_to(Duration::from_secs(500));
    assert_eq!(c.position(), Duration::from_secs(100));
    c.seek_by(-30.0);
    assert_eq!(c.position(), Duration::from_secs(70));
    c.seek_by(-300.0);
    assert_eq!(c.position(), Duration::ZERO);
}

#[test]
fn gains_reach_the_graph() {
    let mut c = controller(&THREE);
    assert_eq!(c.set_gain(Band::Bass, 6.0), 6.0);
    assert_eq!(c.graph().gain(Band::Bass), 6.0);
    c.dispatch(Command::GainDown(Band::Mid));
    assert_eq!(c.gain(Band::Mid), -1.0);
    assert_eq!(c.adjust_gain(Band::Treble, 100.0), 40.0);
}

#[test]
fn moving_tracks_follows_current() {
    let mut c = controller(&["A - a.mp3", "B - b.mp3", "C - c.mp3", "D - d.mp3"]);
    c.load(2);
    assert!(c.move_track(0, 3));
    let order: Vec<_> = c.playlist().iter().map(|t| t.display.as_str()).collect();
    assert_eq!(order, ["B - b", "C - c", "D - d", "A - a"]);
    assert_eq!(c.current_index(), 1);
    assert_eq!(c.current_track().map(|t| t.display.as_str()), Some("C - c"));

    assert!(!c.move_track(1, 1));
    assert!(!c.move_track(0, 9));
    assert_eq!(c.current_index(), 1);
}

#[test]
fn simple_notifications_announce_display_name() {
    let c = controller(&THREE);
    assert!(c.host().calls.contains(&HostCall::Song("A - One".into())));
}

#[test]
fn rich_notifications_split_title_and_artist() {
    let mut settings = Settings::default();
    settings.notifications.style = NotificationStyle::Rich;
    let mut c = controller_with(&settings, &["Artist - Title.mp3", "plain.ogg"]);
    assert!(c.host().calls.contains(&HostCall::Changed(TrackInfo {
        title: "Title".into(),
        artist: "Artist".into(),
    })));
    c.load(1);
    assert_eq!(c.host().calls.last(), Some(&HostCall::Song("plain".into())));
}

#[test]
fn disabled_notifications_stay_quiet() {
    let mut settings = Settings::default();
    settings.notifications.enabled = false;
    let c = controller_with(&settings, &THREE);
    assert!(
        !c.host()
            .calls
            .iter()
            .any(|call| matches!(call, HostCall::Song(_) | HostCall::Changed(_)))
    );
}

#[test]
fn loading_requests_lyrics_for_current_track() {
    let mut c = controller(&THREE);
    let first = c.take_lyrics_request().unwrap();
    assert_eq!((first.artist.as_str(), first.title.as_str()), ("A", "One"));
    c.next();
    let second = c.take_lyrics_request().unwrap();
    assert!(!c.accept_lyrics(LyricsResult {
        id: first.id,
        outcome: Ok("stale".into()),
    }));
    assert!(c.accept_lyrics(LyricsResult {
        id: second.id,
        outcome: Ok("la la".into()),
    }));
    assert_eq!(c.lyrics().view(), &LyricsView::Loaded("la la".into()));
}

#[test]
fn dispatch_routes_commands() {
    let mut c = controller(&THREE);
    c.dispatch(Command::PlayAt(1));
    assert_eq!(c.current_index(), 1);
    c.dispatch(Command::ToggleShuffle);
    c.dispatch(Command::ToggleRepeat);
    assert!(c.shuffle() && c.repeat());
    c.dispatch(Command::VolumeDown);
    assert!((c.volume() - 0.95).abs() < 1e-6);
    c.dispatch(Command::MoveTrack { from: 1, to: 0 });
    assert_eq!(c.current_index(), 0);
    c.dispatch(Command::Stop);
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn failed_source_stops_transport() {
    let mut c = controller(&THREE);
    c.play();
    assert!(c.on_source_failed(Path::new("/music/A - One.mp3"), "unsupported format"));
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.host().last_media(), Some(MediaState::Stopped));
}

#[test]
fn failed_source_is_not_played_until_reloaded() {
    let mut c = controller(&THREE);
    c.play();
    c.on_source_failed(Path::new("/music/A - One.mp3"), "unsupported format");
    let plays = c.engine().calls.iter().filter(|call| **call == EngineCall::Play).count();

    c.play();
    c.toggle_play();
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.host().last_media(), Some(MediaState::Stopped));
    assert_eq!(
        c.engine().calls.iter().filter(|call| **call == EngineCall::Play).count(),
        plays
    );

    c.play_at(0);
    assert!(c.is_playing());
}

#[test]
fn failure_of_a_replaced_source_is_ignored() {
    let mut c = controller(&THREE);
    c.play_at(0);
    c.next();
    assert!(!c.on_source_failed(Path::new("/music/A - One.mp3"), "unsupported format"));
    assert!(c.is_playing());
    assert_eq!(c.current_index(), 1);
}

#[test]
fn end_of_a_replaced_source_does_not_advance() {
    let mut c = controller(&["A - One.mp3", "B - Two.mp3", "C - Three.mp3", "D - Four.mp3"]);
    c.play_at(0);
    c.next();
    c.on_track_ended(Path::new("/music/A - One.mp3"));
    assert_eq!(c.current_index(), 1);
    assert!(c.is_playing());
}
