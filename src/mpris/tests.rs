use super::*;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

fn make_track() -> Track {
    let mut track = Track::from_path(PathBuf::from("/tmp/music/Test Artist - Test Title.mp3"));
    track.duration = Some(Duration::from_micros(1_234_567));
    track
}

fn handle() -> (MprisHandle, Arc<Mutex<SharedState>>, mpsc::Receiver<()>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();
    let handle = MprisHandle {
        state: state.clone(),
        notify: notify_tx,
    };
    (handle, state, notify_rx)
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let (handle, state, notify_rx) = handle();

    let track = make_track();
    handle.set_track_metadata(Some(7), Some(&track));
    assert!(notify_rx.try_recv().is_ok());

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Artist".to_string()]);
        assert!(s.url.as_deref().unwrap().contains("/tmp/music/"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/7")
        );
    }

    handle.set_track_metadata(None, None);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert!(s.artist.is_empty());
        assert_eq!(s.url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn unchanged_state_is_not_announced_twice() {
    let (handle, _state, notify_rx) = handle();
    let track = make_track();

    handle.set_track_metadata(Some(1), Some(&track));
    handle.set_track_metadata(Some(1), Some(&track));
    handle.set_playback(MediaState::Playing);
    handle.set_playback(MediaState::Playing);

    assert_eq!(notify_rx.try_iter().count(), 2);
}

#[test]
fn title_falls_back_to_display_name() {
    let (handle, state, _rx) = handle();
    let track = Track::from_path("/music/plain.flac");
    handle.set_track_metadata(Some(0), Some(&track));
    let s = state.lock().unwrap();
    assert_eq!(s.title.as_deref(), Some("plain"));
    assert!(s.artist.is_empty());
}

#[test]
fn playback_status_maps_media_state() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<HostEvent>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    assert_eq!(iface.playback_status(), "Stopped");
    state.lock().unwrap().playback = MediaState::Playing;
    assert_eq!(iface.playback_status(), "Playing");
    state.lock().unwrap().playback = MediaState::Paused;
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn media_keys_become_host_events() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<HostEvent>();
    let iface = PlayerIface { tx, state };

    iface.play_pause();
    iface.next();
    iface.previous();
    iface.stop();

    let got: Vec<_> = rx.try_iter().collect();
    assert_eq!(
        got,
        vec![
            HostEvent::Media(MediaControl::PlayPause),
            HostEvent::Media(MediaControl::Next),
            HostEvent::Media(MediaControl::Previous),
            HostEvent::Media(MediaControl::Stop),
        ]
    );
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (handle, state, _rx) = handle();
    handle.set_track_metadata(Some(1), Some(&make_track()));
    let (tx, _rx) = mpsc::channel::<HostEvent>();
    let iface = PlayerIface { tx, state };

    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:url",
        "mpris:length",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}
