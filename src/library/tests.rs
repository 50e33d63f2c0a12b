use super::derive::{derive, display_name, is_audio_extension, strip_audio_extension};
use super::*;
use std::path::PathBuf;

#[test]
fn derive_splits_artist_and_title() {
    assert_eq!(
        derive("Artist - Title.mp3", &[]),
        (Some("Artist".to_string()), Some("Title".to_string()))
    );
    assert_eq!(
        derive("  Spaced  -  Out  .ogg", &[]),
        (Some("Spaced".to_string()), Some("Out".to_string()))
    );
}

#[test]
fn derive_without_separator_yields_nothing() {
    assert_eq!(derive("NoSeparator.mp3", &[]), (None, None));
    assert_eq!(derive("Dash-Without-Spaces.mp3", &[]), (None, None));
    assert_eq!(derive(" - Title.mp3", &[]), (None, None));
}

#[test]
fn derive_keeps_extra_separators_in_title() {
    assert_eq!(
        derive("Band - Song - Live.wav", &[]),
        (Some("Band".to_string()), Some("Song - Live".to_string()))
    );
}

#[test]
fn derive_only_strips_known_audio_extensions() {
    assert_eq!(strip_audio_extension("a.MP3", &[]), "a");
    assert_eq!(strip_audio_extension("a.flac", &[]), "a");
    assert_eq!(strip_audio_extension("a.txt", &[]), "a.txt");
    assert_eq!(strip_audio_extension(".mp3", &[]), ".mp3");
    assert_eq!(
        derive("Artist - Ver. 2.txt", &[]),
        (Some("Artist".to_string()), Some("Ver. 2.txt".to_string()))
    );
}

#[test]
fn track_display_falls_back_to_stripped_name() {
    let t = Track::from_path(PathBuf::from("/music/NoSeparator.mp3"));
    assert_eq!(t.artist, None);
    assert_eq!(t.title, None);
    assert_eq!(t.display, "NoSeparator");

    let t = Track::from_path(PathBuf::from("/music/Artist - Title.mp3"));
    assert_eq!(t.display, "Artist - Title");
    assert_eq!(t.file_name, "Artist - Title.mp3");
}

#[test]
fn track_accepts_backslash_separated_sources() {
    let t = Track::from_path(PathBuf::from(r"C:\Music\Band - Tune.ogg"));
    assert_eq!(t.file_name, "Band - Tune.ogg");
    assert_eq!(t.artist.as_deref(), Some("Band"));
}

#[test]
fn display_name_prefers_artist_dash_title() {
    assert_eq!(display_name("x.mp3", Some("A"), Some("B"), &[]), "A - B");
    assert_eq!(display_name("x.mp3", Some("A"), None, &[]), "x");
    assert!(is_audio_extension("OGG"));
}

#[test]
fn configured_extensions_are_stripped_from_names() {
    let extra = vec![".m4a".to_string()];
    assert_eq!(strip_audio_extension("a.M4A", &extra), "a");
    assert_eq!(strip_audio_extension("a.m4a", &[]), "a.m4a");
    assert_eq!(
        derive("Artist - Title.m4a", &extra),
        (Some("Artist".to_string()), Some("Title".to_string()))
    );
    assert_eq!(display_name("plain.m4a", None, None, &extra), "plain");
}
