use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::AudioFile;

use super::derive::{derive, display_name, file_name_of};

/// A playable entry in the playlist.
///
/// `artist`/`title` are derived from the file name and never change after
/// construction; a rebuilt playlist re-derives them.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub file_name: String,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub duration: Option<Duration>,
    pub display: String,
}

impl Track {
    /// Build a track from its source path without touching the filesystem.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::named(path.into(), &[])
    }

    /// Build a track and probe its duration from the container headers.
    /// `extensions` are the scanned extensions, also stripped from the name.
    ///
    /// Unreadable or non-audio files simply have no duration.
    pub fn probe(path: impl Into<PathBuf>, extensions: &[String]) -> Self {
        let mut track = Self::named(path.into(), extensions);
        track.duration = probe_duration(&track.path);
        track
    }

    fn named(path: PathBuf, extensions: &[String]) -> Self {
        let file_name = file_name_of(&path.to_string_lossy()).to_string();
        let (artist, title) = derive(&file_name, extensions);
        let display = display_name(&file_name, artist.as_deref(), title.as_deref(), extensions);

        Self {
            path,
            file_name,
            artist,
            title,
            duration: None,
            display,
        }
    }
}

fn probe_duration(path: &Path) -> Option<Duration> {
    let tagged = lofty::read_from_path(path).ok()?;
    let d = tagged.properties().duration();
    if d.is_zero() { None } else { Some(d) }
}

impl From<PathBuf> for Track {
    fn from(path: PathBuf) -> Self {
        Self::from_path(path)
    }
}
