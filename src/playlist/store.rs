use std::ops::Index;

use tracing::debug;

use crate::library::Track;

/// Ordered sequence of tracks.
///
/// Mutated only by wholesale [`Playlist::load`] and single-element
/// [`Playlist::move_track`].
#[derive(Clone, Debug, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Build a playlist, preserving input order.
    ///
    /// Plain paths are turned into tracks here, which derives their display
    /// metadata from the file name.
    pub fn load<I, T>(tracks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Track>,
    {
        let tracks: Vec<Track> = tracks.into_iter().map(Into::into).collect();
        debug!(count = tracks.len(), "playlist loaded");
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    /// Relocate the track at `from` so it ends up at `to`.
    ///
    /// Returns false (and changes nothing) when `from == to` or either index
    /// is out of bounds.
    pub fn move_track(&mut self, from: usize, to: usize) -> bool {
        let len = self.tracks.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);
        true
    }
}

impl Index<usize> for Playlist {
    type Output = Track;

    fn index(&self, index: usize) -> &Track {
        &self.tracks[index]
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

/// Where `current` ends up after the element at `from` moved to `to`, so that
/// it keeps pointing at the same logical track.
pub fn shift_index(current: usize, from: usize, to: usize) -> usize {
    if from == current {
        to
    } else if from < current && to >= current {
        current - 1
    } else if from > current && to <= current {
        current + 1
    } else {
        current
    }
}
