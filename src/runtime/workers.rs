//! Short-lived background jobs that post their result back to the event loop.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::debug;

use crate::bridge::HostEvent;
use crate::config::LibrarySettings;
use crate::library;
use crate::lyrics::{LyricsClient, LyricsRequest, LyricsResult};

/// Scan `dir` (probing durations) and report it as a folder selection.
pub fn spawn_folder_scan(dir: PathBuf, settings: LibrarySettings, tx: Sender<HostEvent>) {
    thread::spawn(move || {
        let tracks = library::scan(&dir, &settings);
        debug!(dir = %dir.display(), tracks = tracks.len(), "folder scanned");
        let _ = tx.send(HostEvent::FolderSelected { dir, tracks });
    });
}

pub fn spawn_lyrics_lookup(client: LyricsClient, request: LyricsRequest, tx: Sender<LyricsResult>) {
    thread::spawn(move || {
        let _ = tx.send(client.answer(&request));
    });
}
