use std::path::PathBuf;
use std::sync::mpsc::Sender;

use tracing::info;

use crate::bridge::HostEvent;
use crate::config;

use super::cli::Cli;
use super::workers::spawn_folder_scan;

/// The folder to load first: the CLI argument, else `library.music_dir`.
pub fn initial_dir(cli: &Cli, settings: &config::Settings) -> PathBuf {
    cli.music_dir
        .clone()
        .unwrap_or_else(|| settings.library.music_dir.clone())
}

/// Kick off the startup scan; the playlist arrives as a folder selection.
pub fn load_initial_playlist(dir: PathBuf, settings: &config::Settings, tx: Sender<HostEvent>) {
    info!(dir = %dir.display(), "scanning music folder");
    spawn_folder_scan(dir, settings.library.clone(), tx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_dir_wins_over_config() {
        let settings = config::Settings::default();
        let cli = Cli::parse_from(["tunebox", "/elsewhere"]);
        assert_eq!(initial_dir(&cli, &settings), PathBuf::from("/elsewhere"));

        let cli = Cli::parse_from(["tunebox"]);
        assert_eq!(initial_dir(&cli, &settings), PathBuf::from("music"));
    }

    #[test]
    fn startup_scan_reports_tracks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A - One.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        load_initial_playlist(dir.path().to_path_buf(), &config::Settings::default(), tx);
        let event = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        let HostEvent::FolderSelected { dir: got, tracks } = event else {
            panic!("expected a folder selection, got {event:?}");
        };
        assert_eq!(got, dir.path());
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].display, "A - One");
    }
}
