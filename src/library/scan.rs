use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// List the audio files reachable from `root`.
///
/// A file path yields itself (if it is audio); a directory is walked per
/// `settings`. Results are ordered by file name, case-insensitively. A
/// missing path yields an empty list.
pub fn collect_paths(root: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    if root.is_file() {
        return if is_audio_file(root, settings) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }
    if !root.is_dir() {
        warn!(path = %root.display(), "library path does not exist");
        return Vec::new();
    }

    let mut walker = WalkDir::new(root).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut paths: Vec<PathBuf> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && (settings.include_hidden || !is_hidden(path))
                && is_audio_file(path, settings)
        })
        .collect();

    paths.sort_by_cached_key(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    debug!(root = %root.display(), count = paths.len(), "collected audio files");
    paths
}

/// Scan `root` and build probed tracks in file-name order.
pub fn scan(root: &Path, settings: &LibrarySettings) -> Vec<Track> {
    collect_paths(root, settings)
        .into_iter()
        .map(|path| Track::probe(path, &settings.extensions))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.wav"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn scan_filters_non_audio_and_sorts_by_file_name() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b - Second.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A - First.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let tracks = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].display, "A - First");
        assert_eq!(tracks[1].display, "b - Second");
        assert_eq!(tracks[1].duration, None);
    }

    #[test]
    fn scan_skips_subdirectories_unless_recursive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let flat = collect_paths(dir.path(), &LibrarySettings::default());
        assert_eq!(flat, vec![dir.path().join("root.mp3")]);

        let settings = LibrarySettings {
            recursive: true,
            ..LibrarySettings::default()
        };
        assert_eq!(collect_paths(dir.path(), &settings).len(), 2);
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].display, "visible");
    }

    #[test]
    fn scan_respects_max_depth() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = d1.join("d2");
        fs::create_dir_all(&d2).unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        fs::write(d1.join("one.mp3"), b"not real").unwrap();
        fs::write(d2.join("two.mp3"), b"not real").unwrap();

        // WalkDir depth counts root as 0, children as 1, grandchildren as 2.
        let settings = LibrarySettings {
            recursive: true,
            max_depth: Some(2),
            ..LibrarySettings::default()
        };
        let names: Vec<String> = scan(dir.path(), &settings)
            .into_iter()
            .map(|t| t.display)
            .collect();
        assert!(names.contains(&"root".to_string()));
        assert!(names.contains(&"one".to_string()));
        assert!(!names.contains(&"two".to_string()));
    }

    #[test]
    fn scan_strips_configured_extensions_from_display() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Band - Tune.m4a"), b"not real").unwrap();
        fs::write(dir.path().join("plain.m4a"), b"not real").unwrap();

        let settings = LibrarySettings {
            extensions: vec!["m4a".to_string()],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].display, "Band - Tune");
        assert_eq!(tracks[0].title.as_deref(), Some("Tune"));
        assert_eq!(tracks[1].display, "plain");
    }

    #[test]
    fn single_file_and_missing_paths() {
        let dir = tempdir().unwrap();
        let song = dir.path().join("Solo - Song.wav");
        fs::write(&song, b"not real").unwrap();
        let settings = LibrarySettings::default();

        assert_eq!(collect_paths(&song, &settings), vec![song.clone()]);
        assert!(collect_paths(&dir.path().join("nope"), &settings).is_empty());
    }
}
