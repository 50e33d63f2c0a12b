//! The single persisted preference: the colour theme.
//!
//! Stored as `theme = "dark"` in `prefs.toml` under the state directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const PREFS_FILE: &str = "prefs.toml";

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse preferences: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Prefs {
    #[serde(default)]
    theme: Theme,
}

/// Reads and writes the preference file. Without a path nothing persists.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: Option<PathBuf>,
}

impl ThemeStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// `prefs.toml` inside `dir`.
    pub fn in_dir(dir: Option<&Path>) -> Self {
        Self::new(dir.map(|d| d.join(PREFS_FILE)))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// A missing file is the default theme; other failures are errors.
    pub fn try_load(&self) -> Result<Theme, PrefsError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(Theme::default());
        };
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Theme::default()),
            Err(source) => {
                return Err(PrefsError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let prefs: Prefs = toml::from_str(&text)?;
        Ok(prefs.theme)
    }

    pub fn load(&self) -> Theme {
        self.try_load().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring unreadable preferences");
            Theme::default()
        })
    }

    pub fn save(&self, theme: Theme) -> Result<(), PrefsError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let text = toml::to_string(&Prefs { theme })?;
        let write = |p: &Path| -> std::io::Result<()> {
            if let Some(parent) = p.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(p, &text)
        };
        write(path).map_err(|source| PrefsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?theme, path = %path.display(), "theme saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_dark() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::in_dir(Some(dir.path()));
        assert_eq!(store.try_load().unwrap(), Theme::Dark);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::in_dir(Some(&dir.path().join("nested")));
        store.save(Theme::Light).unwrap();
        assert_eq!(store.load(), Theme::Light);

        let text = fs::read_to_string(store.path().unwrap()).unwrap();
        assert_eq!(text.trim(), r#"theme = "light""#);
    }

    #[test]
    fn garbage_is_an_error_but_load_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PREFS_FILE);
        fs::write(&path, "theme = 42").unwrap();
        let store = ThemeStore::new(Some(path));
        assert!(matches!(store.try_load(), Err(PrefsError::Parse(_))));
        assert_eq!(store.load(), Theme::Dark);
    }

    #[test]
    fn no_path_never_persists() {
        let store = ThemeStore::new(None);
        store.save(Theme::Light).unwrap();
        assert_eq!(store.load(), Theme::Dark);
    }

    #[test]
    fn toggle_flips() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
