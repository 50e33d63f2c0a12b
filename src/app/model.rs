//! Application model types: `App`, `InputMode` and `LayoutMode`.

use std::path::PathBuf;

use crate::audio::Band;
use crate::config::UiSettings;
use crate::prefs::Theme;

/// What keystrokes currently mean.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a folder path to load.
    FolderPrompt,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    /// Playlist, transport, equalizer, visualizer and lyrics.
    Full,
    /// Transport and equalizer only.
    Compact,
}

/// The main UI model.
pub struct App {
    pub selected: usize,
    pub follow_playback: bool,

    pub mode: InputMode,
    pub folder_input: String,

    pub theme: Theme,
    pub layout: LayoutMode,
    // Layout to restore when "maximize" is toggled back off.
    saved_layout: Option<LayoutMode>,

    pub eq_focus: Band,
    pub show_lyrics: bool,
    pub current_dir: Option<String>,
    pub status: Option<String>,
}

impl App {
    pub fn new(theme: Theme, ui: &UiSettings) -> Self {
        Self {
            selected: 0,
            follow_playback: ui.follow_playback,
            mode: InputMode::Normal,
            folder_input: String::new(),
            theme,
            layout: if ui.compact {
                LayoutMode::Compact
            } else {
                LayoutMode::Full
            },
            saved_layout: None,
            eq_focus: Band::Bass,
            show_lyrics: true,
            current_dir: None,
            status: None,
        }
    }

    /// Record the current directory in the app state.
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    /// Toggle whether the cursor tracks the playing song.
    pub fn toggle_follow_playback(&mut self) {
        self.follow_playback = !self.follow_playback;
    }

    /// Move the cursor onto the playing song when following playback.
    pub fn follow(&mut self, current_index: usize) {
        if self.follow_playback {
            self.selected = current_index;
        }
    }

    /// Keep the cursor inside a list of `len` entries.
    pub fn clamp_selection(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_prev(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Where the selected entry would move one step up or down, if it can.
    /// The cursor moves with it once the move is applied.
    pub fn selection_move(&mut self, down: bool, len: usize) -> Option<(usize, usize)> {
        let from = self.selected;
        if from >= len {
            return None;
        }
        let to = if down {
            (from + 1 < len).then_some(from + 1)?
        } else {
            from.checked_sub(1)?
        };
        self.selected = to;
        Some((from, to))
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Switch to the compact layout, or restore whatever was there before.
    pub fn toggle_maximize(&mut self) {
        match self.saved_layout.take() {
            Some(previous) => self.layout = previous,
            None => {
                self.saved_layout = Some(self.layout);
                self.layout = LayoutMode::Compact;
            }
        }
    }

    pub fn is_maximized(&self) -> bool {
        self.saved_layout.is_some()
    }

    pub fn toggle_lyrics(&mut self) {
        self.show_lyrics = !self.show_lyrics;
    }

    pub fn focus_next_band(&mut self) {
        self.eq_focus = match self.eq_focus {
            Band::Bass => Band::Mid,
            Band::Mid => Band::Treble,
            Band::Treble => Band::Bass,
        };
    }

    pub fn focus_prev_band(&mut self) {
        self.eq_focus = match self.eq_focus {
            Band::Bass => Band::Treble,
            Band::Mid => Band::Bass,
            Band::Treble => Band::Mid,
        };
    }

    /// Open the folder prompt, pre-filled with the current directory.
    pub fn open_folder_prompt(&mut self) {
        self.mode = InputMode::FolderPrompt;
        self.folder_input = self.current_dir.clone().unwrap_or_default();
        self.status = None;
    }

    pub fn push_prompt_char(&mut self, c: char) {
        self.folder_input.push(c);
    }

    pub fn pop_prompt_char(&mut self) {
        self.folder_input.pop();
    }

    pub fn cancel_prompt(&mut self) {
        self.mode = InputMode::Normal;
        self.folder_input.clear();
    }

    /// Close the prompt; a blank entry counts as cancelled.
    pub fn submit_prompt(&mut self) -> Option<PathBuf> {
        self.mode = InputMode::Normal;
        let input = std::mem::take(&mut self.folder_input);
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// The playlist was replaced: cursor back to the top.
    pub fn playlist_replaced(&mut self, dir: Option<String>) {
        self.selected = 0;
        if let Some(dir) = dir {
            self.current_dir = Some(dir);
        }
    }
}
