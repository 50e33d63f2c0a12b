//! Key bindings for normal mode, as a single table that also feeds the
//! help footer.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::player::{Command, WindowAction};

/// What a key press asks for. Transport goes straight to the controller;
/// the rest needs UI state (cursor, focused band) to resolve.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Player(Command),
    Window(WindowAction),
    CursorDown,
    CursorUp,
    CursorTop,
    CursorBottom,
    PlaySelected,
    MoveSelected { down: bool },
    FocusNextBand,
    FocusPrevBand,
    GainUp,
    GainDown,
    OpenFolderPrompt,
    ToggleTheme,
    ToggleFollow,
    ToggleLyrics,
}

pub struct Binding {
    pub keys: &'static [KeyCode],
    pub help: &'static str,
    pub action: Action,
}

const fn bind(keys: &'static [KeyCode], help: &'static str, action: Action) -> Binding {
    Binding { keys, help, action }
}

pub const BINDINGS: &[Binding] = &[
    bind(&[KeyCode::Char('j'), KeyCode::Down], "down", Action::CursorDown),
    bind(&[KeyCode::Char('k'), KeyCode::Up], "up", Action::CursorUp),
    bind(&[KeyCode::Char('g'), KeyCode::Home], "top", Action::CursorTop),
    bind(&[KeyCode::Char('G'), KeyCode::End], "bottom", Action::CursorBottom),
    bind(&[KeyCode::Enter], "play selected", Action::PlaySelected),
    bind(
        &[KeyCode::Char(' '), KeyCode::Char('p')],
        "play/pause",
        Action::Player(Command::TogglePlay),
    ),
    bind(&[KeyCode::Char('x')], "stop", Action::Player(Command::Stop)),
    bind(
        &[KeyCode::Char('h'), KeyCode::Left],
        "prev song",
        Action::Player(Command::Prev),
    ),
    bind(
        &[KeyCode::Char('l'), KeyCode::Right],
        "next song",
        Action::Player(Command::Next),
    ),
    bind(&[KeyCode::Char('H')], "scrub back", Action::Player(Command::SeekBackward)),
    bind(&[KeyCode::Char('L')], "scrub fwd", Action::Player(Command::SeekForward)),
    bind(&[KeyCode::Char('J')], "move track down", Action::MoveSelected { down: true }),
    bind(&[KeyCode::Char('K')], "move track up", Action::MoveSelected { down: false }),
    bind(&[KeyCode::Char('s')], "shuffle", Action::Player(Command::ToggleShuffle)),
    bind(&[KeyCode::Char('r')], "repeat", Action::Player(Command::ToggleRepeat)),
    bind(
        &[KeyCode::Char('+'), KeyCode::Char('=')],
        "vol up",
        Action::Player(Command::VolumeUp),
    ),
    bind(&[KeyCode::Char('-')], "vol down", Action::Player(Command::VolumeDown)),
    bind(&[KeyCode::Char('m')], "mute", Action::Player(Command::ToggleMute)),
    bind(&[KeyCode::Tab], "next band", Action::FocusNextBand),
    bind(&[KeyCode::BackTab], "prev band", Action::FocusPrevBand),
    bind(&[KeyCode::Char(']')], "gain up", Action::GainUp),
    bind(&[KeyCode::Char('[')], "gain down", Action::GainDown),
    bind(&[KeyCode::Char('o')], "open folder", Action::OpenFolderPrompt),
    bind(&[KeyCode::Char('t')], "theme", Action::ToggleTheme),
    bind(&[KeyCode::Char('f')], "follow", Action::ToggleFollow),
    bind(&[KeyCode::Char('y')], "lyrics", Action::ToggleLyrics),
    bind(
        &[KeyCode::Char('z')],
        "compact",
        Action::Window(WindowAction::Maximize),
    ),
    bind(
        &[KeyCode::Char('n')],
        "minimize",
        Action::Window(WindowAction::Minimize),
    ),
    bind(
        &[KeyCode::Char('Z')],
        "shrink",
        Action::Window(WindowAction::Shrink),
    ),
    bind(
        &[KeyCode::Char('q'), KeyCode::Esc],
        "quit",
        Action::Window(WindowAction::Close),
    ),
];

/// Look up the normal-mode action for a key press.
pub fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Window(WindowAction::Close)),
            _ => None,
        };
    }
    BINDINGS
        .iter()
        .find(|b| b.keys.contains(&key.code))
        .map(|b| b.action)
}

fn key_label(code: &KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::BackTab => "S-tab".to_string(),
        KeyCode::Esc => "esc".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

/// `[j] down | [k] up | ...` using the first key of every binding.
pub fn help_text() -> String {
    BINDINGS
        .iter()
        .filter_map(|b| b.keys.first().map(|k| format!("[{}] {}", key_label(k), b.help)))
        .collect::<Vec<_>>()
        .join(" | ")
}
