use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::{App, InputMode};
use crate::audio::AudioEvent;
use crate::bridge::HostEvent;
use crate::config;
use crate::keymap::{self, Action};
use crate::lyrics::{LyricsClient, LyricsResult};
use crate::player::{Command, HostBridge, MediaEngine, PlaybackState, WindowAction};
use crate::prefs::ThemeStore;
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;
use crate::visual::Visualizer;

use super::PlayerController;
use super::workers::{spawn_folder_scan, spawn_lyrics_lookup};

// Roughly 30 frames per second.
const FRAME: Duration = Duration::from_millis(33);

/// Channels feeding the loop, plus the senders handed to worker threads.
pub struct Inbox {
    pub audio_rx: Receiver<AudioEvent>,
    pub host_tx: Sender<HostEvent>,
    pub host_rx: Receiver<HostEvent>,
    pub lyrics_tx: Sender<LyricsResult>,
    pub lyrics_rx: Receiver<LyricsResult>,
}

/// Long-lived collaborators the loop reads from.
pub struct Services<'a> {
    pub settings: &'a config::Settings,
    pub theme_store: &'a ThemeStore,
    pub lyrics_client: Option<LyricsClient>,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Last-known playing index as emitted to MPRIS.
    last_mpris_index: Option<usize>,
    /// Last-known playback state as emitted to MPRIS.
    last_mpris_playback: PlaybackState,
}

/// Main terminal event loop: drains inbound events, advances the visuals,
/// draws, and handles one key press per frame. Returns `Ok(())` on quit.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    services: &Services<'_>,
    app: &mut App,
    controller: &mut PlayerController,
    visualizer: &mut Visualizer,
    inbox: &Inbox,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(ev) = inbox.audio_rx.try_recv() {
            handle_audio_event(ev, app, controller);
        }

        while let Ok(result) = inbox.lyrics_rx.try_recv() {
            controller.accept_lyrics(result);
        }

        while let Ok(ev) = inbox.host_rx.try_recv() {
            if handle_host_event(ev, app, controller) == Flow::Quit {
                return Ok(());
            }
        }

        if let Some(request) = controller.take_lyrics_request() {
            if let Some(client) = services.lyrics_client.clone() {
                spawn_lyrics_lookup(client, request, inbox.lyrics_tx.clone());
            }
        }

        let engine_paused = controller.engine().is_paused();
        visualizer.frame(controller.render_loops_mut(), engine_paused);

        app.clamp_selection(controller.playlist().len());
        if controller.is_playing() {
            app.follow(controller.current_index());
        }

        // Keep MPRIS in sync even when playback changes come from media keys or auto-advance.
        let index = controller.current_track().map(|_| controller.current_index());
        if index != state.last_mpris_index || controller.state() != state.last_mpris_playback {
            update_mpris(controller.host().mpris(), controller);
            state.last_mpris_index = index;
            state.last_mpris_playback = controller.state();
        }

        terminal.draw(|f| ui::draw(f, app, controller, visualizer, services.settings))?;

        if event::poll(FRAME)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key_event(key, services, app, controller, inbox);
            }
        }
    }
}

fn handle_audio_event(ev: AudioEvent, app: &mut App, controller: &mut PlayerController) {
    match ev {
        AudioEvent::Ended { path } => controller.on_track_ended(&path),
        AudioEvent::Failed { path, reason } => {
            if controller.on_source_failed(&path, &reason) {
                app.set_status(format!("Cannot play {}: {reason}", path.display()));
            }
        }
    }
}

fn handle_host_event(ev: HostEvent, app: &mut App, controller: &mut PlayerController) -> Flow {
    match ev {
        HostEvent::Media(control) => controller.dispatch(Command::from(control)),
        HostEvent::Window(action) => return handle_window_action(action, app),
        HostEvent::FolderSelected { dir, tracks } => {
            let shown = dir.display().to_string();
            if controller.replace_playlist(tracks) {
                app.playlist_replaced(Some(shown));
                app.status = None;
            } else {
                app.set_status(format!("No audio files in {shown}"));
            }
        }
    }
    Flow::Continue
}

fn handle_window_action(action: WindowAction, app: &mut App) -> Flow {
    match action {
        WindowAction::Close => return Flow::Quit,
        WindowAction::Maximize => app.toggle_maximize(),
        // A terminal cannot be minimized, and nothing handles shrink.
        WindowAction::Minimize | WindowAction::Shrink => {
            info!(?action, "window action has no effect in a terminal");
        }
    }
    Flow::Continue
}

fn handle_key_event(
    key: KeyEvent,
    services: &Services<'_>,
    app: &mut App,
    controller: &mut PlayerController,
    inbox: &Inbox,
) {
    if app.mode == InputMode::FolderPrompt {
        match key.code {
            KeyCode::Esc => app.cancel_prompt(),
            KeyCode::Backspace => app.pop_prompt_char(),
            KeyCode::Enter => match app.submit_prompt() {
                Some(dir) => {
                    app.set_status(format!("Scanning {}...", dir.display()));
                    spawn_folder_scan(dir, services.settings.library.clone(), inbox.host_tx.clone());
                }
                None => info!("folder selection cancelled"),
            },
            KeyCode::Char(c) if !c.is_control() => app.push_prompt_char(c),
            _ => {}
        }
        return;
    }

    let Some(action) = keymap::action_for(&key) else {
        return;
    };
    let len = controller.playlist().len();
    match action {
        Action::Player(command) => controller.dispatch(command),
        Action::Window(action) => controller.host_mut().control_window(action),
        Action::CursorDown => {
            app.follow_playback = false;
            app.select_next(len);
        }
        Action::CursorUp => {
            app.follow_playback = false;
            app.select_prev(len);
        }
        Action::CursorTop => {
            app.follow_playback = false;
            app.select_first();
        }
        Action::CursorBottom => {
            app.follow_playback = false;
            app.select_last(len);
        }
        Action::PlaySelected => {
            app.follow_playback = true;
            controller.dispatch(Command::PlayAt(app.selected));
        }
        Action::MoveSelected { down } => {
            if let Some((from, to)) = app.selection_move(down, len) {
                controller.dispatch(Command::MoveTrack { from, to });
            }
        }
        Action::FocusNextBand => app.focus_next_band(),
        Action::FocusPrevBand => app.focus_prev_band(),
        Action::GainUp => controller.dispatch(Command::GainUp(app.eq_focus)),
        Action::GainDown => controller.dispatch(Command::GainDown(app.eq_focus)),
        Action::OpenFolderPrompt => app.open_folder_prompt(),
        Action::ToggleTheme => {
            let theme = app.toggle_theme();
            if let Err(e) = services.theme_store.save(theme) {
                warn!(error = %e, "could not save theme");
            }
        }
        Action::ToggleFollow => app.toggle_follow_playback(),
        Action::ToggleLyrics => app.toggle_lyrics(),
    }
}
