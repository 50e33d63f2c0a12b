use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::{AudioEvent, AudioGraph, AudioPlayer};
use crate::bridge::{DesktopBridge, HostEvent};
use crate::config;
use crate::lyrics::{LyricsClient, LyricsResult};
use crate::player::Controller;
use crate::prefs::ThemeStore;
use crate::visual::Visualizer;

mod cli;
mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;
mod workers;

pub use cli::Cli;

/// The controller as wired up for a real session.
pub type PlayerController = Controller<AudioPlayer, DesktopBridge>;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let state_dir = config::state_dir();
    let log_dir = cli.log_dir.clone().or_else(|| state_dir.clone());
    let _log_guard = match log_dir {
        Some(ref dir) => Some(logging::init_logging(dir)?),
        None => None,
    };
    info!(version = env!("CARGO_PKG_VERSION"), "tunebox starting");

    let settings = settings::load_settings();
    let theme_store = ThemeStore::in_dir(state_dir.as_deref());
    let mut app = App::new(theme_store.load(), &settings.ui);

    let lyrics_client = if settings.lyrics.enabled {
        LyricsClient::new(&settings.lyrics)
            .map_err(|e| warn!(error = %e, "lyrics disabled"))
            .ok()
    } else {
        None
    };

    let (audio_tx, audio_rx) = mpsc::channel::<AudioEvent>();
    let (host_tx, host_rx) = mpsc::channel::<HostEvent>();
    let (lyrics_tx, lyrics_rx) = mpsc::channel::<LyricsResult>();

    let graph = AudioGraph::new();
    let mut visualizer = Visualizer::new(&graph);
    let audio_player = AudioPlayer::new(graph.clone(), audio_tx, &settings.audio);

    let mpris = crate::mpris::spawn_mpris(host_tx.clone());
    let bridge = DesktopBridge::new(mpris, host_tx.clone(), settings.notifications.enabled);
    let mut controller = Controller::new(audio_player, bridge, graph, &settings);

    let dir = startup::initial_dir(&cli, &settings);
    app.set_current_dir(dir.display().to_string());
    startup::load_initial_playlist(dir, &settings, host_tx.clone());

    let inbox = event_loop::Inbox {
        audio_rx,
        host_tx,
        host_rx,
        lyrics_tx,
        lyrics_rx,
    };
    let services = event_loop::Services {
        settings: &settings,
        theme_store: &theme_store,
        lyrics_client,
    };

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(
            &mut terminal,
            &services,
            &mut app,
            &mut controller,
            &mut visualizer,
            &inbox,
            &mut state,
        )
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    controller
        .engine()
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
    if let Err(ref e) = run_result {
        warn!(error = %e, "event loop failed");
    }
    info!("tunebox stopped");

    run_result
}
