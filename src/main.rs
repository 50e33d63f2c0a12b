mod app;
mod audio;
mod bridge;
mod config;
mod keymap;
mod library;
mod lyrics;
mod mpris;
mod player;
mod playlist;
mod prefs;
mod runtime;
mod ui;
mod visual;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
