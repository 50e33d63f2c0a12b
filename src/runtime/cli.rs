use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "tunebox")]
#[command(about = "A terminal music player with an equalizer, spectrum visualizer and lyrics")]
#[command(version)]
pub struct Cli {
    /// Folder to load at startup (defaults to `library.music_dir`)
    pub music_dir: Option<PathBuf>,

    /// Write logs here instead of the state directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}
