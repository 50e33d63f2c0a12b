//! Audio subsystem: the equalizer/analyser graph and the `rodio` engine
//! thread that plays sources through it.

mod analyser;
mod eq;
mod graph;
mod player;
mod sink;
mod thread;
mod types;

pub use analyser::Analyser;
pub use eq::Band;
pub use graph::AudioGraph;
pub use player::AudioPlayer;
pub use types::AudioEvent;
