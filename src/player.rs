//! Playback controller: transport state, the shuffle/repeat advance policy,
//! volume and mute, and the glue between the playlist, the media engine and
//! the audio graph.
//!
//! The engine and the desktop host are traits so the controller can be driven
//! without audio hardware or a desktop session.

mod advance;
mod command;
mod controller;
mod engine;
mod host;

pub use command::Command;
pub use controller::{Controller, PlaybackState, VolumeIcon};
pub use engine::MediaEngine;
pub use host::{HostBridge, MediaState, TrackInfo, WindowAction};

#[cfg(test)]
mod tests;
