//! Application module: exposes the UI model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds everything about the
//! screen that is not playback: cursor, prompt, theme and layout.

mod model;

pub use model::*;
