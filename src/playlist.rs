//! Playlist store: the ordered track sequence that defines both display and
//! navigation order.

mod store;

pub use store::{Playlist, shift_index};
