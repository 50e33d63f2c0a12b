//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive runtime
//! behavior and helpers to locate configuration and state on disk.

mod load;
mod schema;

pub use load::state_dir;
pub use schema::*;
