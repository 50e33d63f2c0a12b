//! Library module: track model, file-name metadata derivation and directory
//! scanning.
//!
//! Display metadata comes from the `"<artist> - <title>.<ext>"` naming
//! convention rather than embedded tags; tags are only probed for duration.

mod derive;
mod model;
mod scan;

pub use model::Track;
pub use scan::scan;

#[cfg(test)]
mod tests;
