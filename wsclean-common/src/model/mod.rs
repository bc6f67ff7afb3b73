// wsclean-common/src/model/mod.rs
// Declares the modules within the model directory.
pub mod entry;
pub mod result;

// Re-export
pub use entry::UninstallEntry;
pub use result::{UninstallPhase, UninstallProgress, UninstallResult};
