// wsclean-common/src/lib.rs
pub mod cancel;
pub mod config;
pub mod error;
pub mod model;
pub mod progress;

// Re-export key types
pub use cancel::CancelToken;
pub use config::{Config, Hints};
pub use error::{Result, WscleanError};
pub use model::{UninstallEntry, UninstallPhase, UninstallProgress, UninstallResult};
pub use progress::{NullSink, ProgressSink};
