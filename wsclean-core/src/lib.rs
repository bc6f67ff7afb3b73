// wsclean-core/src/lib.rs
pub mod classify;
pub mod command;
pub mod oem;
pub mod process;
pub mod quiesce;
pub mod scan;
pub mod uninstall;
pub mod verify;

// Re-export key functions and types
pub use classify::{classify, UninstallStrategy};
pub use command::{build_silent_command, split_command};
pub use process::{CommandRunner, RunOptions, SystemRunner};
pub use scan::scan_installed_apps;
pub use uninstall::UninstallEngine;
