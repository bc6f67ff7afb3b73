// wsclean-common/src/model/result.rs
use serde::{Deserialize, Serialize};

use super::entry::UninstallEntry;

/// Phases of a single entry's uninstall, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UninstallPhase {
    StoppingProcesses,
    RunningSilent,
    ForcingDelete,
    Completed,
}

/// Immutable progress event emitted to the observer during one entry's
/// uninstall. Carries either a batch percentage or a free-text message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UninstallProgress {
    pub phase: UninstallPhase,
    pub percentage: Option<u8>,
    pub message: Option<String>,
}

impl UninstallProgress {
    pub fn phase(phase: UninstallPhase) -> Self {
        Self {
            phase,
            percentage: None,
            message: None,
        }
    }

    pub fn percent(phase: UninstallPhase, percentage: u8) -> Self {
        Self {
            phase,
            percentage: Some(percentage),
            message: None,
        }
    }

    pub fn message(phase: UninstallPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            percentage: None,
            message: Some(message.into()),
        }
    }
}

/// Immutable outcome of one uninstall attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UninstallResult {
    pub entry: UninstallEntry,
    pub exit_code: i32,
    pub success: bool,
    pub was_cancelled: bool,
}

impl UninstallResult {
    /// Builds a result and writes the once-per-attempt result fields back
    /// onto the carried entry snapshot.
    pub fn new(mut entry: UninstallEntry, exit_code: i32, success: bool) -> Self {
        entry.succeeded = Some(success);
        entry.was_cancelled = false;
        entry.exit_code = exit_code;
        Self {
            entry,
            exit_code,
            success,
            was_cancelled: false,
        }
    }

    pub fn cancelled(mut entry: UninstallEntry) -> Self {
        entry.succeeded = Some(false);
        entry.was_cancelled = true;
        entry.exit_code = -1;
        Self {
            entry,
            exit_code: -1,
            success: false,
            was_cancelled: true,
        }
    }

    pub fn failed(mut entry: UninstallEntry) -> Self {
        entry.succeeded = Some(false);
        entry.was_cancelled = false;
        entry.exit_code = -1;
        Self {
            entry,
            exit_code: -1,
            success: false,
            was_cancelled: false,
        }
    }
}
