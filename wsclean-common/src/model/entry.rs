// wsclean-common/src/model/entry.rs
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One installed application discovered in the uninstall registry.
///
/// Immutable after the scan except for the result fields, which the
/// orchestrator writes exactly once per uninstall attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UninstallEntry {
    /// Stable identifier: the GUID extracted from the registry subkey name,
    /// or the raw subkey name when no GUID is present.
    pub product_key: String,
    pub display_name: String,
    pub publisher: Option<String>,
    pub version: Option<String>,
    pub install_location: Option<PathBuf>,
    /// Raw `UninstallString` as recorded by the installer.
    pub uninstall_command: String,
    /// Vendor-provided non-interactive variant (`QuietUninstallString`).
    pub silent_uninstall_command: Option<String>,
    /// Set when the registry marks the entry as a Windows Installer package.
    pub windows_installer: bool,
    /// Service to stop before uninstalling, from the hint tables.
    pub service_name: Option<String>,
    /// Processes to terminate before uninstalling, from the hint tables.
    pub process_names: Option<Vec<String>>,

    // Result fields, written once per uninstall attempt.
    #[serde(default)]
    pub succeeded: Option<bool>,
    #[serde(default)]
    pub was_cancelled: bool,
    #[serde(default)]
    pub exit_code: i32,
}

impl UninstallEntry {
    /// Install directory, ignoring empty-string locations some installers
    /// record.
    pub fn install_dir(&self) -> Option<&PathBuf> {
        self.install_location
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Vendor silent command, ignoring blank values.
    pub fn vendor_silent_command(&self) -> Option<&str> {
        self.silent_uninstall_command
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}
