// wsclean-core/src/verify.rs
//! Post-uninstall verification and last-resort remediation. Some silent
//! uninstallers report success while leaving remnants, so presence is
//! re-checked independently of the exit code, and force removal cleans
//! both the install directory and the uninstall registry subtree.

use std::path::Path;
use std::{fs, io};

use tracing::{debug, warn};
use wsclean_common::UninstallEntry;

/// True when the application is still detectable: its install directory
/// exists on disk, or its uninstall registry key still exists. Either
/// signal alone counts.
pub fn is_still_present(entry: &UninstallEntry) -> bool {
    if let Some(dir) = entry.install_dir() {
        if dir.is_dir() {
            return true;
        }
    }
    registry_key_exists(&entry.product_key)
}

/// Last-resort cleanup: recursively deletes the install directory and
/// removes the uninstall subtree for the product key under both
/// namespaces. Missing targets are fine; permission failures are logged
/// and swallowed. Never raises past the orchestrator.
pub fn force_remove(entry: &UninstallEntry) {
    if let Some(dir) = entry.install_dir() {
        remove_path_best_effort(dir);
    }
    delete_uninstall_keys(&entry.product_key);
}

/// Removes a filesystem artifact (file, symlink, or directory recursively).
/// Returns `true` if the artifact is gone afterwards, including when it was
/// already absent.
pub(crate) fn remove_path_best_effort(path: &Path) -> bool {
    match path.symlink_metadata() {
        Ok(metadata) => {
            let is_real_dir = metadata.file_type().is_dir();
            debug!(
                "Removing {} at: {}",
                if is_real_dir { "directory" } else { "file" },
                path.display()
            );
            let result = if is_real_dir {
                fs::remove_dir_all(path)
            } else {
                fs::remove_file(path)
            };
            match result {
                Ok(()) => {
                    debug!("Removed: {}", path.display());
                    true
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => true,
                Err(e) => {
                    warn!("Failed to remove {}: {}", path.display(), e);
                    false
                }
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Already absent: {}", path.display());
            true
        }
        Err(e) => {
            warn!("Failed to stat {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(target_os = "windows")]
fn registry_key_exists(product_key: &str) -> bool {
    use winreg::enums::HKEY_LOCAL_MACHINE;
    use winreg::RegKey;

    use crate::scan::registry::UNINSTALL_KEY_PATHS;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    UNINSTALL_KEY_PATHS.iter().any(|base| {
        hklm.open_subkey(format!(r"{base}\{product_key}")).is_ok()
    })
}

#[cfg(not(target_os = "windows"))]
fn registry_key_exists(_product_key: &str) -> bool {
    false
}

#[cfg(target_os = "windows")]
fn delete_uninstall_keys(product_key: &str) {
    use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_ALL_ACCESS};
    use winreg::RegKey;

    use crate::scan::registry::UNINSTALL_KEY_PATHS;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    for base in UNINSTALL_KEY_PATHS {
        match hklm.open_subkey_with_flags(base, KEY_ALL_ACCESS) {
            Ok(root) => match root.delete_subkey_all(product_key) {
                Ok(()) => debug!(r"Deleted registry subtree {base}\{product_key}"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(r"Failed to delete {base}\{product_key}: {e}"),
            },
            Err(e) => warn!("Failed to open {base} for deletion: {e}"),
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn delete_uninstall_keys(product_key: &str) {
    debug!("No registry on this platform; nothing to purge for {product_key}");
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn entry_with_location(dir: Option<PathBuf>) -> UninstallEntry {
        UninstallEntry {
            product_key: "TestProduct".to_string(),
            display_name: "Test App".to_string(),
            publisher: None,
            version: None,
            install_location: dir,
            uninstall_command: "un.exe".to_string(),
            silent_uninstall_command: None,
            windows_installer: false,
            service_name: None,
            process_names: None,
            succeeded: None,
            was_cancelled: false,
            exit_code: 0,
        }
    }

    #[test]
    fn present_while_install_dir_exists() {
        let dir = tempfile::tempdir().unwrap();
        let entry = entry_with_location(Some(dir.path().to_path_buf()));
        assert!(is_still_present(&entry));
    }

    #[test]
    fn absent_when_install_dir_is_gone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vanished");
        let entry = entry_with_location(Some(path));
        assert!(!is_still_present(&entry));
    }

    #[test]
    fn empty_install_location_is_not_a_presence_signal() {
        let entry = entry_with_location(Some(PathBuf::new()));
        assert!(!is_still_present(&entry));
    }

    #[test]
    fn force_remove_deletes_the_install_dir() {
        let root = tempfile::tempdir().unwrap();
        let app_dir = root.path().join("app");
        fs::create_dir_all(app_dir.join("nested")).unwrap();
        fs::write(app_dir.join("nested/file.txt"), b"x").unwrap();

        let entry = entry_with_location(Some(app_dir.clone()));
        assert!(is_still_present(&entry));
        force_remove(&entry);
        assert!(!app_dir.exists());
        assert!(!is_still_present(&entry));
    }

    #[test]
    fn force_remove_on_missing_dir_is_harmless() {
        let root = tempfile::tempdir().unwrap();
        let entry = entry_with_location(Some(root.path().join("never-existed")));
        force_remove(&entry);
    }
}
