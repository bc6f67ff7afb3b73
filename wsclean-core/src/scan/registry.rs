// wsclean-core/src/scan/registry.rs
//! Raw reads of the uninstall registry. Both the native per-machine
//! namespace and the 32-bit-on-64-bit twin are walked; a namespace that
//! cannot be opened is skipped rather than failing the scan. The
//! per-namespace merge is factored over a reader function so the
//! isolation behavior is testable anywhere.

use tracing::warn;
use wsclean_common::error::Result;

use super::RawUninstallRecord;

/// The two uninstall namespaces under HKEY_LOCAL_MACHINE.
pub const UNINSTALL_KEY_PATHS: [&str; 2] = [
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
    r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall",
];

/// Reads every namespace through `read_namespace` and merges the results.
/// A namespace whose read fails is logged and skipped, never fatal.
pub(crate) fn merge_namespaces<F>(read_namespace: F) -> Vec<RawUninstallRecord>
where
    F: Fn(&str) -> Result<Vec<RawUninstallRecord>>,
{
    let mut records = Vec::new();
    for base_path in UNINSTALL_KEY_PATHS {
        match read_namespace(base_path) {
            Ok(mut batch) => records.append(&mut batch),
            Err(e) => warn!("Skipping unreadable uninstall namespace {base_path}: {e}"),
        }
    }
    records
}

#[cfg(target_os = "windows")]
pub fn collect_uninstall_records() -> Result<Vec<RawUninstallRecord>> {
    Ok(merge_namespaces(read_namespace))
}

#[cfg(target_os = "windows")]
fn read_namespace(base_path: &str) -> Result<Vec<RawUninstallRecord>> {
    use winreg::enums::HKEY_LOCAL_MACHINE;
    use winreg::RegKey;
    use wsclean_common::error::WscleanError;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let base = hklm
        .open_subkey(base_path)
        .map_err(|e| WscleanError::Registry(format!("failed to open {base_path}: {e}")))?;

    let mut records = Vec::new();
    for subkey_name in base.enum_keys().flatten() {
        let sub = match base.open_subkey(&subkey_name) {
            Ok(sub) => sub,
            Err(e) => {
                warn!("Skipping unreadable subkey {subkey_name}: {e}");
                continue;
            }
        };

        records.push(RawUninstallRecord {
            display_name: sub.get_value::<String, _>("DisplayName").ok(),
            uninstall_string: sub.get_value::<String, _>("UninstallString").ok(),
            quiet_uninstall_string: sub
                .get_value::<String, _>("QuietUninstallString")
                .ok(),
            install_location: sub.get_value::<String, _>("InstallLocation").ok(),
            display_version: sub.get_value::<String, _>("DisplayVersion").ok(),
            publisher: sub.get_value::<String, _>("Publisher").ok(),
            windows_installer: sub
                .get_value::<u32, _>("WindowsInstaller")
                .map(|v| v != 0)
                .unwrap_or(false),
            subkey: subkey_name,
        });
    }
    Ok(records)
}

#[cfg(not(target_os = "windows"))]
pub fn collect_uninstall_records() -> Result<Vec<RawUninstallRecord>> {
    warn!("No uninstall registry on this platform; scan returns no entries");
    Ok(merge_namespaces(|_| Ok(Vec::new())))
}

#[cfg(test)]
mod tests {
    use wsclean_common::error::WscleanError;

    use super::*;

    fn record(subkey: &str) -> RawUninstallRecord {
        RawUninstallRecord {
            subkey: subkey.to_string(),
            display_name: Some(subkey.to_string()),
            uninstall_string: Some("un.exe".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn unreadable_namespace_is_skipped_not_fatal() {
        let records = merge_namespaces(|base| {
            if base.contains("WOW6432Node") {
                Err(WscleanError::Registry("access denied".to_string()))
            } else {
                Ok(vec![record("App A"), record("App B")])
            }
        });
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].subkey, "App A");
    }

    #[test]
    fn all_namespaces_failing_yields_an_empty_scan() {
        let records =
            merge_namespaces(|_| Err(WscleanError::Registry("access denied".to_string())));
        assert!(records.is_empty());
    }

    #[test]
    fn records_merge_across_namespaces_in_path_order() {
        let records = merge_namespaces(|base| {
            if base.contains("WOW6432Node") {
                Ok(vec![record("Wow App")])
            } else {
                Ok(vec![record("Native App")])
            }
        });
        let subkeys: Vec<&str> = records.iter().map(|r| r.subkey.as_str()).collect();
        assert_eq!(subkeys, vec!["Native App", "Wow App"]);
    }
}
