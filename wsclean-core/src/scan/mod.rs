// wsclean-core/src/scan/mod.rs
//! Enumerates installed applications from the uninstall registry. The
//! registry walk is platform code behind `registry`; everything from raw
//! records to sorted entries is pure and testable anywhere.

pub mod registry;

use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;
use tracing::debug;
use wsclean_common::config::Hints;
use wsclean_common::error::{Result, WscleanError};
use wsclean_common::{Config, UninstallEntry};

lazy_static! {
    static ref GUID_RE: Regex = Regex::new(
        r"\{?[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\}?"
    )
    .unwrap();
}

/// One raw record read from an uninstall registry subkey, before any
/// filtering or enrichment.
#[derive(Debug, Clone, Default)]
pub struct RawUninstallRecord {
    pub subkey: String,
    pub display_name: Option<String>,
    pub uninstall_string: Option<String>,
    pub quiet_uninstall_string: Option<String>,
    pub install_location: Option<String>,
    pub display_version: Option<String>,
    pub publisher: Option<String>,
    pub windows_installer: bool,
}

/// Scans both uninstall namespaces and returns entries sorted by display
/// name, case-insensitively ascending. Inaccessible namespaces are skipped,
/// never fatal.
pub async fn scan_installed_apps(config: &Config) -> Result<Vec<UninstallEntry>> {
    let hints = config.hints.clone();
    let records = tokio::task::spawn_blocking(registry::collect_uninstall_records)
        .await
        .map_err(|e| WscleanError::Generic(format!("registry scan task failed: {e}")))??;
    debug!("Registry scan produced {} raw records", records.len());
    Ok(build_entries(records, &hints))
}

/// Assembles entries from raw records: drops records without a display name
/// or uninstall command, derives the product key, applies the hint tables,
/// and sorts. Duplicate product keys across namespaces are both kept since
/// they may represent distinct uninstall paths.
pub fn build_entries(records: Vec<RawUninstallRecord>, hints: &Hints) -> Vec<UninstallEntry> {
    let mut entries: Vec<UninstallEntry> = records
        .into_iter()
        .filter_map(|rec| {
            let display_name = rec.display_name.filter(|n| !n.trim().is_empty())?;
            let uninstall_command = rec.uninstall_string.filter(|c| !c.trim().is_empty())?;
            let product_key =
                extract_guid(&rec.subkey).unwrap_or_else(|| rec.subkey.clone());

            Some(UninstallEntry {
                product_key,
                service_name: hints.service_for(&display_name).map(str::to_string),
                process_names: hints.processes_for(&display_name).map(<[String]>::to_vec),
                display_name,
                publisher: rec.publisher,
                version: rec.display_version,
                install_location: rec
                    .install_location
                    .filter(|l| !l.trim().is_empty())
                    .map(PathBuf::from),
                uninstall_command,
                silent_uninstall_command: rec
                    .quiet_uninstall_string
                    .filter(|c| !c.trim().is_empty()),
                windows_installer: rec.windows_installer,
                succeeded: None,
                was_cancelled: false,
                exit_code: 0,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
    });
    entries
}

/// GUID-shaped token inside a raw subkey name, if any.
pub fn extract_guid(raw: &str) -> Option<String> {
    GUID_RE.find(raw).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subkey: &str, name: Option<&str>, cmd: Option<&str>) -> RawUninstallRecord {
        RawUninstallRecord {
            subkey: subkey.to_string(),
            display_name: name.map(str::to_string),
            uninstall_string: cmd.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn records_without_name_or_command_are_dropped() {
        let records = vec![
            record("A", Some("App A"), Some("a.exe")),
            record("B", None, Some("b.exe")),
            record("C", Some("App C"), None),
            record("D", Some("  "), Some("d.exe")),
            record("E", Some("App E"), Some("  ")),
        ];
        let entries = build_entries(records, &Hints::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name, "App A");
    }

    #[test]
    fn product_key_prefers_embedded_guid() {
        let guid = "{11111111-2222-3333-4444-555555555555}";
        let records = vec![
            record(&format!("Prefix{guid}"), Some("App"), Some("a.exe")),
            record("PlainSubkey", Some("Other"), Some("b.exe")),
        ];
        let entries = build_entries(records, &Hints::default());
        assert_eq!(entries[0].product_key, guid);
        assert_eq!(entries[1].product_key, "PlainSubkey");
    }

    #[test]
    fn entries_sort_case_insensitively() {
        let records = vec![
            record("1", Some("zebra tool"), Some("z.exe")),
            record("2", Some("Alpha Tool"), Some("a.exe")),
            record("3", Some("beta tool"), Some("b.exe")),
        ];
        let entries = build_entries(records, &Hints::default());
        let names: Vec<&str> = entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha Tool", "beta tool", "zebra tool"]);
    }

    #[test]
    fn duplicate_product_keys_are_both_kept() {
        let guid = "{11111111-2222-3333-4444-555555555555}";
        let records = vec![
            record(guid, Some("App 64"), Some("a.exe")),
            record(guid, Some("App 32"), Some("b.exe")),
        ];
        let entries = build_entries(records, &Hints::default());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].product_key, entries[1].product_key);
    }

    #[test]
    fn hints_populate_service_and_processes() {
        let records = vec![record("1", Some("Dell Optimizer"), Some("d.exe"))];
        let entries = build_entries(records, &Hints::default());
        assert_eq!(entries[0].service_name.as_deref(), Some("DellOptimizer"));
        assert_eq!(
            entries[0].process_names.as_deref(),
            Some(&["DellOptimizer".to_string(), "DOCLI".to_string()][..])
        );
    }

    #[test]
    fn blank_locations_and_quiet_commands_become_none() {
        let mut rec = record("1", Some("App"), Some("a.exe"));
        rec.install_location = Some("".to_string());
        rec.quiet_uninstall_string = Some("  ".to_string());
        let entries = build_entries(vec![rec], &Hints::default());
        assert!(entries[0].install_location.is_none());
        assert!(entries[0].silent_uninstall_command.is_none());
    }

    #[test]
    fn guid_extraction_handles_braces_and_bare_forms() {
        assert_eq!(
            extract_guid("{ABCDEF01-1111-2222-3333-444444444444}"),
            Some("{ABCDEF01-1111-2222-3333-444444444444}".to_string())
        );
        assert_eq!(
            extract_guid("InstallShield_{ABCDEF01-1111-2222-3333-444444444444}"),
            Some("{ABCDEF01-1111-2222-3333-444444444444}".to_string())
        );
        assert_eq!(extract_guid("NotAGuid"), None);
    }
}
