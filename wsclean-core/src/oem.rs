// wsclean-core/src/oem.rs
//! Profile-driven removal of vendor-bundled software. The OEM profile
//! tables in the hints decide which installed entries belong to a vendor
//! family and which services and processes to quiesce for each.

use tracing::{debug, info};
use wsclean_common::{CancelToken, ProgressSink, UninstallEntry, UninstallResult};

use crate::process::CommandRunner;
use crate::quiesce;
use crate::uninstall::UninstallEngine;

impl<R: CommandRunner> UninstallEngine<R> {
    /// Removes every entry in `entries` that matches an OEM profile
    /// pattern. Non-matching entries are skipped without a result record.
    /// The profile's services and processes are quiesced up front for each
    /// match; the entry then goes through the normal uninstall path with
    /// its own hints cleared so the quiesce step does not repeat.
    pub async fn remove_oem_apps(
        &self,
        entries: &[UninstallEntry],
        sink: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Vec<UninstallResult> {
        let mut results = Vec::new();
        for entry in entries {
            if cancel.is_cancelled() {
                info!("OEM removal cancelled before {}", entry.display_name);
                break;
            }
            let Some((profile, pattern)) =
                self.config().hints.oem_pattern_for(&entry.display_name)
            else {
                debug!("Not an OEM application: {}", entry.display_name);
                continue;
            };
            info!(
                "OEM removal ({} profile): {}",
                profile.name, entry.display_name
            );

            for service in &pattern.services {
                quiesce::stop_service(service).await;
            }
            if !pattern.processes.is_empty() {
                quiesce::kill_processes(&pattern.processes).await;
            }

            let mut target = entry.clone();
            target.service_name = None;
            target.process_names = None;
            results.push(self.uninstall_entry(&target, sink, cancel).await);
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        info!(
            target: "wsclean::summary",
            "OEM removal finished: {succeeded}/{} succeeded",
            results.len()
        );
        results
    }
}
