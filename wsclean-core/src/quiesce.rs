// wsclean-core/src/quiesce.rs
//! Stops a target's service and kills its processes before the uninstall
//! runs. Quiescing is advisory: every failure here is logged and
//! swallowed, never fatal to the uninstall itself.

use std::time::Duration;

use sysinfo::{ProcessesToUpdate, System};
use tracing::{debug, info, warn};
use wsclean_common::UninstallEntry;

const SERVICE_STOP_TIMEOUT: Duration = Duration::from_secs(30);
const SERVICE_POLL_INTERVAL: Duration = Duration::from_secs(1);
const PROCESS_EXIT_TIMEOUT: Duration = Duration::from_secs(5);
const PROCESS_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Stops the entry's hinted service and terminates its hinted processes.
pub async fn quiesce(entry: &UninstallEntry) {
    if let Some(service) = entry.service_name.as_deref() {
        stop_service(service).await;
    }
    if let Some(names) = entry.process_names.as_deref() {
        kill_processes(names).await;
    }
}

/// Stops a Windows service by name via the service-control tool, waiting up
/// to 30 seconds for a stopped state. Not-found and access-denied are
/// logged and swallowed.
#[cfg(target_os = "windows")]
pub async fn stop_service(name: &str) {
    use tokio::process::Command;

    debug!("Stopping service {name}");
    match Command::new("sc").args(["stop", name]).output().await {
        Ok(out) if out.status.success() => {}
        Ok(out) => {
            warn!(
                "sc stop {name} reported failure: {}",
                String::from_utf8_lossy(&out.stdout).trim()
            );
            return;
        }
        Err(e) => {
            warn!("Failed to invoke sc stop {name}: {e}");
            return;
        }
    }

    let deadline = tokio::time::Instant::now() + SERVICE_STOP_TIMEOUT;
    loop {
        match Command::new("sc").args(["query", name]).output().await {
            Ok(out) => {
                let stdout = String::from_utf8_lossy(&out.stdout);
                if stdout.contains("STOPPED") {
                    info!("Stopped service: {name}");
                    return;
                }
            }
            Err(e) => {
                warn!("Failed to query service {name}: {e}");
                return;
            }
        }
        if tokio::time::Instant::now() >= deadline {
            warn!("Service {name} did not reach a stopped state in time");
            return;
        }
        tokio::time::sleep(SERVICE_POLL_INTERVAL).await;
    }
}

#[cfg(not(target_os = "windows"))]
pub async fn stop_service(name: &str) {
    debug!("No service-control manager on this platform; not stopping {name}");
}

/// Kills every running process matching any of the given names, waiting up
/// to 5 seconds for the matches to exit. Matching ignores case and a
/// trailing `.exe`.
pub async fn kill_processes(names: &[String]) {
    let targets: Vec<String> = names.iter().map(|n| normalize_name(n)).collect();
    if targets.is_empty() {
        return;
    }

    let report = tokio::task::spawn_blocking(move || {
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::All, true);

        let mut killed = 0usize;
        for (pid, proc) in sys.processes() {
            let pname = normalize_name(&proc.name().to_string_lossy());
            if targets.iter().any(|t| *t == pname) {
                if proc.kill() {
                    info!("Killed process: {pname} (PID {})", pid.as_u32());
                    killed += 1;
                } else {
                    warn!("Failed to kill {pname} (PID {})", pid.as_u32());
                }
            }
        }
        if killed == 0 {
            return (killed, true);
        }

        // Bounded wait for the kills to take effect.
        let deadline = std::time::Instant::now() + PROCESS_EXIT_TIMEOUT;
        loop {
            sys.refresh_processes(ProcessesToUpdate::All, true);
            let still_running = sys.processes().values().any(|p| {
                let pname = normalize_name(&p.name().to_string_lossy());
                targets.iter().any(|t| *t == pname)
            });
            if !still_running {
                return (killed, true);
            }
            if std::time::Instant::now() >= deadline {
                return (killed, false);
            }
            std::thread::sleep(PROCESS_POLL_INTERVAL);
        }
    })
    .await;

    match report {
        Ok((_, true)) => {}
        Ok((_, false)) => warn!("Some target processes were still running after the kill wait"),
        Err(e) => warn!("Process kill task failed: {e}"),
    }
}

fn normalize_name(name: &str) -> String {
    let lowered = name.to_ascii_lowercase();
    lowered
        .strip_suffix(".exe")
        .map(str::to_string)
        .unwrap_or(lowered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_case_insensitively_without_extension() {
        assert_eq!(normalize_name("DellOptimizer.EXE"), "delloptimizer");
        assert_eq!(normalize_name("DOCLI"), "docli");
    }

    #[tokio::test]
    async fn killing_absent_processes_is_harmless() {
        kill_processes(&["wsclean-no-such-process-zz".to_string()]).await;
    }
}
