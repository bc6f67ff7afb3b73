// wsclean-core/src/uninstall/mod.rs
//! Drives the per-entry uninstall state machine
//! (StoppingProcesses -> RunningSilent -> ForcingDelete -> Completed) and
//! batch sequencing. Batches run sequentially so two entries can never
//! fight over a shared service or process; silent/MSI entries run before
//! interactive-only ones to push any blocking prompts to the end.

use tracing::{error, info, warn};
use wsclean_common::error::{Result, WscleanError};
use wsclean_common::{
    CancelToken, Config, ProgressSink, UninstallEntry, UninstallPhase, UninstallProgress,
    UninstallResult,
};

use crate::classify::{classify, UninstallStrategy};
use crate::command::build_silent_command;
use crate::process::{CommandRunner, RunOptions, SystemRunner};
use crate::{quiesce, verify};

/// Builds the silenced invocation for a generic executable. Injectable so
/// a caller can substitute its own silencing policy.
pub type SilentCommandBuilder = fn(&str) -> String;

pub struct UninstallEngine<R: CommandRunner = SystemRunner> {
    config: Config,
    runner: R,
    builder: SilentCommandBuilder,
    elevate: bool,
}

impl UninstallEngine<SystemRunner> {
    pub fn new(config: Config) -> Self {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: CommandRunner> UninstallEngine<R> {
    pub fn with_runner(config: Config, runner: R) -> Self {
        Self {
            config,
            runner,
            builder: build_silent_command,
            elevate: false,
        }
    }

    /// Replaces the silent-command builder.
    pub fn with_builder(mut self, builder: SilentCommandBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Launch uninstallers through the platform's elevation mechanism.
    /// Elevated children cannot stream output; only exit codes are
    /// reported.
    pub fn elevated(mut self, elevate: bool) -> Self {
        self.elevate = elevate;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Uninstalls one entry. Never returns an error: cancellation and
    /// unexpected failures are converted into the result record so a batch
    /// always continues.
    pub async fn uninstall_entry(
        &self,
        entry: &UninstallEntry,
        sink: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> UninstallResult {
        match self.try_uninstall(entry, sink, cancel).await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => {
                warn!("Uninstall cancelled: {}", entry.display_name);
                UninstallResult::cancelled(entry.clone())
            }
            Err(e) => {
                error!("Uninstall of {} failed: {e}", entry.display_name);
                UninstallResult::failed(entry.clone())
            }
        }
    }

    async fn try_uninstall(
        &self,
        entry: &UninstallEntry,
        sink: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<UninstallResult> {
        if cancel.is_cancelled() {
            return Err(WscleanError::Cancelled(entry.display_name.clone()));
        }
        info!("Beginning uninstall: {}", entry.display_name);

        // Phase 1: quiesce services and processes.
        sink.report(UninstallProgress::phase(UninstallPhase::StoppingProcesses));
        quiesce::quiesce(entry).await;

        if cancel.is_cancelled() {
            return Err(WscleanError::Cancelled(entry.display_name.clone()));
        }

        // Phase 2: run the silenced uninstall.
        sink.report(UninstallProgress::phase(UninstallPhase::RunningSilent));
        let strategy = classify(entry, &self.config.hints);
        let captured = RunOptions {
            elevate: self.elevate,
            capture_output: !self.elevate,
            via_shell: false,
            timeout: Some(self.config.uninstall_timeout),
        };
        let exit_code = match strategy {
            UninstallStrategy::VendorSilent => {
                let cmdline = entry.vendor_silent_command().unwrap_or_default().to_string();
                info!("Running vendor silent command for {}", entry.display_name);
                self.runner.run(&cmdline, captured, cancel.clone()).await?
            }
            UninstallStrategy::MsiPackage => {
                let cmdline = format!(
                    "msiexec /x {} /quiet /norestart",
                    entry.product_key
                );
                info!("Running Windows Installer removal for {}", entry.display_name);
                self.runner.run(&cmdline, captured, cancel.clone()).await?
            }
            UninstallStrategy::InteractiveOnly => {
                info!(
                    "Interactive uninstaller for {}; launching via shell",
                    entry.display_name
                );
                let opts = RunOptions {
                    via_shell: true,
                    timeout: Some(self.config.uninstall_timeout),
                    ..Default::default()
                };
                self.runner
                    .run(&entry.uninstall_command, opts, cancel.clone())
                    .await?
            }
            UninstallStrategy::GenericExecutable => {
                let cmdline = (self.builder)(&entry.uninstall_command);
                if cmdline.is_empty() {
                    warn!("No usable uninstall command for {}", entry.display_name);
                    sink.report(UninstallProgress::phase(UninstallPhase::Completed));
                    return Ok(UninstallResult::failed(entry.clone()));
                }
                self.runner.run(&cmdline, captured, cancel.clone()).await?
            }
        };

        if exit_code == 0 {
            info!("Silent uninstall exited with code 0");
        } else {
            warn!("Silent uninstall exited with code {exit_code}");
        }

        // Phase 3: verify, and force-delete remnants if the application is
        // still detected. This runs regardless of the exit code: some
        // uninstallers report success while leaving remnants behind.
        let mut still_present = verify::is_still_present(entry);
        if still_present {
            warn!("{} still detected, forcing removal", entry.display_name);
            sink.report(UninstallProgress::phase(UninstallPhase::ForcingDelete));
            verify::force_remove(entry);
            still_present = verify::is_still_present(entry);
        }

        sink.report(UninstallProgress::phase(UninstallPhase::Completed));
        let success = !still_present;
        info!(
            target: "wsclean::summary",
            "Completed uninstall: {} (exit {exit_code}, success {success})",
            entry.display_name
        );
        Ok(UninstallResult::new(entry.clone(), exit_code, success))
    }

    /// Runs a batch sequentially. Entries classified interactive-only are
    /// moved to the end; after a full pass, interactive-only entries still
    /// detected get exactly one more attempt. Cancellation stops the loop
    /// before the next entry and leaves already-recorded results intact.
    pub async fn uninstall_batch(
        &self,
        entries: &[UninstallEntry],
        sink: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Vec<UninstallResult> {
        let hints = &self.config.hints;
        let mut ordered: Vec<&UninstallEntry> = Vec::with_capacity(entries.len());
        let mut interactive: Vec<&UninstallEntry> = Vec::new();
        for entry in entries {
            if classify(entry, hints) == UninstallStrategy::InteractiveOnly {
                interactive.push(entry);
            } else {
                ordered.push(entry);
            }
        }
        ordered.append(&mut interactive);

        let total = ordered.len().max(1);
        let mut results: Vec<UninstallResult> = Vec::with_capacity(ordered.len());
        for (i, entry) in ordered.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Batch cancelled before {}", entry.display_name);
                break;
            }
            sink.report(UninstallProgress::percent(
                UninstallPhase::StoppingProcesses,
                (i * 100 / total) as u8,
            ));
            results.push(self.uninstall_entry(entry, sink, cancel).await);
        }

        // Fallback pass for interactive-only stragglers.
        if !cancel.is_cancelled() {
            let retry: Vec<usize> = results
                .iter()
                .enumerate()
                .filter(|(_, r)| {
                    !r.was_cancelled
                        && classify(&r.entry, hints) == UninstallStrategy::InteractiveOnly
                        && verify::is_still_present(&r.entry)
                })
                .map(|(i, _)| i)
                .collect();
            for i in retry {
                if cancel.is_cancelled() {
                    break;
                }
                let entry = results[i].entry.clone();
                info!("Retrying interactive-only entry: {}", entry.display_name);
                results[i] = self.uninstall_entry(&entry, sink, cancel).await;
            }
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        info!(
            target: "wsclean::summary",
            "Batch finished: {succeeded}/{} succeeded, {} attempted of {} requested",
            results.len(),
            results.len(),
            entries.len()
        );
        results
    }
}
