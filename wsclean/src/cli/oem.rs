// wsclean/src/cli/oem.rs
use clap::Args;
use colored::Colorize;
use dialoguer::Confirm;
use wsclean_common::error::{Result, WscleanError};
use wsclean_common::{CancelToken, Config, UninstallProgress};
use wsclean_core::{scan_installed_apps, UninstallEngine};

use crate::cli::uninstall::print_progress;

#[derive(Args, Debug)]
pub struct RemoveOem {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
    /// Launch uninstallers through the platform's elevation prompt
    #[arg(long)]
    pub elevated: bool,
}

impl RemoveOem {
    pub async fn run(&self, config: &Config, cancel: &CancelToken) -> Result<()> {
        let installed = scan_installed_apps(config).await?;
        let matching: Vec<_> = installed
            .iter()
            .filter(|e| config.hints.oem_pattern_for(&e.display_name).is_some())
            .collect();

        if matching.is_empty() {
            println!("{}", "No OEM applications found.".yellow());
            return Ok(());
        }

        println!("{}", "OEM applications to remove:".bold());
        for entry in &matching {
            println!("  {}", entry.display_name.cyan());
        }
        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt(format!("Remove {} application(s)?", matching.len()))
                .default(false)
                .interact()
                .map_err(|e| WscleanError::Generic(format!("prompt failed: {e}")))?;
            if !confirmed {
                println!("{}", "Aborted.".yellow());
                return Ok(());
            }
        }

        let engine = UninstallEngine::new(config.clone()).elevated(self.elevated);
        let sink = |p: UninstallProgress| print_progress(&p);
        let results = engine.remove_oem_apps(&installed, &sink, cancel).await;

        let mut failed = 0usize;
        for result in &results {
            if result.success {
                println!("✓ Removed {}", result.entry.display_name.green());
            } else if result.was_cancelled {
                println!("- Cancelled {}", result.entry.display_name.yellow());
            } else {
                println!(
                    "✖ Failed to remove {} (exit code {})",
                    result.entry.display_name.red(),
                    result.exit_code
                );
                failed += 1;
            }
        }

        if failed > 0 {
            Err(WscleanError::Generic(
                "OEM removal failed for one or more applications.".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}
