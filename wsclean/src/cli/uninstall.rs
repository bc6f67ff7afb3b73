// wsclean/src/cli/uninstall.rs
use clap::Args;
use colored::Colorize;
use dialoguer::Confirm;
use tracing::error;
use wsclean_common::error::{Result, WscleanError};
use wsclean_common::{CancelToken, Config, UninstallEntry, UninstallPhase, UninstallProgress};
use wsclean_core::{scan_installed_apps, UninstallEngine};

#[derive(Args, Debug)]
pub struct Uninstall {
    /// Display names of the applications to uninstall
    #[arg(required = true)]
    pub names: Vec<String>,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
    /// Launch uninstallers through the platform's elevation prompt
    #[arg(long)]
    pub elevated: bool,
}

impl Uninstall {
    pub async fn run(&self, config: &Config, cancel: &CancelToken) -> Result<()> {
        let installed = scan_installed_apps(config).await?;

        let mut targets: Vec<UninstallEntry> = Vec::new();
        let mut errors: Vec<(String, WscleanError)> = Vec::new();
        for name in &self.names {
            match resolve(name, &installed) {
                Ok(entry) => targets.push(entry.clone()),
                Err(e) => {
                    error!("✖ {e}");
                    errors.push((name.clone(), e));
                }
            }
        }

        if targets.is_empty() {
            return Err(WscleanError::Generic(
                "No matching applications to uninstall.".to_string(),
            ));
        }

        println!("{}", "The following will be uninstalled:".bold());
        for entry in &targets {
            println!(
                "  {} {}",
                entry.display_name.cyan(),
                entry.version.as_deref().unwrap_or("").dimmed()
            );
        }
        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt(format!("Uninstall {} application(s)?", targets.len()))
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
        let results = engine.uninstall_batch(&targets, &sink, cancel).await;

        let mut failed = 0usize;
        for result in &results {
            if result.success {
                println!("✓ Uninstalled {}", result.entry.display_name.green());
            } else if result.was_cancelled {
                println!("- Cancelled {}", result.entry.display_name.yellow());
            } else {
                println!(
                    "✖ Failed to uninstall {} (exit code {})",
                    result.entry.display_name.red(),
                    result.exit_code
                );
                failed += 1;
            }
        }
        if results.len() < targets.len() {
            println!(
                "{}",
                format!(
                    "{} application(s) were not attempted.",
                    targets.len() - results.len()
                )
                .yellow()
            );
        }

        if failed > 0 || !errors.is_empty() {
            Err(WscleanError::Generic(
                "Uninstall failed for one or more applications.".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Resolves a requested name against the scan: an exact case-insensitive
/// match wins, then a unique substring match. Ambiguity is an error rather
/// than a guess.
fn resolve<'a>(name: &str, installed: &'a [UninstallEntry]) -> Result<&'a UninstallEntry> {
    if let Some(entry) = installed
        .iter()
        .find(|e| e.display_name.eq_ignore_ascii_case(name))
    {
        return Ok(entry);
    }

    let needle = name.to_ascii_lowercase();
    let matches: Vec<&UninstallEntry> = installed
        .iter()
        .filter(|e| e.display_name.to_ascii_lowercase().contains(&needle))
        .collect();
    match matches.as_slice() {
        [] => Err(WscleanError::NotFound(format!(
            "'{name}' is not installed."
        ))),
        [single] => Ok(single),
        many => Err(WscleanError::Generic(format!(
            "'{name}' is ambiguous; matches: {}",
            many.iter()
                .map(|e| e.display_name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

pub(crate) fn print_progress(progress: &UninstallProgress) {
    let label = match progress.phase {
        UninstallPhase::StoppingProcesses => "stopping processes",
        UninstallPhase::RunningSilent => "running uninstaller",
        UninstallPhase::ForcingDelete => "removing remnants",
        UninstallPhase::Completed => return,
    };
    match progress.percentage {
        Some(pct) => println!("{} {label} ({pct}%)", "==>".bold().blue()),
        None => println!("{} {label}", "==>".bold().blue()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(display_name: &str) -> UninstallEntry {
        UninstallEntry {
            product_key: display_name.replace(' ', ""),
            display_name: display_name.to_string(),
            publisher: None,
            version: None,
            install_location: None,
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
    fn exact_match_beats_substring_matches() {
        let installed = vec![entry("Dell Command | Update"), entry("Dell Command")];
        let found = resolve("dell command", &installed).unwrap();
        assert_eq!(found.display_name, "Dell Command");
    }

    #[test]
    fn unique_substring_match_resolves() {
        let installed = vec![entry("Dell Optimizer"), entry("Google Chrome")];
        let found = resolve("optimizer", &installed).unwrap();
        assert_eq!(found.display_name, "Dell Optimizer");
    }

    #[test]
    fn ambiguous_substring_is_an_error() {
        let installed = vec![entry("Dell Optimizer"), entry("Dell Display Manager")];
        assert!(resolve("dell", &installed).is_err());
    }

    #[test]
    fn missing_name_is_not_found() {
        let installed = vec![entry("Google Chrome")];
        let err = resolve("Firefox", &installed).unwrap_err();
        assert!(matches!(err, WscleanError::NotFound(_)));
    }
}
