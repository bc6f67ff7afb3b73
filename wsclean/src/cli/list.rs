// wsclean/src/cli/list.rs
use clap::Args;
use colored::Colorize;
use prettytable::{format, Cell, Row, Table};
use wsclean_common::error::Result;
use wsclean_common::Config;
use wsclean_core::{classify, scan_installed_apps, UninstallStrategy};

#[derive(Args, Debug)]
pub struct List {
    /// Emit the raw entries as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl List {
    pub async fn run(&self, config: &Config) -> Result<()> {
        let entries = scan_installed_apps(config).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        if entries.is_empty() {
            println!("{}", "0 applications found".yellow());
            return Ok(());
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.add_row(Row::new(vec![
            Cell::new("Name").style_spec("b"),
            Cell::new("Version").style_spec("b"),
            Cell::new("Publisher").style_spec("b"),
            Cell::new("Uninstall").style_spec("b"),
        ]));
        for entry in &entries {
            let strategy = match classify(entry, &config.hints) {
                UninstallStrategy::VendorSilent => "silent",
                UninstallStrategy::MsiPackage => "msi",
                UninstallStrategy::InteractiveOnly => "interactive",
                UninstallStrategy::GenericExecutable => "generic",
            };
            table.add_row(Row::new(vec![
                Cell::new(&entry.display_name).style_spec("Fb"),
                Cell::new(entry.version.as_deref().unwrap_or("-")),
                Cell::new(entry.publisher.as_deref().unwrap_or("-")),
                Cell::new(strategy),
            ]));
        }
        table.printstd();
        println!("{}", format!("{} applications found", entries.len()).bold());
        Ok(())
    }
}
