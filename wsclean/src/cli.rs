// wsclean/src/cli.rs
//! Defines the command-line argument structure using clap.
use clap::{ArgAction, Parser, Subcommand};
use wsclean_common::error::Result;
use wsclean_common::{CancelToken, Config};

pub mod list;
pub mod oem;
pub mod uninstall;

use crate::cli::list::List;
use crate::cli::oem::RemoveOem;
use crate::cli::uninstall::Uninstall;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "wsclean", bin_name = "wsclean")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List installed applications from the uninstall registry
    List(List),
    /// Silently uninstall applications by display name
    Uninstall(Uninstall),
    /// Remove vendor-bundled OEM software matching the configured profiles
    RemoveOem(RemoveOem),
}

impl Command {
    pub async fn run(&self, config: &Config, cancel: &CancelToken) -> Result<()> {
        match self {
            Self::List(command) => command.run(config).await,
            Self::Uninstall(command) => command.run(config, cancel).await,
            Self::RemoveOem(command) => command.run(config, cancel).await,
        }
    }
}
