// wsclean-core/src/classify.rs
//! Decides which uninstall strategy applies to an entry. Exposed
//! separately from execution so a batch can front-load silent/MSI work
//! and leave interactive-only entries for the end.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use wsclean_common::config::Hints;
use wsclean_common::UninstallEntry;

lazy_static! {
    static ref GUID_ONLY_RE: Regex = Regex::new(
        r"^\{?[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\}?$"
    )
    .unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UninstallStrategy {
    /// Vendor supplied a non-interactive command; run it directly.
    VendorSilent,
    /// Windows Installer package; uninstall via msiexec with the product
    /// code.
    MsiPackage,
    /// Known to show UI no matter what; launched via the shell and awaited.
    InteractiveOnly,
    /// Anything else; silenced heuristically.
    GenericExecutable,
}

/// Classifies an entry. First match wins; the categories are not mutually
/// exclusive by string content, so the order matters.
pub fn classify(entry: &UninstallEntry, hints: &Hints) -> UninstallStrategy {
    if entry.vendor_silent_command().is_some() {
        return UninstallStrategy::VendorSilent;
    }
    if entry.windows_installer || is_guid(&entry.product_key) {
        return UninstallStrategy::MsiPackage;
    }
    if hints.is_interactive_product(&entry.display_name)
        || has_interactive_signature(&entry.uninstall_command)
    {
        return UninstallStrategy::InteractiveOnly;
    }
    UninstallStrategy::GenericExecutable
}

pub fn is_guid(s: &str) -> bool {
    GUID_ONLY_RE.is_match(s)
}

/// InstallShield always shows UI unless a specific flag combination is
/// present. The signature is the framework marker plus its remove and
/// run-from-temp flags; a command that already carries a silent token is
/// not interactive despite matching the rest.
fn has_interactive_signature(command: &str) -> bool {
    let lowered = command.to_ascii_lowercase();
    let marker = lowered.contains("installshield");
    let remove = lowered.contains("-removeonly") || lowered.contains("/removeonly");
    let from_temp = lowered.contains("-runfromtemp") || lowered.contains("/runfromtemp");
    marker && remove && from_temp && !has_silent_token(&lowered)
}

fn has_silent_token(lowered: &str) -> bool {
    lowered.split_whitespace().any(|token| {
        matches!(
            token,
            "/s" | "-s" | "/silent" | "-silent" | "/verysilent" | "-verysilent" | "/quiet" | "/qn"
        )
    })
}
