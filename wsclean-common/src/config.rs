// wsclean-common/src/config.rs
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::Result;

const DEFAULT_FALLBACK_ROOT: &str = "wsclean";
const HINTS_FILENAME: &str = "hints.toml";
const DEFAULT_UNINSTALL_TIMEOUT_SECS: u64 = 300;

/// Substring match on a display name that supplies the Windows service to
/// stop before uninstalling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHint {
    pub pattern: String,
    pub service: String,
}

/// Substring match on a display name that supplies the process names to
/// terminate before uninstalling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessHint {
    pub pattern: String,
    pub processes: Vec<String>,
}

/// One display-name pattern inside an OEM vendor profile, with the services
/// and processes to quiesce for applications matching it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OemPattern {
    pub pattern: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub processes: Vec<String>,
}

/// A named OEM removal profile (e.g. one vendor's bundled-software family).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OemProfile {
    pub name: String,
    pub patterns: Vec<OemPattern>,
}

/// The heuristic tables driving scanning, classification and OEM removal.
/// Loaded from `hints.toml` under the wsclean root so deployments can extend
/// the mappings without code changes; compiled defaults cover the common
/// cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Hints {
    pub service_hints: Vec<ServiceHint>,
    pub process_hints: Vec<ProcessHint>,
    /// Exact display names of products whose uninstallers are known to be
    /// interactive-only.
    pub interactive_products: Vec<String>,
    pub oem_profiles: Vec<OemProfile>,
}

impl Default for Hints {
    fn default() -> Self {
        let svc = |pattern: &str, service: &str| ServiceHint {
            pattern: pattern.to_string(),
            service: service.to_string(),
        };
        let procs = |pattern: &str, processes: &[&str]| ProcessHint {
            pattern: pattern.to_string(),
            processes: processes.iter().map(|p| p.to_string()).collect(),
        };
        let oem = |pattern: &str, services: &[&str], processes: &[&str]| OemPattern {
            pattern: pattern.to_string(),
            services: services.iter().map(|s| s.to_string()).collect(),
            processes: processes.iter().map(|p| p.to_string()).collect(),
        };

        Hints {
            service_hints: vec![
                svc("Office", "OfficeClickToRunSvc"),
                svc("Optimizer", "DellOptimizer"),
                svc("Core Services", "DellClientManagementService"),
            ],
            process_hints: vec![
                procs("Dell Optimizer", &["DellOptimizer", "DOCLI"]),
                procs("Dell Core Services", &["DellClientManagementService"]),
            ],
            interactive_products: vec![
                "Dell Peripheral Manager".to_string(),
                "Dell Display Manager".to_string(),
            ],
            oem_profiles: vec![OemProfile {
                name: "dell".to_string(),
                patterns: vec![
                    oem(
                        "Dell Optimizer",
                        &["DellOptimizer"],
                        &["DellOptimizer", "DOCLI"],
                    ),
                    oem(
                        "Dell Core Services",
                        &["DellClientManagementService"],
                        &["DellClientManagementService"],
                    ),
                    oem("Dell Command", &["DellCommandUpdate"], &["DellCommandUpdate"]),
                    oem("Dell Power Manager", &["DellPwrMgrSvc"], &[]),
                    oem("Dell SupportAssist", &[], &[]),
                    oem("Dell Digital Delivery", &[], &[]),
                ],
            }],
        }
    }
}

impl Hints {
    /// First service hint whose pattern appears in the display name,
    /// case-insensitively.
    pub fn service_for(&self, display_name: &str) -> Option<&str> {
        let name = display_name.to_ascii_lowercase();
        self.service_hints
            .iter()
            .find(|h| name.contains(&h.pattern.to_ascii_lowercase()))
            .map(|h| h.service.as_str())
    }

    /// First process hint whose pattern appears in the display name,
    /// case-insensitively.
    pub fn processes_for(&self, display_name: &str) -> Option<&[String]> {
        let name = display_name.to_ascii_lowercase();
        self.process_hints
            .iter()
            .find(|h| name.contains(&h.pattern.to_ascii_lowercase()))
            .map(|h| h.processes.as_slice())
    }

    pub fn is_interactive_product(&self, display_name: &str) -> bool {
        self.interactive_products
            .iter()
            .any(|p| p.eq_ignore_ascii_case(display_name))
    }

    /// The OEM pattern matching a display name, if any profile claims it.
    pub fn oem_pattern_for(&self, display_name: &str) -> Option<(&OemProfile, &OemPattern)> {
        let name = display_name.to_ascii_lowercase();
        for profile in &self.oem_profiles {
            if let Some(pattern) = profile
                .patterns
                .iter()
                .find(|p| name.contains(&p.pattern.to_ascii_lowercase()))
            {
                return Some((profile, pattern));
            }
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub hints: Hints,
    pub uninstall_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading wsclean configuration");

        let root = env::var("WSCLEAN_ROOT")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_local_dir()
                    .map(|d| d.join("wsclean"))
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_FALLBACK_ROOT))
            });
        debug!("Effective wsclean root: {}", root.display());

        let hints_path = root.join(HINTS_FILENAME);
        let hints = if hints_path.is_file() {
            match fs::read_to_string(&hints_path) {
                Ok(raw) => match toml::from_str::<Hints>(&raw) {
                    Ok(hints) => {
                        debug!("Loaded hint tables from {}", hints_path.display());
                        hints
                    }
                    Err(e) => {
                        warn!(
                            "Failed to parse {}: {}. Falling back to built-in hints.",
                            hints_path.display(),
                            e
                        );
                        Hints::default()
                    }
                },
                Err(e) => {
                    warn!(
                        "Failed to read {}: {}. Falling back to built-in hints.",
                        hints_path.display(),
                        e
                    );
                    Hints::default()
                }
            }
        } else {
            Hints::default()
        };

        let timeout_secs = env::var("WSCLEAN_UNINSTALL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_UNINSTALL_TIMEOUT_SECS);

        Ok(Self {
            root,
            hints,
            uninstall_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn hints_path(&self) -> PathBuf {
        self.root.join(HINTS_FILENAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hints_map_known_names() {
        let hints = Hints::default();
        assert_eq!(
            hints.service_for("Microsoft Office 365"),
            Some("OfficeClickToRunSvc")
        );
        assert_eq!(hints.service_for("dell optimizer"), Some("DellOptimizer"));
        assert_eq!(hints.service_for("Some Random App"), None);

        let procs = hints.processes_for("Dell Optimizer Service").unwrap();
        assert_eq!(procs, &["DellOptimizer".to_string(), "DOCLI".to_string()]);
    }

    #[test]
    fn oem_pattern_matches_by_substring() {
        let hints = Hints::default();
        let (profile, pattern) = hints.oem_pattern_for("Dell Command | Update").unwrap();
        assert_eq!(profile.name, "dell");
        assert_eq!(pattern.services, vec!["DellCommandUpdate".to_string()]);
        assert!(hints.oem_pattern_for("Google Chrome").is_none());
    }

    #[test]
    fn hints_parse_from_toml() {
        let raw = r#"
            interactive_products = ["Foo Setup"]

            [[service_hints]]
            pattern = "Bar"
            service = "BarSvc"

            [[oem_profiles]]
            name = "acme"
            [[oem_profiles.patterns]]
            pattern = "Acme Widget"
            services = ["AcmeSvc"]
        "#;
        let hints: Hints = toml::from_str(raw).unwrap();
        assert!(hints.is_interactive_product("foo setup"));
        assert_eq!(hints.service_for("BarApp Bar"), Some("BarSvc"));
        let (_, pattern) = hints.oem_pattern_for("Acme Widget 2.0").unwrap();
        assert!(pattern.processes.is_empty());
    }
}
