//! Clap-free settings for one inspection run.

use crate::mask::InspectionMask;
use crate::workdir::DEFAULT_MODE;
use camino::Utf8PathBuf;
use pkginspect_types::Severity;

/// Default scratch root for run directories.
pub const DEFAULT_WORKDIR: &str = "/var/tmp/pkginspect";

/// Knobs read by the built-in inspections.
#[derive(Debug, Clone)]
pub struct InspectionSettings {
    /// Findings at or above this severity fail their inspection.
    pub threshold: Severity,

    /// Approved license identifiers. Empty disables the approval check.
    pub approved_licenses: Vec<String>,

    /// Keys every `.desktop` entry must define.
    pub desktop_required_keys: Vec<String>,

    /// Payload path prefixes whose changes need security review.
    pub security_path_prefixes: Vec<String>,
}

impl Default for InspectionSettings {
    fn default() -> Self {
        Self {
            threshold: Severity::Verify,
            approved_licenses: Vec::new(),
            desktop_required_keys: vec!["Name".to_string(), "Type".to_string()],
            security_path_prefixes: Vec::new(),
        }
    }
}

/// Settings for [`run_session`](crate::pipeline::run_session).
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Base directory; each run gets its own directory beneath it.
    pub workdir: Utf8PathBuf,
    pub workdir_mode: u32,

    /// Positional build ids: after, or before and after.
    pub builds: Vec<String>,
    pub release: Option<String>,
    /// Raw comma-separated architecture list.
    pub arches: Option<String>,

    pub selection: InspectionMask,
    pub fetch_only: bool,
    pub keep: bool,

    pub inspection: InspectionSettings,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            workdir: Utf8PathBuf::from(DEFAULT_WORKDIR),
            workdir_mode: DEFAULT_MODE,
            builds: Vec::new(),
            release: None,
            arches: None,
            selection: InspectionMask::ALL,
            fetch_only: false,
            keep: false,
            inspection: InspectionSettings::default(),
        }
    }
}

impl RunSettings {
    /// Applies implied options: fetch-only always keeps the run directory.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.fetch_only {
            self.keep = true;
        }
        self
    }
}
