//! The inspection registry: name, flag, applicability and entry point.

use crate::builds::BuildSpec;
use crate::error::RegistryError;
use crate::mask::InspectionMask;
use crate::ports::GatheredBuilds;
use crate::settings::InspectionSettings;
use camino::Utf8Path;
use pkginspect_types::{Finding, Severity};
use std::fmt;

/// Entry point of one inspection.
pub type InspectionFn = fn(&BuildContext<'_>) -> InspectionOutcome;

/// One registered inspection.
#[derive(Clone, Copy)]
pub struct InspectionDescriptor {
    pub name: &'static str,
    pub flag: InspectionMask,
    pub description: &'static str,
    /// Whether the inspection can run without a before build.
    pub single_build: bool,
    pub run: InspectionFn,
}

impl fmt::Debug for InspectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InspectionDescriptor")
            .field("name", &self.name)
            .field("flag", &self.flag)
            .field("single_build", &self.single_build)
            .finish_non_exhaustive()
    }
}

/// What one inspection reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionOutcome {
    pub passed: bool,
    pub findings: Vec<Finding>,
}

impl InspectionOutcome {
    /// Fails when any finding reaches `threshold`.
    pub fn judge(findings: Vec<Finding>, threshold: Severity) -> Self {
        let passed = findings.iter().all(|f| f.severity < threshold);
        Self { passed, findings }
    }
}

/// Read-only view handed to each inspection.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub spec: &'a BuildSpec,
    pub builds: &'a GatheredBuilds,
    pub workdir: &'a Utf8Path,
    pub settings: &'a InspectionSettings,
}

impl BuildContext<'_> {
    pub fn outcome(&self, findings: Vec<Finding>) -> InspectionOutcome {
        InspectionOutcome::judge(findings, self.settings.threshold)
    }

    /// An inspection that could not read its inputs always fails.
    pub fn broken(&self, err: anyhow::Error) -> InspectionOutcome {
        InspectionOutcome {
            passed: false,
            findings: vec![Finding::bad(format!("inspection could not complete: {err:#}"))],
        }
    }
}

/// Ordered inspection catalog. Iteration order is listing and execution order.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<InspectionDescriptor>,
}

impl Registry {
    /// Builds a registry, rejecting duplicate names (case-insensitive),
    /// duplicate flags and flags that are not a single bit.
    pub fn new(entries: Vec<InspectionDescriptor>) -> Result<Self, RegistryError> {
        for (i, entry) in entries.iter().enumerate() {
            if !entry.flag.is_single() {
                return Err(RegistryError::FlagNotSingleBit(entry.name.to_string()));
            }
            for earlier in &entries[..i] {
                if earlier.name.eq_ignore_ascii_case(entry.name) {
                    return Err(RegistryError::DuplicateName(entry.name.to_string()));
                }
                if earlier.flag == entry.flag {
                    return Err(RegistryError::DuplicateFlag(
                        earlier.name.to_string(),
                        entry.name.to_string(),
                    ));
                }
            }
        }
        Ok(Self { entries })
    }

    /// The catalog shipped with pkginspect.
    pub fn builtin() -> Self {
        Self {
            entries: crate::inspections::BUILTIN_INSPECTIONS.to_vec(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &InspectionDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<&InspectionDescriptor> {
        self.entries
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Union of every registered flag.
    pub fn full_mask(&self) -> InspectionMask {
        self.entries
            .iter()
            .fold(InspectionMask::NONE, |acc, d| acc | d.flag)
    }
}
