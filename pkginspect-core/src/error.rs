//! Error types for pkginspect-core.
//!
//! Fatal errors stop an invocation before any inspection runs and map to exit
//! code 2:
//! - Usage: bad arguments, unreadable configuration, unknown output format
//! - Validation: unknown inspection, unsupported architecture, release mismatch, incompatible modes
//! - Resource: the working directory could not be created
//!
//! Inspection failures are not errors. They are recorded in the result set and
//! map to exit code 1.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Exit code when at least one selected inspection failed.
pub const EXIT_INSPECTION_FAILED: u8 = 1;

/// Exit code for every fatal error.
pub const EXIT_FATAL: u8 = 2;

/// The top-level error type for a pkginspect invocation.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// A collaborator (build gatherer, renderer) failed.
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),

    /// A stage failed after the run directory was created with keep set.
    #[error("{source}")]
    Retained {
        path: Utf8PathBuf,
        source: Box<InspectError>,
    },
}

/// Bad flags, arguments or configuration.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("invalid before and after build specification: expected 1 or 2 builds, got {0}")]
    InvalidArgumentCount(usize),

    /// Missing, unreadable or malformed configuration file.
    #[error("{message} ({path})")]
    Config { path: Utf8PathBuf, message: String },

    #[error("unable to expand workdir: `{0}`")]
    WorkdirExpansion(String),

    #[error("invalid output format: `{0}`")]
    UnknownFormat(String),
}

/// Requests that are well-formed but cannot be honoured.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the -T and -E options are mutually exclusive")]
    InvalidMode,

    #[error("unknown test specified: `{0}`")]
    UnknownInspection(String),

    #[error("unsupported architecture specified: `{0}`")]
    UnsupportedArchitecture(String),

    #[error("product release for {role} build ({build}) is empty")]
    EmptyRelease { role: &'static str, build: String },

    #[error("builds have different product releases ({before} != {after})")]
    ReleaseMismatch { before: String, after: String },

    #[error("fetch only mode takes a single build specification")]
    IncompatibleMode,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("unable to create directory {path}: {source}")]
    DirectoryCreation {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A registry definition that breaks the name/flag invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("inspection `{0}` must have exactly one flag bit set")]
    FlagNotSingleBit(String),

    #[error("inspections `{0}` and `{1}` share a flag")]
    DuplicateFlag(String, String),

    #[error("inspection name `{0}` is registered twice")]
    DuplicateName(String),
}

impl InspectError {
    /// Usage and validation errors are reported with a pointer to `--help`.
    pub fn wants_help_hint(&self) -> bool {
        match self {
            InspectError::Usage(_) | InspectError::Validation(_) => true,
            InspectError::Retained { source, .. } => source.wants_help_hint(),
            InspectError::Resource(_) | InspectError::Internal(_) => false,
        }
    }

    /// Run directory left on disk by the failed invocation.
    pub fn retained(&self) -> Option<&Utf8Path> {
        match self {
            InspectError::Retained { path, .. } => Some(path.as_path()),
            _ => None,
        }
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        EXIT_FATAL
    }
}
