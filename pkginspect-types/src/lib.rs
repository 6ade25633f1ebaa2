//! Shared DTOs for the pkginspect workspace.
//!
//! # Design constraints
//! - [`results::ResultSet`] is serialized by the `json` output format.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod finding;
pub mod results;

pub use finding::{Finding, Severity, WaiverAuth};
pub use results::{
    InspectionResult, InspectionStatus, ResultSet, RunInfo, ToolInfo, Verdict, VerdictCounts,
};

/// Schema identifiers.
pub mod schema {
    pub const PKGINSPECT_RESULTS_V1: &str = "pkginspect.results.v1";
}
