//! Embeddable core library for pkginspect.
//!
//! Clap-free and synchronous. Hosts build a [`RunSettings`](settings::RunSettings),
//! pick port implementations and call [`run_session`](pipeline::run_session).
//!
//! # Port traits
//!
//! Collaborators live behind the traits in [`ports`]:
//! - [`BuildGatherer`](ports::BuildGatherer) retrieves builds into the run directory
//! - [`ArchitectureCatalog`](ports::ArchitectureCatalog) lists known architectures
//!
//! The [`adapters`] module provides local-directory and static implementations.
//!
//! # Building blocks
//!
//! - [`resolve_selection`](selection::resolve_selection) turns `-T`/`-E` lists into an [`InspectionMask`]
//! - [`BuildSpec::resolve`](builds::BuildSpec::resolve) validates builds, release and architectures
//! - [`Workdir`](workdir::Workdir) owns the run directory lifecycle
//! - [`execute`](pipeline::execute) runs the registry against gathered builds

pub mod adapters;
pub mod builds;
pub mod error;
pub mod inspections;
pub mod mask;
pub mod pipeline;
pub mod ports;
pub mod registry;
pub mod selection;
pub mod settings;
pub mod workdir;

pub use error::{InspectError, ResourceError, UsageError, ValidationError};
pub use mask::InspectionMask;
pub use registry::{BuildContext, InspectionDescriptor, InspectionOutcome, Registry};

// Re-export the result model so embedders don't need pkginspect-types directly.
pub use pkginspect_types::{Finding, InspectionResult, ResultSet, Severity, ToolInfo};
