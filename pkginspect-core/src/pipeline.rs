//! The inspection session: resolve builds, create the run directory, gather,
//! execute selected inspections, tear down.
//!
//! Everything outside the filesystem scratch area goes through port traits.

use crate::builds::BuildSpec;
use crate::error::InspectError;
use crate::mask::InspectionMask;
use crate::ports::{ArchitectureCatalog, BuildGatherer};
use crate::registry::{BuildContext, InspectionDescriptor, InspectionOutcome, Registry};
use crate::settings::RunSettings;
use crate::workdir::Workdir;
use anyhow::Context;
use camino::Utf8PathBuf;
use chrono::Utc;
use pkginspect_types::{InspectionResult, InspectionStatus, ResultSet, RunInfo, ToolInfo};
use tracing::debug;

/// Why an inspection did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotSelected,
    RequiresPair,
}

impl SkipReason {
    pub fn label(self) -> &'static str {
        match self {
            SkipReason::NotSelected => "not selected",
            SkipReason::RequiresPair => "requires paired build",
        }
    }
}

/// Per-descriptor state during one pass over the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectionState {
    Pending,
    Skipped(SkipReason),
    Ran(InspectionOutcome),
}

/// Decides whether `descriptor` runs, before anything is invoked.
pub fn initial_state(
    descriptor: &InspectionDescriptor,
    mask: InspectionMask,
    paired: bool,
) -> InspectionState {
    if !mask.contains(descriptor.flag) {
        InspectionState::Skipped(SkipReason::NotSelected)
    } else if !paired && !descriptor.single_build {
        InspectionState::Skipped(SkipReason::RequiresPair)
    } else {
        InspectionState::Pending
    }
}

fn into_result(descriptor: &InspectionDescriptor, state: InspectionState) -> InspectionResult {
    match state {
        InspectionState::Skipped(reason) => {
            InspectionResult::skipped(descriptor.name, reason.label())
        }
        InspectionState::Ran(outcome) => InspectionResult {
            name: descriptor.name.to_string(),
            status: if outcome.passed {
                InspectionStatus::Pass
            } else {
                InspectionStatus::Fail
            },
            reason: None,
            findings: outcome.findings,
        },
        // Pending never survives `execute`.
        InspectionState::Pending => InspectionResult::skipped(descriptor.name, "not run"),
    }
}

/// Runs every selected, applicable inspection in registry order.
/// A failing inspection never stops the loop.
pub fn execute(
    registry: &Registry,
    mask: InspectionMask,
    ctx: &BuildContext<'_>,
) -> Vec<InspectionResult> {
    let paired = ctx.spec.is_paired();

    registry
        .iter()
        .map(|descriptor| {
            let state = match initial_state(descriptor, mask, paired) {
                InspectionState::Pending => {
                    debug!(inspection = descriptor.name, "running inspection");
                    let outcome = (descriptor.run)(ctx);
                    debug!(
                        inspection = descriptor.name,
                        passed = outcome.passed,
                        findings = outcome.findings.len(),
                        "finished inspection"
                    );
                    InspectionState::Ran(outcome)
                }
                InspectionState::Skipped(reason) => {
                    debug!(
                        inspection = descriptor.name,
                        reason = reason.label(),
                        "skipping inspection"
                    );
                    InspectionState::Skipped(reason)
                }
                ran @ InspectionState::Ran(_) => ran,
            };
            into_result(descriptor, state)
        })
        .collect()
}

/// Outcome of [`run_session`].
#[derive(Debug)]
pub struct SessionOutcome {
    /// `None` in fetch-only mode.
    pub results: Option<ResultSet>,
    /// Run directory left on disk, when retention was requested.
    pub retained: Option<Utf8PathBuf>,
}

impl SessionOutcome {
    pub fn failed(&self) -> bool {
        self.results.as_ref().is_some_and(ResultSet::failed)
    }
}

/// Runs one inspection session.
///
/// Validation happens before the run directory exists. Once created, the run
/// directory is torn down exactly once whether or not a later stage fails.
/// A kept directory is reported through [`InspectError::Retained`] when a
/// later stage fails.
pub fn run_session(
    settings: &RunSettings,
    registry: &Registry,
    gatherer: &dyn BuildGatherer,
    catalog: &dyn ArchitectureCatalog,
    tool: ToolInfo,
) -> Result<SessionOutcome, InspectError> {
    let spec = BuildSpec::resolve(
        &settings.builds,
        settings.release.as_deref(),
        settings.arches.as_deref(),
        settings.fetch_only,
        catalog,
    )?;

    let workdir = Workdir::create(&settings.workdir, settings.workdir_mode, settings.keep)?;
    let results = run_in_workdir(settings, registry, gatherer, &spec, &workdir, tool);
    let retained = workdir.teardown();

    match (results, retained) {
        (Ok(results), retained) => Ok(SessionOutcome { results, retained }),
        (Err(err), Some(path)) => Err(InspectError::Retained {
            path,
            source: Box::new(err),
        }),
        (Err(err), None) => Err(err),
    }
}

fn run_in_workdir(
    settings: &RunSettings,
    registry: &Registry,
    gatherer: &dyn BuildGatherer,
    spec: &BuildSpec,
    workdir: &Workdir,
    tool: ToolInfo,
) -> Result<Option<ResultSet>, InspectError> {
    let started = Utc::now();

    let builds = gatherer
        .gather(spec, workdir.path(), settings.fetch_only)
        .context("failed to gather specified builds")?;

    if settings.fetch_only {
        debug!(path = builds.after.as_str(), "fetch only, skipping inspections");
        return Ok(None);
    }

    let ctx = BuildContext {
        spec,
        builds: &builds,
        workdir: workdir.path(),
        settings: &settings.inspection,
    };
    let results = execute(registry, settings.selection, &ctx);

    let ended = Utc::now();
    let run = RunInfo {
        started_at: started.to_rfc3339(),
        ended_at: Some(ended.to_rfc3339()),
        duration_ms: u64::try_from((ended - started).num_milliseconds()).ok(),
    };

    Ok(Some(ResultSet::new(
        tool,
        run,
        spec.before.clone(),
        spec.after.clone(),
        spec.product_release.clone(),
        spec.architectures.clone().unwrap_or_default(),
        results,
    )))
}
