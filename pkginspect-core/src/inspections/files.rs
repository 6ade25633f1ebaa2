//! Payload differences between paired builds: added, removed and changed files.

use super::payload::{Payload, payload_path, sha256_file};
use crate::registry::{BuildContext, InspectionOutcome};
use camino::Utf8Path;
use pkginspect_types::{Finding, Severity, WaiverAuth};

const REMEDY_ADDEDFILES: &str =
    "Confirm the new file is intended; files under security-sensitive paths need review.";
const REMEDY_REMOVEDFILES: &str =
    "Confirm the file was removed on purpose; other packages may depend on it.";
const REMEDY_CHANGEDFILES: &str =
    "Confirm the change is intended; files under security-sensitive paths need review.";

fn is_security_path(ctx: &BuildContext<'_>, key: &str) -> bool {
    let path = payload_path(key);
    ctx.settings
        .security_path_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.trim_start_matches('/')))
}

fn load_pair(ctx: &BuildContext<'_>) -> anyhow::Result<Option<(Payload, Payload)>> {
    let Some(before) = ctx.builds.before.as_deref() else {
        return Ok(None);
    };
    Ok(Some((Payload::load(before)?, Payload::load(&ctx.builds.after)?)))
}

/// Runs `diff` over the loaded pair, turning load errors into a failed outcome.
fn with_pair(
    ctx: &BuildContext<'_>,
    diff: impl FnOnce(&Payload, &Payload) -> anyhow::Result<Vec<Finding>>,
) -> InspectionOutcome {
    match load_pair(ctx) {
        Ok(None) => ctx.outcome(vec![]),
        Ok(Some((before, after))) => match diff(&before, &after) {
            Ok(findings) => ctx.outcome(findings),
            Err(err) => ctx.broken(err),
        },
        Err(err) => ctx.broken(err),
    }
}

pub(crate) fn addedfiles(ctx: &BuildContext<'_>) -> InspectionOutcome {
    with_pair(ctx, |before, after| {
        Ok(after
            .iter()
            .filter(|(key, _)| !before.contains(key))
            .map(|(key, _)| {
                let finding = if is_security_path(ctx, key) {
                    Finding::verify("new file under a security path")
                        .with_waiver(WaiverAuth::Security)
                } else {
                    Finding::info("new file")
                };
                finding.with_path(key).with_remedy(REMEDY_ADDEDFILES)
            })
            .collect())
    })
}

pub(crate) fn removedfiles(ctx: &BuildContext<'_>) -> InspectionOutcome {
    with_pair(ctx, |before, after| {
        Ok(before
            .iter()
            .filter(|(key, _)| !after.contains(key))
            .map(|(key, _)| {
                let finding = if is_security_path(ctx, key) {
                    Finding::bad("file removed from a security path")
                        .with_waiver(WaiverAuth::Security)
                } else {
                    Finding::verify("file removed").with_waiver(WaiverAuth::Anyone)
                };
                finding.with_path(key).with_remedy(REMEDY_REMOVEDFILES)
            })
            .collect())
    })
}

fn changed(key: &str, before: &Utf8Path, after: &Utf8Path) -> anyhow::Result<Option<String>> {
    let (old, new) = (sha256_file(before)?, sha256_file(after)?);
    if old == new {
        return Ok(None);
    }
    Ok(Some(format!("{key}: sha256 {old} -> {new}")))
}

pub(crate) fn changedfiles(ctx: &BuildContext<'_>) -> InspectionOutcome {
    with_pair(ctx, |before, after| {
        let mut findings = Vec::new();
        for (key, after_path) in after.iter() {
            let Some(before_path) = before.get(key) else {
                continue;
            };
            let Some(details) = changed(key, before_path, after_path)? else {
                continue;
            };
            let (severity, auth) = if is_security_path(ctx, key) {
                (Severity::Verify, WaiverAuth::Security)
            } else {
                (Severity::Info, WaiverAuth::NotWaivable)
            };
            findings.push(
                Finding::new(severity, "file content changed")
                    .with_waiver(auth)
                    .with_path(key)
                    .with_details(details)
                    .with_remedy(REMEDY_CHANGEDFILES),
            );
        }
        Ok(findings)
    })
}
