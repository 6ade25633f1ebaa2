//! Inspections over the spec files shipped in the source payload.

use super::payload::{Payload, payload_path, read_text};
use crate::registry::{BuildContext, InspectionOutcome};
use camino::Utf8Path;
use pkginspect_types::{Finding, WaiverAuth};

const REMEDY_SPECNAME: &str =
    "Rename the spec file so it matches the package name followed by `.spec`.";
const REMEDY_DISTTAG: &str =
    "Add `%{?dist}` to the Release: tag so the product release lands in the build.";
const REMEDY_LICENSE: &str =
    "Set the License: tag to an approved license identifier or expression.";

/// Spec files of the after build, with their contents.
fn spec_files(ctx: &BuildContext<'_>) -> anyhow::Result<Vec<(String, String)>> {
    let payload = Payload::load(&ctx.builds.after)?;
    payload
        .with_suffix(".spec")
        .map(|(key, path)| Ok((key.to_string(), read_text(path)?)))
        .collect()
}

/// Values of every `Tag:` line, matched case-insensitively.
pub(crate) fn tag_values<'a>(contents: &'a str, tag: &str) -> Vec<&'a str> {
    contents
        .lines()
        .filter_map(|line| {
            let (name, value) = line.trim_start().split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case(tag)
                .then_some(value.trim())
        })
        .collect()
}

/// Package name of an N-V-R build id (or a local path to one).
pub(crate) fn nvr_name(build: &str) -> Option<&str> {
    let base = Utf8Path::new(build.trim_end_matches('/')).file_name()?;
    let (nv, _release) = base.rsplit_once('-')?;
    let (name, _version) = nv.rsplit_once('-')?;
    (!name.is_empty()).then_some(name)
}

pub(crate) fn specname(ctx: &BuildContext<'_>) -> InspectionOutcome {
    let specs = match spec_files(ctx) {
        Ok(specs) => specs,
        Err(err) => return ctx.broken(err),
    };
    if specs.is_empty() {
        return ctx.outcome(vec![]);
    }

    let Some(name) = nvr_name(&ctx.spec.after) else {
        return ctx.outcome(vec![Finding::verify(format!(
            "unable to derive the package name from build `{}`",
            ctx.spec.after
        ))]);
    };

    let expected = format!("{name}.spec");
    let findings = specs
        .iter()
        .filter(|(key, _)| Utf8Path::new(payload_path(key)).file_name() != Some(expected.as_str()))
        .map(|(key, _)| {
            Finding::bad(format!("spec file name does not match package name; expected {expected}"))
                .with_path(key.as_str())
                .with_waiver(WaiverAuth::Anyone)
                .with_remedy(REMEDY_SPECNAME)
        })
        .collect();
    ctx.outcome(findings)
}

pub(crate) fn disttag(ctx: &BuildContext<'_>) -> InspectionOutcome {
    let specs = match spec_files(ctx) {
        Ok(specs) => specs,
        Err(err) => return ctx.broken(err),
    };

    let mut findings = Vec::new();
    for (key, contents) in &specs {
        let releases = tag_values(contents, "Release");
        if releases.is_empty() {
            findings.push(
                Finding::bad("spec file has no Release: tag")
                    .with_path(key.as_str())
                    .with_remedy(REMEDY_DISTTAG),
            );
            continue;
        }
        for release in releases.into_iter().filter(|r| !r.contains("%{?dist}")) {
            findings.push(
                Finding::bad("Release: tag does not reference %{?dist}")
                    .with_path(key.as_str())
                    .with_details(format!("Release: {release}"))
                    .with_remedy(REMEDY_DISTTAG),
            );
        }
    }
    ctx.outcome(findings)
}

/// License identifiers of an expression, without operators and exceptions.
fn license_ids(expr: &str) -> Vec<&str> {
    let mut ids = Vec::new();
    let mut skip_next = false;
    for word in expr.split(|c: char| c.is_whitespace() || c == '(' || c == ')') {
        if word.is_empty() {
            continue;
        }
        if skip_next {
            skip_next = false;
            continue;
        }
        if word.eq_ignore_ascii_case("and") || word.eq_ignore_ascii_case("or") {
            continue;
        }
        if word.eq_ignore_ascii_case("with") {
            skip_next = true;
            continue;
        }
        ids.push(word);
    }
    ids
}

pub(crate) fn license(ctx: &BuildContext<'_>) -> InspectionOutcome {
    let specs = match spec_files(ctx) {
        Ok(specs) => specs,
        Err(err) => return ctx.broken(err),
    };
    let approved = &ctx.settings.approved_licenses;

    let mut findings = Vec::new();
    for (key, contents) in &specs {
        let licenses = tag_values(contents, "License");
        if licenses.iter().all(|l| l.is_empty()) {
            findings.push(
                Finding::bad("spec file has no License: tag")
                    .with_path(key.as_str())
                    .with_remedy(REMEDY_LICENSE),
            );
            continue;
        }
        if approved.is_empty() {
            continue;
        }
        for expr in licenses {
            for id in license_ids(expr) {
                if !approved.iter().any(|a| a == id) {
                    findings.push(
                        Finding::bad(format!("unapproved license identifier `{id}`"))
                            .with_path(key.as_str())
                            .with_details(format!("License: {expr}"))
                            .with_remedy(REMEDY_LICENSE),
                    );
                }
            }
        }
    }
    ctx.outcome(findings)
}
