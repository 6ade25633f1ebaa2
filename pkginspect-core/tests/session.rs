//! End-to-end session tests over local build trees.

use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use pkginspect_core::adapters::{LocalBuildGatherer, StaticArchitectureCatalog};
use pkginspect_core::builds::BuildSpec;
use pkginspect_core::pipeline::{SessionOutcome, run_session};
use pkginspect_core::ports::{BuildGatherer, GatheredBuilds};
use pkginspect_core::selection::{SelectionRequest, resolve_selection};
use pkginspect_core::settings::RunSettings;
use pkginspect_core::{InspectError, InspectionMask, Registry, ToolInfo, ValidationError};
use pkginspect_types::{InspectionStatus, ResultSet, Severity};
use pretty_assertions::assert_eq;
use std::cell::Cell;
use tempfile::TempDir;

const SPEC: &str = "Name: foo\nVersion: 1.0\nRelease: 1%{?dist}\nLicense: MIT\n";

fn elf_header(machine: u16) -> Vec<u8> {
    let mut h = vec![0u8; 64];
    h[..4].copy_from_slice(b"\x7fELF");
    h[4] = 2;
    h[5] = 1;
    h[18..20].copy_from_slice(&machine.to_le_bytes());
    h
}

fn write(path: &Utf8Path, contents: impl AsRef<[u8]>) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

struct Fixture {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        Self { _tmp: tmp, root }
    }

    fn base(&self) -> Utf8PathBuf {
        self.root.join("work")
    }

    /// A build tree that passes every single-build inspection.
    fn build(&self, nvr: &str) -> Utf8PathBuf {
        let dir = self.root.join("builds").join(nvr);
        write(&dir.join("src/foo.spec"), SPEC);
        write(&dir.join("x86_64/usr/bin/foo"), elf_header(0x3e));
        write(&dir.join("x86_64/usr/share/man/man1/foo.1.gz"), "page");
        write(
            &dir.join("noarch/usr/share/applications/foo.desktop"),
            "[Desktop Entry]\nName=Foo\nType=Application\n",
        );
        write(&dir.join("noarch/etc/foo.conf"), "a=1\n");
        dir
    }

    fn settings(&self, builds: &[&Utf8Path], mask: InspectionMask) -> RunSettings {
        RunSettings {
            workdir: self.base(),
            builds: builds.iter().map(|b| b.to_string()).collect(),
            selection: mask,
            ..RunSettings::default()
        }
    }

    fn run_dirs(&self) -> Vec<String> {
        match fs::read_dir(self.base()) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().into_string().unwrap())
                .collect(),
            Err(_) => vec![],
        }
    }
}

fn tool() -> ToolInfo {
    ToolInfo {
        name: "pkginspect".to_string(),
        version: "test".to_string(),
    }
}

fn run(settings: &RunSettings) -> Result<SessionOutcome, InspectError> {
    run_session(
        settings,
        &Registry::builtin(),
        &LocalBuildGatherer,
        &StaticArchitectureCatalog::default(),
        tool(),
    )
}

fn statuses(results: &ResultSet) -> Vec<(&str, InspectionStatus, Option<&str>)> {
    results
        .results
        .iter()
        .map(|r| (r.name.as_str(), r.status, r.reason.as_deref()))
        .collect()
}

fn mask(request: SelectionRequest) -> InspectionMask {
    resolve_selection(&[request], &Registry::builtin()).unwrap()
}

#[derive(Default)]
struct CountingGatherer {
    calls: Cell<usize>,
}

impl BuildGatherer for CountingGatherer {
    fn gather(
        &self,
        spec: &BuildSpec,
        workdir: &Utf8Path,
        fetch_only: bool,
    ) -> anyhow::Result<GatheredBuilds> {
        self.calls.set(self.calls.get() + 1);
        LocalBuildGatherer.gather(spec, workdir, fetch_only)
    }
}

#[test]
fn include_list_runs_only_named_inspections() {
    let fx = Fixture::new();
    let after = fx.build("foo-1.0-1.el9");
    let settings = fx.settings(
        &[&after],
        mask(SelectionRequest::Include("license,manpage".into())),
    );

    let outcome = run(&settings).unwrap();
    let results = outcome.results.as_ref().unwrap();

    use InspectionStatus::{Pass, Skip};
    assert_eq!(
        statuses(results),
        vec![
            ("specname", Skip, Some("not selected")),
            ("disttag", Skip, Some("not selected")),
            ("license", Pass, None),
            ("manpage", Pass, None),
            ("desktop", Skip, Some("not selected")),
            ("elf", Skip, Some("not selected")),
            ("addedfiles", Skip, Some("not selected")),
            ("removedfiles", Skip, Some("not selected")),
            ("changedfiles", Skip, Some("not selected")),
        ]
    );
    assert!(!outcome.failed());
    assert_eq!(results.product_release, "el9");
    assert_eq!(results.before, None);
    assert_eq!(outcome.retained, None);
    assert!(fx.run_dirs().is_empty(), "run directory was not removed");
}

#[test]
fn exclude_list_skips_elf_in_pair_mode() {
    let fx = Fixture::new();
    let before = fx.build("foo-0.9-1.el9");
    let after = fx.build("foo-1.0-1.el9");
    write(&after.join("x86_64/usr/bin/foo-helper"), "#!/bin/sh\n");
    let settings = fx.settings(
        &[&before, &after],
        mask(SelectionRequest::Exclude("elf".into())),
    );

    let outcome = run(&settings).unwrap();
    let results = outcome.results.unwrap();

    let elf = results.get("elf").unwrap();
    assert_eq!(elf.status, InspectionStatus::Skip);
    assert_eq!(elf.reason.as_deref(), Some("not selected"));

    for name in ["specname", "disttag", "license", "manpage", "desktop", "removedfiles", "changedfiles"] {
        assert_eq!(results.get(name).unwrap().status, InspectionStatus::Pass, "{name}");
    }

    let added = results.get("addedfiles").unwrap();
    assert_eq!(added.status, InspectionStatus::Pass);
    assert_eq!(added.findings.len(), 1);
    assert_eq!(added.findings[0].severity, Severity::Info);
    assert_eq!(added.findings[0].path.as_deref(), Some("x86_64/usr/bin/foo-helper"));
}

#[test]
fn single_build_skips_pair_only_inspections() {
    let fx = Fixture::new();
    let after = fx.build("foo-1.0-1.el9");
    let outcome = run(&fx.settings(&[&after], InspectionMask::ALL)).unwrap();
    let results = outcome.results.unwrap();

    for r in &results.results {
        let pair_only = ["elf", "addedfiles", "removedfiles", "changedfiles"].contains(&r.name.as_str());
        if pair_only {
            assert_eq!(r.status, InspectionStatus::Skip, "{}", r.name);
            assert_eq!(r.reason.as_deref(), Some("requires paired build"));
        } else {
            assert_eq!(r.status, InspectionStatus::Pass, "{}", r.name);
        }
    }
    assert_eq!(results.verdict.counts.skipped, 4);
}

#[test]
fn failing_inspection_does_not_stop_the_loop() {
    let fx = Fixture::new();
    let after = fx.build("foo-1.0-1.el9");
    write(&after.join("src/foo.spec"), "Name: foo\nRelease: 1\nLicense: MIT\n");
    write(&after.join("x86_64/usr/share/man/man1/foo.8.gz"), "page");

    let outcome = run(&fx.settings(&[&after], InspectionMask::ALL)).unwrap();
    assert!(outcome.failed());
    let results = outcome.results.unwrap();
    assert_eq!(results.get("disttag").unwrap().status, InspectionStatus::Fail);
    assert_eq!(results.get("manpage").unwrap().status, InspectionStatus::Fail);
    assert_eq!(results.get("desktop").unwrap().status, InspectionStatus::Pass);
    assert_eq!(results.verdict.worst, Severity::Bad);
}

#[test]
fn security_paths_escalate_file_changes() {
    let fx = Fixture::new();
    let before = fx.build("foo-0.9-1.el9");
    let after = fx.build("foo-1.0-1.el9");
    write(&before.join("noarch/etc/sudoers.d/foo"), "foo ALL=(ALL) ALL\n");
    write(&after.join("noarch/etc/foo.conf"), "a=2\n");

    let mut settings = fx.settings(&[&before, &after], InspectionMask::ALL);
    settings.inspection.security_path_prefixes = vec!["/etc/".to_string()];

    let results = run(&settings).unwrap().results.unwrap();

    let removed = results.get("removedfiles").unwrap();
    assert_eq!(removed.status, InspectionStatus::Fail);
    assert_eq!(removed.findings[0].severity, Severity::Bad);

    let changed = results.get("changedfiles").unwrap();
    assert_eq!(changed.status, InspectionStatus::Fail);
    assert_eq!(changed.findings[0].path.as_deref(), Some("noarch/etc/foo.conf"));
    assert!(changed.findings[0].details.as_deref().unwrap().contains("sha256"));
}

#[test]
fn machine_change_fails_elf() {
    let fx = Fixture::new();
    let before = fx.build("foo-0.9-1.el9");
    let after = fx.build("foo-1.0-1.el9");
    write(&after.join("x86_64/usr/bin/foo"), elf_header(0xb7));

    let results = run(&fx.settings(&[&before, &after], InspectionMask::ALL))
        .unwrap()
        .results
        .unwrap();
    assert_eq!(results.get("elf").unwrap().status, InspectionStatus::Fail);
}

#[test]
fn fetch_only_keeps_builds_and_produces_no_results() {
    let fx = Fixture::new();
    let after = fx.build("foo-1.0-1.el9");
    let settings = RunSettings {
        fetch_only: true,
        ..fx.settings(&[&after], InspectionMask::ALL)
    }
    .normalized();

    let outcome = run(&settings).unwrap();
    assert!(outcome.results.is_none());
    assert!(!outcome.failed());
    let kept = outcome.retained.unwrap();
    assert!(kept.join("src/foo.spec").is_file());
}

#[test]
fn fetch_only_pair_fails_before_gathering() {
    let fx = Fixture::new();
    let before = fx.build("foo-0.9-1.el9");
    let after = fx.build("foo-1.0-1.el9");
    let settings = RunSettings {
        fetch_only: true,
        ..fx.settings(&[&before, &after], InspectionMask::ALL)
    }
    .normalized();

    let gatherer = CountingGatherer::default();
    let err = run_session(
        &settings,
        &Registry::builtin(),
        &gatherer,
        &StaticArchitectureCatalog::default(),
        tool(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        InspectError::Validation(ValidationError::IncompatibleMode)
    ));
    assert_eq!(gatherer.calls.get(), 0);
    assert!(!fx.base().exists());
}

#[test]
fn release_mismatch_fails_before_workdir_exists() {
    let fx = Fixture::new();
    let before = fx.build("foo-0.9-1.el8");
    let after = fx.build("foo-1.0-1.el9");

    let err = run(&fx.settings(&[&before, &after], InspectionMask::ALL)).unwrap_err();
    assert!(matches!(
        err,
        InspectError::Validation(ValidationError::ReleaseMismatch { .. })
    ));
    assert!(!fx.base().exists());
}

#[test]
fn gather_failure_still_tears_down() {
    let fx = Fixture::new();
    let missing = fx.root.join("builds/bar-1.0-1.el9");

    let err = run(&fx.settings(&[&missing], InspectionMask::ALL)).unwrap_err();
    assert!(matches!(err, InspectError::Internal(_)));
    assert!(err.to_string().starts_with("failed to gather specified builds"));
    assert!(fx.base().is_dir());
    assert!(fx.run_dirs().is_empty());
}

#[test]
fn gather_failure_with_keep_reports_retained_directory() {
    let fx = Fixture::new();
    let missing = fx.root.join("builds/bar-1.0-1.el9");
    let settings = RunSettings {
        fetch_only: true,
        ..fx.settings(&[&missing], InspectionMask::ALL)
    }
    .normalized();

    let err = run(&settings).unwrap_err();
    assert!(err.to_string().starts_with("failed to gather specified builds"));

    let kept = err.retained().unwrap();
    assert!(kept.is_dir());
    assert_eq!(kept.parent(), Some(fx.base().as_path()));
    assert_eq!(fx.run_dirs(), vec![kept.file_name().unwrap().to_string()]);
}

#[test]
fn keep_retains_run_directory() {
    let fx = Fixture::new();
    let after = fx.build("foo-1.0-1.el9");
    let settings = RunSettings {
        keep: true,
        ..fx.settings(&[&after], InspectionMask::ALL)
    };

    let outcome = run(&settings).unwrap();
    let kept = outcome.retained.unwrap();
    assert!(kept.join("after/src/foo.spec").is_file());
    assert_eq!(fx.run_dirs().len(), 1);
}

#[test]
fn architecture_restriction_is_recorded() {
    let fx = Fixture::new();
    let after = fx.build("foo-1.0-1.el9");
    let settings = RunSettings {
        arches: Some("noarch".to_string()),
        ..fx.settings(&[&after], InspectionMask::ALL)
    };

    let results = run(&settings).unwrap().results.unwrap();
    assert_eq!(results.architectures, vec!["noarch"]);
    // No `src` payload gathered, so the spec-file inspections have nothing to check.
    assert_eq!(results.get("license").unwrap().findings.len(), 0);
}
