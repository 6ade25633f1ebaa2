//! Default port implementations: local build directories and a static
//! architecture list.

use crate::builds::BuildSpec;
use crate::ports::{ArchitectureCatalog, BuildGatherer, GatheredBuilds};
use anyhow::bail;
use camino::Utf8Path;
use fs_err as fs;
use tracing::{debug, info};

/// Architectures accepted by `-a` unless configuration overrides them.
pub const PLATFORM_ARCHITECTURES: &[&str] = &[
    "aarch64", "alpha", "armv7hl", "i386", "i686", "noarch", "ppc64", "ppc64le", "riscv64",
    "s390x", "sparc64", "src", "x86_64",
];

#[derive(Debug, Clone)]
pub struct StaticArchitectureCatalog {
    arches: Vec<String>,
}

impl StaticArchitectureCatalog {
    pub fn new(arches: Vec<String>) -> Self {
        Self { arches }
    }
}

impl Default for StaticArchitectureCatalog {
    fn default() -> Self {
        Self::new(PLATFORM_ARCHITECTURES.iter().map(|a| a.to_string()).collect())
    }
}

impl ArchitectureCatalog for StaticArchitectureCatalog {
    fn architectures(&self) -> Vec<String> {
        self.arches.clone()
    }
}

/// Gathers builds that are local directories laid out as `<arch>/<payload>`.
#[derive(Debug, Clone, Default)]
pub struct LocalBuildGatherer;

impl BuildGatherer for LocalBuildGatherer {
    fn gather(
        &self,
        spec: &BuildSpec,
        workdir: &Utf8Path,
        fetch_only: bool,
    ) -> anyhow::Result<GatheredBuilds> {
        if fetch_only {
            copy_build(&spec.after, workdir, spec)?;
            return Ok(GatheredBuilds {
                before: None,
                after: workdir.to_path_buf(),
            });
        }

        let before = match &spec.before {
            Some(id) => {
                let dest = workdir.join("before");
                copy_build(id, &dest, spec)?;
                Some(dest)
            }
            None => None,
        };

        let after = workdir.join("after");
        copy_build(&spec.after, &after, spec)?;

        Ok(GatheredBuilds { before, after })
    }
}

fn copy_build(id: &str, dest: &Utf8Path, spec: &BuildSpec) -> anyhow::Result<()> {
    let src = Utf8Path::new(id);
    if !src.is_dir() {
        bail!("build `{id}` is not a readable local directory (remote builds are not supported)");
    }

    fs::create_dir_all(dest)?;

    let mut arches = 0usize;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let name = utf8_name(&entry)?;
        let from = src.join(&name);
        let to = dest.join(&name);

        if entry.file_type()?.is_dir() {
            if !spec.allows_arch(&name) {
                debug!(build = id, arch = name.as_str(), "skipping architecture");
                continue;
            }
            copy_tree(&from, &to)?;
            if fs::read_dir(&to)?.next().is_none() {
                fs::remove_dir(&to)?;
                debug!(build = id, arch = name.as_str(), "pruned empty architecture");
                continue;
            }
            arches += 1;
        } else {
            copy_entry(&entry, &from, &to)?;
        }
    }

    info!(build = id, dest = dest.as_str(), arches, "gathered build");
    Ok(())
}

fn copy_tree(from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let name = utf8_name(&entry)?;
        let (src, dest) = (from.join(&name), to.join(&name));
        if entry.file_type()?.is_dir() {
            copy_tree(&src, &dest)?;
        } else {
            copy_entry(&entry, &src, &dest)?;
        }
    }
    Ok(())
}

fn copy_entry(entry: &fs::DirEntry, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()> {
    let file_type = entry.file_type()?;
    if file_type.is_file() {
        fs::copy(from, to)?;
    } else if file_type.is_symlink() {
        copy_symlink(from, to)?;
    } else {
        bail!("unsupported special file in build: {from}");
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()> {
    let target = fs::read_link(from)?;
    fs::os::unix::fs::symlink(&target, to)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(from: &Utf8Path, _to: &Utf8Path) -> anyhow::Result<()> {
    bail!("symlinks are not supported on this platform: {from}")
}

fn utf8_name(entry: &fs::DirEntry) -> anyhow::Result<String> {
    entry
        .file_name()
        .into_string()
        .map_err(|raw| anyhow::anyhow!("non-UTF-8 file name in build: {}", raw.to_string_lossy()))
}
