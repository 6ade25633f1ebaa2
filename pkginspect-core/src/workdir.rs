//! Scratch directory lifecycle.
//!
//! A [`Workdir`] owns one run directory beneath the configured base. It is
//! torn down exactly once: either explicitly through [`Workdir::teardown`] or
//! by `Drop` when an early return abandons the handle.

use crate::error::{ResourceError, UsageError};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::DirBuilder;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Permission bits for created directories.
pub const DEFAULT_MODE: u32 = 0o755;

#[derive(Debug)]
pub struct Workdir {
    path: Utf8PathBuf,
    keep: bool,
    finished: bool,
}

impl Workdir {
    /// Creates `base` (and missing parents), then a unique run directory in it.
    pub fn create(base: &Utf8Path, mode: u32, keep: bool) -> Result<Self, ResourceError> {
        make_dir(base, mode, true)?;

        let path = base.join(format!("run.{}", Uuid::new_v4().simple()));
        make_dir(&path, mode, false)?;
        debug!(path = path.as_str(), keep, "created run directory");

        Ok(Self {
            path,
            keep,
            finished: false,
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Removes the run directory, or retains it when keep was requested.
    /// Returns the retained path.
    pub fn teardown(mut self) -> Option<Utf8PathBuf> {
        self.finish()
    }

    fn finish(&mut self) -> Option<Utf8PathBuf> {
        if self.finished {
            return None;
        }
        self.finished = true;

        if self.keep {
            info!(path = self.path.as_str(), "keeping working directory");
            return Some(self.path.clone());
        }

        match fs_err::remove_dir_all(&self.path) {
            Ok(()) => debug!(path = self.path.as_str(), "removed run directory"),
            Err(err) => warn!(
                path = self.path.as_str(),
                error = %err,
                "error removing working directory"
            ),
        }
        None
    }
}

impl Drop for Workdir {
    fn drop(&mut self) {
        self.finish();
    }
}

fn make_dir(path: &Utf8Path, mode: u32, recursive: bool) -> Result<(), ResourceError> {
    let mut builder = DirBuilder::new();
    builder.recursive(recursive);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder
        .create(path)
        .map_err(|source| ResourceError::DirectoryCreation {
            path: path.to_path_buf(),
            source,
        })
}

/// Expands a leading `~` or `~/` against `$HOME`. Other paths pass through.
pub fn expand_workdir(raw: &str) -> Result<Utf8PathBuf, UsageError> {
    let Some(rest) = raw.strip_prefix('~') else {
        return Ok(Utf8PathBuf::from(raw));
    };
    if !(rest.is_empty() || rest.starts_with('/')) {
        return Err(UsageError::WorkdirExpansion(raw.to_string()));
    }

    let home = std::env::var("HOME")
        .ok()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| UsageError::WorkdirExpansion(raw.to_string()))?;

    Ok(Utf8PathBuf::from(format!("{home}{rest}")))
}
