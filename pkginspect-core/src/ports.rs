//! Port traits for the collaborators the pipeline does not own.

use crate::builds::BuildSpec;
use camino::{Utf8Path, Utf8PathBuf};

/// Where gathered builds landed inside the run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatheredBuilds {
    pub before: Option<Utf8PathBuf>,
    pub after: Utf8PathBuf,
}

/// Retrieves the builds named by a [`BuildSpec`] into the run directory.
pub trait BuildGatherer {
    fn gather(
        &self,
        spec: &BuildSpec,
        workdir: &Utf8Path,
        fetch_only: bool,
    ) -> anyhow::Result<GatheredBuilds>;
}

/// Architectures the platform knows about.
pub trait ArchitectureCatalog {
    fn architectures(&self) -> Vec<String>;
}
