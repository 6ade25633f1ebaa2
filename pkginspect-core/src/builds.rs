//! Build specification: which builds are under test, their product release,
//! and the architectures to restrict to.

use crate::error::{InspectError, UsageError, ValidationError};
use crate::ports::ArchitectureCatalog;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    pub before: Option<String>,
    pub after: String,
    pub product_release: String,
    /// `None` means every architecture.
    pub architectures: Option<Vec<String>>,
}

impl BuildSpec {
    /// Validates the positional builds and options of one invocation.
    ///
    /// Order: argument count, fetch-only constraint, product release,
    /// architecture restriction.
    pub fn resolve(
        positional: &[String],
        release: Option<&str>,
        arches: Option<&str>,
        fetch_only: bool,
        catalog: &dyn ArchitectureCatalog,
    ) -> Result<Self, InspectError> {
        let (before, after) = resolve_builds(positional)?;

        if fetch_only && before.is_some() {
            return Err(ValidationError::IncompatibleMode.into());
        }

        let product_release = match release {
            Some(explicit) => explicit.to_string(),
            None => derive_product_release(before.as_deref(), &after)?,
        };

        let architectures = arches
            .map(|list| restrict_architectures(list, catalog))
            .transpose()?;

        debug!(
            before = before.as_deref().unwrap_or("-"),
            after = after.as_str(),
            product_release = product_release.as_str(),
            "resolved build specification"
        );

        Ok(Self {
            before,
            after,
            product_release,
            architectures,
        })
    }

    pub fn is_paired(&self) -> bool {
        self.before.is_some()
    }

    /// Whether payload for `arch` should be gathered and inspected.
    pub fn allows_arch(&self, arch: &str) -> bool {
        self.architectures
            .as_ref()
            .is_none_or(|list| list.iter().any(|a| a == arch))
    }
}

/// One positional is the after build; two are before and after.
pub fn resolve_builds(positional: &[String]) -> Result<(Option<String>, String), UsageError> {
    match positional {
        [after] => Ok((None, after.clone())),
        [before, after] => Ok((Some(before.clone()), after.clone())),
        other => Err(UsageError::InvalidArgumentCount(other.len())),
    }
}

/// Release tag of a build id: text after the last `.`, cut at the first `/`.
pub fn release_tag(build: &str) -> Option<&str> {
    let (_, tail) = build.rsplit_once('.')?;
    let tag = tail.split('/').next().unwrap_or_default();
    (!tag.is_empty()).then_some(tag)
}

/// Derives the product release from the after build, checking that a before
/// build carries the same tag.
pub fn derive_product_release(
    before: Option<&str>,
    after: &str,
) -> Result<String, ValidationError> {
    let after_tag = release_tag(after).ok_or_else(|| ValidationError::EmptyRelease {
        role: "after",
        build: after.to_string(),
    })?;

    if let Some(before) = before {
        let before_tag = release_tag(before).ok_or_else(|| ValidationError::EmptyRelease {
            role: "before",
            build: before.to_string(),
        })?;
        if before_tag != after_tag {
            return Err(ValidationError::ReleaseMismatch {
                before: before_tag.to_string(),
                after: after_tag.to_string(),
            });
        }
    }

    Ok(after_tag.to_string())
}

/// Validates a comma-separated architecture list against the catalog.
/// Membership is case-sensitive; input order and duplicates are kept.
pub fn restrict_architectures(
    list: &str,
    catalog: &dyn ArchitectureCatalog,
) -> Result<Vec<String>, ValidationError> {
    let known = catalog.architectures();
    list.split(',')
        .map(|token| {
            if known.iter().any(|k| k == token) {
                Ok(token.to_string())
            } else {
                Err(ValidationError::UnsupportedArchitecture(token.to_string()))
            }
        })
        .collect()
}
