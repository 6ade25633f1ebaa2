//! Configuration file loading for pkginspect.
//!
//! Reads the TOML file named by `-c`, or the system default. Command-line
//! flags take precedence over anything set here.

use anyhow::Context;
use camino::Utf8Path;
use fs_err as fs;
use pkginspect_core::UsageError;
use pkginspect_core::adapters::StaticArchitectureCatalog;
use pkginspect_core::settings::InspectionSettings;
use pkginspect_types::Severity;
use serde::Deserialize;
use tracing::debug;

/// Configuration read when `-c` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/pkginspect/pkginspect.toml";

/// Top-level configuration from pkginspect.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PkginspectConfig {
    pub common: CommonConfig,
    pub architectures: ArchitecturesConfig,
    pub license: LicenseConfig,
    pub desktop: DesktopConfig,
    pub files: FilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommonConfig {
    /// Scratch root; a leading `~` is expanded. Overridden by `-w`.
    pub workdir: Option<String>,

    /// Findings at or above this severity fail their inspection.
    pub threshold: Severity,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            workdir: None,
            threshold: Severity::Verify,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArchitecturesConfig {
    /// Architectures accepted by `-a`. Empty means the platform list.
    pub known: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    pub approved: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    pub required_keys: Vec<String>,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            required_keys: InspectionSettings::default().desktop_required_keys,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub security_path_prefixes: Vec<String>,
}

impl PkginspectConfig {
    pub fn inspection_settings(&self) -> InspectionSettings {
        InspectionSettings {
            threshold: self.common.threshold,
            approved_licenses: self.license.approved.clone(),
            desktop_required_keys: self.desktop.required_keys.clone(),
            security_path_prefixes: self.files.security_path_prefixes.clone(),
        }
    }

    pub fn architecture_catalog(&self) -> StaticArchitectureCatalog {
        if self.architectures.known.is_empty() {
            StaticArchitectureCatalog::default()
        } else {
            StaticArchitectureCatalog::new(self.architectures.known.clone())
        }
    }
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<PkginspectConfig> {
    let config: PkginspectConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Loads the file named by `-c`, or the default path.
///
/// An unreadable explicit file and a missing default file are both usage
/// errors, with different messages.
pub fn resolve_config(explicit: Option<&Utf8Path>) -> Result<PkginspectConfig, UsageError> {
    let path = explicit.unwrap_or(Utf8Path::new(DEFAULT_CONFIG_PATH));

    if explicit.is_none() && !path.exists() {
        return Err(UsageError::Config {
            path: path.to_path_buf(),
            message: "unable to read the default config file; is a pkginspect data package \
                      installed?"
                .to_string(),
        });
    }

    let contents = fs::read_to_string(path).map_err(|err| UsageError::Config {
        path: path.to_path_buf(),
        message: format!("specified config file is unreadable: {}", err.kind()),
    })?;

    let config = parse_config(&contents).map_err(|err| UsageError::Config {
        path: path.to_path_buf(),
        message: format!("{err:#}"),
    })?;
    debug!(path = path.as_str(), "loaded configuration");
    Ok(config)
}
