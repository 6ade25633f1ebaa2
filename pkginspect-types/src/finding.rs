use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a single finding, ordered from harmless to blocking.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Ok,
    Info,
    Waived,
    Verify,
    Bad,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Info => "INFO",
            Severity::Waived => "WAIVED",
            Severity::Verify => "VERIFY",
            Severity::Bad => "BAD",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who may waive a finding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaiverAuth {
    #[default]
    NotWaivable,
    Anyone,
    Security,
}

impl WaiverAuth {
    pub fn label(self) -> &'static str {
        match self {
            WaiverAuth::NotWaivable => "Not Waivable",
            WaiverAuth::Anyone => "Anyone",
            WaiverAuth::Security => "Security",
        }
    }
}

/// One observation reported by an inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,

    #[serde(default)]
    pub waiver_auth: WaiverAuth,

    pub message: String,

    /// Payload-relative path the finding is about, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Extra output captured while inspecting (diffs, parser messages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Suggested correction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remedy: Option<String>,
}

impl Finding {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            waiver_auth: WaiverAuth::NotWaivable,
            message: message.into(),
            path: None,
            details: None,
            remedy: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn verify(message: impl Into<String>) -> Self {
        Self::new(Severity::Verify, message)
    }

    pub fn bad(message: impl Into<String>) -> Self {
        Self::new(Severity::Bad, message)
    }

    pub fn with_waiver(mut self, auth: WaiverAuth) -> Self {
        self.waiver_auth = auth;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remedy = Some(remedy.into());
        self
    }
}
