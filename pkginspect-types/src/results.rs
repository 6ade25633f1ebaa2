use crate::finding::{Finding, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    Pass,
    Fail,
    Skip,
}

impl InspectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            InspectionStatus::Pass => "pass",
            InspectionStatus::Fail => "fail",
            InspectionStatus::Skip => "skip",
        }
    }
}

/// Outcome of one registry entry for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionResult {
    pub name: String,
    pub status: InspectionStatus,

    /// Why the inspection did not run. Only set for `skip`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default)]
    pub findings: Vec<Finding>,
}

impl InspectionResult {
    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: InspectionStatus::Skip,
            reason: Some(reason.into()),
            findings: vec![],
        }
    }

    /// Highest severity among the findings, `ok` when there are none.
    pub fn worst(&self) -> Severity {
        self.findings
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Ok)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInfo {
    pub started_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// `pass` or `fail`; skips never make a run fail.
    pub status: InspectionStatus,
    pub worst: Severity,
    pub counts: VerdictCounts,
}

impl Verdict {
    pub fn from_results(results: &[InspectionResult]) -> Self {
        let mut counts = VerdictCounts::default();
        for r in results {
            match r.status {
                InspectionStatus::Pass => counts.passed += 1,
                InspectionStatus::Fail => counts.failed += 1,
                InspectionStatus::Skip => counts.skipped += 1,
            }
        }

        let worst = results
            .iter()
            .filter(|r| r.status != InspectionStatus::Skip)
            .map(InspectionResult::worst)
            .max()
            .unwrap_or(Severity::Ok);

        let status = if counts.failed > 0 {
            InspectionStatus::Fail
        } else {
            InspectionStatus::Pass
        };

        Self {
            status,
            worst,
            counts,
        }
    }
}

/// Everything one invocation produced, in registry order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSet {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: RunInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    pub after: String,
    pub product_release: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub architectures: Vec<String>,

    pub results: Vec<InspectionResult>,
    pub verdict: Verdict,
}

impl ResultSet {
    pub fn new(
        tool: ToolInfo,
        run: RunInfo,
        before: Option<String>,
        after: String,
        product_release: String,
        architectures: Vec<String>,
        results: Vec<InspectionResult>,
    ) -> Self {
        let verdict = Verdict::from_results(&results);
        Self {
            schema: crate::schema::PKGINSPECT_RESULTS_V1.to_string(),
            tool,
            run,
            before,
            after,
            product_release,
            architectures,
            results,
            verdict,
        }
    }

    pub fn failed(&self) -> bool {
        self.verdict.status == InspectionStatus::Fail
    }

    pub fn get(&self, name: &str) -> Option<&InspectionResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ran(name: &str, status: InspectionStatus, findings: Vec<Finding>) -> InspectionResult {
        InspectionResult {
            name: name.to_string(),
            status,
            reason: None,
            findings,
        }
    }

    #[test]
    fn verdict_counts_and_status() {
        let results = vec![
            ran("a", InspectionStatus::Pass, vec![Finding::info("fyi")]),
            ran("b", InspectionStatus::Fail, vec![Finding::bad("nope")]),
            InspectionResult::skipped("c", "not selected"),
        ];
        let v = Verdict::from_results(&results);
        assert_eq!(v.status, InspectionStatus::Fail);
        assert_eq!(v.worst, Severity::Bad);
        assert_eq!(
            v.counts,
            VerdictCounts {
                passed: 1,
                failed: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn skips_never_fail_a_run() {
        let results = vec![
            InspectionResult::skipped("a", "not selected"),
            InspectionResult::skipped("b", "requires paired build"),
        ];
        let v = Verdict::from_results(&results);
        assert_eq!(v.status, InspectionStatus::Pass);
        assert_eq!(v.worst, Severity::Ok);
    }

    #[test]
    fn result_set_serializes_schema_and_omits_empty_fields() {
        let set = ResultSet::new(
            ToolInfo {
                name: "pkginspect".into(),
                version: "0.1.0".into(),
            },
            RunInfo::default(),
            None,
            "foo-1.0-1.el9".into(),
            "el9".into(),
            vec![],
            vec![InspectionResult::skipped("elf", "requires paired build")],
        );
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["schema"], crate::schema::PKGINSPECT_RESULTS_V1);
        assert!(json.get("before").is_none());
        assert!(json.get("architectures").is_none());
        assert_eq!(json["results"][0]["status"], "skip");
        assert_eq!(json["results"][0]["reason"], "requires paired build");
        assert!(!set.failed());
    }
}
