use pkginspect_types::{InspectionStatus, ResultSet};

pub fn render_markdown(results: &ResultSet) -> anyhow::Result<String> {
    let mut out = String::new();
    out.push_str("# pkginspect results\n\n");

    if let Some(before) = &results.before {
        out.push_str(&format!("- Before: `{}`\n", before));
    }
    out.push_str(&format!("- After: `{}`\n", results.after));
    out.push_str(&format!(
        "- Product release: `{}`\n",
        results.product_release
    ));
    if !results.architectures.is_empty() {
        out.push_str(&format!(
            "- Architectures: {}\n",
            results.architectures.join(", ")
        ));
    }
    let v = &results.verdict;
    out.push_str(&format!(
        "- Verdict: **{}** (worst `{}`)\n",
        v.status.label(),
        v.worst
    ));
    out.push_str(&format!(
        "- Inspections: {} passed, {} failed, {} skipped\n\n",
        v.counts.passed, v.counts.failed, v.counts.skipped
    ));

    out.push_str("| Inspection | Status | Findings | Note |\n");
    out.push_str("|---|---|---|---|\n");
    for r in &results.results {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            r.name,
            r.status.label(),
            r.findings.len(),
            r.reason.as_deref().unwrap_or("")
        ));
    }

    for r in results
        .results
        .iter()
        .filter(|r| r.status != InspectionStatus::Skip && !r.findings.is_empty())
    {
        out.push_str(&format!("\n## {}\n\n", r.name));
        for f in &r.findings {
            let loc = f
                .path
                .as_ref()
                .map(|p| format!(" `{}`", p))
                .unwrap_or_default();
            out.push_str(&format!("- **{}**{}: {}\n", f.severity, loc, f.message));
            if let Some(details) = &f.details {
                out.push_str(&format!("  - Details: {}\n", details.replace('\n', " ")));
            }
            if let Some(remedy) = &f.remedy {
                out.push_str(&format!("  - Remedy: {}\n", remedy));
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::result_set;

    #[test]
    fn summary_table_lists_every_inspection() {
        let out = render_markdown(&result_set()).unwrap();
        assert!(out.starts_with("# pkginspect results\n\n- Before: `foo-0.9-1.el9`\n"));
        assert!(out.contains("- Verdict: **fail** (worst `BAD`)\n"));
        assert!(out.contains("| license | fail | 1 |  |\n"));
        assert!(out.contains("| elf | skip | 0 | not selected |\n"));
    }

    #[test]
    fn findings_sections_only_for_inspections_with_findings() {
        let out = render_markdown(&result_set()).unwrap();
        assert!(out.contains(
            "\n## license\n\n- **BAD** `src/foo.spec`: unapproved license identifier `Foo`\n"
        ));
        assert!(out.contains("  - Remedy: Use an approved license.\n"));
        assert!(out.contains("\n## manpage\n\n- **INFO**: new page\n"));
        assert!(!out.contains("## elf"));
    }
}
