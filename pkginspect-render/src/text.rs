use pkginspect_types::{Finding, InspectionStatus, ResultSet};

/// Body lines of a finding are indented under its number.
const INDENT: &str = "   ";

pub fn render_text(results: &ResultSet) -> anyhow::Result<String> {
    let mut out = String::new();

    match &results.before {
        Some(before) => out.push_str(&format!("{} -> {}\n", before, results.after)),
        None => out.push_str(&format!("{}\n", results.after)),
    }
    out.push_str(&format!("Product release: {}\n", results.product_release));
    if !results.architectures.is_empty() {
        out.push_str(&format!(
            "Architectures: {}\n",
            results.architectures.join(", ")
        ));
    }

    for r in results
        .results
        .iter()
        .filter(|r| r.status != InspectionStatus::Skip)
    {
        let header = format!("{}:", r.name);
        out.push_str(&format!("\n{}\n{}\n", header, "-".repeat(header.len())));

        if r.findings.is_empty() {
            out.push_str(&format!("{INDENT}Result: {}\n", r.worst()));
            continue;
        }
        for (i, f) in r.findings.iter().enumerate() {
            push_finding(&mut out, i + 1, f);
        }
    }

    let skipped: Vec<String> = results
        .results
        .iter()
        .filter(|r| r.status == InspectionStatus::Skip)
        .map(|r| match &r.reason {
            Some(reason) => format!("{} ({})", r.name, reason),
            None => r.name.clone(),
        })
        .collect();
    if !skipped.is_empty() {
        out.push_str(&format!("\nSkipped: {}\n", skipped.join(", ")));
    }

    let v = &results.verdict;
    out.push_str(&format!(
        "\nOverall: {} ({} passed, {} failed, {} skipped; worst {})\n",
        v.status.label().to_ascii_uppercase(),
        v.counts.passed,
        v.counts.failed,
        v.counts.skipped,
        v.worst
    ));

    Ok(out)
}

fn push_finding(out: &mut String, n: usize, f: &Finding) {
    out.push_str(&format!("{n}) {}\n\n", f.message));
    out.push_str(&format!("{INDENT}Result: {}\n", f.severity));
    out.push_str(&format!(
        "{INDENT}Waiver Authorization: {}\n",
        f.waiver_auth.label()
    ));
    if let Some(path) = &f.path {
        out.push_str(&format!("{INDENT}Path: {path}\n"));
    }
    if let Some(details) = &f.details {
        out.push_str(&format!("\n{INDENT}Details:\n"));
        for line in details.lines() {
            out.push_str(&format!("{INDENT}{line}\n"));
        }
    }
    if let Some(remedy) = &f.remedy {
        out.push_str(&format!("\n{INDENT}Suggested Remedy:\n{INDENT}{remedy}\n"));
    }
    out.push('\n');
}
