use super::payload::{Payload, read_text};
use crate::registry::{BuildContext, InspectionOutcome};
use pkginspect_types::{Finding, WaiverAuth};

const ENTRY_GROUP: &str = "[Desktop Entry]";

const REMEDY_DESKTOP: &str = "Fix the desktop entry so it opens with a [Desktop Entry] group \
and defines every required key; desktop-file-validate reports the details.";

/// Problems with one desktop entry file.
fn problems(contents: &str, required: &[String]) -> Vec<String> {
    let mut lines = contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'));

    if lines.next() != Some(ENTRY_GROUP) {
        return vec![format!("desktop file does not start with {ENTRY_GROUP}")];
    }

    let keys: Vec<&str> = lines
        .take_while(|l| !l.starts_with('['))
        .filter_map(|l| l.split_once('=').map(|(k, _)| k.trim()))
        .collect();

    required
        .iter()
        .filter(|req| !keys.contains(&req.as_str()))
        .map(|req| format!("desktop entry is missing required key `{req}`"))
        .collect()
}

pub(crate) fn desktop(ctx: &BuildContext<'_>) -> InspectionOutcome {
    let payload = match Payload::load(&ctx.builds.after) {
        Ok(payload) => payload,
        Err(err) => return ctx.broken(err),
    };

    let mut findings = Vec::new();
    for (key, path) in payload.with_suffix(".desktop") {
        let contents = match read_text(path) {
            Ok(contents) => contents,
            Err(err) => {
                findings.push(Finding::bad(format!("{err:#}")).with_path(key));
                continue;
            }
        };
        for message in problems(&contents, &ctx.settings.desktop_required_keys) {
            findings.push(
                Finding::bad(message)
                    .with_path(key)
                    .with_waiver(WaiverAuth::Anyone)
                    .with_remedy(REMEDY_DESKTOP),
            );
        }
    }
    ctx.outcome(findings)
}
