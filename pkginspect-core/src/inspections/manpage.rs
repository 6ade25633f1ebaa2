use super::payload::{Payload, payload_path};
use crate::registry::{BuildContext, InspectionOutcome};
use pkginspect_types::{Finding, WaiverAuth};

const MAN_ROOT: &str = "usr/share/man/";
const COMPRESSION_SUFFIXES: &[&str] = &[".gz", ".bz2", ".xz", ".zst", ".lzma", ".Z"];

const REMEDY_MAN_PATH: &str = "Install the man page beneath /usr/share/man in the manN \
directory whose section number matches the page's file name suffix.";

/// Section letter-and-digit suffix of a man page file name, compression removed.
fn page_section(file_name: &str) -> Option<&str> {
    let name = COMPRESSION_SUFFIXES
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .unwrap_or(file_name);
    let (_, section) = name.rsplit_once('.')?;
    (!section.is_empty()).then_some(section)
}

/// Checks one payload path; `None` when it is not a sectioned man page.
fn check(path: &str) -> Option<Result<(), String>> {
    let rest = path.strip_prefix(MAN_ROOT)?;
    let mut parts = rest.rsplit('/');
    let file = parts.next()?;
    let dir_section = parts.next()?.strip_prefix("man")?;
    if dir_section.is_empty() {
        return None;
    }

    Some(match page_section(file) {
        Some(section) if section.starts_with(dir_section) => Ok(()),
        Some(section) => Err(format!(
            "man page section `{section}` does not match directory man{dir_section}"
        )),
        None => Err(format!("man page in man{dir_section} has no section suffix")),
    })
}

pub(crate) fn manpage(ctx: &BuildContext<'_>) -> InspectionOutcome {
    let payload = match Payload::load(&ctx.builds.after) {
        Ok(payload) => payload,
        Err(err) => return ctx.broken(err),
    };

    let findings = payload
        .iter()
        .filter_map(|(key, _)| match check(payload_path(key))? {
            Ok(()) => None,
            Err(message) => Some(
                Finding::bad(message)
                    .with_path(key)
                    .with_waiver(WaiverAuth::Anyone)
                    .with_remedy(REMEDY_MAN_PATH),
            ),
        })
        .collect();
    ctx.outcome(findings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_sections_pass() {
        assert_eq!(check("usr/share/man/man1/foo.1.gz"), Some(Ok(())));
        assert_eq!(check("usr/share/man/man3/foo.3p"), Some(Ok(())));
        assert_eq!(check("usr/share/man/de/man8/foo.8.xz"), Some(Ok(())));
    }

    #[test]
    fn mismatched_sections_fail() {
        assert!(matches!(check("usr/share/man/man1/foo.8.gz"), Some(Err(_))));
        assert!(matches!(check("usr/share/man/man5/foo"), Some(Err(_))));
    }

    #[test]
    fn non_man_paths_are_ignored() {
        assert_eq!(check("usr/bin/foo"), None);
        assert_eq!(check("usr/share/man/whatis"), None);
        assert_eq!(check("usr/share/man/de/foo.1"), None);
    }
}
