//! The `-l` listing of output formats and inspections.

use pkginspect_core::Registry;
use pkginspect_render::FORMATS;

/// Column limit for wrapped descriptions.
pub const WRAP_WIDTH: usize = 80;

const NAME_INDENT: &str = "    ";
const DESC_INDENT: &str = "        ";

/// Word-wraps `text` so no line, indent included, exceeds `width` columns
/// unless a single word is longer.
pub fn wrap(text: &str, indent: &str, width: usize) -> String {
    let mut out = String::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && indent.len() + line.len() + 1 + word.len() > width {
            out.push_str(indent);
            out.push_str(&line);
            out.push('\n');
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        out.push_str(indent);
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn push_section<'a>(
    out: &mut String,
    title: &str,
    entries: impl Iterator<Item = (&'a str, &'a str)>,
) {
    out.push_str(title);
    out.push('\n');
    for (i, (name, description)) in entries.enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(NAME_INDENT);
        out.push_str(name);
        out.push('\n');
        out.push_str(&wrap(description, DESC_INDENT, WRAP_WIDTH));
    }
}

pub fn render_listing(registry: &Registry) -> String {
    let mut out = String::new();
    push_section(
        &mut out,
        "Available output formats:",
        FORMATS.iter().map(|f| (f.name, f.description)),
    );
    out.push('\n');
    push_section(
        &mut out,
        "Available inspections:",
        registry.iter().map(|d| (d.name, d.description)),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wrap_respects_width() {
        let text = "one two three four five six seven eight nine ten";
        let wrapped = wrap(text, "  ", 16);
        assert_eq!(wrapped, "  one two three\n  four five six\n  seven eight\n  nine ten\n");
        assert!(wrapped.lines().all(|l| l.len() <= 16));
    }

    #[test]
    fn wrap_keeps_long_words_whole() {
        assert_eq!(wrap("supercalifragilistic", "    ", 10), "    supercalifragilistic\n");
        assert_eq!(wrap("", "    ", 10), "");
    }

    #[test]
    fn listing_has_both_sections_in_registry_order() {
        let registry = Registry::builtin();
        let out = render_listing(&registry);

        assert!(out.starts_with("Available output formats:\n    text\n        "));
        let inspections = out.find("\nAvailable inspections:\n").unwrap();
        let names: Vec<&str> = out[inspections..]
            .lines()
            .filter(|l| l.starts_with(NAME_INDENT) && !l.starts_with(DESC_INDENT))
            .map(str::trim)
            .collect();
        let expected: Vec<&str> = registry.iter().map(|d| d.name).collect();
        assert_eq!(names, expected);
        assert!(out.lines().all(|l| l.len() <= WRAP_WIDTH));
    }
}
