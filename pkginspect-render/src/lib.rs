//! Output formats for pkginspect result sets, and the dispatcher that writes
//! the chosen one to its destination.

mod markdown;
mod text;

use anyhow::Context;
use camino::Utf8PathBuf;
use pkginspect_types::ResultSet;
use std::io::Write;
use tracing::debug;

pub use markdown::render_markdown;
pub use text::render_text;

/// Renders a result set to its full output.
pub type RenderFn = fn(&ResultSet) -> anyhow::Result<String>;

/// One registered output format. Ids are dense and start at 0.
#[derive(Debug, Clone, Copy)]
pub struct FormatDescriptor {
    pub name: &'static str,
    pub id: usize,
    pub description: &'static str,
    pub render: RenderFn,
}

/// Id used when no format is requested.
pub const DEFAULT_FORMAT: usize = 0;

pub static FORMATS: &[FormatDescriptor] = &[
    FormatDescriptor {
        name: "text",
        id: 0,
        description: "Plain text, one section per inspection with its findings, waiver \
            authority, details and suggested remedy.",
        render: render_text,
    },
    FormatDescriptor {
        name: "json",
        id: 1,
        description: "Pretty-printed JSON result set (schema pkginspect.results.v1).",
        render: render_json,
    },
    FormatDescriptor {
        name: "markdown",
        id: 2,
        description: "Markdown summary with a results table and per-inspection findings, \
            suitable for review comments.",
        render: render_markdown,
    },
];

/// Looks up a format by name, ignoring case.
pub fn find_format(name: &str) -> Option<&'static FormatDescriptor> {
    FORMATS.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

pub fn format_by_id(id: usize) -> Option<&'static FormatDescriptor> {
    FORMATS.get(id).filter(|f| f.id == id)
}

/// Where rendered output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    /// Created or truncated.
    File(Utf8PathBuf),
}

pub fn render_json(results: &ResultSet) -> anyhow::Result<String> {
    let mut out = serde_json::to_string_pretty(results).context("serialize result set")?;
    out.push('\n');
    Ok(out)
}

/// Renders `results` with format `id` (default 0) and writes it out.
/// Without a result set nothing is written.
pub fn dispatch(
    results: Option<&ResultSet>,
    id: Option<usize>,
    destination: &Destination,
) -> anyhow::Result<()> {
    let Some(results) = results else {
        debug!("no result set, nothing to render");
        return Ok(());
    };

    let id = id.unwrap_or(DEFAULT_FORMAT);
    let format = format_by_id(id).with_context(|| format!("unknown output format id {id}"))?;
    let rendered = (format.render)(results)?;
    debug!(format = format.name, bytes = rendered.len(), "rendered results");

    match destination {
        Destination::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| stdout.flush())
                .context("write results to stdout")?;
        }
        Destination::File(path) => {
            fs_err::write(path, rendered).with_context(|| format!("write results to {path}"))?;
        }
    }
    Ok(())
}
