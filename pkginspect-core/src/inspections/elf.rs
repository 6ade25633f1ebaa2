//! ELF header comparison between paired builds.

use super::payload::Payload;
use crate::registry::{BuildContext, InspectionOutcome};
use camino::Utf8Path;
use fs_err as fs;
use pkginspect_types::{Finding, WaiverAuth};
use std::io::Read;

const ELF_MAGIC: &[u8; 4] = b"\x7fELF";
const HEADER_LEN: usize = 20;

/// Identity fields of an ELF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ElfIdent {
    class: u8,
    data: u8,
    machine: u16,
}

impl ElfIdent {
    fn parse(header: &[u8]) -> Option<Self> {
        if header.len() < HEADER_LEN || &header[..4] != ELF_MAGIC {
            return None;
        }
        let raw = [header[18], header[19]];
        let machine = match header[5] {
            2 => u16::from_be_bytes(raw),
            _ => u16::from_le_bytes(raw),
        };
        Some(Self {
            class: header[4],
            data: header[5],
            machine,
        })
    }

    fn class_label(self) -> &'static str {
        match self.class {
            1 => "ELF32",
            2 => "ELF64",
            _ => "unknown class",
        }
    }
}

fn read_ident(path: &Utf8Path) -> anyhow::Result<Option<ElfIdent>> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    fs::File::open(path)?
        .take(HEADER_LEN as u64)
        .read_to_end(&mut header)?;
    Ok(ElfIdent::parse(&header))
}

fn compare(key: &str, before: Option<ElfIdent>, after: Option<ElfIdent>) -> Option<Finding> {
    let message = match (before, after) {
        (Some(b), Some(a)) if b == a => return None,
        (Some(b), Some(a)) if b.class != a.class => format!(
            "ELF class changed from {} to {}",
            b.class_label(),
            a.class_label()
        ),
        (Some(b), Some(a)) if b.data != a.data => "ELF byte order changed".to_string(),
        (Some(b), Some(a)) => format!(
            "ELF machine changed from {:#06x} to {:#06x}",
            b.machine, a.machine
        ),
        (Some(_), None) => {
            return Some(
                Finding::verify("file is no longer an ELF object")
                    .with_path(key)
                    .with_waiver(WaiverAuth::Anyone),
            );
        }
        (None, _) => return None,
    };
    Some(Finding::bad(message).with_path(key))
}

fn compare_payloads(before: &Utf8Path, after: &Utf8Path) -> anyhow::Result<Vec<Finding>> {
    let before = Payload::load(before)?;
    let after = Payload::load(after)?;

    let mut findings = Vec::new();
    for (key, after_path) in after.iter() {
        let Some(before_path) = before.get(key) else {
            continue;
        };
        findings.extend(compare(key, read_ident(before_path)?, read_ident(after_path)?));
    }
    Ok(findings)
}

pub(crate) fn elf(ctx: &BuildContext<'_>) -> InspectionOutcome {
    let Some(before) = ctx.builds.before.as_deref() else {
        return ctx.outcome(vec![]);
    };
    match compare_payloads(before, &ctx.builds.after) {
        Ok(findings) => ctx.outcome(findings),
        Err(err) => ctx.broken(err),
    }
}
