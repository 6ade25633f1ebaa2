//! Built-in inspection catalog.
//!
//! Each inspection reads the gathered builds through a
//! [`BuildContext`](crate::registry::BuildContext) and reports findings.
//! Registry order here is listing and execution order.

mod desktop;
mod elf;
mod files;
mod manpage;
mod payload;
mod specfile;

use crate::mask::InspectionMask;
use crate::registry::InspectionDescriptor;

/// Stable flag positions of the built-in inspections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Builtin {
    Specname = 0,
    Disttag = 1,
    License = 2,
    Manpage = 3,
    Desktop = 4,
    Elf = 5,
    AddedFiles = 6,
    RemovedFiles = 7,
    ChangedFiles = 8,
}

impl Builtin {
    pub const fn flag(self) -> InspectionMask {
        InspectionMask::bit(self as u32)
    }
}

pub static BUILTIN_INSPECTIONS: &[InspectionDescriptor] = &[
    InspectionDescriptor {
        name: "specname",
        flag: Builtin::Specname.flag(),
        description: "Ensure the spec file name conforms to the NAME.spec naming format.",
        single_build: true,
        run: specfile::specname,
    },
    InspectionDescriptor {
        name: "disttag",
        flag: Builtin::Disttag.flag(),
        description: "Check that the Release: tag in the spec file includes the %{?dist} \
            macro so the product release is part of the build.",
        single_build: true,
        run: specfile::disttag,
    },
    InspectionDescriptor {
        name: "license",
        flag: Builtin::License.flag(),
        description: "Verify the License: tag in the spec file is present and, when an \
            approved list is configured, uses only approved license identifiers.",
        single_build: true,
        run: specfile::license,
    },
    InspectionDescriptor {
        name: "manpage",
        flag: Builtin::Manpage.flag(),
        description: "Check that man pages are installed in the /usr/share/man section \
            directory matching their file name suffix.",
        single_build: true,
        run: manpage::manpage,
    },
    InspectionDescriptor {
        name: "desktop",
        flag: Builtin::Desktop.flag(),
        description: "Perform structural checks on *.desktop files: a [Desktop Entry] group \
            that defines every required key.",
        single_build: true,
        run: desktop::desktop,
    },
    InspectionDescriptor {
        name: "elf",
        flag: Builtin::Elf.flag(),
        description: "Compare ELF headers between builds and report changes in class, \
            byte order or target machine.",
        single_build: false,
        run: elf::elf,
    },
    InspectionDescriptor {
        name: "addedfiles",
        flag: Builtin::AddedFiles.flag(),
        description: "Report files added to the after build; new files under security \
            paths require verification.",
        single_build: false,
        run: files::addedfiles,
    },
    InspectionDescriptor {
        name: "removedfiles",
        flag: Builtin::RemovedFiles.flag(),
        description: "Report files missing from the after build; removals under security \
            paths are flagged as bad.",
        single_build: false,
        run: files::removedfiles,
    },
    InspectionDescriptor {
        name: "changedfiles",
        flag: Builtin::ChangedFiles.flag(),
        description: "Report files whose content changed between builds; changes under \
            security paths require verification.",
        single_build: false,
        run: files::changedfiles,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_follow_registry_order() {
        for (i, d) in BUILTIN_INSPECTIONS.iter().enumerate() {
            assert_eq!(d.flag, InspectionMask::bit(i as u32), "{}", d.name);
        }
    }

    #[test]
    fn single_build_inspections_come_first() {
        let first_pair = BUILTIN_INSPECTIONS
            .iter()
            .position(|d| !d.single_build)
            .unwrap();
        assert!(BUILTIN_INSPECTIONS[first_pair..].iter().all(|d| !d.single_build));
        assert_eq!(BUILTIN_INSPECTIONS[first_pair].name, "elf");
    }
}
