//! Payload view of a gathered build.
//!
//! A gathered build holds one directory per architecture. Regular files
//! beneath them are keyed as `<arch>/<payload path>`; top-level files such as
//! logs are not payload.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub(crate) struct Payload {
    files: BTreeMap<String, Utf8PathBuf>,
}

impl Payload {
    pub(crate) fn load(root: &Utf8Path) -> anyhow::Result<Self> {
        let mut files = BTreeMap::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let arch = file_name(&entry)?;
            walk(&root.join(&arch), &arch, &mut files)?;
        }
        Ok(Self { files })
    }

    /// Keys and absolute paths, sorted by key.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Utf8Path)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Utf8Path> {
        self.files.get(key).map(Utf8PathBuf::as_path)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.files.contains_key(key)
    }

    /// Entries whose file name ends with `suffix`.
    pub(crate) fn with_suffix<'a>(
        &'a self,
        suffix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Utf8Path)> + 'a {
        self.iter().filter(move |(key, _)| key.ends_with(suffix))
    }
}

fn walk(
    dir: &Utf8Path,
    prefix: &str,
    files: &mut BTreeMap<String, Utf8PathBuf>,
) -> anyhow::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = file_name(&entry)?;
        let key = format!("{prefix}/{name}");
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&dir.join(&name), &key, files)?;
        } else if file_type.is_file() {
            files.insert(key, dir.join(&name));
        }
    }
    Ok(())
}

fn file_name(entry: &fs::DirEntry) -> anyhow::Result<String> {
    entry
        .file_name()
        .into_string()
        .map_err(|raw| anyhow::anyhow!("non-UTF-8 payload name: {}", raw.to_string_lossy()))
}

/// The payload path of a key, without its architecture.
pub(crate) fn payload_path(key: &str) -> &str {
    key.split_once('/').map_or(key, |(_, rest)| rest)
}

pub(crate) fn read_text(path: &Utf8Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {path}"))
}

pub(crate) fn sha256_file(path: &Utf8Path) -> anyhow::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).with_context(|| format!("hash {path}"))?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn keys_are_arch_prefixed_and_sorted() {
        let tmp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("x86_64/usr/bin")).unwrap();
        fs::create_dir_all(root.join("noarch/etc")).unwrap();
        fs::write(root.join("x86_64/usr/bin/tool"), "a").unwrap();
        fs::write(root.join("noarch/etc/tool.conf"), "b").unwrap();
        fs::write(root.join("build.log"), "c").unwrap();

        let payload = Payload::load(&root).unwrap();
        let keys: Vec<&str> = payload.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["noarch/etc/tool.conf", "x86_64/usr/bin/tool"]);
        assert!(payload.contains("x86_64/usr/bin/tool"));
    }

    #[test]
    fn payload_path_drops_arch() {
        assert_eq!(payload_path("x86_64/usr/bin/tool"), "usr/bin/tool");
        assert_eq!(payload_path("orphan"), "orphan");
    }

    #[test]
    fn sha256_of_known_content() {
        let tmp = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(tmp.path().join("f")).unwrap();
        fs::write(&path, "abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
