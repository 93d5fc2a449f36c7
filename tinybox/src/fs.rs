//! Filestore: a flat, capped view over the `./fs/` directory (spec.md §3,
//! §6). No subdirectories, whole-file-in-RAM reads, at most 64 entries.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::FsError;

pub const MAX_ENTRIES: usize = 64;
pub const MAX_NAME_LEN: usize = 63;

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

pub struct Filestore {
    root: PathBuf,
    entries: Vec<FileInfo>,
}

impl Filestore {
    /// Scan `root` and cache up to `MAX_ENTRIES` entries. `root` is created
    /// if it doesn't exist yet, matching the teacher's `mkfs` convention of
    /// never failing just because the target is missing on first run.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, FsError> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|source| FsError::Io {
                path: root.clone(),
                source,
            })?;
        }
        let mut store = Self {
            root,
            entries: Vec::new(),
        };
        store.rescan()?;
        Ok(store)
    }

    pub fn rescan(&mut self) -> Result<(), FsError> {
        let read_dir = fs::read_dir(&self.root).map_err(|source| FsError::Io {
            path: self.root.clone(),
            source,
        })?;
        let mut entries = Vec::new();
        let mut ignored = 0usize;
        for entry in read_dir {
            let entry = entry.map_err(|source| FsError::Io {
                path: self.root.clone(),
                source,
            })?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.len() > MAX_NAME_LEN || !name.is_ascii() {
                log::warn!("filestore: skipping {name} (name exceeds {MAX_NAME_LEN} ASCII bytes)");
                continue;
            }
            if entries.len() >= MAX_ENTRIES {
                ignored += 1;
                continue;
            }
            let meta = entry.metadata().map_err(|source| FsError::Io {
                path: entry.path(),
                source,
            })?;
            entries.push(FileInfo {
                name,
                size: meta.len(),
                modified: meta.modified().ok(),
            });
        }
        if ignored > 0 {
            log::warn!("filestore: {ignored} file(s) beyond the {MAX_ENTRIES}-entry cap were ignored");
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        self.entries = entries;
        Ok(())
    }

    pub fn list(&self) -> &[FileInfo] {
        &self.entries
    }

    fn validate_name(name: &str) -> Result<(), FsError> {
        if name.len() > MAX_NAME_LEN || !name.is_ascii() {
            return Err(FsError::NameTooLong(name.to_string()));
        }
        Ok(())
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>, FsError> {
        if !self.entries.iter().any(|e| e.name == name) {
            return Err(FsError::FileNotFound(name.to_string()));
        }
        let path = self.path_for(name);
        fs::read(&path).map_err(|source| FsError::Io { path, source })
    }

    pub fn write(&mut self, name: &str, data: &[u8]) -> Result<(), FsError> {
        Self::validate_name(name)?;
        if self.entries.len() >= MAX_ENTRIES && !self.entries.iter().any(|e| e.name == name) {
            return Err(FsError::StoreFull);
        }
        let path = self.path_for(name);
        fs::write(&path, data).map_err(|source| FsError::Io { path, source })?;
        self.rescan()
    }

    pub fn touch(&mut self, name: &str) -> Result<(), FsError> {
        if self.entries.iter().any(|e| e.name == name) {
            let path = self.path_for(name);
            fs::File::options()
                .append(true)
                .open(&path)
                .map_err(|source| FsError::Io { path, source })?;
            return self.rescan();
        }
        self.write(name, &[])
    }

    pub fn remove(&mut self, name: &str) -> Result<(), FsError> {
        if !self.entries.iter().any(|e| e.name == name) {
            return Err(FsError::FileNotFound(name.to_string()));
        }
        let path = self.path_for(name);
        fs::remove_file(&path).map_err(|source| FsError::Io { path, source })?;
        self.rescan()
    }

    pub fn copy(&mut self, src: &str, dst: &str) -> Result<(), FsError> {
        let data = self.read(src)?;
        self.write(dst, &data)
    }

    pub fn rename(&mut self, src: &str, dst: &str) -> Result<(), FsError> {
        Self::validate_name(dst)?;
        if !self.entries.iter().any(|e| e.name == src) {
            return Err(FsError::FileNotFound(src.to_string()));
        }
        let from = self.path_for(src);
        let to = self.path_for(dst);
        fs::rename(&from, &to).map_err(|source| FsError::Io { path: from, source })?;
        self.rescan()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let mut fsx = Filestore::open(dir.path()).unwrap();
        fsx.write("hello.bin", b"hi").unwrap();
        assert_eq!(fsx.read("hello.bin").unwrap(), b"hi");
        assert_eq!(fsx.list().len(), 1);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let fsx = Filestore::open(dir.path()).unwrap();
        let err = fsx.read("nope.bin").unwrap_err();
        assert!(matches!(err, FsError::FileNotFound(_)));
    }

    #[test]
    fn name_too_long_is_rejected() {
        let dir = tempdir().unwrap();
        let mut fsx = Filestore::open(dir.path()).unwrap();
        let long_name = "a".repeat(64);
        let err = fsx.write(&long_name, b"x").unwrap_err();
        assert!(matches!(err, FsError::NameTooLong(_)));
    }

    #[test]
    fn entries_beyond_cap_are_ignored_on_scan() {
        let dir = tempdir().unwrap();
        for i in 0..(MAX_ENTRIES + 5) {
            std::fs::write(dir.path().join(format!("f{i:03}.bin")), b"x").unwrap();
        }
        let fsx = Filestore::open(dir.path()).unwrap();
        assert_eq!(fsx.list().len(), MAX_ENTRIES);
    }

    #[test]
    fn rename_and_copy() {
        let dir = tempdir().unwrap();
        let mut fsx = Filestore::open(dir.path()).unwrap();
        fsx.write("a.bin", b"data").unwrap();
        fsx.copy("a.bin", "b.bin").unwrap();
        assert_eq!(fsx.read("b.bin").unwrap(), b"data");
        fsx.rename("b.bin", "c.bin").unwrap();
        assert!(fsx.read("b.bin").is_err());
        assert_eq!(fsx.read("c.bin").unwrap(), b"data");
    }

    #[test]
    fn remove_deletes_entry() {
        let dir = tempdir().unwrap();
        let mut fsx = Filestore::open(dir.path()).unwrap();
        fsx.write("a.bin", b"x").unwrap();
        fsx.remove("a.bin").unwrap();
        assert!(fsx.read("a.bin").is_err());
        assert_eq!(fsx.list().len(), 0);
    }
}
