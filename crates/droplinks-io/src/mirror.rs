//! External mirror file handle.
//!
//! The mirror path arrives from a user-granted file dialog and is
//! remembered for the session. Writes and reads are plain filesystem
//! operations; the caller decides what a failure means (typically:
//! discard the path and fall back to a one-shot export).

use anyhow::{Result, bail};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Default)]
pub struct MirrorFile {
    path: Option<PathBuf>,
}

impl MirrorFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// Forget the remembered path, returning it.
    pub fn detach(&mut self) -> Option<PathBuf> {
        self.path.take()
    }

    pub fn is_attached(&self) -> bool {
        self.path.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn write(&self, contents: &str) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            bail!("no mirror path attached");
        };
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn read(&self) -> Result<String> {
        let Some(path) = self.path.as_ref() else {
            bail!("no mirror path attached");
        };
        Ok(fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut mirror = MirrorFile::new();
        assert!(!mirror.is_attached());
        assert!(mirror.write("x").is_err());

        mirror.attach(dir.path().join(".droplinks"));
        mirror.write("{\"panels\":[]}").unwrap();
        assert_eq!(mirror.read().unwrap(), "{\"panels\":[]}");
    }

    #[test]
    fn test_write_failure_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut mirror = MirrorFile::new();
        // A directory path cannot be written as a file.
        mirror.attach(dir.path().to_path_buf());
        assert!(mirror.write("x").is_err());
    }

    #[test]
    fn test_detach_forgets_path() {
        let mut mirror = MirrorFile::new();
        mirror.attach(PathBuf::from("/tmp/.droplinks"));
        assert!(mirror.detach().is_some());
        assert!(!mirror.is_attached());
        assert!(mirror.read().is_err());
    }
}
