use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub fn local_file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Remove a scratch file. Missing files are not an error.
pub fn remove_local_file(path: &Path) -> io::Result<()> {
    if !local_file_exists(path) {
        return Ok(());
    }
    match fs::remove_file(path) {
        Ok(()) => {
            log::info!("Temp file removed: {}", path.display());
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Owns a scratch file for the duration of a request and removes it on drop.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(err) = remove_local_file(&self.path) {
            log::warn!("Failed to remove temp file {}: {err}", self.path.display());
        }
    }
}
