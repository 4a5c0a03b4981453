//! Cleanup of partially written outputs

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fail with `AlreadyExists` if something is already at `path`
///
/// Writers call this right before arming an [`OutputGuard`] so the guard
/// can only ever remove a file they created.
pub fn ensure_vacant(path: &Path) -> io::Result<()> {
    match path.symlink_metadata() {
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Removes the output file on drop unless disarmed
///
/// ```ignore
/// let guard = OutputGuard::new(&target.absolute_path);
/// render(&target.absolute_path).await?;
/// guard.disarm();
/// ```
#[derive(Debug)]
#[must_use = "dropping the guard immediately removes the output"]
pub struct OutputGuard {
    path: PathBuf,
    armed: bool,
}

impl OutputGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed partial output {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove partial output {}: {}", self.path.display(), e),
        }
    }
}
