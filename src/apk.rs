//! Side-channel asset file management.
//!
//! Some allocation decisions are communicated to downstream tooling through small
//! manifest files packaged next to the dexes rather than through the dexes
//! themselves; the mixed-mode container announces itself by appending its canary
//! class name to `mixed_mode.txt`. The [`ApkManager`] hands out writable handles to
//! such files inside the asset directory.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::Result;

/// Manages the asset directory side-channel files are written into.
#[derive(Debug, Clone)]
pub struct ApkManager {
    asset_dir: PathBuf,
}

impl ApkManager {
    /// Creates a manager rooted at the given asset directory.
    ///
    /// The directory does not need to exist yet; it is created on the first
    /// [`ApkManager::new_asset_file`] call.
    #[must_use]
    pub fn new(asset_dir: impl Into<PathBuf>) -> Self {
        ApkManager {
            asset_dir: asset_dir.into(),
        }
    }

    /// The asset directory this manager writes into
    #[must_use]
    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    /// Opens an asset file for appending, creating directory and file as needed.
    ///
    /// The handle is closed when dropped, on every exit path.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the directory or file cannot be
    /// created or opened.
    pub fn new_asset_file(&self, name: &str) -> Result<File> {
        std::fs::create_dir_all(&self.asset_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.asset_dir.join(name))?;
        Ok(file)
    }
}
