//! Cross-process cycle lock on the snapshot directory
//!
//! Every process working on the same snapshot directory (the repeating
//! `run` process and any `once` invocation) takes this lock for the length
//! of a cycle. Contention means another cycle is in progress.

use crate::storage::traits::StorageResult;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = ".cycle.lock";

/// Exclusive advisory lock held while a cycle runs; released on drop
#[derive(Debug)]
pub struct CycleLock {
    file: File,
    path: PathBuf,
}

impl CycleLock {
    /// Path of the lock file inside `dir`
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(LOCK_FILE)
    }

    /// Tries to take the lock without waiting
    ///
    /// # Returns
    ///
    /// * `Ok(Some(CycleLock))` - The lock is held until the value is dropped
    /// * `Ok(None)` - Another holder has it
    /// * `Err(StorageError)` - The lock file could not be opened or locked
    pub fn try_acquire(dir: &Path) -> StorageResult<Option<Self>> {
        fs::create_dir_all(dir)?;
        let path = Self::path_in(dir);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(e) if is_contended(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn is_contended(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::WouldBlock
        || error.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Drop for CycleLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to release {}: {}", self.path.display(), e);
        }
    }
}
