//! # Backup Guard Module
//!
//! Scoped transaction around an in-place rewrite of a single file.
//!
//! ```text
//! PENDING --create()--> BACKED_UP --commit()------------> CLEANED_UP (backup deleted)
//!                                 --keep_backup()-------> CLEANED_UP (backup left on disk)
//!                                 --rollback() / drop---> CLEANED_UP (original restored)
//! ```
//!
//! The backup lives at `<file>.backup` and strategy output at `<file>.temp`,
//! both suffixes appended to the full file name. The temp file is removed on
//! every exit path. A guard dropped while still armed (early return through
//! `?`, panic) restores the original from the backup.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const BACKUP_SUFFIX: &str = ".backup";
pub const TEMP_SUFFIX: &str = ".temp";

/// `a.png` + `.backup` -> `a.png.backup`
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardState {
    Armed,
    Committed,
    Kept,
    RolledBack,
}

/// Owns the backup and temp artifacts of one file while it is being rewritten
#[derive(Debug)]
pub struct BackupGuard {
    original: PathBuf,
    backup: PathBuf,
    temp: PathBuf,
    state: GuardState,
}

impl BackupGuard {
    /// Copy `path` aside to `<path>.backup`
    pub fn create(path: &Path) -> io::Result<Self> {
        let backup = with_suffix(path, BACKUP_SUFFIX);
        let temp = with_suffix(path, TEMP_SUFFIX);

        fs::copy(path, &backup)?;
        debug!("Backed up {} -> {}", path.display(), backup.display());

        Ok(Self {
            original: path.to_path_buf(),
            backup,
            temp,
            state: GuardState::Armed,
        })
    }

    pub fn original(&self) -> &Path {
        &self.original
    }

    /// Untouched copy of the original bytes
    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    /// Scratch output for one strategy
    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    /// Copy the current temp output over the real path
    pub fn promote_temp(&self) -> io::Result<()> {
        fs::copy(&self.temp, &self.original)?;
        debug!("Promoted {} -> {}", self.temp.display(), self.original.display());
        Ok(())
    }

    /// Keep the rewritten file and delete the backup
    pub fn commit(mut self) {
        self.state = GuardState::Committed;
        // removal happens in Drop
    }

    /// Keep the rewritten file and leave the backup on disk
    pub fn keep_backup(mut self) -> PathBuf {
        self.state = GuardState::Kept;
        self.backup.clone()
    }

    /// Put the original bytes back at the real path.
    ///
    /// On failure the guard stays armed, so Drop retries once and leaves the
    /// backup on disk if that fails too.
    pub fn rollback(mut self) -> io::Result<()> {
        fs::rename(&self.backup, &self.original)?;
        self.state = GuardState::RolledBack;
        Ok(())
    }

    /// Returns false when the backup could not be moved back
    fn restore_quietly(&self) -> bool {
        if !self.backup.exists() {
            return true;
        }
        match fs::rename(&self.backup, &self.original) {
            Ok(()) => {
                debug!("Restored {} from backup", self.original.display());
                true
            }
            Err(e) => {
                warn!(
                    "Failed to restore {}, original bytes remain in {}: {}",
                    self.original.display(),
                    self.backup.display(),
                    e
                );
                false
            }
        }
    }
}

impl Drop for BackupGuard {
    fn drop(&mut self) {
        let keep_backup = match self.state {
            GuardState::Armed => !self.restore_quietly(),
            GuardState::Kept => true,
            GuardState::Committed | GuardState::RolledBack => false,
        };

        let mut leftovers = vec![&self.temp];
        if !keep_backup {
            leftovers.push(&self.backup);
        }

        for path in leftovers {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    debug!("Cleanup of {} failed: {}", path.display(), e);
                }
            }
        }
    }
}
