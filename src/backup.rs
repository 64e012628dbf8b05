// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Non-destructive backups.
//!
//! Before a configuration file or directory gets replaced, it is moved out of
//! the way by renaming it to `<path>.<timestamp>.bak`. The timestamp has
//! second resolution. When a destination of that name already exists, a
//! counter is inserted, i.e., `<path>.<timestamp>.1.bak`, so a backup never
//! replaces an earlier one. Nothing is ever deleted.

use chrono::{DateTime, Local};
use std::{
    ffi::OsString,
    fs::{rename, symlink_metadata},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Result of backing up a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backup {
    /// Path existed, and was moved to the recorded destination.
    Moved(BackupRecord),

    /// Path did not exist, nothing was touched.
    NotFound,
}

impl Backup {
    /// Check if a backup actually happened.
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved(_))
    }
}

/// Source and destination of a single rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Back up target path using the current local time.
///
/// # Errors
///
/// - Return [`BackupError::Inspect`] if path cannot be inspected.
/// - Return [`BackupError::Rename`] if path cannot be renamed.
pub fn backup(path: impl AsRef<Path>) -> Result<Backup> {
    backup_at(path, Local::now())
}

/// Back up target path using a fixed timestamp.
///
/// # Errors
///
/// - Return [`BackupError::Inspect`] if path cannot be inspected.
/// - Return [`BackupError::Rename`] if path cannot be renamed.
#[instrument(skip(path, now), fields(path = %path.as_ref().display()), level = "debug")]
pub fn backup_at(path: impl AsRef<Path>, now: DateTime<Local>) -> Result<Backup> {
    let source = path.as_ref();
    let Some(destination) = destination_at(source, now)? else {
        warn!("nothing to back up at {}", source.display());
        return Ok(Backup::NotFound);
    };

    rename(source, &destination).map_err(|error| BackupError::Rename {
        source: error,
        from: source.to_path_buf(),
        to: destination.clone(),
    })?;
    info!("backed up {} to {}", source.display(), destination.display());

    Ok(Backup::Moved(BackupRecord {
        source: source.to_path_buf(),
        destination,
    }))
}

/// Destination a backup of target path would be moved to right now.
///
/// # Errors
///
/// - Return [`BackupError::Inspect`] if path cannot be inspected.
pub fn destination(path: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    destination_at(path, Local::now())
}

/// Destination a backup of target path would be moved to at a fixed time.
///
/// Yields `None` if there is nothing to back up. Nothing is touched.
///
/// # Errors
///
/// - Return [`BackupError::Inspect`] if path cannot be inspected.
pub fn destination_at(path: impl AsRef<Path>, now: DateTime<Local>) -> Result<Option<PathBuf>> {
    let source = path.as_ref();

    // INVARIANT: Dangling symlinks still count as existing entries.
    match symlink_metadata(source) {
        Ok(_) => {}
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(BackupError::Inspect {
                source: error,
                path: source.to_path_buf(),
            })
        }
    }

    let stamp = now.format(TIMESTAMP_FORMAT).to_string();
    Ok(Some(free_destination(source, &stamp)))
}

fn free_destination(source: &Path, stamp: &str) -> PathBuf {
    let candidate = |suffix: String| {
        let mut name = OsString::from(source.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    };

    let mut destination = candidate(format!(".{stamp}.bak"));
    let mut counter = 1usize;
    while symlink_metadata(&destination).is_ok() {
        destination = candidate(format!(".{stamp}.{counter}.bak"));
        counter += 1;
    }

    destination
}

/// Backup error types.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// Path to back up cannot be inspected.
    #[error("failed to inspect {:?}", path.display())]
    Inspect {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Path to back up cannot be moved.
    #[error("failed to move {:?} to {:?}", from.display(), to.display())]
    Rename {
        #[source]
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = BackupError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{create_dir_all, read, read_dir, write};

    fn fixed_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 3, 14, 15, 9, 26)
            .single()
            .expect("unambiguous local time")
    }

    #[sealed_test]
    fn backup_existing_file() -> anyhow::Result<()> {
        write("init.lua", "vim.g.mapleader = ' '\n")?;
        let before = read("init.lua")?;

        let result = backup_at("init.lua", fixed_time())?;
        let expect = Backup::Moved(BackupRecord {
            source: "init.lua".into(),
            destination: "init.lua.20250314150926.bak".into(),
        });
        assert_eq!(result, expect);
        assert!(!Path::new("init.lua").exists());
        assert_eq!(read("init.lua.20250314150926.bak")?, before);

        Ok(())
    }

    #[sealed_test]
    fn backup_existing_directory() -> anyhow::Result<()> {
        create_dir_all("nvim/lua")?;
        write("nvim/lua/plugins.lua", "return {}\n")?;

        let result = backup("nvim")?;
        let Backup::Moved(record) = result else {
            panic!("expected directory to be moved");
        };
        assert!(!Path::new("nvim").exists());
        assert_eq!(
            read(record.destination.join("lua/plugins.lua"))?,
            b"return {}\n"
        );

        Ok(())
    }

    #[sealed_test]
    fn backup_missing_path() -> anyhow::Result<()> {
        let before = read_dir(".")?.count();
        assert_eq!(backup("does-not-exist")?, Backup::NotFound);
        assert_eq!(read_dir(".")?.count(), before);

        Ok(())
    }

    #[sealed_test]
    fn destination_leaves_path_alone() -> anyhow::Result<()> {
        write("init.lua", "-- mine\n")?;
        write("init.lua.20250314150926.bak", "-- older\n")?;

        assert_eq!(
            destination_at("init.lua", fixed_time())?,
            Some("init.lua.20250314150926.1.bak".into())
        );
        assert_eq!(destination_at("missing.lua", fixed_time())?, None);
        assert_eq!(read("init.lua")?, b"-- mine\n");
        assert!(!Path::new("init.lua.20250314150926.1.bak").exists());

        Ok(())
    }

    #[sealed_test]
    fn same_second_backups_never_collide() -> anyhow::Result<()> {
        write("bashrc", "first\n")?;
        backup_at("bashrc", fixed_time())?;
        write("bashrc", "second\n")?;
        backup_at("bashrc", fixed_time())?;
        write("bashrc", "third\n")?;
        backup_at("bashrc", fixed_time())?;

        assert_eq!(read("bashrc.20250314150926.bak")?, b"first\n");
        assert_eq!(read("bashrc.20250314150926.1.bak")?, b"second\n");
        assert_eq!(read("bashrc.20250314150926.2.bak")?, b"third\n");

        Ok(())
    }
}
