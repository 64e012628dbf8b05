// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine where the user's shell profile lives, and check whether a
//! directory is reachable through a `PATH` style search list.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine default absolute path to the shell startup file.
///
/// Uses `$HOME/.bashrc`. Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_profile_path() -> Result<PathBuf> {
    home_dir().map(|home| home.join(".bashrc"))
}

/// Check if `dir` is one of the entries of a `PATH` style search list.
///
/// Trailing slashes are ignored on both sides.
pub fn search_path_contains(search_path: Option<&OsStr>, dir: impl AsRef<Path>) -> bool {
    let Some(search_path) = search_path else {
        return false;
    };

    let dir = dir.as_ref().components().collect::<PathBuf>();
    std::env::split_paths(search_path).any(|entry| entry.components().collect::<PathBuf>() == dir)
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;
    use std::ffi::OsString;

    #[test_case(Some("/usr/bin:/usr/local/bin"), "/usr/local/bin", true; "plain entry")]
    #[test_case(Some("/usr/bin:/usr/local/bin/"), "/usr/local/bin", true; "trailing slash")]
    #[test_case(Some("/usr/bin:/usr/local/sbin"), "/usr/local/bin", false; "missing entry")]
    #[test_case(Some(""), "/usr/local/bin", false; "empty search path")]
    #[test_case(None, "/usr/local/bin", false; "unset search path")]
    #[test]
    fn search_path_lookup(search_path: Option<&str>, dir: &str, expect: bool) {
        let search_path = search_path.map(OsString::from);
        assert_eq!(search_path_contains(search_path.as_deref(), dir), expect);
    }
}
