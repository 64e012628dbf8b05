// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository cloning.
//!
//! Clones go through libgit2 instead of the git binary, so no version
//! control client has to be installed before devstrap can fetch anything.
//! Transfer progress is shown through a progress bar.

use git2::{build::RepoBuilder, FetchOptions, RemoteCallbacks, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::{path::Path, time};
use tracing::{info, instrument};

/// How much history to fetch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Full history.
    #[default]
    Full,

    /// Only the latest commit.
    Shallow,
}

/// Clone remote repository into target path.
///
/// # Errors
///
/// - Return [`GitError::Git2`] if libgit2 operations fail.
/// - Return [`GitError::IndicatifStyleTemplate`] if progress bar cannot be styled.
#[instrument(skip(url, path), level = "debug")]
pub fn clone(url: impl AsRef<str>, path: impl AsRef<Path>, depth: Depth) -> Result<Repository> {
    info!("clone {} into {}", url.as_ref(), path.as_ref().display());

    let bar = ProgressBar::new(0);
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
    )?
    .progress_chars("-Cco.");
    bar.set_style(style);
    bar.set_message(url.as_ref().to_string());
    bar.enable_steady_tick(time::Duration::from_millis(100));

    let mut throttle = time::Instant::now();
    let mut rc = RemoteCallbacks::new();
    rc.transfer_progress(|progress| {
        if throttle.elapsed() > time::Duration::from_millis(10) {
            throttle = time::Instant::now();
            bar.set_length(progress.total_objects() as u64);
            bar.set_position(progress.received_objects() as u64);
        }
        true
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(rc);
    if depth == Depth::Shallow {
        fo.depth(1);
    }

    let result = RepoBuilder::new()
        .fetch_options(fo)
        .clone(url.as_ref(), path.as_ref());
    bar.finish_and_clear();

    Ok(result?)
}

/// Check if target path holds a repository with a checked out commit.
///
/// A clone that was interrupted half way leaves a repository behind whose
/// `HEAD` does not resolve to a commit, so it does not count.
pub fn has_checkout(path: impl AsRef<Path>) -> bool {
    let Ok(repo) = Repository::open(path.as_ref()) else {
        return false;
    };
    let Ok(head) = repo.head() else {
        return false;
    };
    let checked_out = head.peel_to_commit().is_ok();

    checked_out
}

/// Repository cloning error types.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),

    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),
}

/// Friendly result alias :3
pub type Result<T, E = GitError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use sealed_test::prelude::*;
    use std::fs::create_dir_all;

    #[sealed_test]
    fn checkout_needs_a_commit() -> anyhow::Result<()> {
        create_dir_all("plain")?;
        assert!(!has_checkout("plain"));
        assert!(!has_checkout("missing"));

        let repo = Repository::init("repo")?;
        assert!(!has_checkout("repo"));

        let signature = Signature::now("devstrap", "devstrap@localhost")?;
        let tree = repo.find_tree(repo.index()?.write_tree()?)?;
        repo.commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])?;
        assert!(has_checkout("repo"));

        Ok(())
    }
}
