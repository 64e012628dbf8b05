// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Editor plugin framework starter configuration.

use crate::{
    git::Depth,
    install::{Context, InstallError, Result, Step},
};

use std::path::PathBuf;
use tracing::{info, warn};

pub(super) fn install(ctx: &Context<'_>) -> Result<()> {
    let entry = &ctx.catalog.lazyvim;

    // INVARIANT: Check prerequisite before touching any configuration.
    match editor_binary(ctx) {
        Some(editor) => info!("using editor at {}", editor.display()),
        None if ctx.mode.is_dry_run() => {
            warn!("nvim not found, a live run of {} would stop here", Step::Lazyvim)
        }
        None => {
            return Err(InstallError::MissingPrerequisite {
                step: Step::Lazyvim,
                tool: "nvim".into(),
            })
        }
    }

    if !ctx.back_up(entry.config_dir.as_path())? {
        info!("no previous editor configuration, fresh install");
    }

    for path in &entry.extra_backups {
        if !ctx.back_up(path.as_path())? {
            warn!("recommended backup of {path} skipped, nothing there");
        }
    }

    ctx.clone_repo(&entry.url, entry.config_dir.as_path(), Depth::Full)?;
    ctx.remove_dir(&entry.config_dir.as_path().join(".git"))?;
    info!("detached starter configuration from its repository");

    Ok(())
}

/// Locate editor either through `PATH` or at its known install location.
fn editor_binary(ctx: &Context<'_>) -> Option<PathBuf> {
    let neovim = &ctx.catalog.neovim;
    which::which("nvim").ok().or_else(|| {
        let installed = neovim.install_dir.as_path().join(&neovim.binary);
        installed.is_file().then_some(installed)
    })
}
