// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Fuzzy finder install.

use crate::{
    git::Depth,
    install::{Context, Result},
    shell::Cmd,
};

use tracing::warn;

pub(super) fn install(ctx: &Context<'_>) -> Result<()> {
    let entry = &ctx.catalog.fzf;
    if entry.install_dir.as_path().exists() {
        warn!("fzf already installed at {}, skip", entry.install_dir);
        return Ok(());
    }

    ctx.clone_repo(&entry.url, entry.install_dir.as_path(), Depth::Shallow)?;

    let installer = entry.install_dir.as_path().join("install");
    ctx.exec(&Cmd::new(installer.display().to_string()).args(&entry.installer_args))?;

    Ok(())
}
