// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Editor install from release archive.

use crate::{
    install::{Context, InstallError, Result},
    path::search_path_contains,
    shell::{quote, Cmd},
};

use std::env;
use tracing::{info, warn};

pub(super) fn install(ctx: &Context<'_>) -> Result<()> {
    let entry = &ctx.catalog.neovim;
    let privilege = ctx.host.privilege;
    ctx.ensure_commands(&entry.prerequisites)?;

    ctx.exec(
        &Cmd::new("curl")
            .args(["-fL", "-o"])
            .arg(entry.archive.to_string())
            .arg(&entry.url),
    )?;

    // INVARIANT: Never extract on top of a previous install.
    ctx.exec(
        &Cmd::new("rm")
            .arg("-rf")
            .arg(entry.install_dir.to_string())
            .escalate(privilege),
    )?;
    ctx.exec(
        &Cmd::new("tar")
            .arg("-C")
            .arg(entry.extract_dir.to_string())
            .arg("-xzf")
            .arg(entry.archive.to_string())
            .escalate(privilege),
    )?;
    ctx.exec(&Cmd::new("rm").arg("-f").arg(entry.archive.to_string()))?;

    let binary = entry.install_dir.as_path().join(&entry.binary);
    ctx.verify_file(binary.clone())?;

    let link = binary
        .file_name()
        .map(|name| entry.link_dir.as_path().join(name))
        .ok_or_else(|| InstallError::MissingBinary {
            path: binary.clone(),
        })?;
    ctx.exec(
        &Cmd::new("mkdir")
            .arg("-p")
            .arg(entry.link_dir.to_string())
            .escalate(privilege),
    )?;
    ctx.exec(
        &Cmd::new("ln")
            .arg("-sfn")
            .arg(binary.display().to_string())
            .arg(link.display().to_string())
            .escalate(privilege),
    )?;
    info!("linked {} to {}", link.display(), binary.display());

    if search_path_contains(env::var_os("PATH").as_deref(), &entry.link_dir) {
        info!("{} already in PATH", entry.link_dir);
    } else {
        warn!(
            "{} not in PATH, install fallback snippet {}",
            entry.link_dir, entry.path_snippet
        );
        let snippet = format!("export PATH=\"$PATH:{}\"", entry.link_dir);
        ctx.exec(
            &Cmd::new("sh")
                .arg("-c")
                .arg(format!(
                    "printf '%s\\n' {} > {}",
                    quote(&snippet),
                    quote(&entry.path_snippet.to_string())
                ))
                .escalate(privilege),
        )?;
    }

    ctx.ensure_line(&entry.profile_line)?;
    ctx.ensure_alias(&entry.alias.name, &entry.alias.expansion)?;

    Ok(())
}
