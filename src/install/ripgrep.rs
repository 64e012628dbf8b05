// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Search tool built from source.
//!
//! Needs a Rust toolchain. The native compiler toolchain comes from the
//! package manager, and cargo itself from the official toolchain installer
//! if it is not already around.

use crate::{
    git::{self, Depth},
    install::{Context, InstallError, Result, Step},
    shell::{quote, Cmd},
};

use std::path::PathBuf;
use tracing::{info, warn};

pub(super) fn install(ctx: &Context<'_>) -> Result<()> {
    let entry = &ctx.catalog.ripgrep;
    let cargo = ensure_toolchain(ctx)?;

    let source_dir = entry.source_dir.as_path();
    if git::has_checkout(source_dir) {
        info!("reuse existing ripgrep source at {}", entry.source_dir);
    } else {
        // INVARIANT: Leftovers of an interrupted clone are set aside, never built.
        if ctx.back_up(source_dir)? {
            warn!("incomplete ripgrep source at {}, clone again", entry.source_dir);
        }
        if let Some(parent) = source_dir.parent() {
            ctx.create_dir(parent)?;
        }
        ctx.clone_repo(&entry.url, source_dir, Depth::Full)?;
    }

    ctx.exec(
        &Cmd::new(cargo.display().to_string())
            .args(["build", "--release"])
            .current_dir(source_dir),
    )?;

    ctx.ensure_line(&entry.path_line)?;

    Ok(())
}

fn ensure_toolchain(ctx: &Context<'_>) -> Result<PathBuf> {
    let entry = &ctx.catalog.ripgrep;
    let packages = entry.toolchain_packages.for_distro(ctx.host.distro);
    ctx.packages.refresh_index()?;
    ctx.packages.install_packages(packages)?;

    if let Some(cargo) = find_cargo(ctx) {
        info!("using cargo at {}", cargo.display());
        return Ok(cargo);
    }

    ctx.ensure_commands(&["curl".to_string()])?;
    ctx.exec(
        &Cmd::new("sh").arg("-c").arg(format!(
            "curl --proto '=https' --tlsv1.2 -sSf {} | sh -s -- -y",
            quote(&entry.toolchain_script)
        )),
    )?;

    if ctx.mode.is_dry_run() {
        return Ok(installed_cargo(ctx));
    }

    find_cargo(ctx).ok_or_else(|| InstallError::MissingPrerequisite {
        step: Step::Ripgrep,
        tool: "cargo".into(),
    })
}

fn find_cargo(ctx: &Context<'_>) -> Option<PathBuf> {
    which::which("cargo").ok().or_else(|| {
        let cargo = installed_cargo(ctx);
        cargo.is_file().then_some(cargo)
    })
}

fn installed_cargo(ctx: &Context<'_>) -> PathBuf {
    ctx.catalog.ripgrep.cargo_home.as_path().join("bin").join("cargo")
}
