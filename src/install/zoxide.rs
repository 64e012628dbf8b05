// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Directory jumper install.

use crate::{
    install::{Context, Result},
    shell::{quote, Cmd},
};

use tracing::{debug, warn};

pub(super) fn install(ctx: &Context<'_>) -> Result<()> {
    let entry = &ctx.catalog.zoxide;
    ctx.ensure_line(&entry.path_line)?;
    ctx.ensure_commands(&["curl".to_string()])?;

    ctx.exec(
        &Cmd::new("sh")
            .arg("-c")
            .arg(format!("curl -sSfL {} | sh", quote(&entry.script_url))),
    )?;

    let binary = entry.bin_dir.as_path().join("zoxide");
    ctx.verify_file(binary.clone())?;

    let init = Cmd::new(binary.display().to_string()).args(["init", entry.shell.as_str()]);
    match ctx.capture(&init)? {
        Some(code) if code.is_empty() => warn!("zoxide produced no {} init code", entry.shell),
        Some(code) => debug!("zoxide init code is {} bytes", code.len()),
        None => {}
    }

    ctx.ensure_line(&entry.init_line)?;

    Ok(())
}
