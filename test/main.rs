// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use anyhow::Result;
use std::{
    fs::{create_dir_all, set_permissions, write, Permissions},
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::{Command, Output},
};

/// Sandboxed invocation of the devstrap binary.
///
/// The binary sees `home` as its home directory, and only `bin` on its
/// search path, so nothing outside the sandbox is visible or touched.
pub(crate) struct Sandbox {
    home: PathBuf,
    bin: PathBuf,
}

impl Sandbox {
    pub(crate) fn new(root: impl AsRef<Path>) -> Result<Self> {
        let home = root.as_ref().join("home");
        let bin = root.as_ref().join("bin");
        create_dir_all(&home)?;
        create_dir_all(&bin)?;

        Ok(Self { home, bin })
    }

    pub(crate) fn home(&self) -> &Path {
        &self.home
    }

    /// Place an executable stub of target name on the search path.
    pub(crate) fn stub_command(&self, name: &str) -> Result<()> {
        let stub = self.bin.join(name);
        write(&stub, "#!/bin/sh\nexit 0\n")?;
        set_permissions(&stub, Permissions::from_mode(0o755))?;

        Ok(())
    }

    pub(crate) fn run(&self, args: &[&str]) -> Result<Run> {
        let output = Command::new(env!("CARGO_BIN_EXE_devstrap"))
            .args(args)
            .env("HOME", &self.home)
            .env("PATH", &self.bin)
            .env("RUST_LOG", "info")
            .env("NO_COLOR", "1")
            .output()?;

        Ok(Run::from(output))
    }
}

pub(crate) struct Run {
    pub(crate) code: Option<i32>,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

impl From<Output> for Run {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}
