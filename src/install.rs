// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Installer registry.
//!
//! Each [`Step`] is a named, independently selectable unit of installation
//! work. Steps run in the fixed order of [`Step::ORDER`], and carry no
//! dependency graph beyond that. A step that needs something another step
//! provides checks for it up front, and fails with
//! [`InstallError::MissingPrerequisite`] before doing any work.
//!
//! # Failure Semantics
//!
//! A missing required prerequisite, or any failed fetch or build, is fatal
//! for the whole run. Optional work (extra backups, `PATH` already being
//! correct, a tool already being installed) only produces a warning.
//!
//! # Dry Runs
//!
//! Steps never touch the system directly. Every command, backup, clone, and
//! profile edit goes through [`Context`], which prints it instead under
//! [`Mode::DryRun`]. Read-only checks still run, so a dry run walks the same
//! branches a live run would.

mod fzf;
mod lazyvim;
mod neovim;
mod ripgrep;
mod zoxide;

use crate::{
    backup::{self, BackupError},
    catalog::Catalog,
    git::{self, Depth, GitError},
    host::Host,
    package::PackageManager,
    profile::{render_alias, Change, Profile, ProfileError},
    shell::{Cmd, Mode, ShellError},
};

use mkdirp::mkdirp;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::remove_dir_all,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Named unit of installation work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// Editor release archive.
    Neovim,

    /// Editor plugin framework starter configuration.
    Lazyvim,

    /// Fuzzy finder.
    Fzf,

    /// Directory jumper.
    Zoxide,

    /// Search tool built from source.
    Ripgrep,
}

impl Step {
    /// Order in which selected steps run.
    pub const ORDER: [Step; 5] = [
        Step::Neovim,
        Step::Lazyvim,
        Step::Fzf,
        Step::Zoxide,
        Step::Ripgrep,
    ];

    /// Name of step.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Neovim => "neovim",
            Self::Lazyvim => "lazyvim",
            Self::Fzf => "fzf",
            Self::Zoxide => "zoxide",
            Self::Ripgrep => "ripgrep",
        }
    }

    /// Run step.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError`] if the step cannot complete.
    #[instrument(skip(self, ctx), fields(step = %self), level = "debug")]
    pub fn run(&self, ctx: &Context<'_>) -> Result<()> {
        info!("run step {self}");
        match self {
            Self::Neovim => neovim::install(ctx),
            Self::Lazyvim => lazyvim::install(ctx),
            Self::Fzf => fzf::install(ctx),
            Self::Zoxide => zoxide::install(ctx),
            Self::Ripgrep => ripgrep::install(ctx),
        }
    }
}

impl Display for Step {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.name())
    }
}

/// Everything a step gets to work with.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub host: Host,
    pub mode: Mode,
    pub packages: PackageManager,
    pub profile: &'a Profile,
    pub catalog: &'a Catalog,
}

impl<'a> Context<'a> {
    /// Construct new step context.
    pub fn new(host: Host, mode: Mode, profile: &'a Profile, catalog: &'a Catalog) -> Self {
        Self {
            host,
            mode,
            packages: PackageManager::new(host, mode),
            profile,
            catalog,
        }
    }

    /// Make sure target commands are available, installing missing ones as
    /// native packages of the same name.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::Shell`] if the package manager fails.
    pub(crate) fn ensure_commands(&self, commands: &[String]) -> Result<()> {
        let missing = commands
            .iter()
            .filter(|command| which::which(command.as_str()).is_err())
            .cloned()
            .collect::<Vec<_>>();
        if missing.is_empty() {
            return Ok(());
        }

        info!("missing commands: {}", missing.join(" "));
        self.packages.refresh_index()?;
        self.packages.install_packages(&missing)?;

        Ok(())
    }

    /// Run external command.
    #[track_caller]
    pub(crate) fn exec(&self, cmd: &Cmd) -> Result<()> {
        Ok(self.mode.run(cmd)?)
    }

    /// Run external command for its output, `None` on dry runs.
    #[track_caller]
    pub(crate) fn capture(&self, cmd: &Cmd) -> Result<Option<String>> {
        Ok(self.mode.output(cmd)?)
    }

    /// Back up target path, reporting whether anything was there.
    pub(crate) fn back_up(&self, path: &Path) -> Result<bool> {
        if !self.mode.is_dry_run() {
            return Ok(backup::backup(path)?.is_moved());
        }

        match backup::destination(path)? {
            Some(destination) => {
                println!("dry-run: move {} to {}", path.display(), destination.display());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Clone remote repository into target path.
    pub(crate) fn clone_repo(&self, url: &str, path: &Path, depth: Depth) -> Result<()> {
        if self.mode.is_dry_run() {
            let shallow = if depth == Depth::Shallow { " (shallow)" } else { "" };
            println!("dry-run: clone {url} into {}{shallow}", path.display());
            return Ok(());
        }

        git::clone(url, path, depth)?;
        Ok(())
    }

    /// Create directory and all of its parents.
    pub(crate) fn create_dir(&self, path: &Path) -> Result<()> {
        if self.mode.is_dry_run() {
            println!("dry-run: create directory {}", path.display());
            return Ok(());
        }

        mkdirp(path).map_err(|source| InstallError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        Ok(())
    }

    /// Remove directory tree.
    pub(crate) fn remove_dir(&self, path: &Path) -> Result<()> {
        if self.mode.is_dry_run() {
            println!("dry-run: remove {}", path.display());
            return Ok(());
        }

        remove_dir_all(path).map_err(|source| InstallError::Io {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Verify that an install produced target file.
    ///
    /// Nothing was installed on dry runs, so nothing is checked either.
    pub(crate) fn verify_file(&self, path: PathBuf) -> Result<()> {
        if self.mode.is_dry_run() || path.is_file() {
            return Ok(());
        }

        Err(InstallError::MissingBinary { path })
    }

    /// Append line to shell profile unless present.
    pub(crate) fn ensure_line(&self, line: &str) -> Result<Option<Change>> {
        if self.mode.is_dry_run() {
            println!("dry-run: ensure line {line} in {}", self.profile.path().display());
            return Ok(None);
        }

        Ok(Some(self.profile.ensure_line(line)?))
    }

    /// Append alias to shell profile unless declared.
    pub(crate) fn ensure_alias(&self, name: &str, expansion: &str) -> Result<Option<Change>> {
        if self.mode.is_dry_run() {
            println!(
                "dry-run: ensure {} in {}",
                render_alias(name, expansion),
                self.profile.path().display()
            );
            return Ok(None);
        }

        Ok(Some(self.profile.ensure_alias(name, expansion)?))
    }

    /// Append function to shell profile unless declared.
    pub(crate) fn ensure_function(&self, name: &str, body: &[String]) -> Result<Option<Change>> {
        if self.mode.is_dry_run() {
            println!(
                "dry-run: ensure function {name} in {}",
                self.profile.path().display()
            );
            return Ok(None);
        }

        Ok(Some(self.profile.ensure_function(name, body)?))
    }
}

/// Installation error types.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// Step needs something that is not there.
    #[error("step {step} requires {tool}, but it cannot be found")]
    MissingPrerequisite { step: Step, tool: String },

    /// Expected artifact was not produced.
    #[error("expected {:?} to exist after install", path.display())]
    MissingBinary { path: PathBuf },

    /// Local file system operation fails.
    #[error("failed to modify {:?}", path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// External command fails.
    #[error(transparent)]
    Shell(#[from] ShellError),

    /// Shell profile cannot be modified.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Backup cannot be made.
    #[error(transparent)]
    Backup(#[from] BackupError),

    /// Repository cannot be cloned.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Friendly result alias :3
pub type Result<T, E = InstallError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Distro, Privilege};
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{create_dir_all, read_dir};

    fn host() -> Host {
        Host::new(Distro::Unknown, Privilege::SudoPrefixed)
    }

    #[test]
    fn steps_run_in_fixed_order() {
        let mut shuffled = vec![Step::Ripgrep, Step::Neovim, Step::Zoxide, Step::Lazyvim, Step::Fzf];
        shuffled.sort();
        assert_eq!(shuffled, Step::ORDER);
    }

    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn missing_artifact_is_fatal() -> anyhow::Result<()> {
        let catalog = Catalog::builtin()?;
        let profile = Profile::new(".bashrc");
        let live = Context::new(host(), Mode::Live, &profile, &catalog);

        let result = live.verify_file("bin/zoxide".into());
        assert!(
            matches!(&result, Err(InstallError::MissingBinary { path }) if path == Path::new("bin/zoxide")),
            "{result:?}"
        );

        create_dir_all("bin")?;
        std::fs::write("bin/zoxide", "")?;
        live.verify_file("bin/zoxide".into())?;

        let dry = Context::new(host(), Mode::DryRun, &profile, &catalog);
        dry.verify_file("bin/nvim".into())?;

        Ok(())
    }

    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn dry_run_touches_nothing() -> anyhow::Result<()> {
        let catalog = Catalog::builtin()?;
        let profile = Profile::new(".bashrc");
        let ctx = Context::new(host(), Mode::DryRun, &profile, &catalog);
        create_dir_all("config/nvim")?;
        let before = read_dir(".")?.count();

        assert!(ctx.back_up(Path::new("config/nvim"))?);
        assert!(!ctx.back_up(Path::new("config/missing"))?);
        ctx.remove_dir(Path::new("config/nvim"))?;
        ctx.create_dir(Path::new("src/ripgrep"))?;
        ctx.clone_repo("https://example.invalid/repo.git", Path::new("repo"), Depth::Shallow)?;
        ctx.exec(&Cmd::new("sh").args(["-c", "touch touched"]))?;
        assert_eq!(ctx.ensure_line("set -o vi")?, None);
        assert_eq!(ctx.ensure_alias("vim", "nvim")?, None);

        assert!(Path::new("config/nvim").is_dir());
        assert_eq!(read_dir(".")?.count(), before);
        assert_eq!(read_dir("config")?.count(), 1);

        Ok(())
    }

    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn live_context_applies_changes() -> anyhow::Result<()> {
        let catalog = Catalog::builtin()?;
        let profile = Profile::new(".bashrc");
        let ctx = Context::new(host(), Mode::Live, &profile, &catalog);
        create_dir_all("config/nvim/.git")?;

        assert!(ctx.back_up(Path::new("config/nvim"))?);
        assert!(!Path::new("config/nvim").exists());
        assert!(!ctx.back_up(Path::new("config/missing"))?);

        ctx.create_dir(Path::new("src/ripgrep"))?;
        assert!(Path::new("src/ripgrep").is_dir());
        ctx.remove_dir(Path::new("src/ripgrep"))?;
        assert!(!Path::new("src/ripgrep").exists());

        assert_eq!(ctx.ensure_line("set -o vi")?, Some(Change::Added));
        assert_eq!(ctx.ensure_line("set -o vi")?, Some(Change::Present));

        Ok(())
    }
}
