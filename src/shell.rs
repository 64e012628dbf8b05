// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! External command invocation.
//!
//! Every shell-out devstrap performs is described by a [`Cmd`] value: a
//! program, its argument list, extra environment, and an optional working
//! directory. The same value is rendered for logging and dry-run output, and
//! executed for real, so what gets printed is exactly what gets run.
//!
//! Whether a command runs or only gets printed is decided by [`Mode`], which
//! is fixed once per process and handed to everything that shells out.

use crate::host::Privilege;

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    panic::Location,
    path::PathBuf,
    process::{Command, ExitStatus},
};
use tracing::{debug, info};

/// Structured external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    current_dir: Option<PathBuf>,
}

impl Cmd {
    /// Construct new command for target program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            current_dir: None,
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a listing of arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the command.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Run command inside target directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Escalate command according to privilege mode.
    ///
    /// Under [`Privilege::SudoPrefixed`] the command is rewritten to run
    /// through `sudo`. Environment variables become leading `NAME=value`
    /// arguments so they survive the escalation.
    pub fn escalate(self, privilege: Privilege) -> Self {
        match privilege {
            Privilege::Root => self,
            Privilege::SudoPrefixed => {
                let mut args = self
                    .envs
                    .into_iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect::<Vec<_>>();
                args.push(self.program);
                args.extend(self.args);

                Self {
                    program: "sudo".into(),
                    args,
                    envs: Vec::new(),
                    current_dir: self.current_dir,
                }
            }
        }
    }

    /// Name of program to execute.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to program.
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Run command, inheriting standard streams.
    ///
    /// Blocks until the command exits.
    ///
    /// # Errors
    ///
    /// - Return [`ShellError::Spawn`] if program cannot be started.
    /// - Return [`ShellError::Failed`] if program exits unsuccessfully.
    #[track_caller]
    pub fn run(&self) -> Result<()> {
        let location = Location::caller();
        info!("run {self}");
        let status = self
            .command()
            .status()
            .map_err(|source| ShellError::Spawn {
                command: self.to_string(),
                source,
            })?;
        self.check(status, location)
    }

    /// Run command, capturing standard output.
    ///
    /// Standard error is still shown to the user. Trailing newlines are
    /// chomped from the returned output.
    ///
    /// # Errors
    ///
    /// - Return [`ShellError::Spawn`] if program cannot be started.
    /// - Return [`ShellError::Failed`] if program exits unsuccessfully.
    #[track_caller]
    pub fn output(&self) -> Result<String> {
        let location = Location::caller();
        debug!("capture {self}");
        let output = self
            .command()
            .stderr(std::process::Stdio::inherit())
            .output()
            .map_err(|source| ShellError::Spawn {
                command: self.to_string(),
                source,
            })?;
        let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
        self.check(output.status, location)?;

        Ok(stdout.trim_end_matches(['\r', '\n']).to_string())
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.envs(self.envs.iter().map(|(key, value)| (key, value)));
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        command
    }

    fn check(&self, status: ExitStatus, location: &'static Location<'static>) -> Result<()> {
        if status.success() {
            return Ok(());
        }

        Err(ShellError::Failed {
            command: self.to_string(),
            status,
            location: format!("{}:{}", location.file(), location.line()),
        })
    }
}

impl Display for Cmd {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        if let Some(dir) = &self.current_dir {
            write!(fmt, "(cd {} && ", quote(dir.to_string_lossy().as_ref()))?;
        }

        let words = self
            .envs
            .iter()
            .map(|(key, value)| format!("{key}={}", quote(value)))
            .chain(std::iter::once(quote(&self.program)))
            .chain(self.args.iter().map(|arg| quote(arg)))
            .collect::<Vec<_>>();
        fmt.write_str(words.join(" ").as_str())?;

        if self.current_dir.is_some() {
            fmt.write_str(")")?;
        }

        Ok(())
    }
}

/// Whether to execute commands or only print them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Execute commands.
    #[default]
    Live,

    /// Print commands to standard output instead of executing them.
    DryRun,
}

impl Mode {
    /// Check if commands are only printed.
    pub fn is_dry_run(self) -> bool {
        self == Self::DryRun
    }

    /// Run command, or print it under [`Mode::DryRun`].
    ///
    /// # Errors
    ///
    /// - Return [`ShellError`] if the command fails in [`Mode::Live`].
    #[track_caller]
    pub fn run(self, cmd: &Cmd) -> Result<()> {
        match self {
            Self::Live => cmd.run(),
            Self::DryRun => {
                println!("dry-run: {cmd}");
                Ok(())
            }
        }
    }

    /// Capture output of command, or print it under [`Mode::DryRun`].
    ///
    /// Yields `None` when nothing was executed.
    ///
    /// # Errors
    ///
    /// - Return [`ShellError`] if the command fails in [`Mode::Live`].
    #[track_caller]
    pub fn output(self, cmd: &Cmd) -> Result<Option<String>> {
        match self {
            Self::Live => cmd.output().map(Some),
            Self::DryRun => {
                println!("dry-run: {cmd}");
                Ok(None)
            }
        }
    }
}

/// Quote a word for POSIX shells only if it needs quoting.
pub fn quote(word: &str) -> String {
    let is_plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if is_plain {
        return word.to_string();
    }

    format!("'{}'", word.replace('\'', r"'\''"))
}

/// External command error types.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// Program could not be started at all.
    #[error("failed to start {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Program ran, but exited unsuccessfully.
    #[error("command {command} failed with {status} (called at {location})")]
    Failed {
        command: String,
        status: ExitStatus,
        location: String,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ShellError> = std::result::Result<T, E>;
