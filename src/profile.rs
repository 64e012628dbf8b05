// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shell profile mutation.
//!
//! Idempotent insertion of lines, aliases, and functions into the user's
//! shell startup file.
//!
//! # Identity Rules
//!
//! Each kind of entry has its own notion of "already present":
//!
//! - __Lines__ are identified by their exact text. A line is appended only if
//!   no existing line of the profile matches it character for character.
//! - __Aliases__ are identified by name only. If the profile declares an
//!   alias with the same name, nothing is written, even if the existing
//!   expansion differs from the requested one.
//! - __Functions__ are identified by name only. Existence is checked
//!   structurally through a function declaration pattern, and the body of an
//!   existing function is never compared or updated.
//!
//! Profiles are byte streams. Bytes that are not valid UTF-8, e.g., a Latin-1
//! comment, are replaced for the existence checks only, and are never
//! rewritten.
//!
//! The profile is re-read on every call. Nothing is cached between calls, so
//! any number of runs can be stacked on top of each other without producing
//! duplicate entries.

use mkdirp::mkdirp;
use regex::Regex;
use std::{
    fmt::Write as FmtWrite,
    fs::{read, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Outcome of an idempotent profile mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Entry was appended to the profile.
    Added,

    /// Entry was already present, profile left untouched.
    Present,
}

/// Handle on a shell startup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    path: PathBuf,
}

impl Profile {
    /// Construct new profile handle.
    ///
    /// The file does not need to exist yet, it is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to profile file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append line iff no existing line matches it exactly.
    ///
    /// # Errors
    ///
    /// - Return [`ProfileError::Read`] if profile cannot be read.
    /// - Return [`ProfileError::Write`] if profile cannot be appended to.
    #[instrument(skip(self), level = "debug")]
    pub fn ensure_line(&self, line: &str) -> Result<Change> {
        let content = self.read()?;
        if String::from_utf8_lossy(&content)
            .lines()
            .any(|existing| existing == line)
        {
            info!("line already present in {}: {line}", self.path.display());
            return Ok(Change::Present);
        }

        self.append(&content, &format!("{line}\n"))?;
        info!("added line to {}: {line}", self.path.display());

        Ok(Change::Added)
    }

    /// Append alias declaration iff no alias of the same name is declared.
    ///
    /// The expansion of an existing alias is not compared, so a different
    /// expansion for a known name is left as is.
    ///
    /// # Errors
    ///
    /// - Return [`ProfileError::Read`] if profile cannot be read.
    /// - Return [`ProfileError::Write`] if profile cannot be appended to.
    #[instrument(skip(self), level = "debug")]
    pub fn ensure_alias(&self, name: &str, expansion: &str) -> Result<Change> {
        let content = self.read()?;
        if let Some(existing) = find_alias(&String::from_utf8_lossy(&content), name)? {
            info!("alias {name} already declared: {}", existing.trim());
            return Ok(Change::Present);
        }

        let declaration = render_alias(name, expansion);
        self.append(&content, &format!("{declaration}\n"))?;
        info!("added alias to {}: {declaration}", self.path.display());

        Ok(Change::Added)
    }

    /// Append function block iff no function of the same name is declared.
    ///
    /// # Errors
    ///
    /// - Return [`ProfileError::Read`] if profile cannot be read.
    /// - Return [`ProfileError::Write`] if profile cannot be appended to.
    #[instrument(skip(self, body), level = "debug")]
    pub fn ensure_function(
        &self,
        name: &str,
        body: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Change> {
        let content = self.read()?;
        if has_function(&String::from_utf8_lossy(&content), name)? {
            info!("function {name} already declared in {}", self.path.display());
            return Ok(Change::Present);
        }

        self.append(&content, &render_function(name, body))?;
        info!("added function {name} to {}", self.path.display());

        Ok(Change::Added)
    }

    fn read(&self) -> Result<Vec<u8>> {
        match read(&self.path) {
            Ok(content) => Ok(content),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(ProfileError::Read {
                source,
                profile_path: self.path.clone(),
            }),
        }
    }

    fn append(&self, current: &[u8], entry: &str) -> Result<()> {
        let write_error = |source| ProfileError::Write {
            source,
            profile_path: self.path.clone(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            mkdirp(parent).map_err(write_error)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_error)?;

        // INVARIANT: Never glue a new entry onto an unterminated last line.
        let mut out = String::new();
        if current.last().is_some_and(|byte| *byte != b'\n') {
            out.push('\n');
        }
        out.push_str(entry);

        file.write_all(out.as_bytes()).map_err(write_error)
    }
}

/// Find existing declaration of alias by name.
///
/// # Errors
///
/// - Return [`ProfileError::Pattern`] if the alias pattern cannot be built.
pub fn find_alias<'a>(content: &'a str, name: &str) -> Result<Option<&'a str>> {
    let pattern = Regex::new(&format!(r"^\s*alias\s+{}=", regex::escape(name)))?;
    Ok(content.lines().find(|line| pattern.is_match(line)))
}

/// Check if a function of target name is declared.
///
/// Matches both `name() {` and `function name {` forms.
///
/// # Errors
///
/// - Return [`ProfileError::Pattern`] if the function pattern cannot be built.
pub fn has_function(content: &str, name: &str) -> Result<bool> {
    let name = regex::escape(name);
    let pattern = Regex::new(&format!(
        r"^\s*(function\s+{name}(\s*\(\s*\))?|{name}\s*\(\s*\))\s*(\{{|$)"
    ))?;
    Ok(content.lines().any(|line| pattern.is_match(line)))
}

/// Render alias declaration with single-quoted expansion.
pub fn render_alias(name: &str, expansion: &str) -> String {
    format!("alias {name}='{}'", expansion.replace('\'', r"'\''"))
}

/// Render function block with start and end markers.
pub fn render_function(name: &str, body: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# >>> devstrap function {name} >>>");
    let _ = writeln!(out, "{name}() {{");
    for line in body {
        let line = line.as_ref();
        if line.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "    {line}");
        }
    }
    out.push_str("}\n");
    let _ = writeln!(out, "# <<< devstrap function {name} <<<");

    out
}

/// Shell profile error types.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// Profile cannot be read from.
    #[error("failed to read from profile at {:?}", profile_path.display())]
    Read {
        #[source]
        source: std::io::Error,
        profile_path: PathBuf,
    },

    /// Profile cannot be written to.
    #[error("failed to write to profile at {:?}", profile_path.display())]
    Write {
        #[source]
        source: std::io::Error,
        profile_path: PathBuf,
    },

    /// Declaration pattern cannot be built.
    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// Friendly result alias :3
pub type Result<T, E = ProfileError> = std::result::Result<T, E>;
