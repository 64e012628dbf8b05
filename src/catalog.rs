// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Installer catalog layout.
//!
//! Every installation step pulls its data (download URLs, repository URLs,
//! target directories, profile lines) from the __catalog__. The catalog that
//! ships with devstrap is compiled into the binary from
//! `assets/catalog.toml`, so the steps themselves stay free of hard coded
//! locations.
//!
//! # Path Expansion
//!
//! Fields typed as [`HostPath`] are shell expanded at load time, so `~` and
//! `$HOME` resolve to the invoking user's home directory. Profile lines are
//! plain strings, and are written verbatim so the shell expands them at
//! startup instead.

use crate::package::DistroPackages;

use serde::Deserialize;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

const BUILTIN: &str = include_str!("../assets/catalog.toml");

/// Data for every installation step and the fixed shell conveniences.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct Catalog {
    pub neovim: EditorEntry,
    pub lazyvim: StarterEntry,
    pub fzf: FuzzyFinderEntry,
    pub zoxide: JumperEntry,
    pub ripgrep: SearchToolEntry,
    pub shell: ShellConveniences,
}

impl Catalog {
    /// Load catalog compiled into devstrap.
    ///
    /// # Errors
    ///
    /// - Return [`CatalogError::Deserialize`] if catalog is malformed.
    /// - Return [`CatalogError::ShellExpansion`] if a path cannot be expanded.
    pub fn builtin() -> Result<Self> {
        BUILTIN.parse()
    }

    fn expand_paths(&mut self) -> Result<()> {
        let neovim = &mut self.neovim;
        for path in [
            &mut neovim.archive,
            &mut neovim.extract_dir,
            &mut neovim.install_dir,
            &mut neovim.link_dir,
            &mut neovim.path_snippet,
        ] {
            path.expand()?;
        }

        self.lazyvim.config_dir.expand()?;
        for path in &mut self.lazyvim.extra_backups {
            path.expand()?;
        }

        self.fzf.install_dir.expand()?;
        self.zoxide.bin_dir.expand()?;
        self.ripgrep.source_dir.expand()?;
        self.ripgrep.cargo_home.expand()?;

        Ok(())
    }
}

impl FromStr for Catalog {
    type Err = CatalogError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut catalog: Catalog = toml::de::from_str(data)?;

        // INVARIANT: Expand path fields, never profile lines.
        catalog.expand_paths()?;

        Ok(catalog)
    }
}

/// Editor release archive.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct EditorEntry {
    /// Release archive to download.
    pub url: String,

    /// Temporary download location of archive.
    pub archive: HostPath,

    /// Directory the archive is extracted into.
    pub extract_dir: HostPath,

    /// Directory the archive produces once extracted.
    pub install_dir: HostPath,

    /// Editor binary relative to install directory.
    pub binary: PathBuf,

    /// Directory that receives a stable symlink to the binary.
    pub link_dir: HostPath,

    /// System-wide snippet that adds link directory to `PATH`.
    pub path_snippet: HostPath,

    /// Commands needed to fetch and unpack the archive.
    pub prerequisites: Vec<String>,

    /// Profile line that adds editor to `PATH`.
    pub profile_line: String,

    /// Short-name alias for the editor.
    pub alias: AliasEntry,
}

/// Editor starter configuration.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct StarterEntry {
    pub url: String,
    pub config_dir: HostPath,
    pub extra_backups: Vec<HostPath>,
}

/// Fuzzy finder repository.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct FuzzyFinderEntry {
    pub url: String,
    pub install_dir: HostPath,
    pub installer_args: Vec<String>,
}

/// Directory jumper install script.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct JumperEntry {
    pub script_url: String,
    pub bin_dir: HostPath,
    pub shell: String,
    pub path_line: String,
    pub init_line: String,
}

/// Search tool source build.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct SearchToolEntry {
    pub url: String,
    pub source_dir: HostPath,
    pub toolchain_packages: DistroPackages,
    pub toolchain_script: String,
    pub cargo_home: HostPath,
    pub path_line: String,
}

/// Aliases and functions registered on every run.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct ShellConveniences {
    #[serde(default, rename = "alias")]
    pub aliases: Vec<AliasEntry>,

    #[serde(default, rename = "function")]
    pub functions: Vec<FunctionEntry>,
}

/// Alias identified by name.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct AliasEntry {
    pub name: String,
    pub expansion: String,
}

/// Shell function identified by name.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct FunctionEntry {
    pub name: String,
    pub body: Vec<String>,
}

/// Path on the host, shell expanded at load time.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct HostPath(PathBuf);

impl HostPath {
    /// Construct new host path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Treat host path as [`Path`] slice.
    pub fn as_path(&self) -> &Path {
        self.0.as_path()
    }

    fn expand(&mut self) -> Result<()> {
        let expanded = shellexpand::full(self.0.to_string_lossy().as_ref())?.into_owned();
        self.0 = PathBuf::from(expanded);
        Ok(())
    }
}

impl AsRef<Path> for HostPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl Display for HostPath {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_path().to_string_lossy().as_ref())
    }
}

/// Catalog error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum CatalogError {
    /// Failed to deserialize catalog.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to perform shell expansion on catalog path.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

/// Friendly result alias :3
type Result<T, E = CatalogError> = std::result::Result<T, E>;
