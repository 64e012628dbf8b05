// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Native package manager facade.
//!
//! Uniform `refresh` and `install` operations dispatched on the classified
//! [`Distro`]. The dispatch table is a closed match over [`Distro`], so
//! supporting another package manager means adding a variant there and a
//! branch here.
//!
//! Under [`Distro::Unknown`] both operations degrade to a warning instead of
//! failing, so the rest of a run can still attempt installs that only need
//! `curl` or `git`.

use crate::{
    host::{Distro, Host},
    shell::{Cmd, Mode, ShellError},
};

use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Package manager of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageManager {
    host: Host,
    mode: Mode,
}

impl PackageManager {
    /// Construct new package manager facade for target host.
    ///
    /// Under [`Mode::DryRun`] package manager commands are printed instead
    /// of executed.
    pub fn new(host: Host, mode: Mode) -> Self {
        Self { host, mode }
    }

    /// Command that refreshes the package index, if the host has one.
    pub fn refresh_command(&self) -> Option<Cmd> {
        let cmd = match self.host.distro {
            Distro::ArchLike => Cmd::new("pacman").args(["-Sy", "--noconfirm"]),
            Distro::DebianLike => Cmd::new("apt-get")
                .args(["update", "-y"])
                .env("DEBIAN_FRONTEND", "noninteractive"),
            Distro::Unknown => return None,
        };

        Some(cmd.escalate(self.host.privilege))
    }

    /// Command that installs target packages, if the host has one.
    pub fn install_command<I, S>(&self, names: I) -> Option<Cmd>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cmd = match self.host.distro {
            Distro::ArchLike => Cmd::new("pacman").args(["-S", "--needed", "--noconfirm"]),
            Distro::DebianLike => Cmd::new("apt-get")
                .args(["install", "-y"])
                .env("DEBIAN_FRONTEND", "noninteractive"),
            Distro::Unknown => return None,
        };

        Some(cmd.args(names).escalate(self.host.privilege))
    }

    /// Refresh package index.
    ///
    /// # Errors
    ///
    /// - Return [`ShellError`] if the package manager fails.
    #[instrument(skip(self), level = "debug")]
    pub fn refresh_index(&self) -> Result<()> {
        match self.refresh_command() {
            Some(cmd) => self.mode.run(&cmd),
            None => {
                warn!("unknown distribution, skip package index refresh");
                Ok(())
            }
        }
    }

    /// Install a listing of packages.
    ///
    /// Installing nothing is a no-op.
    ///
    /// # Errors
    ///
    /// - Return [`ShellError`] if the package manager fails.
    #[instrument(skip(self, names), level = "debug")]
    pub fn install_packages(&self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }

        match self.install_command(names.iter().cloned()) {
            Some(cmd) => {
                info!("install packages: {}", names.join(" "));
                self.mode.run(&cmd)
            }
            None => {
                warn!(
                    "unknown distribution, skip installing packages: {}",
                    names.join(" ")
                );
                Ok(())
            }
        }
    }
}

/// Package names that differ between distribution families.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct DistroPackages {
    /// Packages for arch-like distributions.
    pub arch: Vec<String>,

    /// Packages for debian-like distributions.
    pub debian: Vec<String>,
}

impl DistroPackages {
    /// Select package names for target distribution.
    ///
    /// Unknown distributions report the debian-like names, which are only
    /// ever used to tell the user what got skipped.
    pub fn for_distro(&self, distro: Distro) -> &[String] {
        match distro {
            Distro::ArchLike => &self.arch,
            Distro::DebianLike | Distro::Unknown => &self.debian,
        }
    }
}

/// Friendly result alias :3
type Result<T, E = ShellError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Privilege;
    use pretty_assertions::assert_eq;

    #[test]
    fn arch_commands() {
        let pm = PackageManager::new(Host::new(Distro::ArchLike, Privilege::Root), Mode::Live);
        assert_eq!(
            pm.refresh_command().map(|cmd| cmd.to_string()),
            Some("pacman -Sy --noconfirm".into())
        );
        assert_eq!(
            pm.install_command(["curl", "tar"]).map(|cmd| cmd.to_string()),
            Some("pacman -S --needed --noconfirm curl tar".into())
        );
    }

    #[test]
    fn debian_commands_through_sudo() {
        let pm = PackageManager::new(
            Host::new(Distro::DebianLike, Privilege::SudoPrefixed),
            Mode::Live,
        );
        assert_eq!(
            pm.refresh_command().map(|cmd| cmd.to_string()),
            Some("sudo DEBIAN_FRONTEND=noninteractive apt-get update -y".into())
        );
        assert_eq!(
            pm.install_command(["build-essential"]).map(|cmd| cmd.to_string()),
            Some("sudo DEBIAN_FRONTEND=noninteractive apt-get install -y build-essential".into())
        );
    }

    #[test]
    fn unknown_distro_degrades() -> anyhow::Result<()> {
        let pm = PackageManager::new(
            Host::new(Distro::Unknown, Privilege::SudoPrefixed),
            Mode::Live,
        );
        assert_eq!(pm.refresh_command(), None);
        assert_eq!(pm.install_command(["curl"]), None);

        // Nothing gets executed, so nothing can fail.
        pm.refresh_index()?;
        pm.install_packages(&["curl".to_string(), "tar".to_string()])?;

        Ok(())
    }

    #[test]
    fn dry_run_prints_package_commands() -> anyhow::Result<()> {
        // Neither pacman nor sudo get spawned, whatever the build host has.
        let pm = PackageManager::new(
            Host::new(Distro::ArchLike, Privilege::SudoPrefixed),
            Mode::DryRun,
        );
        pm.refresh_index()?;
        pm.install_packages(&["base-devel".to_string()])?;

        Ok(())
    }

    #[test]
    fn select_distro_packages() {
        let packages = DistroPackages {
            arch: vec!["base-devel".into()],
            debian: vec!["build-essential".into()],
        };
        assert_eq!(packages.for_distro(Distro::ArchLike), ["base-devel"]);
        assert_eq!(packages.for_distro(Distro::DebianLike), ["build-essential"]);
        assert_eq!(packages.for_distro(Distro::Unknown), ["build-essential"]);
    }
}
