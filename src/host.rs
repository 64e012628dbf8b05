// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Host identity.
//!
//! Devstrap needs to know two things about the machine it runs on: which
//! family of package manager the distribution uses, and whether commands
//! that touch system locations need a `sudo` prefix. Both are computed once
//! at startup through [`Host::detect`], and then handed to every component
//! that needs them.
//!
//! # Distribution Classification
//!
//! The distribution is read from the `os-release` metadata file. The `ID`
//! field is matched exactly (ignoring case) against a fixed table of known
//! identifiers. If `ID` is not known, each token of `ID_LIKE` is tried
//! against the same table. Anything else, including a missing or unreadable
//! file, classifies as [`Distro::Unknown`]. Classification never fails.
//!
//! # See Also
//!
//! - [os-release(5)](https://www.freedesktop.org/software/systemd/man/latest/os-release.html)

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::read_to_string,
};
use tracing::{debug, instrument};

const OS_RELEASE_PATHS: [&str; 2] = ["/etc/os-release", "/usr/lib/os-release"];

const ARCH_LIKE: &[&str] = &["arch", "archarm", "manjaro", "endeavouros", "garuda", "artix"];

const DEBIAN_LIKE: &[&str] = &[
    "debian",
    "ubuntu",
    "linuxmint",
    "pop",
    "elementary",
    "zorin",
    "kali",
    "raspbian",
    "neon",
];

/// Package manager family of the host distribution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Distro {
    /// Distributions managed through pacman.
    ArchLike,

    /// Distributions managed through apt.
    DebianLike,

    /// Anything we do not know how to install native packages on.
    #[default]
    Unknown,
}

impl Distro {
    /// Classify distribution from raw os-release content.
    pub fn from_os_release(content: &str) -> Self {
        let mut id = None;
        let mut id_like = None;
        for line in content.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };

            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            match key.trim() {
                "ID" => id = Some(value),
                "ID_LIKE" => id_like = Some(value),
                _ => continue,
            }
        }

        id.into_iter()
            .chain(id_like.into_iter().flat_map(str::split_whitespace))
            .map(Self::from_id)
            .find(|distro| *distro != Self::Unknown)
            .unwrap_or_default()
    }

    /// Classify a single distribution identifier.
    pub fn from_id(id: &str) -> Self {
        let id = id.trim().to_ascii_lowercase();
        if ARCH_LIKE.contains(&id.as_str()) {
            Self::ArchLike
        } else if DEBIAN_LIKE.contains(&id.as_str()) {
            Self::DebianLike
        } else {
            Self::Unknown
        }
    }

    /// Classify the running host.
    ///
    /// Reads the first os-release file that can be read. Missing metadata
    /// yields [`Distro::Unknown`].
    #[instrument(level = "debug")]
    pub fn detect() -> Self {
        for path in OS_RELEASE_PATHS {
            match read_to_string(path) {
                Ok(content) => return Self::from_os_release(&content),
                Err(error) => debug!("cannot read {path}: {error}"),
            }
        }

        Self::Unknown
    }
}

impl Display for Distro {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::ArchLike => fmt.write_str("arch-like"),
            Self::DebianLike => fmt.write_str("debian-like"),
            Self::Unknown => fmt.write_str("unknown"),
        }
    }
}

/// Whether commands must be escalated through `sudo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Effective user is the superuser, no prefix needed.
    Root,

    /// Everyone else.
    SudoPrefixed,
}

impl Privilege {
    /// Resolve privilege mode from an effective user id.
    pub fn from_euid(euid: u32) -> Self {
        if euid == 0 {
            Self::Root
        } else {
            Self::SudoPrefixed
        }
    }

    /// Resolve privilege mode of the current process.
    pub fn detect() -> Self {
        // SAFETY: geteuid has no preconditions and cannot fail.
        let euid = unsafe { libc::geteuid() };
        Self::from_euid(euid)
    }
}

/// Identity of the machine devstrap runs on.
///
/// # Invariant
///
/// - Computed once per process, never re-derived mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Host {
    pub distro: Distro,
    pub privilege: Privilege,
}

impl Host {
    /// Construct host identity from known parts.
    pub fn new(distro: Distro, privilege: Privilege) -> Self {
        Self { distro, privilege }
    }

    /// Detect identity of the running host.
    pub fn detect() -> Self {
        Self::new(Distro::detect(), Privilege::detect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test_case("arch", Distro::ArchLike; "arch")]
    #[test_case("Manjaro", Distro::ArchLike; "manjaro mixed case")]
    #[test_case("endeavouros", Distro::ArchLike; "endeavouros")]
    #[test_case("debian", Distro::DebianLike; "debian")]
    #[test_case("UBUNTU", Distro::DebianLike; "ubuntu upper case")]
    #[test_case("linuxmint", Distro::DebianLike; "linuxmint")]
    #[test_case("pop", Distro::DebianLike; "pop os")]
    #[test_case("fedora", Distro::Unknown; "fedora")]
    #[test_case("arch-ish", Distro::Unknown; "no prefix matching")]
    #[test_case("", Distro::Unknown; "empty")]
    #[test]
    fn classify_identifier(id: &str, expect: Distro) {
        pretty_assertions::assert_eq!(Distro::from_id(id), expect);
    }

    #[test]
    fn classify_os_release_by_id() {
        let content = indoc! {r#"
            NAME="Ubuntu"
            VERSION_ID="24.04"
            ID=ubuntu
            ID_LIKE=debian
            PRETTY_NAME="Ubuntu 24.04 LTS"
        "#};
        assert_eq!(Distro::from_os_release(content), Distro::DebianLike);

        let content = indoc! {r#"
            NAME="Arch Linux"
            ID="arch"
        "#};
        assert_eq!(Distro::from_os_release(content), Distro::ArchLike);
    }

    #[test]
    fn classify_os_release_by_id_like() {
        let content = indoc! {r#"
            NAME="CachyOS Linux"
            ID=cachyos
            ID_LIKE="arch"
        "#};
        assert_eq!(Distro::from_os_release(content), Distro::ArchLike);
    }

    #[test]
    fn classify_os_release_unknown() {
        let content = indoc! {r#"
            NAME="Fedora Linux"
            ID=fedora
            ID_LIKE="rhel centos"
        "#};
        assert_eq!(Distro::from_os_release(content), Distro::Unknown);
        assert_eq!(Distro::from_os_release(""), Distro::Unknown);
        assert_eq!(Distro::from_os_release("garbage\n=\nID"), Distro::Unknown);
    }

    #[test]
    fn resolve_privilege() {
        assert_eq!(Privilege::from_euid(0), Privilege::Root);
        assert_eq!(Privilege::from_euid(1000), Privilege::SudoPrefixed);
    }
}
