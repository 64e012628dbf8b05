// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Personal Linux environment bootstrap.
//!
//! Devstrap detects the host distribution, installs a fixed set of developer
//! tools, and appends shell configuration to the user's shell profile. Every
//! profile mutation is idempotent, and every configuration that gets replaced
//! is backed up first, so devstrap can be re-run as often as needed.

pub mod backup;
pub mod catalog;
pub mod dispatch;
pub mod git;
pub mod host;
pub mod install;
pub mod package;
pub mod path;
pub mod profile;
pub mod shell;
