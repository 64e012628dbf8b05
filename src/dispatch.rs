// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Step dispatch.
//!
//! Runs the selected installation steps in their fixed order, and then
//! always registers the fixed set of shell aliases and functions. In dry-run
//! mode the steps still run, but every command they would execute and every
//! profile registration is printed instead.
//!
//! The first failing step stops the run. Steps that already completed are
//! not rolled back.

use crate::{
    install::{Context, Result, Step},
    profile::Change,
};

use std::collections::BTreeSet;
use tracing::{debug, info};

/// Set of steps selected for a run.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    steps: BTreeSet<Step>,
}

impl Selection {
    /// Select every step.
    pub fn all() -> Self {
        Step::ORDER.into_iter().collect()
    }

    /// Select nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add step to selection.
    pub fn insert(&mut self, step: Step) {
        self.steps.insert(step);
    }

    /// Check if nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate selected steps in run order.
    pub fn iter(&self) -> impl Iterator<Item = Step> + '_ {
        Step::ORDER
            .into_iter()
            .filter(|step| self.steps.contains(step))
    }
}

impl FromIterator<Step> for Selection {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

/// Drive installation steps and shell convenience registration.
#[derive(Debug)]
pub struct Dispatcher<'a> {
    ctx: Context<'a>,
}

impl<'a> Dispatcher<'a> {
    /// Construct new dispatcher.
    ///
    /// Whether steps execute or only print is decided by the mode of the
    /// context.
    pub fn new(ctx: Context<'a>) -> Self {
        Self { ctx }
    }

    /// Run selected steps, then register shell conveniences.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError`](crate::install::InstallError) of the first
    ///   step that fails. No later step runs.
    pub fn run(&self, selection: &Selection) -> Result<()> {
        info!("detected distribution: {}", self.ctx.host.distro);
        if selection.is_empty() {
            debug!("no install step selected");
        }

        for step in selection.iter() {
            if self.ctx.mode.is_dry_run() {
                println!("dry-run: step {step}");
            }
            step.run(&self.ctx)?;
        }

        self.register_conveniences()
    }

    /// Register fixed aliases and functions in shell profile.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::Profile`](crate::install::InstallError::Profile)
    ///   if profile cannot be modified.
    pub fn register_conveniences(&self) -> Result<()> {
        let shell = &self.ctx.catalog.shell;

        let mut added = 0usize;
        for alias in &shell.aliases {
            if self.ctx.ensure_alias(&alias.name, &alias.expansion)? == Some(Change::Added) {
                added += 1;
            }
        }

        for function in &shell.functions {
            if self.ctx.ensure_function(&function.name, &function.body)? == Some(Change::Added) {
                added += 1;
            }
        }

        if !self.ctx.mode.is_dry_run() {
            info!(
                "registered {added} new shell conveniences in {}",
                self.ctx.profile.path().display()
            );
        }

        Ok(())
    }
}
