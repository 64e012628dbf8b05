// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use devstrap::{
    catalog::Catalog,
    dispatch::{Dispatcher, Selection},
    host::Host,
    install::{Context, Step},
    path::default_profile_path,
    profile::Profile,
    shell::Mode,
};

use anyhow::Result;
use clap::Parser;
use std::process::exit;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Bootstrap a personal Linux environment.
///
/// Installs the selected developer tools, then registers a fixed set of
/// shell aliases and functions in ~/.bashrc. Without any step flag only the
/// aliases and functions are registered.
#[derive(Debug, Clone, Parser)]
#[command(
    override_usage = "devstrap [--all] [--neovim] [--lazyvim] [--fzf] [--zoxide] [--rg] [--dry-run] [-h|--help]",
    version
)]
struct Cli {
    /// Run every installation step.
    #[arg(long)]
    pub all: bool,

    /// Install neovim from its release archive.
    #[arg(long)]
    pub neovim: bool,

    /// Install the lazyvim starter configuration, requires neovim.
    #[arg(long)]
    pub lazyvim: bool,

    /// Install fzf.
    #[arg(long)]
    pub fzf: bool,

    /// Install zoxide.
    #[arg(long)]
    pub zoxide: bool,

    /// Build and install ripgrep from source.
    #[arg(long)]
    pub rg: bool,

    /// Print step commands instead of executing them.
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    fn selection(&self) -> Selection {
        if self.all {
            return Selection::all();
        }

        Step::ORDER
            .into_iter()
            .filter(|step| match step {
                Step::Neovim => self.neovim,
                Step::Lazyvim => self.lazyvim,
                Step::Fzf => self.fzf,
                Step::Zoxide => self.zoxide,
                Step::Ripgrep => self.rg,
            })
            .collect()
    }

    fn mode(&self) -> Mode {
        if self.dry_run {
            Mode::DryRun
        } else {
            Mode::Live
        }
    }

    fn run(self) -> Result<()> {
        let host = Host::detect();
        let catalog = Catalog::builtin()?;
        let profile = Profile::new(default_profile_path()?);
        let ctx = Context::new(host, self.mode(), &profile, &catalog);

        Dispatcher::new(ctx).run(&self.selection())?;

        Ok(())
    }
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    // INVARIANT: Usage errors exit with 2 through clap before any work starts.
    let cli = Cli::parse();

    if let Err(error) = cli.run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn individual_flags_select_steps() {
        let cli = Cli::parse_from(["devstrap", "--rg", "--neovim", "--dry-run"]);
        assert_eq!(
            cli.selection().iter().collect::<Vec<_>>(),
            vec![Step::Neovim, Step::Ripgrep]
        );
        assert_eq!(cli.mode(), Mode::DryRun);
    }

    #[test]
    fn all_flag_selects_everything() {
        let cli = Cli::parse_from(["devstrap", "--all", "--fzf"]);
        assert_eq!(cli.selection(), Selection::all());
        assert_eq!(cli.mode(), Mode::Live);
    }

    #[test]
    fn no_flags_select_nothing() {
        let cli = Cli::parse_from(["devstrap"]);
        assert!(cli.selection().is_empty());
    }

    #[test]
    fn usage_lists_every_flag() {
        let usage = Cli::command().render_usage().to_string();
        let flags = [
            "--all",
            "--neovim",
            "--lazyvim",
            "--fzf",
            "--zoxide",
            "--rg",
            "--dry-run",
            "-h|--help",
        ];
        for flag in flags {
            assert!(usage.contains(flag), "{flag} missing from {usage}");
        }
    }

    #[test]
    fn unknown_flag_is_usage_error() {
        let error = Cli::try_parse_from(["devstrap", "--unknownflag"]).unwrap_err();
        assert_eq!(error.exit_code(), 2);
    }
}
