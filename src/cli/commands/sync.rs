use std::{env, path::Path};

use anyhow::{Context, Result};

use super::{CommandResult, CommandSummary, SyncSummary};
use crate::{
    cli::args::SyncCommand,
    config::{Config, load_config},
    core::{registry::Registry, sync::run},
    formats::scanners::ScanOptions,
};

pub fn sync(cmd: SyncCommand) -> Result<CommandResult> {
    let start_dir = match &cmd.common.root {
        Some(root) => root.clone(),
        None => env::current_dir().context("Failed to get current directory")?,
    };
    let loaded = load_config(&start_dir)?;
    if !loaded.from_file {
        tracing::debug!("No config file found, using defaults");
    }

    let config = apply_overrides(loaded.config, &cmd);
    let mut options = config.to_sync_options(&loaded.base_dir)?;
    options.dry_run = cmd.dry_run;

    let registry = Registry::with_defaults(scan_options(&config));
    let result = run(&options, &registry)?;

    Ok(CommandResult::new(CommandSummary::Sync(SyncSummary {
        result,
        base_dir: loaded.base_dir,
        verbose: cmd.common.verbose,
    })))
}

/// Command line values replace the config file's, list by list.
fn apply_overrides(mut config: Config, cmd: &SyncCommand) -> Config {
    if !cmd.sources.is_empty() {
        config.sources = cmd.sources.clone();
    }
    if !cmd.domains.is_empty() {
        config.domains = cmd.domains.clone();
    }
    if let Some(domain) = &cmd.default_domain {
        config.default_domain = Some(domain.clone());
    }
    if cmd.purge_obsolete {
        config.purge_obsolete = true;
    }
    config
}

fn scan_options(config: &Config) -> ScanOptions {
    if config.comment_prefixes.is_empty() {
        ScanOptions::default()
    } else {
        ScanOptions {
            comment_prefixes: config.comment_prefixes.clone(),
        }
    }
}

/// Shown path for a written or failed target.
pub fn display_path(path: &Path, base_dir: &Path) -> String {
    path.strip_prefix(base_dir)
        .unwrap_or(path)
        .display()
        .to_string()
}
