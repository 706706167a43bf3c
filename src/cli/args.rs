//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `sync`: Scan sources and update every domain's catalog files
//! - `init`: Initialize msgsync configuration file
//! - `formats`: List supported file suffixes

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::config::{DomainConfig, SourceConfig};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Sync(cmd)) => cmd.common.verbose,
            Some(Command::Init) | Some(Command::Formats) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Directory to start looking for the config file from (default: current directory)
    #[arg(long, env = "MSGSYNC_ROOT")]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Source directory to scan, optionally with a regex the file path must match.
    /// Can be specified multiple times; replaces the sources from the config file
    #[arg(long = "source", value_name = "PATH[=REGEX]", value_parser = parse_source)]
    pub sources: Vec<SourceConfig>,

    /// Domain and its target files, the first being the primary target.
    /// Can be specified multiple times; replaces the domains from the config file
    #[arg(long = "domain", value_name = "NAME=TARGET[,TARGET...]", value_parser = parse_domain)]
    pub domains: Vec<DomainConfig>,

    /// Domain for strings whose call names none (overrides config file)
    #[arg(long)]
    pub default_domain: Option<String>,

    /// Drop entries no longer found in the sources instead of marking them obsolete
    #[arg(long)]
    pub purge_obsolete: bool,

    /// Show what would be written without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable strings and update catalog files
    Sync(SyncCommand),
    /// Initialize a new .msgsyncrc.json configuration file
    Init,
    /// List supported file suffixes and what can be done with them
    Formats,
}

fn parse_source(raw: &str) -> Result<SourceConfig, String> {
    let (path, pattern) = match raw.split_once('=') {
        Some((path, pattern)) => (path, Some(pattern.to_string())),
        None => (raw, None),
    };
    if path.is_empty() {
        return Err("source path must not be empty".to_string());
    }
    Ok(SourceConfig {
        path: path.to_string(),
        pattern,
    })
}

fn parse_domain(raw: &str) -> Result<DomainConfig, String> {
    let Some((name, targets)) = raw.split_once('=') else {
        return Err("expected NAME=TARGET[,TARGET...]".to_string());
    };
    if name.is_empty() {
        return Err("domain name must not be empty".to_string());
    }
    let targets: Vec<String> = targets
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if targets.is_empty() {
        return Err(format!("domain \"{}\" needs at least one target", name));
    }
    Ok(DomainConfig {
        name: name.to_string(),
        targets,
    })
}
