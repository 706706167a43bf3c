//! The sync run: walk, extract, merge, persist.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::{
    data::Headers,
    domains::DomainSet,
    error::ConfigError,
    extract::{ExtractStats, extract},
    merge::MergeOptions,
    persist::{DomainStats, PersistOptions, TargetFailure, finalize},
    registry::Registry,
    walker::{Ignores, SourceRoot, SourceWalker, is_glob_pattern},
};

/// A domain and the files it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSpec {
    pub name: String,
    pub targets: Vec<PathBuf>,
}

impl DomainSpec {
    pub fn new<P: Into<PathBuf>>(name: &str, targets: impl IntoIterator<Item = P>) -> Self {
        Self {
            name: name.to_string(),
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything one run needs. Paths are used as given; resolving them
/// against a project directory is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub roots: Vec<SourceRoot>,
    pub domains: Vec<DomainSpec>,
    pub default_domain: Option<String>,
    pub purge_obsolete: bool,
    pub dry_run: bool,
    /// Literal paths or globs excluded from every root.
    pub ignores: Vec<String>,
    /// Headers given to every freshly scanned catalog.
    pub headers: Headers,
    /// References in catalogs are recorded relative to this directory.
    pub reference_base: PathBuf,
}

impl SyncOptions {
    /// Check the configuration and build the domain set, before any I/O.
    pub fn validate(&self) -> Result<DomainSet, ConfigError> {
        let mut domains = DomainSet::new();
        for spec in &self.domains {
            domains.declare(&spec.name, spec.targets.iter().cloned());
        }
        domains.validate()?;

        if let Some(default) = &self.default_domain {
            if !domains.contains(default) {
                return Err(ConfigError::UnknownDefaultDomain(default.clone()));
            }
            domains.set_default_domain(Some(default));
        }
        if self.roots.is_empty() {
            return Err(ConfigError::NoSources);
        }
        self.ignores()?;

        domains.apply_headers(&self.headers);
        Ok(domains)
    }

    fn ignores(&self) -> Result<Ignores, ConfigError> {
        Ignores::new(&self.reference_base, &self.ignores).map_err(|e| {
            ConfigError::InvalidPattern {
                field: "ignore",
                pattern: self
                    .ignores
                    .iter()
                    .find(|p| is_glob_pattern(p) && glob::Pattern::new(p).is_err())
                    .cloned()
                    .unwrap_or_default(),
                message: e.msg.to_string(),
            }
        })
    }
}

/// What a run did.
#[derive(Debug, Default)]
pub struct RunResult {
    /// Targets written (would-be-written in dry-run mode), in domain order.
    pub written: Vec<PathBuf>,
    pub failures: Vec<TargetFailure>,
    pub domain_stats: Vec<DomainStats>,
    pub extract: ExtractStats,
    /// Paths the walker could not read.
    pub walk_errors: usize,
    pub dry_run: bool,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run the whole pipeline.
///
/// Configuration errors are returned before anything is read or written.
/// Per-domain and per-target failures do not fail the run; they are listed
/// in [`RunResult::failures`].
pub fn run(options: &SyncOptions, registry: &Registry) -> Result<RunResult> {
    let mut domains = options.validate()?;
    let ignores = options.ignores()?;

    let mut walker = SourceWalker::new(options.roots.clone(), ignores);
    let extract_stats = extract(
        walker.by_ref(),
        registry,
        &mut domains,
        &options.reference_base,
    );

    let outcomes = finalize(
        domains.into_domains(),
        registry,
        PersistOptions {
            merge: MergeOptions {
                purge_obsolete: options.purge_obsolete,
            },
            dry_run: options.dry_run,
        },
    );

    let mut result = RunResult {
        extract: extract_stats,
        walk_errors: walker.errors(),
        dry_run: options.dry_run,
        ..Default::default()
    };
    for outcome in outcomes {
        result.written.extend(outcome.written);
        result.failures.extend(outcome.failures);
        result.domain_stats.push(outcome.stats);
    }
    Ok(result)
}
