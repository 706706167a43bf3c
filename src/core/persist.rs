//! Merge & persist: reconcile each domain with its primary target and write
//! the result to every target.
//!
//! Domains are independent and finalized in parallel. Failures never abort
//! the run: a bad primary target stops its own domain, a bad target stops
//! only itself, and everything is collected for the caller.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::{
    core::{
        data::Catalog,
        domains::Domain,
        merge::{MergeOptions, merge},
        registry::Registry,
    },
    formats::{Generator, Loader},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistOptions {
    pub merge: MergeOptions,
    /// Merge and serialize, but write nothing.
    pub dry_run: bool,
}

/// Step at which a target failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Loading the primary target. Fatal for the whole domain.
    Load,
    /// Creating the target's parent directory.
    CreateDir,
    /// Serializing the catalog, including finding a generator.
    Generate,
    /// Writing the file.
    Write,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Load => write!(f, "load"),
            FailureStage::CreateDir => write!(f, "create directory"),
            FailureStage::Generate => write!(f, "generate"),
            FailureStage::Write => write!(f, "write"),
        }
    }
}

#[derive(Debug)]
pub struct TargetFailure {
    pub domain: String,
    pub target: PathBuf,
    pub stage: FailureStage,
    pub error: anyhow::Error,
}

/// Entry counts for one domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainStats {
    pub domain: String,
    /// Entries found by the scan.
    pub scanned: usize,
    /// Entries after the merge (0 if the merge did not happen).
    pub total: usize,
    /// Obsolete entries kept by the merge.
    pub obsolete: usize,
}

#[derive(Debug)]
pub struct DomainOutcome {
    pub stats: DomainStats,
    /// Targets written (or, in dry-run mode, that would be written).
    pub written: Vec<PathBuf>,
    pub failures: Vec<TargetFailure>,
}

/// Finalize every domain; outcomes come back in the order given.
pub fn finalize(
    domains: Vec<Domain>,
    registry: &Registry,
    options: PersistOptions,
) -> Vec<DomainOutcome> {
    domains
        .into_par_iter()
        .map(|domain| finalize_domain(domain, registry, options))
        .collect()
}

pub fn finalize_domain(
    domain: Domain,
    registry: &Registry,
    options: PersistOptions,
) -> DomainOutcome {
    let Domain {
        name,
        catalog: fresh,
        targets,
    } = domain;

    let mut outcome = DomainOutcome {
        stats: DomainStats {
            domain: name.clone(),
            scanned: fresh.len(),
            ..Default::default()
        },
        written: Vec::new(),
        failures: Vec::new(),
    };

    let Some(primary) = targets.first() else {
        return outcome;
    };
    let existing = match load_existing(primary, registry) {
        Ok(existing) => existing,
        Err(error) => {
            tracing::debug!("Not writing domain \"{}\": {:#}", name, error);
            outcome.failures.push(TargetFailure {
                domain: name,
                target: primary.clone(),
                stage: FailureStage::Load,
                error,
            });
            return outcome;
        }
    };

    let merged = merge(fresh, existing, options.merge);
    outcome.stats.total = merged.len();
    outcome.stats.obsolete = merged.obsolete_count();

    for target in &targets {
        match write_target(&merged, target, registry, options.dry_run) {
            Ok(()) => {
                if options.dry_run {
                    tracing::info!("Would write {}", target.display());
                } else {
                    tracing::info!("Wrote {}", target.display());
                }
                outcome.written.push(target.clone());
            }
            Err((stage, error)) => {
                tracing::debug!("Failed to write {}: {:#}", target.display(), error);
                outcome.failures.push(TargetFailure {
                    domain: name.clone(),
                    target: target.clone(),
                    stage,
                    error,
                });
            }
        }
    }

    outcome
}

/// The primary target's catalog, or an empty one if the file does not exist.
fn load_existing(primary: &Path, registry: &Registry) -> Result<Catalog> {
    if !primary.exists() {
        return Ok(Catalog::default());
    }
    let loader = registry.resolve_loader(primary)?;
    loader.load_file(primary)
}

fn write_target(
    catalog: &Catalog,
    target: &Path,
    registry: &Registry,
    dry_run: bool,
) -> Result<(), (FailureStage, anyhow::Error)> {
    let generator = registry
        .resolve_generator(target)
        .map_err(|e| (FailureStage::Generate, anyhow::Error::from(e)))?;
    let bytes = generator
        .generate(catalog)
        .map_err(|e| (FailureStage::Generate, e))?;
    if dry_run {
        return Ok(());
    }

    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))
            .map_err(|e| (FailureStage::CreateDir, e))?;
    }
    crate::formats::atomic::write(target, &bytes).map_err(|e| (FailureStage::Write, e))
}
