//! Extraction engine: route each source file to its scanner and collect the
//! results per domain.
//!
//! Files are sorted first so reference order never depends on walk order.
//! Reading and tokenizing run in parallel; recording into the scanners runs
//! afterwards in sorted order, so each scanner's accumulation has a single
//! owner and needs no locking.

use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;

use crate::{
    core::{domains::DomainSet, registry::Registry},
    formats::scanners::{Occurrence, Scanner},
};

/// Used only when no domain has been declared at all.
pub const FALLBACK_DOMAIN: &str = "messages";

/// Counters reported after extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Files handed to a scanner.
    pub files_scanned: usize,
    /// Files without a scanner for their suffix.
    pub files_skipped: usize,
    /// Files that had a scanner but could not be read.
    pub files_unreadable: usize,
    /// Translatable calls found.
    pub occurrences: usize,
    /// Domains named in source code but never declared, sorted.
    pub undeclared_domains: Vec<String>,
}

/// Scan `files` into the catalogs of `domains`.
///
/// References are recorded relative to `reference_base` with forward
/// slashes.
pub fn extract(
    files: impl IntoIterator<Item = PathBuf>,
    registry: &Registry,
    domains: &mut DomainSet,
    reference_base: &Path,
) -> ExtractStats {
    let mut stats = ExtractStats::default();

    let mut files: Vec<PathBuf> = files.into_iter().collect();
    files.sort();

    let default_domain = domains.default_domain().unwrap_or(FALLBACK_DOMAIN).to_string();
    // One scanner per binding, in order of the first file each one received.
    let mut bindings: Vec<usize> = Vec::new();
    let mut scanners: Vec<Scanner> = Vec::new();
    let mut jobs: Vec<(usize, PathBuf)> = Vec::with_capacity(files.len());
    for file in files {
        match registry.resolve_scanner(&file) {
            Ok((index, extractor)) => {
                let position = match bindings.iter().position(|i| *i == index) {
                    Some(position) => position,
                    None => {
                        bindings.push(index);
                        scanners.push(Scanner::new(extractor, &default_domain));
                        scanners.len() - 1
                    }
                };
                jobs.push((position, file));
            }
            Err(e) => {
                tracing::debug!("Skipping {}: {}", file.display(), e);
                stats.files_skipped += 1;
            }
        }
    }

    let extracted: Vec<Result<Vec<Occurrence>>> = jobs
        .par_iter()
        .map(|(position, file)| scanners[*position].scan_file(file))
        .collect();

    for ((position, file), result) in jobs.iter().zip(extracted) {
        let occurrences = match result {
            Ok(occurrences) => occurrences,
            Err(e) => {
                tracing::warn!("{:#}", e);
                stats.files_unreadable += 1;
                continue;
            }
        };
        tracing::debug!(
            "Scanned {} ({} strings)",
            file.display(),
            occurrences.len()
        );
        stats.files_scanned += 1;
        stats.occurrences += occurrences.len();

        scanners[*position].record(&reference_path(file, reference_base), occurrences);
    }

    for scanner in scanners {
        for (domain, catalog) in scanner.into_translations() {
            if domains.absorb(&domain, catalog).is_err()
                && !stats.undeclared_domains.contains(&domain)
            {
                tracing::warn!("Strings for undeclared domain \"{}\" are ignored", domain);
                stats.undeclared_domains.push(domain);
            }
        }
    }
    stats.undeclared_domains.sort();

    stats
}

/// `file` relative to `base`, with forward slashes.
pub fn reference_path(file: &Path, base: &Path) -> String {
    file.strip_prefix(base)
        .unwrap_or(file)
        .to_string_lossy()
        .replace('\\', "/")
}
