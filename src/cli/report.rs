//! Report formatting and printing utilities.
//!
//! Displays command results in cargo-style format. Kept apart from the
//! sync pipeline so msgsync can be used as a library.

use std::io::{self, Write};

use colored::Colorize;

use super::commands::{
    CommandResult, CommandSummary, FormatsSummary, InitSummary, SyncSummary, sync::display_path,
};
use crate::config::CONFIG_FILE_NAME;
use crate::core::{persist::TargetFailure, sync::RunResult};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

pub fn print(result: &CommandResult) {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    match &result.summary {
        CommandSummary::Sync(summary) => print_sync_to(summary, &mut stdout, &mut stderr),
        CommandSummary::Init(summary) => print_init_to(summary, &mut stdout, &mut stderr),
        CommandSummary::Formats(summary) => print_formats_to(summary, &mut stdout),
    }
}

/// Print a sync run: written targets and totals to `out`, warnings and
/// failures to `err`.
pub fn print_sync_to<O: Write, E: Write>(summary: &SyncSummary, out: &mut O, err: &mut E) {
    let result = &summary.result;

    print_written_to(summary, out);
    if summary.verbose {
        print_domain_stats_to(result, out);
    }
    print_warnings_to(result, summary.verbose, err);
    for failure in &result.failures {
        print_failure_to(failure, summary, err);
    }
    print_sync_summary_to(result, out, err);
}

fn print_written_to<W: Write>(summary: &SyncSummary, writer: &mut W) {
    let verb = if summary.result.dry_run {
        "Would write".yellow().bold()
    } else {
        "Wrote".green().bold()
    };
    for path in &summary.result.written {
        let _ = writeln!(
            writer,
            "{} {} {}",
            SUCCESS_MARK.green(),
            verb,
            display_path(path, &summary.base_dir)
        );
    }
}

fn print_domain_stats_to<W: Write>(result: &RunResult, writer: &mut W) {
    for stats in &result.domain_stats {
        let _ = writeln!(
            writer,
            "  {}: {} scanned, {} total, {} obsolete",
            stats.domain.cyan(),
            stats.scanned,
            stats.total,
            stats.obsolete
        );
    }
}

/// Problems that did not fail the run.
pub fn print_warnings_to<W: Write>(result: &RunResult, verbose: bool, writer: &mut W) {
    for domain in &result.extract.undeclared_domains {
        let _ = writeln!(
            writer,
            "{} strings for undeclared domain \"{}\" were ignored",
            "warning:".bold().yellow(),
            domain
        );
    }

    // Details are logged per file at warn level, shown with -v.
    let hint = if verbose {
        String::new()
    } else {
        format!(" (use {} for details)", "-v".cyan())
    };
    if result.extract.files_unreadable > 0 {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be read{}",
            "warning:".bold().yellow(),
            result.extract.files_unreadable,
            hint
        );
    }
    if result.walk_errors > 0 {
        let _ = writeln!(
            writer,
            "{} {} path(s) could not be accessed{}",
            "warning:".bold().yellow(),
            result.walk_errors,
            hint
        );
    }
}

fn print_failure_to<W: Write>(failure: &TargetFailure, summary: &SyncSummary, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} failed to {} {} (domain \"{}\")",
        "error:".bold().red(),
        failure.stage,
        display_path(&failure.target, &summary.base_dir),
        failure.domain
    );
    let _ = writeln!(writer, "  {} {:#}", "-->".blue(), failure.error);
}

fn print_sync_summary_to<O: Write, E: Write>(result: &RunResult, out: &mut O, err: &mut E) {
    if !result.failures.is_empty() {
        let count = result.failures.len();
        let _ = writeln!(
            err,
            "\n{} {} {} failed",
            FAILURE_MARK.red(),
            count,
            if count == 1 { "target" } else { "targets" }
        );
        return;
    }

    let files = result.extract.files_scanned;
    let domains = result.domain_stats.len();
    let _ = writeln!(
        out,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Synced {} {} from {} source {}{}",
            domains,
            if domains == 1 { "domain" } else { "domains" },
            files,
            if files == 1 { "file" } else { "files" },
            if result.dry_run { " (dry run)" } else { "" }
        )
        .green()
    );
}

pub fn print_init_to<O: Write, E: Write>(summary: &InitSummary, out: &mut O, err: &mut E) {
    if summary.created {
        let _ = writeln!(
            out,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else {
        let _ = writeln!(
            err,
            "{} {} already exists",
            "error:".bold().red(),
            CONFIG_FILE_NAME
        );
    }
}

pub fn print_formats_to<W: Write>(summary: &FormatsSummary, writer: &mut W) {
    let width = summary
        .rows
        .iter()
        .map(|row| row.suffix.len())
        .max()
        .unwrap_or(0);
    for row in &summary.rows {
        let capabilities: Vec<&str> = [
            (row.scan, "scan"),
            (row.load, "load"),
            (row.generate, "generate"),
        ]
        .into_iter()
        .filter_map(|(supported, name)| supported.then_some(name))
        .collect();
        let _ = writeln!(
            writer,
            "{:<width$}  {}",
            row.suffix,
            capabilities.join(", "),
            width = width
        );
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::cli::commands::FormatRow;
    use crate::core::extract::ExtractStats;
    use crate::core::persist::{DomainStats, FailureStage};

    fn strip_ansi(s: &str) -> String {
        // Simple ANSI escape code stripper for testing
        let mut result = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    fn summary(result: RunResult) -> SyncSummary {
        SyncSummary {
            result,
            base_dir: PathBuf::from("/project"),
            verbose: false,
        }
    }

    fn render(summary: &SyncSummary) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        print_sync_to(summary, &mut out, &mut err);
        (
            strip_ansi(&String::from_utf8(out).unwrap()),
            strip_ansi(&String::from_utf8(err).unwrap()),
        )
    }

    #[test]
    fn test_sync_success() {
        let mut result = RunResult {
            written: vec![
                PathBuf::from("/project/locale/fr.po"),
                PathBuf::from("/project/locale/fr.mo"),
            ],
            ..Default::default()
        };
        result.extract.files_scanned = 1;
        result.domain_stats.push(DomainStats {
            domain: "messages".to_string(),
            scanned: 2,
            total: 3,
            obsolete: 1,
        });

        let (out, err) = render(&summary(result));
        assert_eq!(
            out,
            "\u{2713} Wrote locale/fr.po\n\u{2713} Wrote locale/fr.mo\n\u{2713} Synced 1 domain from 1 source file\n"
        );
        assert!(err.is_empty());
    }

    #[test]
    fn test_sync_dry_run() {
        let result = RunResult {
            dry_run: true,
            written: vec![PathBuf::from("/project/a.po")],
            ..Default::default()
        };

        let (out, _) = render(&summary(result));
        assert!(out.contains("Would write a.po"));
        assert!(out.contains("(dry run)"));
    }

    #[test]
    fn test_sync_verbose_stats() {
        let mut result = RunResult::default();
        result.domain_stats.push(DomainStats {
            domain: "admin".to_string(),
            scanned: 2,
            total: 3,
            obsolete: 1,
        });
        let mut summary = summary(result);
        summary.verbose = true;

        let (out, _) = render(&summary);
        assert!(out.contains("  admin: 2 scanned, 3 total, 1 obsolete"));
    }

    #[test]
    fn test_sync_failure() {
        let mut result = RunResult::default();
        result.failures.push(TargetFailure {
            domain: "messages".to_string(),
            target: PathBuf::from("/project/locale/fr.po"),
            stage: FailureStage::Load,
            error: anyhow::anyhow!("line 3: unterminated string"),
        });

        let (out, err) = render(&summary(result));
        assert!(out.is_empty());
        assert!(err.contains("error: failed to load locale/fr.po (domain \"messages\")"));
        assert!(err.contains("--> line 3: unterminated string"));
        assert!(err.contains("\u{2718} 1 target failed"));
    }

    #[test]
    fn test_warnings() {
        let result = RunResult {
            extract: ExtractStats {
                undeclared_domains: vec!["admin".to_string()],
                files_unreadable: 2,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut err = Vec::new();
        print_warnings_to(&result, false, &mut err);
        let err = strip_ansi(&String::from_utf8(err).unwrap());
        assert!(err.contains("warning: strings for undeclared domain \"admin\" were ignored"));
        assert!(err.contains("warning: 2 file(s) could not be read (use -v for details)"));
        assert!(!err.contains("could not be accessed"));
    }

    #[test]
    fn test_init() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        print_init_to(&InitSummary { created: false }, &mut out, &mut err);
        assert!(out.is_empty());
        assert_eq!(
            strip_ansi(&String::from_utf8(err).unwrap()),
            "error: .msgsyncrc.json already exists\n"
        );
    }

    #[test]
    fn test_formats() {
        let summary = FormatsSummary {
            rows: vec![
                FormatRow {
                    suffix: ".php".to_string(),
                    scan: true,
                    load: false,
                    generate: false,
                },
                FormatRow {
                    suffix: ".po".to_string(),
                    scan: false,
                    load: true,
                    generate: true,
                },
            ],
        };
        let mut out = Vec::new();
        print_formats_to(&summary, &mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            ".php  scan\n.po   load, generate\n"
        );
    }
}
