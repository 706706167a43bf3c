use std::{path::PathBuf, process::ExitCode};

use crate::core::sync::RunResult;

/// Process exit status of a msgsync invocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every target was written (or would be, in a dry run). Exit code 0.
    Success,
    /// The run finished but at least one target or domain failed, or
    /// `init` found an existing config file. Exit code 1.
    Failure,
    /// Nothing was synced: bad configuration, CLI misuse or an I/O error
    /// before any target was touched. Exit code 2.
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(match status {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
            ExitStatus::Error => 2,
        })
    }
}

#[derive(Debug)]
pub enum CommandSummary {
    Sync(SyncSummary),
    Init(InitSummary),
    Formats(FormatsSummary),
}

#[derive(Debug)]
pub struct SyncSummary {
    pub result: RunResult,
    /// Paths in the report are shown relative to this directory.
    pub base_dir: PathBuf,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
}

/// One registered suffix and its capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRow {
    pub suffix: String,
    pub scan: bool,
    pub load: bool,
    pub generate: bool,
}

#[derive(Debug)]
pub struct FormatsSummary {
    pub rows: Vec<FormatRow>,
}

/// Result of running msgsync commands
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
}

impl CommandResult {
    pub fn new(summary: CommandSummary) -> Self {
        Self { summary }
    }

    /// `Failure` when a target or domain failed, or `init` found an
    /// existing config file.
    pub fn exit_status(&self) -> ExitStatus {
        let failed = match &self.summary {
            CommandSummary::Sync(summary) => !summary.result.is_success(),
            CommandSummary::Init(summary) => !summary.created,
            CommandSummary::Formats(_) => false,
        };
        if failed {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::persist::{FailureStage, TargetFailure};

    fn sync_result(result: RunResult) -> CommandResult {
        CommandResult::new(CommandSummary::Sync(SyncSummary {
            result,
            base_dir: PathBuf::from("/project"),
            verbose: false,
        }))
    }

    #[test]
    fn test_clean_sync_succeeds() {
        let result = RunResult {
            written: vec![PathBuf::from("/project/fr.po")],
            ..Default::default()
        };
        assert_eq!(sync_result(result).exit_status(), ExitStatus::Success);
    }

    #[test]
    fn test_failed_target_fails_run() {
        let mut result = RunResult::default();
        result.failures.push(TargetFailure {
            domain: "messages".to_string(),
            target: PathBuf::from("/project/fr.xlf"),
            stage: FailureStage::Generate,
            error: anyhow::anyhow!("no format for fr.xlf"),
        });
        assert_eq!(sync_result(result).exit_status(), ExitStatus::Failure);
    }

    #[test]
    fn test_init_and_formats_status() {
        let existing = CommandResult::new(CommandSummary::Init(InitSummary { created: false }));
        let created = CommandResult::new(CommandSummary::Init(InitSummary { created: true }));
        let formats = CommandResult::new(CommandSummary::Formats(FormatsSummary { rows: Vec::new() }));

        assert_eq!(existing.exit_status(), ExitStatus::Failure);
        assert_eq!(created.exit_status(), ExitStatus::Success);
        assert_eq!(formats.exit_status(), ExitStatus::Success);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::from(ExitStatus::Success), ExitCode::from(0));
        assert_eq!(ExitCode::from(ExitStatus::Failure), ExitCode::from(1));
        assert_eq!(ExitCode::from(ExitStatus::Error), ExitCode::from(2));
    }
}
