use anyhow::Result;

use super::{CommandResult, CommandSummary, FormatRow, FormatsSummary};
use crate::{
    core::{error::PluginKind, registry::Registry},
    formats::scanners::ScanOptions,
};

pub fn formats() -> Result<CommandResult> {
    let registry = Registry::with_defaults(ScanOptions::default());
    let rows = registry
        .bindings()
        .iter()
        .map(|binding| FormatRow {
            suffix: binding.suffix().to_string(),
            scan: binding.supports(PluginKind::Scanner),
            load: binding.supports(PluginKind::Loader),
            generate: binding.supports(PluginKind::Generator),
        })
        .collect();

    Ok(CommandResult::new(CommandSummary::Formats(
        FormatsSummary { rows },
    )))
}
