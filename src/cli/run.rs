/// Dispatch the parsed arguments to the matching command handler.
///
/// # Returns
/// - `Ok(CommandResult)` describing what the command did
/// - `Err` if the command could not run (config errors, unreadable config file)
use super::{
    args::{Arguments, Command},
    commands::{CommandResult, formats::formats, init::init, sync::sync},
};
use anyhow::Result;

pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Sync(cmd)) => sync(cmd),
        Some(Command::Init) => init(),
        Some(Command::Formats) => formats(),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
