//! Command dispatch: bridges CLI args -> Console calls -> output formatting.

pub mod backup;
pub mod config_cmd;
pub mod crash;
pub mod firmware;
pub mod logs;
pub mod roles;
pub mod sbus;
pub mod settings;
pub mod stats;
pub mod status;
pub mod system;
pub mod util;

use bridgectl_core::Console;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status(args) => status::handle(console, args, global).await,
        Command::Settings(args) => settings::handle(console, args, global).await,
        Command::Roles => roles::handle(console, global).await,
        Command::Logs(args) => logs::handle(console, args, global).await,
        Command::Crash(args) => crash::handle(console, args, global).await,
        Command::Sbus(args) => sbus::handle(console, args, global).await,
        Command::Stats(args) => stats::handle(console, args, global).await,
        Command::TimeSync(args) => system::time_sync(console, args, global).await,
        Command::Backup(args) => backup::handle(console, args, global).await,
        Command::FactoryReset(opts) => system::factory_reset(console, &opts, global).await,
        Command::Firmware(args) => firmware::handle(console, args, global).await,
        Command::Wait(args) => system::wait(console, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
