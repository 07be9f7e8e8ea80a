//! Backup command handlers.

use bridgectl_core::{Console, RebootReason};

use crate::cli::{BackupArgs, BackupCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(console: &Console, args: BackupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        BackupCommand::Export { file } => {
            let backup = console.export_config().await?;
            let text = output::render_json_pretty(&backup)?;
            match file {
                Some(path) => {
                    std::fs::write(&path, format!("{text}\n"))?;
                    output::notice(
                        &format!("Configuration written to {}", path.display()),
                        global.quiet,
                    );
                }
                None => output::print_output(&text, false),
            }
            Ok(())
        }

        BackupCommand::Import { file, reboot } => {
            let (contents, name) = util::read_upload(&file)?;
            if !util::confirm(
                &format!("Replace the device configuration with {name}?"),
                global.yes,
            )? {
                return Ok(());
            }
            let outcome = console.import_config(contents, &name).await?;
            util::after_reboot(
                console,
                &outcome,
                RebootReason::Import,
                None,
                &reboot,
                global,
            )
            .await
        }
    }
}
