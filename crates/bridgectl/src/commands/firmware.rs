//! Firmware upload handler.

use bridgectl_core::{Console, RebootReason};

use crate::cli::{FirmwareArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    console: &Console,
    args: FirmwareArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (image, name) = util::read_upload(&args.file)?;
    if !util::confirm(
        &format!("Flash {name} ({} bytes)? The device restarts afterwards.", image.len()),
        global.yes,
    )? {
        return Ok(());
    }

    output::notice(&format!("Uploading {name}..."), global.quiet);
    let outcome = console.upload_firmware(image, &name).await?;
    util::after_reboot(
        console,
        &outcome,
        RebootReason::Firmware,
        None,
        &args.reboot,
        global,
    )
    .await
}
