//! `pwdsync copy`: put an entry's secret on the clipboard for a while.

use std::time::Duration;

use crate::cli::commands::show::lookup_secret;
use crate::cli::{clipboard, output, Context};
use crate::errors::Result;

/// Execute the `copy` command.
///
/// Blocks for `clipboard_timeout` seconds, then clears the clipboard if
/// it still holds the secret.
pub fn execute(ctx: &Context, path: &str, second: bool) -> Result<()> {
    let secret = lookup_secret(ctx, path, second)?;
    let timeout = ctx.settings.clipboard_timeout;

    output::success(&format!(
        "Copied '{path}' to the clipboard, clearing in {timeout}s"
    ));
    clipboard::copy_then_clear(&secret, Duration::from_secs(timeout))?;
    output::info("Clipboard cleared.");

    Ok(())
}
