//! `pwdsync passwd`: change the master password.
//!
//! The file is re-sealed under a fresh salt; history and entries are
//! carried over unchanged.

use crate::cli::output;
use crate::cli::{open_vault, prompt_new_password, Context};
use crate::errors::Result;

/// Execute the `passwd` command.
pub fn execute(ctx: &Context) -> Result<()> {
    output::info("Enter your current master password.");
    let mut vault = open_vault(ctx)?;

    output::info("Choose your new master password.");
    let new_password = prompt_new_password()?;

    vault.change_passphrase(new_password.as_bytes(), Some(&ctx.settings.argon2_params()))?;
    vault.save(&ctx.file)?;

    output::success(&format!(
        "Master password changed ({} entries re-encrypted)",
        vault.tree().credential_count()
    ));

    Ok(())
}
