//! `pwdsync init`: create an empty password file and a default config.

use std::fs;

use crate::cli::output;
use crate::cli::{prompt_new_password, Context};
use crate::config::Settings;
use crate::errors::{PwdSyncError, Result};
use crate::vault::Vault;

/// Execute the `init` command.
pub fn execute(ctx: &Context) -> Result<()> {
    // 1. Refuse to clobber an existing password file.
    if ctx.file.exists() {
        output::tip("Use `pwdsync add` to add entries to the existing file.");
        return Err(PwdSyncError::VaultAlreadyExists(ctx.file.clone()));
    }

    // 2. Make sure the pwdsync directory exists and has a config file.
    if !ctx.dir.exists() {
        fs::create_dir_all(&ctx.dir)?;
        output::info(&format!("Created directory: {}", ctx.dir.display()));
    }
    let config_path = ctx.dir.join(Settings::FILE_NAME);
    if !config_path.exists() {
        let text = toml::to_string_pretty(&ctx.settings)
            .map_err(|e| PwdSyncError::SerializationError(e.to_string()))?;
        fs::write(&config_path, text)?;
        output::info(&format!("Wrote default config: {}", config_path.display()));
    }

    // 3. Choose the master password and write the empty file.
    let password = prompt_new_password()?;
    let vault = Vault::create_with_params(password.as_bytes(), Some(&ctx.settings.argon2_params()))?;
    vault.save(&ctx.file)?;

    output::success(&format!("Password file created at {}", ctx.file.display()));
    output::tip("Run `pwdsync add <category>/<name>` to add an entry.");
    output::tip("Run `pwdsync merge <other file>` to combine with another copy.");

    Ok(())
}
