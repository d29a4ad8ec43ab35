//! `pwdsync edit`: change a single field of an entry.

use std::io::{self, IsTerminal};

use zeroize::Zeroizing;

use crate::cli::commands::add::read_secret;
use crate::cli::output;
use crate::cli::{open_vault, split_entry_path, Context};
use crate::errors::{PwdSyncError, Result};
use crate::vault::CredentialField;

/// Execute the `edit` command.
pub fn execute(ctx: &Context, path: &str, field: &str, value: Option<&str>) -> Result<()> {
    let (categories, name) = split_entry_path(path)?;
    // Reject unknown fields before asking for anything.
    let parsed: CredentialField = field.parse()?;

    let new_value = match value {
        Some(v) if !parsed.is_secret() => Zeroizing::new(v.to_string()),
        _ if parsed.is_secret() || !io::stdin().is_terminal() => {
            read_secret(value, &format!("New {parsed} for {name}"))?
        }
        _ => {
            let text = dialoguer::Input::<String>::new()
                .with_prompt(format!("New {parsed} for {name}"))
                .allow_empty(true)
                .interact_text()
                .map_err(|e| PwdSyncError::CommandFailed(format!("input prompt: {e}")))?;
            Zeroizing::new(text)
        }
    };

    let mut vault = open_vault(ctx)?;
    vault.edit(&categories, &name, parsed.as_str(), &new_value)?;
    vault.save(&ctx.file)?;

    output::success(&format!("Updated {parsed} of '{path}'"));

    Ok(())
}
