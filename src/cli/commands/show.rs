//! `pwdsync show`: print an entry's secret to stdout.

use crate::cli::{open_vault, split_entry_path, Context};
use crate::errors::{PwdSyncError, Result};
use crate::vault::CredentialField;

/// Execute the `show` command.
pub fn execute(ctx: &Context, path: &str, second: bool) -> Result<()> {
    let value = lookup_secret(ctx, path, second)?;
    println!("{}", value.as_str());
    Ok(())
}

/// Open the vault and fetch the primary (or second) secret at `path`.
pub(crate) fn lookup_secret(
    ctx: &Context,
    path: &str,
    second: bool,
) -> Result<zeroize::Zeroizing<String>> {
    let (mut segments, name) = split_entry_path(path)?;
    segments.push(name);

    let vault = open_vault(ctx)?;
    let credential = vault
        .get(&segments)
        .ok_or_else(|| PwdSyncError::RecordNotFound(path.to_string()))?;

    let field = if second {
        CredentialField::Secret2
    } else {
        CredentialField::Secret
    };
    let value = credential
        .field(field)
        .ok_or_else(|| PwdSyncError::CommandFailed(format!("'{path}' has no {field}")))?;

    Ok(zeroize::Zeroizing::new(value.to_string()))
}
