//! `pwdsync merge`: fold another copy of the password file into this one.
//!
//! Both histories are unioned and the tree is rebuilt by replay, so
//! merging A into B and B into A give the same entries.  Only the local
//! file is written; the other copy is left untouched.

use std::path::Path;

use crate::cli::output;
use crate::cli::{open_vault_at, Context, OTHER_PASSWORD_ENV, PASSWORD_ENV};
use crate::errors::{PwdSyncError, Result};
use crate::vault::Vault;

/// Execute the `merge` command.
pub fn execute(ctx: &Context, other: &Path, other_password: bool) -> Result<()> {
    let (mut vault, password) = open_vault_at(
        &ctx.file,
        &ctx.settings,
        PASSWORD_ENV,
        "Enter master password",
    )?;

    let theirs = if other_password {
        let (theirs, _pw) = open_vault_at(
            other,
            &ctx.settings,
            OTHER_PASSWORD_ENV,
            &format!("Enter password for {}", other.display()),
        )?;
        theirs
    } else {
        let params = ctx.settings.argon2_params();
        Vault::open_with_params(other, password.as_bytes(), Some(&params)).map_err(|e| {
            if matches!(e, PwdSyncError::WrongCredential) {
                output::tip("The other file uses a different password? Pass --other-password.");
            }
            e
        })?
    };

    let report = vault.merge(&theirs);
    vault.save(&ctx.file)?;

    output::success(&format!(
        "Merged {}: {} new operation(s), {} total",
        other.display(),
        report.imported(),
        report.after
    ));
    if report.skipped > 0 {
        output::warning(&format!(
            "{} operation(s) could not be applied and were skipped (run with -v for details)",
            report.skipped
        ));
    }

    Ok(())
}
