//! `pwdsync add`: add (or overwrite) a password entry.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_vault, split_entry_path, Context};
use crate::errors::{PwdSyncError, Result};
use crate::vault::Credential;

/// Arguments of the `add` command.
pub struct AddArgs<'a> {
    pub path: &'a str,
    pub username: Option<&'a str>,
    pub comment: Option<&'a str>,
    pub value: Option<&'a str>,
    pub second: bool,
    pub no_overwrite: bool,
}

/// Execute the `add` command.
pub fn execute(ctx: &Context, args: &AddArgs<'_>) -> Result<()> {
    let (categories, name) = split_entry_path(args.path)?;

    let username = match args.username {
        Some(u) => u.to_string(),
        None => dialoguer::Input::<String>::new()
            .with_prompt(format!("Username for {name}"))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| PwdSyncError::CommandFailed(format!("input prompt: {e}")))?,
    };

    let secret = read_secret(args.value, &format!("Password for {name}"))?;

    let mut credential = Credential::new(name.as_str(), username, secret.as_str());
    if args.second {
        let secret2 = prompt_secret(&format!("Second password for {name}"))?;
        credential = credential.with_secret2(secret2.as_str());
    }
    if let Some(comment) = args.comment {
        credential = credential.with_comment(comment);
    }

    let mut vault = open_vault(ctx)?;
    let existed = vault.get(&full_path(&categories, &name)).is_some();
    if args.no_overwrite {
        vault.add_unique(&categories, credential)?;
    } else {
        vault.add(&categories, credential)?;
    }
    vault.save(&ctx.file)?;

    let verb = if existed { "updated" } else { "added" };
    output::success(&format!(
        "Entry '{}' {verb} ({} total)",
        args.path,
        vault.tree().credential_count()
    ));

    Ok(())
}

fn full_path(categories: &[String], name: &str) -> Vec<String> {
    let mut path = categories.to_vec();
    path.push(name.to_string());
    path
}

/// Determine a secret from one of three sources: inline argument, piped
/// stdin, or an interactive confirmed prompt.
pub(crate) fn read_secret(value: Option<&str>, prompt: &str) -> Result<Zeroizing<String>> {
    if let Some(v) = value {
        output::warning("Value provided on command line; it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        return Ok(Zeroizing::new(buf.trim_end().to_string()));
    }
    prompt_secret(prompt)
}

fn prompt_secret(prompt: &str) -> Result<Zeroizing<String>> {
    let secret = dialoguer::Password::new()
        .with_prompt(prompt)
        .with_confirmation("Repeat to confirm", "Values do not match, try again")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| PwdSyncError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(secret))
}
