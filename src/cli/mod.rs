//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod clipboard;
pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::{resolve_dir, Settings};
use crate::errors::{PwdSyncError, Result};
use crate::vault::{parse_path, Vault};

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// How many times a wrong master password may be entered interactively.
const MAX_PASSWORD_ATTEMPTS: u32 = 3;

/// Environment variable holding the master password (scripts/tests).
pub const PASSWORD_ENV: &str = "PWDSYNC_PASSWORD";

/// Environment variable holding the password of the file being merged in.
pub const OTHER_PASSWORD_ENV: &str = "PWDSYNC_OTHER_PASSWORD";

/// PwdSync CLI: encrypted password store with offline merge.
#[derive(Parser)]
#[command(
    name = "pwdsync",
    about = "Encrypted password store that merges divergent copies",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// PwdSync directory holding config.toml (default: ~/.pwdsync)
    #[arg(long, env = "PWDSYNC_DIR", global = true)]
    pub dir: Option<PathBuf>,

    /// Password file to use instead of the configured one
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty password file
    Init,

    /// Add a password entry (e.g. `add work/mail`)
    Add {
        /// Entry path: categories and name separated by '/'
        path: String,
        /// Username for the entry (prompted if omitted)
        #[arg(short, long)]
        username: Option<String>,
        /// Free-form comment
        #[arg(short, long)]
        comment: Option<String>,
        /// Secret value (omit for interactive prompt)
        #[arg(long)]
        value: Option<String>,
        /// Also prompt for a second secret (e.g. a PIN)
        #[arg(long)]
        second: bool,
        /// Fail instead of overwriting an existing entry
        #[arg(long)]
        no_overwrite: bool,
    },

    /// Change one field of an entry (username, password, password2, comment)
    Edit {
        /// Entry path
        path: String,
        /// Field to change
        field: String,
        /// New value (omit for interactive prompt)
        value: Option<String>,
    },

    /// Print an entry's secret
    Show {
        /// Entry path
        path: String,
        /// Show the second secret instead
        #[arg(long)]
        second: bool,
    },

    /// Copy an entry's secret to the clipboard and clear it after a timeout
    Copy {
        /// Entry path
        path: String,
        /// Copy the second secret instead
        #[arg(long)]
        second: bool,
    },

    /// List entries, optionally below a category
    List {
        /// Category path (default: everything)
        category: Option<String>,
    },

    /// Find entries by name, username or category
    Search {
        /// Case-insensitive text to look for
        query: String,
    },

    /// Show the operation history
    History {
        /// Number of entries to show (most recent)
        #[arg(long, default_value = "50")]
        last: usize,
    },

    /// Merge another copy of the password file into this one
    Merge {
        /// The other password file
        other: PathBuf,
        /// Prompt for a separate password for the other file
        #[arg(long)]
        other_password: bool,
    },

    /// Change the master password
    Passwd,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolved locations and settings for one CLI run.
pub struct Context {
    pub dir: PathBuf,
    pub settings: Settings,
    pub file: PathBuf,
}

impl Context {
    /// Resolve the pwdsync directory, load `config.toml`, and pick the
    /// password file (`--file` wins over the config).
    pub fn load(cli: &Cli) -> Result<Self> {
        let dir = resolve_dir(cli.dir.as_deref())?;
        let settings = Settings::load(&dir)?;
        let file = match &cli.file {
            Some(f) => f.clone(),
            None => settings.password_file(&dir),
        };
        Ok(Self {
            dir,
            settings,
            file,
        })
    }
}

/// Read a non-empty password from `var`, if set.
fn password_from_env(var: &str) -> Option<Zeroizing<String>> {
    match std::env::var(var) {
        Ok(pw) if !pw.is_empty() => Some(Zeroizing::new(pw)),
        _ => None,
    }
}

/// Hidden interactive password prompt.
pub fn prompt_password(prompt: &str) -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| PwdSyncError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation.
///
/// Also respects `PWDSYNC_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env(PASSWORD_ENV) {
        if pw.len() < MIN_PASSWORD_LEN {
            return Err(PwdSyncError::CommandFailed(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        return Ok(pw);
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| PwdSyncError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Open the password file at `path`.
///
/// Uses `env_var` if set (one attempt, no retry).  Otherwise prompts and
/// re-prompts on a wrong password up to three times.  Returns the
/// password alongside the vault so a caller can reuse it for a second
/// file.
pub fn open_vault_at(
    path: &Path,
    settings: &Settings,
    env_var: &str,
    prompt: &str,
) -> Result<(Vault, Zeroizing<String>)> {
    if !path.exists() {
        output::tip("Run `pwdsync init` to create a password file.");
        return Err(PwdSyncError::VaultNotFound(path.to_path_buf()));
    }

    let params = settings.argon2_params();

    if let Some(pw) = password_from_env(env_var) {
        let vault = Vault::open_with_params(path, pw.as_bytes(), Some(&params))?;
        return Ok((vault, pw));
    }

    let mut attempt = 1;
    loop {
        let pw = prompt_password(prompt)?;
        match Vault::open_with_params(path, pw.as_bytes(), Some(&params)) {
            Ok(vault) => return Ok((vault, pw)),
            Err(PwdSyncError::WrongCredential) if attempt < MAX_PASSWORD_ATTEMPTS => {
                output::error("Wrong password. Try again.");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Open the configured password file with the master password.
pub fn open_vault(ctx: &Context) -> Result<Vault> {
    let (vault, _pw) = open_vault_at(
        &ctx.file,
        &ctx.settings,
        PASSWORD_ENV,
        "Enter master password",
    )?;
    Ok(vault)
}

/// Split an entry path like `work/mail` into (`["work"]`, `"mail"`).
pub fn split_entry_path(path: &str) -> Result<(Vec<String>, String)> {
    let mut segments = parse_path(path)?;
    let name = segments.pop().ok_or_else(|| {
        PwdSyncError::InvalidPath("an entry path needs at least a name, e.g. work/mail".into())
    })?;
    Ok((segments, name))
}
