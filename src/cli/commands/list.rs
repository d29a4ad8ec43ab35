//! `pwdsync list`: print the category tree.

use crate::cli::output;
use crate::cli::{open_vault, Context};
use crate::errors::{PwdSyncError, Result};
use crate::vault::parse_path;

/// Execute the `list` command.
pub fn execute(ctx: &Context, category: Option<&str>) -> Result<()> {
    let path = match category {
        Some(c) => parse_path(c)?,
        None => Vec::new(),
    };

    let vault = open_vault(ctx)?;
    let tree = vault
        .tree()
        .subtree(&path)
        .ok_or_else(|| PwdSyncError::RecordNotFound(format!("category '{}'", path.join("/"))))?;

    output::info(&format!("{} entries", tree.credential_count()));
    output::print_tree(tree);

    Ok(())
}
