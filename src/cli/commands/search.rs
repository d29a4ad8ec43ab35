//! `pwdsync search`: find entries by name, username or category.

use crate::cli::output;
use crate::cli::{open_vault, Context};
use crate::errors::Result;

/// Execute the `search` command.
pub fn execute(ctx: &Context, query: &str) -> Result<()> {
    let vault = open_vault(ctx)?;
    let hits = vault.tree().search(query);
    output::print_credentials_table(&hits);
    Ok(())
}
