//! `pwdsync history`: show the most recent operations.

use crate::cli::output;
use crate::cli::{open_vault, Context};
use crate::errors::Result;

/// Execute the `history` command.
pub fn execute(ctx: &Context, last: usize) -> Result<()> {
    let vault = open_vault(ctx)?;
    let history = vault.history();

    let skip = history.len().saturating_sub(last);
    let recent: Vec<_> = history.iter().skip(skip).collect();

    output::info(&format!(
        "Showing {} of {} operation(s)",
        recent.len(),
        history.len()
    ));
    output::print_history_table(&recent);

    Ok(())
}
