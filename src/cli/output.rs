//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use chrono::DateTime;
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{join_path, CategoryTree, Credential, Node, Operation};

/// Indentation added per category level in `print_tree`.
const INDENT: usize = 4;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a category tree recursively: categories in bold, entries as
/// `name<tab><tab>username`, children indented under their category.
pub fn print_tree(tree: &CategoryTree) {
    if tree.is_empty() {
        info("No passwords here yet.");
        tip("Run `pwdsync add <category>/<name>` to add one.");
        return;
    }
    for line in render_tree(tree, 0) {
        println!("{line}");
    }
}

/// Render `tree` as indented lines, sorted by key at every level.
pub fn render_tree(tree: &CategoryTree, indentation: usize) -> Vec<String> {
    let pad = " ".repeat(indentation);
    let mut lines = Vec::new();
    for (key, node) in tree.entries() {
        match node {
            Node::Credential(c) => lines.push(format!("{pad}{c}")),
            Node::Category(sub) => {
                lines.push(format!("{pad}{}", style(key).bold()));
                lines.extend(render_tree(sub, indentation + INDENT));
            }
        }
    }
    lines
}

/// Print a table of matching entries (Path, Username, Comment).
pub fn print_credentials_table(rows: &[(Vec<String>, &Credential)]) {
    if rows.is_empty() {
        info("No matching entries.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Path", "Username", "Comment"]);

    for (categories, c) in rows {
        let mut path = categories.clone();
        path.push(c.name.clone());
        table.add_row(vec![
            join_path(&path),
            c.username.clone(),
            c.comment.clone().unwrap_or_default(),
        ]);
    }

    println!("{table}");
}

/// Print a table of operations (Time, Event, Entry, Change).
pub fn print_history_table(ops: &[&Operation]) {
    if ops.is_empty() {
        info("History is empty.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Event", "Entry", "Change"]);

    for op in ops {
        let time = DateTime::from_timestamp(op.event_time(), 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| op.event_time().to_string());
        let change = match op {
            Operation::Add(add) => format!("user {}", add.credential().username),
            Operation::Edit(edit) if edit.field().is_secret() => format!("{} ********", edit.field()),
            Operation::Edit(edit) => format!("{} = {}", edit.field(), edit.new_value()),
        };
        table.add_row(vec![time, op.kind().to_string(), op.target(), change]);
    }

    println!("{table}");
}
