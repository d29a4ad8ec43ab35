//! One module per subcommand, each exposing an `execute` function.

pub mod add;
pub mod completions;
pub mod copy;
pub mod edit;
pub mod history;
pub mod init;
pub mod list;
pub mod merge;
pub mod passwd;
pub mod search;
pub mod show;
