//! Configuration: `config.toml` settings and pwdsync directory lookup.

pub mod settings;

pub use settings::{resolve_dir, Settings};
