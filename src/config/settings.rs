use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{PwdSyncError, Result};

/// Placeholder in path settings that expands to the pwdsync directory.
const DIR_VARIABLE: &str = "$pwdsync";

/// User-level configuration, loaded from `<pwdsync dir>/config.toml`.
///
/// Every field has a sensible default so PwdSync works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Location of the encrypted password file.  `$pwdsync` expands to
    /// the pwdsync directory.
    #[serde(default = "default_password_file_path")]
    pub password_file_path: String,

    /// Seconds before a copied secret is cleared from the clipboard.
    #[serde(default = "default_clipboard_timeout")]
    pub clipboard_timeout: u64,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_password_file_path() -> String {
    format!("{DIR_VARIABLE}/passwords")
}

fn default_clipboard_timeout() -> u64 {
    30
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            password_file_path: default_password_file_path(),
            clipboard_timeout: default_clipboard_timeout(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the pwdsync directory.
    pub const FILE_NAME: &'static str = "config.toml";

    /// Load settings from `<pwdsync_dir>/config.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(pwdsync_dir: &Path) -> Result<Self> {
        let config_path = pwdsync_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PwdSyncError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Resolve the password file location, expanding `$pwdsync`.
    ///
    /// Relative results are taken relative to the pwdsync directory.
    pub fn password_file(&self, pwdsync_dir: &Path) -> PathBuf {
        let dir = pwdsync_dir.to_string_lossy();
        let expanded = PathBuf::from(self.password_file_path.replace(DIR_VARIABLE, &dir));
        if expanded.is_absolute() {
            expanded
        } else {
            pwdsync_dir.join(expanded)
        }
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> crate::crypto::kdf::Argon2Params {
        crate::crypto::kdf::Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

/// Locate the pwdsync directory: an explicit path if given, otherwise
/// `~/.pwdsync`.
pub fn resolve_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    dirs::home_dir()
        .map(|home| home.join(".pwdsync"))
        .ok_or_else(|| PwdSyncError::ConfigError("cannot determine home directory".into()))
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.password_file_path, "$pwdsync/passwords");
        assert_eq!(s.clipboard_timeout, 30);
        assert_eq!(s.argon2_memory_kib, 65_536);
        assert_eq!(s.argon2_iterations, 3);
        assert_eq!(s.argon2_parallelism, 4);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.clipboard_timeout, 30);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
password_file_path = "/srv/sync/passwords"
clipboard_timeout = 10
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
"#;
        fs::write(tmp.path().join("config.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.password_file_path, "/srv/sync/passwords");
        assert_eq!(settings.clipboard_timeout, 10);
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 5);
        assert_eq!(settings.argon2_parallelism, 8);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "clipboard_timeout = 5\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.clipboard_timeout, 5);
        assert_eq!(settings.password_file_path, "$pwdsync/passwords");
        assert_eq!(settings.argon2_iterations, 3);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(PwdSyncError::ConfigError(_))));
    }

    #[test]
    fn password_file_expands_dir_variable() {
        let s = Settings::default();
        let dir = Path::new("/home/user/.pwdsync");
        assert_eq!(
            s.password_file(dir),
            PathBuf::from("/home/user/.pwdsync/passwords")
        );
    }

    #[test]
    fn password_file_keeps_absolute_paths_and_anchors_relative_ones() {
        let dir = Path::new("/home/user/.pwdsync");

        let absolute = Settings {
            password_file_path: "/mnt/usb/passwords".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            absolute.password_file(dir),
            PathBuf::from("/mnt/usb/passwords")
        );

        let relative = Settings {
            password_file_path: "store/passwords".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            relative.password_file(dir),
            PathBuf::from("/home/user/.pwdsync/store/passwords")
        );
    }

    #[test]
    fn resolve_dir_prefers_explicit_path() {
        let dir = resolve_dir(Some(Path::new("/tmp/pw"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/pw"));
    }
}
