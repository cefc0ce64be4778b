use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for Matrix.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (MATRIX_* prefix)
/// 3. Config file (~/.config/matrix/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Word that wakes the assistant.
    pub wake_word: String,

    /// Seconds of silence before an active assistant goes idle.
    pub timeout_secs: u64,

    /// Keep recent exchanges in memory for "show history".
    pub enable_context: bool,

    /// Speak replies through `tts_command` as well as printing them.
    pub voice_feedback: bool,

    /// External text-to-speech program, e.g. `espeak` or `say`.
    pub tts_command: Option<String>,

    /// Default log filter when neither `--log-level` nor `RUST_LOG` is set.
    pub log_level: String,

    /// Directory for the daily log files (`matrix.YYYY-MM-DD.log`).
    pub log_dir: PathBuf,

    /// Path to the SQLite history database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: MATRIX_DATABASE_PATH
    /// - Default: ~/.local/share/matrix/matrix.db
    pub database_path: PathBuf,

    /// JSON map of application name to executable path.
    pub app_paths_file: PathBuf,

    /// JSON contact book used by the messaging skill.
    pub contacts_file: PathBuf,

    /// Directory the file skill works in.
    pub files_base_dir: PathBuf,

    /// Allow shutdown, restart and sleep.
    pub allow_power: bool,

    /// Entries kept by the context manager.
    pub max_history: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wake_word: String::from("matrix"),
            timeout_secs: 15,
            enable_context: true,
            voice_feedback: true,
            tts_command: None,
            log_level: String::from("info"),
            log_dir: default_data_dir().join("logs"),
            database_path: default_db_path(),
            app_paths_file: config_dir().join("app_paths.json"),
            contacts_file: config_dir().join("contacts.json"),
            files_base_dir: PathBuf::from("."),
            allow_power: false,
            max_history: crate::context::DEFAULT_MAX_HISTORY,
        }
    }
}

impl Config {
    /// Load configuration from the default config file and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific file plus `MATRIX_*` variables.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("matrix");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration with custom database path.
    ///
    /// This is used when the --db CLI flag is provided.
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.wake_word.trim().is_empty() {
            anyhow::bail!("wake_word must not be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Look up a value by key for `matrix config get`.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "wake_word" => self.wake_word.clone(),
            "timeout_secs" => self.timeout_secs.to_string(),
            "enable_context" => self.enable_context.to_string(),
            "voice_feedback" => self.voice_feedback.to_string(),
            "tts_command" => self
                .tts_command
                .clone()
                .unwrap_or_else(|| String::from("<not set>")),
            "log_level" => self.log_level.clone(),
            "log_dir" => self.log_dir.display().to_string(),
            "database_path" => self.database_path.display().to_string(),
            "app_paths_file" => self.app_paths_file.display().to_string(),
            "contacts_file" => self.contacts_file.display().to_string(),
            "files_base_dir" => self.files_base_dir.display().to_string(),
            "allow_power" => self.allow_power.to_string(),
            "max_history" => self.max_history.to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// Every key `Config::get` understands.
pub const KEYS: &[&str] = &[
    "wake_word",
    "timeout_secs",
    "enable_context",
    "voice_feedback",
    "tts_command",
    "log_level",
    "log_dir",
    "database_path",
    "app_paths_file",
    "contacts_file",
    "files_base_dir",
    "allow_power",
    "max_history",
];

/// Keys whose values are written as TOML integers or booleans.
pub fn is_numeric_key(key: &str) -> bool {
    matches!(key, "timeout_secs" | "max_history")
}

pub fn is_bool_key(key: &str) -> bool {
    matches!(key, "enable_context" | "voice_feedback" | "allow_power")
}

/// Returns: ~/.local/share/matrix (or platform equivalent)
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("matrix")
}

/// Get the default database path.
///
/// Returns: ~/.local/share/matrix/matrix.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    default_data_dir().join("matrix.db")
}

/// Directory holding the config file, app table and contacts.
///
/// Returns:
/// - Linux: ~/.config/matrix
/// - macOS: ~/Library/Application Support/matrix
/// - Windows: %APPDATA%\matrix
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("matrix")
}

/// Get the config file path.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Matrix Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (MATRIX_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Word that wakes the assistant
wake_word = "matrix"

# Seconds without a command before Matrix goes back to idle
timeout_secs = 15

# Remember recent exchanges for "show history"
enable_context = true

# Speak replies through tts_command
voice_feedback = true

# Text-to-speech program called with the reply as its only argument
#tts_command = "espeak"

# Default log level (trace, debug, info, warn, error)
log_level = "info"

# One log file per day is written here as matrix.YYYY-MM-DD.log
#log_dir = "/home/me/.local/share/matrix/logs"

# Allow "shutdown", "restart" and "suspend" to actually run
allow_power = false

# Number of exchanges kept for "show history"
max_history = 50

# Directory used by "create folder", "delete file" and friends
files_base_dir = "."

# Application table: { "chrome": "/usr/bin/google-chrome", ... }
#app_paths_file = "/home/me/.config/matrix/app_paths.json"

# Contact book used by "send message"
#contacts_file = "/home/me/.config/matrix/contacts.json"

# Command history database
#
# Can also be set via:
# - CLI: matrix --db /custom/path.db run
# - Environment: MATRIX_DATABASE_PATH=/custom/path.db
#database_path = "/path/to/custom/matrix.db"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.wake_word, "matrix");
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert!(config.enable_context);
        assert!(!config.allow_power);
        assert!(!config.database_path.as_os_str().is_empty());
        assert!(config.log_dir.ends_with("logs"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_without_file() {
        let dir = TempDir::new().unwrap();
        let result = Config::load_from(&dir.path().join("missing.toml"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "wake_word = \"jarvis\"\ntimeout_secs = 30\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.wake_word, "jarvis");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_history, 50);
    }

    #[test]
    fn test_example_config_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        assert!(ensure_config_file(&path).unwrap());
        assert!(!ensure_config_file(&path).unwrap());

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.wake_word, "matrix");
        assert!(!config.allow_power);
    }

    #[test]
    fn test_validate_rejects_empty_wake_word() {
        let config = Config {
            wake_word: String::from("  "),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_get_known_and_unknown_keys() {
        let config = Config::default();
        for key in KEYS {
            assert!(config.get(key).is_some(), "{key} should be readable");
        }
        assert_eq!(config.get("tts_command").as_deref(), Some("<not set>"));
        assert!(config.get("nope").is_none());
    }
}
