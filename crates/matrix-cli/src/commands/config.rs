use anyhow::{Context, Result};
use matrix_core::config::{self, is_bool_key, is_numeric_key, KEYS};
use matrix_core::Config;
use std::path::Path;
use toml_edit::{value, DocumentMut};

/// Show the current effective configuration.
pub fn show_config(config: &Config, config_path: &Path) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config_path.display());
    let exists = config_path.exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    for key in KEYS {
        let shown = config.get(key).unwrap_or_default();
        println!("  {key}: {shown}");
    }

    println!("\nPriority: CLI args > ENV vars (MATRIX_*) > Config file > Defaults");
    Ok(())
}

/// Get a specific config value, or print the whole file.
pub fn get_config(config: &Config, config_path: &Path, key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        let shown = config.get(&key).with_context(|| unknown_key(&key))?;
        println!("{shown}");
        return Ok(());
    }

    if config_path.exists() {
        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;
        print!("{contents}");
    } else {
        println!("Config file does not exist: {}", config_path.display());
        println!("\nRun 'matrix config init' to create it.");
    }
    Ok(())
}

fn unknown_key(key: &str) -> String {
    format!("Unknown config key: {key}\n\nValid keys: {}", KEYS.join(", "))
}

/// Write `key = value` into a TOML document, typed by key.
pub fn set_value(contents: &str, key: &str, raw: &str) -> Result<String> {
    if !KEYS.contains(&key) {
        anyhow::bail!(unknown_key(key));
    }

    let mut doc = contents
        .parse::<DocumentMut>()
        .context("Config file is not valid TOML")?;

    doc[key] = if is_numeric_key(key) {
        let number: i64 = raw
            .parse()
            .with_context(|| format!("{key} must be a whole number"))?;
        if number < 1 {
            anyhow::bail!("{key} must be at least 1");
        }
        value(number)
    } else if is_bool_key(key) {
        let flag: bool = raw
            .parse()
            .with_context(|| format!("{key} must be true or false"))?;
        value(flag)
    } else {
        value(raw)
    };

    Ok(doc.to_string())
}

/// Set a config value, keeping the rest of the file (comments included).
pub fn set_config(config_path: &Path, key: &str, raw: &str) -> Result<()> {
    config::ensure_config_file(config_path)?;

    let contents = std::fs::read_to_string(config_path).context("Failed to read config file")?;
    let updated = set_value(&contents, key, raw)?;
    std::fs::write(config_path, updated).context("Failed to write config file")?;

    println!("✓ Updated {key} = {raw}");
    println!("  in {}", config_path.display());
    Ok(())
}

pub fn show_path(config_path: &Path) {
    println!("{}", config_path.display());
}

pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config(config_path: &Path) -> Result<()> {
    let created = config::ensure_config_file(config_path)?;

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure Matrix.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_keeps_comments() {
        let contents = "# Word that wakes the assistant\nwake_word = \"matrix\"\n";
        let updated = set_value(contents, "wake_word", "jarvis").unwrap();
        assert!(updated.contains("# Word that wakes the assistant"));
        assert!(updated.contains("wake_word = \"jarvis\""));
    }

    #[test]
    fn test_set_value_types() {
        let updated = set_value("", "timeout_secs", "30").unwrap();
        assert!(updated.contains("timeout_secs = 30"));

        let updated = set_value("", "allow_power", "true").unwrap();
        assert!(updated.contains("allow_power = true"));

        assert!(set_value("", "timeout_secs", "soon").is_err());
        assert!(set_value("", "timeout_secs", "0").is_err());
        assert!(set_value("", "allow_power", "maybe").is_err());
    }

    #[test]
    fn test_set_value_rejects_unknown_key() {
        let err = set_value("", "colour", "red").unwrap_err();
        assert!(err.to_string().starts_with("Unknown config key: colour"));
    }

    #[test]
    fn test_example_round_trips() {
        let updated = set_value(config::example_config(), "max_history", "10").unwrap();
        let doc = updated.parse::<DocumentMut>().unwrap();
        assert_eq!(doc["max_history"].as_integer(), Some(10));
        assert_eq!(doc["wake_word"].as_str(), Some("matrix"));
    }
}
