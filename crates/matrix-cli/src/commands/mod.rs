pub mod config;
pub mod contacts;
pub mod exec;
pub mod history;
pub mod list;
pub mod run;
pub mod stats;

pub use exec::run_exec;
pub use history::show_history;
pub use list::list_commands;
pub use run::run_assistant;
pub use stats::show_stats;

use anyhow::{Context, Result};
use matrix_core::schema::Database;
use std::path::Path;

/// Open the history database, creating its directory first.
pub fn open_database(db_path: &Path) -> Result<Database> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Database::open(db_path).context("Failed to open database")
}
