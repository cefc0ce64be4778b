use anyhow::Result;
use chrono::Local;
use std::path::Path;

pub fn show_history(db_path: &Path, limit: usize, clear: bool) -> Result<()> {
    let db = super::open_database(db_path)?;

    if clear {
        let removed = db.clear_commands()?;
        println!("✓ Cleared {removed} recorded commands");
        return Ok(());
    }

    let entries = db.recent_commands(limit)?;
    if entries.is_empty() {
        println!("No commands recorded yet.");
        println!("\nRun `matrix run` and give Matrix a few commands first.");
        return Ok(());
    }

    println!("\nRecent commands ({} shown)\n", entries.len());
    for entry in entries {
        let mark = if entry.success { "✓" } else { "✗" };
        let category = entry.category.map_or("unknown", |c| c.as_str());
        println!(
            "  {mark} {}  [{category}] {}",
            entry.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            entry.command
        );
        if let Some(response) = entry.response {
            println!("      → {response}");
        }
    }

    Ok(())
}
