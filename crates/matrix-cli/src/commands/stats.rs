use anyhow::Result;
use matrix_core::Registry;
use std::path::Path;

pub fn show_stats(db_path: &Path) -> Result<()> {
    let db = super::open_database(db_path)?;
    let registry = Registry::default_commands();

    let sessions = db.count_sessions()?;
    let total = db.count_commands()?;
    let counts = db.command_counts_by_category()?;
    let successful: u64 = counts.iter().map(|c| c.successful).sum();

    println!("\n📊 Matrix Statistics\n");
    println!("  Database: {}", db_path.display());
    println!("  Sessions: {sessions}");
    println!("  Commands: {total}");
    if total > 0 {
        println!(
            "  Success rate: {:.1}%",
            successful as f64 / total as f64 * 100.0
        );
    }
    println!(
        "  Registered: {} commands in {} categories",
        registry.len(),
        registry.categories().len()
    );

    if !counts.is_empty() {
        println!("\n  By category:");
        for count in counts {
            let name = count.category.map_or("unknown", |c| c.as_str());
            println!("    {name:<14} {:>5} ({} ok)", count.total, count.successful);
        }
    }

    Ok(())
}
