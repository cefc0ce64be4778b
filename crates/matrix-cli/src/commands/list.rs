use anyhow::Result;
use matrix_core::{Category, Registry};

/// Print the registered commands, grouped by category.
pub fn list_commands(category: Option<&str>) -> Result<()> {
    let registry = Registry::default_commands();
    let only: Option<Category> = category.map(str::parse).transpose()?;

    let categories: Vec<Category> = registry
        .categories()
        .into_iter()
        .filter(|c| only.is_none_or(|only| only == *c))
        .collect();

    for category in categories {
        let commands = registry.list(Some(category));
        println!("\n{} ({})", category.as_str().to_uppercase(), commands.len());

        for command in commands {
            let first = command.patterns.first().copied().unwrap_or_default();
            let aliases = command.patterns.get(1..).unwrap_or_default();
            println!("  {first:<22} {}", command.description);
            if !aliases.is_empty() {
                println!("  {:<22}   also: {}", "", aliases.join(", "));
            }
        }
    }

    println!("\n{} commands total", registry.len());
    Ok(())
}
