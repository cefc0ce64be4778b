mod db;
mod migrations;

pub use db::{CategoryCount, Database, HistoryEntry};
pub use migrations::{Migration, MIGRATIONS};
