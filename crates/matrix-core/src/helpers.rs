//! Small utility helpers shared by the assistant and its skills.

use chrono::Local;
use std::path::Path;
use walkdir::WalkDir;

/// Trim and lowercase a heard query.
pub fn clean_query(query: Option<&str>) -> Option<String> {
    query.map(|q| q.trim().to_lowercase())
}

/// Returns `true` only for existing regular files.
pub fn check_file_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}

/// Returns `true` only for existing directories.
pub fn check_folder_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_dir()
}

/// Size of a regular file in bytes.
pub fn get_file_size(path: impl AsRef<Path>) -> Option<u64> {
    let path = path.as_ref();
    if !path.is_file() {
        return None;
    }
    std::fs::metadata(path).ok().map(|m| m.len())
}

/// Recursive size of all regular files below `path`.
pub fn get_folder_size(path: impl AsRef<Path>) -> Option<u64> {
    let path = path.as_ref();
    if !path.is_dir() {
        return None;
    }

    let total = WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum();

    Some(total)
}

/// Local wall-clock time as `HH:MM:SS`.
pub fn get_current_time() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Local date as `YYYY-MM-DD`.
pub fn get_current_date() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// One keyword or a list of alternatives.
#[derive(Debug, Clone)]
pub enum Keywords<'a> {
    One(&'a str),
    Any(Vec<&'a str>),
}

impl<'a> From<&'a str> for Keywords<'a> {
    fn from(keyword: &'a str) -> Self {
        Self::One(keyword)
    }
}

impl<'a> From<&[&'a str]> for Keywords<'a> {
    fn from(keywords: &[&'a str]) -> Self {
        Self::Any(keywords.to_vec())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for Keywords<'a> {
    fn from(keywords: [&'a str; N]) -> Self {
        Self::Any(keywords.to_vec())
    }
}

impl<'a> From<Vec<&'a str>> for Keywords<'a> {
    fn from(keywords: Vec<&'a str>) -> Self {
        Self::Any(keywords)
    }
}

/// Case-insensitive substring test against one or several keywords.
pub fn contains_keyword<'a>(text: &str, keywords: impl Into<Keywords<'a>>) -> bool {
    let text = text.to_lowercase();
    match keywords.into() {
        Keywords::One(keyword) => text.contains(&keyword.to_lowercase()),
        Keywords::Any(list) => list
            .iter()
            .any(|keyword| text.contains(&keyword.to_lowercase())),
    }
}

/// Human readable byte count (`10.0 KB`, `2.5 GB`).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
