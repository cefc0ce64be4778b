//! Folder and file operations inside a base directory.

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{SkillError, SkillResult};

const SEARCH_DEPTH: usize = 5;
const SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct FileManager {
    base: PathBuf,
}

impl FileManager {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve a spoken name below the base directory.
    ///
    /// Absolute paths and names that climb out with `..` are rejected.
    pub fn resolve(&self, name: &str) -> SkillResult<PathBuf> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SkillError::InvalidInput(String::from(
                "Please tell me the name.",
            )));
        }

        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(SkillError::InvalidInput(format!(
                "I can only work with names inside {}.",
                self.base.display()
            )));
        }
        Ok(self.base.join(relative))
    }

    pub fn create_folder(&self, name: &str) -> SkillResult<String> {
        let path = self.resolve(name)?;
        if path.exists() {
            return Err(SkillError::AlreadyExists {
                what: "folder",
                name: name.to_string(),
            });
        }
        std::fs::create_dir_all(&path)?;
        tracing::info!("Created folder {}", path.display());
        Ok(format!("Folder '{name}' created."))
    }

    /// Delete a regular file; folders are left alone.
    pub fn delete_file(&self, name: &str) -> SkillResult<String> {
        let path = self.resolve(name)?;
        if !path.is_file() {
            return Err(SkillError::NotFound {
                what: "file",
                name: name.to_string(),
            });
        }
        std::fs::remove_file(&path)?;
        tracing::info!("Deleted file {}", path.display());
        Ok(format!("File '{name}' deleted."))
    }

    pub fn rename_file(&self, from: &str, to: &str) -> SkillResult<String> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        if !source.is_file() {
            return Err(SkillError::NotFound {
                what: "file",
                name: from.to_string(),
            });
        }
        if target.exists() {
            return Err(SkillError::AlreadyExists {
                what: "file",
                name: to.to_string(),
            });
        }
        std::fs::rename(&source, &target)?;
        tracing::info!("Renamed {} to {}", source.display(), target.display());
        Ok(format!("File renamed to '{to}'."))
    }

    /// Files and folders whose name contains `term`, case-insensitively,
    /// relative to the base directory.
    pub fn find(&self, term: &str) -> Vec<PathBuf> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }

        WalkDir::new(&self.base)
            .min_depth(1)
            .max_depth(SEARCH_DEPTH)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .to_lowercase()
                    .contains(&term)
            })
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&self.base)
                    .ok()
                    .map(Path::to_path_buf)
            })
            .take(SEARCH_LIMIT)
            .collect()
    }

    pub fn search_files(&self, term: &str) -> SkillResult<String> {
        let found = self.find(term);
        if found.is_empty() {
            return Ok(format!("No files matching '{}' found.", term.trim()));
        }

        let names: Vec<String> = found.iter().map(|p| p.display().to_string()).collect();
        let noun = if names.len() == 1 { "match" } else { "matches" };
        Ok(format!("Found {} {noun}: {}.", names.len(), names.join(", ")))
    }
}
