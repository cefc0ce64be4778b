//! Launching desktop applications from a name -> path table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{SkillError, SkillResult};
use crate::launcher::{Launcher, ProgramCall};

/// Application table loaded from `app_paths.json`.
#[derive(Debug, Clone, Default)]
pub struct AppLauncher {
    paths: BTreeMap<String, PathBuf>,
}

impl AppLauncher {
    #[must_use]
    pub fn new(paths: BTreeMap<String, PathBuf>) -> Self {
        let paths = paths
            .into_iter()
            .map(|(name, path)| (name.to_lowercase(), path))
            .collect();
        Self { paths }
    }

    /// Load the table from a JSON object of `name: path` pairs.
    ///
    /// A missing or unreadable file leaves the table empty; every launch
    /// then reports the app as not found.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(apps) => {
                tracing::info!("Loaded {} application paths", apps.paths.len());
                apps
            }
            Err(e) => {
                tracing::warn!("Could not load {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> SkillResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let paths: BTreeMap<String, PathBuf> = serde_json::from_str(&contents)?;
        Ok(Self::new(paths))
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        self.paths.get(name).map(PathBuf::as_path)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Launch `name` if its executable exists.
    pub fn open(&self, name: &str, launcher: &mut dyn Launcher) -> SkillResult<String> {
        let label = label(name);
        let path = self
            .paths
            .get(name)
            .filter(|p| p.exists())
            .ok_or_else(|| SkillError::AppNotFound {
                label: label.clone(),
            })?;

        let call = ProgramCall::new(path.to_string_lossy(), Vec::<String>::new());
        launcher
            .spawn(&call)
            .map_err(|source| SkillError::Launch {
                program: label.clone(),
                source,
            })?;

        tracing::info!("Opened {} from {}", label, path.display());
        Ok(format!("Opening {label}"))
    }
}

/// Display name for an app key.
pub fn label(name: &str) -> String {
    match name {
        "chrome" => String::from("Chrome"),
        "vscode" => String::from("Visual Studio Code"),
        "whatsapp" => String::from("WhatsApp"),
        other => {
            let mut chars = other.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        }
    }
}
