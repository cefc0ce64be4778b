//! Skill error types.

use thiserror::Error;

/// Errors that can occur while a skill runs.
#[derive(Debug, Error)]
pub enum SkillError {
    /// An application is not in the app table or its executable is missing.
    #[error("{label} not found on your system")]
    AppNotFound { label: String },

    /// A named file, folder or contact does not exist.
    #[error("{what} '{name}' not found")]
    NotFound { what: &'static str, name: String },

    #[error("{what} '{name}' already exists")]
    AlreadyExists { what: &'static str, name: String },

    /// Spawning an external program failed.
    #[error("failed to run {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The action is switched off in the configuration.
    #[error("{0}")]
    Disabled(String),

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SkillError {
    /// Returns `true` when the message is meant to be read back to the
    /// user as-is rather than replaced by a generic apology.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Json(_) | Self::Launch { .. })
    }

    /// The sentence to speak for this error.
    pub fn reply(&self) -> String {
        match self {
            Self::NotFound { what, name } => format!("{} '{name}' not found.", capitalize(what)),
            Self::AlreadyExists { what, name } => {
                format!("{} '{name}' already exists.", capitalize(what))
            }
            Self::InvalidInput(message) => message.clone(),
            Self::Launch { program, .. } => format!("Sorry, I couldn't start {program}."),
            _ if self.is_user_facing() => self.to_string(),
            _ => String::from("Sorry, there was an error executing that command."),
        }
    }

    /// Convert into the core error, tagged with the skill that failed.
    pub fn into_core(self, skill: &'static str) -> matrix_core::Error {
        tracing::warn!("{} skill failed: {}", skill, self);
        matrix_core::Error::Skill {
            skill,
            message: self.reply(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Convenience alias for skill results.
pub type SkillResult<T> = std::result::Result<T, SkillError>;
