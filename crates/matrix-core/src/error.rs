use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {entity} {name}")]
    NotFound { entity: &'static str, name: String },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A command that needs an argument was issued without one.
    #[error("missing {what} for '{command}'")]
    MissingParameter { command: String, what: &'static str },

    /// A skill ran but could not complete the action.
    #[error("{skill} failed: {message}")]
    Skill { skill: &'static str, message: String },
}

impl Error {
    /// The sentence to speak back when this error ends a command.
    pub fn reply(&self) -> String {
        match self {
            Self::MissingParameter { what, .. } => format!("Please tell me the {what}."),
            Self::NotFound { entity, name } => format!("I couldn't find the {entity} '{name}'."),
            Self::Skill { message, .. } => message.clone(),
            _ => String::from("Sorry, there was an error executing that command."),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
