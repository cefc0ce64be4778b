//! Command definitions: what the assistant can be asked to do.

mod registry;

pub use registry::Registry;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A family of related commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Apps,
    Browser,
    Media,
    System,
    Power,
    Files,
    Communication,
    Assistant,
}

impl Category {
    pub const ALL: [Self; 8] = [
        Self::Apps,
        Self::Browser,
        Self::Media,
        Self::System,
        Self::Power,
        Self::Files,
        Self::Communication,
        Self::Assistant,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apps => "apps",
            Self::Browser => "browser",
            Self::Media => "media",
            Self::System => "system",
            Self::Power => "power",
            Self::Files => "files",
            Self::Communication => "communication",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| Error::InvalidData(format!("unknown category: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaAction {
    PlayPause,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
    Mute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemQuery {
    Battery,
    Cpu,
    Memory,
    Disk,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerAction {
    Shutdown,
    Restart,
    Sleep,
    Lock,
}

/// What a matched command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Launch a desktop application by its key in the app table.
    OpenApp(&'static str),
    WebSearch,
    /// Open a well-known site by name.
    OpenWebsite(&'static str),
    OpenGmail,
    YoutubeSearch,
    OpenMaps,
    Media(MediaAction),
    System(SystemQuery),
    Power(PowerAction),
    CreateFolder,
    DeleteFile,
    RenameFile,
    SearchFiles,
    SendMessage,
    ListContacts,
    CurrentTime,
    CurrentDate,
    Help,
    History,
}

/// How the argument of a command is pulled out of the utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// No argument.
    None,
    /// Everything after the matched pattern; must not be empty.
    Query,
    /// Everything after the matched pattern; may be empty.
    OptionalQuery,
    /// Command words removed, the rest is a name (folder, file, search term).
    Name,
    /// `OLD to NEW`.
    Rename,
}

/// A registered command.
#[derive(Debug, Clone)]
pub struct Command {
    pub patterns: &'static [&'static str],
    pub action: Action,
    pub description: &'static str,
    pub category: Category,
    pub param: Param,
}

impl Command {
    #[must_use]
    pub const fn new(
        patterns: &'static [&'static str],
        action: Action,
        description: &'static str,
        category: Category,
    ) -> Self {
        Self {
            patterns,
            action,
            description,
            category,
            param: Param::None,
        }
    }

    #[must_use]
    pub const fn with_param(mut self, param: Param) -> Self {
        self.param = param;
        self
    }

    #[must_use]
    pub const fn requires_params(&self) -> bool {
        !matches!(self.param, Param::None)
    }
}

/// An argument extracted from the utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Text(String),
    Rename { from: String, to: String },
}

/// A matched action ready for a skill to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub action: Action,
    pub category: Category,
    pub argument: Option<Argument>,
    /// The normalized utterance that produced this invocation.
    pub text: String,
}

impl Invocation {
    #[must_use]
    pub fn new(action: Action, category: Category, text: impl Into<String>) -> Self {
        Self {
            action,
            category,
            argument: None,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.argument = Some(argument);
        self
    }

    /// The text argument, if any.
    pub fn text_argument(&self) -> Option<&str> {
        match &self.argument {
            Some(Argument::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}
