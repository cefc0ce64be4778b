use std::collections::BTreeSet;

use super::{Action, Category, Command, MediaAction, Param, PowerAction, SystemQuery};

/// The table of commands the assistant understands.
///
/// Order matters: exact matching returns the first command with a pattern
/// contained in the utterance, so specific patterns ("search youtube",
/// "find files") come before generic ones ("search", "find"), and the
/// assistant's own commands ("help", "current time") come last so they
/// never shadow a command that merely mentions them.
#[derive(Debug, Clone)]
pub struct Registry {
    commands: Vec<Command>,
}

impl Registry {
    #[must_use]
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    /// The built-in command table.
    #[must_use]
    pub fn default_commands() -> Self {
        use Category::{Apps, Assistant, Browser, Communication, Files, Media, Power, System};

        let commands = vec![
            // Applications
            Command::new(
                &["open chrome", "launch chrome", "start chrome"],
                Action::OpenApp("chrome"),
                "Open Google Chrome",
                Apps,
            ),
            Command::new(
                &["open firefox", "launch firefox"],
                Action::OpenApp("firefox"),
                "Open Firefox",
                Apps,
            ),
            Command::new(
                &["open notepad", "launch notepad"],
                Action::OpenApp("notepad"),
                "Open Notepad",
                Apps,
            ),
            Command::new(
                &["open calculator", "launch calculator", "calculator"],
                Action::OpenApp("calculator"),
                "Open Calculator",
                Apps,
            ),
            Command::new(
                &["open vscode", "open code", "launch vscode"],
                Action::OpenApp("vscode"),
                "Open VS Code",
                Apps,
            ),
            Command::new(
                &["open spotify", "launch spotify", "start spotify"],
                Action::OpenApp("spotify"),
                "Open Spotify",
                Apps,
            ),
            Command::new(&["open discord"], Action::OpenApp("discord"), "Open Discord", Apps),
            Command::new(&["open whatsapp"], Action::OpenApp("whatsapp"), "Open WhatsApp", Apps),
            Command::new(&["open telegram"], Action::OpenApp("telegram"), "Open Telegram", Apps),
            Command::new(&["open steam"], Action::OpenApp("steam"), "Open Steam", Apps),
            // Files
            Command::new(
                &["create folder", "make folder", "new folder"],
                Action::CreateFolder,
                "Create a folder",
                Files,
            )
            .with_param(Param::Name),
            Command::new(
                &["delete file", "remove file"],
                Action::DeleteFile,
                "Delete a file",
                Files,
            )
            .with_param(Param::Name),
            Command::new(&["rename file"], Action::RenameFile, "Rename a file", Files)
                .with_param(Param::Rename),
            Command::new(
                &["search files", "find files"],
                Action::SearchFiles,
                "Search for files",
                Files,
            )
            .with_param(Param::Name),
            // Messaging
            Command::new(
                &["send message", "send whatsapp", "whatsapp message"],
                Action::SendMessage,
                "Send WhatsApp message",
                Communication,
            ),
            Command::new(
                &["list contacts", "show contacts"],
                Action::ListContacts,
                "List saved contacts",
                Communication,
            ),
            // Browser
            Command::new(
                &["search youtube", "youtube search"],
                Action::YoutubeSearch,
                "Search YouTube",
                Browser,
            )
            .with_param(Param::Query),
            Command::new(
                &["open youtube", "go to youtube"],
                Action::OpenWebsite("youtube"),
                "Open YouTube",
                Browser,
            ),
            Command::new(
                &["open gmail", "check email"],
                Action::OpenGmail,
                "Open Gmail",
                Browser,
            ),
            Command::new(
                &["open maps", "show maps", "google maps"],
                Action::OpenMaps,
                "Open Google Maps",
                Browser,
            )
            .with_param(Param::OptionalQuery),
            Command::new(
                &["search for", "search", "google", "look up", "find"],
                Action::WebSearch,
                "Search the web",
                Browser,
            )
            .with_param(Param::Query),
            // Media
            Command::new(
                &["play music", "pause music", "play pause", "toggle music"],
                Action::Media(MediaAction::PlayPause),
                "Play/Pause music",
                Media,
            ),
            Command::new(
                &["next track", "next song", "skip"],
                Action::Media(MediaAction::Next),
                "Next track",
                Media,
            ),
            Command::new(
                &["previous track", "previous song", "back"],
                Action::Media(MediaAction::Previous),
                "Previous track",
                Media,
            ),
            Command::new(
                &["volume up", "increase volume", "louder"],
                Action::Media(MediaAction::VolumeUp),
                "Increase volume",
                Media,
            ),
            Command::new(
                &["volume down", "decrease volume", "quieter"],
                Action::Media(MediaAction::VolumeDown),
                "Decrease volume",
                Media,
            ),
            Command::new(
                &["mute", "unmute", "toggle mute"],
                Action::Media(MediaAction::Mute),
                "Toggle mute",
                Media,
            ),
            // System information
            Command::new(
                &["battery status", "battery level", "how much battery"],
                Action::System(SystemQuery::Battery),
                "Get battery status",
                System,
            ),
            Command::new(
                &["cpu usage", "processor usage", "cpu status"],
                Action::System(SystemQuery::Cpu),
                "Get CPU usage",
                System,
            ),
            Command::new(
                &["memory usage", "ram usage", "memory status"],
                Action::System(SystemQuery::Memory),
                "Get memory usage",
                System,
            ),
            Command::new(
                &["disk space", "storage space", "disk usage"],
                Action::System(SystemQuery::Disk),
                "Get disk usage",
                System,
            ),
            Command::new(
                &["system status", "full status", "system info"],
                Action::System(SystemQuery::Full),
                "Get full system status",
                System,
            ),
            // Power
            Command::new(
                &["shutdown", "shut down", "power off"],
                Action::Power(PowerAction::Shutdown),
                "Shutdown PC",
                Power,
            ),
            Command::new(
                &["restart", "reboot"],
                Action::Power(PowerAction::Restart),
                "Restart PC",
                Power,
            ),
            Command::new(
                &["suspend", "sleep computer", "sleep the computer"],
                Action::Power(PowerAction::Sleep),
                "Put PC to sleep",
                Power,
            ),
            Command::new(
                &["lock screen", "lock computer", "lock"],
                Action::Power(PowerAction::Lock),
                "Lock screen",
                Power,
            ),
            // Assistant
            Command::new(
                &["what time is it", "current time", "tell me the time"],
                Action::CurrentTime,
                "Tell the current time",
                Assistant,
            ),
            Command::new(
                &["what is the date", "today's date", "what's the date", "current date"],
                Action::CurrentDate,
                "Tell today's date",
                Assistant,
            ),
            Command::new(
                &["help", "what can you do"],
                Action::Help,
                "List what Matrix can do",
                Assistant,
            ),
            Command::new(
                &["show history", "recent commands"],
                Action::History,
                "Repeat recent commands",
                Assistant,
            ),
        ];

        Self::new(commands)
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Commands in a category, or all of them.
    pub fn list(&self, category: Option<Category>) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|cmd| category.map_or(true, |c| cmd.category == c))
            .collect()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<Category> {
        self.commands
            .iter()
            .map(|cmd| cmd.category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::default_commands()
    }
}
