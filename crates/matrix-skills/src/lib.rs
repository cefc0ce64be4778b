//! Skills for the Matrix assistant.
//!
//! Each module performs one family of actions: launching applications,
//! browsing, media and power control, system status, file management and
//! messaging. [`Skills`] bundles them behind
//! [`matrix_core::SkillExecutor`] so the assistant can dispatch matched
//! invocations to them.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod apps;
pub mod browser;
pub mod error;
pub mod files;
pub mod launcher;
pub mod media;
pub mod messages;
pub mod power;
pub mod system;

use async_trait::async_trait;
use matrix_core::{Action, Argument, Config, Invocation, SkillExecutor, Speech};

pub use apps::AppLauncher;
pub use error::{SkillError, SkillResult};
pub use files::FileManager;
pub use launcher::{Launcher, Platform, ProgramCall, RecordingLauncher, SystemLauncher};
pub use messages::{Contact, MessageSender, MessageStats};
pub use power::PowerControl;

/// All skills, wired to one [`Launcher`].
#[derive(Debug)]
pub struct Skills<L: Launcher = SystemLauncher> {
    launcher: L,
    apps: AppLauncher,
    files: FileManager,
    power: PowerControl,
    messages: MessageSender,
}

impl Skills<SystemLauncher> {
    pub fn from_config(config: &Config) -> Self {
        Self::with_launcher(config, SystemLauncher)
    }
}

impl<L: Launcher> Skills<L> {
    pub fn with_launcher(config: &Config, launcher: L) -> Self {
        Self {
            launcher,
            apps: AppLauncher::load(&config.app_paths_file),
            files: FileManager::new(&config.files_base_dir),
            power: PowerControl::new(config.allow_power),
            messages: MessageSender::load(&config.contacts_file),
        }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn apps(&self) -> &AppLauncher {
        &self.apps
    }

    pub fn files(&self) -> &FileManager {
        &self.files
    }

    pub fn messages(&self) -> &MessageSender {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut MessageSender {
        &mut self.messages
    }

    /// Contact sending with an explicit launcher borrow, for callers that
    /// skip the conversational flow.
    pub fn send_to_contact(&mut self, name: &str, message: &str) -> SkillResult<String> {
        self.messages.send_to_contact(&mut self.launcher, name, message)
    }
}

#[async_trait]
impl<L: Launcher> SkillExecutor for Skills<L> {
    async fn execute(
        &mut self,
        invocation: &Invocation,
        speech: &mut dyn Speech,
    ) -> matrix_core::Result<String> {
        let query = invocation.text_argument();
        tracing::debug!("Executing {:?} ({:?})", invocation.action, query);

        match invocation.action {
            Action::OpenApp(name) => self
                .apps
                .open(name, &mut self.launcher)
                .map_err(|e| e.into_core("apps")),
            Action::WebSearch => {
                browser::search_web(&mut self.launcher, query).map_err(|e| e.into_core("browser"))
            }
            Action::YoutubeSearch => browser::search_youtube(&mut self.launcher, query)
                .map_err(|e| e.into_core("browser")),
            Action::OpenMaps => {
                browser::open_maps(&mut self.launcher, query).map_err(|e| e.into_core("browser"))
            }
            Action::OpenGmail => {
                browser::open_gmail(&mut self.launcher).map_err(|e| e.into_core("browser"))
            }
            Action::OpenWebsite(site) => browser::open_website(&mut self.launcher, site)
                .map_err(|e| e.into_core("browser")),
            Action::Media(action) => {
                media::control(&mut self.launcher, action).map_err(|e| e.into_core("media"))
            }
            Action::System(query) => system::query(query)
                .await
                .map_err(|e| e.into_core("system")),
            Action::Power(action) => self
                .power
                .perform(&mut self.launcher, action)
                .map_err(|e| e.into_core("power")),
            Action::CreateFolder => self
                .files
                .create_folder(query.unwrap_or_default())
                .map_err(|e| e.into_core("files")),
            Action::DeleteFile => self
                .files
                .delete_file(query.unwrap_or_default())
                .map_err(|e| e.into_core("files")),
            Action::RenameFile => match &invocation.argument {
                Some(Argument::Rename { from, to }) => self.files.rename_file(from, to),
                _ => Err(SkillError::InvalidInput(String::from(
                    "Please tell me the old and new name.",
                ))),
            }
            .map_err(|e| e.into_core("files")),
            Action::SearchFiles => self
                .files
                .search_files(query.unwrap_or_default())
                .map_err(|e| e.into_core("files")),
            Action::SendMessage => self
                .messages
                .send_interactive(&mut self.launcher, speech)
                .await
                .map_err(|e| e.into_core("messages")),
            Action::ListContacts => Ok(self.messages.describe_contacts()),
            Action::CurrentTime | Action::CurrentDate | Action::Help | Action::History => {
                Err(matrix_core::Error::InvalidData(format!(
                    "{:?} is answered by the assistant",
                    invocation.action
                )))
            }
        }
    }
}
