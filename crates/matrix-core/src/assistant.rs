//! The conversation loop.
//!
//! The assistant sleeps until it hears its wake word, then takes commands
//! until the user sends it back to sleep or stays silent for the
//! configured timeout.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

use crate::command::{Action, Invocation, Registry};
use crate::config::Config;
use crate::context::ContextManager;
use crate::error::Result;
use crate::helpers::{get_current_date, get_current_time};
use crate::ids::SessionId;
use crate::processor::{CommandProcessor, Outcome};
use crate::schema::Database;
use crate::skill::SkillExecutor;
use crate::speech::{Heard, Speech};

pub const GREETING: &str = "Hello, I am Matrix. Ready for command.";
pub const ACKNOWLEDGE: &str = "Yes?";
pub const SLEEPING: &str = "Going to sleep mode.";
pub const IDLE_TIMEOUT: &str = "No activity detected. Going idle.";
pub const FAREWELL: &str = "Goodbye!";

const SLEEP_PHRASES: &[&str] = &["goodbye", "go to sleep", "sleep mode", "stop listening"];
const EXIT_PHRASES: &[&str] = &["exit", "quit"];

/// Settings the conversation loop needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    pub wake_word: String,
    pub timeout: Duration,
    pub enable_context: bool,
    pub max_history: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AssistantConfig {
    fn from(config: &Config) -> Self {
        Self {
            wake_word: config.wake_word.trim().to_lowercase(),
            timeout: config.timeout(),
            enable_context: config.enable_context,
            max_history: config.max_history,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for the wake word.
    Idle,
    /// Taking commands.
    Active,
}

#[derive(Debug)]
pub struct Assistant<S, E> {
    config: AssistantConfig,
    state: State,
    speech: S,
    executor: E,
    processor: CommandProcessor,
    context: Option<ContextManager>,
    history: Option<(Database, SessionId)>,
    help: String,
}

impl<S, E> Assistant<S, E>
where
    S: Speech,
    E: SkillExecutor,
{
    pub fn new(config: AssistantConfig, speech: S, executor: E) -> Self {
        let registry = Registry::default_commands();
        let help = help_text(&registry);
        let context = config
            .enable_context
            .then(|| ContextManager::new(config.max_history));

        Self {
            config,
            state: State::Idle,
            speech,
            executor,
            processor: CommandProcessor::new(registry),
            context,
            history: None,
            help,
        }
    }

    /// Persist every processed command to `db` under a new session.
    pub fn with_history(mut self, db: Database) -> Result<Self> {
        let session = db.start_session(&self.config.wake_word)?;
        tracing::info!("Recording history for session {}", session);
        self.history = Some((db, session));
        Ok(self)
    }

    pub const fn state(&self) -> State {
        self.state
    }

    pub const fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub const fn speech(&self) -> &S {
        &self.speech
    }

    pub const fn executor(&self) -> &E {
        &self.executor
    }

    pub const fn processor(&self) -> &CommandProcessor {
        &self.processor
    }

    pub const fn context(&self) -> Option<&ContextManager> {
        self.context.as_ref()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.history.as_ref().map(|(_, id)| *id)
    }

    /// Run until the input closes or the user says "exit".
    pub async fn run(&mut self) {
        tracing::info!(
            "Matrix started: wake word '{}', timeout {}s",
            self.config.wake_word,
            self.config.timeout.as_secs()
        );
        self.speech.speak(GREETING).await;

        let mut deadline = Instant::now() + self.config.timeout;

        loop {
            match self.state {
                State::Idle => match self.speech.listen(None).await {
                    Heard::Closed => break,
                    Heard::Silence | Heard::TimedOut => {}
                    Heard::Text(text) => {
                        if is_exit(&text) {
                            break;
                        }
                        if !text.contains(&self.config.wake_word) {
                            tracing::debug!("Ignoring while idle: {}", text);
                            continue;
                        }

                        tracing::info!("Wake word detected");
                        self.state = State::Active;
                        deadline = Instant::now() + self.config.timeout;

                        let command = self.strip_wake_word(&text);
                        if command.is_empty() {
                            self.speech.speak(ACKNOWLEDGE).await;
                        } else {
                            self.handle(&command).await;
                        }
                    }
                },
                State::Active => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        self.go_idle(IDLE_TIMEOUT).await;
                        continue;
                    }

                    match self.speech.listen(Some(remaining)).await {
                        Heard::Closed => break,
                        Heard::TimedOut => self.go_idle(IDLE_TIMEOUT).await,
                        Heard::Silence => {}
                        Heard::Text(text) => {
                            tracing::info!("User said: {}", text);
                            let command = self.strip_wake_word(&text);

                            if is_exit(&command) {
                                break;
                            }
                            if SLEEP_PHRASES.iter().any(|p| command.contains(p)) {
                                self.go_idle(SLEEPING).await;
                                continue;
                            }

                            if command.is_empty() {
                                self.speech.speak(ACKNOWLEDGE).await;
                            } else {
                                self.handle(&command).await;
                            }
                            deadline = Instant::now() + self.config.timeout;
                        }
                    }
                }
            }
        }

        self.speech.speak(FAREWELL).await;
        tracing::info!("Matrix shutdown complete");
    }

    /// Process one command, speak the reply and record the exchange.
    pub async fn handle(&mut self, text: &str) -> Outcome {
        let mut local = LocalSkills {
            inner: &mut self.executor,
            context: self.context.as_ref(),
            help: &self.help,
        };
        let outcome = self
            .processor
            .process(text, &mut local, &mut self.speech)
            .await;

        if let Some(reply) = outcome.reply() {
            self.speech.speak(reply).await;
        }

        if outcome != Outcome::Empty {
            self.remember(text, &outcome);
        }

        outcome
    }

    async fn go_idle(&mut self, message: &str) {
        self.speech.speak(message).await;
        self.state = State::Idle;
    }

    fn strip_wake_word(&self, text: &str) -> String {
        text.replace(self.config.wake_word.as_str(), " ")
            .split(|c: char| c.is_whitespace())
            .map(|w| w.trim_matches(|c: char| c == ',' || c == '!'))
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn remember(&mut self, text: &str, outcome: &Outcome) {
        let reply = outcome.reply().map(str::to_string);

        if let Some(context) = self.context.as_mut() {
            context.add_command(text, reply.clone());
        }

        if let Some((db, session)) = &self.history {
            if let Err(e) = db.record_command(
                *session,
                text,
                reply.as_deref(),
                outcome.category(),
                outcome.is_success(),
            ) {
                tracing::error!("Failed to record command history: {}", e);
            }
        }
    }
}

fn is_exit(text: &str) -> bool {
    EXIT_PHRASES.contains(&text.trim())
}

fn help_text(registry: &Registry) -> String {
    let categories: Vec<String> = registry
        .categories()
        .iter()
        .map(ToString::to_string)
        .collect();
    format!(
        "I know {} commands covering {}. Try 'open chrome', 'search for something' or 'battery status'.",
        registry.len(),
        categories.join(", ")
    )
}

/// Answers the assistant's own questions and hands everything else on.
struct LocalSkills<'a, E: ?Sized> {
    inner: &'a mut E,
    context: Option<&'a ContextManager>,
    help: &'a str,
}

#[async_trait]
impl<'a, E> SkillExecutor for LocalSkills<'a, E>
where
    E: SkillExecutor + ?Sized,
{
    async fn execute(&mut self, invocation: &Invocation, speech: &mut dyn Speech) -> Result<String> {
        match invocation.action {
            Action::CurrentTime => Ok(format!("It is {}.", get_current_time())),
            Action::CurrentDate => Ok(format!("Today is {}.", get_current_date())),
            Action::Help => Ok(self.help.to_string()),
            Action::History => Ok(history_reply(self.context)),
            _ => self.inner.execute(invocation, speech).await,
        }
    }
}

fn history_reply(context: Option<&ContextManager>) -> String {
    let Some(context) = context else {
        return String::from("Context tracking is disabled.");
    };

    let recent: Vec<&str> = context
        .recent(5)
        .iter()
        .map(|entry| entry.command.as_str())
        .collect();

    if recent.is_empty() {
        String::from("You haven't given me any commands yet.")
    } else {
        format!("Your recent commands: {}.", recent.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Category;
    use crate::speech::ScriptedSpeech;

    #[derive(Debug, Default)]
    struct Echo {
        seen: Vec<Invocation>,
    }

    #[async_trait]
    impl SkillExecutor for Echo {
        async fn execute(&mut self, invocation: &Invocation, _speech: &mut dyn Speech) -> Result<String> {
            self.seen.push(invocation.clone());
            Ok(format!("done: {}", invocation.text))
        }
    }

    fn assistant(inputs: &[&str]) -> Assistant<ScriptedSpeech, Echo> {
        Assistant::new(
            AssistantConfig::default(),
            ScriptedSpeech::new(inputs.iter().copied()),
            Echo::default(),
        )
    }

    #[tokio::test]
    async fn test_ignores_commands_until_woken() {
        let mut matrix = assistant(&["open chrome", "matrix", "open chrome"]);
        matrix.run().await;

        let spoken = matrix.speech().spoken();
        assert_eq!(spoken[0], GREETING);
        assert_eq!(spoken[1], ACKNOWLEDGE);
        assert_eq!(spoken[2], "done: open chrome");
        assert_eq!(spoken.last().map(String::as_str), Some(FAREWELL));
        assert_eq!(matrix.executor().seen.len(), 1);
    }

    #[tokio::test]
    async fn test_wake_word_with_inline_command() {
        let mut matrix = assistant(&["Matrix, open notepad"]);
        matrix.run().await;

        assert_eq!(matrix.executor().seen[0].text, "open notepad");
        assert_eq!(matrix.state(), State::Active);
    }

    #[tokio::test]
    async fn test_sleep_phrase_returns_to_idle() {
        let mut matrix = assistant(&["matrix", "goodbye", "mute"]);
        matrix.run().await;

        assert!(matrix.speech().spoken().iter().any(|s| s == SLEEPING));
        assert!(matrix.executor().seen.is_empty());
        assert_eq!(matrix.state(), State::Idle);
    }

    #[tokio::test]
    async fn test_timeout_returns_to_idle() {
        let mut speech = ScriptedSpeech::new(["matrix"]);
        speech.push(Heard::TimedOut);
        speech.push(Heard::Text(String::from("mute")));
        let mut matrix = Assistant::new(AssistantConfig::default(), speech, Echo::default());

        matrix.run().await;

        assert!(matrix.speech().spoken().iter().any(|s| s == IDLE_TIMEOUT));
        assert!(matrix.executor().seen.is_empty());
    }

    #[tokio::test]
    async fn test_exit_ends_session() {
        let mut matrix = assistant(&["matrix", "exit", "matrix", "mute"]);
        matrix.run().await;

        assert_eq!(matrix.speech().last_spoken(), Some(FAREWELL));
        assert!(matrix.executor().seen.is_empty());
    }

    #[tokio::test]
    async fn test_assistant_answers_its_own_questions() {
        let mut matrix = assistant(&[]);

        let outcome = matrix.handle("what time is it").await;
        assert_eq!(outcome.category(), Some(Category::Assistant));
        assert!(outcome.reply().unwrap().starts_with("It is "));

        let outcome = matrix.handle("help").await;
        assert!(outcome.reply().unwrap().contains("communication"));

        matrix.handle("open chrome").await;
        let outcome = matrix.handle("show history").await;
        assert_eq!(
            outcome.reply(),
            Some("Your recent commands: what time is it, help, open chrome.")
        );
        assert_eq!(matrix.executor().seen.len(), 1);
    }

    #[tokio::test]
    async fn test_history_without_context() {
        let config = AssistantConfig {
            enable_context: false,
            ..AssistantConfig::default()
        };
        let mut matrix = Assistant::new(config, ScriptedSpeech::default(), Echo::default());

        let outcome = matrix.handle("show history").await;
        assert_eq!(outcome.reply(), Some("Context tracking is disabled."));
        assert!(matrix.context().is_none());
    }

    #[tokio::test]
    async fn test_commands_are_persisted() {
        let db = Database::open_in_memory().unwrap();
        let mut matrix = assistant(&["matrix open chrome", "zzzz qqqq"])
            .with_history(db)
            .unwrap();
        assert!(matrix.session_id().is_some());

        matrix.run().await;

        let (db, _) = matrix.history.as_ref().unwrap();
        let entries = db.recent_commands(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].command, "open chrome");
        assert_eq!(entries[0].category, Some(Category::Apps));
        assert!(!entries[1].success);
    }
}
