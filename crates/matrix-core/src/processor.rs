//! The command processor: match, extract, dispatch, keep score.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::command::{Argument, Category, Command, Invocation, Param, Registry};
use crate::error::{Error, Result};
use crate::matcher::{match_command, Match};
use crate::params::{extract_param, parse_rename, strip_command};
use crate::skill::SkillExecutor;
use crate::speech::Speech;

/// Entries kept in the processor's own history.
pub const HISTORY_LIMIT: usize = 100;

pub const UNKNOWN_REPLY: &str = "I didn't understand that command. Please try again.";

/// One processed utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedCommand {
    pub text: String,
    pub category: Option<Category>,
    pub success: bool,
}

/// Running counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub by_category: BTreeMap<Category, usize>,
}

/// Counters plus derived figures.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    #[serde(flatten)]
    pub stats: Stats,
    /// Percentage of processed utterances that succeeded.
    pub success_rate: f64,
    pub total_commands_registered: usize,
    pub categories: usize,
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processed:  {}", self.stats.total_processed)?;
        writeln!(f, "Successful: {}", self.stats.successful)?;
        writeln!(f, "Failed:     {}", self.stats.failed)?;
        writeln!(f, "Success:    {:.1}%", self.success_rate)?;
        write!(
            f,
            "Registered: {} commands in {} categories",
            self.total_commands_registered, self.categories
        )
    }
}

/// What happened to an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to process.
    Empty,
    Handled {
        reply: String,
        category: Category,
        description: &'static str,
    },
    Failed {
        reply: String,
        category: Category,
        error: String,
    },
    Unknown {
        reply: String,
    },
}

impl Outcome {
    pub fn reply(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Handled { reply, .. } | Self::Failed { reply, .. } | Self::Unknown { reply } => {
                Some(reply)
            }
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }

    pub const fn category(&self) -> Option<Category> {
        match self {
            Self::Handled { category, .. } | Self::Failed { category, .. } => Some(*category),
            Self::Empty | Self::Unknown { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct CommandProcessor {
    registry: Registry,
    history: Vec<ProcessedCommand>,
    last_command: Option<Command>,
    stats: Stats,
}

impl CommandProcessor {
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        tracing::info!(
            "Command Processor initialized with {} commands",
            registry.len()
        );
        Self {
            registry,
            history: Vec::new(),
            last_command: None,
            stats: Stats::default(),
        }
    }

    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Match `text` and build the invocation, without running anything.
    ///
    /// Returns `None` when nothing matches.
    pub fn resolve(&self, text: &str) -> Option<(&Command, Result<Invocation>)> {
        let text = text.trim().to_lowercase();
        let found = match_command(self.registry.commands(), &text)?;
        Some((found.command, build_invocation(&found, &text)))
    }

    /// Process one utterance end to end.
    pub async fn process<E>(&mut self, text: &str, executor: &mut E, speech: &mut dyn Speech) -> Outcome
    where
        E: SkillExecutor + ?Sized,
    {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return Outcome::Empty;
        }

        self.stats.total_processed += 1;

        let Some((command, invocation)) = self.resolve(&normalized) else {
            tracing::warn!("Unknown command: {}", text);
            self.stats.failed += 1;
            self.remember(text, None, false);
            return Outcome::Unknown {
                reply: String::from(UNKNOWN_REPLY),
            };
        };
        let command = command.clone();

        let result = match invocation {
            Ok(invocation) => {
                tracing::info!("Executing command: {}", command.description);
                executor.execute(&invocation, speech).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(reply) => {
                self.stats.successful += 1;
                *self.stats.by_category.entry(command.category).or_insert(0) += 1;
                self.remember(text, Some(command.category), true);
                let outcome = Outcome::Handled {
                    reply,
                    category: command.category,
                    description: command.description,
                };
                self.last_command = Some(command);
                outcome
            }
            Err(e) => {
                tracing::error!("Error executing command '{}': {}", command.description, e);
                self.stats.failed += 1;
                self.remember(text, Some(command.category), false);
                Outcome::Failed {
                    reply: e.reply(),
                    category: command.category,
                    error: e.to_string(),
                }
            }
        }
    }

    fn remember(&mut self, text: &str, category: Option<Category>, success: bool) {
        self.history.push(ProcessedCommand {
            text: text.to_string(),
            category,
            success,
        });
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }

    pub fn history(&self) -> &[ProcessedCommand] {
        &self.history
    }

    /// The last command that completed successfully.
    pub const fn last_command(&self) -> Option<&Command> {
        self.last_command.as_ref()
    }

    pub fn stats(&self) -> StatsReport {
        let success_rate = if self.stats.total_processed > 0 {
            self.stats.successful as f64 / self.stats.total_processed as f64 * 100.0
        } else {
            0.0
        };

        StatsReport {
            stats: self.stats.clone(),
            success_rate,
            total_commands_registered: self.registry.len(),
            categories: self.registry.categories().len(),
        }
    }
}

impl Default for CommandProcessor {
    fn default() -> Self {
        Self::new(Registry::default_commands())
    }
}

fn build_invocation(found: &Match<'_>, text: &str) -> Result<Invocation> {
    let command = found.command;
    let invocation = Invocation::new(command.action, command.category, text);

    let missing = |what: &'static str| Error::MissingParameter {
        command: found.pattern.to_string(),
        what,
    };

    let argument = match command.param {
        Param::None => return Ok(invocation),
        Param::Query => {
            let query = strip_command(text, found.pattern);
            if query.is_empty() {
                return Err(missing("search terms"));
            }
            Argument::Text(query)
        }
        Param::OptionalQuery => {
            let query = strip_command(text, found.pattern);
            if query.is_empty() {
                return Ok(invocation);
            }
            Argument::Text(query)
        }
        Param::Name => {
            let name = extract_param(text);
            if name.is_empty() {
                return Err(missing("name"));
            }
            Argument::Text(name)
        }
        Param::Rename => {
            let rest = strip_command(text, found.pattern);
            let (from, to) = parse_rename(&rest).ok_or_else(|| missing("old and new name"))?;
            Argument::Rename { from, to }
        }
    };

    Ok(invocation.with_argument(argument))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Action;
    use crate::speech::ScriptedSpeech;
    use async_trait::async_trait;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Invocation>,
        fail: bool,
    }

    #[async_trait]
    impl SkillExecutor for Recorder {
        async fn execute(&mut self, invocation: &Invocation, _speech: &mut dyn Speech) -> Result<String> {
            self.seen.push(invocation.clone());
            if self.fail {
                return Err(Error::Skill {
                    skill: "test",
                    message: String::from("Chrome not found on your system"),
                });
            }
            Ok(format!("ran {:?}", invocation.action))
        }
    }

    #[tokio::test]
    async fn test_process_dispatches_and_counts() {
        let mut processor = CommandProcessor::default();
        let mut recorder = Recorder::default();
        let mut speech = ScriptedSpeech::default();

        let outcome = processor
            .process("  Open Chrome ", &mut recorder, &mut speech)
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.category(), Some(Category::Apps));
        assert_eq!(recorder.seen[0].action, Action::OpenApp("chrome"));
        assert_eq!(recorder.seen[0].text, "open chrome");

        let stats = processor.stats();
        assert_eq!(stats.stats.total_processed, 1);
        assert_eq!(stats.stats.successful, 1);
        assert_eq!(stats.stats.by_category.get(&Category::Apps), Some(&1));
        assert!((stats.success_rate - 100.0).abs() < f64::EPSILON);
        assert_eq!(
            processor.last_command().map(|c| c.action),
            Some(Action::OpenApp("chrome"))
        );
    }

    #[tokio::test]
    async fn test_empty_input_is_ignored() {
        let mut processor = CommandProcessor::default();
        let mut recorder = Recorder::default();
        let mut speech = ScriptedSpeech::default();

        let outcome = processor.process("   ", &mut recorder, &mut speech).await;
        assert_eq!(outcome, Outcome::Empty);
        assert_eq!(processor.stats().stats.total_processed, 0);
        assert!(processor.history().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let mut processor = CommandProcessor::default();
        let mut recorder = Recorder::default();
        let mut speech = ScriptedSpeech::default();

        let outcome = processor.process("zzzz qqqq", &mut recorder, &mut speech).await;
        assert_eq!(outcome.reply(), Some(UNKNOWN_REPLY));
        assert!(recorder.seen.is_empty());

        let stats = processor.stats();
        assert_eq!(stats.stats.failed, 1);
        assert!(stats.success_rate.abs() < f64::EPSILON);
        assert!(!processor.history()[0].success);
    }

    #[tokio::test]
    async fn test_skill_error_is_reported() {
        let mut processor = CommandProcessor::default();
        let mut recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut speech = ScriptedSpeech::default();

        let outcome = processor.process("open chrome", &mut recorder, &mut speech).await;
        assert!(matches!(outcome, Outcome::Failed { .. }));
        assert_eq!(outcome.reply(), Some("Chrome not found on your system"));
        assert_eq!(processor.stats().stats.failed, 1);
        assert!(processor.last_command().is_none());
    }

    #[tokio::test]
    async fn test_parameters_are_extracted() {
        let mut processor = CommandProcessor::default();
        let mut recorder = Recorder::default();
        let mut speech = ScriptedSpeech::default();

        processor.process("search for rust lifetimes", &mut recorder, &mut speech).await;
        processor.process("create folder project notes", &mut recorder, &mut speech).await;
        processor.process("rename file a.txt to b.txt", &mut recorder, &mut speech).await;
        processor.process("open maps", &mut recorder, &mut speech).await;

        assert_eq!(recorder.seen[0].action, Action::WebSearch);
        assert_eq!(recorder.seen[0].text_argument(), Some("rust lifetimes"));
        assert_eq!(recorder.seen[1].text_argument(), Some("project notes"));
        assert_eq!(
            recorder.seen[2].argument,
            Some(Argument::Rename {
                from: String::from("a.txt"),
                to: String::from("b.txt"),
            })
        );
        assert_eq!(recorder.seen[3].action, Action::OpenMaps);
        assert!(recorder.seen[3].argument.is_none());
    }

    #[tokio::test]
    async fn test_query_follows_the_matched_phrase() {
        let mut processor = CommandProcessor::default();
        let mut recorder = Recorder::default();
        let mut speech = ScriptedSpeech::default();

        processor.process("search youtube for lofi", &mut recorder, &mut speech).await;
        processor.process("google search for rust", &mut recorder, &mut speech).await;
        processor.process("open maps of berlin", &mut recorder, &mut speech).await;

        assert_eq!(recorder.seen[0].action, Action::YoutubeSearch);
        assert_eq!(recorder.seen[0].text_argument(), Some("lofi"));
        assert_eq!(recorder.seen[1].action, Action::WebSearch);
        assert_eq!(recorder.seen[1].text_argument(), Some("rust"));
        assert_eq!(recorder.seen[2].text_argument(), Some("berlin"));
    }

    #[tokio::test]
    async fn test_missing_parameter_fails_without_dispatch() {
        let mut processor = CommandProcessor::default();
        let mut recorder = Recorder::default();
        let mut speech = ScriptedSpeech::default();

        let outcome = processor.process("create folder", &mut recorder, &mut speech).await;
        assert_eq!(outcome.reply(), Some("Please tell me the name."));
        assert!(recorder.seen.is_empty());

        let outcome = processor.process("rename file notes.txt", &mut recorder, &mut speech).await;
        assert_eq!(outcome.reply(), Some("Please tell me the old and new name."));
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let mut processor = CommandProcessor::default();
        let mut recorder = Recorder::default();
        let mut speech = ScriptedSpeech::default();

        for _ in 0..HISTORY_LIMIT + 5 {
            processor.process("mute", &mut recorder, &mut speech).await;
        }
        assert_eq!(processor.history().len(), HISTORY_LIMIT);
        assert_eq!(processor.stats().stats.total_processed, HISTORY_LIMIT + 5);
    }

    #[test]
    fn test_stats_report_display() {
        let processor = CommandProcessor::default();
        let text = processor.stats().to_string();
        assert!(text.contains("Success:    0.0%"));
        assert!(text.contains(&format!("{} commands", processor.registry().len())));
    }
}
