//! Talking to the user.
//!
//! The assistant only sees the [`Speech`] trait. [`ConsoleSpeech`] reads
//! lines from stdin and prints replies, optionally handing them to an
//! external text-to-speech program. [`ScriptedSpeech`] replays a fixed
//! conversation and is used by tests and the one-shot `exec` command.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// The outcome of one listening attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heard {
    /// Something was said; already trimmed and lowercased.
    Text(String),
    /// An empty utterance.
    Silence,
    /// Nothing arrived before the timeout.
    TimedOut,
    /// The input is gone for good.
    Closed,
}

#[async_trait]
pub trait Speech: Send {
    async fn speak(&mut self, text: &str);

    /// Wait for the next utterance, at most `timeout` if given.
    async fn listen(&mut self, timeout: Option<Duration>) -> Heard;
}

fn normalize(line: &str) -> Heard {
    let text = line.trim().to_lowercase();
    if text.is_empty() {
        Heard::Silence
    } else {
        Heard::Text(text)
    }
}

/// Line-based console conversation.
#[derive(Debug)]
pub struct ConsoleSpeech {
    lines: Lines<BufReader<Stdin>>,
    tts_command: Option<String>,
    prompt: bool,
}

impl ConsoleSpeech {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            tts_command: None,
            prompt: true,
        }
    }

    /// Also pass every reply to `command` as its single argument.
    #[must_use]
    pub fn with_tts(mut self, command: Option<String>) -> Self {
        self.tts_command = command.filter(|c| !c.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }
}

async fn say_aloud(command: &str, text: &str) {
    let status = tokio::process::Command::new(command)
        .arg(text)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => {}
        Ok(status) => tracing::warn!("TTS command {} exited with {}", command, status),
        Err(e) => tracing::warn!("TTS command {} failed: {}", command, e),
    }
}

impl Default for ConsoleSpeech {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Speech for ConsoleSpeech {
    async fn speak(&mut self, text: &str) {
        println!("[MATRIX]: {text}");
        if let Some(command) = self.tts_command.clone() {
            say_aloud(&command, text).await;
        }
    }

    async fn listen(&mut self, timeout: Option<Duration>) -> Heard {
        if self.prompt {
            print!("> ");
            // A failed flush only loses the prompt.
            if let Err(e) = std::io::Write::flush(&mut std::io::stdout()) {
                tracing::debug!("Could not flush prompt: {}", e);
            }
        }

        let next = match timeout {
            Some(limit) => match tokio::time::timeout(limit, self.lines.next_line()).await {
                Ok(next) => next,
                Err(_) => {
                    println!();
                    return Heard::TimedOut;
                }
            },
            None => self.lines.next_line().await,
        };

        match next {
            Ok(Some(line)) => normalize(&line),
            Ok(None) => Heard::Closed,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                Heard::Closed
            }
        }
    }
}

/// A pre-recorded conversation. Every spoken line is kept.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSpeech {
    inputs: VecDeque<Heard>,
    spoken: Vec<String>,
}

impl ScriptedSpeech {
    #[must_use]
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            inputs: inputs.into_iter().map(|s| normalize(s.as_ref())).collect(),
            spoken: Vec::new(),
        }
    }

    /// Queue an arbitrary listening outcome.
    pub fn push(&mut self, heard: Heard) {
        self.inputs.push_back(heard);
    }

    pub fn spoken(&self) -> &[String] {
        &self.spoken
    }

    pub fn last_spoken(&self) -> Option<&str> {
        self.spoken.last().map(String::as_str)
    }
}

#[async_trait]
impl Speech for ScriptedSpeech {
    async fn speak(&mut self, text: &str) {
        tracing::debug!("[MATRIX]: {}", text);
        self.spoken.push(text.to_string());
    }

    async fn listen(&mut self, _timeout: Option<Duration>) -> Heard {
        self.inputs.pop_front().unwrap_or(Heard::Closed)
    }
}
