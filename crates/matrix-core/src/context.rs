//! Conversation context: recent exchanges and user preferences.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

pub const DEFAULT_MAX_HISTORY: usize = 50;

/// One exchange with the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub timestamp: DateTime<Local>,
    pub command: String,
    pub response: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ContextManager {
    max_history: usize,
    history: VecDeque<ContextEntry>,
    session_start: DateTime<Local>,
    last_query: Option<String>,
    last_response: Option<String>,
    preferences: HashMap<String, serde_json::Value>,
}

impl ContextManager {
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        tracing::info!("Context Manager initialized");
        Self {
            max_history,
            history: VecDeque::with_capacity(max_history),
            session_start: Local::now(),
            last_query: None,
            last_response: None,
            preferences: HashMap::new(),
        }
    }

    pub fn add_command(&mut self, command: impl Into<String>, response: Option<String>) {
        let command = command.into();
        tracing::debug!("Added to context: {}", command);

        self.last_query = Some(command.clone());
        self.last_response.clone_from(&response);

        if self.max_history == 0 {
            return;
        }
        while self.history.len() >= self.max_history {
            self.history.pop_front();
        }

        self.history.push_back(ContextEntry {
            timestamp: Local::now(),
            command,
            response,
        });
    }

    /// The last `count` entries, oldest first.
    pub fn recent(&self, count: usize) -> Vec<&ContextEntry> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).collect()
    }

    pub fn last(&self) -> Option<&ContextEntry> {
        self.history.back()
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        tracing::info!("Context history cleared");
    }

    pub fn set_preference(&mut self, key: impl Into<String>, value: serde_json::Value) {
        let key = key.into();
        tracing::debug!("Preference set: {} = {}", key, value);
        self.preferences.insert(key, value);
    }

    pub fn preference(&self, key: &str) -> Option<&serde_json::Value> {
        self.preferences.get(key)
    }

    pub fn preference_or(&self, key: &str, default: serde_json::Value) -> serde_json::Value {
        self.preferences.get(key).cloned().unwrap_or(default)
    }

    pub fn session_start(&self) -> DateTime<Local> {
        self.session_start
    }

    pub fn session_duration(&self) -> Duration {
        (Local::now() - self.session_start)
            .to_std()
            .unwrap_or_default()
    }
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_and_recent() {
        let mut ctx = ContextManager::default();
        ctx.add_command("open chrome", Some(String::from("Opening Chrome")));
        ctx.add_command("mute", None);

        let recent = ctx.recent(5);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].command, "open chrome");
        assert_eq!(recent[1].command, "mute");
        assert_eq!(ctx.last().unwrap().command, "mute");
        assert_eq!(ctx.last_query(), Some("mute"));
        assert_eq!(ctx.last_response(), None);
    }

    #[test]
    fn test_history_drops_oldest_first() {
        let mut ctx = ContextManager::new(3);
        for i in 0..5 {
            ctx.add_command(format!("command {i}"), None);
        }

        assert_eq!(ctx.len(), 3);
        let commands: Vec<_> = ctx.recent(10).iter().map(|e| e.command.clone()).collect();
        assert_eq!(commands, ["command 2", "command 3", "command 4"]);
        assert_eq!(ctx.recent(1)[0].command, "command 4");
    }

    #[test]
    fn test_zero_capacity_still_tracks_last_exchange() {
        let mut ctx = ContextManager::new(0);
        ctx.add_command("battery status", Some(String::from("Battery is at 80%")));

        assert!(ctx.is_empty());
        assert_eq!(ctx.last_query(), Some("battery status"));
        assert_eq!(ctx.last_response(), Some("Battery is at 80%"));
    }

    #[test]
    fn test_clear() {
        let mut ctx = ContextManager::default();
        ctx.add_command("help", None);
        ctx.clear();
        assert!(ctx.is_empty());
        assert!(ctx.last().is_none());
    }

    #[test]
    fn test_preferences() {
        let mut ctx = ContextManager::default();
        ctx.set_preference("volume_step", json!(5));

        assert_eq!(ctx.preference("volume_step"), Some(&json!(5)));
        assert_eq!(ctx.preference("missing"), None);
        assert_eq!(ctx.preference_or("browser", json!("firefox")), json!("firefox"));
    }

    #[test]
    fn test_session_duration_is_non_negative() {
        let ctx = ContextManager::default();
        assert!(ctx.session_duration() < Duration::from_secs(60));
    }
}
