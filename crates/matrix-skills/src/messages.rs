//! Contact book and WhatsApp messaging.
//!
//! Messages are handed to WhatsApp through a `wa.me` link opened in the
//! default browser; the user presses send there. Group chats open through
//! their `chat.whatsapp.com` invite link, and scheduled messages wait on
//! the tokio timer until the requested local time.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeDelta};
use matrix_core::params::{clean_phone, is_confirmation};
use matrix_core::{Heard, Speech};
use serde::{Deserialize, Serialize};

use crate::error::{SkillError, SkillResult};
use crate::launcher::Launcher;

const HISTORY_LIMIT: usize = 100;
const WHATSAPP: &str = "whatsapp";
const GROUP_INVITE_PREFIX: &str = "https://chat.whatsapp.com/";

const CONTACT_TIMEOUT: Duration = Duration::from_secs(10);
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(15);
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub added_date: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentMessage {
    pub platform: &'static str,
    pub recipient: String,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageStats {
    pub total_sent: u64,
    pub whatsapp_sent: u64,
    pub failed: u64,
    pub by_contact: BTreeMap<String, u64>,
    pub total_contacts: usize,
    pub history_size: usize,
}

/// The `wa.me` link that opens a chat with `phone`, pre-filled with `message`.
pub fn whatsapp_url(phone: &str, message: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!(
        "https://wa.me/{digits}?text={}",
        urlencoding::encode(message)
    )
}

/// The invite link for a WhatsApp group, given the link itself or its code.
pub fn group_url(group_id: &str) -> Option<String> {
    let group_id = group_id.trim();
    let code = group_id.strip_prefix(GROUP_INVITE_PREFIX).unwrap_or(group_id);
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!("{GROUP_INVITE_PREFIX}{code}"))
}

/// Time from `now` until the next `hour:minute` (local, naive). A time
/// that has already passed today means tomorrow.
pub fn schedule_delay(now: NaiveDateTime, hour: u32, minute: u32) -> SkillResult<Duration> {
    let at = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        SkillError::InvalidInput(String::from(
            "Schedule times need an hour from 0 to 23 and a minute from 0 to 59.",
        ))
    })?;

    let mut target = now.date().and_time(at);
    if target <= now {
        target += TimeDelta::days(1);
    }
    (target - now)
        .to_std()
        .map_err(|e| SkillError::InvalidInput(format!("Cannot schedule that message: {e}")))
}

#[derive(Debug)]
pub struct MessageSender {
    contacts_file: PathBuf,
    contacts: BTreeMap<String, Contact>,
    history: VecDeque<SentMessage>,
    stats: MessageStats,
}

impl MessageSender {
    /// Load the contact book; a missing or unreadable file starts empty.
    pub fn load(contacts_file: impl Into<PathBuf>) -> Self {
        let contacts_file = contacts_file.into();
        let contacts = match read_contacts(&contacts_file) {
            Ok(contacts) => {
                tracing::info!("Loaded {} contacts", contacts.len());
                contacts
            }
            Err(e) => {
                tracing::warn!("Starting with no contacts ({}): {}", contacts_file.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            contacts_file,
            contacts,
            history: VecDeque::new(),
            stats: MessageStats::default(),
        }
    }

    fn save(&self) -> SkillResult<()> {
        if let Some(parent) = self.contacts_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.contacts)?;
        std::fs::write(&self.contacts_file, json)?;
        tracing::debug!("Saved contacts to {}", self.contacts_file.display());
        Ok(())
    }

    /// Add or replace a contact and persist the book.
    pub fn add_contact(&mut self, name: &str, phone: &str, email: Option<&str>) -> SkillResult<&Contact> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SkillError::InvalidInput(String::from("A contact needs a name.")));
        }
        let phone = clean_phone(phone).ok_or_else(|| {
            SkillError::InvalidInput(String::from(
                "Phone numbers need a country code with a plus sign, e.g. +919876543210.",
            ))
        })?;

        let key = name.to_lowercase();
        let previous = self.contacts.insert(
            key.clone(),
            Contact {
                name: name.to_string(),
                phone,
                email: email.map(str::to_string),
                added_date: Local::now(),
            },
        );
        if let Err(e) = self.save() {
            // Keep memory in step with the file.
            match previous {
                Some(contact) => self.contacts.insert(key, contact),
                None => self.contacts.remove(&key),
            };
            return Err(e);
        }
        tracing::info!("Added contact: {}", name);
        Ok(&self.contacts[&key])
    }

    /// Exact match on the lowercase name first, then a substring match
    /// in either direction.
    pub fn get_contact(&self, name: &str) -> Option<&Contact> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        if let Some(contact) = self.contacts.get(&wanted) {
            return Some(contact);
        }
        self.contacts
            .iter()
            .find(|(key, _)| key.contains(&wanted) || wanted.contains(key.as_str()))
            .map(|(key, contact)| {
                tracing::debug!("Matched '{}' to contact '{}'", wanted, key);
                contact
            })
    }

    /// Display names, sorted.
    pub fn list_contacts(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.contacts.values().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn describe_contacts(&self) -> String {
        let names = self.list_contacts();
        if names.is_empty() {
            return String::from("You have no saved contacts.");
        }
        let shown: Vec<&str> = names.iter().take(5).copied().collect();
        let noun = if names.len() == 1 { "contact" } else { "contacts" };
        format!("You have {} {noun}: {}.", names.len(), shown.join(", "))
    }

    pub fn send_whatsapp_instant(
        &mut self,
        launcher: &mut dyn Launcher,
        phone: &str,
        message: &str,
    ) -> SkillResult<()> {
        tracing::info!("Sending WhatsApp message to {}", phone);
        if let Err(source) = launcher.open(&whatsapp_url(phone, message)) {
            self.stats.failed += 1;
            return Err(SkillError::Launch {
                program: String::from("WhatsApp"),
                source,
            });
        }

        self.record_sent(phone, message);
        Ok(())
    }

    /// Open a group chat from its invite link or code.
    ///
    /// The invite link cannot carry text, so the message is only kept in
    /// the history for the user to paste.
    pub fn send_group_message(
        &mut self,
        launcher: &mut dyn Launcher,
        group_id: &str,
        message: &str,
    ) -> SkillResult<String> {
        let url = group_url(group_id).ok_or_else(|| {
            SkillError::InvalidInput(String::from(
                "That is not a WhatsApp group invite link or code.",
            ))
        })?;

        tracing::info!("Sending message to group: {}", url);
        if let Err(source) = launcher.open(&url) {
            self.stats.failed += 1;
            return Err(SkillError::Launch {
                program: String::from("WhatsApp"),
                source,
            });
        }

        self.record_sent(&url, message);
        Ok(String::from("Group chat opened. Paste your message there."))
    }

    /// Wait until the next `hour:minute` local time, then send.
    pub async fn send_whatsapp_scheduled(
        &mut self,
        launcher: &mut dyn Launcher,
        phone: &str,
        message: &str,
        hour: u32,
        minute: u32,
    ) -> SkillResult<()> {
        let delay = schedule_delay(Local::now().naive_local(), hour, minute)?;
        tracing::info!(
            "Scheduling WhatsApp message to {} at {:02}:{:02} (in {}s)",
            phone,
            hour,
            minute,
            delay.as_secs()
        );

        tokio::time::sleep_until(tokio::time::Instant::now() + delay).await;
        self.send_whatsapp_instant(launcher, phone, message)
    }

    fn record_sent(&mut self, recipient: &str, message: &str) {
        self.stats.total_sent += 1;
        self.stats.whatsapp_sent += 1;
        self.history.push_back(SentMessage {
            platform: WHATSAPP,
            recipient: recipient.to_string(),
            message: message.to_string(),
            timestamp: Local::now(),
        });
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }

    fn count_for(&mut self, contact_name: &str) {
        *self
            .stats
            .by_contact
            .entry(contact_name.to_lowercase())
            .or_insert(0) += 1;
    }

    fn require_contact(&self, name: &str) -> SkillResult<Contact> {
        self.get_contact(name).cloned().ok_or_else(|| SkillError::NotFound {
            what: "contact",
            name: name.to_string(),
        })
    }

    pub fn send_to_contact(
        &mut self,
        launcher: &mut dyn Launcher,
        name: &str,
        message: &str,
    ) -> SkillResult<String> {
        let contact = self.require_contact(name)?;
        self.send_whatsapp_instant(launcher, &contact.phone, message)?;
        self.count_for(&contact.name);
        Ok(format!("Message sent to {}", contact.name))
    }

    /// [`send_whatsapp_scheduled`](Self::send_whatsapp_scheduled) for a saved contact.
    pub async fn schedule_to_contact(
        &mut self,
        launcher: &mut dyn Launcher,
        name: &str,
        message: &str,
        hour: u32,
        minute: u32,
    ) -> SkillResult<String> {
        let contact = self.require_contact(name)?;
        self.send_whatsapp_scheduled(launcher, &contact.phone, message, hour, minute)
            .await?;
        self.count_for(&contact.name);
        Ok(format!(
            "Message sent to {} at {hour:02}:{minute:02}",
            contact.name
        ))
    }

    /// Ask who, what, and for confirmation, then send.
    pub async fn send_interactive(
        &mut self,
        launcher: &mut dyn Launcher,
        speech: &mut dyn Speech,
    ) -> SkillResult<String> {
        speech.speak("Who should I send the message to?").await;
        let Heard::Text(name) = speech.listen(Some(CONTACT_TIMEOUT)).await else {
            return Ok(String::from("No contact provided. Message cancelled."));
        };
        tracing::debug!("Contact name heard: {}", name);

        let (recipient, phone) = if let Some(contact) = self.get_contact(&name) {
            (contact.name.clone(), contact.phone.clone())
        } else {
            speech
                .speak(&format!(
                    "I don't have {name} in contacts. Please provide phone number."
                ))
                .await;
            let Heard::Text(spoken) = speech.listen(Some(CONTACT_TIMEOUT)).await else {
                return Ok(String::from("No phone number provided. Message cancelled."));
            };
            let phone = clean_phone(&spoken).ok_or_else(|| {
                SkillError::InvalidInput(String::from(
                    "Please include the country code with a plus sign.",
                ))
            })?;
            (name, phone)
        };

        speech.speak("What's the message?").await;
        let Heard::Text(message) = speech.listen(Some(MESSAGE_TIMEOUT)).await else {
            return Ok(String::from("No message provided. Message cancelled."));
        };

        speech
            .speak(&format!("Sending message to {recipient}: {message}. Confirm?"))
            .await;
        match speech.listen(Some(CONFIRM_TIMEOUT)).await {
            Heard::Text(answer) if is_confirmation(&answer) => {}
            _ => {
                tracing::info!("Message to {} cancelled by user", recipient);
                return Ok(String::from("Message cancelled."));
            }
        }

        speech.speak("Sending message. Please wait.").await;
        self.send_whatsapp_instant(launcher, &phone, &message)?;
        self.count_for(&recipient);
        Ok(format!("Message sent to {recipient}"))
    }

    /// Most recent messages, oldest first.
    pub fn recent_messages(&self, count: usize) -> Vec<&SentMessage> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).collect()
    }

    pub fn stats(&self) -> MessageStats {
        MessageStats {
            total_contacts: self.contacts.len(),
            history_size: self.history.len(),
            ..self.stats.clone()
        }
    }

    pub fn contacts_file(&self) -> &Path {
        &self.contacts_file
    }
}

fn read_contacts(path: &Path) -> SkillResult<BTreeMap<String, Contact>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::RecordingLauncher;
    use matrix_core::ScriptedSpeech;
    use tempfile::TempDir;

    fn sender(dir: &TempDir) -> MessageSender {
        let mut sender = MessageSender::load(dir.path().join("contacts.json"));
        sender.add_contact("Alice Smith", "+1 555-010-0100", None).unwrap();
        sender
            .add_contact("Bob", "+919876543210", Some("bob@example.com"))
            .unwrap();
        sender
    }

    #[test]
    fn test_whatsapp_url() {
        assert_eq!(
            whatsapp_url("+919876543210", "hi there & bye"),
            "https://wa.me/919876543210?text=hi%20there%20%26%20bye"
        );
    }

    #[test]
    fn test_contacts_persist() {
        let dir = TempDir::new().unwrap();
        sender(&dir);

        let reloaded = MessageSender::load(dir.path().join("contacts.json"));
        assert_eq!(reloaded.list_contacts(), ["Alice Smith", "Bob"]);
        assert_eq!(reloaded.get_contact("alice smith").unwrap().phone, "+15550100100");
        assert_eq!(
            reloaded.get_contact("bob").unwrap().email.as_deref(),
            Some("bob@example.com")
        );
    }

    #[test]
    fn test_get_contact_substring_match() {
        let dir = TempDir::new().unwrap();
        let sender = sender(&dir);
        assert_eq!(sender.get_contact("alice").unwrap().name, "Alice Smith");
        assert_eq!(sender.get_contact("bob the builder").unwrap().name, "Bob");
        assert!(sender.get_contact("carol").is_none());
        assert!(sender.get_contact("").is_none());
    }

    #[test]
    fn test_add_contact_rejects_bad_phone() {
        let dir = TempDir::new().unwrap();
        let mut sender = MessageSender::load(dir.path().join("contacts.json"));
        assert!(sender.add_contact("Carol", "5550100", None).is_err());
        assert!(sender.list_contacts().is_empty());
        assert_eq!(sender.describe_contacts(), "You have no saved contacts.");
    }

    #[test]
    fn test_add_contact_rolls_back_when_save_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut sender = MessageSender::load(blocker.join("contacts.json"));
        assert!(sender.add_contact("Carol", "+15550100199", None).is_err());
        assert!(sender.get_contact("carol").is_none());
        assert!(sender.list_contacts().is_empty());
    }

    #[test]
    fn test_group_url() {
        assert_eq!(
            group_url("AbC123xyz").as_deref(),
            Some("https://chat.whatsapp.com/AbC123xyz")
        );
        assert_eq!(
            group_url(" https://chat.whatsapp.com/AbC123xyz ").as_deref(),
            Some("https://chat.whatsapp.com/AbC123xyz")
        );
        assert_eq!(group_url(""), None);
        assert_eq!(group_url("https://evil.example/x"), None);
    }

    #[test]
    fn test_send_group_message() {
        let dir = TempDir::new().unwrap();
        let mut sender = sender(&dir);
        let mut launcher = RecordingLauncher::new();

        let reply = sender
            .send_group_message(&mut launcher, "AbC123xyz", "standup moved")
            .unwrap();
        assert_eq!(reply, "Group chat opened. Paste your message there.");
        assert!(launcher
            .last()
            .unwrap()
            .args
            .iter()
            .any(|a| a == "https://chat.whatsapp.com/AbC123xyz"));

        let stats = sender.stats();
        assert_eq!(stats.total_sent, 1);
        assert_eq!(stats.whatsapp_sent, 1);
        assert_eq!(sender.recent_messages(1)[0].message, "standup moved");

        assert!(sender.send_group_message(&mut launcher, "not a group!", "hi").is_err());
        assert_eq!(launcher.calls().len(), 1);
    }

    #[test]
    fn test_schedule_delay() {
        let now = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();

        assert_eq!(schedule_delay(now, 10, 0).unwrap(), Duration::from_secs(30 * 60));
        // Already past today, so tomorrow.
        assert_eq!(
            schedule_delay(now, 9, 0).unwrap(),
            Duration::from_secs(23 * 3600 + 30 * 60)
        );
        assert_eq!(schedule_delay(now, 9, 30).unwrap(), Duration::from_secs(24 * 3600));

        assert!(schedule_delay(now, 24, 0).is_err());
        assert!(schedule_delay(now, 12, 60).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_send_waits_then_sends() {
        let dir = TempDir::new().unwrap();
        let mut sender = sender(&dir);
        let mut launcher = RecordingLauncher::new();

        let reply = sender
            .schedule_to_contact(&mut launcher, "bob", "good morning", 7, 5)
            .await
            .unwrap();
        assert_eq!(reply, "Message sent to Bob at 07:05");
        assert_eq!(launcher.calls().len(), 1);
        assert_eq!(sender.stats().by_contact.get("bob"), Some(&1));

        let err = sender
            .send_whatsapp_scheduled(&mut launcher, "+919876543210", "late", 25, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, SkillError::InvalidInput(_)));
        assert_eq!(launcher.calls().len(), 1);
    }

    #[test]
    fn test_send_to_contact_updates_stats() {
        let dir = TempDir::new().unwrap();
        let mut sender = sender(&dir);
        let mut launcher = RecordingLauncher::new();

        let reply = sender.send_to_contact(&mut launcher, "bob", "hello").unwrap();
        assert_eq!(reply, "Message sent to Bob");
        assert!(launcher
            .last()
            .unwrap()
            .args
            .iter()
            .any(|a| a == "https://wa.me/919876543210?text=hello"));

        let stats = sender.stats();
        assert_eq!(stats.total_sent, 1);
        assert_eq!(stats.by_contact.get("bob"), Some(&1));
        assert_eq!(stats.total_contacts, 2);
        assert_eq!(sender.recent_messages(5).len(), 1);

        assert!(sender.send_to_contact(&mut launcher, "zed", "hi").is_err());
    }

    #[test]
    fn test_failed_send_is_counted() {
        let dir = TempDir::new().unwrap();
        let mut sender = sender(&dir);
        let mut launcher = RecordingLauncher::failing();
        assert!(sender.send_to_contact(&mut launcher, "bob", "hello").is_err());
        assert_eq!(sender.stats().failed, 1);
        assert_eq!(sender.stats().total_sent, 0);
    }

    #[tokio::test]
    async fn test_interactive_send_to_known_contact() {
        let dir = TempDir::new().unwrap();
        let mut sender = sender(&dir);
        let mut launcher = RecordingLauncher::new();
        let mut speech = ScriptedSpeech::new(["alice", "running late", "yes please"]);

        let reply = sender.send_interactive(&mut launcher, &mut speech).await.unwrap();
        assert_eq!(reply, "Message sent to Alice Smith");
        assert_eq!(
            speech.spoken()[2],
            "Sending message to Alice Smith: running late. Confirm?"
        );
        assert_eq!(launcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_interactive_unknown_contact_asks_for_phone() {
        let dir = TempDir::new().unwrap();
        let mut sender = sender(&dir);
        let mut launcher = RecordingLauncher::new();
        let mut speech = ScriptedSpeech::new(["dave", "+44 7700 900123", "hi dave", "ok"]);

        let reply = sender.send_interactive(&mut launcher, &mut speech).await.unwrap();
        assert_eq!(reply, "Message sent to dave");
        assert_eq!(
            speech.spoken()[1],
            "I don't have dave in contacts. Please provide phone number."
        );
        assert!(launcher.last().unwrap().args.iter().any(|a| a.contains("wa.me/447700900123")));
    }

    #[tokio::test]
    async fn test_interactive_cancellations() {
        let dir = TempDir::new().unwrap();
        let mut sender = sender(&dir);
        let mut launcher = RecordingLauncher::new();

        let mut speech = ScriptedSpeech::new(["bob", "hello", "no"]);
        let reply = sender.send_interactive(&mut launcher, &mut speech).await.unwrap();
        assert_eq!(reply, "Message cancelled.");

        let mut speech = ScriptedSpeech::new(Vec::<&str>::new());
        let reply = sender.send_interactive(&mut launcher, &mut speech).await.unwrap();
        assert_eq!(reply, "No contact provided. Message cancelled.");

        let mut speech = ScriptedSpeech::new(["erin", "12345"]);
        let err = sender.send_interactive(&mut launcher, &mut speech).await.unwrap_err();
        assert_eq!(err.reply(), "Please include the country code with a plus sign.");

        assert!(launcher.calls().is_empty());
    }
}
