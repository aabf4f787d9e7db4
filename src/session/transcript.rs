//! Chat Transcript
//!
//! Ordered admin/assistant messages, persisted as a JSON array under
//! `adminChatHistory`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::SessionResult;
use super::storage::StoragePort;
use super::store::keys;

/// Greeting every fresh transcript starts with
pub const GREETING: &str =
    "Hello 👋! I'm your AI Admin Assistant. I can help you cancel or reschedule appointments.";

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "user")]
    Admin,
    #[serde(rename = "bot")]
    Assistant,
}

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn admin(text: impl Into<String>) -> Self {
        Self::at(Sender::Admin, text, Utc::now())
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::at(Sender::Assistant, text, Utc::now())
    }

    pub fn at(sender: Sender, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp,
        }
    }
}

/// Ordered chat history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::greeting()
    }
}

impl Transcript {
    /// A transcript holding only the default greeting
    pub fn greeting() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
        }
    }

    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// True when only the greeting is present
    pub fn is_fresh(&self) -> bool {
        matches!(
            self.messages.as_slice(),
            [only] if only.sender == Sender::Assistant && only.text == GREETING
        )
    }
}

/// Loads and saves the transcript
#[derive(Clone)]
pub struct TranscriptStore {
    storage: Arc<dyn StoragePort>,
}

impl TranscriptStore {
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    /// Stored transcript, `None` when absent, unreadable or malformed
    pub fn load(&self) -> Option<Transcript> {
        let raw = match self.storage.get_item(keys::CHAT_HISTORY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "Transcript read failed");
                return None;
            }
        };

        match serde_json::from_str::<Transcript>(&raw) {
            Ok(transcript) => Some(transcript),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed stored transcript");
                None
            }
        }
    }

    /// Stored transcript, or a fresh greeting
    pub fn load_or_default(&self) -> Transcript {
        self.load().unwrap_or_else(Transcript::greeting)
    }

    pub fn save(&self, transcript: &Transcript) -> SessionResult<()> {
        let json = serde_json::to_string(transcript)?;
        self.storage.set_item(keys::CHAT_HISTORY, &json)
    }

    /// Replace the stored transcript with the greeting and return it
    pub fn reset(&self) -> SessionResult<Transcript> {
        let transcript = Transcript::greeting();
        self.save(&transcript)?;
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStorage;
    use chrono::TimeZone;

    fn store() -> (TranscriptStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (TranscriptStore::new(storage.clone()), storage)
    }

    #[test]
    fn test_missing_transcript_defaults_to_greeting() {
        let (store, _) = store();
        assert!(store.load().is_none());

        let transcript = store.load_or_default();
        assert_eq!(transcript.len(), 1);
        assert!(transcript.is_fresh());
    }

    #[test]
    fn test_save_and_reload_is_identical() {
        let (store, _) = store();
        let mut transcript = Transcript::greeting();
        transcript.push(ChatMessage::admin("cancel"));
        transcript.push(ChatMessage::at(
            Sender::Assistant,
            "Which appointment?",
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 15).unwrap(),
        ));

        store.save(&transcript).unwrap();
        let reloaded = store.load().unwrap();

        assert_eq!(reloaded, transcript);
        assert!(!reloaded.is_fresh());
    }

    #[test]
    fn test_reads_browser_format() {
        let (store, storage) = store();
        storage
            .set_item(
                keys::CHAT_HISTORY,
                r#"[{"sender":"bot","text":"Hello","timestamp":"2025-03-01T09:00:00.000Z"},
                    {"sender":"user","text":"reschedule","timestamp":"2025-03-01T09:01:00.000Z"}]"#,
            )
            .unwrap();

        let transcript = store.load().unwrap();
        assert_eq!(transcript.messages()[0].sender, Sender::Assistant);
        assert_eq!(transcript.messages()[1].sender, Sender::Admin);
        assert_eq!(transcript.last().unwrap().text, "reschedule");
    }

    #[test]
    fn test_malformed_transcript_falls_back() {
        let (store, storage) = store();
        storage.set_item(keys::CHAT_HISTORY, "[{\"sender\":").unwrap();
        assert!(store.load().is_none());
        assert!(store.load_or_default().is_fresh());
    }

    #[test]
    fn test_reset_persists_greeting() {
        let (store, _) = store();
        let mut transcript = Transcript::greeting();
        transcript.push(ChatMessage::admin("hello"));
        store.save(&transcript).unwrap();

        let reset = store.reset().unwrap();
        assert!(reset.is_fresh());
        assert!(store.load().unwrap().is_fresh());
    }
}
