//! Assistant Chat
//!
//! Conversation with the backend assistant. The transcript is written to the
//! session store after every change so it survives restarts.

use std::fmt;
use thiserror::Error;

use crate::api::{AdminApi, ApiError, ChatRequest, ResetSessionRequest};
use crate::session::{ChatMessage, Sender, SessionContext, Transcript};

pub const NO_REPLY: &str = "❌ Sorry, I couldn't understand that.";
pub const TYPING: &str = "Bot is typing…";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Nothing was sent and the transcript is unchanged
    #[error("Admin ID not found! Please login.")]
    NoAdminId,

    #[error("Message is empty")]
    EmptyMessage,
}

/// Canned messages offered under the input box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Cancel,
    Reschedule,
}

impl QuickAction {
    pub const ALL: [QuickAction; 2] = [QuickAction::Cancel, QuickAction::Reschedule];

    pub fn label(&self) -> &'static str {
        match self {
            QuickAction::Cancel => "Cancel Appointment",
            QuickAction::Reschedule => "Reschedule Appointment",
        }
    }

    /// Text sent to the assistant
    pub fn message(&self) -> &'static str {
        match self {
            QuickAction::Cancel => "cancel",
            QuickAction::Reschedule => "reschedule",
        }
    }
}

/// What happened to the server-side assistant session on "new chat".
/// The local transcript is reset in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The backend acknowledged the reset
    Confirmed,
    /// No admin id was stored, so no request was made
    Skipped,
    /// The request failed; the backend may still hold the old context
    Failed(String),
}

pub struct ChatView {
    session: SessionContext,
    transcript: Transcript,
    input: String,
    typing: bool,
}

impl ChatView {
    /// Restore the stored transcript, or start with the greeting
    pub fn new(session: SessionContext) -> Self {
        let transcript = session.transcripts().load_or_default();
        Self {
            session,
            transcript,
            input: String::new(),
            typing: false,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// True while a reply is awaited
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn can_send(&self) -> bool {
        !self.input.trim().is_empty()
    }

    /// Send the trimmed input box contents; the box is cleared once sent
    pub async fn submit_input(&mut self, api: &dyn AdminApi) -> Result<ChatMessage, ChatError> {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let reply = self.send(api, &text).await?;
        self.input.clear();
        Ok(reply)
    }

    pub async fn quick_action(
        &mut self,
        api: &dyn AdminApi,
        action: QuickAction,
    ) -> Result<ChatMessage, ChatError> {
        self.send(api, action.message()).await
    }

    /// Append the admin's message, ask the assistant, append its reply.
    ///
    /// Transport and server failures become an assistant entry rather than
    /// an error, so the conversation always shows what happened.
    pub async fn send(&mut self, api: &dyn AdminApi, text: &str) -> Result<ChatMessage, ChatError> {
        let request = self.begin_send(text)?;
        Ok(self.finish_send(api, request).await)
    }

    /// First half of [`send`](Self::send): records the admin's message and
    /// enters the typing state, so the view can be rendered while the
    /// request is in flight.
    pub fn begin_send(&mut self, text: &str) -> Result<ChatRequest, ChatError> {
        let Some(admin_id) = self.session.sessions().admin_id() else {
            return Err(ChatError::NoAdminId);
        };

        self.push(ChatMessage::admin(text));
        self.typing = true;
        Ok(ChatRequest {
            message: text.to_string(),
            admin_id,
        })
    }

    pub async fn finish_send(&mut self, api: &dyn AdminApi, request: ChatRequest) -> ChatMessage {
        let reply_text = match api.send_chat(&request).await {
            Ok(Some(reply)) if !reply.is_empty() => reply,
            Ok(_) => NO_REPLY.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Assistant request failed");
                format!("❌ Server error: {}", describe(&e))
            }
        };

        let reply = ChatMessage::assistant(reply_text);
        self.push(reply.clone());
        self.typing = false;
        reply
    }

    /// Ask the backend to drop its context, then start over locally
    pub async fn new_chat(&mut self, api: &dyn AdminApi) -> ResetOutcome {
        let outcome = match self.session.sessions().admin_id() {
            Some(admin_id) => match api
                .reset_chat_session(&ResetSessionRequest { admin_id })
                .await
            {
                Ok(()) => ResetOutcome::Confirmed,
                Err(e) => {
                    tracing::warn!(error = %e, "Reset session error");
                    ResetOutcome::Failed(e.to_string())
                }
            },
            None => ResetOutcome::Skipped,
        };

        self.transcript = match self.session.transcripts().reset() {
            Ok(transcript) => transcript,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist reset transcript");
                Transcript::greeting()
            }
        };
        outcome
    }

    fn push(&mut self, message: ChatMessage) {
        self.transcript.push(message);
        if let Err(e) = self.session.transcripts().save(&self.transcript) {
            tracing::warn!(error = %e, "Failed to persist transcript");
        }
    }
}

fn describe(err: &ApiError) -> String {
    match err.server_message() {
        Some(message) => message.to_string(),
        None => err.to_string(),
    }
}

impl fmt::Display for ChatView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== 💬 Admin Chat Assistant ==  [New Chat]")?;
        for message in self.transcript.messages() {
            let who = match message.sender {
                Sender::Admin => "You",
                Sender::Assistant => "Bot",
            };
            let time = message
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%H:%M");
            writeln!(f, "[{}] {:>3}: {}", time, who, message.text)?;
        }
        if self.typing {
            writeln!(f, "{}", TYPING)?;
        }
        writeln!(f)?;
        let actions: Vec<&str> = QuickAction::ALL.iter().map(|a| a.label()).collect();
        write!(f, "Quick actions: {}", actions.join(" | "))
    }
}
