//! Client-Side Session
//!
//! Everything the dashboard keeps between runs: the admin's identity, auth
//! token and id, plus the assistant transcript.
//!
//! ## Architecture
//!
//! - **StoragePort**: injectable key/value persistence (memory or file)
//! - **SessionStore**: identity/token/id save, read, clear
//! - **TranscriptStore**: chat history load, save, reset
//! - **SessionContext**: the handle each view is constructed with
//!
//! There is no in-memory cache: every read goes to storage, so a logout in
//! one process is seen by the next read in another.

mod error;
mod storage;
mod store;
mod transcript;

pub use error::{SessionError, SessionResult};
pub use storage::{FileStorage, MemoryStorage, StoragePort};
pub use store::{keys, Session, SessionStore};
pub use transcript::{ChatMessage, Sender, Transcript, TranscriptStore, GREETING};

use std::sync::Arc;

/// Session handle passed to every view at construction
#[derive(Clone)]
pub struct SessionContext {
    sessions: SessionStore,
    transcripts: TranscriptStore,
}

impl SessionContext {
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        Self {
            sessions: SessionStore::new(Arc::clone(&storage)),
            transcripts: TranscriptStore::new(storage),
        }
    }

    /// Context over fresh process-local storage
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn transcripts(&self) -> &TranscriptStore {
        &self.transcripts
    }

    pub fn is_authenticated(&self) -> bool {
        self.sessions.is_authenticated()
    }
}
