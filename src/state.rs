//! Application state snapshots.
//!
//! [`ChatState`] bundles everything a client renders: registered documents
//! and their fragments, the conversation, and the current error banner.
//! Handlers never mutate a published snapshot; they derive a new one with
//! the `with_*` methods and publish that instead. Cloning is cheap because
//! the collections are reference counted.

use serde::Serialize;

use crate::conversation::ConversationLog;
use crate::models::{Document, Fragment, Message};
use crate::prompt::GREETING;
use crate::store::{FragmentStore, StoreError};

#[derive(Debug, Clone)]
pub struct ChatState {
    pub store: FragmentStore,
    pub log: ConversationLog,
    /// Error banner from the most recent operation, if it failed.
    pub error: Option<String>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            store: FragmentStore::new(),
            log: ConversationLog::with_greeting(GREETING),
            error: None,
        }
    }
}

impl ChatState {
    pub fn with_message(&self, message: Message) -> Self {
        let mut next = self.clone();
        next.log.append(message);
        next
    }

    pub fn with_error(&self, error: Option<String>) -> Self {
        let mut next = self.clone();
        next.error = error;
        next
    }

    /// Registers a document batch, or returns the unchanged reason it was refused.
    pub fn with_batch(&self, document: Document, fragments: Vec<Fragment>) -> Result<Self, StoreError> {
        let mut next = self.clone();
        next.store.add_batch(document, fragments)?;
        Ok(next)
    }

    pub fn view(&self) -> StateView<'_> {
        StateView {
            documents: self.store.documents(),
            fragment_count: self.store.len(),
            messages: self.log.all(),
            error: self.error.as_deref(),
        }
    }
}

/// Serializable projection of a snapshot for clients.
#[derive(Debug, Serialize)]
pub struct StateView<'a> {
    pub documents: &'a [Document],
    pub fragment_count: usize,
    pub messages: &'a [Message],
    pub error: Option<&'a str>,
}
