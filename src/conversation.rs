//! Append-only conversation log.

use std::sync::Arc;

use crate::models::Message;

/// Ordered user/model messages. Entries are never removed or rewritten.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    messages: Arc<Vec<Message>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that opens with the assistant's greeting.
    pub fn with_greeting(greeting: &str) -> Self {
        let mut log = Self::new();
        log.append(Message::model(greeting));
        log
    }

    pub fn append(&mut self, message: Message) {
        Arc::make_mut(&mut self.messages).push(message);
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_append_keeps_order() {
        let mut log = ConversationLog::with_greeting("hi");
        log.append(Message::user("question"));
        log.append(Message::model("answer"));

        let roles: Vec<Role> = log.all().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Model, Role::User, Role::Model]);
        assert_eq!(log.last().unwrap().content, "answer");
    }
}
