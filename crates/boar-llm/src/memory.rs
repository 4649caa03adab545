use std::collections::VecDeque;

use dashmap::DashMap;

use crate::provider::{Message, Role};

/// Process-memory conversation window, keyed by external caller id (chat
/// user id, API caller id). No own data store — this never touches disk,
/// so a restart clears every session, matching the "process memory" owner
/// for `ConversationMemory`.
pub struct ConversationMemory {
    windows: DashMap<String, VecDeque<Message>>,
    capacity_pairs: usize,
}

impl ConversationMemory {
    pub fn new(capacity_pairs: usize) -> Self {
        Self {
            windows: DashMap::new(),
            capacity_pairs,
        }
    }

    pub fn append(&self, external_id: &str, role: Role, content: impl Into<String>) {
        let mut window = self.windows.entry(external_id.to_string()).or_default();
        window.push_back(Message {
            role,
            content: content.into(),
        });
        let max_messages = self.capacity_pairs * 2;
        while window.len() > max_messages {
            window.pop_front();
        }
    }

    pub fn messages(&self, external_id: &str) -> Vec<Message> {
        self.windows
            .get(external_id)
            .map(|w| w.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Clears a session on explicit unlink/logout.
    pub fn clear(&self, external_id: &str) {
        self.windows.remove(external_id);
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_pair_beyond_capacity() {
        let memory = ConversationMemory::new(2);
        for i in 0..5 {
            memory.append("user-1", Role::User, format!("msg {i}"));
        }
        let messages = memory.messages("user-1");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, "msg 1");
    }

    #[test]
    fn clear_removes_the_whole_session() {
        let memory = ConversationMemory::new(10);
        memory.append("user-1", Role::User, "hi");
        memory.clear("user-1");
        assert!(memory.messages("user-1").is_empty());
    }
}
