//! In-memory message list with change notifications.

use streamchat_types::chat::ChatMessage;
use streamchat_types::event::SessionEvent;

use crate::event::EventBus;

/// Ordered list of the conversation's messages.
///
/// Every mutation publishes a [`SessionEvent`] on the bus so renderers can
/// follow along without the store knowing about them.
#[derive(Debug)]
pub struct MessageStore {
    messages: Vec<ChatMessage>,
    events: EventBus,
}

impl MessageStore {
    pub fn new(events: EventBus) -> Self {
        Self {
            messages: Vec::new(),
            events,
        }
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

    pub fn get(&self, id: &str) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.id == id)
    }

    /// Replace the whole list (restore, clear).
    pub fn replace_all(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
        self.events.publish(SessionEvent::MessagesReplaced {
            messages: self.messages.clone(),
        });
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.events.publish(SessionEvent::MessageAppended {
            message: message.clone(),
        });
        self.messages.push(message);
    }

    /// Set the text of the message with `id`.
    ///
    /// Returns `false` and changes nothing when no message has that id.
    pub fn update_by_id(&mut self, id: &str, text: impl Into<String>) -> bool {
        let Some(message) = self.messages.iter_mut().rev().find(|m| m.id == id) else {
            return false;
        };
        message.text = text.into();
        self.events.publish(SessionEvent::MessageUpdated {
            id: message.id.clone(),
            text: message.text.clone(),
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamchat_types::chat::Sender;

    fn message(id: &str, text: &str, sender: Sender) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            text: text.to_string(),
            sender,
        }
    }

    #[test]
    fn test_append_keeps_order() {
        let mut store = MessageStore::new(EventBus::default());
        store.append(message("u1", "hi", Sender::User));
        store.append(message("a1", "hello", Sender::Ai));

        let ids: Vec<&str> = store.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "a1"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_by_id_targets_only_that_message() {
        let mut store = MessageStore::new(EventBus::default());
        store.append(message("a0", "old reply", Sender::Ai));
        store.append(message("u1", "hi", Sender::User));
        store.append(message("a1", "", Sender::Ai));

        assert!(store.update_by_id("a1", "Hel"));
        assert_eq!(store.get("a1").unwrap().text, "Hel");
        assert_eq!(store.get("a0").unwrap().text, "old reply");
    }

    #[test]
    fn test_update_by_id_unknown_is_noop() {
        let bus = EventBus::default();
        let mut store = MessageStore::new(bus.clone());
        store.append(message("u1", "hi", Sender::User));
        let mut rx = bus.subscribe();

        assert!(!store.update_by_id("missing", "text"));
        assert_eq!(store.messages(), &[message("u1", "hi", Sender::User)]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_replace_all_publishes_snapshot() {
        let bus = EventBus::default();
        let mut store = MessageStore::new(bus.clone());
        let mut rx = bus.subscribe();

        store.replace_all(vec![message("u1", "hi", Sender::User)]);
        store.replace_all(Vec::new());

        assert!(store.is_empty());
        match rx.try_recv().unwrap() {
            SessionEvent::MessagesReplaced { messages } => assert_eq!(messages.len(), 1),
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.try_recv().unwrap() {
            SessionEvent::MessagesReplaced { messages } => assert!(messages.is_empty()),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_mutations_publish_in_order() {
        let bus = EventBus::default();
        let mut store = MessageStore::new(bus.clone());
        let mut rx = bus.subscribe();

        store.append(message("a1", "", Sender::Ai));
        store.update_by_id("a1", "x");

        assert!(matches!(rx.try_recv().unwrap(), SessionEvent::MessageAppended { .. }));
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::MessageUpdated {
                id: "a1".to_string(),
                text: "x".to_string()
            }
        );
    }
}
