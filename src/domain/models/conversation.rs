use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub direction: Direction,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn outbound(conversation_id: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id,
            direction: Direction::Outbound,
            content,
            created_at: Utc::now(),
        }
    }
}

/// Messages exchanged with one external contact on one channel, with the
/// contact metadata denormalized onto it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub company_id: String,
    pub channel: String,
    pub contact_id: String,
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_tags: Vec<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub auto_respond: bool,
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn latest_activity(&self) -> Option<DateTime<Utc>> {
        self.messages
            .iter()
            .map(|m| m.created_at)
            .max()
            .max(self.last_message_at)
    }

    /// Pinned first, then most recent activity first.
    pub fn display_order(a: &Conversation, b: &Conversation) -> Ordering {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| b.latest_activity().cmp(&a.latest_activity()))
    }
}

/// Partial update of the contact side of a conversation.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ConversationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_respond: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_tags: Option<Vec<String>>,
}

impl ConversationPatch {
    pub fn is_empty(&self) -> bool {
        self.contact_name.is_none()
            && self.notes.is_none()
            && self.is_pinned.is_none()
            && self.auto_respond.is_none()
            && self.contact_tags.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn conv(id: &str, pinned: bool, last: Option<DateTime<Utc>>) -> Conversation {
        Conversation {
            id: id.into(),
            company_id: "c1".into(),
            channel: "whatsapp".into(),
            contact_id: format!("contact-{}", id),
            contact_name: None,
            contact_tags: vec![],
            notes: None,
            is_pinned: pinned,
            auto_respond: false,
            last_message_at: last,
            messages: vec![],
        }
    }

    #[test]
    fn test_pinned_conversations_sort_first_then_recent() {
        let now = Utc::now();
        let mut list = vec![
            conv("old", false, Some(now - Duration::hours(5))),
            conv("pinned", true, Some(now - Duration::days(3))),
            conv("new", false, Some(now)),
            conv("silent", false, None),
        ];
        list.sort_by(Conversation::display_order);

        let ids: Vec<_> = list.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["pinned", "new", "old", "silent"]);
    }

    #[test]
    fn test_latest_activity_prefers_newest_message() {
        let now = Utc::now();
        let mut c = conv("a", false, Some(now - Duration::hours(1)));
        c.messages.push(Message {
            id: "m1".into(),
            conversation_id: "a".into(),
            direction: Direction::Inbound,
            content: "hi".into(),
            created_at: now,
        });
        assert_eq!(c.latest_activity(), Some(now));
    }
}
