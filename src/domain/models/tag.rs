use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Prefix of ids handed out to tags that only exist in a local draft.
pub const LOCAL_TAG_PREFIX: &str = "local-";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Tag {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Tag {
    pub fn local(company_id: String, name: String, color: String) -> Self {
        Self {
            id: format!("{}{}", LOCAL_TAG_PREFIX, Uuid::new_v4()),
            company_id,
            name,
            color,
            is_global: false,
            created_at: None,
        }
    }

    pub fn is_local(&self) -> bool {
        self.id.starts_with(LOCAL_TAG_PREFIX)
    }
}

pub fn is_valid_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
