use serde::{Deserialize, Serialize};

/// Authenticated identity. Owned by the auth backend and read-only here.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
}

impl Principal {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}
