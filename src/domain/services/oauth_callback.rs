use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::models::integration::WhatsApp;
use crate::domain::services::integration_registry::IntegrationRegistry;

pub const CALLBACK_REDIRECT: &str = "/dashboard?tab=settings";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallbackStatus {
    Success,
    Error,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CallbackOutcome {
    pub status: CallbackStatus,
    pub message: String,
    pub redirect_to: &'static str,
    #[serde(skip)]
    pub redirect_after: Duration,
}

impl CallbackOutcome {
    fn new(status: CallbackStatus, message: impl Into<String>, delay: Duration) -> Self {
        Self {
            status,
            message: message.into(),
            redirect_to: CALLBACK_REDIRECT,
            redirect_after: delay,
        }
    }
}

/// Finishes the WhatsApp OAuth round-trip. Every outcome redirects to the
/// settings tab after `delay`; nothing is retried.
///
/// `registry` is `None` when the principal has no company, which is reported
/// as an error without calling anything.
pub async fn handle_callback(
    params: &CallbackParams,
    registry: Option<&IntegrationRegistry<WhatsApp>>,
    delay: Duration,
) -> CallbackOutcome {
    if let Some(error) = params.error.as_deref() {
        let detail = params.error_description.as_deref().unwrap_or(error);
        warn!("OAuth provider returned an error: {}", error);
        return CallbackOutcome::new(CallbackStatus::Error, format!("Authorization failed: {}", detail), delay);
    }

    let Some(code) = params.code.as_deref().filter(|c| !c.trim().is_empty()) else {
        return CallbackOutcome::new(CallbackStatus::Error, "Missing authorization code", delay);
    };

    let Some(registry) = registry else {
        return CallbackOutcome::new(CallbackStatus::Error, "You are not part of any company", delay);
    };

    match registry.configure(code).await {
        Ok(_) => {
            info!("WhatsApp connected from OAuth callback");
            CallbackOutcome::new(CallbackStatus::Success, "WhatsApp connected successfully", delay)
        }
        Err(e) => {
            warn!("WhatsApp configuration failed: {}", e);
            CallbackOutcome::new(CallbackStatus::Error, e.to_string(), delay)
        }
    }
}
