use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use chrono::{DateTime, Utc};

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    WhatsApp,
    Instagram,
    Facebook,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::WhatsApp, Channel::Instagram, Channel::Facebook];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::WhatsApp => "whatsapp",
            Channel::Instagram => "instagram",
            Channel::Facebook => "facebook",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Channel::WhatsApp => "WhatsApp",
            Channel::Instagram => "Instagram",
            Channel::Facebook => "Facebook",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            Channel::WhatsApp => "whatsapp_integrations",
            Channel::Instagram => "instagram_integrations",
            Channel::Facebook => "facebook_integrations",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AppError::UnknownChannel(s.to_string()))
    }
}

/// Static description of one OAuth-backed channel: its identity and the
/// shape of the credential bundle the token exchange hands back.
pub trait ChannelSpec: Send + Sync + 'static {
    const CHANNEL: Channel;
    type Credentials: Serialize + DeserializeOwned + Clone + fmt::Debug + PartialEq + Send + Sync;
}

pub struct WhatsApp;
pub struct Instagram;
pub struct Facebook;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WhatsAppCredentials {
    pub phone_number_id: String,
    pub business_account_id: String,
    #[serde(default)]
    pub display_phone_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InstagramCredentials {
    pub instagram_account_id: String,
    pub page_id: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FacebookCredentials {
    pub page_id: String,
    #[serde(default)]
    pub page_name: Option<String>,
}

impl ChannelSpec for WhatsApp {
    const CHANNEL: Channel = Channel::WhatsApp;
    type Credentials = WhatsAppCredentials;
}

impl ChannelSpec for Instagram {
    const CHANNEL: Channel = Channel::Instagram;
    type Credentials = InstagramCredentials;
}

impl ChannelSpec for Facebook {
    const CHANNEL: Channel = Channel::Facebook;
    type Credentials = FacebookCredentials;
}

/// One stored credential bundle. Channel specific fields are flattened so the
/// row matches the per-channel table layout.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Integration<C> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub company_id: String,
    #[serde(flatten)]
    pub credentials: C,
    pub access_token: String,
    #[serde(default)]
    pub token_expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl<C> Integration<C> {
    pub fn is_token_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expires_at.is_some_and(|at| at <= now)
    }
}

/// What the token exchange function returns for any channel.
#[derive(Debug, Deserialize, Clone)]
pub struct ExchangedToken<C> {
    #[serde(flatten)]
    pub credentials: C,
    pub access_token: String,
    #[serde(default)]
    pub token_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    Unconfigured,
    Connecting,
    Connected,
    Disconnecting,
}
