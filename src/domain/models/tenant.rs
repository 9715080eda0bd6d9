use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub company_type: Option<String>,
    pub registration_number: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            company_type: None,
            registration_number: None,
            contact_email: None,
            contact_phone: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
}

impl MemberRole {
    /// Owners and admins manage the team.
    pub fn can_manage_team(self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(MemberRole::Owner),
            "admin" => Ok(MemberRole::Admin),
            "member" => Ok(MemberRole::Member),
            other => Err(AppError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// Row of the `team` table joining a principal to a company.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Membership {
    pub id: String,
    pub user_id: String,
    pub company_id: String,
    pub role: MemberRole,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(user_id: String, company_id: String, role: MemberRole) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            company_id,
            role,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Revoked,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Invitation {
    pub id: String,
    pub company_id: String,
    pub email: String,
    pub role: MemberRole,
    pub token: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Invitation {
    pub fn new(company_id: String, email: String, role: MemberRole) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(40)
            .map(char::from)
            .collect();
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            company_id,
            email,
            role,
            token,
            status: InvitationStatus::Pending,
            created_at: now,
            expires_at: now + Duration::days(7),
        }
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && self.expires_at > now
    }
}
