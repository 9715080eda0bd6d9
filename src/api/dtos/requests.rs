use serde::Deserialize;

use crate::domain::models::signup::SignupDraft;
use crate::domain::models::subscription::BillingCycle;
use crate::domain::models::tenant::MemberRole;

#[derive(Deserialize)]
pub struct ConfigureIntegrationRequest {
    pub code: String,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct ToggleRequest {
    pub value: bool,
}

#[derive(Deserialize)]
pub struct ContactTagsRequest {
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: String,
}

#[derive(Deserialize)]
pub struct EditTagRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct RecolorTagRequest {
    pub color: String,
}

#[derive(Deserialize)]
pub struct PaymentCompleteRequest {
    pub tier: String,
    pub billing_cycle: BillingCycle,
}

#[derive(Deserialize)]
pub struct InviteMemberRequest {
    pub email: String,
    pub role: MemberRole,
}

#[derive(Deserialize)]
pub struct SignupStepRequest {
    pub step: u8,
    #[serde(default)]
    pub data: SignupDraft,
}

#[derive(Deserialize)]
pub struct CompleteSignupRequest {
    pub password: String,
}
