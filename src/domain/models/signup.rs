use serde::{Deserialize, Serialize};
use validator::Validate;

pub const SIGNUP_FORM_KEY: &str = "signup_form_data";
pub const SIGNUP_STEP_KEY: &str = "signup_current_step";

pub const FIRST_STEP: u8 = 1;
pub const LAST_STEP: u8 = 3;

/// Partially filled signup form. Survives the OAuth redirect round-trip, so
/// it never carries the password.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SignupDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_code: Option<String>,
}

impl SignupDraft {
    /// Overlays every field set in `patch`.
    pub fn merge(&mut self, patch: SignupDraft) {
        macro_rules! take {
            ($($field:ident),*) => {
                $( if patch.$field.is_some() { self.$field = patch.$field; } )*
            };
        }
        take!(
            full_name, email, phone, company_name, company_type,
            registration_number, contact_email, contact_phone, whatsapp_code
        );
    }
}

/// Account fields checked before provisioning.
#[derive(Debug, Validate)]
pub struct AccountForm {
    #[validate(length(min = 1, max = 120, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 6, max = 20, message = "Phone must be 6-20 characters"))]
    pub phone: Option<String>,
}

/// Company fields checked before provisioning.
#[derive(Debug, Validate)]
pub struct CompanyForm {
    #[validate(length(min = 1, max = 200, message = "Company name is required"))]
    pub company_name: String,
    #[validate(length(max = 100, message = "Company type is too long"))]
    pub company_type: Option<String>,
    #[validate(length(max = 100, message = "Registration number is too long"))]
    pub registration_number: Option<String>,
    #[validate(email(message = "Contact email must be valid"))]
    pub contact_email: Option<String>,
}
