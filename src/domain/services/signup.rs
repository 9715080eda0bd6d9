use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::models::auth::{AuthTokens, NewAccount};
use crate::domain::models::signup::{
    AccountForm, CompanyForm, SignupDraft, FIRST_STEP, LAST_STEP, SIGNUP_FORM_KEY, SIGNUP_STEP_KEY,
};
use crate::domain::models::subscription::{Subscription, Tier, Usage};
use crate::domain::models::tenant::{Company, MemberRole, Membership};
use crate::domain::ports::{Backend, KeyValueStore};
use crate::error::AppError;

/// Multi-step signup wizard. The draft and the current step live in the
/// client's key/value store so they survive the OAuth redirect.
pub struct SignupFlow<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> SignupFlow<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn draft(&self) -> SignupDraft {
        let Some(raw) = self.store.get(SIGNUP_FORM_KEY) else {
            return SignupDraft::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Discarding unreadable signup draft: {}", e);
            SignupDraft::default()
        })
    }

    pub fn step(&self) -> u8 {
        self.store
            .get(SIGNUP_STEP_KEY)
            .and_then(|s| s.parse::<u8>().ok())
            .filter(|s| (FIRST_STEP..=LAST_STEP).contains(s))
            .unwrap_or(FIRST_STEP)
    }

    pub fn save(&self, step: u8, patch: SignupDraft) -> Result<SignupDraft, AppError> {
        if !(FIRST_STEP..=LAST_STEP).contains(&step) {
            return Err(AppError::Validation(format!(
                "Signup step must be between {} and {}",
                FIRST_STEP, LAST_STEP
            )));
        }
        let mut draft = self.draft();
        draft.merge(patch);

        let raw = serde_json::to_string(&draft)
            .map_err(|e| AppError::InternalWithMsg(format!("Signup draft encoding failed: {}", e)))?;
        self.store.set(SIGNUP_FORM_KEY, &raw);
        self.store.set(SIGNUP_STEP_KEY, &step.to_string());
        Ok(draft)
    }

    /// Clears both keys.
    pub fn abandon(&self) {
        self.store.remove(SIGNUP_FORM_KEY);
        self.store.remove(SIGNUP_STEP_KEY);
    }
}

/// Checks the account fields, then the company fields.
pub fn validate(draft: &SignupDraft, password: &str) -> Result<(AccountForm, CompanyForm), AppError> {
    let account = AccountForm {
        full_name: draft.full_name.clone().unwrap_or_default().trim().to_string(),
        email: draft.email.clone().unwrap_or_default().trim().to_lowercase(),
        password: password.to_string(),
        phone: non_blank(&draft.phone),
    };
    let company = CompanyForm {
        company_name: draft.company_name.clone().unwrap_or_default().trim().to_string(),
        company_type: non_blank(&draft.company_type),
        registration_number: non_blank(&draft.registration_number),
        contact_email: non_blank(&draft.contact_email),
    };

    account.validate()?;
    company.validate()?;
    Ok((account, company))
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Result of a completed signup.
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub tokens: AuthTokens,
    pub company: Company,
    pub membership: Membership,
}

/// Creates the account, its company, the owner membership, a free
/// subscription and a usage row with free limits, in that order.
#[instrument(skip(backend, draft, password))]
pub async fn provision(backend: &Backend, draft: &SignupDraft, password: &str) -> Result<Provisioned, AppError> {
    let (account, form) = validate(draft, password)?;

    let tokens = backend
        .auth
        .sign_up(&NewAccount {
            email: account.email,
            password: account.password,
            full_name: Some(account.full_name),
            phone: account.phone,
        })
        .await?;

    let mut company = Company::new(form.company_name);
    company.company_type = form.company_type;
    company.registration_number = form.registration_number;
    company.contact_email = form.contact_email;
    company.contact_phone = non_blank(&draft.contact_phone);
    let company = backend.companies.create(&company).await?;

    let membership = backend
        .team
        .create(&Membership::new(tokens.principal.id.clone(), company.id.clone(), MemberRole::Owner))
        .await?;
    backend.subscriptions.create(&Subscription::free(company.id.clone())).await?;
    backend
        .usage
        .create(&Usage::fresh(company.id.clone(), Tier::Free.limits()))
        .await?;

    info!(company_id = %company.id, user_id = %tokens.principal.id, "Signup provisioned");
    Ok(Provisioned { tokens, company, membership })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore(Mutex<HashMap<String, String>>);

    impl KeyValueStore for MapStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.lock().get(key).cloned()
        }
        fn set(&self, key: &str, value: &str) {
            self.0.lock().insert(key.to_string(), value.to_string());
        }
        fn remove(&self, key: &str) {
            self.0.lock().remove(key);
        }
    }

    fn complete_draft() -> SignupDraft {
        SignupDraft {
            full_name: Some("Ada Lovelace".into()),
            email: Some("Ada@Example.com".into()),
            company_name: Some("Analytical Engines".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_save_merges_and_tracks_step() {
        let store = MapStore::default();
        let flow = SignupFlow::new(&store);
        flow.save(1, SignupDraft { full_name: Some("Ada".into()), ..Default::default() }).unwrap();
        let draft = flow
            .save(2, SignupDraft { company_name: Some("Engines".into()), ..Default::default() })
            .unwrap();

        assert_eq!(draft.full_name.as_deref(), Some("Ada"));
        assert_eq!(draft.company_name.as_deref(), Some("Engines"));
        assert_eq!(flow.step(), 2);
        assert_eq!(flow.draft(), draft);
    }

    #[test]
    fn test_save_rejects_step_out_of_range() {
        let store = MapStore::default();
        let flow = SignupFlow::new(&store);
        assert!(matches!(flow.save(0, SignupDraft::default()), Err(AppError::Validation(_))));
        assert!(matches!(flow.save(4, SignupDraft::default()), Err(AppError::Validation(_))));
        assert!(store.get(SIGNUP_FORM_KEY).is_none());
    }

    #[test]
    fn test_abandon_clears_both_keys() {
        let store = MapStore::default();
        let flow = SignupFlow::new(&store);
        flow.save(3, complete_draft()).unwrap();
        flow.abandon();
        assert!(store.get(SIGNUP_FORM_KEY).is_none());
        assert!(store.get(SIGNUP_STEP_KEY).is_none());
        assert_eq!(flow.step(), FIRST_STEP);
    }

    #[test]
    fn test_corrupt_draft_reads_as_empty() {
        let store = MapStore::default();
        store.set(SIGNUP_FORM_KEY, "{not json");
        assert_eq!(SignupFlow::new(&store).draft(), SignupDraft::default());
    }

    #[test]
    fn test_validate_reports_account_fields() {
        let draft = SignupDraft { email: Some("nope".into()), ..Default::default() };
        let Err(AppError::FieldErrors(errors)) = validate(&draft, "short") else {
            panic!("expected field errors");
        };
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("full_name"));
    }

    #[test]
    fn test_validate_reports_company_fields() {
        let draft = SignupDraft { company_name: None, ..complete_draft() };
        let Err(AppError::FieldErrors(errors)) = validate(&draft, "correct horse") else {
            panic!("expected field errors");
        };
        assert!(errors.field_errors().contains_key("company_name"));
    }

    #[test]
    fn test_validate_normalizes_email() {
        let (account, company) = validate(&complete_draft(), "correct horse").unwrap();
        assert_eq!(account.email, "ada@example.com");
        assert_eq!(company.company_name, "Analytical Engines");
        assert!(account.phone.is_none());
    }
}
