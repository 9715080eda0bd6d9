use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::domain::models::auth::{AuthTokens, Credentials, NewAccount};
use crate::domain::models::user::Principal;
use crate::domain::ports::AuthGateway;
use crate::error::AppError;
use crate::infra::backend::client::BackendClient;

pub struct HttpAuthGateway {
    client: Arc<BackendClient>,
}

impl HttpAuthGateway {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[derive(Deserialize)]
struct RemoteUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    user_metadata: Value,
}

impl From<RemoteUser> for Principal {
    fn from(user: RemoteUser) -> Self {
        let meta = |key: &str| {
            user.user_metadata
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Principal {
            display_name: meta("full_name"),
            phone: meta("phone").or(user.phone.clone().filter(|p| !p.is_empty())),
            email: user.email.clone().unwrap_or_default(),
            id: user.id,
        }
    }
}

#[derive(Deserialize)]
struct RemoteSession {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: RemoteUser,
}

impl From<RemoteSession> for AuthTokens {
    fn from(session: RemoteSession) -> Self {
        let expires_at = session
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .or_else(|| session.expires_in.map(|s| Utc::now() + Duration::seconds(s)));
        AuthTokens {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_at,
            principal: session.user.into(),
        }
    }
}

fn parse_session(body: Value) -> Result<AuthTokens, AppError> {
    serde_json::from_value::<RemoteSession>(body)
        .map(AuthTokens::from)
        .map_err(|e| AppError::Remote(format!("Unexpected auth response: {}", e)))
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthTokens, AppError> {
        let body = self
            .client
            .auth_post(
                "token?grant_type=password",
                &json!({ "email": credentials.email, "password": credentials.password }),
                None,
            )
            .await?;
        parse_session(body)
    }

    async fn sign_up(&self, account: &NewAccount) -> Result<AuthTokens, AppError> {
        let body = self
            .client
            .auth_post(
                "signup",
                &json!({
                    "email": account.email,
                    "password": account.password,
                    "data": { "full_name": account.full_name, "phone": account.phone },
                }),
                None,
            )
            .await?;

        if body.get("access_token").is_none() {
            info!("Signup for {} awaits email confirmation", account.email);
            return Err(AppError::Conflict(
                "Account created. Confirm your email address, then sign in".into(),
            ));
        }
        parse_session(body)
    }

    async fn current_user(&self, access_token: &str) -> Result<Principal, AppError> {
        let body = self.client.auth_get("user", access_token).await?;
        serde_json::from_value::<RemoteUser>(body)
            .map(Principal::from)
            .map_err(|e| AppError::Remote(format!("Unexpected user payload: {}", e)))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        self.client
            .auth_post("logout", &json!({}), Some(access_token))
            .await
            .map(|_| ())
            .inspect_err(|e| warn!("Sign-out rejected: {}", e))
    }
}
