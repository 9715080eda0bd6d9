use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::domain::{models::integration::Channel, ports::OAuthExchange};
use crate::error::AppError;
use crate::infra::backend::client::BackendClient;

const FUNCTION: &str = "meta-oauth-integration";

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    code: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

/// Trades a Meta authorization code for a channel credential bundle.
pub struct MetaOAuthExchange {
    client: Arc<BackendClient>,
}

impl MetaOAuthExchange {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OAuthExchange for MetaOAuthExchange {
    #[instrument(skip(self, code))]
    async fn exchange(&self, channel: Channel, code: &str) -> Result<Value, AppError> {
        let body: Value = self
            .client
            .invoke(FUNCTION, &ExchangeRequest { code, kind: channel.as_str() })
            .await?;
        info!("Token exchange for {} completed", channel);
        unwrap_envelope(body)
    }
}

/// Accepts both a bare credential object and `{success, data}` envelopes.
fn unwrap_envelope(body: Value) -> Result<Value, AppError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Token exchange failed")
            .to_string();
        return Err(AppError::Remote(message));
    }
    match body {
        Value::Object(mut map) if map.contains_key("data") => Ok(map.remove("data").unwrap_or(Value::Null)),
        other => Ok(other),
    }
}
