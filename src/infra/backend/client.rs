use std::time::Duration;

use reqwest::{multipart::Form, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::error::AppError;

/// Thin client over the backend-as-a-service HTTP surface: the PostgREST
/// tables under `/rest/v1`, the auth API under `/auth/v1` and the edge
/// functions under `/functions/v1`.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// PostgREST equality filter value.
pub fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

impl BackendClient {
    pub fn new(base_url: &str, api_key: String, timeout: Option<Duration>) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::InternalWithMsg(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, name.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(bearer.unwrap_or(&self.api_key))
    }

    /// `SELECT *` with PostgREST query pairs, e.g. `("company_id", eq(id))`.
    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>, AppError> {
        self.select_columns(table, "*", query).await
    }

    /// `SELECT` of explicit columns, including embedded relations such as
    /// `*,messages(*)`.
    #[instrument(skip(self, query))]
    pub async fn select_columns<T: DeserializeOwned>(
        &self,
        table: &str,
        columns: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, AppError> {
        let request = self
            .authorized(self.client.get(self.rest_url(table)), None)
            .query(&[("select", columns)])
            .query(query);
        let resp = check(request.send().await?).await?;
        Ok(resp.json().await?)
    }

    pub async fn select_one<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Option<T>, AppError> {
        let mut query = query.to_vec();
        query.push(("limit", "1".to_string()));
        Ok(self.select(table, &query).await?.into_iter().next())
    }

    #[instrument(skip(self, body))]
    pub async fn insert<T: DeserializeOwned, B: Serialize + ?Sized>(&self, table: &str, body: &B) -> Result<T, AppError> {
        let request = self
            .authorized(self.client.post(self.rest_url(table)), None)
            .header("Prefer", "return=representation")
            .json(body);
        let resp = check(request.send().await?).await?;
        first_row(resp.json().await?, table)
    }

    /// Insert-or-merge keyed by `on_conflict`.
    #[instrument(skip(self, body))]
    pub async fn upsert<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        on_conflict: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let request = self
            .authorized(self.client.post(self.rest_url(table)), None)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(body);
        let resp = check(request.send().await?).await?;
        first_row(resp.json().await?, table)
    }

    #[instrument(skip(self, query, body))]
    pub async fn update<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<Vec<T>, AppError> {
        let request = self
            .authorized(self.client.patch(self.rest_url(table)), None)
            .query(query)
            .header("Prefer", "return=representation")
            .json(body);
        let resp = check(request.send().await?).await?;
        Ok(resp.json().await?)
    }

    /// Returns the number of deleted rows.
    #[instrument(skip(self, query))]
    pub async fn delete(&self, table: &str, query: &[(&str, String)]) -> Result<usize, AppError> {
        let request = self
            .authorized(self.client.delete(self.rest_url(table)), None)
            .query(query)
            .header("Prefer", "return=representation");
        let resp = check(request.send().await?).await?;
        let rows: Vec<Value> = resp.json().await?;
        Ok(rows.len())
    }

    #[instrument(skip(self, args))]
    pub async fn rpc<T: DeserializeOwned, B: Serialize + ?Sized>(&self, name: &str, args: &B) -> Result<T, AppError> {
        let request = self
            .authorized(self.client.post(self.rest_url(&format!("rpc/{}", name))), None)
            .json(args);
        let resp = check(request.send().await?).await?;
        read_json(resp, name).await
    }

    #[instrument(skip(self, body, bearer))]
    pub async fn auth_post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<Value, AppError> {
        let request = self.authorized(self.client.post(self.auth_url(path)), bearer).json(body);
        let resp = check(request.send().await?).await?;
        read_json(resp, path).await
    }

    #[instrument(skip(self, bearer))]
    pub async fn auth_get(&self, path: &str, bearer: &str) -> Result<Value, AppError> {
        let request = self.authorized(self.client.get(self.auth_url(path)), Some(bearer));
        let resp = check(request.send().await?).await?;
        Ok(resp.json().await?)
    }

    /// Calls an edge function with a JSON body.
    #[instrument(skip(self, body))]
    pub async fn invoke<T: DeserializeOwned, B: Serialize + ?Sized>(&self, function: &str, body: &B) -> Result<T, AppError> {
        let request = self.authorized(self.client.post(self.function_url(function)), None).json(body);
        let resp = check(request.send().await?).await?;
        read_json(resp, function).await
    }

    /// Calls an edge function with a multipart body on behalf of a company.
    #[instrument(skip(self, form))]
    pub async fn invoke_multipart<T: DeserializeOwned>(
        &self,
        function: &str,
        company_id: &str,
        form: Form,
    ) -> Result<T, AppError> {
        let request = self
            .authorized(self.client.post(self.function_url(function)), None)
            .header("x-company-id", company_id)
            .multipart(form);
        let resp = check(request.send().await?).await?;
        Ok(resp.json().await?)
    }
}

/// Decodes a response body, reading an empty one (e.g. `204`) as `null`.
async fn read_json<T: DeserializeOwned>(resp: Response, source: &str) -> Result<T, AppError> {
    let text = resp.text().await?;
    let text = if text.trim().is_empty() { "null" } else { text.as_str() };
    serde_json::from_str(text)
        .map_err(|e| AppError::Remote(format!("Unreadable response from {}: {}", source, e)))
}

fn first_row<T: DeserializeOwned>(body: Value, table: &str) -> Result<T, AppError> {
    let row = match body {
        Value::Array(rows) => rows.into_iter().next(),
        Value::Null => None,
        other => Some(other),
    }
    .ok_or_else(|| AppError::Remote(format!("No row returned from {}", table)))?;
    serde_json::from_value(row).map_err(|e| {
        error!("Row from {} did not match the expected shape: {}", table, e);
        AppError::Remote(format!("Unexpected row shape from {}", table))
    })
}

/// Passes successful responses through and turns the rest into errors that
/// carry the backend's own message.
pub async fn check(resp: Response) -> Result<Response, AppError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = remote_message(&text).unwrap_or_else(|| format!("Backend returned {}", status));
    debug!(status = status.as_u16(), "Backend error: {}", message);

    Err(match status {
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized,
        _ => AppError::Remote(message),
    })
}

/// Error text from a backend body: `{error}`, `{message}`, `{msg}` or
/// `{error_description}`, falling back to the raw text.
pub fn remote_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return Some(body.to_string());
    };
    ["error_description", "message", "msg", "error"]
        .iter()
        .find_map(|key| match json.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Object(inner)) => inner.get("message").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .or_else(|| Some(body.to_string()))
}
