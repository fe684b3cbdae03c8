// ABOUTME: HTTP client for the hosted identity service (password grant, sign-up, refresh, logout)
// ABOUTME: Parses token responses into sessions and surfaces the service's error message verbatim
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use super::{AuthUser, IdentityProvider, Session, SignUpOutcome};
use crate::backend::http_client::shared_client;
use crate::constants::endpoints::AUTH_PREFIX;
use crate::errors::{AppError, AppResult, ErrorCode};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};
use url::Url;

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(|| now + Duration::seconds(self.expires_in.unwrap_or(3600)));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Error body shapes used by the identity service
#[derive(Debug, Default, Deserialize)]
struct IdentityErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

/// Identity client speaking the hosted service's `/auth/v1` API
pub struct RestIdentity {
    base_url: Url,
    anon_key: String,
    client: Client,
}

impl RestIdentity {
    /// Create a client for the project at `base_url`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not a valid URL
    pub fn new(base_url: &str, anon_key: impl Into<String>) -> AppResult<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(&format!("{trimmed}/"))
            .map_err(|e| AppError::config(format!("Invalid identity URL: {e}")))?;
        Ok(Self {
            base_url,
            anon_key: anon_key.into(),
            client: shared_client().clone(),
        })
    }

    /// Use a specific HTTP client instead of the shared one
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        let full = format!("{}/{path}", AUTH_PREFIX.trim_start_matches('/'));
        self.base_url
            .join(&full)
            .map_err(|e| AppError::config(format!("Invalid identity endpoint {path}: {e}")))
    }

    async fn post(&self, url: Url, bearer: Option<&str>, body: &Value) -> AppResult<Response> {
        let mut request = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        request.send().await.map_err(|e| {
            AppError::unavailable(format!("Identity service request failed: {e}")).with_source(e)
        })
    }

    async fn get(&self, url: Url, bearer: &str) -> AppResult<Response> {
        self.client
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| {
                AppError::unavailable(format!("Identity service request failed: {e}"))
                    .with_source(e)
            })
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> AppResult<Session> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        let response = self.post(url, None, &body).await?;
        let value = read_json(response).await?;
        let token: TokenResponse = serde_json::from_value(value)?;
        Ok(token.into_session(Utc::now()))
    }
}

/// Read a JSON body, turning error statuses into `AppError` with the service message
async fn read_json(response: Response) -> AppResult<Value> {
    let status = response.status();
    let text = response.text().await.map_err(|e| {
        AppError::unavailable(format!("Failed to read identity response: {e}")).with_source(e)
    })?;

    if !status.is_success() {
        let message = error_message(&text).unwrap_or_else(|| format!("HTTP {status}"));
        warn!(status = status.as_u16(), %message, "Identity request failed");
        return Err(identity_error(status.as_u16(), message));
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Credential and validation failures are auth errors; the rest keep the HTTP mapping
fn identity_error(status: u16, message: String) -> AppError {
    match ErrorCode::from_http_status(status) {
        ErrorCode::InvalidInput | ErrorCode::AuthInvalid | ErrorCode::ResourceNotFound => {
            AppError::auth_invalid(message).with_http_status(status)
        }
        _ => AppError::backend(status, message),
    }
}

/// First non-empty message among the fields the identity service uses
pub(crate) fn error_message(body: &str) -> Option<String> {
    let parsed: IdentityErrorBody = serde_json::from_str(body).ok()?;
    [
        parsed.error_description,
        parsed.msg,
        parsed.message,
        parsed.error,
    ]
    .into_iter()
    .flatten()
    .find(|m| !m.trim().is_empty())
}

/// Sign-up answers with a token response, or with the bare user when confirmation is pending
fn parse_sign_up(value: Value) -> AppResult<SignUpOutcome> {
    if value.get("access_token").is_some() {
        let token: TokenResponse = serde_json::from_value(value)?;
        let session = token.into_session(Utc::now());
        return Ok(SignUpOutcome {
            user: session.user.clone(),
            session: Some(session),
        });
    }
    let user_value = value.get("user").cloned().unwrap_or(value);
    let user: AuthUser = serde_json::from_value(user_value)?;
    Ok(SignUpOutcome {
        user,
        session: None,
    })
}

#[async_trait]
impl IdentityProvider for RestIdentity {
    fn name(&self) -> &'static str {
        "rest"
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AppResult<SignUpOutcome> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "display_name": display_name },
        });
        let response = self.post(self.endpoint("signup")?, None, &body).await?;
        let outcome = parse_sign_up(read_json(response).await?)?;
        debug!(
            user_id = %outcome.user.id,
            confirmed = outcome.session.is_some(),
            "Account created"
        );
        Ok(outcome)
    }

    #[instrument(skip_all)]
    async fn refresh_session(&self, refresh_token: &str) -> AppResult<Session> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .post(self.endpoint("logout")?, Some(access_token), &json!({}))
            .await?;
        read_json(response).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn get_user(&self, access_token: &str) -> AppResult<AuthUser> {
        let response = self.get(self.endpoint("user")?, access_token).await?;
        Ok(serde_json::from_value(read_json(response).await?)?)
    }
}
