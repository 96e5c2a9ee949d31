//! # Workflow360 REST Provider
//!
//! An `IdentityProvider` speaking the hosted identity service's HTTP API.
//! The token pair in responses is stored in an owned [`SessionStore`] and
//! never inspected beyond presence checks.
//!
//! No explicit request timeouts are set; the client library's defaults
//! apply.

mod wire;

pub use wire::{ErrorBody, TokenResponse, WireUser};

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use url::Url;

use workflow360_core::error::{AuthError, AuthResult};
use workflow360_core::session::{AuthEventStream, SessionStore};
use workflow360_core::traits::IdentityProvider;
use workflow360_core::types::{AuthEvent, AuthEventKind, OtpPurpose, Session};

/// The machine code the login flow matches on.
const EMAIL_NOT_CONFIRMED_CODE: &str = "email_not_confirmed";

#[derive(Debug, Serialize)]
struct SendCodeRequest<'a> {
    email: &'a str,
    #[serde(rename = "type")]
    purpose: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyCodeRequest<'a> {
    email: &'a str,
    token: &'a str,
    #[serde(rename = "type")]
    purpose: &'a str,
}

#[derive(Debug, Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ExchangeCodeRequest<'a> {
    auth_code: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdatePasswordRequest<'a> {
    password: &'a str,
}

/// HTTP client for the hosted identity API.
pub struct RestProvider {
    base: Url,
    api_key: String,
    http: Client,
    sessions: Arc<SessionStore>,
}

impl RestProvider {
    /// Creates a client for the service at `base` authenticating with
    /// `api_key`.
    pub fn new(base: Url, api_key: impl Into<String>) -> Self {
        Self {
            base,
            api_key: api_key.into(),
            http: Client::new(),
            sessions: Arc::new(SessionStore::new()),
        }
    }

    /// The session store backing this client.
    pub fn session_store(&self) -> Arc<SessionStore> {
        Arc::clone(&self.sessions)
    }

    fn endpoint(&self, path: &str) -> AuthResult<Url> {
        self.base
            .join(path)
            .map_err(|e| AuthError::config(format!("bad endpoint {path}: {e}")))
    }

    fn apply_headers(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
    }

    async fn bearer(&self) -> AuthResult<String> {
        let session = self.sessions.get().await.ok_or(AuthError::SessionMissing)?;
        Ok(session.access_token)
    }

    /// Sends `body` as JSON to `path` and returns the raw response, with
    /// transport failures mapped to `AuthError::Network`.
    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> AuthResult<reqwest::Response> {
        let url = self.endpoint(path)?;
        let mut req = self.apply_headers(self.http.post(url)).json(body);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        req.send().await.map_err(transport_error)
    }

    /// Decodes an error response into the matching `AuthError`.
    async fn decode_error(&self, status: StatusCode, resp: reqwest::Response) -> AuthError {
        let body = match resp.json::<ErrorBody>().await {
            Ok(body) => body,
            Err(e) => {
                return AuthError::unexpected(format!("undecodable {status} error body: {e}"));
            }
        };
        if body.error_code.as_deref() == Some(EMAIL_NOT_CONFIRMED_CODE) {
            return AuthError::EmailNotConfirmed;
        }
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            if body.message().contains("credentials") {
                return AuthError::InvalidCredentials;
            }
        }
        AuthError::provider(body.message())
    }

    /// Decodes a session-bearing success response, stores the session and
    /// emits `kind`.
    async fn accept_session(
        &self,
        resp: reqwest::Response,
        kind: AuthEventKind,
    ) -> AuthResult<Session> {
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::unexpected(format!("undecodable token response: {e}")))?;
        let session = token.into_session();
        self.sessions.establish(session.clone(), kind).await;
        Ok(session)
    }
}

#[async_trait]
impl IdentityProvider for RestProvider {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let resp = self
            .post_json(
                "token?grant_type=password",
                &PasswordGrantRequest { email, password },
                None,
            )
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(self.decode_error(status, resp).await);
        }
        self.accept_session(resp, AuthEventKind::SignedIn).await
    }

    async fn send_code(&self, email: &str, purpose: OtpPurpose) -> AuthResult<()> {
        let resp = self
            .post_json(
                "otp",
                &SendCodeRequest {
                    email,
                    purpose: purpose.as_str(),
                },
                None,
            )
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(self.decode_error(status, resp).await);
        }
        Ok(())
    }

    async fn verify_code(
        &self,
        email: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> AuthResult<Option<Session>> {
        let resp = self
            .post_json(
                "verify",
                &VerifyCodeRequest {
                    email,
                    token: code,
                    purpose: purpose.as_str(),
                },
                None,
            )
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(self.decode_error(status, resp).await);
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::unexpected(format!("undecodable verify response: {e}")))?;
        // The service has been seen answering 200 with an empty token set;
        // surface that as "no session" and let the caller decide.
        if token.access_token.is_empty() {
            tracing::warn!(purpose = purpose.as_str(), "verify succeeded without a session");
            return Ok(None);
        }
        let kind = match purpose {
            OtpPurpose::Recovery => AuthEventKind::PasswordRecovery,
            _ => AuthEventKind::SignedIn,
        };
        let session = token.into_session();
        self.sessions.establish(session.clone(), kind).await;
        Ok(Some(session))
    }

    async fn current_session(&self) -> AuthResult<Option<Session>> {
        Ok(self.sessions.get().await)
    }

    async fn update_password(&self, new_password: &str) -> AuthResult<()> {
        let bearer = self.bearer().await?;
        let url = self.endpoint("user")?;
        let resp = self
            .apply_headers(self.http.put(url))
            .bearer_auth(&bearer)
            .json(&UpdatePasswordRequest {
                password: new_password,
            })
            .send()
            .await
            .map_err(transport_error)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(self.decode_error(status, resp).await);
        }
        if let Some(session) = self.sessions.get().await {
            self.sessions
                .emit(AuthEvent::with_session(AuthEventKind::UserUpdated, session));
        }
        Ok(())
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let bearer = self.bearer().await?;
        let resp = self
            .post_json("logout", &serde_json::json!({}), Some(&bearer))
            .await?;
        let status = resp.status();
        // The local session goes away regardless of what the server said.
        self.sessions.tear_down().await;
        if !status.is_success() {
            return Err(self.decode_error(status, resp).await);
        }
        Ok(())
    }

    async fn exchange_code_for_session(&self, code: &str) -> AuthResult<Session> {
        let resp = self
            .post_json(
                "token?grant_type=pkce",
                &ExchangeCodeRequest { auth_code: code },
                None,
            )
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(self.decode_error(status, resp).await);
        }
        self.accept_session(resp, AuthEventKind::PasswordRecovery)
            .await
    }

    async fn set_session(&self, access_token: &str, refresh_token: &str) -> AuthResult<Session> {
        // Trust the pair the recovery URL carried; the server will reject
        // the access token on first use if it is stale.
        let session = Session::new(access_token, refresh_token);
        self.sessions
            .establish(session.clone(), AuthEventKind::SignedIn)
            .await;
        Ok(session)
    }

    fn subscribe(&self) -> AuthEventStream {
        self.sessions.subscribe()
    }
}

fn transport_error(err: reqwest::Error) -> AuthError {
    AuthError::network(err.to_string())
}
