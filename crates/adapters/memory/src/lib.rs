//! # Workflow360 Memory Provider
//!
//! An in-memory `IdentityProvider`, primarily intended for tests and
//! development. Codes are "delivered" to an outbox the caller can read
//! instead of an inbox they cannot.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use workflow360_adapter_memory::MemoryProvider;
//!
//! let provider = MemoryProvider::new();
//! provider.seed_user("user@example.com", "Abcdefg1", true).await;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tokio::sync::RwLock;

use workflow360_core::error::{AuthError, AuthResult};
use workflow360_core::session::{AuthEventStream, SessionStore};
use workflow360_core::traits::IdentityProvider;
use workflow360_core::types::{AuthEvent, AuthEventKind, OtpPurpose, Session, User};

/// In-memory storage for a single entity type.
type Store<T> = Arc<RwLock<HashMap<String, T>>>;

const DIGITS: &[u8] = b"0123456789";

/// A user record as the provider keeps it.
#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    password: String,
}

/// A one-time code issued to an email address for one purpose.
#[derive(Debug, Clone)]
struct IssuedCode {
    code: String,
    expires_at: DateTime<Utc>,
    attempts: u32,
    max_attempts: u32,
    used: bool,
}

impl IssuedCode {
    fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// A record of a code "delivered" to an address. Tests read these where a
/// real deployment would read an inbox.
#[derive(Debug, Clone)]
pub struct CodeDelivery {
    /// The address the code went to.
    pub email: String,
    /// The code itself.
    pub code: String,
    /// What the code is for.
    pub purpose: OtpPurpose,
    /// When it was sent.
    pub sent_at: DateTime<Utc>,
}

/// Configuration for the memory provider.
#[derive(Debug, Clone)]
pub struct MemoryProviderConfig {
    /// How long issued codes stay valid. Default: 5 minutes.
    pub code_ttl: Duration,
    /// Verification attempts allowed per code. Default: 3.
    pub max_attempts: u32,
    /// Session lifetime. Default: 1 hour.
    pub session_ttl: Duration,
    /// When set, every issued code is this value. For deterministic tests.
    pub fixed_code: Option<String>,
}

impl Default for MemoryProviderConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::minutes(5),
            max_attempts: 3,
            session_ttl: Duration::hours(1),
            fixed_code: None,
        }
    }
}

/// In-memory identity provider.
///
/// Enforces the rules the hosted service enforces: codes are single-use,
/// expire, and allow a bounded number of attempts; password updates need a
/// live session; signing in with an unverified address is rejected with
/// the structured `EmailNotConfirmed` code.
#[derive(Clone)]
pub struct MemoryProvider {
    users: Store<UserRecord>,
    codes: Arc<RwLock<HashMap<(String, OtpPurpose), IssuedCode>>>,
    exchange_codes: Store<String>,
    outbox: Arc<RwLock<Vec<CodeDelivery>>>,
    sessions: Arc<SessionStore>,
    config: MemoryProviderConfig,
}

impl MemoryProvider {
    /// Creates a provider with default configuration.
    pub fn new() -> Self {
        Self::with_config(MemoryProviderConfig::default())
    }

    /// Creates a provider with the given configuration.
    pub fn with_config(config: MemoryProviderConfig) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            codes: Arc::new(RwLock::new(HashMap::new())),
            exchange_codes: Arc::new(RwLock::new(HashMap::new())),
            outbox: Arc::new(RwLock::new(Vec::new())),
            sessions: Arc::new(SessionStore::new()),
            config,
        }
    }

    /// Creates a provider that always issues `code`. For tests.
    pub fn with_fixed_code(code: impl Into<String>) -> Self {
        Self::with_config(MemoryProviderConfig {
            fixed_code: Some(code.into()),
            ..MemoryProviderConfig::default()
        })
    }

    /// The session store backing this provider.
    pub fn session_store(&self) -> Arc<SessionStore> {
        Arc::clone(&self.sessions)
    }

    /// Registers a user.
    pub async fn seed_user(&self, email: &str, password: &str, email_verified: bool) -> User {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            email_verified,
        };
        let mut users = self.users.write().await;
        users.insert(
            email.to_string(),
            UserRecord {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        user
    }

    /// Everything delivered so far, oldest first.
    pub async fn outbox(&self) -> Vec<CodeDelivery> {
        self.outbox.read().await.clone()
    }

    /// The most recent code delivered to `email` for `purpose`.
    pub async fn last_code_for(&self, email: &str, purpose: OtpPurpose) -> Option<String> {
        let outbox = self.outbox.read().await;
        outbox
            .iter()
            .rev()
            .find(|d| d.email == email && d.purpose == purpose)
            .map(|d| d.code.clone())
    }

    /// Issues a one-time exchange code for `email`, as a recovery link
    /// would carry. Consuming it establishes a session for that user.
    pub async fn issue_exchange_code(&self, email: &str) -> String {
        let code = uuid::Uuid::new_v4().to_string();
        let mut exchange = self.exchange_codes.write().await;
        exchange.insert(code.clone(), email.to_string());
        code
    }

    /// Clears all stored data.
    pub async fn clear(&self) {
        self.users.write().await.clear();
        self.codes.write().await.clear();
        self.exchange_codes.write().await.clear();
        self.outbox.write().await.clear();
        self.sessions.clear().await;
    }

    fn generate_code(&self) -> String {
        if let Some(fixed) = &self.config.fixed_code {
            return fixed.clone();
        }
        let mut rng = rand::thread_rng();
        (0..6)
            .map(|_| DIGITS[rng.gen_range(0..DIGITS.len())] as char)
            .collect()
    }

    async fn issue_session(&self, user: User, kind: AuthEventKind) -> Session {
        let session = Session::new(
            uuid::Uuid::new_v4().to_string(),
            uuid::Uuid::new_v4().to_string(),
        )
        .with_user(user)
        .with_expiry(Utc::now() + self.config.session_ttl);
        self.sessions.establish(session.clone(), kind).await;
        session
    }

    async fn user_by_email(&self, email: &str) -> Option<User> {
        let users = self.users.read().await;
        users.get(email).map(|r| r.user.clone())
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryProvider {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let record = {
            let users = self.users.read().await;
            users.get(email).cloned()
        };
        let Some(record) = record else {
            return Err(AuthError::InvalidCredentials);
        };
        if record.password != password {
            return Err(AuthError::InvalidCredentials);
        }
        if !record.user.email_verified {
            return Err(AuthError::EmailNotConfirmed);
        }
        Ok(self.issue_session(record.user, AuthEventKind::SignedIn).await)
    }

    async fn send_code(&self, email: &str, purpose: OtpPurpose) -> AuthResult<()> {
        // Unknown addresses succeed silently: the provider does not reveal
        // which emails have accounts. Nothing lands in the outbox.
        if self.user_by_email(email).await.is_none() {
            tracing::debug!(email, "code requested for unknown address");
            return Ok(());
        }

        let code = self.generate_code();
        let issued = IssuedCode {
            code: code.clone(),
            expires_at: Utc::now() + self.config.code_ttl,
            attempts: 0,
            max_attempts: self.config.max_attempts,
            used: false,
        };
        // Re-sending replaces any previous code for the same purpose.
        let mut codes = self.codes.write().await;
        codes.insert((email.to_string(), purpose), issued);

        let mut outbox = self.outbox.write().await;
        outbox.push(CodeDelivery {
            email: email.to_string(),
            code,
            purpose,
            sent_at: Utc::now(),
        });
        Ok(())
    }

    async fn verify_code(
        &self,
        email: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> AuthResult<Option<Session>> {
        let key = (email.to_string(), purpose);
        {
            let mut codes = self.codes.write().await;
            let Some(issued) = codes.get_mut(&key) else {
                return Err(AuthError::CodeRejected);
            };
            if issued.used || issued.is_expired() || issued.attempts >= issued.max_attempts {
                return Err(AuthError::CodeRejected);
            }
            issued.attempts += 1;
            if issued.code != code {
                return Err(AuthError::CodeRejected);
            }
            issued.used = true;
        }

        let Some(user) = self.user_by_email(email).await else {
            return Err(AuthError::CodeRejected);
        };

        let (user, kind) = match purpose {
            OtpPurpose::Recovery => (user, AuthEventKind::PasswordRecovery),
            OtpPurpose::SignUp | OtpPurpose::EmailVerification => {
                let verified = {
                    let mut users = self.users.write().await;
                    let record = users
                        .get_mut(email)
                        .ok_or(AuthError::CodeRejected)?;
                    record.user.email_verified = true;
                    record.user.clone()
                };
                (verified, AuthEventKind::SignedIn)
            }
        };
        Ok(Some(self.issue_session(user, kind).await))
    }

    async fn current_session(&self) -> AuthResult<Option<Session>> {
        Ok(self.sessions.get().await)
    }

    async fn update_password(&self, new_password: &str) -> AuthResult<()> {
        let Some(session) = self.sessions.get().await else {
            return Err(AuthError::SessionMissing);
        };
        let email = session
            .user
            .as_ref()
            .map(|u| u.email.clone())
            .ok_or(AuthError::SessionMissing)?;

        let mut users = self.users.write().await;
        let record = users
            .get_mut(&email)
            .ok_or_else(|| AuthError::unexpected("session user no longer exists"))?;
        record.password = new_password.to_string();
        drop(users);

        self.sessions
            .emit(AuthEvent::with_session(AuthEventKind::UserUpdated, session));
        Ok(())
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.sessions.tear_down().await;
        Ok(())
    }

    async fn exchange_code_for_session(&self, code: &str) -> AuthResult<Session> {
        let email = {
            let mut exchange = self.exchange_codes.write().await;
            exchange.remove(code)
        };
        let Some(email) = email else {
            return Err(AuthError::CodeRejected);
        };
        let user = self
            .user_by_email(&email)
            .await
            .ok_or(AuthError::CodeRejected)?;
        Ok(self
            .issue_session(user, AuthEventKind::PasswordRecovery)
            .await)
    }

    async fn set_session(&self, access_token: &str, refresh_token: &str) -> AuthResult<Session> {
        // Token pairs arriving through a recovery URL are trusted as-is,
        // the way the hosted client SDK trusts them.
        let session = Session::new(access_token, refresh_token)
            .with_expiry(Utc::now() + self.config.session_ttl);
        self.sessions
            .establish(session.clone(), AuthEventKind::SignedIn)
            .await;
        Ok(session)
    }

    fn subscribe(&self) -> AuthEventStream {
        self.sessions.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_code_round_trip() {
        let provider = MemoryProvider::new();
        provider.seed_user("user@example.com", "Abcdefg1", true).await;

        provider
            .send_code("user@example.com", OtpPurpose::Recovery)
            .await
            .unwrap();
        let code = provider
            .last_code_for("user@example.com", OtpPurpose::Recovery)
            .await
            .unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let session = provider
            .verify_code("user@example.com", &code, OtpPurpose::Recovery)
            .await
            .unwrap()
            .unwrap();
        assert!(session.user.is_some());
        assert!(provider.current_session().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let provider = MemoryProvider::with_fixed_code("123456");
        provider.seed_user("user@example.com", "Abcdefg1", true).await;
        provider
            .send_code("user@example.com", OtpPurpose::Recovery)
            .await
            .unwrap();

        provider
            .verify_code("user@example.com", "123456", OtpPurpose::Recovery)
            .await
            .unwrap();
        let second = provider
            .verify_code("user@example.com", "123456", OtpPurpose::Recovery)
            .await;
        assert!(matches!(second, Err(AuthError::CodeRejected)));
    }

    #[tokio::test]
    async fn test_attempt_limit() {
        let provider = MemoryProvider::with_fixed_code("123456");
        provider.seed_user("user@example.com", "Abcdefg1", true).await;
        provider
            .send_code("user@example.com", OtpPurpose::Recovery)
            .await
            .unwrap();

        for _ in 0..3 {
            let wrong = provider
                .verify_code("user@example.com", "000000", OtpPurpose::Recovery)
                .await;
            assert!(wrong.is_err());
        }
        // Attempts exhausted: even the right code is rejected now.
        let exhausted = provider
            .verify_code("user@example.com", "123456", OtpPurpose::Recovery)
            .await;
        assert!(matches!(exhausted, Err(AuthError::CodeRejected)));
    }

    #[tokio::test]
    async fn test_wrong_purpose_is_rejected() {
        let provider = MemoryProvider::with_fixed_code("123456");
        provider.seed_user("user@example.com", "Abcdefg1", true).await;
        provider
            .send_code("user@example.com", OtpPurpose::Recovery)
            .await
            .unwrap();

        let wrong_purpose = provider
            .verify_code("user@example.com", "123456", OtpPurpose::EmailVerification)
            .await;
        assert!(matches!(wrong_purpose, Err(AuthError::CodeRejected)));
    }

    #[tokio::test]
    async fn test_unknown_email_sends_nothing_but_succeeds() {
        let provider = MemoryProvider::new();
        provider
            .send_code("nobody@example.com", OtpPurpose::Recovery)
            .await
            .unwrap();
        assert!(provider.outbox().await.is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_unverified_email() {
        let provider = MemoryProvider::new();
        provider
            .seed_user("new@example.com", "Abcdefg1", false)
            .await;

        let result = provider.sign_in("new@example.com", "Abcdefg1").await;
        assert!(matches!(result, Err(AuthError::EmailNotConfirmed)));
    }

    #[tokio::test]
    async fn test_sign_in_bad_password() {
        let provider = MemoryProvider::new();
        provider.seed_user("user@example.com", "Abcdefg1", true).await;

        let result = provider.sign_in("user@example.com", "wrong").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_verification_marks_email_verified() {
        let provider = MemoryProvider::with_fixed_code("654321");
        provider
            .seed_user("new@example.com", "Abcdefg1", false)
            .await;
        provider
            .send_code("new@example.com", OtpPurpose::EmailVerification)
            .await
            .unwrap();
        provider
            .verify_code("new@example.com", "654321", OtpPurpose::EmailVerification)
            .await
            .unwrap();

        provider.sign_out().await.unwrap();
        // Now the password sign-in goes through.
        assert!(provider.sign_in("new@example.com", "Abcdefg1").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_password_requires_session() {
        let provider = MemoryProvider::new();
        provider.seed_user("user@example.com", "Abcdefg1", true).await;

        let result = provider.update_password("Newpass1").await;
        assert!(matches!(result, Err(AuthError::SessionMissing)));
    }

    #[tokio::test]
    async fn test_exchange_code_is_single_use() {
        let provider = MemoryProvider::new();
        provider.seed_user("user@example.com", "Abcdefg1", true).await;
        let code = provider.issue_exchange_code("user@example.com").await;

        assert!(provider.exchange_code_for_session(&code).await.is_ok());
        assert!(provider.exchange_code_for_session(&code).await.is_err());
    }
}
