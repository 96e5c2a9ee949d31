//! The identity-provider contract.
//!
//! Adapters implement `IdentityProvider` to expose the remote operations
//! the account flows orchestrate. Flow controllers hold the provider as
//! `Arc<dyn IdentityProvider>` so tests can substitute scripted fakes.

use async_trait::async_trait;

use crate::error::AuthResult;
use crate::session::AuthEventStream;
use crate::types::{OtpPurpose, Session};

/// The remote operations consumed by the account flows.
///
/// Every method is a single network round-trip against the hosted identity
/// service (or its in-memory stand-in). None of them retries internally:
/// retry is always user-initiated resubmission.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticates with email and password and establishes a session.
    ///
    /// Fails with `EmailNotConfirmed` when the account exists but its
    /// address was never verified.
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session>;

    /// Triggers delivery of a one-time code to `email` for the given
    /// purpose.
    async fn send_code(&self, email: &str, purpose: OtpPurpose) -> AuthResult<()>;

    /// Verifies a one-time code.
    ///
    /// Returns `Ok(Some(session))` when the provider verified the code and
    /// issued a session, and `Ok(None)` when the call itself reported no
    /// error but no session came back. Callers must treat `Ok(None)` as a
    /// verification failure.
    async fn verify_code(
        &self,
        email: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> AuthResult<Option<Session>>;

    /// Returns the currently held session, if any.
    async fn current_session(&self) -> AuthResult<Option<Session>>;

    /// Updates the signed-in user's password. Requires a live session.
    async fn update_password(&self, new_password: &str) -> AuthResult<()>;

    /// Tears down the current session.
    async fn sign_out(&self) -> AuthResult<()>;

    /// Exchanges a one-time code (from a recovery link) for a session.
    async fn exchange_code_for_session(&self, code: &str) -> AuthResult<Session>;

    /// Installs a session from a raw token pair (from a recovery URL
    /// fragment) and returns the established session.
    async fn set_session(&self, access_token: &str, refresh_token: &str) -> AuthResult<Session>;

    /// Subscribes to auth lifecycle events. Dropping the returned stream
    /// is the unsubscription.
    fn subscribe(&self) -> AuthEventStream;
}
