//! Wire types for the hosted identity API.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use workflow360_core::types::{Session, User};

/// A user object as the service serializes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireUser {
    pub id: String,
    pub email: String,
    /// Set once the address has been confirmed.
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

impl From<WireUser> for User {
    fn from(wire: WireUser) -> Self {
        User {
            id: wire.id,
            email: wire.email,
            email_verified: wire.email_confirmed_at.is_some(),
        }
    }
}

/// A token-bearing success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Seconds until the access token expires.
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub user: Option<WireUser>,
}

impl TokenResponse {
    /// Converts the response into a [`Session`], resolving the relative
    /// expiry against the current clock.
    pub fn into_session(self) -> Session {
        let mut session = Session::new(self.access_token, self.refresh_token);
        if let Some(secs) = self.expires_in {
            session = session.with_expiry(Utc::now() + Duration::seconds(secs));
        }
        if let Some(user) = self.user {
            session = session.with_user(user.into());
        }
        session
    }
}

/// An error response body.
///
/// The service is inconsistent about the message field name; both are
/// accepted and the machine-readable `error_code` is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ErrorBody {
    /// The best human-readable message available.
    pub fn message(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.error_description.clone())
            .unwrap_or_else(|| "Request rejected".to_string())
    }
}
