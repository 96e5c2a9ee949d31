//! Error types for Workflow360 account flows.
//!
//! This module defines the `AuthError` enum covering everything that can go
//! wrong in a flow, and the mapping from each variant to the string shown
//! to the user.

use thiserror::Error;

/// The main error type for account-flow operations.
///
/// Variants are grouped by where the failure originates: client-side
/// validation, rejection by the identity provider, or transport/unexpected
/// failures. Nothing here is fatal; every error is recoverable by
/// resubmission or by navigating back a step.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================== Validation Errors ====================
    /// The email address is empty or malformed.
    #[error("Invalid email address")]
    InvalidEmail,

    /// Fewer than the required number of code digits were entered.
    #[error("Incomplete verification code")]
    IncompleteCode,

    /// The password does not meet the strength policy.
    #[error("Password does not meet requirements: {reason}")]
    WeakPassword { reason: String },

    /// The password and its confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    // ==================== Provider Rejections ====================
    /// The provider rejected the credentials.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The account exists but its email address was never confirmed.
    ///
    /// This is the one rejection the login flow matches structurally:
    /// it triggers a redirect to the verification page rather than an
    /// inline message.
    #[error("Email not confirmed")]
    EmailNotConfirmed,

    /// The one-time code was wrong, expired, already consumed, or the
    /// verify call succeeded without returning a session.
    #[error("Invalid or expired code")]
    CodeRejected,

    /// No live session exists where one is required.
    #[error("Session missing")]
    SessionMissing,

    /// Any other rejection from the provider, surfaced verbatim.
    #[error("{message}")]
    Provider { message: String },

    // ==================== Transport / Internal ====================
    /// The request never completed (connection refused, timeout, TLS...).
    #[error("Network error: {message}")]
    Network { message: String },

    /// The provider client is misconfigured.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Anything unexpected: malformed response, panic-adjacent state.
    #[error("Unexpected error: {message}")]
    Unexpected { message: String },
}

impl AuthError {
    /// Creates a weak-password error.
    pub fn weak_password(reason: impl Into<String>) -> Self {
        Self::WeakPassword {
            reason: reason.into(),
        }
    }

    /// Creates a provider rejection carrying the provider's own message.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// True for errors produced before any remote call is made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail
                | Self::IncompleteCode
                | Self::WeakPassword { .. }
                | Self::PasswordMismatch
        )
    }

    /// The string rendered inline in the UI for this error.
    ///
    /// Provider rejections pass through verbatim with two exceptions:
    /// code verification failures always collapse to the same generic
    /// message, and transport/unexpected failures collapse to a generic
    /// "something went wrong".
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail => "Please enter a valid email address".to_string(),
            Self::IncompleteCode => "Please enter the complete 6-digit code".to_string(),
            Self::WeakPassword { reason } => reason.clone(),
            Self::PasswordMismatch => "Passwords do not match".to_string(),
            Self::InvalidCredentials => "Invalid email or password".to_string(),
            Self::EmailNotConfirmed => "Please verify your email address first".to_string(),
            Self::CodeRejected => "Invalid or expired code".to_string(),
            Self::SessionMissing => "Session expired, please restart".to_string(),
            Self::Provider { message } => message.clone(),
            Self::Network { .. } | Self::Unexpected { .. } | Self::Configuration { .. } => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// A Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unexpected {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_rejection_is_generic() {
        assert_eq!(AuthError::CodeRejected.user_message(), "Invalid or expired code");
    }

    #[test]
    fn test_session_missing_message() {
        assert_eq!(
            AuthError::SessionMissing.user_message(),
            "Session expired, please restart"
        );
    }

    #[test]
    fn test_provider_message_passes_through() {
        let err = AuthError::provider("Email rate limit exceeded");
        assert_eq!(err.user_message(), "Email rate limit exceeded");
    }

    #[test]
    fn test_transport_errors_are_masked() {
        let err = AuthError::network("connection refused");
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }

    #[test]
    fn test_is_validation() {
        assert!(AuthError::InvalidEmail.is_validation());
        assert!(AuthError::IncompleteCode.is_validation());
        assert!(!AuthError::CodeRejected.is_validation());
    }
}
