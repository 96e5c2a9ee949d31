//! Core data types for Workflow360 account flows.
//!
//! This module defines the canonical `Session` and `User` structs plus the
//! auth event types delivered through the session store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user of the identity provider, as far as the account flows care.
///
/// Only the fields the flow controllers actually read are modeled; the
/// provider may track much more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier assigned by the identity provider.
    pub id: String,

    /// The user's email address.
    pub email: String,

    /// Whether the email address has been verified.
    #[serde(default)]
    pub email_verified: bool,
}

impl User {
    /// Creates a new unverified user with the given ID and email.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            email_verified: false,
        }
    }

    /// Marks the email address verified.
    pub fn verified(mut self) -> Self {
        self.email_verified = true;
        self
    }
}

/// Proof of an established session: the opaque token pair issued by the
/// identity provider.
///
/// The flow controllers never inspect token contents; they only check for
/// presence or absence of a `Session` to decide whether a password update
/// is allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque access token.
    pub access_token: String,

    /// Opaque refresh token.
    pub refresh_token: String,

    /// When the access token expires, if the provider said.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// The user this session belongs to, if the provider included one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Session {
    /// Creates a session from a token pair.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: None,
            user: None,
        }
    }

    /// Attaches the owning user.
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    /// Sets the expiry timestamp.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Checks whether the session is past its expiry. Sessions without a
    /// recorded expiry are treated as live.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() > at)
    }
}

/// The purpose attached to a one-time code.
///
/// Exactly one purpose is used per flow; a code issued for one purpose
/// never verifies under another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OtpPurpose {
    /// Password recovery.
    Recovery,
    /// Account sign-up confirmation.
    SignUp,
    /// Verifying an email address on an existing account.
    EmailVerification,
}

impl OtpPurpose {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Recovery => "recovery",
            OtpPurpose::SignUp => "signup",
            OtpPurpose::EmailVerification => "email",
        }
    }

    /// Parses from the wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "recovery" => Some(OtpPurpose::Recovery),
            "signup" => Some(OtpPurpose::SignUp),
            "email" => Some(OtpPurpose::EmailVerification),
            _ => None,
        }
    }
}

/// The kind of a lifecycle event emitted by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventKind {
    /// A session was established by signing in.
    SignedIn,
    /// The session was torn down.
    SignedOut,
    /// A session was established by proving control of the account
    /// during password recovery.
    PasswordRecovery,
    /// The session's tokens were refreshed.
    TokenRefreshed,
    /// The signed-in user's profile changed (e.g. password updated).
    UserUpdated,
}

/// An auth lifecycle event, optionally carrying the session it refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    /// What happened.
    pub kind: AuthEventKind,
    /// The session involved, when one exists.
    pub session: Option<Session>,
}

impl AuthEvent {
    /// Creates an event carrying a session.
    pub fn with_session(kind: AuthEventKind, session: Session) -> Self {
        Self {
            kind,
            session: Some(session),
        }
    }

    /// Creates an event without a session.
    pub fn bare(kind: AuthEventKind) -> Self {
        Self {
            kind,
            session: None,
        }
    }

    /// True for the events that prove a recovery or sign-in succeeded
    /// *and* actually carry the resulting session.
    pub fn carries_live_session(&self) -> bool {
        matches!(
            self.kind,
            AuthEventKind::SignedIn | AuthEventKind::PasswordRecovery
        ) && self.session.is_some()
    }
}
