//! Client-side validation: email shape and password strength.
//!
//! Validation failures block submission before any remote call is made.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AuthError, AuthResult};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    // local-part @ domain with at least one dot; intentionally pragmatic
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

/// Cheap pre-check used where a full format check is overkill.
pub fn looks_like_email(value: &str) -> bool {
    !value.is_empty() && value.contains('@')
}

/// Full email-format check used by the stricter flows.
pub fn validate_email(value: &str) -> AuthResult<()> {
    if EMAIL_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(AuthError::InvalidEmail)
    }
}

/// Checks that the password and its confirmation are identical.
pub fn validate_confirmation(password: &str, confirmation: &str) -> AuthResult<()> {
    if password == confirmation {
        Ok(())
    } else {
        Err(AuthError::PasswordMismatch)
    }
}

/// Password strength policy.
///
/// The Workflow360 default requires at least 8 characters with one
/// uppercase letter, one lowercase letter and one digit.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    /// Minimum password length.
    pub min_length: usize,
    /// Require at least one uppercase letter.
    pub require_uppercase: bool,
    /// Require at least one lowercase letter.
    pub require_lowercase: bool,
    /// Require at least one decimal digit.
    pub require_digit: bool,
    /// Require at least one non-alphanumeric character.
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: false,
        }
    }
}

impl PasswordPolicy {
    /// Creates the default Workflow360 policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum length.
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    /// Also requires a special character.
    pub fn require_special(mut self) -> Self {
        self.require_special = true;
        self
    }

    /// Checks `password` against the policy, reporting the first unmet
    /// requirement.
    pub fn check(&self, password: &str) -> Result<(), String> {
        if password.chars().count() < self.min_length {
            return Err(format!(
                "Password must be at least {} characters",
                self.min_length
            ));
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err("Password must contain at least one uppercase letter".to_string());
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            return Err("Password must contain at least one lowercase letter".to_string());
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err("Password must contain at least one number".to_string());
        }
        if self.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err("Password must contain at least one special character".to_string());
        }
        Ok(())
    }

    /// Like [`check`](Self::check) but mapped into `AuthError`.
    pub fn validate(&self, password: &str) -> AuthResult<()> {
        self.check(password).map_err(AuthError::weak_password)
    }
}
