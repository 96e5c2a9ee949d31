//! The login form.
//!
//! Mostly a pass-through to `sign_in`, with one structural check: an
//! account whose email was never confirmed is sent to the verification
//! page instead of being shown an inline error.

use std::sync::Arc;

use workflow360_core::error::AuthError;
use workflow360_core::traits::IdentityProvider;
use workflow360_core::validate;

use crate::navigate::{Navigator, DASHBOARD_ROUTE, VERIFY_EMAIL_ROUTE};

/// Controller for the login form.
pub struct LoginFlow {
    provider: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
    error: Option<String>,
    loading: bool,
}

impl LoginFlow {
    /// Creates the controller.
    pub fn new(provider: Arc<dyn IdentityProvider>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            provider,
            navigator,
            error: None,
            loading: false,
        }
    }

    /// The inline error to render, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while the sign-in call is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Submits the credentials.
    pub async fn submit(&mut self, email: &str, password: &str) {
        if self.loading {
            return;
        }
        self.loading = true;
        self.error = None;

        if !validate::looks_like_email(email) {
            self.error = Some(AuthError::InvalidEmail.user_message());
            self.loading = false;
            return;
        }
        if password.is_empty() {
            self.error = Some("Please enter your password".to_string());
            self.loading = false;
            return;
        }

        match self.provider.sign_in(email.trim(), password).await {
            Ok(_session) => self.navigator.navigate(DASHBOARD_ROUTE),
            // The one rejection handled structurally: redirect, no
            // inline message.
            Err(AuthError::EmailNotConfirmed) => {
                tracing::debug!(email, "unconfirmed email, redirecting to verification");
                self.navigator.navigate(VERIFY_EMAIL_ROUTE);
            }
            Err(err) => self.error = Some(err.user_message()),
        }
        self.loading = false;
    }
}
