//! The email-verification flow.
//!
//! The same code widget and cooldown as the recovery wizard, over a
//! single deterministic code purpose. Verification that yields a session
//! continues into the app; without one the user is sent to log in.

use std::sync::Arc;

use workflow360_core::error::{AuthError, AuthResult};
use workflow360_core::traits::IdentityProvider;
use workflow360_core::types::OtpPurpose;

use crate::cooldown::ResendCooldown;
use crate::navigate::{
    Navigator, ScheduledRedirect, DASHBOARD_ROUTE, LOGIN_ROUTE, SUCCESS_REDIRECT_DELAY,
};
use crate::otp::OtpInput;
use crate::recovery::RESEND_COOLDOWN_SECS;

/// Controller for the email-verification page.
///
/// The page is entered with the address to verify already known (from
/// sign-up or from the login redirect).
pub struct EmailVerificationFlow {
    provider: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
    email: String,
    otp: OtpInput,
    cooldown: ResendCooldown,
    error: Option<String>,
    loading: bool,
    verified: bool,
    redirect: Option<ScheduledRedirect>,
}

impl EmailVerificationFlow {
    /// Creates the controller and requests the first code.
    pub async fn start(
        provider: Arc<dyn IdentityProvider>,
        navigator: Arc<dyn Navigator>,
        email: impl Into<String>,
    ) -> Self {
        let email = email.into();
        let mut flow = Self {
            provider,
            navigator,
            email,
            otp: OtpInput::new(),
            cooldown: ResendCooldown::idle(),
            error: None,
            loading: false,
            verified: false,
            redirect: None,
        };
        match flow
            .provider
            .send_code(&flow.email, OtpPurpose::EmailVerification)
            .await
        {
            Ok(()) => flow.cooldown.start(RESEND_COOLDOWN_SECS),
            Err(err) => flow.error = Some(err.user_message()),
        }
        flow
    }

    /// The address being verified.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The code input, for rendering and for forwarding input events.
    pub fn otp(&mut self) -> &mut OtpInput {
        &mut self.otp
    }

    /// The inline error to render, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True once the address is verified.
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// True while a remote call is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Seconds before the resend action re-enables.
    pub fn resend_available_in(&self) -> u32 {
        self.cooldown.remaining()
    }

    /// True once verification has armed its redirect.
    pub fn redirect_pending(&self) -> bool {
        self.redirect.is_some()
    }

    /// Submits the entered code.
    pub async fn submit(&mut self) {
        if self.loading || self.verified {
            return;
        }
        self.loading = true;
        self.error = None;
        let outcome = self.try_submit().await;
        if let Err(err) = outcome {
            self.error = Some(err.user_message());
        }
        self.loading = false;
    }

    async fn try_submit(&mut self) -> AuthResult<()> {
        let code = self.otp.code().ok_or(AuthError::IncompleteCode)?;
        let session = self
            .provider
            .verify_code(&self.email, &code, OtpPurpose::EmailVerification)
            .await
            .map_err(|err| {
                tracing::debug!(error = %err, "verification code rejected");
                AuthError::CodeRejected
            })?;

        self.verified = true;
        // With a session the user continues into the app; without one
        // they sign in with their now-verified address.
        let route = if session.is_some() {
            DASHBOARD_ROUTE
        } else {
            LOGIN_ROUTE
        };
        self.redirect = Some(ScheduledRedirect::after(
            Arc::clone(&self.navigator),
            route,
            SUCCESS_REDIRECT_DELAY,
        ));
        Ok(())
    }

    /// Requests a fresh code. Ignored entirely while the cooldown runs.
    pub async fn resend(&mut self) {
        if self.loading || self.verified || self.cooldown.is_active() {
            return;
        }
        self.loading = true;
        self.error = None;
        match self
            .provider
            .send_code(&self.email, OtpPurpose::EmailVerification)
            .await
        {
            Ok(()) => {
                self.otp.clear();
                self.cooldown.start(RESEND_COOLDOWN_SECS);
            }
            Err(err) => self.error = Some(err.user_message()),
        }
        self.loading = false;
    }
}
