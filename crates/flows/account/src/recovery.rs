//! The forgot-password wizard.
//!
//! A four-step controller: enter the email, enter the emailed code, set a
//! new password, done. Steps only advance; the single backwards move is
//! the explicit "use a different email" action. Every remote failure is
//! caught, turned into a user-facing string and leaves the step where it
//! was; retries are always user-initiated.

use std::sync::Arc;

use workflow360_core::error::{AuthError, AuthResult};
use workflow360_core::traits::IdentityProvider;
use workflow360_core::types::OtpPurpose;
use workflow360_core::validate::{self, PasswordPolicy};

use crate::cooldown::ResendCooldown;
use crate::navigate::{Navigator, ScheduledRedirect, LOGIN_ROUTE, SUCCESS_REDIRECT_DELAY};
use crate::otp::OtpInput;

/// Seconds the resend action stays disabled after a send.
pub const RESEND_COOLDOWN_SECS: u32 = 60;

/// The wizard's screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStep {
    /// Asking for the account email.
    Email,
    /// Asking for the emailed code.
    Otp,
    /// Asking for the new password, twice.
    Password,
    /// Done; an automatic redirect to the login page is pending.
    Success,
}

/// Controller for the forgot-password wizard.
pub struct RecoveryController {
    provider: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
    policy: PasswordPolicy,
    step: RecoveryStep,
    email: String,
    otp: OtpInput,
    cooldown: ResendCooldown,
    error: Option<String>,
    loading: bool,
    redirect: Option<ScheduledRedirect>,
}

impl RecoveryController {
    /// Creates a controller on the email step.
    pub fn new(provider: Arc<dyn IdentityProvider>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            provider,
            navigator,
            policy: PasswordPolicy::default(),
            step: RecoveryStep::Email,
            email: String::new(),
            otp: OtpInput::new(),
            cooldown: ResendCooldown::idle(),
            error: None,
            loading: false,
            redirect: None,
        }
    }

    /// Replaces the default password policy.
    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The current screen.
    pub fn step(&self) -> RecoveryStep {
        self.step
    }

    /// The email the wizard is recovering, once submitted.
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

    /// True while a remote call is in flight; the UI disables inputs.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Seconds before the resend action re-enables.
    pub fn resend_available_in(&self) -> u32 {
        self.cooldown.remaining()
    }

    /// True when the resend action is enabled.
    pub fn can_resend(&self) -> bool {
        self.step == RecoveryStep::Otp && !self.cooldown.is_active()
    }

    /// True once the success screen has armed its redirect.
    pub fn redirect_pending(&self) -> bool {
        self.redirect.is_some()
    }

    /// Submits the email and requests a recovery code.
    pub async fn submit_email(&mut self, email: &str) {
        if self.loading || self.step != RecoveryStep::Email {
            return;
        }
        self.loading = true;
        self.error = None;
        let outcome = self.try_submit_email(email).await;
        if let Err(err) = outcome {
            self.error = Some(err.user_message());
        }
        self.loading = false;
    }

    async fn try_submit_email(&mut self, email: &str) -> AuthResult<()> {
        validate::validate_email(email)?;
        let email = email.trim();
        self.provider.send_code(email, OtpPurpose::Recovery).await?;
        self.email = email.to_string();
        self.step = RecoveryStep::Otp;
        self.cooldown.start(RESEND_COOLDOWN_SECS);
        tracing::debug!(email, "recovery code requested");
        Ok(())
    }

    /// Submits the entered code for verification.
    pub async fn submit_otp(&mut self) {
        if self.loading || self.step != RecoveryStep::Otp {
            return;
        }
        self.loading = true;
        self.error = None;
        let outcome = self.try_submit_otp().await;
        if let Err(err) = outcome {
            self.error = Some(err.user_message());
        }
        self.loading = false;
    }

    async fn try_submit_otp(&mut self) -> AuthResult<()> {
        let code = self.otp.code().ok_or(AuthError::IncompleteCode)?;
        let verified = self
            .provider
            .verify_code(&self.email, &code, OtpPurpose::Recovery)
            .await;
        match verified {
            // The provider must hand back a live session; a success
            // without one counts as a failed verification.
            Ok(Some(_session)) => {
                self.step = RecoveryStep::Password;
                Ok(())
            }
            Ok(None) => Err(AuthError::CodeRejected),
            // Raw provider detail is not leaked for this step.
            Err(err) => {
                tracing::debug!(error = %err, "code verification failed");
                Err(AuthError::CodeRejected)
            }
        }
    }

    /// Requests a fresh code. Ignored entirely while the cooldown runs.
    pub async fn resend(&mut self) {
        if self.loading || !self.can_resend() {
            return;
        }
        self.loading = true;
        self.error = None;
        match self
            .provider
            .send_code(&self.email, OtpPurpose::Recovery)
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

    /// Goes back to the email step to recover a different account.
    /// Clears the entered code and any error; an established session, if
    /// any, is left alone.
    pub fn use_different_email(&mut self) {
        if self.step != RecoveryStep::Otp {
            return;
        }
        self.step = RecoveryStep::Email;
        self.otp.clear();
        self.error = None;
        self.cooldown.reset();
    }

    /// Submits the new password and its confirmation.
    pub async fn submit_password(&mut self, password: &str, confirmation: &str) {
        if self.loading || self.step != RecoveryStep::Password {
            return;
        }
        self.loading = true;
        self.error = None;
        let outcome = self.try_submit_password(password, confirmation).await;
        if let Err(err) = outcome {
            self.error = Some(err.user_message());
        }
        self.loading = false;
    }

    async fn try_submit_password(&mut self, password: &str, confirmation: &str) -> AuthResult<()> {
        self.policy.validate(password)?;
        validate::validate_confirmation(password, confirmation)?;

        // The session may have expired since the code was verified;
        // re-check before touching the update endpoint.
        if self.provider.current_session().await?.is_none() {
            return Err(AuthError::SessionMissing);
        }
        self.provider.update_password(password).await?;

        // The update has committed. A failed sign-out leaves a stale
        // session behind but must not fail the recovery.
        if let Err(err) = self.provider.sign_out().await {
            tracing::warn!(error = %err, "sign-out after password update failed");
        }

        self.step = RecoveryStep::Success;
        self.redirect = Some(ScheduledRedirect::after(
            Arc::clone(&self.navigator),
            LOGIN_ROUTE,
            SUCCESS_REDIRECT_DELAY,
        ));
        Ok(())
    }
}
