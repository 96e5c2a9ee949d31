//! The resolver-driven reset-password page.
//!
//! Unlike the wizard, this page has two modes decided once on mount: if
//! the resolver finds proof of a recovery intent the user lands straight
//! on the "set new password" form; otherwise they get the "request a
//! reset link" form. An in-place update keeps the session and sends the
//! user to the dashboard.

use std::sync::Arc;

use url::Url;

use workflow360_core::error::{AuthError, AuthResult};
use workflow360_core::traits::IdentityProvider;
use workflow360_core::types::OtpPurpose;
use workflow360_core::validate::{self, PasswordPolicy};

use crate::navigate::{Navigator, ScheduledRedirect, DASHBOARD_ROUTE, SUCCESS_REDIRECT_DELAY};
use crate::resolver::{RecoverySessionResolver, ResolvedMode};

/// The page's modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStage {
    /// No recovery proof found: offer to send a reset link.
    Request,
    /// Recovery proof found: offer to set a new password.
    Update,
    /// Password updated; redirect to the dashboard is pending.
    Success,
}

/// Controller for the reset-password page.
pub struct ResetPasswordFlow {
    provider: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
    policy: PasswordPolicy,
    stage: ResetStage,
    error: Option<String>,
    notice: Option<String>,
    loading: bool,
    redirect: Option<ScheduledRedirect>,
}

impl ResetPasswordFlow {
    /// Runs the resolver against the landing URL and creates the flow in
    /// the resulting mode.
    pub async fn initialize(
        provider: Arc<dyn IdentityProvider>,
        navigator: Arc<dyn Navigator>,
        landing_url: &Url,
    ) -> Self {
        let resolver = RecoverySessionResolver::new(Arc::clone(&provider));
        let stage = match resolver.resolve(landing_url).await {
            ResolvedMode::Update(_) => ResetStage::Update,
            ResolvedMode::Request => ResetStage::Request,
        };
        tracing::debug!(?stage, "reset page resolved");
        Self {
            provider,
            navigator,
            policy: PasswordPolicy::default(),
            stage,
            error: None,
            notice: None,
            loading: false,
            redirect: None,
        }
    }

    /// The current mode.
    pub fn stage(&self) -> ResetStage {
        self.stage
    }

    /// The inline error to render, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The inline confirmation to render, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// True while a remote call is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True once the success screen has armed its redirect.
    pub fn redirect_pending(&self) -> bool {
        self.redirect.is_some()
    }

    /// Request mode: sends a recovery link/code to `email`.
    pub async fn submit_request(&mut self, email: &str) {
        if self.loading || self.stage != ResetStage::Request {
            return;
        }
        self.loading = true;
        self.error = None;
        let sent = self.try_submit_request(email).await;
        match sent {
            Ok(()) => {
                self.notice = Some(format!("Check {} for a reset link", email.trim()));
            }
            Err(err) => self.error = Some(err.user_message()),
        }
        self.loading = false;
    }

    async fn try_submit_request(&mut self, email: &str) -> AuthResult<()> {
        validate::validate_email(email)?;
        self.provider
            .send_code(email.trim(), OtpPurpose::Recovery)
            .await
    }

    /// Update mode: sets the new password in place.
    pub async fn submit_new_password(&mut self, password: &str, confirmation: &str) {
        if self.loading || self.stage != ResetStage::Update {
            return;
        }
        self.loading = true;
        self.error = None;
        let outcome = self.try_submit_new_password(password, confirmation).await;
        if let Err(err) = outcome {
            self.error = Some(err.user_message());
        }
        self.loading = false;
    }

    async fn try_submit_new_password(
        &mut self,
        password: &str,
        confirmation: &str,
    ) -> AuthResult<()> {
        self.policy.validate(password)?;
        validate::validate_confirmation(password, confirmation)?;
        if self.provider.current_session().await?.is_none() {
            return Err(AuthError::SessionMissing);
        }
        self.provider.update_password(password).await?;

        // The session stays live: the user continues into the app.
        self.stage = ResetStage::Success;
        self.redirect = Some(ScheduledRedirect::after(
            Arc::clone(&self.navigator),
            DASHBOARD_ROUTE,
            SUCCESS_REDIRECT_DELAY,
        ));
        Ok(())
    }
}
