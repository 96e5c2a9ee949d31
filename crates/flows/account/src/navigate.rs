//! Navigation as an injected dependency.
//!
//! Flows never touch routing machinery directly; they call through a
//! `Navigator` so tests can record where a flow tried to go.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// The login page.
pub const LOGIN_ROUTE: &str = "/auth/login";
/// The email-verification page.
pub const VERIFY_EMAIL_ROUTE: &str = "/auth/verify-email";
/// The app home after a successful sign-in.
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// How long a success screen is shown before the automatic redirect.
pub const SUCCESS_REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Route changes requested by the flows.
pub trait Navigator: Send + Sync {
    /// Navigates to `route`.
    fn navigate(&self, route: &str);
}

/// A navigation scheduled for later, cancelled by dropping the value.
///
/// Flows arm one of these when they enter their terminal state; if the
/// flow is torn down before the delay elapses, no navigation fires.
#[derive(Debug)]
pub struct ScheduledRedirect {
    task: JoinHandle<()>,
}

impl ScheduledRedirect {
    /// Navigates to `route` after `delay`.
    pub fn after(navigator: Arc<dyn Navigator>, route: impl Into<String>, delay: Duration) -> Self {
        let route = route.into();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(&route);
        });
        Self { task }
    }
}

impl Drop for ScheduledRedirect {
    fn drop(&mut self) {
        self.task.abort();
    }
}
