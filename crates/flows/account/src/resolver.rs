//! Discovering an existing recovery session on page load.
//!
//! A recovery landing page can already hold proof of the user's intent in
//! several shapes: a token pair in the URL fragment, a one-time exchange
//! code in the query, a bare `type=recovery` flag next to a session that
//! was established on an earlier render, or an auth event that arrives
//! moments after mount. The resolver tries each probe in that fixed order
//! and stops at the first that yields a session; the URL parsers are pure
//! functions so each strategy is testable on its own.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use workflow360_core::traits::IdentityProvider;
use workflow360_core::types::Session;

/// How long the resolver waits for an auth event before giving up.
pub const EVENT_WAIT: Duration = Duration::from_secs(1);

/// What the landing page should show.
#[derive(Debug, Clone)]
pub enum ResolvedMode {
    /// A recovery session exists; show the "set new password" form.
    Update(Session),
    /// Nothing found; show the "request a reset link" form.
    Request,
}

impl ResolvedMode {
    /// True for the update mode.
    pub fn is_update(&self) -> bool {
        matches!(self, ResolvedMode::Update(_))
    }
}

/// Extracts a recovery-tagged token pair from the URL fragment
/// (`#access_token=...&refresh_token=...&type=recovery`).
pub fn fragment_recovery_tokens(url: &Url) -> Option<(String, String)> {
    let fragment = url.fragment()?;
    let mut access = None;
    let mut refresh = None;
    let mut is_recovery = false;
    for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            "access_token" => access = Some(value.into_owned()),
            "refresh_token" => refresh = Some(value.into_owned()),
            "type" => is_recovery = value == "recovery",
            _ => {}
        }
    }
    if !is_recovery {
        return None;
    }
    Some((access?, refresh?))
}

/// Extracts a one-time exchange code from the URL query (`?code=...`).
pub fn exchange_code(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
}

/// True when the query asserts `type=recovery` without carrying a code.
pub fn has_recovery_flag(url: &Url) -> bool {
    exchange_code(url).is_none()
        && url
            .query_pairs()
            .any(|(key, value)| key == "type" && value == "recovery")
}

/// Runs the ordered probes against a landing URL.
pub struct RecoverySessionResolver {
    provider: Arc<dyn IdentityProvider>,
    event_wait: Duration,
}

impl RecoverySessionResolver {
    /// Creates a resolver with the default 1-second event wait.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            event_wait: EVENT_WAIT,
        }
    }

    /// Overrides the event-wait timeout.
    pub fn with_event_wait(mut self, wait: Duration) -> Self {
        self.event_wait = wait;
        self
    }

    /// Resolves the mode for `url`: the probes run in priority order and
    /// the first session wins.
    pub async fn resolve(&self, url: &Url) -> ResolvedMode {
        if let Some(session) = self.probe_fragment(url).await {
            return ResolvedMode::Update(session);
        }
        if let Some(session) = self.probe_exchange_code(url).await {
            return ResolvedMode::Update(session);
        }
        if let Some(session) = self.probe_recovery_flag(url).await {
            return ResolvedMode::Update(session);
        }
        if let Some(session) = self.probe_auth_event().await {
            return ResolvedMode::Update(session);
        }
        ResolvedMode::Request
    }

    /// Strategy 1: a token pair in the fragment, exchanged for a session.
    async fn probe_fragment(&self, url: &Url) -> Option<Session> {
        let (access, refresh) = fragment_recovery_tokens(url)?;
        match self.provider.set_session(&access, &refresh).await {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!(error = %err, "fragment token pair rejected");
                None
            }
        }
    }

    /// Strategy 2: a one-time code in the query, exchanged for a session.
    async fn probe_exchange_code(&self, url: &Url) -> Option<Session> {
        let code = exchange_code(url)?;
        match self.provider.exchange_code_for_session(&code).await {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!(error = %err, "exchange code rejected");
                None
            }
        }
    }

    /// Strategy 3: a bare recovery flag; usable only if a session already
    /// exists (e.g. strategy 1 ran on a previous render).
    async fn probe_recovery_flag(&self, url: &Url) -> Option<Session> {
        if !has_recovery_flag(url) {
            return None;
        }
        self.provider.current_session().await.ok().flatten()
    }

    /// Strategy 4: wait briefly for a recovery or sign-in event carrying
    /// a session. The subscription ends when the stream drops at the end
    /// of this call, on every path.
    async fn probe_auth_event(&self) -> Option<Session> {
        let mut events = self.provider.subscribe();
        let waited = tokio::time::timeout(self.event_wait, async {
            while let Some(event) = events.next().await {
                if event.carries_live_session() {
                    return event.session;
                }
            }
            None
        })
        .await;
        waited.ok().flatten()
    }
}
