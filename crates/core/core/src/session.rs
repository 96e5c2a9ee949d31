//! The process-wide session store.
//!
//! The identity-provider session lives outside any single flow. Adapters
//! own a `SessionStore` and the flows reach it only through the provider's
//! `current_session` / `set_session` / `subscribe` operations, so it stays
//! a black box that tests can observe.

use tokio::sync::{broadcast, RwLock};

use crate::types::{AuthEvent, AuthEventKind, Session};

/// Capacity of the event channel. Subscribers that fall further behind
/// than this skip ahead rather than block the emitter.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Holds the current session and fans out auth lifecycle events.
///
/// Initialized once when the provider client is constructed and torn down
/// at sign-out. `subscribe` hands out independent receivers; dropping a
/// receiver unsubscribes it, so cleanup needs no explicit call.
#[derive(Debug)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            current: RwLock::new(None),
            events,
        }
    }

    /// Returns a clone of the current session, if one is held and not
    /// past its expiry.
    pub async fn get(&self) -> Option<Session> {
        let guard = self.current.read().await;
        guard.as_ref().filter(|s| !s.is_expired()).cloned()
    }

    /// Stores `session` as the current one.
    pub async fn set(&self, session: Session) {
        let mut guard = self.current.write().await;
        *guard = Some(session);
    }

    /// Drops the current session.
    pub async fn clear(&self) {
        let mut guard = self.current.write().await;
        *guard = None;
    }

    /// Stores `session` and emits `kind` carrying it, in one step.
    pub async fn establish(&self, session: Session, kind: AuthEventKind) {
        self.set(session.clone()).await;
        self.emit(AuthEvent::with_session(kind, session));
    }

    /// Clears the session and emits `SignedOut`.
    pub async fn tear_down(&self) {
        self.clear().await;
        self.emit(AuthEvent::bare(AuthEventKind::SignedOut));
    }

    /// Broadcasts an event to all live subscribers. Events emitted while
    /// nobody is subscribed are dropped.
    pub fn emit(&self, event: AuthEvent) {
        // send only errs when there are no receivers, which is fine
        let _ = self.events.send(event);
    }

    /// Opens a new event stream.
    pub fn subscribe(&self) -> AuthEventStream {
        AuthEventStream {
            rx: self.events.subscribe(),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A stream of auth lifecycle events.
///
/// Dropping the stream is the unsubscription; there is no explicit
/// `unsubscribe` to forget.
pub struct AuthEventStream {
    rx: broadcast::Receiver<AuthEvent>,
}

impl AuthEventStream {
    /// Waits for the next event. Returns `None` once the emitting store
    /// is gone. A subscriber that lagged behind skips the missed events
    /// and keeps going.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "auth event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_set_get_clear() {
        let store = SessionStore::new();
        assert!(store.get().await.is_none());

        store.set(Session::new("a", "r")).await;
        assert_eq!(store.get().await.unwrap().access_token, "a");

        store.clear().await;
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_reads_as_absent() {
        let store = SessionStore::new();
        store
            .set(Session::new("a", "r").with_expiry(Utc::now() - Duration::seconds(5)))
            .await;
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_establish_emits_event_with_session() {
        let store = SessionStore::new();
        let mut events = store.subscribe();

        store
            .establish(Session::new("a", "r"), AuthEventKind::PasswordRecovery)
            .await;

        let event = events.next().await.unwrap();
        assert_eq!(event.kind, AuthEventKind::PasswordRecovery);
        assert!(event.session.is_some());
        assert!(store.get().await.is_some());
    }

    #[tokio::test]
    async fn test_tear_down_emits_signed_out() {
        let store = SessionStore::new();
        store.set(Session::new("a", "r")).await;
        let mut events = store.subscribe();

        store.tear_down().await;

        let event = events.next().await.unwrap();
        assert_eq!(event.kind, AuthEventKind::SignedOut);
        assert!(event.session.is_none());
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_silent() {
        let store = SessionStore::new();
        store.emit(AuthEvent::bare(AuthEventKind::TokenRefreshed));
    }
}
