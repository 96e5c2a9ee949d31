//! Shared test doubles: a navigator that records routes and an identity
//! provider that plays back scripted responses while counting calls.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use workflow360_account_flows::Navigator;
use workflow360_core::error::{AuthError, AuthResult};
use workflow360_core::session::{AuthEventStream, SessionStore};
use workflow360_core::traits::IdentityProvider;
use workflow360_core::types::{OtpPurpose, Session};

/// Records every route a flow navigates to.
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

/// An identity provider that answers from scripted queues.
///
/// Each operation pops the next scripted result, or falls back to a
/// benign default when the queue is empty. Call counters let tests assert
/// that an operation was (or was not) reached.
#[derive(Default)]
pub struct ScriptedProvider {
    pub send_results: Mutex<VecDeque<AuthResult<()>>>,
    pub verify_results: Mutex<VecDeque<AuthResult<Option<Session>>>>,
    pub update_results: Mutex<VecDeque<AuthResult<()>>>,
    pub session: Mutex<Option<Session>>,
    pub send_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    sessions: SessionStore,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_send(&self, result: AuthResult<()>) {
        self.send_results.lock().unwrap().push_back(result);
    }

    pub fn script_verify(&self, result: AuthResult<Option<Session>>) {
        self.verify_results.lock().unwrap().push_back(result);
    }

    pub fn script_update(&self, result: AuthResult<()>) {
        self.update_results.lock().unwrap().push_back(result);
    }

    pub fn hold_session(&self, session: Option<Session>) {
        *self.session.lock().unwrap() = session;
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    async fn sign_in(&self, _email: &str, _password: &str) -> AuthResult<Session> {
        Err(AuthError::InvalidCredentials)
    }

    async fn send_code(&self, _email: &str, _purpose: OtpPurpose) -> AuthResult<()> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        self.send_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn verify_code(
        &self,
        _email: &str,
        _code: &str,
        _purpose: OtpPurpose,
    ) -> AuthResult<Option<Session>> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .verify_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Some(Session::new("at", "rt"))));
        if let Ok(Some(session)) = &result {
            self.hold_session(Some(session.clone()));
        }
        result
    }

    async fn current_session(&self) -> AuthResult<Option<Session>> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn update_password(&self, _new_password: &str) -> AuthResult<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.update_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.hold_session(None);
        Ok(())
    }

    async fn exchange_code_for_session(&self, _code: &str) -> AuthResult<Session> {
        Err(AuthError::CodeRejected)
    }

    async fn set_session(&self, access_token: &str, refresh_token: &str) -> AuthResult<Session> {
        let session = Session::new(access_token, refresh_token);
        self.hold_session(Some(session.clone()));
        Ok(session)
    }

    fn subscribe(&self) -> AuthEventStream {
        self.sessions.subscribe()
    }
}
