//! Per-tab authentication state and the sign-in/sign-up/sign-out operations.
//!
//! STATE MACHINE
//! =============
//! `Anonymous -> Authenticating` when `mount` finds a stored token,
//! `Authenticating -> Authenticated` when `/userinfo` answers,
//! `Authenticating -> Anonymous` on any failure (session dropped),
//! `* -> Authenticated` on a successful `sign_in`, `* -> Anonymous` on `sign_out`.
//!
//! The phase is derived from the held user and the pending check; there is no
//! separate "authenticated" flag to drift out of sync.
//!
//! ORDERING
//! ========
//! Every sign-in and sign-out advances an epoch. A mount-time check that
//! resolves after the epoch moved is discarded, so a stale `/userinfo`
//! answer can never overwrite or drop a newer session.
//!
//! ERROR HANDLING
//! ==============
//! Failures end here: they are logged and shown as notices, never returned.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{Notice, Notifier, SessionLifecycle};
use crate::config::ClientConfig;
use crate::net::api::ApiClient;
use crate::net::transport::HttpTransport;
use crate::net::types::{SignInRequest, SignInResponse, SignUpRequest, User};
use crate::routes;
use crate::token::CookieOptions;

const MSG_MISSING_FIELDS: &str = "Fill in every field!";
const MSG_SIGN_IN_OK: &str = "Signed in successfully!";
const MSG_SIGN_IN_FAILED: &str = "Could not access the platform.";
const MSG_SIGN_UP_OK: &str = "Account created successfully!";
const MSG_SIGN_UP_FAILED: &str = "Could not create the account.";

/// Observable authentication phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    epoch: u64,
    /// Epoch at which a mount-time check is outstanding.
    checking: Option<u64>,
}

/// Authentication state of one browser tab.
pub struct SessionContext {
    api: ApiClient,
    lifecycle: SessionLifecycle,
    notifier: Arc<dyn Notifier>,
    state: Mutex<SessionState>,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Build the context and its browser-mode API client.
    pub fn new(
        config: &ClientConfig,
        lifecycle: SessionLifecycle,
        notifier: Arc<dyn Notifier>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let api = ApiClient::browser(config, lifecycle.clone(), transport);
        Self { api, lifecycle, notifier, state: Mutex::new(SessionState::default()) }
    }

    /// The ambient browser-mode client; carries the session's bearer token.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn lifecycle(&self) -> &SessionLifecycle {
        &self.lifecycle
    }

    /// Lock state, dropping a held user whose token was destroyed elsewhere
    /// (e.g. by the interceptor after a rejected request).
    fn state(&self) -> MutexGuard<'_, SessionState> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.user.is_some() && self.lifecycle.store().read().is_none() {
            tracing::debug!("session token gone; dropping in-memory user");
            state.user = None;
            state.epoch += 1;
        }
        state
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().user.is_some()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        let state = self.state();
        if state.user.is_some() {
            SessionPhase::Authenticated
        } else if state.checking.is_some() {
            SessionPhase::Authenticating
        } else {
            SessionPhase::Anonymous
        }
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Restore a session from the stored token, if any.
    pub async fn mount(&self) {
        let Some(token) = self.lifecycle.store().read() else {
            tracing::debug!("no stored session token");
            return;
        };

        let epoch = {
            let mut state = self.state();
            if state.user.is_some() {
                return;
            }
            state.checking = Some(state.epoch);
            state.epoch
        };
        self.api.set_token(&token);

        let result = self.api.get::<User>("/userinfo").await;

        let mut state = self.state();
        if state.epoch != epoch {
            tracing::debug!("discarding stale session check");
            return;
        }
        state.checking = None;
        match result {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "session restored");
                state.user = Some(user);
            }
            Err(err) => {
                drop(state);
                tracing::warn!(error = %err, "session check failed");
                // A 401 was already handled by the interceptor.
                if err.status() == Some(401) {
                    self.clear_state();
                } else {
                    self.sign_out();
                }
            }
        }
    }

    /// Sign in with credentials; returns the user on success.
    pub async fn sign_in(&self, email: &str, password: &str) -> Option<User> {
        if is_blank(email) || is_blank(password) {
            self.notifier.notify(Notice::warning(MSG_MISSING_FIELDS));
            return None;
        }

        let request = SignInRequest { email, password };
        let response = match self.api.post::<_, SignInResponse>("/session", &request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "sign-in rejected");
                self.notifier.notify(Notice::error(MSG_SIGN_IN_FAILED));
                return None;
            }
        };

        self.lifecycle.store().write(&response.token, CookieOptions::default());
        let user = User { id: response.id, name: response.name, email: email.to_owned() };
        {
            let mut state = self.state();
            state.user = Some(user.clone());
            state.epoch += 1;
            state.checking = None;
        }
        self.api.set_token(&response.token);

        tracing::info!(user_id = %user.id, "signed in");
        self.notifier.notify(Notice::success(MSG_SIGN_IN_OK));
        self.lifecycle.navigate(routes::DASHBOARD);
        Some(user)
    }

    /// Register an account. Does not sign in; returns whether it succeeded.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> bool {
        if is_blank(name) || is_blank(email) || is_blank(password) {
            self.notifier.notify(Notice::warning(MSG_MISSING_FIELDS));
            return false;
        }

        let request = SignUpRequest { name, email, password };
        if let Err(err) = self.api.post_discard("/users", &request).await {
            tracing::warn!(error = %err, "sign-up rejected");
            self.notifier.notify(Notice::error(MSG_SIGN_UP_FAILED));
            return false;
        }

        tracing::info!("account created");
        self.notifier.notify(Notice::success(MSG_SIGN_UP_OK));
        self.lifecycle.navigate(routes::SIGN_IN);
        true
    }

    /// End the session and return to the sign-in page. Idempotent.
    pub fn sign_out(&self) {
        self.lifecycle.sign_out();
        self.clear_state();
    }

    fn clear_state(&self) {
        {
            let mut state = self.state();
            state.user = None;
            state.checking = None;
            state.epoch += 1;
        }
        self.api.clear_token();
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
