//! Browser-side session: lifecycle capability, navigation and notices.
//!
//! ARCHITECTURE
//! ============
//! [`SessionLifecycle`] is the sign-out capability. Both the API client's
//! browser-mode interceptor and the [`context::SessionContext`] hold a clone of
//! it, so "sign out from anywhere" needs no global function. Navigation and
//! user-visible notices go through the [`Navigator`] and [`Notifier`] seams.

pub mod context;


use std::fmt;
use std::sync::Arc;

use crate::routes;
use crate::token::TokenStore;

// =============================================================================
// SEAMS
// =============================================================================

/// Moves the browser to another route.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A transient toast shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Displays notices to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that only records notices in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(message = %notice.message, "notice"),
            NoticeLevel::Warning => tracing::warn!(message = %notice.message, "notice"),
            NoticeLevel::Error => tracing::error!(message = %notice.message, "notice"),
        }
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Sign-out capability shared by everything that may end a browser session.
#[derive(Clone)]
pub struct SessionLifecycle {
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl fmt::Debug for SessionLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLifecycle").finish_non_exhaustive()
    }
}

impl SessionLifecycle {
    pub fn new(store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// The token slot this lifecycle controls.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn navigate(&self, path: &str) {
        self.navigator.navigate(path);
    }

    /// Destroy the token and return to the sign-in page.
    ///
    /// Idempotent: without a session only the navigation happens.
    pub fn sign_out(&self) {
        self.store.destroy();
        tracing::info!("session signed out");
        self.navigator.navigate(routes::SIGN_IN);
    }

    /// Sign out because the backend rejected `rejected`, unless the stored
    /// token has changed since that request was sent.
    ///
    /// Returns whether sign-out ran.
    pub fn invalidate(&self, rejected: Option<&str>) -> bool {
        if self.store.read().as_deref() != rejected {
            tracing::debug!("ignoring rejection of a superseded token");
            return false;
        }
        tracing::warn!("session token rejected by the backend");
        self.sign_out();
        true
    }
}
