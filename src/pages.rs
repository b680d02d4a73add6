//! Server-rendered pages behind the route guards.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each GET handler wraps its page loader in a guard and returns the
//! request's cookie jar with the response, so a token purged mid-render also
//! clears the browser cookie. `/` and `/signup` are guest pages; `/dashboard`
//! and `/product` need a session. `/product` loads categories from the
//! backend with a server-mode client.
//!
//! FORMS
//! =====
//! The sign-in and sign-up forms post back to their own route. The handler
//! runs a [`SessionContext`] bound to the request's cookies, so a successful
//! sign-in writes the token cookie on the response. Where the session
//! navigates becomes a `303 See Other`; otherwise the form is rendered again
//! with the latest notice.
//!
//! ERROR HANDLING
//! ==============
//! Loader failures that are not token invalidity render `502 Bad Gateway`.

#[cfg(test)]
#[path = "pages_test.rs"]
mod pages_test;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::guard::{self, PageResult};
use crate::net::api::ApiClient;
use crate::net::transport::HttpTransport;
use crate::net::types::Category;
use crate::routes;
use crate::session::context::SessionContext;
use crate::session::{LogNotifier, Navigator, Notice, Notifier, SessionLifecycle};
use crate::token::RequestCookies;
use crate::views;

/// State shared by page handlers.
#[derive(Clone)]
pub struct PagesState {
    pub config: ClientConfig,
    pub transport: Arc<dyn HttpTransport>,
    /// Directory served at `/pkg` (the browser bundle).
    pub pkg_dir: PathBuf,
}

/// Page routes, form submissions and bundle assets with request tracing.
pub fn router(state: PagesState) -> Router {
    let bundle = ServeDir::new(&state.pkg_dir);
    Router::new()
        .route(routes::SIGN_IN, get(sign_in_page).post(sign_in_submit))
        .route(routes::SIGN_UP, get(sign_up_page).post(sign_up_submit))
        .route(routes::DASHBOARD, get(dashboard_page))
        .route(routes::PRODUCT, get(product_page))
        .nest_service("/pkg", bundle)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// PAGES
// =============================================================================

async fn sign_in_page(jar: CookieJar) -> Response {
    let cookies = RequestCookies::new(jar);
    let result = guard::require_guest(&cookies, || async {
        Ok::<_, ApiError>(PageResult::Props(Html(views::sign_in(None))))
    })
    .await;
    respond(&cookies, result)
}

async fn sign_up_page(jar: CookieJar) -> Response {
    let cookies = RequestCookies::new(jar);
    let result = guard::require_guest(&cookies, || async {
        Ok::<_, ApiError>(PageResult::Props(Html(views::sign_up(None))))
    })
    .await;
    respond(&cookies, result)
}

async fn dashboard_page(jar: CookieJar) -> Response {
    let cookies = RequestCookies::new(jar);
    let result = guard::require_auth(&cookies, || async {
        Ok::<_, ApiError>(PageResult::Props(Html(views::dashboard())))
    })
    .await;
    respond(&cookies, result)
}

async fn product_page(State(state): State<PagesState>, jar: CookieJar) -> Response {
    let cookies = RequestCookies::new(jar);
    let state_ref = &state;
    let store = &cookies;
    let result = guard::require_auth(&cookies, move || load_product(state_ref, store)).await;
    respond(&cookies, result)
}

async fn load_product(state: &PagesState, cookies: &RequestCookies) -> Result<PageResult<Html<String>>, ApiError> {
    let api = ApiClient::server(&state.config, cookies, state.transport.clone());
    let categories: Vec<Category> = api.get("/category").await?;
    Ok(PageResult::Props(Html(views::product(categories))))
}

fn respond<P: IntoResponse>(cookies: &RequestCookies, result: Result<PageResult<P>, ApiError>) -> Response {
    match result {
        Ok(page) => (cookies.jar(), page).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "page loader failed");
            (StatusCode::BAD_GATEWAY, cookies.jar(), Html(views::error())).into_response()
        }
    }
}

// =============================================================================
// FORMS
// =============================================================================

#[derive(Debug, Deserialize)]
struct SignInForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
struct SignUpForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn sign_in_submit(
    State(state): State<PagesState>,
    jar: CookieJar,
    Form(form): Form<SignInForm>,
) -> Response {
    let cookies = RequestCookies::new(jar);
    let submission = FormSession::open(&state, &cookies);
    let signed_in = submission.session.sign_in(&form.email, &form.password).await.is_some();
    submission.finish(&cookies, signed_in, views::sign_in)
}

async fn sign_up_submit(
    State(state): State<PagesState>,
    jar: CookieJar,
    Form(form): Form<SignUpForm>,
) -> Response {
    let cookies = RequestCookies::new(jar);
    let submission = FormSession::open(&state, &cookies);
    let created = submission.session.sign_up(&form.name, &form.email, &form.password).await;
    submission.finish(&cookies, created, views::sign_up)
}

/// A session scoped to one form submission.
struct FormSession {
    session: SessionContext,
    navigation: Arc<PendingNavigation>,
    notices: Arc<PendingNotices>,
}

impl FormSession {
    fn open(state: &PagesState, cookies: &RequestCookies) -> Self {
        let navigation = Arc::new(PendingNavigation::default());
        let notices = Arc::new(PendingNotices::default());
        let lifecycle = SessionLifecycle::new(Arc::new(cookies.clone()), navigation.clone());
        let session = SessionContext::new(&state.config, lifecycle, notices.clone(), state.transport.clone());
        Self { session, navigation, notices }
    }

    fn finish(self, cookies: &RequestCookies, succeeded: bool, render: fn(Option<Notice>) -> String) -> Response {
        if succeeded {
            if let Some(destination) = self.navigation.take() {
                return (cookies.jar(), axum::response::Redirect::to(&destination)).into_response();
            }
        }
        (cookies.jar(), Html(render(self.notices.latest()))).into_response()
    }
}

/// Records the last navigation a session requested.
#[derive(Debug, Default)]
struct PendingNavigation {
    destination: Mutex<Option<String>>,
}

impl PendingNavigation {
    fn take(&self) -> Option<String> {
        self.destination.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl Navigator for PendingNavigation {
    fn navigate(&self, path: &str) {
        *self.destination.lock().unwrap_or_else(PoisonError::into_inner) = Some(path.to_owned());
    }
}

/// Logs notices and keeps the latest one for the re-rendered form.
#[derive(Debug, Default)]
struct PendingNotices {
    latest: Mutex<Option<Notice>>,
}

impl PendingNotices {
    fn latest(&self) -> Option<Notice> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Notifier for PendingNotices {
    fn notify(&self, notice: Notice) {
        LogNotifier.notify(notice.clone());
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(notice);
    }
}
