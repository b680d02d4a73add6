//! Leptos views for the server-rendered pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every page renders to a complete HTML document. The document loads the
//! browser bundle from `/pkg`, whose entry point runs the tab's mount-time
//! session check. Forms post back to their own route, where the host drives
//! the session operations.

#[cfg(test)]
#[path = "views_test.rs"]
mod views_test;

use leptos::prelude::*;

use crate::net::types::Category;
use crate::routes;
use crate::session::{Notice, NoticeLevel};

/// Module script that loads the browser bundle and calls its entry point.
const BOOT_SCRIPT: &str = r#"import init, { hydrate } from "/pkg/ordersystem.js"; init().then(hydrate);"#;

pub fn sign_in(notice: Option<Notice>) -> String {
    document("Sign in", view! { <SignInForm notice=notice/> })
}

pub fn sign_up(notice: Option<Notice>) -> String {
    document("Sign up", view! { <SignUpForm notice=notice/> })
}

pub fn dashboard() -> String {
    document("Dashboard", view! { <Dashboard/> })
}

pub fn product(categories: Vec<Category>) -> String {
    document("New product", view! { <ProductForm categories=categories/> })
}

pub fn error() -> String {
    document(
        "Error",
        view! {
            <main class="error-page">
                <h1>"Something went wrong loading this page."</h1>
            </main>
        },
    )
}

fn document(title: &str, body: impl IntoView + 'static) -> String {
    let title = format!("{title} - OrderSystem");
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{title}</title>
                <script type="module" inner_html=BOOT_SCRIPT></script>
            </head>
            <body>{body}</body>
        </html>
    }
    .to_html()
}

fn notice_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "notice notice--success",
        NoticeLevel::Warning => "notice notice--warning",
        NoticeLevel::Error => "notice notice--error",
    }
}

#[component]
fn NoticeBanner(notice: Option<Notice>) -> impl IntoView {
    notice.map(|notice| {
        view! { <p class=notice_class(notice.level) role="alert">{notice.message}</p> }
    })
}

#[component]
fn SignInForm(notice: Option<Notice>) -> impl IntoView {
    view! {
        <main class="auth-page">
            <h1>"Sign in"</h1>
            <NoticeBanner notice=notice/>
            <form class="auth-form" method="post" action=routes::SIGN_IN>
                <input name="email" type="email" placeholder="Email"/>
                <input name="password" type="password" placeholder="Password"/>
                <button type="submit">"Sign in"</button>
            </form>
            <a href=routes::SIGN_UP>"No account yet? Sign up."</a>
        </main>
    }
}

#[component]
fn SignUpForm(notice: Option<Notice>) -> impl IntoView {
    view! {
        <main class="auth-page">
            <h1>"Create an account"</h1>
            <NoticeBanner notice=notice/>
            <form class="auth-form" method="post" action=routes::SIGN_UP>
                <input name="name" type="text" placeholder="Name"/>
                <input name="email" type="email" placeholder="Email"/>
                <input name="password" type="password" placeholder="Password"/>
                <button type="submit">"Sign up"</button>
            </form>
            <a href=routes::SIGN_IN>"Already have an account? Sign in."</a>
        </main>
    }
}

#[component]
fn Dashboard() -> impl IntoView {
    view! {
        <main class="dashboard-page">
            <h1>"Dashboard"</h1>
            <a href=routes::PRODUCT>"Register a product"</a>
        </main>
    }
}

#[component]
fn ProductForm(categories: Vec<Category>) -> impl IntoView {
    view! {
        <main class="product-page">
            <h1>"New product"</h1>
            <select name="category_id">
                {categories
                    .into_iter()
                    .map(|category| view! { <option value=category.id>{category.name}</option> })
                    .collect_view()}
            </select>
        </main>
    }
}
