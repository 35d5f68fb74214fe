//! Login and logout actions, plus the sign-in page.
//!
//! The flow:
//!   1. The gate bounces an anonymous visitor to `/login?from=%2Fstaff`
//!   2. `GET /login` renders the form with `from` in a hidden field
//!   3. `POST /login` validates, calls the [`CredentialChecker`], and on
//!      success sets the session cookie and redirects back to `from`
//!   4. `POST /logout` clears the cookie and returns to `/login`

use std::sync::Arc;

use axum::Form;
use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, Html, IntoResponse, Redirect, Response};
use hrportal_session::unix_now;
use serde::Deserialize;

use crate::server::PortalState;
use crate::{AuthError, CredentialChecker};

/// Path of the sign-in page and form target.
pub const LOGIN_PATH: &str = "/login";

/// Path that clears the session.
pub const LOGOUT_PATH: &str = "/logout";

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

// ---------------------------------------------------------------------------
// Form types
// ---------------------------------------------------------------------------

/// The submitted sign-in form.
///
/// Every field defaults to empty so a stripped-down POST is reported as
/// "Invalid credentials" on the page instead of a bare 422 from the
/// extractor.
#[derive(Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Checkbox; browsers send `"on"` when ticked and nothing otherwise.
    #[serde(default)]
    pub remember: Option<String>,
    /// Where to go after signing in.
    #[serde(default)]
    pub from: Option<String>,
}

impl LoginForm {
    /// Shape checks that run before the credential check.
    pub fn validate(&self) -> Result<(), AuthError> {
        if !is_plausible_email(&self.email) {
            return Err(AuthError::InvalidInput("email"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput("password too short"));
        }
        Ok(())
    }

    /// Whether "remember me" was ticked.
    pub fn remember_me(&self) -> bool {
        self.remember.as_deref().is_some_and(|v| !v.is_empty())
    }
}

// Passwords must never show up in logs.
impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("remember", &self.remember)
            .field("from", &self.from)
            .finish()
    }
}

/// Query string of `GET /login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub from: Option<String>,
}

/// `local@domain.tld`, no whitespace, exactly one `@`.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /login` — the sign-in form.
pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    render_login_page(query.from.as_deref(), None)
}

/// `POST /login` — checks credentials and issues the session cookie.
pub async fn login_submit<C: CredentialChecker>(
    State(state): State<Arc<PortalState<C>>>,
    Form(form): Form<LoginForm>,
) -> Response {
    if let Err(e) = form.validate() {
        tracing::info!(email = %form.email, error = %e, "login form rejected");
        return login_failure(&form, &e);
    }

    let record = match state.checker.check(&form.email, &form.password).await {
        Ok(record) => record,
        Err(e) => {
            tracing::info!(email = %form.email, error = %e, "login rejected");
            return login_failure(&form, &e);
        }
    };

    let max_age = state.cookies.max_age_for(form.remember_me());
    let record = if state.embed_expiry {
        record.expiring_at(unix_now().saturating_add(max_age))
    } else {
        record
    };

    let token = state.gate.codec().encode(&record);
    let cookie = state.cookies.session_cookie(&token, max_age);
    let target = state.gate.resolve_return_to(form.from.as_deref());

    tracing::info!(
        email = %record.email(),
        role = %record.role(),
        %target,
        max_age,
        "login succeeded"
    );

    (
        AppendHeaders([(SET_COOKIE, cookie.to_string())]),
        Redirect::to(&target),
    )
        .into_response()
}

/// `GET|POST /logout` — drops the session cookie.
pub async fn logout<C: CredentialChecker>(State(state): State<Arc<PortalState<C>>>) -> Response {
    let cookie = state.cookies.removal_cookie();
    tracing::info!("session cleared");
    (
        AppendHeaders([(SET_COOKIE, cookie.to_string())]),
        Redirect::to(state.gate.login_page()),
    )
        .into_response()
}

fn login_failure(form: &LoginForm, error: &AuthError) -> Response {
    (
        error.status(),
        render_login_page(form.from.as_deref(), Some(error.user_message())),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// Renders the sign-in form. `from` is echoed into a hidden field.
pub fn render_login_page(from: Option<&str>, error: Option<&str>) -> Html<String> {
    let from = escape_html(from.unwrap_or("/"));
    let banner = error
        .map(|msg| format!(r#"<p class="error" role="alert">{}</p>"#, escape_html(msg)))
        .unwrap_or_default();

    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign In · ERP System</title></head>
<body>
<main>
<form method="post" action="{LOGIN_PATH}">
<input type="hidden" name="from" value="{from}">
<p>Welcome back!</p>
<h1>Please Sign In</h1>
{banner}
<label>Email address <input name="email" type="email" required></label>
<label>Password <input name="password" type="password" required minlength="{MIN_PASSWORD_LEN}"></label>
<label><input type="checkbox" name="remember"> Remember me</label>
<button type="submit">Sign In</button>
</form>
</main>
</body>
</html>
"#
    ))
}

/// Escapes text for use in HTML element content and quoted attributes.
///
/// Anything that came from a session record or a request must go through
/// this before it is written into a page.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
