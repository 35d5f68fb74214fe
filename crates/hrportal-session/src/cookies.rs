//! Session cookie construction and extraction.
//!
//! The token is stored in a single `HttpOnly` cookie. Its lifetime is
//! enforced by the browser through `Max-Age`; when an expiry is also
//! embedded in the payload, the codec enforces it independently.

use cookie::{Cookie, SameSite};
use cookie::time::Duration;

/// Default cookie name.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Default session lifetime: 8 hours.
pub const DEFAULT_MAX_AGE_SECS: u64 = 60 * 60 * 8;

/// Lifetime when "remember me" is ticked at login: 7 days.
pub const REMEMBER_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 7;

/// Attributes for the session cookie.
#[derive(Debug, Clone)]
pub struct SessionCookieConfig {
    /// Cookie name (default: `"session"`).
    pub name: String,
    /// Cookie path (default: `"/"`).
    pub path: String,
    /// SameSite policy (default: `Lax`, so the cookie survives top-level
    /// navigations back from other sites).
    pub same_site: SameSite,
    /// Whether to set the `Secure` flag. Turn on when served over TLS.
    pub secure: bool,
    /// Lifetime of a normal session, in seconds.
    pub max_age_secs: u64,
    /// Lifetime of a "remember me" session, in seconds.
    pub remember_max_age_secs: u64,
}

impl Default for SessionCookieConfig {
    fn default() -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            same_site: SameSite::Lax,
            secure: false,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            remember_max_age_secs: REMEMBER_MAX_AGE_SECS,
        }
    }
}

impl SessionCookieConfig {
    /// Picks the lifetime for a new session.
    pub fn max_age_for(&self, remember: bool) -> u64 {
        if remember {
            self.remember_max_age_secs
        } else {
            self.max_age_secs
        }
    }

    /// Builds the cookie that stores `token` for `max_age_secs`.
    pub fn session_cookie(&self, token: &str, max_age_secs: u64) -> Cookie<'static> {
        let secs = i64::try_from(max_age_secs).unwrap_or(i64::MAX);
        Cookie::build((self.name.clone(), token.to_string()))
            .path(self.path.clone())
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(Duration::seconds(secs))
            .build()
    }

    /// Builds a cookie that makes the browser drop the session (logout).
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name.clone(), String::new()))
            .path(self.path.clone())
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .build();
        cookie.make_removal();
        cookie
    }
}

/// Finds the session token among one or more `Cookie:` header values.
///
/// Unparseable pairs are skipped. A present-but-empty cookie counts as
/// missing.
pub fn find_session_token<'a, I>(header_values: I, name: &str) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    header_values
        .into_iter()
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
