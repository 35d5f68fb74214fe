//! The access gate: a pure function from (path, session cookie) to
//! "let it through" or "send them elsewhere".
//!
//! Per request, the gate lands in one of three states:
//!
//! ```text
//!                 ┌── exempt path ──────────────→ Exempt ──────────→ Pass
//!   request ──────┤
//!                 └── gated path ─┬─ valid token → Authenticated ─┬─ /login → Redirect(/)
//!                                 │                               └─ other  → Pass
//!                                 └─ otherwise ──→ Unauthenticated ┬─ /login → Pass
//!                                                                  └─ other  → Redirect(/login?from=…)
//! ```
//!
//! A missing, corrupt, tampered or expired cookie all land in
//! `Unauthenticated`. The gate never says which.

use hrportal_session::{SESSION_COOKIE_NAME, SessionCodec, SessionError, SessionRecord};

use crate::ExemptionRules;

/// Query parameter carrying the originally requested path to the login page.
pub const RETURN_TO_PARAM: &str = "from";

/// Where a request stands after the gate has looked at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// The path bypasses authentication.
    Exempt,
    /// No usable session.
    Unauthenticated,
    /// A valid session for this principal.
    Authenticated(SessionRecord),
}

/// What to do with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Forward to the page handler unchanged.
    Pass,
    /// Respond with a redirect to this target instead of running the page.
    Redirect(String),
}

/// Enforces "sign in to see anything but the login page" and "don't show
/// the login page to someone already signed in".
///
/// Holds only read-only data. Share one instance across all requests.
#[derive(Debug, Clone)]
pub struct AccessGate {
    codec: SessionCodec,
    rules: ExemptionRules,
    login_path: String,
    logout_path: String,
    home_path: String,
    cookie_name: String,
}

impl AccessGate {
    /// Creates a gate with the default login (`/login`), logout
    /// (`/logout`) and home (`/`) paths and the default cookie name.
    ///
    /// The logout path is always exempt, whatever `rules` say, so a stale
    /// cookie can be cleared without a valid session.
    pub fn new(codec: SessionCodec, rules: ExemptionRules) -> Self {
        Self {
            codec,
            rules,
            login_path: "/login".to_string(),
            logout_path: "/logout".to_string(),
            home_path: "/".to_string(),
            cookie_name: SESSION_COOKIE_NAME.to_string(),
        }
    }

    /// Overrides the login page path.
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Overrides the logout path.
    pub fn logout_path(mut self, path: impl Into<String>) -> Self {
        self.logout_path = path.into();
        self
    }

    /// Overrides the page signed-in users land on by default.
    pub fn home_path(mut self, path: impl Into<String>) -> Self {
        self.home_path = path.into();
        self
    }

    /// Overrides the session cookie name.
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn login_page(&self) -> &str {
        &self.login_path
    }

    pub fn logout_page(&self) -> &str {
        &self.logout_path
    }

    pub fn home_page(&self) -> &str {
        &self.home_path
    }

    pub fn session_cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn rules(&self) -> &ExemptionRules {
        &self.rules
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// Works out which state a request is in.
    ///
    /// `token` is the raw session cookie value, if the request sent one.
    pub fn classify(&self, path: &str, token: Option<&str>) -> GateState {
        if path == self.logout_path || self.rules.is_exempt(path) {
            return GateState::Exempt;
        }
        match self.authenticate(token) {
            Ok(record) => GateState::Authenticated(record),
            Err(e) => {
                tracing::debug!(%path, reason = %e, "no usable session");
                GateState::Unauthenticated
            }
        }
    }

    /// Checks the session cookie value, reporting why it is unusable.
    pub fn authenticate(&self, token: Option<&str>) -> Result<SessionRecord, SessionError> {
        let token = token.ok_or(SessionError::MissingCookie)?;
        self.codec.verify(token)
    }

    /// Decides what happens to a request.
    pub fn decide(&self, path: &str, token: Option<&str>) -> GateDecision {
        let state = self.classify(path, token);
        self.decide_for(path, &state)
    }

    /// The transition table, given an already-computed state.
    pub fn decide_for(&self, path: &str, state: &GateState) -> GateDecision {
        let on_login = path == self.login_path;
        match state {
            GateState::Exempt => GateDecision::Pass,
            GateState::Unauthenticated if on_login => GateDecision::Pass,
            GateState::Unauthenticated => GateDecision::Redirect(self.login_redirect(path)),
            GateState::Authenticated(_) if on_login => {
                GateDecision::Redirect(self.home_path.clone())
            }
            GateState::Authenticated(_) => GateDecision::Pass,
        }
    }

    /// The login URL that will bring the user back to `path` afterwards,
    /// e.g. `/login?from=%2Fstaff`.
    pub fn login_redirect(&self, path: &str) -> String {
        match serde_urlencoded::to_string(&[(RETURN_TO_PARAM, path)]) {
            Ok(query) => format!("{}?{query}", self.login_path),
            Err(_) => self.login_path.clone(),
        }
    }

    /// Where to send a user after a successful login.
    ///
    /// Falls back to the home page when `from` is absent, points at the
    /// login page itself, or isn't a same-site absolute path (anything
    /// not starting with exactly one `/` could leave the site).
    pub fn resolve_return_to(&self, from: Option<&str>) -> String {
        let Some(from) = from.filter(|f| is_local_path(f)) else {
            return self.home_path.clone();
        };
        let path_only = from.split(['?', '#']).next().unwrap_or(from);
        if path_only == self.login_path {
            return self.home_path.clone();
        }
        from.to_string()
    }
}

fn is_local_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.starts_with("/\\")
        && !target.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    //! Unit tests for the gate's transition table.
    //!
    //! Naming: `test_{function}_{scenario}_{expected}`.

    use super::*;
    use hrportal_session::{Role, SessionSecret};

    // -- Helpers ----------------------------------------------------------

    fn gate() -> AccessGate {
        let codec = SessionCodec::new(SessionSecret::new("gate-secret").unwrap());
        AccessGate::new(codec, ExemptionRules::default())
    }

    fn admin() -> SessionRecord {
        SessionRecord::new("1", "Admin User", "admin@example.com", Role::Admin)
    }

    fn valid_token(gate: &AccessGate) -> String {
        gate.codec().encode(&admin())
    }

    // =====================================================================
    // classify()
    // =====================================================================

    #[test]
    fn test_classify_exempt_ignores_cookie() {
        let gate = gate();
        let token = valid_token(&gate);

        assert_eq!(gate.classify("/api/anything", None), GateState::Exempt);
        assert_eq!(gate.classify("/api/anything", Some(&token)), GateState::Exempt);
        assert_eq!(gate.classify("/favicon.ico", Some("junk")), GateState::Exempt);
    }

    #[test]
    fn test_classify_valid_token_returns_authenticated() {
        let gate = gate();
        let token = valid_token(&gate);

        assert_eq!(
            gate.classify("/staff", Some(&token)),
            GateState::Authenticated(admin())
        );
    }

    #[test]
    fn test_classify_bad_tokens_return_unauthenticated() {
        let gate = gate();
        let mut tampered = valid_token(&gate);
        tampered.push('0');

        for token in [None, Some(""), Some("not-a-token"), Some(tampered.as_str())] {
            assert_eq!(gate.classify("/staff", token), GateState::Unauthenticated);
        }
    }

    // =====================================================================
    // decide()
    // =====================================================================

    #[test]
    fn test_decide_exempt_paths_pass_without_cookie() {
        let gate = gate();

        for path in ["/api/anything", "/_next/chunk.js", "/favicon.ico"] {
            assert_eq!(gate.decide(path, None), GateDecision::Pass, "{path}");
        }
    }

    #[test]
    fn test_decide_missing_session_redirects_to_login_with_from() {
        let decision = gate().decide("/staff", None);

        assert_eq!(
            decision,
            GateDecision::Redirect("/login?from=%2Fstaff".into())
        );
    }

    #[test]
    fn test_decide_nested_path_is_fully_encoded() {
        let decision = gate().decide("/staff/3/edit", None);

        assert_eq!(
            decision,
            GateDecision::Redirect("/login?from=%2Fstaff%2F3%2Fedit".into())
        );
    }

    #[test]
    fn test_decide_valid_session_passes() {
        let gate = gate();
        let token = valid_token(&gate);

        assert_eq!(gate.decide("/staff", Some(&token)), GateDecision::Pass);
        assert_eq!(gate.decide("/", Some(&token)), GateDecision::Pass);
    }

    #[test]
    fn test_decide_login_with_session_redirects_home() {
        let gate = gate();
        let token = valid_token(&gate);

        assert_eq!(
            gate.decide("/login", Some(&token)),
            GateDecision::Redirect("/".into())
        );
    }

    #[test]
    fn test_decide_login_without_session_passes() {
        assert_eq!(gate().decide("/login", None), GateDecision::Pass);
    }

    #[test]
    fn test_decide_login_with_tampered_session_passes() {
        // A bad cookie is the same as no cookie: show the login form.
        assert_eq!(gate().decide("/login", Some("abc.def")), GateDecision::Pass);
    }

    #[test]
    fn test_decide_custom_paths() {
        let codec = SessionCodec::new(SessionSecret::new("k").unwrap());
        let gate = AccessGate::new(codec, ExemptionRules::none())
            .login_path("/auth/login")
            .home_path("/dashboard");
        let token = gate.codec().encode(&admin());

        assert_eq!(
            gate.decide("/staff", None),
            GateDecision::Redirect("/auth/login?from=%2Fstaff".into())
        );
        assert_eq!(
            gate.decide("/auth/login", Some(&token)),
            GateDecision::Redirect("/dashboard".into())
        );
        assert_eq!(
            gate.decide("/login", None),
            GateDecision::Redirect("/auth/login?from=%2Flogin".into())
        );
    }

    #[test]
    fn test_classify_logout_exempt_without_rules() {
        let codec = SessionCodec::new(SessionSecret::new("k").unwrap());
        let gate = AccessGate::new(codec, ExemptionRules::none());

        assert_eq!(gate.classify("/logout", None), GateState::Exempt);
        assert_eq!(gate.classify("/logout", Some("junk")), GateState::Exempt);
        assert_eq!(gate.decide("/logout", None), GateDecision::Pass);
    }

    #[test]
    fn test_classify_custom_logout_path_exempt() {
        let codec = SessionCodec::new(SessionSecret::new("k").unwrap());
        let gate = AccessGate::new(codec, ExemptionRules::none()).logout_path("/auth/logout");

        assert_eq!(gate.classify("/auth/logout", None), GateState::Exempt);
        assert_eq!(gate.classify("/logout", None), GateState::Unauthenticated);
    }

    // =====================================================================
    // authenticate()
    // =====================================================================

    #[test]
    fn test_authenticate_no_cookie_returns_missing_cookie() {
        assert_eq!(gate().authenticate(None), Err(SessionError::MissingCookie));
    }

    #[test]
    fn test_authenticate_reports_codec_rejection() {
        let gate = gate();

        assert_eq!(
            gate.authenticate(Some("no-separator")),
            Err(SessionError::MalformedToken("missing separator".into()))
        );
        assert_eq!(gate.authenticate(Some(&valid_token(&gate))), Ok(admin()));
    }

    // =====================================================================
    // resolve_return_to()
    // =====================================================================

    #[test]
    fn test_resolve_return_to_keeps_local_path() {
        let gate = gate();

        assert_eq!(gate.resolve_return_to(Some("/staff")), "/staff");
        assert_eq!(gate.resolve_return_to(Some("/staff?page=2")), "/staff?page=2");
    }

    #[test]
    fn test_resolve_return_to_defaults_home() {
        let gate = gate();

        for from in [None, Some(""), Some("/login"), Some("/login?from=%2F")] {
            assert_eq!(gate.resolve_return_to(from), "/", "{from:?}");
        }
    }

    #[test]
    fn test_resolve_return_to_rejects_offsite_targets() {
        let gate = gate();

        for from in [
            "https://evil.example",
            "//evil.example/x",
            "/\\evil.example",
            "staff",
            "/staff\r\nSet-Cookie: x=1",
        ] {
            assert_eq!(gate.resolve_return_to(Some(from)), "/", "{from}");
        }
    }
}
