//! axum glue: runs the gate in front of every route.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::http::header::COOKIE;
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Redirect, Response};
use hrportal_session::find_session_token;

use crate::{AccessGate, GateDecision, GateState};

/// Middleware that applies [`AccessGate`] to a request before any page
/// handler runs.
///
/// Disallowed requests are redirected and the handler is never called.
/// `GET` and `HEAD` get a `307 Temporary Redirect`; any other method gets
/// `303 See Other`, so a redirected form POST is followed with a `GET`
/// instead of being replayed at a page that only serves `GET`.
///
/// Allowed, authenticated requests carry the decoded
/// [`SessionRecord`](hrportal_session::SessionRecord) in their extensions,
/// so handlers can take `Extension<SessionRecord>`.
pub async fn access_gate_middleware(
    State(gate): State<Arc<AccessGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let token = find_session_token(
        request
            .headers()
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok()),
        gate.session_cookie_name(),
    );

    let state = gate.classify(&path, token.as_deref());
    match gate.decide_for(&path, &state) {
        GateDecision::Pass => {
            if let GateState::Authenticated(record) = state {
                request.extensions_mut().insert(record);
            }
            next.run(request).await
        }
        GateDecision::Redirect(target) => {
            tracing::debug!(
                %path,
                %target,
                method = %request.method(),
                "access gate redirect"
            );
            if matches!(*request.method(), Method::GET | Method::HEAD) {
                Redirect::temporary(&target).into_response()
            } else {
                Redirect::to(&target).into_response()
            }
        }
    }
}

/// Wraps every route of `router` (including its fallback) in the gate.
pub fn protect<S>(router: Router<S>, gate: Arc<AccessGate>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(from_fn_with_state(gate, access_gate_middleware))
}
