//! Request-intercepting access gate for hrportal.
//!
//! Every incoming request passes through the gate before any page code
//! runs. The gate:
//!
//! - lets **exempt** paths (assets, APIs, public pages) straight through,
//! - sends visitors without a valid session to the login page, remembering
//!   where they were headed (`/login?from=%2Fstaff`),
//! - sends signed-in users away from the login page.
//!
//! The decision logic ([`AccessGate::decide`]) is a pure function of the
//! path and the cookie value. [`access_gate_middleware`] is the thin axum
//! wrapper around it.

mod gate;
mod middleware;
mod rules;

pub use gate::{AccessGate, GateDecision, GateState, RETURN_TO_PARAM};
pub use middleware::{access_gate_middleware, protect};
pub use rules::ExemptionRules;
