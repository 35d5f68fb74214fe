//! End-to-end tests: login, gated pages and logout through the full router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use hrportal::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

// =========================================================================
// Helpers
// =========================================================================

async fn staff_page(Extension(record): Extension<SessionRecord>) -> String {
    format!("staff list for {}", record.email())
}

fn pages() -> Router {
    Router::new()
        .route("/", get(|| async { "dashboard" }))
        .route("/staff", get(staff_page))
}

fn dev_config() -> PortalConfig {
    PortalConfig {
        auth_secret: Some("integration-test-secret".into()),
        ..PortalConfig::default()
    }
}

fn app_with(config: PortalConfig) -> Router {
    let state = PortalState::from_config(
        &config,
        ExemptionRules::default(),
        StaticCredentials::demo_admin(),
    )
    .expect("state");
    build_router(Arc::new(state), pages())
}

fn app() -> Router {
    app_with(dev_config())
}

fn get_req(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

fn post_form(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("location header")
}

fn set_cookie(response: &Response) -> &str {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie header")
}

/// The `name=value` pair of a Set-Cookie header, as a browser would send it back.
fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap_or_default().to_string()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8")
}

async fn sign_in(app: &Router, body: &str) -> Response {
    app.clone().oneshot(post_form("/login", body)).await.expect("response")
}

// =========================================================================
// Login flow
// =========================================================================

#[tokio::test]
async fn test_full_flow_redirect_login_then_page_renders() {
    let app = app();

    let bounced = app.clone().oneshot(get_req("/staff", None)).await.unwrap();
    assert_eq!(bounced.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&bounced), "/login?from=%2Fstaff");

    let form = app.clone().oneshot(get_req("/login?from=%2Fstaff", None)).await.unwrap();
    assert_eq!(form.status(), StatusCode::OK);
    assert!(body_text(form).await.contains(r#"name="from" value="/staff""#));

    let signed_in = sign_in(
        &app,
        "email=admin%40example.com&password=admin123&from=%2Fstaff",
    )
    .await;
    assert_eq!(signed_in.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&signed_in), "/staff");
    let header = set_cookie(&signed_in);
    assert!(header.starts_with("session="));
    assert!(header.contains("HttpOnly"));
    assert!(header.contains("Max-Age=28800"));
    let cookie = cookie_pair(header);

    let page = app.clone().oneshot(get_req("/staff", Some(&cookie))).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert_eq!(body_text(page).await, "staff list for admin@example.com");
}

#[tokio::test]
async fn test_login_remember_me_uses_long_max_age() {
    let response = sign_in(&app(), "email=admin%40example.com&password=admin123&remember=on").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(set_cookie(&response).contains("Max-Age=604800"));
}

#[tokio::test]
async fn test_login_without_from_goes_home() {
    let response = sign_in(&app(), "email=admin%40example.com&password=admin123").await;

    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_login_offsite_from_goes_home() {
    let response = sign_in(
        &app(),
        "email=admin%40example.com&password=admin123&from=%2F%2Fevil.example",
    )
    .await;

    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_login_wrong_password_returns_401_with_message() {
    let response = sign_in(
        &app(),
        "email=admin%40example.com&password=wrong-one&from=%2Fstaff",
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(SET_COOKIE).is_none());
    let page = body_text(response).await;
    assert!(page.contains("Invalid email or password"));
    assert!(page.contains(r#"value="/staff""#));
}

#[tokio::test]
async fn test_login_malformed_email_returns_422() {
    let response = sign_in(&app(), "email=not-an-email&password=admin123").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("Invalid credentials"));
}

#[tokio::test]
async fn test_login_page_while_signed_in_redirects_home() {
    let app = app();
    let signed_in = sign_in(&app, "email=admin%40example.com&password=admin123").await;
    let cookie = cookie_pair(set_cookie(&signed_in));

    let response = app.oneshot(get_req("/login", Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");
}

// =========================================================================
// Session lifetime and logout
// =========================================================================

#[tokio::test]
async fn test_expired_session_is_sent_back_to_login() {
    let app = app_with(PortalConfig {
        session_max_age_secs: 0,
        ..dev_config()
    });
    let signed_in = sign_in(&app, "email=admin%40example.com&password=admin123").await;
    let cookie = cookie_pair(set_cookie(&signed_in));

    let response = app.oneshot(get_req("/staff", Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login?from=%2Fstaff");
}

#[tokio::test]
async fn test_logout_clears_cookie_and_returns_to_login() {
    let app = app();
    let signed_in = sign_in(&app, "email=admin%40example.com&password=admin123").await;
    let cookie = cookie_pair(set_cookie(&signed_in));

    let mut request = post_form("/logout", "");
    request.headers_mut().insert(COOKIE, cookie.parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let header = set_cookie(&response);
    assert!(header.starts_with("session="));
    assert!(header.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_logout_with_stale_cookie_still_clears_it() {
    let response = app()
        .oneshot(get_req("/logout", Some("session=garbage.deadbeef")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(set_cookie(&response).contains("Max-Age=0"));
}

#[tokio::test]
async fn test_cookie_from_other_deployment_is_rejected() {
    let other = app_with(PortalConfig {
        auth_secret: Some("a-completely-different-secret".into()),
        ..PortalConfig::default()
    });
    let signed_in = sign_in(&other, "email=admin%40example.com&password=admin123").await;
    let cookie = cookie_pair(set_cookie(&signed_in));

    let response = app().oneshot(get_req("/staff", Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

// =========================================================================
// Server builder
// =========================================================================

#[tokio::test]
async fn test_build_production_without_secret_fails() {
    let result = PortalServer::builder()
        .config(PortalConfig {
            environment: Environment::Production,
            ..PortalConfig::default()
        })
        .bind("127.0.0.1:0")
        .build(StaticCredentials::demo_admin())
        .await;

    assert!(matches!(
        result,
        Err(PortalError::Config(ConfigError::MissingSecret { .. }))
    ));
}

#[tokio::test]
async fn test_production_cookie_is_secure() {
    let app = app_with(PortalConfig {
        environment: Environment::Production,
        auth_secret: Some("0123456789abcdef0123456789abcdef".into()),
        ..PortalConfig::default()
    });

    let response = sign_in(&app, "email=admin%40example.com&password=admin123").await;

    assert!(set_cookie(&response).contains("Secure"));
}

#[tokio::test]
async fn test_server_over_tcp_redirects_anonymous_request() {
    let server = PortalServer::builder()
        .config(dev_config())
        .bind("127.0.0.1:0")
        .pages(pages())
        .build(StaticCredentials::demo_admin())
        .await
        .expect("server");
    let addr = server.local_addr().expect("addr");

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let serving = tokio::spawn(server.run_until(async move {
        let _ = stop_rx.await;
    }));

    let mut stream = tokio::net::TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(b"GET /staff HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .expect("write");
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read");
    let response = String::from_utf8_lossy(&raw).to_ascii_lowercase();

    assert!(response.starts_with("http/1.1 307"), "{response}");
    assert!(response.contains("location: /login?from=%2fstaff"), "{response}");

    stop_tx.send(()).expect("stop");
    serving.await.expect("join").expect("serve");
}
