use axum::extract::Path;
use axum::response::Html;
use axum::routing::get;
use axum::{Extension, Router};
use hrportal::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Wraps `body` in the shared page chrome. `body` is trusted markup;
/// `title` and everything taken from `record` are escaped here.
fn layout(record: &SessionRecord, title: &str, body: &str) -> Html<String> {
    let title = escape_html(title);
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>{title} · ERP System</title></head>
<body>
<header>
<nav><a href="/dashboard">Dashboard</a> <a href="/staff">Staff</a> <a href="/circulars">Circulars</a> <a href="/profile">Profile</a></nav>
<span>{name} ({role})</span>
<form method="post" action="/logout"><button type="submit">Sign out</button></form>
</header>
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
        name = escape_html(record.name()),
        role = record.role(),
    ))
}

async fn dashboard(Extension(record): Extension<SessionRecord>) -> Html<String> {
    layout(
        &record,
        "Dashboard",
        &format!("<p>Welcome back, {}.</p>", escape_html(record.name())),
    )
}

async fn staff_list(Extension(record): Extension<SessionRecord>) -> Html<String> {
    layout(&record, "Staff", "<p>No staff records yet.</p>")
}

async fn staff_detail(
    Extension(record): Extension<SessionRecord>,
    Path(id): Path<u32>,
) -> Html<String> {
    layout(&record, "Staff member", &format!("<p>Staff #{id}</p>"))
}

async fn circulars(Extension(record): Extension<SessionRecord>) -> Html<String> {
    layout(&record, "Circulars", "<p>No circulars have been published.</p>")
}

async fn profile(Extension(record): Extension<SessionRecord>) -> Html<String> {
    let body = format!(
        "<dl><dt>ID</dt><dd>{}</dd><dt>Email</dt><dd>{}</dd><dt>Role</dt><dd>{}</dd></dl>",
        escape_html(record.id()),
        escape_html(record.email()),
        record.role(),
    );
    layout(&record, "Profile", &body)
}

fn pages() -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/dashboard", get(dashboard))
        .route("/staff", get(staff_list))
        .route("/staff/{id}", get(staff_detail))
        .route("/circulars", get(circulars))
        .route("/profile", get(profile))
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = PortalConfig::from_env()?;
    tracing::info!(?config, "starting erp portal");

    let server = PortalServer::builder()
        .config(config)
        .pages(pages())
        .build(StaticCredentials::demo_admin())
        .await?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
        })
        .await?;
    Ok(())
}
