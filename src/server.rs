/*
    Control panel and manual trigger.

    GET /          status dashboard with the recent archive volume
    POST /post-now fire-and-forget cycle trigger

    The trigger acknowledges that a cycle started, never that it
    succeeded; outcomes land on the dashboard.
*/

use crate::archive;
use crate::pipeline::CycleRunner;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::Duration;

pub fn router(runner: Arc<CycleRunner>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/post-now", post(post_now))
        .with_state(runner)
}

/// Serve the control panel until the shutdown flag drops.
pub async fn serve(
    runner: Arc<CycleRunner>,
    addr: &str,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Control panel listening on {}", addr);

    axum::serve(listener, router(runner))
        .with_graceful_shutdown(async move {
            while running.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        })
        .await?;
    Ok(())
}

async fn home(State(runner): State<Arc<CycleRunner>>) -> Html<String> {
    let status = runner.status.snapshot().await;
    let recent = archive::read_recent(Path::new(&runner.args().archive_file), 3);

    let last_run = status
        .last_run
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let outcome = status.last_outcome.unwrap_or_else(|| "-".to_string());
    let busy = if runner.is_busy() {
        " (cycle in flight)"
    } else {
        ""
    };

    let mut volume = String::new();
    for entry in recent.iter().rev() {
        let header = entry.lines().next().unwrap_or("");
        volume.push_str(&format!("<li>{}</li>", escape(header)));
    }
    if volume.is_empty() {
        volume.push_str("<li>archive is empty</li>");
    }

    Html(format!(
        "<html>\n\
         <head><title>NPC Forge</title></head>\n\
         <body style=\"text-align:center; padding-top:50px; font-family:sans-serif;\">\n\
         <h1>NPC Forge Control Panel</h1>\n\
         <p>Stage: {}{}</p>\n\
         <p>Last run: {}</p>\n\
         <p>Last outcome: {}</p>\n\
         <p>Completed: {} | Failed: {}</p>\n\
         <form action=\"/post-now\" method=\"post\">\n\
         <button style=\"font-size:24px; padding:10px 30px;\" type=\"submit\">Post NPC Now</button>\n\
         </form>\n\
         <h2>Recent characters</h2>\n\
         <ul style=\"list-style:none;\">{}</ul>\n\
         </body>\n\
         </html>",
        status.stage,
        busy,
        escape(&last_run),
        escape(&outcome),
        status.cycles_completed,
        status.cycles_failed,
        volume,
    ))
}

async fn post_now(State(runner): State<Arc<CycleRunner>>) -> (StatusCode, &'static str) {
    if runner.try_start() {
        info!("Manual trigger accepted");
        (StatusCode::ACCEPTED, "cycle triggered")
    } else {
        (StatusCode::CONFLICT, "busy, try later")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
