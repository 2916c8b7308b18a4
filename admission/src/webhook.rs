use std::time::Instant;

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
use kcpcore_types::ClusterPath;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::validate::validate;

#[derive(Deserialize)]
pub struct AdmissionRequest {
    pub cluster: String,
    pub group: String,
    #[serde(default)]
    pub old_group: Option<String>,
}

#[derive(Serialize)]
pub struct AdmissionResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

async fn validate_handler(Json(req): Json<AdmissionRequest>) -> impl IntoResponse {
    let cluster = ClusterPath::new(req.cluster);
    match validate(&cluster, &req.group, req.old_group.as_deref()) {
        Ok(()) => (StatusCode::OK, Json(AdmissionResponse { allowed: true, reason: None })),
        Err(forbidden) => {
            println!("{} {}", "🚫 Rejected reserved-group CRD •".red(), forbidden.to_string().red().dimmed());
            (
                StatusCode::OK,
                Json(AdmissionResponse {
                    allowed: false,
                    reason: Some(forbidden.to_string()),
                }),
            )
        }
    }
}

/// Standalone validating-webhook endpoint: the idiomatic Rust shape for
/// "synchronous admission gate" outside a real apiserver binary, wired the
/// same way `kcpcore-common`'s metrics server exposes its own axum routes.
pub fn router() -> Router {
    Router::new().route("/validate", post(validate_handler))
}

/// Serves the webhook until a shutdown signal arrives, mirroring
/// `kcpcore_common::metrics::run_metrics_server`'s graceful-shutdown shape.
pub async fn serve(port: u16) {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        panic!("failed to bind admission webhook to {addr}: {e}");
    });
    println!(
        "{}{}",
        "🛡️  Starting reserved-groups admission webhook • port=".green(),
        format!("{}", port).green().dimmed(),
    );
    let started = Instant::now();
    axum::serve(listener, router())
        .with_graceful_shutdown(kcpcore_common::shutdown::shutdown_signal())
        .await
        .expect("failed to serve admission webhook");
    println!(
        "{} {}",
        "🛑 Admission webhook stopped gracefully • uptime was".red(),
        format!("{:.2?}", started.elapsed()).red().dimmed()
    );
}
