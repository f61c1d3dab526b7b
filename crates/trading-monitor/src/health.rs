//! Plain-text liveness endpoint for hosting platforms that probe HTTP.

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct HealthState {
    /// e.g. `Alpaca BTC/USD Bot`
    pub label: String,
    pub timezone: Tz,
}

/// `Alpaca BTC/USD Bot Running 24/7 | 2024-03-01 15:00:00 MSK`
pub fn liveness_text(label: &str, now: DateTime<Utc>, tz: Tz) -> String {
    let local = now.with_timezone(&tz);
    format!(
        "{} Running 24/7 | {}",
        label,
        local.format("%Y-%m-%d %H:%M:%S %Z")
    )
}

async fn liveness(State(state): State<Arc<HealthState>>) -> String {
    liveness_text(&state.label, Utc::now(), state.timezone)
}

pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .with_state(Arc::new(state))
}

/// Bind and serve in the background. Binding errors are returned; serve errors
/// after startup are logged.
pub async fn spawn_health_server(
    bind: &str,
    port: u16,
    state: HealthState,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind((bind, port)).await?;
    let addr = listener.local_addr()?;
    let app = router(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Health server stopped: {}", e);
        }
    });

    info!(%addr, "Health endpoint listening");
    Ok((addr, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_liveness_text_uses_local_zone() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let text = liveness_text("Alpaca BTC/USD Bot", now, chrono_tz::Europe::Moscow);
        assert_eq!(text, "Alpaca BTC/USD Bot Running 24/7 | 2024-03-01 15:00:00 MSK");
    }

    #[tokio::test]
    async fn test_server_answers_root() {
        let state = HealthState {
            label: "Test Bot".into(),
            timezone: chrono_tz::UTC,
        };
        let (addr, handle) = spawn_health_server("127.0.0.1", 0, state).await.unwrap();

        let body = reqwest::get(format!("http://{}/", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.starts_with("Test Bot Running 24/7 | "));
        assert!(body.ends_with(" UTC"));

        let other = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
        assert_eq!(other.status(), reqwest::StatusCode::NOT_FOUND);

        handle.abort();
    }
}
