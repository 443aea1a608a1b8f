//! Health check endpoint

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub session_state: String,
    pub identity: Option<String>,
    pub uptime_secs: u64,
}

/// Shared state for the health endpoint
#[derive(Clone)]
pub struct AppState {
    start_time: SystemTime,
    session_state: Arc<RwLock<String>>,
    identity: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            start_time: SystemTime::now(),
            session_state: Arc::new(RwLock::new("disconnected".to_string())),
            identity: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_session(&self, state: String, identity: Option<String>) {
        *self.session_state.write().await = state;
        *self.identity.write().await = identity;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let uptime = state.start_time.elapsed().unwrap_or_default().as_secs();
    (
        StatusCode::OK,
        Json(HealthStatus {
            status: "ok".to_string(),
            session_state: state.session_state.read().await.clone(),
            identity: state.identity.read().await.clone(),
            uptime_secs: uptime,
        }),
    )
}

async fn live_handler() -> StatusCode {
    StatusCode::OK
}

/// Create the health check router
pub fn create_health_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/live", get(live_handler))
        .with_state(state)
}

/// Start the health check server
pub async fn start_health_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_health_router(state);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Health check server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_app_state_starts_disconnected() {
        let state = AppState::new();
        assert_eq!(*state.session_state.read().await, "disconnected");
        assert!(state.identity.read().await.is_none());
    }

    #[tokio::test]
    async fn test_set_session_updates_both_fields() {
        let state = AppState::new();
        state
            .set_session("active".to_string(), Some("AIBot_1234".to_string()))
            .await;
        assert_eq!(*state.session_state.read().await, "active");
        assert_eq!(
            *state.identity.read().await,
            Some("AIBot_1234".to_string())
        );
    }

    #[test]
    fn test_health_status_serde() {
        let status = HealthStatus {
            status: "ok".to_string(),
            session_state: "active".to_string(),
            identity: Some("AIBot_1234".to_string()),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&status).unwrap();
        let back: HealthStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back.session_state, "active");
        assert_eq!(back.uptime_secs, 42);
    }
}
