use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

use crate::engine::Command;
use crate::engine::CommandError;
use crate::vesync::VesyncClient;
use crate::SharedEngine;

/// Response for the /v1/ping endpoint
#[derive(Serialize)]
struct PingResponse {
    status: String,
}

/// Response for the /v1/info endpoint
#[derive(Serialize)]
struct InfoResponse {
    version: String,
    hostname: String,
}

/// Request body for POST /v1/command
#[derive(Deserialize)]
struct CommandRequest {
    entity_id: String,
    #[serde(flatten)]
    command: Command,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    engine: SharedEngine,
    client: Arc<dyn VesyncClient>,
    refresh_tx: mpsc::Sender<()>,
    version: &'static str,
}

/// Handler for GET /v1/ping
async fn ping() -> impl IntoResponse {
    tracing::debug!("Handling /v1/ping request");
    (
        StatusCode::OK,
        Json(PingResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Handler for GET /v1/info
async fn info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::debug!("Handling /v1/info request");

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    (
        StatusCode::OK,
        Json(InfoResponse {
            version: state.version.to_string(),
            hostname,
        }),
    )
}

/// Handler for GET /v1/devices: the latest published entity states.
async fn devices(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.engine.read().await.state_snapshot();
    (StatusCode::OK, Json((*snapshot).clone()))
}

/// Handler for POST /v1/refresh: request a vendor poll outside the regular
/// cadence. The poller applies its own debounce, so this only signals.
async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // A full channel means a refresh is already pending.
    let _ = state.refresh_tx.try_send(());
    StatusCode::ACCEPTED
}

/// Handler for POST /v1/command: translate and send one entity command.
async fn command(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CommandRequest>,
) -> impl IntoResponse {
    let requests = {
        let engine = state.engine.read().await;
        engine.handle_command(&request.entity_id, &request.command)
    };

    let requests = match requests {
        Ok(requests) => requests,
        Err(err) => {
            let status = match err {
                CommandError::UnknownEntity(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            };
            return (
                status,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response();
        }
    };

    for vendor_request in &requests {
        if let Err(err) = state.client.send(vendor_request).await {
            tracing::warn!(
                entity_id = %request.entity_id,
                error = %err,
                "vendor rejected command"
            );
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response();
        }
    }

    // Make the result visible quickly instead of waiting a full cadence.
    let _ = state.refresh_tx.try_send(());
    StatusCode::OK.into_response()
}

/// Create the API router with all endpoints
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/ping", get(ping))
        .route("/v1/info", get(info))
        .route("/v1/devices", get(devices))
        .route("/v1/refresh", post(refresh))
        .route("/v1/command", post(command))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server
///
/// Binds to the configured address and serves until the shutdown signal
/// triggers.
pub async fn serve(
    listen: String,
    port: u16,
    engine: SharedEngine,
    client: Arc<dyn VesyncClient>,
    refresh_tx: mpsc::Sender<()>,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    let state = Arc::new(AppState {
        engine,
        client,
        refresh_tx,
        version,
    });
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", listen, port).parse()?;
    tracing::info!("Starting HTTP API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            tracing::info!("HTTP API server shutting down gracefully");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_request_parses_flattened_command() {
        let request: CommandRequest = serde_json::from_str(
            r#"{"entity_id": "light.b1", "action": "set_brightness", "value": 200}"#,
        )
        .unwrap();
        assert_eq!(request.entity_id, "light.b1");
        assert_eq!(request.command, Command::SetBrightness(200));
    }
}
