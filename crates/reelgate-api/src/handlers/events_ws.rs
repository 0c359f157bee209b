//! WebSocket endpoint for tenant lifecycle events
//!
//! A client joins exactly one tenant partition, fixed by the URL path and
//! checked against its credential at upgrade time. After the join
//! acknowledgment the channel is server-push only: `started` and `completed`
//! events as JSON text frames. Dropping the socket is the unsubscribe.

use crate::auth::models::TenantContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast;

pub async fn events_ws(
    tenant_ctx: TenantContext,
    Path(tenant): Path<String>,
    State(state): State<Arc<AppState>>,
    upgrade: WebSocketUpgrade,
) -> Result<Response, HttpAppError> {
    tenant_ctx.require_tenant(&tenant).map_err(HttpAppError)?;

    Ok(upgrade.on_upgrade(move |socket| handle_socket(socket, state, tenant)))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, tenant: String) {
    // Subscribe before acknowledging so nothing published after the join
    // message is missed.
    let mut rx = state.events.subscribe(&tenant).await;

    let joined = json!({ "kind": "joined", "tenant_id": tenant }).to_string();
    if socket.send(Message::Text(joined.into())).await.is_err() {
        return;
    }

    tracing::debug!(tenant_id = %tenant, "Event subscriber joined");

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        let payload = match serde_json::to_string(&event) {
                            Ok(payload) => payload,
                            Err(err) => {
                                tracing::error!(error = %err, "Failed to serialize event");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(
                            tenant_id = %tenant,
                            missed,
                            "Event subscriber lagged"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            message = socket.recv() => {
                match message {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = socket.send(Message::Pong(data)).await;
                    }
                    Some(Err(_)) => break,
                    // The join is implicit in the URL; client frames carry
                    // no further semantics.
                    _ => {}
                }
            }
        }
    }

    tracing::debug!(tenant_id = %tenant, "Event subscriber disconnected");
}
