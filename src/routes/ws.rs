// WebSocket /ws/sensors: full sensor list on connect, then one message per completed refresh

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::coordinator::CoordinatorUpdate;
use crate::hub::Hub;
use crate::sensors;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) async fn ws_sensors(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| async move {
        let mut rx = hub.subscribe();
        if let Err(e) = stream_sensors(socket, &mut rx, hub).await {
            tracing::info!("Sensor stream error: {}", e);
        }
    })
}

/// Sends `text`; false when the client is gone or too slow.
async fn send_text(socket: &mut WebSocket, text: String) -> bool {
    let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(text.into()))).await;
    matches!(r, Ok(Ok(())))
}

async fn stream_sensors(
    mut socket: WebSocket,
    rx: &mut broadcast::Receiver<CoordinatorUpdate>,
    hub: Arc<Hub>,
) -> anyhow::Result<()> {
    tracing::info!("Client connected to sensor stream");

    let welcome = serde_json::json!({ "type": "sensors", "sensors": hub.all_sensors().await });
    if !send_text(&mut socket, serde_json::to_string(&welcome)?).await {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(update) => {
                        // Entry may have been unloaded since the refresh completed.
                        let Some(entry) = hub.entry(&update.entry_id).await else {
                            continue;
                        };
                        let msg = serde_json::json!({
                            "type": "update",
                            "entryId": update.entry_id,
                            "sensors": sensors::sensor_states(&entry, &update.state),
                        });
                        if !send_text(&mut socket, serde_json::to_string(&msg)?).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("WebSocket /ws/sensors client lagged, skipped {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if !matches!(r, Ok(Ok(()))) {
                    break;
                }
            }
        }
    }
    Ok(())
}
