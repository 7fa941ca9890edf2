//! WebSocket endpoint streaming change events of one channel.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::Query;
use axum::response::{IntoResponse, Response};
use contracts::domain::a001_page::aggregate::Page;
use contracts::domain::a002_nav_item::aggregate::NavItem;
use contracts::domain::common::AggregateRoot;
use contracts::shared::realtime::ChangeEvent;
use serde::Deserialize;
use tokio::sync::broadcast;

use super::feed::feed;
use crate::shared::error::CmsError;

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub channel: String,
}

/// Channels clients may subscribe to.
fn known_channels() -> [String; 2] {
    [Page::realtime_channel(), NavItem::realtime_channel()]
}

/// GET /api/realtime?channel=public:pages
pub async fn ws_handler(ws: WebSocketUpgrade, Query(query): Query<SubscribeQuery>) -> Response {
    if !known_channels().contains(&query.channel) {
        return CmsError::Validation(format!("Unknown realtime channel '{}'", query.channel))
            .into_response();
    }
    let channel = query.channel;
    ws.on_upgrade(move |socket| handle_socket(socket, channel))
}

async fn handle_socket(mut socket: WebSocket, channel: String) {
    let mut receiver: broadcast::Receiver<ChangeEvent> = feed().subscribe();
    tracing::debug!("Realtime subscriber joined {}", channel);

    loop {
        tokio::select! {
            result = receiver.recv() => {
                match result {
                    Ok(event) if event.channel == channel => {
                        let Ok(msg) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if socket.send(Message::Text(msg)).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Realtime subscriber on {} skipped {} event(s)", channel, skipped);
                    }
                }
            }
            // client messages only keep the connection alive
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!("Realtime subscriber left {}", channel);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_channels() {
        let channels = known_channels();
        assert!(channels.contains(&"public:pages".to_string()));
        assert!(channels.contains(&"public:nav_items".to_string()));
    }
}
