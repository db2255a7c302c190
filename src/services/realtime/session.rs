//! 单个 WebSocket 会话的收发循环

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::Message;
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::hub::{RealtimeHub, Subscription};
use crate::config::RealtimeConfig;
use crate::models::realtime::entities::{ClientMessage, ServerMessage};

async fn send(session: &mut actix_ws::Session, message: &ServerMessage) -> bool {
    match serde_json::to_string(message) {
        Ok(json) => session.text(json).await.is_ok(),
        Err(e) => {
            warn!("Failed to encode realtime message: {}", e);
            true
        }
    }
}

fn handle_client_text(
    hub: &RealtimeHub,
    connection_id: &str,
    text: &str,
) -> ServerMessage {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Subscribe {
            table,
            classroom_id,
        }) => {
            hub.add_subscription(
                connection_id,
                Subscription {
                    table,
                    classroom_id: classroom_id.clone(),
                },
            );
            ServerMessage::Subscribed {
                table,
                classroom_id,
            }
        }
        Ok(ClientMessage::Unsubscribe {
            table,
            classroom_id,
        }) => {
            hub.remove_subscription(
                connection_id,
                &Subscription {
                    table,
                    classroom_id: classroom_id.clone(),
                },
            );
            ServerMessage::Unsubscribed {
                table,
                classroom_id,
            }
        }
        Ok(ClientMessage::Ping) => ServerMessage::Pong,
        Err(e) => ServerMessage::Error {
            message: format!("Invalid message: {e}"),
        },
    }
}

pub async fn run_session(
    hub: Arc<RealtimeHub>,
    user_id: String,
    config: RealtimeConfig,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    let connection_id = uuid::Uuid::new_v4().to_string();
    hub.register(&connection_id, &user_id);
    let mut rx = hub.subscribe();
    info!("Realtime connected: user {} ({})", user_id, connection_id);

    let client_timeout = Duration::from_secs(config.client_timeout_secs.max(1));
    let mut heartbeat =
        tokio::time::interval(Duration::from_secs(config.heartbeat_interval_secs.max(1)));
    let mut last_seen = Instant::now();

    let reason = loop {
        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        last_seen = Instant::now();
                        let reply = handle_client_text(&hub, &connection_id, &text);
                        if !send(&mut session, &reply).await {
                            break None;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        last_seen = Instant::now();
                        if session.pong(&data).await.is_err() {
                            break None;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        last_seen = Instant::now();
                    }
                    Some(Ok(Message::Close(reason))) => break reason,
                    None => break None,
                    Some(Err(e)) => {
                        warn!("Realtime protocol error for {}: {:?}", connection_id, e);
                        break None;
                    }
                    _ => {}
                }
            }

            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        if hub.should_deliver(&connection_id, &event)
                            && !send(&mut session, &ServerMessage::Change(event)).await
                        {
                            break None;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Realtime connection {} lagged by {} events", connection_id, n);
                        let notice = ServerMessage::Error {
                            message: format!("Missed {n} changes, refetch required"),
                        };
                        if !send(&mut session, &notice).await {
                            break None;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break None,
                }
            }

            _ = heartbeat.tick() => {
                if last_seen.elapsed() > client_timeout {
                    debug!("Realtime connection {} timed out", connection_id);
                    break None;
                }
                if session.ping(b"").await.is_err() {
                    break None;
                }
            }
        }
    };

    hub.unregister(&connection_id);
    let _ = session.close(reason).await;
    info!("Realtime disconnected: user {} ({})", user_id, connection_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::realtime::entities::ChangeTable;

    #[test]
    fn test_client_messages() {
        let hub = RealtimeHub::new(&RealtimeConfig::default());
        hub.register("conn", "u1");

        let reply = handle_client_text(
            &hub,
            "conn",
            r#"{"type":"subscribe","table":"students","classroom_id":"c1"}"#,
        );
        assert!(matches!(
            reply,
            ServerMessage::Subscribed { table: ChangeTable::Students, .. }
        ));
        assert_eq!(hub.stats().subscriptions, 1);

        let reply = handle_client_text(
            &hub,
            "conn",
            r#"{"type":"unsubscribe","table":"students","classroom_id":"c1"}"#,
        );
        assert!(matches!(reply, ServerMessage::Unsubscribed { .. }));
        assert_eq!(hub.stats().subscriptions, 0);

        assert!(matches!(
            handle_client_text(&hub, "conn", r#"{"type":"ping"}"#),
            ServerMessage::Pong
        ));
        assert!(matches!(
            handle_client_text(&hub, "conn", "not json"),
            ServerMessage::Error { .. }
        ));
    }
}
