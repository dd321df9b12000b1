use futures_util::StreamExt;
use gloo::net::websocket::futures::WebSocket;
use gloo::net::websocket::Message;
use gloo::timers::future::TimeoutFuture;
use serde::Deserialize;
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;
use yew::Callback;

/// The realtime channel ships disabled; flip this to wire socket events
/// into the app. Kept compiled so the protocol does not rot.
pub const REALTIME_ENABLED: bool = false;

const RECONNECT_DELAY_MS: u32 = 5_000;
const MAX_RECONNECT_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaskEventPayload {
    pub id: Uuid,
    pub user_id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub shared_with: Vec<u64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum RealtimeEvent {
    #[serde(rename = "todo.created")]
    TaskCreated(TaskEventPayload),
    #[serde(rename = "todo.updated")]
    TaskUpdated(TaskEventPayload),
    #[serde(rename = "todo.deleted")]
    TaskDeleted(TaskEventPayload),
    #[serde(rename = "todo.shared")]
    TaskShared(TaskEventPayload),
}

pub fn decode_event(raw: &str) -> Result<RealtimeEvent, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn socket_url(protocol: &str, host: &str, user_id: u64) -> String {
    let scheme = if protocol == "https:" { "wss:" } else { "ws:" };
    format!("{scheme}//{host}/ws/todos/{user_id}/")
}

fn page_socket_url(user_id: u64) -> Option<String> {
    let location = web_sys::window()?.location();
    let protocol = location.protocol().ok()?;
    let host = location.host().ok()?;
    Some(socket_url(&protocol, &host, user_id))
}

/// Open the socket and pump decoded events at the app. On close or error
/// the connection is retried after a fixed delay, up to the attempt cap.
pub fn connect(user_id: u64, on_event: Callback<RealtimeEvent>) {
    let Some(url) = page_socket_url(user_id) else {
        tracing::warn!("no window location; realtime channel unavailable");
        return;
    };

    spawn_local(async move {
        let mut attempts: u32 = 0;

        loop {
            match WebSocket::open(&url) {
                Ok(socket) => {
                    tracing::info!(url = %url, "realtime channel connected");
                    attempts = 0;

                    let (_write, mut read) = socket.split();
                    while let Some(message) = read.next().await {
                        match message {
                            Ok(Message::Text(text)) => match decode_event(&text) {
                                Ok(event) => on_event.emit(event),
                                Err(error) => {
                                    tracing::warn!(error = %error, "unrecognized realtime frame");
                                }
                            },
                            Ok(Message::Bytes(_)) => {
                                tracing::warn!("ignoring binary realtime frame");
                            }
                            Err(error) => {
                                tracing::warn!(error = %error, "realtime read failed");
                                break;
                            }
                        }
                    }
                    tracing::info!("realtime channel disconnected");
                }
                Err(error) => {
                    tracing::warn!(error = %error, "realtime connect failed");
                }
            }

            attempts = attempts.saturating_add(1);
            if attempts >= MAX_RECONNECT_ATTEMPTS {
                tracing::error!(attempts, "giving up on realtime reconnection");
                return;
            }
            tracing::info!(
                attempt = attempts,
                max = MAX_RECONNECT_ATTEMPTS,
                "retrying realtime connection"
            );
            TimeoutFuture::new(RECONNECT_DELAY_MS).await;
        }
    });
}

#[cfg(test)]
mod sync_tests {
    use super::*;

    #[test]
    fn created_events_decode_with_payload() {
        let raw = r#"{
            "type": "todo.created",
            "payload": {
                "id": "5f0c1f9e-3b60-4cbb-9f0a-4dca74a2d4f1",
                "user_id": 3,
                "title": "Buy milk"
            }
        }"#;

        match decode_event(raw).expect("created event") {
            RealtimeEvent::TaskCreated(payload) => {
                assert_eq!(payload.user_id, 3);
                assert_eq!(payload.title, "Buy milk");
                assert!(payload.shared_with.is_empty());
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn shared_events_carry_the_recipient_list() {
        let raw = r#"{
            "type": "todo.shared",
            "payload": {
                "id": "5f0c1f9e-3b60-4cbb-9f0a-4dca74a2d4f1",
                "user_id": 3,
                "title": "Buy milk",
                "shared_with": [4, 9]
            }
        }"#;

        match decode_event(raw).expect("shared event") {
            RealtimeEvent::TaskShared(payload) => {
                assert_eq!(payload.shared_with, vec![4, 9]);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_event_types_are_rejected() {
        assert!(decode_event(r#"{"type": "todo.pinged", "payload": {}}"#).is_err());
        assert!(decode_event("not json").is_err());
    }

    #[test]
    fn socket_urls_follow_the_page_protocol() {
        assert_eq!(
            socket_url("https:", "tasks.example.com", 7),
            "wss://tasks.example.com/ws/todos/7/"
        );
        assert_eq!(
            socket_url("http:", "localhost:8000", 7),
            "ws://localhost:8000/ws/todos/7/"
        );
    }
}
