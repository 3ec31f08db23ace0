use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use board_types::events::{BoardCommand, BoardEvent};

use crate::dispatcher::Dispatcher;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

type Subscriptions = Arc<RwLock<HashSet<String>>>;

/// Whether a connection with these subscriptions should see `event`.
/// Global events always pass; scoped ones only for subscribed principals.
pub fn should_deliver(event: &BoardEvent, subscriptions: &HashSet<String>) -> bool {
    match event.principal() {
        Some(principal) => subscriptions.contains(principal),
        None => true,
    }
}

/// Serve one event-stream client. Reads are public, so no handshake is
/// required: the client gets `Ready` and then whatever it subscribes to.
pub async fn handle_connection(socket: WebSocket, dispatcher: Dispatcher, contract_id: String) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before Ready so nothing broadcast after Ready is missed
    let mut broadcast_rx = dispatcher.subscribe();

    let ready = BoardEvent::Ready { contract_id };
    let Ok(text) = serde_json::to_string(&ready) else {
        return;
    };
    dispatcher.connection_opened();
    if sender.send(Message::Text(text.into())).await.is_err() {
        dispatcher.connection_closed();
        return;
    }
    info!("Event client connected ({} open)", dispatcher.connection_count());

    // Per-connection principal subscriptions (shared between send and recv tasks)
    let subscriptions: Subscriptions = Arc::new(RwLock::new(HashSet::new()));
    let send_subscriptions = subscriptions.clone();

    let pong_received = Arc::new(AtomicBool::new(true));
    let pong_flag_send = pong_received.clone();
    let pong_flag_recv = pong_received.clone();

    // Forward broadcasts -> client, with heartbeat
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut missed_heartbeats: u8 = 0;

        loop {
            tokio::select! {
                result = broadcast_rx.recv() => {
                    let event = match result {
                        Ok(event) => event,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            warn!("Broadcast receiver lagged by {} events", n);
                            continue;
                        }
                        Err(_) => break,
                    };

                    let deliver = match send_subscriptions.read() {
                        Ok(subs) => should_deliver(&event, &subs),
                        Err(_) => break,
                    };
                    if !deliver {
                        continue;
                    }

                    let Ok(text) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if pong_flag_send.swap(false, Ordering::Acquire) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            warn!("Heartbeat timeout (missed {} pongs), dropping connection", missed_heartbeats);
                            break;
                        }
                    }
                    if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Read commands from client
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<BoardCommand>(&text) {
                    Ok(cmd) => handle_command(cmd, &subscriptions),
                    Err(e) => {
                        warn!("Bad command: {} -- raw: {}", e, truncate(&text, 200));
                    }
                },
                Message::Pong(_) => {
                    pong_flag_recv.store(true, Ordering::Release);
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    dispatcher.connection_closed();
    info!("Event client disconnected ({} open)", dispatcher.connection_count());
}

fn handle_command(cmd: BoardCommand, subscriptions: &Subscriptions) {
    let Ok(mut subs) = subscriptions.write() else {
        return;
    };
    match cmd {
        BoardCommand::Subscribe { principals } => {
            debug!("Subscribing to {} principals", principals.len());
            subs.extend(principals.into_iter().map(|p| p.trim().to_ascii_uppercase()));
        }
        BoardCommand::Unsubscribe { principals } => {
            for p in principals {
                subs.remove(&p.trim().to_ascii_uppercase());
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
