use std::sync::Arc;
use axum::{
    extract::{Path, State, ws::{Message, WebSocket, WebSocketUpgrade}},
    response::{IntoResponse, Response},
};
use tokio::sync::mpsc;
use tracing::{debug, info, error, warn};
use futures_util::{StreamExt, SinkExt};

use crate::collab::{ClientId, CollabError, CollaborationServer};
use crate::models::{ErrorResponse, ReceivedMessage, SendMessage};
use crate::websocket::msg_edit_handler::handle_edit_message;
use crate::websocket::msg_ping_handler::handle_ping_message;
use crate::websocket::msg_selection_handler::handle_selection_message;


/// WebSocket handler
pub async fn websocket_handler(
    Path(client_id): Path<String>,
    ws: WebSocketUpgrade,
    State(server): State<Arc<CollaborationServer>>,
) -> Response {
    info!("New WebSocket connection attempt for {}", client_id);

    let client_id: ClientId = match client_id.parse() {
        Ok(id) => id,
        Err(e) => {
            warn!("Refusing channel: {}", e);
            return ErrorResponse::reply(e.status_code(), e.to_string()).into_response();
        }
    };

    // Activate before upgrading so unknown or duplicate clients get a plain HTTP error
    let inbox = match server.connect(client_id).await {
        Ok(inbox) => inbox,
        Err(e) => {
            warn!("Refusing channel for {}: {}", client_id, e);
            return ErrorResponse::reply(e.status_code(), e.to_string()).into_response();
        }
    };

    let failed_server = server.clone();
    ws.on_failed_upgrade(move |e| {
        error!("WebSocket upgrade failed for {}: {}", client_id, e);
        tokio::spawn(async move {
            failed_server.deregister(client_id).await;
        });
    })
    .on_upgrade(move |socket| handle_socket(socket, client_id, inbox, server))
}

/// Handle WebSocket connection
async fn handle_socket(
    socket: WebSocket,
    client_id: ClientId,
    mut inbox: mpsc::Receiver<SendMessage>,
    server: Arc<CollaborationServer>,
) {
    info!("WebSocket connection established for {}", client_id);

    // Split the socket into sender and receiver
    let (mut sender, mut receiver) = socket.split();
    let delivery_timeout = server.settings().delivery_timeout;

    // Forward everything queued for this client to the socket. A write that
    // does not finish within the delivery timeout ends the connection.
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = inbox.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize message for {}: {}", client_id, e);
                    continue;
                }
            };
            match tokio::time::timeout(delivery_timeout, sender.send(Message::Text(text))).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Failed to deliver to {}: {}", client_id, e);
                    return;
                }
                Err(_) => {
                    warn!("Delivery to {} timed out after {:?}", client_id, delivery_timeout);
                    return;
                }
            }
        }
        // Outbox closed: the client was deregistered
        let _ = tokio::time::timeout(delivery_timeout, sender.send(Message::Close(None))).await;
    });

    // Read client messages until the socket closes
    let reader = server.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if !handle_text_message(&reader, client_id, &text).await {
                        break;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("WebSocket error for {}: {}", client_id, e);
                    break;
                }
            }
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    server.deregister(client_id).await;
    info!("WebSocket connection terminated for {}", client_id);
}

/// Parse and dispatch one text frame. Returns false once the client is gone.
async fn handle_text_message(server: &Arc<CollaborationServer>, client_id: ClientId, text: &str) -> bool {

    // Malformed messages are dropped, the connection stays open
    let json_msg: ReceivedMessage = match serde_json::from_str(text) {
        Ok(json_msg) => {
            debug!("Received message from {}: {:?}", client_id, json_msg);
            json_msg
        }
        Err(e) => {
            warn!("Dropping message from {}: {}", client_id, CollabError::MalformedMessage(e.to_string()));
            return true;
        }
    };

    let result = match json_msg {
        ReceivedMessage::Edit(edit_msg) => handle_edit_message(&edit_msg, client_id, server).await,
        ReceivedMessage::Selection(selection_msg) => handle_selection_message(&selection_msg, client_id, server).await,
        ReceivedMessage::Ping => handle_ping_message(client_id, server).await,
    };

    match result {
        Ok(()) => true,
        Err(CollabError::UnknownClient(_)) => {
            info!("Client {} is no longer registered, closing channel", client_id);
            false
        }
        Err(e) => {
            warn!("Message from {} rejected: {}", client_id, e);
            true
        }
    }
}

/// A message may name its sender; it must be the channel owner.
pub(crate) fn sent_by_owner(claimed: Option<ClientId>, owner: ClientId) -> bool {
    match claimed {
        Some(claimed) if claimed != owner => {
            warn!("Dropping message on {}'s channel claiming to be from {}", owner, claimed);
            false
        }
        _ => true,
    }
}
