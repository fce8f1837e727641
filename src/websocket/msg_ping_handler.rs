use std::sync::Arc;
use tracing::debug;
use crate::collab::{ClientId, CollabError, CollaborationServer};

/// Handle ping - queue a pong on the client's own outbox
pub async fn handle_ping_message(client_id: ClientId, server: &Arc<CollaborationServer>) -> Result<(), CollabError> {
    debug!("Ping message received from {}", client_id);
    server.pong(client_id).await
}
