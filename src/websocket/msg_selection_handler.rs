use std::sync::Arc;
use tracing::debug;
use crate::collab::{ClientId, CollabError, CollaborationServer};
use crate::models::SelectionRequest;
use crate::websocket::handler::sent_by_owner;

/// Handle SelectionRequest - same effect as POST /updateSelection
pub async fn handle_selection_message(selection_msg: &SelectionRequest, client_id: ClientId, server: &Arc<CollaborationServer>) -> Result<(), CollabError> {
    if !sent_by_owner(selection_msg.client_id, client_id) {
        return Ok(());
    }

    debug!("Selection from {}: {:?}", client_id, selection_msg.position);
    server.update_selection(client_id, selection_msg.position).await
}
