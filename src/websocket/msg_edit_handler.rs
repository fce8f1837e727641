use std::sync::Arc;
use tracing::info;
use crate::collab::{ClientId, CollabError, CollaborationServer};
use crate::models::EditRequest;
use crate::websocket::handler::sent_by_owner;

/// Handle EditRequest - Commit, then broadcast
pub async fn handle_edit_message(edit_msg: &EditRequest, client_id: ClientId, server: &Arc<CollaborationServer>) -> Result<(), CollabError> {
    if !sent_by_owner(edit_msg.client_id, client_id) {
        return Ok(());
    }

    info!("Edit from {} at {}", client_id, edit_msg.position);
    server.commit_edit(client_id, edit_msg.position, edit_msg.value.clone()).await?;
    Ok(())
}
