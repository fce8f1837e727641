use std::collections::BTreeMap;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

use super::client_registry::ClientId;
use super::error::CollabError;
use super::palette::Palette;
use super::selection_table::SelectionTable;
use crate::models::{EditEvent, SelectionSnapshot, SendMessage};

/// Bounded outbox per client. Delivery never waits: a full or closed outbox is
/// reported back so the caller can drop that one client.
///
/// Capacity is at least 2, the number of messages a client receives on connect.
#[derive(Debug)]
pub struct SessionBroadcaster {
    capacity: usize,
    outboxes: BTreeMap<ClientId, mpsc::Sender<SendMessage>>,
}

impl SessionBroadcaster {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(2),
            outboxes: BTreeMap::new(),
        }
    }

    /// Open the delivery channel for `id` and return its receiving end.
    pub fn open(&mut self, id: ClientId) -> mpsc::Receiver<SendMessage> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.outboxes.insert(id, tx);
        rx
    }

    /// Drop the sender. The channel task sees the channel close and ends.
    pub fn close(&mut self, id: ClientId) -> bool {
        self.outboxes.remove(&id).is_some()
    }

    pub fn send_to(&self, id: ClientId, msg: SendMessage) -> Result<(), CollabError> {
        let tx = self
            .outboxes
            .get(&id)
            .ok_or_else(|| CollabError::UnknownClient(id.to_string()))?;
        match tx.try_send(msg) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                debug!("Outbox full for {}", id);
                Err(CollabError::ChannelDeliveryFailure(id))
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Outbox closed for {}", id);
                Err(CollabError::ChannelDeliveryFailure(id))
            }
        }
    }

    /// Deliver an edit to every client, originator included.
    /// Returns the clients that could not be reached.
    pub fn broadcast_edit(&self, event: &EditEvent) -> Vec<ClientId> {
        self.outboxes
            .keys()
            .filter(|id| self.send_to(**id, SendMessage::Edit(event.clone())).is_err())
            .copied()
            .collect()
    }

    /// Push each client its own selection view (self excluded, peers colored).
    /// Returns the clients that could not be reached.
    pub fn broadcast_selection(&self, table: &SelectionTable, palette: &Palette) -> Vec<ClientId> {
        self.outboxes
            .keys()
            .filter(|id| {
                let entries = table.view_for(**id, palette);
                self.send_to(**id, SendMessage::Selection(SelectionSnapshot { entries }))
                    .is_err()
            })
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.outboxes.len()
    }
}
