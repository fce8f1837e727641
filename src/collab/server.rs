use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use super::broadcaster::SessionBroadcaster;
use super::cell_store::{CellStore, CellValue};
use super::client_registry::{ClientId, ClientRegistry, ConnectionState};
use super::error::CollabError;
use super::palette::Palette;
use super::position::{CellPosition, GridBounds};
use super::selection_table::SelectionTable;
use crate::models::{EditEvent, PongMessage, SelectionSnapshot, SendMessage, SyncMessage};

/// Tunables of one collaboration session.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bounds: GridBounds,
    pub max_clients: usize,
    pub outbox_capacity: usize,
    /// Upper bound on one socket write.
    pub delivery_timeout: Duration,
    /// How long a registered client may wait before opening its channel.
    pub registration_timeout: Option<Duration>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bounds: GridBounds::default(),
            max_clients: 256,
            outbox_capacity: 64,
            delivery_timeout: Duration::from_secs(2),
            registration_timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// Counters for the diagnostics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub registered: usize,
    pub active: usize,
    pub selections: usize,
    pub cells: usize,
}

/// Everything shared between connections. Only ever touched under one lock.
struct SessionState {
    registry: ClientRegistry,
    selections: SelectionTable,
    cells: CellStore,
    broadcaster: SessionBroadcaster,
}

impl SessionState {
    fn drop_client(&mut self, id: ClientId) -> bool {
        let removed = self.registry.remove(id);
        self.selections.clear_selection(id);
        self.broadcaster.close(id);
        removed
    }

    /// Drop clients whose delivery failed, then tell the survivors. Repeats
    /// while the follow-up broadcast itself loses clients.
    fn prune(&mut self, palette: &Palette, mut failed: Vec<ClientId>) {
        while !failed.is_empty() {
            for id in failed.drain(..) {
                warn!("Delivery to {} failed, deregistering", id);
                self.drop_client(id);
            }
            failed = self.broadcaster.broadcast_selection(&self.selections, palette);
        }
    }

    fn broadcast_selection(&mut self, palette: &Palette) {
        let failed = self.broadcaster.broadcast_selection(&self.selections, palette);
        self.prune(palette, failed);
    }
}

/// Composition root of the collaboration core.
///
/// Registry, selections, cells and outboxes live behind a single mutex. Every
/// broadcast is built and enqueued while that lock is still held, so nobody
/// sees a torn snapshot and each outbox receives events in commit order.
pub struct CollaborationServer {
    settings: ServerSettings,
    palette: Palette,
    state: Mutex<SessionState>,
}

impl CollaborationServer {
    pub fn new(settings: ServerSettings, palette: Palette) -> Self {
        let state = SessionState {
            registry: ClientRegistry::new(settings.max_clients),
            selections: SelectionTable::new(settings.bounds),
            cells: CellStore::new(settings.bounds),
            broadcaster: SessionBroadcaster::new(settings.outbox_capacity),
        };
        Self {
            settings,
            palette,
            state: Mutex::new(state),
        }
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn bounds(&self) -> GridBounds {
        self.settings.bounds
    }

    /// `Connecting -> Registered`. Arms the registration timeout if configured.
    pub async fn register(self: &Arc<Self>) -> Result<ClientId, CollabError> {
        let id = {
            let mut state = self.state.lock().await;
            state.registry.register()?
        };
        info!("Client {} registered", id);

        if let Some(timeout) = self.settings.registration_timeout {
            let server = Arc::clone(self);
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                server.expire_pending(id).await;
            });
        }
        Ok(id)
    }

    /// `Registered -> Active`. Opens the client's outbox and returns its
    /// receiving end for the socket; the first messages are a sync of the
    /// committed sheet and the current selection view.
    ///
    /// Until then the client has no outbox, so broadcasts skip it and cannot
    /// evict it.
    pub async fn connect(&self, id: ClientId) -> Result<mpsc::Receiver<SendMessage>, CollabError> {
        let mut state = self.state.lock().await;
        state.registry.activate(id)?;
        let inbox = state.broadcaster.open(id);

        let sync = SendMessage::Sync(SyncMessage {
            client_id: id,
            rows: self.settings.bounds.rows,
            cols: self.settings.bounds.cols,
            cells: state.cells.snapshot_all_values(),
        });
        let view = SendMessage::Selection(SelectionSnapshot {
            entries: state.selections.view_for(id, &self.palette),
        });
        for msg in [sync, view] {
            if let Err(e) = state.broadcaster.send_to(id, msg) {
                state.prune(&self.palette, vec![id]);
                return Err(e);
            }
        }
        info!("Client {} connected", id);
        Ok(inbox)
    }

    /// `-> Disconnected`. Idempotent: unknown or already removed ids are ignored.
    pub async fn deregister(&self, id: ClientId) -> bool {
        let mut state = self.state.lock().await;
        if !state.drop_client(id) {
            debug!("Deregister for unknown client {}", id);
            return false;
        }
        info!("Client {} deregistered", id);
        state.broadcast_selection(&self.palette);
        true
    }

    async fn expire_pending(&self, id: ClientId) {
        let mut state = self.state.lock().await;
        if state.registry.state(id) != Some(ConnectionState::Registered) {
            return;
        }
        let registered_at = state.registry.registered_at(id);
        state.drop_client(id);
        warn!(
            "Client {} never opened its channel (registered at {:?}), expired",
            id, registered_at
        );
        state.broadcast_selection(&self.palette);
    }

    /// Upsert (or clear, with `None`) the client's focus and broadcast the
    /// new selection views.
    pub async fn update_selection(&self, id: ClientId, position: Option<CellPosition>) -> Result<(), CollabError> {
        let mut state = self.state.lock().await;
        if !state.registry.contains(id) {
            return Err(CollabError::UnknownClient(id.to_string()));
        }
        match position {
            Some(position) => state.selections.set_selection(id, position)?,
            None => {
                state.selections.clear_selection(id);
            }
        }
        state.broadcast_selection(&self.palette);
        Ok(())
    }

    /// Commit an edit, then broadcast it. The broadcast is enqueued only after
    /// the commit is applied.
    pub async fn commit_edit(&self, id: ClientId, position: CellPosition, value: CellValue) -> Result<EditEvent, CollabError> {
        let mut state = self.state.lock().await;
        if !state.registry.contains(id) {
            return Err(CollabError::UnknownClient(id.to_string()));
        }
        let value = state.cells.commit(position, value, id)?;
        let event = EditEvent {
            client_id: id,
            position,
            value,
        };
        let failed = state.broadcaster.broadcast_edit(&event);
        state.prune(&self.palette, failed);
        Ok(event)
    }

    /// Reply to a ping on the client's own outbox.
    pub async fn pong(&self, id: ClientId) -> Result<(), CollabError> {
        let mut state = self.state.lock().await;
        let pong = SendMessage::Pong(PongMessage {
            date: Utc::now().to_rfc3339(),
        });
        let result = state.broadcaster.send_to(id, pong);
        if let Err(CollabError::ChannelDeliveryFailure(_)) = result {
            state.prune(&self.palette, vec![id]);
        }
        result
    }

    pub async fn get(&self, position: CellPosition) -> CellValue {
        self.state.lock().await.cells.get(position)
    }

    pub async fn snapshot_all_values(&self) -> Vec<Vec<CellValue>> {
        self.state.lock().await.cells.snapshot_all_values()
    }

    pub async fn selection_snapshot(&self) -> Vec<(ClientId, CellPosition)> {
        self.state.lock().await.selections.snapshot()
    }

    pub async fn stats(&self) -> SessionStats {
        let state = self.state.lock().await;
        SessionStats {
            registered: state.registry.len(),
            // Outboxes exist only for Active clients.
            active: state.broadcaster.len(),
            selections: state.selections.len(),
            cells: state.cells.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_with(settings: ServerSettings) -> Arc<CollaborationServer> {
        Arc::new(CollaborationServer::new(settings, Palette::generate(4, Some(42))))
    }

    fn server() -> Arc<CollaborationServer> {
        server_with(ServerSettings {
            registration_timeout: None,
            ..ServerSettings::default()
        })
    }

    async fn next(inbox: &mut mpsc::Receiver<SendMessage>) -> SendMessage {
        tokio::time::timeout(Duration::from_secs(1), inbox.recv())
            .await
            .expect("timed out waiting for a message")
            .expect("outbox closed")
    }

    /// Register, connect and consume the sync + initial selection view.
    async fn join(server: &Arc<CollaborationServer>) -> (ClientId, mpsc::Receiver<SendMessage>) {
        let id = server.register().await.unwrap();
        let mut inbox = server.connect(id).await.unwrap();
        assert!(matches!(next(&mut inbox).await, SendMessage::Sync(_)));
        assert!(matches!(next(&mut inbox).await, SendMessage::Selection(_)));
        (id, inbox)
    }

    #[tokio::test]
    async fn test_selection_then_edit_between_two_clients() {
        let server = server();
        let (a, mut a_inbox) = join(&server).await;
        let (b, mut b_inbox) = join(&server).await;
        assert_eq!(a.to_string(), "c1");
        assert_eq!(b.to_string(), "c2");

        let origin = CellPosition::new(0, 0);
        server.update_selection(a, Some(origin)).await.unwrap();

        let SendMessage::Selection(for_b) = next(&mut b_inbox).await else {
            panic!("expected a selection snapshot");
        };
        assert_eq!(for_b.entries.len(), 1);
        assert_eq!(for_b.entries[0].client_id, a);
        assert_eq!(for_b.entries[0].position, origin);
        assert!(for_b.entries.iter().all(|e| e.client_id != b));

        let SendMessage::Selection(for_a) = next(&mut a_inbox).await else {
            panic!("expected a selection snapshot");
        };
        assert!(for_a.entries.is_empty());

        server.commit_edit(a, origin, "42".to_string()).await.unwrap();
        let expected = SendMessage::Edit(EditEvent {
            client_id: a,
            position: origin,
            value: "42".to_string(),
        });
        assert_eq!(next(&mut b_inbox).await, expected);
        assert_eq!(next(&mut a_inbox).await, expected);
        assert_eq!(server.get(origin).await, "42");
    }

    #[tokio::test]
    async fn test_commits_apply_in_arrival_order() {
        let server = server();
        let (a, _a_inbox) = join(&server).await;
        let (b, _b_inbox) = join(&server).await;
        let pos = CellPosition::new(3, 3);

        server.commit_edit(b, pos, "v1".to_string()).await.unwrap();
        server.commit_edit(a, pos, "v2".to_string()).await.unwrap();
        assert_eq!(server.get(pos).await, "v2");
    }

    #[tokio::test]
    async fn test_deregister_is_idempotent_and_notifies_peers() {
        let server = server();
        let (a, _a_inbox) = join(&server).await;
        let (b, mut b_inbox) = join(&server).await;
        server.update_selection(a, Some(CellPosition::new(1, 1))).await.unwrap();
        server.update_selection(b, Some(CellPosition::new(2, 2))).await.unwrap();
        next(&mut b_inbox).await;
        next(&mut b_inbox).await;

        assert!(server.deregister(a).await);
        let SendMessage::Selection(for_b) = next(&mut b_inbox).await else {
            panic!("expected a selection snapshot");
        };
        assert!(for_b.entries.is_empty());

        assert!(!server.deregister(a).await);
        assert!(!server.deregister(ClientId::new(99)).await);
        assert_eq!(server.selection_snapshot().await, vec![(b, CellPosition::new(2, 2))]);
        assert_eq!(server.stats().await.registered, 1);
    }

    #[tokio::test]
    async fn test_stalled_peer_is_dropped_without_blocking_others() {
        let server = server_with(ServerSettings {
            outbox_capacity: 2,
            registration_timeout: None,
            ..ServerSettings::default()
        });
        // Never reads: sync + selection already fill its outbox.
        let stalled = server.register().await.unwrap();
        let _stalled_inbox = server.connect(stalled).await.unwrap();
        let (b, mut b_inbox) = join(&server).await;

        server.commit_edit(b, CellPosition::new(0, 1), "x".to_string()).await.unwrap();
        assert!(matches!(next(&mut b_inbox).await, SendMessage::Edit(_)));
        assert!(matches!(next(&mut b_inbox).await, SendMessage::Selection(_)));

        let stats = server.stats().await;
        assert_eq!(stats.registered, 1);
        assert_eq!(stats.active, 1);
        assert!(matches!(
            server.commit_edit(stalled, CellPosition::new(0, 0), "y".to_string()).await,
            Err(CollabError::UnknownClient(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_requests_leave_state_untouched() {
        let server = server();
        let (a, _a_inbox) = join(&server).await;

        assert!(matches!(
            server.update_selection(a, Some(CellPosition::new(20, 0))).await,
            Err(CollabError::InvalidPosition { .. })
        ));
        assert!(matches!(
            server.commit_edit(a, CellPosition::new(0, 20), "x".to_string()).await,
            Err(CollabError::InvalidPosition { .. })
        ));
        assert!(matches!(
            server.update_selection(ClientId::new(7), Some(CellPosition::new(0, 0))).await,
            Err(CollabError::UnknownClient(_))
        ));
        assert!(server.selection_snapshot().await.is_empty());
        assert_eq!(server.stats().await.cells, 0);
    }

    #[tokio::test]
    async fn test_second_channel_is_refused() {
        let server = server();
        let (a, _a_inbox) = join(&server).await;
        assert!(matches!(server.connect(a).await, Err(CollabError::AlreadyConnected(_))));
        assert!(matches!(
            server.connect(ClientId::new(50)).await,
            Err(CollabError::UnknownClient(_))
        ));
    }

    #[tokio::test]
    async fn test_joining_client_is_synced_with_committed_cells() {
        let server = server();
        let (a, _a_inbox) = join(&server).await;
        server.update_selection(a, Some(CellPosition::new(0, 0))).await.unwrap();
        server.commit_edit(a, CellPosition::new(0, 0), "42".to_string()).await.unwrap();

        let late = server.register().await.unwrap();
        let mut inbox = server.connect(late).await.unwrap();
        let SendMessage::Sync(sync) = next(&mut inbox).await else {
            panic!("expected a sync first");
        };
        assert_eq!(sync.client_id, late);
        assert_eq!((sync.rows, sync.cols), (20, 20));
        assert_eq!(sync.cells[0][0], "42");

        // Peer events from before the channel opened are covered by the sync, not replayed.
        let SendMessage::Selection(view) = next(&mut inbox).await else {
            panic!("expected the current selection view");
        };
        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.entries[0].client_id, a);
        assert!(inbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_registered_client_survives_busy_sheet_before_connecting() {
        let server = server_with(ServerSettings {
            outbox_capacity: 4,
            registration_timeout: None,
            ..ServerSettings::default()
        });
        let (a, mut a_inbox) = join(&server).await;
        let pending = server.register().await.unwrap();

        for n in 0..70 {
            let pos = CellPosition::new(n % 20, n / 20);
            server.commit_edit(a, pos, n.to_string()).await.unwrap();
            assert!(matches!(next(&mut a_inbox).await, SendMessage::Edit(_)));
        }
        server.update_selection(a, Some(CellPosition::new(1, 1))).await.unwrap();
        next(&mut a_inbox).await;

        let stats = server.stats().await;
        assert_eq!((stats.registered, stats.active), (2, 1));

        let mut inbox = server.connect(pending).await.unwrap();
        let SendMessage::Sync(sync) = next(&mut inbox).await else {
            panic!("expected a sync first");
        };
        assert_eq!(sync.cells[0][0], "0");
        assert_eq!(sync.cells[9][3], "69");
        let SendMessage::Selection(view) = next(&mut inbox).await else {
            panic!("expected the current selection view");
        };
        assert_eq!(view.entries.len(), 1);
        assert!(inbox.try_recv().is_err());
        assert_eq!(server.stats().await.active, 2);
    }

    #[tokio::test]
    async fn test_unconnected_registration_expires() {
        let server = server_with(ServerSettings {
            registration_timeout: Some(Duration::from_millis(50)),
            ..ServerSettings::default()
        });
        let idle = server.register().await.unwrap();
        let (_active, _inbox) = join(&server).await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(server.stats().await.registered, 1);
        assert!(matches!(server.connect(idle).await, Err(CollabError::UnknownClient(_))));
    }

    #[tokio::test]
    async fn test_registration_is_bounded() {
        let server = server_with(ServerSettings {
            max_clients: 1,
            registration_timeout: None,
            ..ServerSettings::default()
        });
        let a = server.register().await.unwrap();
        assert_eq!(server.register().await, Err(CollabError::CapacityExhausted(1)));
        server.deregister(a).await;
        assert!(server.register().await.is_ok());
    }

    #[tokio::test]
    async fn test_ping_is_answered_on_own_outbox() {
        let server = server();
        let (a, mut a_inbox) = join(&server).await;
        let (_b, mut b_inbox) = join(&server).await;

        server.pong(a).await.unwrap();
        assert!(matches!(next(&mut a_inbox).await, SendMessage::Pong(_)));
        assert!(b_inbox.try_recv().is_err());
    }
}
