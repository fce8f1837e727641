use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::CollabError;

/// Identity issued to a participant by `/init`.
///
/// Written as `c<n>` on the wire. Ordering follows `n`, so `c2 < c10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    pub fn new(n: u64) -> Self {
        Self(n)
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl FromStr for ClientId {
    type Err = CollabError;

    /// Only the canonical spelling is accepted: `c01` and `c+1` are not `c1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('c')
            .and_then(|n| n.parse::<u64>().ok())
            .map(ClientId)
            .filter(|id| id.to_string() == s)
            .ok_or_else(|| CollabError::UnknownClient(s.to_string()))
    }
}

impl Serialize for ClientId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClientId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Lifecycle of a registered client. `Connecting` precedes registration and
/// `Disconnected` follows removal, so neither is ever stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Registered,
    Active,
}

#[derive(Debug)]
struct ClientEntry {
    state: ConnectionState,
    registered_at: DateTime<Utc>,
}

/// Identity and connection state of every live client.
#[derive(Debug)]
pub struct ClientRegistry {
    next_id: u64,
    max_clients: usize,
    clients: BTreeMap<ClientId, ClientEntry>,
}

impl ClientRegistry {
    pub fn new(max_clients: usize) -> Self {
        Self {
            next_id: 1,
            max_clients,
            clients: BTreeMap::new(),
        }
    }

    /// Allocate a fresh, never reused id.
    pub fn register(&mut self) -> Result<ClientId, CollabError> {
        if self.clients.len() >= self.max_clients {
            return Err(CollabError::CapacityExhausted(self.max_clients));
        }

        let id = ClientId(self.next_id);
        self.next_id += 1;
        self.clients.insert(
            id,
            ClientEntry {
                state: ConnectionState::Registered,
                registered_at: Utc::now(),
            },
        );
        Ok(id)
    }

    /// `Registered -> Active`, at most once per client.
    pub fn activate(&mut self, id: ClientId) -> Result<(), CollabError> {
        let entry = self
            .clients
            .get_mut(&id)
            .ok_or_else(|| CollabError::UnknownClient(id.to_string()))?;
        if entry.state == ConnectionState::Active {
            return Err(CollabError::AlreadyConnected(id));
        }
        entry.state = ConnectionState::Active;
        Ok(())
    }

    /// Remove a client. Returns false when it was not registered.
    pub fn remove(&mut self, id: ClientId) -> bool {
        self.clients.remove(&id).is_some()
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.contains_key(&id)
    }

    pub fn state(&self, id: ClientId) -> Option<ConnectionState> {
        self.clients.get(&id).map(|entry| entry.state)
    }

    pub fn registered_at(&self, id: ClientId) -> Option<DateTime<Utc>> {
        self.clients.get(&id).map(|entry| entry.registered_at)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }
}
