use std::collections::BTreeMap;

use super::client_registry::ClientId;
use super::error::CollabError;
use super::palette::Palette;
use super::position::{CellPosition, GridBounds};
use crate::models::SelectionEntry;

/// Current focused cell of every client that has one.
#[derive(Debug)]
pub struct SelectionTable {
    bounds: GridBounds,
    entries: BTreeMap<ClientId, CellPosition>,
}

impl SelectionTable {
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            entries: BTreeMap::new(),
        }
    }

    pub fn set_selection(&mut self, id: ClientId, position: CellPosition) -> Result<(), CollabError> {
        let position = self.bounds.check(position)?;
        self.entries.insert(id, position);
        Ok(())
    }

    /// Returns true if the client had a selection.
    pub fn clear_selection(&mut self, id: ClientId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn get(&self, id: ClientId) -> Option<CellPosition> {
        self.entries.get(&id).copied()
    }

    /// All selections ordered by client id. Color ranks depend on this order.
    pub fn snapshot(&self) -> Vec<(ClientId, CellPosition)> {
        self.entries.iter().map(|(id, pos)| (*id, *pos)).collect()
    }

    /// What `recipient` renders: every peer but itself, colored by rank.
    pub fn view_for(&self, recipient: ClientId, palette: &Palette) -> Vec<SelectionEntry> {
        self.entries
            .iter()
            .filter(|(id, _)| **id != recipient)
            .enumerate()
            .map(|(rank, (id, position))| SelectionEntry {
                client_id: *id,
                position: *position,
                color: palette.color_for_rank(rank).clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
