use std::collections::HashMap;

use tracing::debug;

use super::client_registry::ClientId;
use super::error::CollabError;
use super::position::{CellPosition, GridBounds};

pub type CellValue = String;

/// Authoritative committed value of every cell.
///
/// Last write wins: a commit replaces whatever the cell held, with no version
/// check and no merge. Two clients editing the same cell race, and the commit
/// the server applies second is the one that stays. Per-cell version counters
/// or a CRDT would go here if stronger conflict semantics are ever needed.
#[derive(Debug)]
pub struct CellStore {
    bounds: GridBounds,
    cells: HashMap<CellPosition, CellValue>,
}

impl CellStore {
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            cells: HashMap::new(),
        }
    }

    /// Store `value` at `position` and return the value now held there.
    pub fn commit(&mut self, position: CellPosition, value: CellValue, origin: ClientId) -> Result<CellValue, CollabError> {
        let position = self.bounds.check(position)?;
        debug!("Commit at {} by {} ({} bytes)", position, origin, value.len());

        // Empty cells stay sparse.
        if value.is_empty() {
            self.cells.remove(&position);
        } else {
            self.cells.insert(position, value.clone());
        }
        Ok(value)
    }

    /// Last committed value, or the empty value if never set.
    pub fn get(&self, position: CellPosition) -> CellValue {
        self.cells.get(&position).cloned().unwrap_or_default()
    }

    /// Dense `rows x cols` copy of the sheet, for exporters and joining clients.
    pub fn snapshot_all_values(&self) -> Vec<Vec<CellValue>> {
        let mut rows = vec![vec![CellValue::new(); self.bounds.cols as usize]; self.bounds.rows as usize];
        for (position, value) in &self.cells {
            rows[position.row as usize][position.col as usize] = value.clone();
        }
        rows
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CellStore {
        CellStore::new(GridBounds::new(3, 4))
    }

    #[test]
    fn test_commit_then_get() {
        let mut cells = store();
        let pos = CellPosition::new(2, 3);
        let applied = cells.commit(pos, "hello".to_string(), ClientId::new(1)).unwrap();
        assert_eq!(applied, "hello");
        assert_eq!(cells.get(pos), "hello");
        assert_eq!(cells.get(CellPosition::new(0, 0)), "");
    }

    #[test]
    fn test_last_applied_commit_wins_regardless_of_origin() {
        let mut cells = store();
        let pos = CellPosition::new(0, 0);
        // c2 typed first on its own clock but its commit reached the server first
        cells.commit(pos, "v1".to_string(), ClientId::new(2)).unwrap();
        cells.commit(pos, "v2".to_string(), ClientId::new(1)).unwrap();
        assert_eq!(cells.get(pos), "v2");

        cells.commit(pos, "v3".to_string(), ClientId::new(2)).unwrap();
        assert_eq!(cells.get(pos), "v3");
    }

    #[test]
    fn test_empty_commit_clears_cell() {
        let mut cells = store();
        let pos = CellPosition::new(1, 1);
        cells.commit(pos, "x".to_string(), ClientId::new(1)).unwrap();
        cells.commit(pos, String::new(), ClientId::new(1)).unwrap();
        assert_eq!(cells.get(pos), "");
        assert_eq!(cells.len(), 0);
    }

    #[test]
    fn test_out_of_bounds_commit_is_rejected() {
        let mut cells = store();
        let err = cells
            .commit(CellPosition::new(3, 0), "x".to_string(), ClientId::new(1))
            .unwrap_err();
        assert!(matches!(err, CollabError::InvalidPosition { row: 3, col: 0, .. }));
        assert_eq!(cells.len(), 0);
    }

    #[test]
    fn test_snapshot_all_values_is_dense() {
        let mut cells = store();
        cells.commit(CellPosition::new(1, 2), "a".to_string(), ClientId::new(1)).unwrap();
        let data = cells.snapshot_all_values();
        assert_eq!(data.len(), 3);
        assert!(data.iter().all(|row| row.len() == 4));
        assert_eq!(data[1][2], "a");
        assert_eq!(data[0][0], "");
    }
}
