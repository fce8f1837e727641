use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::CollabError;

/// A 0-indexed (row, column) coordinate into the sheet.
///
/// Internally always a structured pair. On the wire it is written as the
/// compact `"row,col"` string; reads also accept `{"row": r, "col": c}` and
/// `[r, c]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPosition {
    pub row: u32,
    pub col: u32,
}

impl CellPosition {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse the `"row,col"` wire form.
    pub fn parse(text: &str) -> Result<Self, CollabError> {
        let (row, col) = text
            .split_once(',')
            .ok_or_else(|| CollabError::MalformedMessage(format!("position '{}' is not 'row,col'", text)))?;
        let row = row
            .trim()
            .parse::<u32>()
            .map_err(|e| CollabError::MalformedMessage(format!("bad row in '{}': {}", text, e)))?;
        let col = col
            .trim()
            .parse::<u32>()
            .map_err(|e| CollabError::MalformedMessage(format!("bad column in '{}': {}", text, e)))?;
        Ok(Self { row, col })
    }
}

impl std::fmt::Display for CellPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

impl Serialize for CellPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePosition {
    Text(String),
    Pair { row: u32, col: u32 },
    Tuple(u32, u32),
}

impl<'de> Deserialize<'de> for CellPosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match WirePosition::deserialize(deserializer)? {
            WirePosition::Text(text) => CellPosition::parse(&text).map_err(serde::de::Error::custom),
            WirePosition::Pair { row, col } => Ok(CellPosition { row, col }),
            WirePosition::Tuple(row, col) => Ok(CellPosition { row, col }),
        }
    }
}

/// For `Option<CellPosition>` fields where `null` clears and an absent field
/// is an error. Plain `Option` fields would read both as `None`.
pub fn nullable<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<CellPosition>, D::Error> {
    Option::<CellPosition>::deserialize(deserializer)
}

/// Fixed size of the shared grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub rows: u32,
    pub cols: u32,
}

impl GridBounds {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    pub fn contains(&self, position: CellPosition) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    /// Reject positions outside the grid. Nothing is clamped.
    pub fn check(&self, position: CellPosition) -> Result<CellPosition, CollabError> {
        if self.contains(position) {
            Ok(position)
        } else {
            Err(CollabError::InvalidPosition {
                row: position.row,
                col: position.col,
                bounds: *self,
            })
        }
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self { rows: 20, cols: 20 }
    }
}
