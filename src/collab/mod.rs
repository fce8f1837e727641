//! Collaboration core: who is connected, where they are looking, what the
//! cells hold, and how changes reach everyone.

pub mod broadcaster;
pub mod cell_store;
pub mod client_registry;
pub mod error;
pub mod palette;
pub mod position;
pub mod selection_table;
pub mod server;

pub use broadcaster::SessionBroadcaster;
pub use cell_store::{CellStore, CellValue};
pub use client_registry::{ClientId, ClientRegistry, ConnectionState};
pub use error::CollabError;
pub use palette::{Color, Palette};
pub use position::{CellPosition, GridBounds};
pub use selection_table::SelectionTable;
pub use server::{CollaborationServer, ServerSettings, SessionStats};
