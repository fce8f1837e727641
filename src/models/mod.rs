pub mod health;
pub mod client_init;
pub mod update_selection;
pub mod sheet_export;
pub mod diagnostics;
pub mod messages;
pub mod error;

pub use health::*;
pub use client_init::*;
pub use update_selection::*;
pub use sheet_export::*;
pub use diagnostics::*;
pub use messages::*;
pub use error::*;
