use axum::http::StatusCode;

use super::client_registry::ClientId;
use super::position::GridBounds;

/// Errors raised by the collaboration core.
///
/// None of these is fatal to the server: every kind is recovered at the
/// connection or request that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollabError {
    /// Row or column outside the configured grid.
    InvalidPosition { row: u32, col: u32, bounds: GridBounds },
    /// Message refers to a client that is not registered (or not the channel owner).
    UnknownClient(String),
    /// The recipient's outbox is full or closed.
    ChannelDeliveryFailure(ClientId),
    /// Payload could not be parsed as a tagged protocol message.
    MalformedMessage(String),
    /// Registration refused because `MAX_CLIENTS` clients are registered.
    CapacityExhausted(usize),
    /// A second channel was opened for a client that already has one.
    AlreadyConnected(ClientId),
}

impl CollabError {
    /// HTTP status used when the error surfaces through a request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CollabError::InvalidPosition { .. } => StatusCode::BAD_REQUEST,
            CollabError::MalformedMessage(_) => StatusCode::BAD_REQUEST,
            CollabError::UnknownClient(_) => StatusCode::NOT_FOUND,
            CollabError::AlreadyConnected(_) => StatusCode::CONFLICT,
            CollabError::CapacityExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            CollabError::ChannelDeliveryFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for CollabError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollabError::InvalidPosition { row, col, bounds } => write!(
                f,
                "Position {},{} is outside the {}x{} grid",
                row, col, bounds.rows, bounds.cols
            ),
            CollabError::UnknownClient(id) => write!(f, "Unknown client '{}'", id),
            CollabError::ChannelDeliveryFailure(id) => {
                write!(f, "Failed to deliver message to client '{}'", id)
            }
            CollabError::MalformedMessage(reason) => write!(f, "Malformed message: {}", reason),
            CollabError::CapacityExhausted(max) => {
                write!(f, "Client capacity exhausted ({} clients registered)", max)
            }
            CollabError::AlreadyConnected(id) => {
                write!(f, "Client '{}' already has an open channel", id)
            }
        }
    }
}

impl std::error::Error for CollabError {}
