use serde::{Deserialize, Serialize};

use crate::collab::{position, CellPosition, ClientId, Color};

/// A committed edit, as fanned out to every client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditEvent {
    pub client_id: ClientId,
    pub position: CellPosition,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEntry {
    pub client_id: ClientId,
    pub position: CellPosition,
    pub color: Color,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    pub entries: Vec<SelectionEntry>,
}

/// Sent once when a channel opens so the client starts from the committed sheet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncMessage {
    pub client_id: ClientId,
    pub rows: u32,
    pub cols: u32,
    pub cells: Vec<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PongMessage {
    pub date: String,
}

/// Server -> client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SendMessage {
    Edit(EditEvent),
    Selection(SelectionSnapshot),
    Sync(SyncMessage),
    Pong(PongMessage),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    #[serde(default)]
    pub client_id: Option<ClientId>,
    pub position: CellPosition,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    #[serde(default)]
    pub client_id: Option<ClientId>,
    /// `null` clears; leaving it out is malformed.
    #[serde(deserialize_with = "position::nullable")]
    pub position: Option<CellPosition>,
}

/// Client -> server.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReceivedMessage {
    Edit(EditRequest),
    Selection(SelectionRequest),
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_notification_is_tagged() {
        let msg = SendMessage::Edit(EditEvent {
            client_id: ClientId::new(1),
            position: CellPosition::new(0, 0),
            value: "42".to_string(),
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "edit", "clientId": "c1", "position": "0,0", "value": "42"})
        );
    }

    #[test]
    fn test_selection_snapshot_is_tagged() {
        let msg = SendMessage::Selection(SelectionSnapshot {
            entries: vec![SelectionEntry {
                client_id: ClientId::new(3),
                position: CellPosition::new(1, 2),
                color: Color::from_rgb(0, 128, 255),
            }],
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["kind"], "selection");
        assert_eq!(json["entries"][0]["clientId"], "c3");
        assert_eq!(json["entries"][0]["position"], "1,2");
        assert_eq!(json["entries"][0]["color"], "#0080ff");
    }

    #[test]
    fn test_received_messages_need_a_kind() {
        let edit: ReceivedMessage =
            serde_json::from_str(r#"{"kind":"edit","clientId":"c1","position":"0,1","value":"x"}"#).unwrap();
        assert!(matches!(edit, ReceivedMessage::Edit(EditRequest { position, .. }) if position == CellPosition::new(0, 1)));

        let clear: ReceivedMessage = serde_json::from_str(r#"{"kind":"selection","position":null}"#).unwrap();
        assert!(matches!(clear, ReceivedMessage::Selection(SelectionRequest { position: None, client_id: None })));

        let ping: ReceivedMessage = serde_json::from_str(r#"{"kind":"ping"}"#).unwrap();
        assert!(matches!(ping, ReceivedMessage::Ping));

        // A selection without a position is not a clear.
        assert!(serde_json::from_str::<ReceivedMessage>(r#"{"kind":"selection"}"#).is_err());
        assert!(serde_json::from_str::<ReceivedMessage>(r#"{"kind":"selection","clientId":"c1"}"#).is_err());

        // Field presence alone does not make a message.
        assert!(serde_json::from_str::<ReceivedMessage>(r#"{"clientId":"c1","position":"0,0","value":"x"}"#).is_err());
    }
}
