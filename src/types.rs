//! Core message types for dummymore
//!
//! A `MessageEvent` is built fresh for every intercepted message and is
//! immutable once constructed.

use crate::error::{InterceptError, Result};
use serde::{Deserialize, Serialize};

/// Where in the host's message flow an event was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Received from the peer
    Incoming,
    /// About to be sent
    Outgoing,
    /// Confirmed sent
    OutgoingEcho,
    /// About to be written to the conversation window
    Displaying,
}

impl Direction {
    /// All directions, in record-tag order
    pub const ALL: [Direction; 4] = [
        Direction::Incoming,
        Direction::Outgoing,
        Direction::OutgoingEcho,
        Direction::Displaying,
    ];

    /// Five-byte record tag, trailing space included
    pub fn tag(self) -> &'static str {
        match self {
            Self::Incoming => "RECV ",
            Self::Outgoing => "SEND ",
            Self::OutgoingEcho => "SENT ",
            Self::Displaying => "WRIT ",
        }
    }

    /// Inverse of [`Direction::tag`]
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.tag().as_bytes() == tag)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incoming => write!(f, "incoming"),
            Self::Outgoing => write!(f, "outgoing"),
            Self::OutgoingEcho => write!(f, "outgoing-echo"),
            Self::Displaying => write!(f, "displaying"),
        }
    }
}

/// One intercepted chat message
///
/// Serializes for diagnostics but does not deserialize: every event is built
/// by `new` or `from_raw`, so host bytes can only enter through the checked
/// constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    id: String,
    direction: Direction,
    peer: String,
    payload: String,
    timestamp: i64,
}

impl MessageEvent {
    /// Create an event for a message text the host already holds as UTF-8
    ///
    /// The payload is trusted as given, NUL bytes included. Text that comes
    /// straight from host buffers goes through [`MessageEvent::from_raw`].
    pub fn new(direction: Direction, peer: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: format!("msg-{}", uuid::Uuid::new_v4()),
            direction,
            peer: peer.into(),
            payload: payload.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Create an event from raw host bytes
    ///
    /// The payload must be valid UTF-8 without interior NUL bytes; the host
    /// hands over C strings, so a NUL means the buffer was cut or corrupted.
    pub fn from_raw(direction: Direction, peer: &str, payload: &[u8]) -> Result<Self> {
        if let Some(pos) = payload.iter().position(|b| *b == 0) {
            return Err(InterceptError::MalformedEvent(format!(
                "payload contains a NUL byte at offset {}",
                pos
            )));
        }
        let text = std::str::from_utf8(payload).map_err(|e| {
            InterceptError::MalformedEvent(format!("payload is not valid UTF-8: {}", e))
        })?;
        Ok(Self::new(direction, peer, text))
    }

    /// Correlation id (msg-<uuid>), never written to the record
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Opaque peer label supplied by the host
    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Unix seconds at which the event was created
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = MessageEvent::new(Direction::Incoming, "alice@example.org", "hello");
        assert!(event.id().starts_with("msg-"));
        assert_eq!(event.direction(), Direction::Incoming);
        assert_eq!(event.peer(), "alice@example.org");
        assert_eq!(event.payload(), "hello");
        assert!(event.timestamp() > 0);
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = MessageEvent::new(Direction::Outgoing, "bob", "x");
        let b = MessageEvent::new(Direction::Outgoing, "bob", "x");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_from_raw_accepts_utf8() {
        let event = MessageEvent::from_raw(Direction::Displaying, "bob", "héllo".as_bytes()).unwrap();
        assert_eq!(event.payload(), "héllo");
    }

    #[test]
    fn test_from_raw_rejects_invalid_utf8() {
        let err = MessageEvent::from_raw(Direction::Incoming, "bob", &[0x3f, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, InterceptError::MalformedEvent(_)));
    }

    #[test]
    fn test_from_raw_rejects_nul() {
        let err = MessageEvent::from_raw(Direction::Incoming, "bob", b"?DUMMY:\0tail").unwrap_err();
        assert!(err.to_string().contains("offset 7"));
    }

    #[test]
    fn test_new_trusts_payload_that_from_raw_rejects() {
        let raw = b"?DUMMY:\0tail";
        assert!(MessageEvent::from_raw(Direction::Incoming, "bob", raw).is_err());

        let event = MessageEvent::new(Direction::Incoming, "bob", "?DUMMY:\0tail");
        assert_eq!(event.payload().as_bytes(), raw);
    }

    #[test]
    fn test_event_serializes_for_diagnostics() {
        let event = MessageEvent::new(Direction::Outgoing, "bob", "hi");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["direction"], "outgoing");
        assert_eq!(json["payload"], "hi");
        assert!(json["id"].as_str().unwrap().starts_with("msg-"));
    }

    #[test]
    fn test_direction_tags() {
        assert_eq!(Direction::Incoming.tag(), "RECV ");
        assert_eq!(Direction::Outgoing.tag(), "SEND ");
        assert_eq!(Direction::OutgoingEcho.tag(), "SENT ");
        assert_eq!(Direction::Displaying.tag(), "WRIT ");
        for direction in Direction::ALL {
            assert_eq!(direction.tag().len(), 5);
            assert_eq!(Direction::from_tag(direction.tag().as_bytes()), Some(direction));
        }
        assert_eq!(Direction::from_tag(b"RECV"), None);
        assert_eq!(Direction::from_tag(b"recv "), None);
    }

    #[test]
    fn test_direction_serialization() {
        let json = serde_json::to_string(&Direction::OutgoingEcho).unwrap();
        assert_eq!(json, "\"outgoingEcho\"");
        let parsed: Direction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Direction::OutgoingEcho);
    }
}
