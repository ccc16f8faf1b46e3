//! Line-oriented log records
//!
//! Wire format, one record per event:
//!
//! ```text
//! <TAG><unix-seconds> <payload>\n
//! ```
//!
//! `TAG` is one of `RECV `, `SEND `, `SENT `, `WRIT ` (five bytes, trailing
//! space included). Payload bytes are written verbatim. Embedded newlines
//! are not escaped, so a payload containing `\n` spans several lines on the
//! wire and a line-based reader will split it.

use crate::error::{InterceptError, Result};
use crate::types::{Direction, MessageEvent};
use bytes::{BufMut, Bytes, BytesMut};

/// Serialized form of one `MessageEvent`, consumed by a single delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    direction: Direction,
    timestamp: i64,
    bytes: Bytes,
}

impl LogRecord {
    /// Build a record stamped with the current time
    ///
    /// The timestamp is taken here rather than from the event, so delays
    /// between interception and logging show up in the record.
    pub fn build(event: &MessageEvent) -> Self {
        Self::build_at(event, chrono::Utc::now().timestamp())
    }

    /// Build a record with an explicit Unix timestamp
    pub fn build_at(event: &MessageEvent, timestamp: i64) -> Self {
        let tag = event.direction().tag();
        let ts = timestamp.to_string();
        let payload = event.payload().as_bytes();

        let mut buf = BytesMut::with_capacity(tag.len() + ts.len() + 1 + payload.len() + 1);
        buf.put_slice(tag.as_bytes());
        buf.put_slice(ts.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(payload);
        buf.put_u8(b'\n');

        Self {
            direction: event.direction(),
            timestamp,
            bytes: buf.freeze(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Wire bytes, trailing newline included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// A record read back from the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub direction: Direction,
    pub timestamp: i64,
    pub payload: Vec<u8>,
}

impl ParsedRecord {
    /// Parse a single record
    ///
    /// Only the final newline is stripped; newlines inside the payload are
    /// kept, so this recovers the payload exactly when given a whole record.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let raw = raw.strip_suffix(b"\n").ok_or_else(|| {
            InterceptError::MalformedRecord("record is not newline-terminated".to_string())
        })?;

        if raw.len() < 5 {
            return Err(InterceptError::MalformedRecord(format!(
                "record too short ({} bytes)",
                raw.len()
            )));
        }
        let (tag, rest) = raw.split_at(5);
        let direction = Direction::from_tag(tag).ok_or_else(|| {
            InterceptError::MalformedRecord(format!(
                "unknown direction tag {:?}",
                String::from_utf8_lossy(tag)
            ))
        })?;

        let space = rest.iter().position(|b| *b == b' ').ok_or_else(|| {
            InterceptError::MalformedRecord("missing space after timestamp".to_string())
        })?;
        let ts = std::str::from_utf8(&rest[..space])
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| {
                InterceptError::MalformedRecord(format!(
                    "invalid timestamp {:?}",
                    String::from_utf8_lossy(&rest[..space])
                ))
            })?;

        Ok(Self {
            direction,
            timestamp: ts,
            payload: rest[space + 1..].to_vec(),
        })
    }
}
