//! Dummy-message classifier
//!
//! Pure prefix matching on the raw payload bytes. Markers are compared
//! byte-for-byte and case-sensitively; nothing is normalized.

use serde::{Deserialize, Serialize};

/// Marker prefixed to every dummy message
pub const DUMMY_MARKER: &[u8] = b"?DUMMY:";

/// Dummy marker after the host wrapped the message in a formatting tag
pub const FORMATTED_DUMMY_MARKER: &[u8] = b"<FONT>?DUMMY:";

/// Prefix of an OTR-encrypted message
pub const OTR_MARKER: &[u8] = b"?OTR:";

/// Verdict for a single payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Classification {
    /// Synthetic noise, hidden from display
    Dummy,
    /// Anything else
    Real,
}

impl Classification {
    pub fn is_dummy(self) -> bool {
        matches!(self, Self::Dummy)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dummy => write!(f, "dummy"),
            Self::Real => write!(f, "real"),
        }
    }
}

/// Classification together with the independent "looks encrypted" flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub classification: Classification,
    pub encrypted: bool,
}

/// Classify a payload as `Dummy` or `Real`
///
/// Empty payloads and payloads shorter than a marker are `Real`.
pub fn classify(payload: &[u8]) -> Classification {
    if payload.starts_with(DUMMY_MARKER) || payload.starts_with(FORMATTED_DUMMY_MARKER) {
        Classification::Dummy
    } else {
        Classification::Real
    }
}

/// Whether the payload starts with the OTR marker
///
/// Informational only; never affects the `Dummy`/`Real` verdict.
pub fn looks_encrypted(payload: &[u8]) -> bool {
    payload.starts_with(OTR_MARKER)
}

/// Run both checks on a payload
pub fn inspect(payload: &[u8]) -> Inspection {
    Inspection {
        classification: classify(payload),
        encrypted: looks_encrypted(payload),
    }
}
