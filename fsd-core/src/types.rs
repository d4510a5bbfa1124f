//! Shared types, error enum, and PDU metadata for fsd-core.

use serde::Serialize;
use thiserror::Error;

/// All errors produced by fsd-core.
///
/// Enum token decoding never fails (see `codec`); these errors belong to the
/// framing layer, file loading, and configuration.
#[derive(Debug, Error)]
pub enum FsdError {
    #[error("unrecognized PDU: {0}")]
    UnknownPdu(String),
    #[error("{pdu}: expected at least {expected} fields, got {actual}")]
    MissingFields {
        pdu: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{pdu}: invalid {field} value {value:?}")]
    InvalidField {
        pdu: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FsdError>;

// ---------------------------------------------------------------------------
// PDU metadata
// ---------------------------------------------------------------------------

/// Kind of FSD protocol data unit, identified by the line prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PduKind {
    AddAtc,
    AddPilot,
    DeleteAtc,
    DeletePilot,
    TextMessage,
    PilotDataUpdate,
    AtcDataUpdate,
    ClientQuery,
    ClientResponse,
    FlightPlan,
    ServerError,
    Ping,
    Pong,
    KillRequest,
    SquawkBox,
}

/// Metadata for a PDU prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduInfo {
    pub kind: PduKind,
    pub name: &'static str,
    /// Minimum number of `:`-separated fields after the prefix.
    pub min_fields: usize,
}

/// Known PDU table. Multi-character prefixes come before `@` and `%` so a
/// linear prefix scan finds the longest match.
pub const PDU_TABLE: &[(&str, PduInfo)] = &[
    (
        "#AA",
        PduInfo {
            kind: PduKind::AddAtc,
            name: "Add ATC",
            min_fields: 7,
        },
    ),
    (
        "#AP",
        PduInfo {
            kind: PduKind::AddPilot,
            name: "Add pilot",
            min_fields: 8,
        },
    ),
    (
        "#DA",
        PduInfo {
            kind: PduKind::DeleteAtc,
            name: "Delete ATC",
            min_fields: 1,
        },
    ),
    (
        "#DP",
        PduInfo {
            kind: PduKind::DeletePilot,
            name: "Delete pilot",
            min_fields: 1,
        },
    ),
    (
        "#TM",
        PduInfo {
            kind: PduKind::TextMessage,
            name: "Text message",
            min_fields: 3,
        },
    ),
    (
        "#SB",
        PduInfo {
            kind: PduKind::SquawkBox,
            name: "Plane information",
            min_fields: 3,
        },
    ),
    (
        "$CQ",
        PduInfo {
            kind: PduKind::ClientQuery,
            name: "Client query",
            min_fields: 3,
        },
    ),
    (
        "$CR",
        PduInfo {
            kind: PduKind::ClientResponse,
            name: "Client response",
            min_fields: 3,
        },
    ),
    (
        "$FP",
        PduInfo {
            kind: PduKind::FlightPlan,
            name: "Flight plan",
            min_fields: 17,
        },
    ),
    (
        "$ER",
        PduInfo {
            kind: PduKind::ServerError,
            name: "Server error",
            min_fields: 4,
        },
    ),
    (
        "$PI",
        PduInfo {
            kind: PduKind::Ping,
            name: "Ping",
            min_fields: 2,
        },
    ),
    (
        "$PO",
        PduInfo {
            kind: PduKind::Pong,
            name: "Pong",
            min_fields: 2,
        },
    ),
    (
        "$!!",
        PduInfo {
            kind: PduKind::KillRequest,
            name: "Kill request",
            min_fields: 2,
        },
    ),
    (
        "@",
        PduInfo {
            kind: PduKind::PilotDataUpdate,
            name: "Pilot data update",
            min_fields: 10,
        },
    ),
    (
        "%",
        PduInfo {
            kind: PduKind::AtcDataUpdate,
            name: "ATC data update",
            min_fields: 7,
        },
    ),
];

/// Find the PDU whose prefix starts `line`. Returns the prefix and its metadata.
pub fn pdu_info(line: &str) -> Option<(&'static str, &'static PduInfo)> {
    PDU_TABLE
        .iter()
        .find(|(prefix, _)| line.starts_with(prefix))
        .map(|(prefix, info)| (*prefix, info))
}

/// Wire prefix for a PDU kind.
pub fn pdu_prefix(kind: PduKind) -> &'static str {
    PDU_TABLE
        .iter()
        .find(|(_, info)| info.kind == kind)
        .map(|(prefix, _)| *prefix)
        .unwrap_or("")
}

/// Human-readable name for a PDU kind.
pub fn pdu_name(kind: PduKind) -> &'static str {
    PDU_TABLE
        .iter()
        .find(|(_, info)| info.kind == kind)
        .map(|(_, info)| info.name)
        .unwrap_or("Unknown")
}

// ---------------------------------------------------------------------------
// Callsign and frequency helpers
// ---------------------------------------------------------------------------

/// Airline designator embedded in an airline-style callsign.
///
/// `DLH123` → `DLH`. Requires three letters followed by a digit, so
/// registrations like `DEABC` or `N123AB` are rejected.
pub fn callsign_airline_prefix(callsign: &str) -> Option<String> {
    let bytes = callsign.trim().as_bytes();
    if bytes.len() < 4 {
        return None;
    }
    if bytes[..3].iter().all(u8::is_ascii_alphabetic) && bytes[3].is_ascii_digit() {
        Some(callsign.trim()[..3].to_ascii_uppercase())
    } else {
        None
    }
}

/// Convert an FSD frequency field (kHz above 100 MHz) into kHz.
///
/// `22800` → `122_800` (122.800 MHz).
pub fn frequency_from_wire(token: &str) -> Option<u32> {
    token
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(|khz| khz.checked_add(100_000))
}

/// Convert kHz into the FSD frequency field.
pub fn frequency_to_wire(khz: u32) -> String {
    khz.saturating_sub(100_000).to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdu_info_longest_prefix() {
        let (prefix, info) = pdu_info("#APDLH123:SERVER:1234567").unwrap();
        assert_eq!(prefix, "#AP");
        assert_eq!(info.kind, PduKind::AddPilot);

        let (prefix, info) = pdu_info("@N:DLH123:2000").unwrap();
        assert_eq!(prefix, "@");
        assert_eq!(info.kind, PduKind::PilotDataUpdate);
    }

    #[test]
    fn test_pdu_info_unknown() {
        assert!(pdu_info("#XXfoo").is_none());
        assert!(pdu_info("").is_none());
    }

    #[test]
    fn test_pdu_prefix() {
        assert_eq!(pdu_prefix(PduKind::ClientQuery), "$CQ");
        assert_eq!(pdu_prefix(PduKind::AtcDataUpdate), "%");
        assert_eq!(pdu_name(PduKind::FlightPlan), "Flight plan");
    }

    #[test]
    fn test_callsign_airline_prefix() {
        assert_eq!(callsign_airline_prefix("DLH123"), Some("DLH".into()));
        assert_eq!(callsign_airline_prefix("baw9"), Some("BAW".into()));
        assert_eq!(callsign_airline_prefix("DEABC"), None);
        assert_eq!(callsign_airline_prefix("N123AB"), None);
        assert_eq!(callsign_airline_prefix("AB1"), None);
    }

    #[test]
    fn test_frequency_wire() {
        assert_eq!(frequency_from_wire("22800"), Some(122_800));
        assert_eq!(frequency_to_wire(122_800), "22800");
        assert_eq!(frequency_from_wire("abc"), None);
        assert_eq!(frequency_from_wire("4294967295"), None);
    }
}
