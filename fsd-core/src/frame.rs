//! Split an inbound byte stream into FSD lines and lines into raw packets.
//!
//! Responsibilities:
//! - Buffer partial reads until a `\n` terminator arrives
//! - Strip `\r`, skip blank lines, drop oversized lines
//! - Identify the PDU from its prefix
//! - Split the remainder into `:`-separated fields
//! - Reject packets with fewer fields than the PDU requires

use crate::types::{pdu_info, FsdError, PduKind, Result};

/// Outbound line terminator.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Field delimiter inside a line.
pub const FIELD_DELIMITER: char = ':';

/// Longest line the framer buffers; longer input is dropped up to its `\n`.
pub const MAX_LINE_LENGTH: usize = 16 * 1024;

// ---------------------------------------------------------------------------
// Line framer
// ---------------------------------------------------------------------------

/// Accumulates raw bytes from the transport and yields complete lines.
///
/// Transports deliver arbitrary chunks; a line may arrive split across several
/// reads, and one read may hold several lines. Incomplete tails stay buffered
/// until the next `push`.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
    /// Inside an oversized line; skip bytes until the next `\n`.
    discarding: bool,
}

impl LineFramer {
    pub fn new() -> Self {
        LineFramer::default()
    }

    /// Append bytes and return every line completed by them.
    ///
    /// A line longer than `MAX_LINE_LENGTH` is dropped whole.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if std::mem::take(&mut self.discarding) {
                continue;
            }
            line.pop(); // '\n'
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.is_empty() {
                continue;
            }
            if line.len() > MAX_LINE_LENGTH {
                tracing::warn!(len = line.len(), "Dropping oversized FSD line");
                continue;
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }

        if self.buffer.len() > MAX_LINE_LENGTH {
            tracing::warn!(
                pending = self.buffer.len(),
                "No line terminator within limit, dropping buffered bytes"
            );
            self.buffer.clear();
            self.discarding = true;
        }
        lines
    }

    /// Bytes waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }
}

// ---------------------------------------------------------------------------
// Raw packet
// ---------------------------------------------------------------------------

/// A line split into PDU kind and fields, before typed decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPacket {
    pub kind: PduKind,
    /// Human-readable PDU name
    pub name: &'static str,
    /// Fields after the prefix
    pub fields: Vec<String>,
}

impl RawPacket {
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    /// Fields from `index` on, re-joined with `:`.
    ///
    /// Used for free text that may itself contain the delimiter.
    pub fn rest(&self, index: usize) -> String {
        if index >= self.fields.len() {
            return String::new();
        }
        self.fields[index..].join(":")
    }
}

/// Parse one line into a raw packet.
///
/// Returns `UnknownPdu` for unrecognized prefixes and `MissingFields` when the
/// line is too short for its PDU.
pub fn parse_line(line: &str) -> Result<RawPacket> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (prefix, info) =
        pdu_info(line).ok_or_else(|| FsdError::UnknownPdu(truncate(line, 16)))?;

    let body = &line[prefix.len()..];
    let fields: Vec<String> = body.split(FIELD_DELIMITER).map(str::to_string).collect();

    if fields.len() < info.min_fields {
        return Err(FsdError::MissingFields {
            pdu: info.name,
            expected: info.min_fields,
            actual: fields.len(),
        });
    }

    Ok(RawPacket {
        kind: info.kind,
        name: info.name,
        fields,
    })
}

/// Join a prefix and fields into a terminated wire line.
pub fn join_line<S: AsRef<str>>(prefix: &str, fields: &[S]) -> String {
    let mut line = String::from(prefix);
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(FIELD_DELIMITER);
        }
        line.push_str(field.as_ref());
    }
    line.push_str(LINE_TERMINATOR);
    line
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
