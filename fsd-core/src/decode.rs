//! Decode FSD lines into typed messages.
//!
//! Handles the PDU families:
//! - `#AA` / `#AP`: ATC and pilot login
//! - `#DA` / `#DP`: logoff
//! - `#TM`:         text message
//! - `@` / `%`:     pilot and ATC position updates
//! - `$CQ` / `$CR`: client query and response
//! - `$FP`:         flight plan
//! - `$ER`:         server error
//! - `$PI` / `$PO`: ping / pong
//! - `$!!`:         kill request
//! - `#SB`:         plane information (PIR, PI GEN, FSIPIR, FSIPI)
//!
//! Enum fields go through the total codec and never fail. Numeric fields that
//! do not parse are reported as `InvalidField`.

use std::str::FromStr;

use crate::codec::*;
use crate::frame::{parse_line, RawPacket};
use crate::message::*;
use crate::types::{frequency_from_wire, FsdError, PduKind, Result};

/// Minimum field count of FSInn plane information.
const FSINN_FIELDS: usize = 12;

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn parse_num<T: FromStr>(pkt: &RawPacket, index: usize, field: &'static str) -> Result<T> {
    let raw = pkt.field(index).trim();
    raw.parse::<T>().map_err(|_| FsdError::InvalidField {
        pdu: pkt.name,
        field,
        value: raw.to_string(),
    })
}

/// Like `parse_num`, but an empty field reads as zero.
fn parse_num_or_zero<T: FromStr + Default>(
    pkt: &RawPacket,
    index: usize,
    field: &'static str,
) -> Result<T> {
    if pkt.field(index).trim().is_empty() {
        return Ok(T::default());
    }
    parse_num(pkt, index, field)
}

fn text(pkt: &RawPacket, index: usize) -> String {
    pkt.field(index).to_string()
}

// ---------------------------------------------------------------------------
// Per-PDU decoders
// ---------------------------------------------------------------------------

fn decode_add_atc(pkt: &RawPacket) -> Result<AddAtc> {
    Ok(AddAtc {
        sender: text(pkt, 0),
        receiver: text(pkt, 1),
        real_name: text(pkt, 2),
        cid: text(pkt, 3),
        password: text(pkt, 4),
        rating: AtcRating::from_token(pkt.field(5)),
        protocol_revision: parse_num_or_zero(pkt, 6, "protocol revision")?,
    })
}

fn decode_add_pilot(pkt: &RawPacket) -> Result<AddPilot> {
    Ok(AddPilot {
        sender: text(pkt, 0),
        receiver: text(pkt, 1),
        cid: text(pkt, 2),
        password: text(pkt, 3),
        rating: PilotRating::from_token(pkt.field(4)),
        protocol_revision: parse_num_or_zero(pkt, 5, "protocol revision")?,
        sim_type: SimType::from_token(pkt.field(6)),
        real_name: pkt.rest(7),
    })
}

fn decode_delete(pkt: &RawPacket) -> DeleteClient {
    DeleteClient {
        sender: text(pkt, 0),
        cid: text(pkt, 1),
    }
}

fn decode_text_message(pkt: &RawPacket) -> TextMessage {
    TextMessage {
        sender: text(pkt, 0),
        receiver: text(pkt, 1),
        message: pkt.rest(2),
    }
}

fn decode_pilot_data(pkt: &RawPacket) -> Result<PilotDataUpdate> {
    Ok(PilotDataUpdate {
        transponder_mode: TransponderMode::from_token(pkt.field(0)),
        sender: text(pkt, 1),
        squawk: text(pkt, 2),
        rating: PilotRating::from_token(pkt.field(3)),
        lat: parse_num(pkt, 4, "latitude")?,
        lon: parse_num(pkt, 5, "longitude")?,
        altitude_ft: parse_num(pkt, 6, "altitude")?,
        ground_speed_kts: parse_num(pkt, 7, "ground speed")?,
        pbh: parse_num_or_zero(pkt, 8, "pitch/bank/heading")?,
        altitude_delta_ft: parse_num_or_zero(pkt, 9, "altitude delta")?,
    })
}

fn decode_atc_data(pkt: &RawPacket) -> Result<AtcDataUpdate> {
    let frequency_khz = frequency_from_wire(pkt.field(1)).ok_or_else(|| FsdError::InvalidField {
        pdu: pkt.name,
        field: "frequency",
        value: text(pkt, 1),
    })?;
    Ok(AtcDataUpdate {
        sender: text(pkt, 0),
        frequency_khz,
        facility: FacilityType::from_token(pkt.field(2)),
        visibility_range_nm: parse_num_or_zero(pkt, 3, "visibility range")?,
        rating: AtcRating::from_token(pkt.field(4)),
        lat: parse_num(pkt, 5, "latitude")?,
        lon: parse_num(pkt, 6, "longitude")?,
        elevation_ft: parse_num_or_zero(pkt, 7, "elevation")?,
    })
}

fn decode_client_query(pkt: &RawPacket) -> ClientQuery {
    ClientQuery {
        sender: text(pkt, 0),
        receiver: text(pkt, 1),
        query_type: ClientQueryType::from_token(pkt.field(2)),
        query_token: text(pkt, 2),
        payload: pkt.fields.get(3..).unwrap_or_default().to_vec(),
    }
}

fn decode_flight_plan(pkt: &RawPacket) -> Result<FlightPlan> {
    Ok(FlightPlan {
        sender: text(pkt, 0),
        receiver: text(pkt, 1),
        flight_type: FlightType::from_token(pkt.field(2)),
        aircraft_type: text(pkt, 3),
        true_cruise_speed_kts: parse_num_or_zero(pkt, 4, "cruise speed")?,
        departure: text(pkt, 5),
        estimated_departure: parse_num_or_zero(pkt, 6, "estimated departure")?,
        actual_departure: parse_num_or_zero(pkt, 7, "actual departure")?,
        cruise_altitude: text(pkt, 8),
        destination: text(pkt, 9),
        hours_enroute: parse_num_or_zero(pkt, 10, "hours enroute")?,
        minutes_enroute: parse_num_or_zero(pkt, 11, "minutes enroute")?,
        fuel_hours: parse_num_or_zero(pkt, 12, "fuel hours")?,
        fuel_minutes: parse_num_or_zero(pkt, 13, "fuel minutes")?,
        alternate: text(pkt, 14),
        remarks: text(pkt, 15),
        route: pkt.rest(16),
    })
}

fn decode_server_error(pkt: &RawPacket) -> ServerError {
    ServerError {
        sender: text(pkt, 0),
        receiver: text(pkt, 1),
        code: ServerErrorCode::from_token(pkt.field(2)),
        causing_parameter: text(pkt, 3),
        description: pkt.rest(4),
    }
}

fn decode_ping(pkt: &RawPacket) -> PingPong {
    PingPong {
        sender: text(pkt, 0),
        receiver: text(pkt, 1),
        timestamp: text(pkt, 2),
    }
}

fn decode_kill(pkt: &RawPacket) -> KillRequest {
    KillRequest {
        sender: text(pkt, 0),
        receiver: text(pkt, 1),
        reason: pkt.rest(2),
    }
}

fn decode_plane_info_fsinn(pkt: &RawPacket, name: &'static str) -> Result<PlaneInfoFsinn> {
    if pkt.fields.len() < FSINN_FIELDS {
        return Err(FsdError::MissingFields {
            pdu: name,
            expected: FSINN_FIELDS,
            actual: pkt.fields.len(),
        });
    }
    Ok(PlaneInfoFsinn {
        sender: text(pkt, 0),
        receiver: text(pkt, 1),
        airline_icao: text(pkt, 4),
        aircraft_icao: text(pkt, 5),
        combined_type: text(pkt, 10),
        model_string: pkt.rest(11),
    })
}

fn decode_plane_information(pkt: &RawPacket) -> PlaneInformation {
    let mut info = PlaneInformation {
        sender: text(pkt, 0),
        receiver: text(pkt, 1),
        aircraft: String::new(),
        airline: String::new(),
        livery: String::new(),
    };
    for field in pkt.fields.iter().skip(4) {
        if let Some((key, val)) = field.split_once('=') {
            match key {
                "EQUIPMENT" => info.aircraft = val.to_string(),
                "AIRLINE" => info.airline = val.to_string(),
                "LIVERY" => info.livery = val.to_string(),
                _ => {}
            }
        }
    }
    info
}

fn decode_squawk_box(pkt: &RawPacket) -> Result<FsdMessage> {
    match pkt.field(2) {
        PLANE_INFO_REQUEST => Ok(FsdMessage::PlaneInfoRequest(PlaneInfoRequest {
            sender: text(pkt, 0),
            receiver: text(pkt, 1),
        })),
        PLANE_INFO if pkt.field(3) == PLANE_INFO_GENERAL => {
            Ok(FsdMessage::PlaneInformation(decode_plane_information(pkt)))
        }
        FSINN_PLANE_INFO_REQUEST => Ok(FsdMessage::PlaneInfoRequestFsinn(
            decode_plane_info_fsinn(pkt, "FSInn plane information request")?,
        )),
        FSINN_PLANE_INFO => Ok(FsdMessage::PlaneInformationFsinn(decode_plane_info_fsinn(
            pkt,
            "FSInn plane information",
        )?)),
        other => Err(FsdError::UnknownPdu(format!("#SB {other}"))),
    }
}

// ---------------------------------------------------------------------------
// Main decode function
// ---------------------------------------------------------------------------

/// Decode a raw packet into a typed message.
pub fn decode_packet(pkt: &RawPacket) -> Result<FsdMessage> {
    let msg = match pkt.kind {
        PduKind::AddAtc => FsdMessage::AddAtc(decode_add_atc(pkt)?),
        PduKind::AddPilot => FsdMessage::AddPilot(decode_add_pilot(pkt)?),
        PduKind::DeleteAtc => FsdMessage::DeleteAtc(decode_delete(pkt)),
        PduKind::DeletePilot => FsdMessage::DeletePilot(decode_delete(pkt)),
        PduKind::TextMessage => FsdMessage::TextMessage(decode_text_message(pkt)),
        PduKind::PilotDataUpdate => FsdMessage::PilotDataUpdate(decode_pilot_data(pkt)?),
        PduKind::AtcDataUpdate => FsdMessage::AtcDataUpdate(decode_atc_data(pkt)?),
        PduKind::ClientQuery => FsdMessage::ClientQuery(decode_client_query(pkt)),
        PduKind::ClientResponse => FsdMessage::ClientResponse(decode_client_query(pkt)),
        PduKind::FlightPlan => FsdMessage::FlightPlan(decode_flight_plan(pkt)?),
        PduKind::ServerError => FsdMessage::ServerError(decode_server_error(pkt)),
        PduKind::Ping => FsdMessage::Ping(decode_ping(pkt)),
        PduKind::Pong => FsdMessage::Pong(decode_ping(pkt)),
        PduKind::KillRequest => FsdMessage::KillRequest(decode_kill(pkt)),
        PduKind::SquawkBox => decode_squawk_box(pkt)?,
    };
    Ok(msg)
}

/// Decode one FSD line (with or without terminator).
pub fn decode(line: &str) -> Result<FsdMessage> {
    let pkt = parse_line(line)?;
    decode_packet(&pkt)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
