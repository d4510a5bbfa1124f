//! Typed FSD messages and their wire encoding.
//!
//! Decoding lives in `decode`; this module owns the message shapes and
//! `to_line()`, which produces the exact wire form including the `\r\n`
//! terminator.

use serde::Serialize;

use crate::aircraft::AircraftIdentity;
use crate::codec::*;
use crate::frame::join_line;
use crate::types::{frequency_to_wire, pdu_prefix, PduKind};

/// `#SB` sub-type requesting plane information.
pub const PLANE_INFO_REQUEST: &str = "PIR";
/// `#SB` sub-type carrying plane information.
pub const PLANE_INFO: &str = "PI";
/// `#SB` plane information section marker.
pub const PLANE_INFO_GENERAL: &str = "GEN";
/// `#SB` sub-type for FSInn plane information requests.
pub const FSINN_PLANE_INFO_REQUEST: &str = "FSIPIR";
/// `#SB` sub-type for FSInn plane information.
pub const FSINN_PLANE_INFO: &str = "FSIPI";

// ---------------------------------------------------------------------------
// Session messages
// ---------------------------------------------------------------------------

/// `#AA`: controller login.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddAtc {
    pub sender: String,
    pub receiver: String,
    pub real_name: String,
    pub cid: String,
    pub password: String,
    pub rating: AtcRating,
    pub protocol_revision: u32,
}

/// `#AP`: pilot login.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddPilot {
    pub sender: String,
    pub receiver: String,
    pub cid: String,
    pub password: String,
    pub rating: PilotRating,
    pub protocol_revision: u32,
    pub sim_type: SimType,
    pub real_name: String,
}

/// `#DA` / `#DP`: client logoff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteClient {
    pub sender: String,
    pub cid: String,
}

/// `#TM`: text message. Receiver `*` is a broadcast, `@nnnnn` a frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextMessage {
    pub sender: String,
    pub receiver: String,
    pub message: String,
}

impl TextMessage {
    pub fn is_broadcast(&self) -> bool {
        self.receiver == "*"
    }

    pub fn is_radio_message(&self) -> bool {
        self.receiver.starts_with('@')
    }
}

// ---------------------------------------------------------------------------
// Position updates
// ---------------------------------------------------------------------------

/// Pitch, bank, heading, and on-ground flag as packed into the `@` PBH field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PitchBankHeading {
    pub pitch_deg: f64,
    pub bank_deg: f64,
    pub heading_deg: f64,
    pub on_ground: bool,
}

impl PitchBankHeading {
    /// Layout: pitch bits 22-31, bank bits 12-21, heading bits 2-11, on-ground
    /// bit 1. Pitch and bank are signed 10-bit values with inverted sign.
    pub fn unpack(pbh: u32) -> Self {
        let pitch = signed_10bit((pbh >> 22) & 0x3FF);
        let bank = signed_10bit((pbh >> 12) & 0x3FF);
        let heading = ((pbh >> 2) & 0x3FF) as f64;
        PitchBankHeading {
            pitch_deg: pitch as f64 / 1024.0 * -360.0,
            bank_deg: bank as f64 / 1024.0 * -360.0,
            heading_deg: heading / 1024.0 * 360.0,
            on_ground: (pbh >> 1) & 1 == 1,
        }
    }

    pub fn pack(&self) -> u32 {
        let pitch = ((self.pitch_deg / -360.0 * 1024.0).round() as i32) & 0x3FF;
        let bank = ((self.bank_deg / -360.0 * 1024.0).round() as i32) & 0x3FF;
        let heading = ((self.heading_deg.rem_euclid(360.0) / 360.0 * 1024.0).round() as u32) & 0x3FF;
        ((pitch as u32) << 22) | ((bank as u32) << 12) | (heading << 2) | ((self.on_ground as u32) << 1)
    }
}

fn signed_10bit(v: u32) -> i32 {
    let v = v as i32;
    if v >= 512 {
        v - 1024
    } else {
        v
    }
}

/// `@`: pilot position update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PilotDataUpdate {
    pub transponder_mode: TransponderMode,
    pub sender: String,
    pub squawk: String,
    pub rating: PilotRating,
    pub lat: f64,
    pub lon: f64,
    pub altitude_ft: i32,
    pub ground_speed_kts: i32,
    /// Packed pitch/bank/heading, see `PitchBankHeading`
    pub pbh: u32,
    /// Pressure altitude minus true altitude
    pub altitude_delta_ft: i32,
}

impl PilotDataUpdate {
    pub fn attitude(&self) -> PitchBankHeading {
        PitchBankHeading::unpack(self.pbh)
    }
}

/// `%`: controller position update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtcDataUpdate {
    pub sender: String,
    /// Primary frequency in kHz (122800 = 122.800 MHz)
    pub frequency_khz: u32,
    pub facility: FacilityType,
    pub visibility_range_nm: u32,
    pub rating: AtcRating,
    pub lat: f64,
    pub lon: f64,
    pub elevation_ft: i32,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// `$CQ` / `$CR`: client query and response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientQuery {
    pub sender: String,
    pub receiver: String,
    pub query_type: ClientQueryType,
    /// Raw query token, kept so unknown query types re-encode unchanged
    pub query_token: String,
    pub payload: Vec<String>,
}

impl ClientQuery {
    pub fn new(sender: &str, receiver: &str, query_type: ClientQueryType, payload: Vec<String>) -> Self {
        ClientQuery {
            sender: sender.into(),
            receiver: receiver.into(),
            query_type,
            query_token: query_type.to_token().into(),
            payload,
        }
    }

    /// Capability set carried by a `CAPS` response.
    pub fn capabilities(&self) -> Option<Capabilities> {
        if self.query_type != ClientQueryType::Capabilities {
            return None;
        }
        Some(Capabilities::from_fields(&self.payload))
    }

    /// `ATIS` response line type and text.
    pub fn atis_line(&self) -> Option<(AtisLineType, &str)> {
        if self.query_type != ClientQueryType::ATIS {
            return None;
        }
        let line_type = AtisLineType::from_token(self.payload.first()?);
        let text = self.payload.get(1).map(String::as_str).unwrap_or("");
        Some((line_type, text))
    }

    fn tokens(&self) -> Vec<String> {
        let mut tokens = vec![
            self.sender.clone(),
            self.receiver.clone(),
            self.query_token.clone(),
        ];
        tokens.extend(self.payload.iter().cloned());
        tokens
    }
}

/// `$FP`: flight plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightPlan {
    pub sender: String,
    pub receiver: String,
    pub flight_type: FlightType,
    pub aircraft_type: String,
    pub true_cruise_speed_kts: u32,
    pub departure: String,
    pub estimated_departure: u32,
    pub actual_departure: u32,
    pub cruise_altitude: String,
    pub destination: String,
    pub hours_enroute: u32,
    pub minutes_enroute: u32,
    pub fuel_hours: u32,
    pub fuel_minutes: u32,
    pub alternate: String,
    pub remarks: String,
    pub route: String,
}

// ---------------------------------------------------------------------------
// Server and housekeeping
// ---------------------------------------------------------------------------

/// `$ER`: server error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerError {
    pub sender: String,
    pub receiver: String,
    pub code: ServerErrorCode,
    pub causing_parameter: String,
    pub description: String,
}

/// `$PI` / `$PO`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PingPong {
    pub sender: String,
    pub receiver: String,
    pub timestamp: String,
}

/// `$!!`: kill request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillRequest {
    pub sender: String,
    pub receiver: String,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Plane information
// ---------------------------------------------------------------------------

/// `#SB …:PIR`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaneInfoRequest {
    pub sender: String,
    pub receiver: String,
}

/// `#SB …:PI:GEN:EQUIPMENT=…:AIRLINE=…:LIVERY=…`. Empty fields are omitted on
/// the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaneInformation {
    pub sender: String,
    pub receiver: String,
    pub aircraft: String,
    pub airline: String,
    pub livery: String,
}

/// `#SB …:FSIPI:…` / `#SB …:FSIPIR:…`: FSInn plane information with model
/// string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaneInfoFsinn {
    pub sender: String,
    pub receiver: String,
    pub airline_icao: String,
    pub aircraft_icao: String,
    pub combined_type: String,
    pub model_string: String,
}

impl PlaneInfoFsinn {
    fn tokens(&self, subtype: &str) -> Vec<String> {
        vec![
            self.sender.clone(),
            self.receiver.clone(),
            subtype.into(),
            "0".into(),
            self.airline_icao.clone(),
            self.aircraft_icao.clone(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            self.combined_type.clone(),
            self.model_string.clone(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Union
// ---------------------------------------------------------------------------

/// Union type for all decoded FSD messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum FsdMessage {
    AddAtc(AddAtc),
    AddPilot(AddPilot),
    DeleteAtc(DeleteClient),
    DeletePilot(DeleteClient),
    TextMessage(TextMessage),
    PilotDataUpdate(PilotDataUpdate),
    AtcDataUpdate(AtcDataUpdate),
    ClientQuery(ClientQuery),
    ClientResponse(ClientQuery),
    FlightPlan(FlightPlan),
    ServerError(ServerError),
    Ping(PingPong),
    Pong(PingPong),
    KillRequest(KillRequest),
    PlaneInfoRequest(PlaneInfoRequest),
    PlaneInformation(PlaneInformation),
    PlaneInfoRequestFsinn(PlaneInfoFsinn),
    PlaneInformationFsinn(PlaneInfoFsinn),
}

impl FsdMessage {
    /// PDU kind of this message.
    pub fn kind(&self) -> PduKind {
        match self {
            FsdMessage::AddAtc(_) => PduKind::AddAtc,
            FsdMessage::AddPilot(_) => PduKind::AddPilot,
            FsdMessage::DeleteAtc(_) => PduKind::DeleteAtc,
            FsdMessage::DeletePilot(_) => PduKind::DeletePilot,
            FsdMessage::TextMessage(_) => PduKind::TextMessage,
            FsdMessage::PilotDataUpdate(_) => PduKind::PilotDataUpdate,
            FsdMessage::AtcDataUpdate(_) => PduKind::AtcDataUpdate,
            FsdMessage::ClientQuery(_) => PduKind::ClientQuery,
            FsdMessage::ClientResponse(_) => PduKind::ClientResponse,
            FsdMessage::FlightPlan(_) => PduKind::FlightPlan,
            FsdMessage::ServerError(_) => PduKind::ServerError,
            FsdMessage::Ping(_) => PduKind::Ping,
            FsdMessage::Pong(_) => PduKind::Pong,
            FsdMessage::KillRequest(_) => PduKind::KillRequest,
            FsdMessage::PlaneInfoRequest(_)
            | FsdMessage::PlaneInformation(_)
            | FsdMessage::PlaneInfoRequestFsinn(_)
            | FsdMessage::PlaneInformationFsinn(_) => PduKind::SquawkBox,
        }
    }

    /// Callsign of the sending client.
    pub fn sender(&self) -> &str {
        match self {
            FsdMessage::AddAtc(m) => &m.sender,
            FsdMessage::AddPilot(m) => &m.sender,
            FsdMessage::DeleteAtc(m) | FsdMessage::DeletePilot(m) => &m.sender,
            FsdMessage::TextMessage(m) => &m.sender,
            FsdMessage::PilotDataUpdate(m) => &m.sender,
            FsdMessage::AtcDataUpdate(m) => &m.sender,
            FsdMessage::ClientQuery(m) | FsdMessage::ClientResponse(m) => &m.sender,
            FsdMessage::FlightPlan(m) => &m.sender,
            FsdMessage::ServerError(m) => &m.sender,
            FsdMessage::Ping(m) | FsdMessage::Pong(m) => &m.sender,
            FsdMessage::KillRequest(m) => &m.sender,
            FsdMessage::PlaneInfoRequest(m) => &m.sender,
            FsdMessage::PlaneInformation(m) => &m.sender,
            FsdMessage::PlaneInfoRequestFsinn(m) | FsdMessage::PlaneInformationFsinn(m) => {
                &m.sender
            }
        }
    }

    /// Aircraft identity declared by this message, for model matching.
    ///
    /// Only plane information messages (and the FSInn request, which carries
    /// the requester's own data) declare an identity.
    pub fn aircraft_identity(&self) -> Option<AircraftIdentity> {
        match self {
            FsdMessage::PlaneInformation(m) => Some(AircraftIdentity {
                callsign: m.sender.clone(),
                designator: m.aircraft.clone(),
                airline: m.airline.clone(),
                livery: m.livery.clone(),
                ..Default::default()
            }),
            FsdMessage::PlaneInformationFsinn(m) | FsdMessage::PlaneInfoRequestFsinn(m) => {
                Some(AircraftIdentity {
                    callsign: m.sender.clone(),
                    designator: m.aircraft_icao.clone(),
                    combined_type: m.combined_type.clone(),
                    airline: m.airline_icao.clone(),
                    model_string: m.model_string.clone(),
                    ..Default::default()
                })
            }
            _ => None,
        }
    }

    /// Encode to a terminated wire line.
    pub fn to_line(&self) -> String {
        let prefix = pdu_prefix(self.kind());
        let tokens: Vec<String> = match self {
            FsdMessage::AddAtc(m) => vec![
                m.sender.clone(),
                m.receiver.clone(),
                m.real_name.clone(),
                m.cid.clone(),
                m.password.clone(),
                m.rating.to_token().into(),
                m.protocol_revision.to_string(),
            ],
            FsdMessage::AddPilot(m) => vec![
                m.sender.clone(),
                m.receiver.clone(),
                m.cid.clone(),
                m.password.clone(),
                m.rating.to_token().into(),
                m.protocol_revision.to_string(),
                m.sim_type.to_token().into(),
                m.real_name.clone(),
            ],
            FsdMessage::DeleteAtc(m) | FsdMessage::DeletePilot(m) => {
                vec![m.sender.clone(), m.cid.clone()]
            }
            FsdMessage::TextMessage(m) => {
                vec![m.sender.clone(), m.receiver.clone(), m.message.clone()]
            }
            FsdMessage::PilotDataUpdate(m) => vec![
                m.transponder_mode.to_token().into(),
                m.sender.clone(),
                m.squawk.clone(),
                m.rating.to_token().into(),
                format!("{:.5}", m.lat),
                format!("{:.5}", m.lon),
                m.altitude_ft.to_string(),
                m.ground_speed_kts.to_string(),
                m.pbh.to_string(),
                m.altitude_delta_ft.to_string(),
            ],
            FsdMessage::AtcDataUpdate(m) => vec![
                m.sender.clone(),
                frequency_to_wire(m.frequency_khz),
                m.facility.to_token().into(),
                m.visibility_range_nm.to_string(),
                m.rating.to_token().into(),
                format!("{:.5}", m.lat),
                format!("{:.5}", m.lon),
                m.elevation_ft.to_string(),
            ],
            FsdMessage::ClientQuery(m) | FsdMessage::ClientResponse(m) => m.tokens(),
            FsdMessage::FlightPlan(m) => vec![
                m.sender.clone(),
                m.receiver.clone(),
                m.flight_type.to_token().into(),
                m.aircraft_type.clone(),
                m.true_cruise_speed_kts.to_string(),
                m.departure.clone(),
                m.estimated_departure.to_string(),
                m.actual_departure.to_string(),
                m.cruise_altitude.clone(),
                m.destination.clone(),
                m.hours_enroute.to_string(),
                m.minutes_enroute.to_string(),
                m.fuel_hours.to_string(),
                m.fuel_minutes.to_string(),
                m.alternate.clone(),
                m.remarks.clone(),
                m.route.clone(),
            ],
            FsdMessage::ServerError(m) => vec![
                m.sender.clone(),
                m.receiver.clone(),
                m.code.to_token().into(),
                m.causing_parameter.clone(),
                m.description.clone(),
            ],
            FsdMessage::Ping(m) | FsdMessage::Pong(m) => {
                vec![m.sender.clone(), m.receiver.clone(), m.timestamp.clone()]
            }
            FsdMessage::KillRequest(m) => {
                vec![m.sender.clone(), m.receiver.clone(), m.reason.clone()]
            }
            FsdMessage::PlaneInfoRequest(m) => vec![
                m.sender.clone(),
                m.receiver.clone(),
                PLANE_INFO_REQUEST.into(),
            ],
            FsdMessage::PlaneInformation(m) => {
                let mut tokens = vec![
                    m.sender.clone(),
                    m.receiver.clone(),
                    PLANE_INFO.into(),
                    PLANE_INFO_GENERAL.into(),
                ];
                if !m.aircraft.is_empty() {
                    tokens.push(format!("EQUIPMENT={}", m.aircraft));
                }
                if !m.airline.is_empty() {
                    tokens.push(format!("AIRLINE={}", m.airline));
                }
                if !m.livery.is_empty() {
                    tokens.push(format!("LIVERY={}", m.livery));
                }
                tokens
            }
            FsdMessage::PlaneInfoRequestFsinn(m) => m.tokens(FSINN_PLANE_INFO_REQUEST),
            FsdMessage::PlaneInformationFsinn(m) => m.tokens(FSINN_PLANE_INFO),
        };
        join_line(prefix, &tokens)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pbh_unpack_heading() {
        // heading 90° = 256/1024, on ground
        let pbh = (256 << 2) | (1 << 1);
        let att = PitchBankHeading::unpack(pbh);
        assert!((att.heading_deg - 90.0).abs() < 1e-9);
        assert_eq!(att.pitch_deg, 0.0);
        assert!(att.on_ground);
    }

    #[test]
    fn test_pbh_pack_signed() {
        let att = PitchBankHeading {
            pitch_deg: 5.625,
            bank_deg: -11.25,
            heading_deg: 270.0,
            on_ground: false,
        };
        let back = PitchBankHeading::unpack(att.pack());
        assert!((back.pitch_deg - 5.625).abs() < 0.01);
        assert!((back.bank_deg + 11.25).abs() < 0.01);
        assert!((back.heading_deg - 270.0).abs() < 0.01);
        assert!(!back.on_ground);
    }

    #[test]
    fn test_plane_information_omits_empty() {
        let msg = FsdMessage::PlaneInformation(PlaneInformation {
            sender: "DLH123".into(),
            receiver: "BAW12".into(),
            aircraft: "A320".into(),
            airline: String::new(),
            livery: "DLH.STD".into(),
        });
        assert_eq!(
            msg.to_line(),
            "#SBDLH123:BAW12:PI:GEN:EQUIPMENT=A320:LIVERY=DLH.STD\r\n"
        );
    }

    #[test]
    fn test_fsinn_tokens() {
        let msg = FsdMessage::PlaneInformationFsinn(PlaneInfoFsinn {
            sender: "DLH123".into(),
            receiver: "BAW12".into(),
            airline_icao: "DLH".into(),
            aircraft_icao: "A320".into(),
            combined_type: "L2J".into(),
            model_string: "FSPX A320 DLH".into(),
        });
        assert_eq!(
            msg.to_line(),
            "#SBDLH123:BAW12:FSIPI:0:DLH:A320:::::L2J:FSPX A320 DLH\r\n"
        );
    }

    #[test]
    fn test_identity_from_plane_information() {
        let msg = FsdMessage::PlaneInformation(PlaneInformation {
            sender: "DLH123".into(),
            receiver: "BAW12".into(),
            aircraft: "A320".into(),
            airline: "DLH".into(),
            livery: String::new(),
        });
        let id = msg.aircraft_identity().unwrap();
        assert_eq!(id.callsign, "DLH123");
        assert_eq!(id.designator, "A320");
        assert_eq!(id.airline, "DLH");
    }

    #[test]
    fn test_identity_absent_for_other_messages() {
        let msg = FsdMessage::Ping(PingPong {
            sender: "A".into(),
            receiver: "B".into(),
            timestamp: "1".into(),
        });
        assert!(msg.aircraft_identity().is_none());
        assert_eq!(msg.sender(), "A");
    }

    #[test]
    fn test_client_query_capabilities() {
        let q = ClientQuery::new(
            "EDDM_TWR",
            "DLH123",
            ClientQueryType::Capabilities,
            vec!["ATCINFO=1".into(), "FASTPOS=1".into()],
        );
        let caps = q.capabilities().unwrap();
        assert!(caps.contains(Capability::FastPos));
        assert!(ClientQuery::new("A", "B", ClientQueryType::RealName, vec![])
            .capabilities()
            .is_none());
    }
}
