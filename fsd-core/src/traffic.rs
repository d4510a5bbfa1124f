//! Per-callsign traffic state machine over decoded FSD messages.
//!
//! Pure logic, no I/O. Produces `TrafficEvent` outputs; the caller decides
//! what to do with them (typically: run the model matcher on
//! `IdentityChanged`).

use std::collections::HashMap;

use crate::aircraft::AircraftIdentity;
use crate::codec::{PilotRating, SimType, TransponderMode};
use crate::decode::decode;
use crate::message::FsdMessage;

/// Pilot considered stale after this many seconds of silence.
pub const STALE_TIMEOUT: f64 = 60.0;

// ---------------------------------------------------------------------------
// Traffic events (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum TrafficEvent {
    /// First message from this callsign.
    NewAircraft { callsign: String, timestamp: f64 },
    /// Declared aircraft identity changed; match a model again.
    IdentityChanged {
        callsign: String,
        identity: AircraftIdentity,
    },
    PositionUpdate {
        callsign: String,
        lat: f64,
        lon: f64,
        altitude_ft: i32,
        ground_speed_kts: i32,
        heading_deg: f64,
        timestamp: f64,
    },
    /// Pilot disconnected.
    Removed { callsign: String },
}

// ---------------------------------------------------------------------------
// Pilot state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PilotState {
    pub callsign: String,
    pub real_name: String,
    pub rating: PilotRating,
    pub sim_type: SimType,
    pub identity: AircraftIdentity,

    // Position
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub altitude_ft: Option<i32>,
    pub ground_speed_kts: Option<i32>,
    pub heading_deg: Option<f64>,
    pub on_ground: bool,
    pub squawk: Option<String>,
    pub transponder: TransponderMode,

    pub first_seen: f64,
    pub last_seen: f64,
    pub message_count: u64,
}

impl PilotState {
    pub fn new(callsign: &str, timestamp: f64) -> Self {
        PilotState {
            callsign: callsign.to_string(),
            real_name: String::new(),
            rating: PilotRating::default(),
            sim_type: SimType::default(),
            identity: AircraftIdentity::new(callsign),
            lat: None,
            lon: None,
            altitude_ft: None,
            ground_speed_kts: None,
            heading_deg: None,
            on_ground: false,
            squawk: None,
            transponder: TransponderMode::default(),
            first_seen: timestamp,
            last_seen: timestamp,
            message_count: 0,
        }
    }

    pub fn has_position(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }

    pub fn age(&self, now: f64) -> f64 {
        now - self.last_seen
    }

    pub fn is_stale(&self, now: f64) -> bool {
        self.age(now) > STALE_TIMEOUT
    }

    /// Merge non-empty declared fields into the identity. Returns true if
    /// anything changed.
    fn merge_identity(&mut self, declared: &AircraftIdentity) -> bool {
        let before = self.identity.clone();
        let id = &mut self.identity;
        for (dst, src) in [
            (&mut id.designator, &declared.designator),
            (&mut id.combined_type, &declared.combined_type),
            (&mut id.manufacturer, &declared.manufacturer),
            (&mut id.airline, &declared.airline),
            (&mut id.livery, &declared.livery),
            (&mut id.model_string, &declared.model_string),
        ] {
            let src = src.trim();
            if !src.is_empty() {
                *dst = src.to_string();
            }
        }
        id.military |= declared.military;
        self.identity != before
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Track remote pilots from decoded messages.
#[derive(Debug, Default)]
pub struct TrafficTracker {
    pub pilots: HashMap<String, PilotState>,

    // Counters
    pub total_lines: u64,
    pub decoded_lines: u64,
    pub decode_errors: u64,
}

impl TrafficTracker {
    pub fn new() -> Self {
        TrafficTracker::default()
    }

    /// Decode one wire line and process it. Undecodable lines are counted
    /// and produce no events.
    pub fn update_line(&mut self, line: &str, timestamp: f64) -> (Option<FsdMessage>, Vec<TrafficEvent>) {
        self.total_lines += 1;
        let msg = match decode(line) {
            Ok(m) => m,
            Err(e) => {
                self.decode_errors += 1;
                tracing::debug!(error = %e, "Skipping undecodable line");
                return (None, Vec::new());
            }
        };
        self.decoded_lines += 1;
        let events = self.update(&msg, timestamp);
        (Some(msg), events)
    }

    /// Process one decoded message.
    pub fn update(&mut self, msg: &FsdMessage, timestamp: f64) -> Vec<TrafficEvent> {
        let mut events = Vec::new();

        if let FsdMessage::DeletePilot(m) = msg {
            if self.pilots.remove(&m.sender).is_some() {
                events.push(TrafficEvent::Removed {
                    callsign: m.sender.clone(),
                });
            }
            return events;
        }

        let tracked = matches!(
            msg,
            FsdMessage::AddPilot(_)
                | FsdMessage::PilotDataUpdate(_)
                | FsdMessage::PlaneInformation(_)
                | FsdMessage::PlaneInformationFsinn(_)
                | FsdMessage::PlaneInfoRequestFsinn(_)
        );
        let callsign = msg.sender();
        if !tracked || callsign.is_empty() {
            return events;
        }

        if !self.pilots.contains_key(callsign) {
            events.push(TrafficEvent::NewAircraft {
                callsign: callsign.to_string(),
                timestamp,
            });
            self.pilots
                .insert(callsign.to_string(), PilotState::new(callsign, timestamp));
        }
        let Some(pilot) = self.pilots.get_mut(callsign) else {
            return events;
        };
        pilot.last_seen = timestamp;
        pilot.message_count += 1;

        match msg {
            FsdMessage::AddPilot(m) => {
                pilot.real_name = m.real_name.clone();
                pilot.rating = m.rating;
                pilot.sim_type = m.sim_type;
            }
            FsdMessage::PilotDataUpdate(m) => {
                let attitude = m.attitude();
                pilot.lat = Some(m.lat);
                pilot.lon = Some(m.lon);
                pilot.altitude_ft = Some(m.altitude_ft);
                pilot.ground_speed_kts = Some(m.ground_speed_kts);
                pilot.heading_deg = Some(attitude.heading_deg);
                pilot.on_ground = attitude.on_ground;
                pilot.squawk = Some(m.squawk.clone());
                pilot.transponder = m.transponder_mode;
                pilot.rating = m.rating;
                events.push(TrafficEvent::PositionUpdate {
                    callsign: pilot.callsign.clone(),
                    lat: m.lat,
                    lon: m.lon,
                    altitude_ft: m.altitude_ft,
                    ground_speed_kts: m.ground_speed_kts,
                    heading_deg: attitude.heading_deg,
                    timestamp,
                });
            }
            _ => {
                if let Some(declared) = msg.aircraft_identity() {
                    if pilot.merge_identity(&declared) {
                        tracing::debug!(
                            callsign = %pilot.callsign,
                            designator = %pilot.identity.designator,
                            airline = %pilot.identity.airline,
                            "Identity changed"
                        );
                        events.push(TrafficEvent::IdentityChanged {
                            callsign: pilot.callsign.clone(),
                            identity: pilot.identity.clone(),
                        });
                    }
                }
            }
        }
        events
    }

    /// Pilots seen within the stale timeout, most recent first.
    pub fn get_active(&self, now: f64) -> Vec<&PilotState> {
        let mut active: Vec<_> = self.pilots.values().filter(|p| !p.is_stale(now)).collect();
        active.sort_by(|a, b| b.last_seen.total_cmp(&a.last_seen));
        active
    }

    /// Remove stale pilots. Returns count removed.
    pub fn prune_stale(&mut self, now: f64) -> usize {
        let before = self.pilots.len();
        self.pilots.retain(|_, p| !p.is_stale(now));
        before - self.pilots.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ADD_PILOT: &str = "#APDLH123:SERVER:1234567:secret:1:101:9:Hans Meier";
    const POSITION: &str = "@N:DLH123:2000:1:50.03330:8.57050:1500:140:4261412864:20";
    const PLANE_INFO: &str = "#SBDLH123:BAW45:PI:GEN:EQUIPMENT=B738:AIRLINE=DLH:LIVERY=DLH.STD";

    #[test]
    fn test_new_aircraft_event() {
        let mut tracker = TrafficTracker::new();
        let (msg, events) = tracker.update_line(ADD_PILOT, 1.0);
        assert!(msg.is_some());
        assert_eq!(
            events,
            vec![TrafficEvent::NewAircraft {
                callsign: "DLH123".into(),
                timestamp: 1.0
            }]
        );
        let pilot = &tracker.pilots["DLH123"];
        assert_eq!(pilot.real_name, "Hans Meier");
        assert_eq!(pilot.sim_type, SimType::MSFSX);
    }

    #[test]
    fn test_position_update() {
        let mut tracker = TrafficTracker::new();
        tracker.update_line(ADD_PILOT, 1.0);
        let (_, events) = tracker.update_line(POSITION, 2.0);
        assert!(events
            .iter()
            .any(|e| matches!(e, TrafficEvent::PositionUpdate { altitude_ft: 1500, .. })));
        let pilot = &tracker.pilots["DLH123"];
        assert!(pilot.has_position());
        assert_eq!(pilot.squawk.as_deref(), Some("2000"));
        assert_eq!(pilot.transponder, TransponderMode::ModeC);
        assert_eq!(pilot.message_count, 2);
    }

    #[test]
    fn test_identity_changed_once() {
        let mut tracker = TrafficTracker::new();
        let (_, events) = tracker.update_line(PLANE_INFO, 1.0);
        assert_eq!(events.len(), 2);
        match &events[1] {
            TrafficEvent::IdentityChanged { callsign, identity } => {
                assert_eq!(callsign, "DLH123");
                assert_eq!(identity.designator, "B738");
                assert_eq!(identity.livery, "DLH.STD");
            }
            other => panic!("unexpected event {other:?}"),
        }

        // Same information again: no change.
        let (_, events) = tracker.update_line(PLANE_INFO, 2.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_fsinn_identity_merges_model_string() {
        let mut tracker = TrafficTracker::new();
        tracker.update_line(PLANE_INFO, 1.0);
        let fsinn = "#SBDLH123:BAW45:FSIPI:0:DLH:B738:::::L2J:PMDG 737-800 Lufthansa";
        let (_, events) = tracker.update_line(fsinn, 2.0);
        assert_eq!(events.len(), 1);
        let identity = &tracker.pilots["DLH123"].identity;
        assert_eq!(identity.model_string, "PMDG 737-800 Lufthansa");
        assert_eq!(identity.combined_type, "L2J");
        assert_eq!(identity.livery, "DLH.STD");
    }

    #[test]
    fn test_delete_pilot_removes() {
        let mut tracker = TrafficTracker::new();
        tracker.update_line(ADD_PILOT, 1.0);
        let (_, events) = tracker.update_line("#DPDLH123:1234567", 2.0);
        assert_eq!(
            events,
            vec![TrafficEvent::Removed {
                callsign: "DLH123".into()
            }]
        );
        assert!(tracker.pilots.is_empty());

        let (_, events) = tracker.update_line("#DPDLH123:1234567", 3.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_untracked_and_bad_lines() {
        let mut tracker = TrafficTracker::new();
        let (msg, events) = tracker.update_line("#TMDLH123:@22800:hello", 1.0);
        assert!(msg.is_some());
        assert!(events.is_empty());
        let (msg, _) = tracker.update_line("garbage", 1.0);
        assert!(msg.is_none());
        assert_eq!(tracker.total_lines, 2);
        assert_eq!(tracker.decoded_lines, 1);
        assert_eq!(tracker.decode_errors, 1);
    }

    #[test]
    fn test_stale_and_prune() {
        let mut tracker = TrafficTracker::new();
        tracker.update_line(ADD_PILOT, 1.0);
        tracker.update_line("#APBAW45:SERVER:7654321:pw:1:101:9:Jane Doe", 50.0);
        assert_eq!(tracker.get_active(70.0).len(), 1);
        assert_eq!(tracker.get_active(70.0)[0].callsign, "BAW45");
        assert_eq!(tracker.prune_stale(70.0), 1);
        assert!(tracker.pilots.contains_key("BAW45"));
    }
}
