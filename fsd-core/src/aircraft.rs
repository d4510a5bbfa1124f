//! Aircraft, airline, livery, and simulator model value types.
//!
//! These are the inputs and outputs of model matching: a remote pilot's
//! declared `AircraftIdentity`, and the `AircraftModel` records describing
//! installed simulator models.

use serde::{Deserialize, Serialize};

use crate::codec::SimType;
use crate::types::callsign_airline_prefix;

/// Prefix marking a colour livery combined code (`_CC_FFFFFF_0000FF`).
pub const COLOR_LIVERY_MARKER: &str = "_CC_";

/// Livery code of an airline's standard scheme (`DLH.STD`).
pub const STANDARD_LIVERY_CODE: &str = "STD";

// ---------------------------------------------------------------------------
// ICAO codes
// ---------------------------------------------------------------------------

/// ICAO aircraft type designator with descriptive data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftIcaoCode {
    /// Type designator, e.g. `B738`
    pub designator: String,
    /// Combined type, e.g. `L2J` (landplane, 2 engines, jet)
    pub combined_type: String,
    pub manufacturer: String,
    /// Family designator, e.g. `A320` for A319/A320/A321
    pub family: String,
    pub military: bool,
}

impl AircraftIcaoCode {
    pub fn new(designator: &str) -> Self {
        AircraftIcaoCode {
            designator: designator.trim().to_ascii_uppercase(),
            ..Default::default()
        }
    }

    pub fn has_designator(&self) -> bool {
        !self.designator.is_empty()
    }

    pub fn has_family(&self) -> bool {
        !self.family.is_empty()
    }

    /// Combined type is valid when it has the three-character `L2J` shape.
    pub fn has_valid_combined_type(&self) -> bool {
        is_valid_combined_type(&self.combined_type)
    }

    pub(crate) fn normalize(&mut self) {
        self.designator = self.designator.trim().to_ascii_uppercase();
        self.combined_type = self.combined_type.trim().to_ascii_uppercase();
        self.family = self.family.trim().to_ascii_uppercase();
    }
}

/// Check the `L2J` combined-type shape: aircraft class, engine count, engine type.
pub fn is_valid_combined_type(code: &str) -> bool {
    let b = code.as_bytes();
    b.len() == 3 && b[0].is_ascii_alphabetic() && b[1].is_ascii_digit() && b[2].is_ascii_alphabetic()
}

/// ICAO airline designator with descriptive data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirlineIcaoCode {
    /// Designator, e.g. `DLH`
    pub designator: String,
    pub name: String,
    pub telephony: String,
    /// Virtual airline (not a real operator)
    pub is_virtual: bool,
    pub military: bool,
}

impl AirlineIcaoCode {
    pub fn new(designator: &str) -> Self {
        AirlineIcaoCode {
            designator: designator.trim().to_ascii_uppercase(),
            ..Default::default()
        }
    }

    pub fn has_designator(&self) -> bool {
        !self.designator.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Livery
// ---------------------------------------------------------------------------

/// Paint scheme, identified by a combined code `<AIRLINE>.<CODE>` or a colour
/// code starting with `_CC_`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Livery {
    pub combined_code: String,
    pub airline: AirlineIcaoCode,
    pub description: String,
}

impl Livery {
    /// Build a livery from its combined code. The airline is taken from the
    /// part before the first `.`.
    pub fn from_combined_code(code: &str) -> Self {
        let code = code.trim().to_ascii_uppercase();
        let airline = if code.starts_with(COLOR_LIVERY_MARKER) {
            AirlineIcaoCode::default()
        } else {
            match code.split_once('.') {
                Some((airline, _)) => AirlineIcaoCode::new(airline),
                None => AirlineIcaoCode::default(),
            }
        };
        Livery {
            combined_code: code,
            airline,
            description: String::new(),
        }
    }

    /// Standard livery of an airline (`DLH.STD`).
    pub fn standard_for(airline: &AirlineIcaoCode) -> Self {
        Livery {
            combined_code: format!("{}.{}", airline.designator, STANDARD_LIVERY_CODE),
            airline: airline.clone(),
            description: "Standard livery".into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.combined_code.is_empty() && !self.airline.has_designator()
    }

    pub fn has_combined_code(&self) -> bool {
        !self.combined_code.is_empty()
    }

    pub fn airline_designator(&self) -> &str {
        &self.airline.designator
    }

    pub fn is_color_livery(&self) -> bool {
        self.combined_code.starts_with(COLOR_LIVERY_MARKER)
    }

    pub fn is_airline_standard(&self) -> bool {
        self.airline.has_designator()
            && self
                .combined_code
                .strip_prefix(self.airline.designator.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                == Some(STANDARD_LIVERY_CODE)
    }

    pub(crate) fn normalize(&mut self) {
        self.combined_code = self.combined_code.trim().to_ascii_uppercase();
        self.airline.designator = self.airline.designator.trim().to_ascii_uppercase();
        if !self.airline.has_designator() && !self.is_color_livery() {
            if let Some((airline, _)) = self.combined_code.split_once('.') {
                self.airline.designator = airline.to_string();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Simulator model
// ---------------------------------------------------------------------------

/// Where a model record came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    #[default]
    Unknown,
    /// Installed in the local simulator
    OwnSimulator,
    /// Reported by a remote FSInn-compatible client
    FsInnData,
    /// Queried from the network (plane information)
    QueriedFromNetwork,
    /// Fallback used when nothing matched
    DefaultFallback,
    /// Result of model matching
    Matched,
    /// Completed by reverse lookup
    ReverseLookup,
}

/// Simulator platform a model is installed for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulatorPlatform {
    #[default]
    Unspecified,
    Fs9,
    Fsx,
    P3d,
    XPlane,
    FlightGear,
}

impl SimulatorPlatform {
    /// Platform of an FSD-reported simulator.
    pub fn from_sim_type(sim: SimType) -> Self {
        match sim {
            SimType::MSFS2004 => SimulatorPlatform::Fs9,
            SimType::MSFSX => SimulatorPlatform::Fsx,
            SimType::P3Dv1 | SimType::P3Dv2 | SimType::P3Dv3 | SimType::P3Dv4 => {
                SimulatorPlatform::P3d
            }
            SimType::XPLANE8 | SimType::XPLANE9 | SimType::XPLANE10 | SimType::XPLANE11 => {
                SimulatorPlatform::XPlane
            }
            SimType::FlightGear => SimulatorPlatform::FlightGear,
            _ => SimulatorPlatform::Unspecified,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "any" | "unspecified" => Some(SimulatorPlatform::Unspecified),
            "fs9" | "fs2004" => Some(SimulatorPlatform::Fs9),
            "fsx" => Some(SimulatorPlatform::Fsx),
            "p3d" => Some(SimulatorPlatform::P3d),
            "xplane" | "x-plane" | "xp" => Some(SimulatorPlatform::XPlane),
            "flightgear" | "fg" => Some(SimulatorPlatform::FlightGear),
            _ => None,
        }
    }
}

impl std::fmt::Display for SimulatorPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulatorPlatform::Unspecified => write!(f, "any"),
            SimulatorPlatform::Fs9 => write!(f, "FS9"),
            SimulatorPlatform::Fsx => write!(f, "FSX"),
            SimulatorPlatform::P3d => write!(f, "P3D"),
            SimulatorPlatform::XPlane => write!(f, "X-Plane"),
            SimulatorPlatform::FlightGear => write!(f, "FlightGear"),
        }
    }
}

/// A simulator model: installed candidate, match result, or reverse-lookup
/// subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftModel {
    /// Simulator-specific model identifier (primary key, case-insensitive)
    pub model_string: String,
    pub aircraft_icao: AircraftIcaoCode,
    pub livery: Livery,
    pub simulator: SimulatorPlatform,
    pub model_type: ModelType,
    /// Callsign of the aircraft this model is assigned to, if any
    pub callsign: String,
}

impl AircraftModel {
    pub fn new(model_string: &str, designator: &str, livery_code: &str) -> Self {
        AircraftModel {
            model_string: model_string.trim().to_string(),
            aircraft_icao: AircraftIcaoCode::new(designator),
            livery: Livery::from_combined_code(livery_code),
            simulator: SimulatorPlatform::Unspecified,
            model_type: ModelType::OwnSimulator,
            callsign: String::new(),
        }
    }

    pub fn with_simulator(mut self, simulator: SimulatorPlatform) -> Self {
        self.simulator = simulator;
        self
    }

    pub fn with_model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }

    pub fn has_model_string(&self) -> bool {
        !self.model_string.is_empty()
    }

    /// Case-insensitive model string key.
    pub fn model_key(&self) -> String {
        model_key(&self.model_string)
    }

    pub fn designator(&self) -> &str {
        &self.aircraft_icao.designator
    }

    pub fn airline_designator(&self) -> &str {
        self.livery.airline_designator()
    }

    /// Uppercase codes and derive the airline from the livery code where missing.
    pub fn normalized(mut self) -> Self {
        self.model_string = self.model_string.trim().to_string();
        self.aircraft_icao.normalize();
        self.livery.normalize();
        self
    }
}

/// Case-insensitive key for a model string.
pub fn model_key(model_string: &str) -> String {
    model_string.trim().to_ascii_uppercase()
}

// ---------------------------------------------------------------------------
// Remote identity
// ---------------------------------------------------------------------------

/// What a remote pilot declares about their aircraft. Input to matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftIdentity {
    pub callsign: String,
    /// ICAO aircraft type designator
    pub designator: String,
    pub combined_type: String,
    pub manufacturer: String,
    /// ICAO airline designator
    pub airline: String,
    /// Livery combined code
    pub livery: String,
    /// Model string reported by the remote simulator
    pub model_string: String,
    pub military: bool,
}

impl AircraftIdentity {
    pub fn new(callsign: &str) -> Self {
        AircraftIdentity {
            callsign: callsign.trim().to_string(),
            ..Default::default()
        }
    }

    /// Airline designator, falling back to the callsign prefix when none was
    /// declared.
    pub fn effective_airline(&self) -> Option<String> {
        let airline = self.airline.trim();
        if !airline.is_empty() {
            return Some(airline.to_ascii_uppercase());
        }
        callsign_airline_prefix(&self.callsign)
    }

    /// Convert to a model record for reverse lookup or display.
    pub fn to_model(&self) -> AircraftModel {
        let mut livery = Livery::from_combined_code(&self.livery);
        if !livery.airline.has_designator() && !livery.is_color_livery() {
            livery.airline = AirlineIcaoCode::new(&self.airline);
        }
        AircraftModel {
            model_string: self.model_string.trim().to_string(),
            aircraft_icao: AircraftIcaoCode {
                designator: self.designator.trim().to_ascii_uppercase(),
                combined_type: self.combined_type.trim().to_ascii_uppercase(),
                manufacturer: self.manufacturer.trim().to_string(),
                family: String::new(),
                military: self.military,
            },
            livery,
            simulator: SimulatorPlatform::Unspecified,
            model_type: ModelType::QueriedFromNetwork,
            callsign: self.callsign.clone(),
        }
    }

    /// Identity described by a model record (e.g. after reverse lookup).
    pub fn from_model(model: &AircraftModel) -> Self {
        AircraftIdentity {
            callsign: model.callsign.clone(),
            designator: model.aircraft_icao.designator.clone(),
            combined_type: model.aircraft_icao.combined_type.clone(),
            manufacturer: model.aircraft_icao.manufacturer.clone(),
            airline: model.livery.airline.designator.clone(),
            livery: model.livery.combined_code.clone(),
            model_string: model.model_string.clone(),
            military: model.aircraft_icao.military,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_livery_from_combined_code() {
        let livery = Livery::from_combined_code("dlh.std");
        assert_eq!(livery.combined_code, "DLH.STD");
        assert_eq!(livery.airline_designator(), "DLH");
        assert!(livery.is_airline_standard());
        assert!(!livery.is_color_livery());
    }

    #[test]
    fn test_color_livery_has_no_airline() {
        let livery = Livery::from_combined_code("_CC_FFFFFF_0000FF");
        assert!(livery.is_color_livery());
        assert_eq!(livery.airline_designator(), "");
        assert!(!livery.is_airline_standard());
    }

    #[test]
    fn test_standard_for() {
        let livery = Livery::standard_for(&AirlineIcaoCode::new("baw"));
        assert_eq!(livery.combined_code, "BAW.STD");
        assert!(livery.is_airline_standard());
    }

    #[test]
    fn test_combined_type_shape() {
        assert!(is_valid_combined_type("L2J"));
        assert!(!is_valid_combined_type("L2"));
        assert!(!is_valid_combined_type("2LJ"));
    }

    #[test]
    fn test_model_normalized_fills_airline() {
        let model = AircraftModel {
            model_string: " Some Model ".into(),
            aircraft_icao: AircraftIcaoCode {
                designator: "b738".into(),
                ..Default::default()
            },
            livery: Livery {
                combined_code: "dlh.retro".into(),
                ..Default::default()
            },
            ..Default::default()
        }
        .normalized();
        assert_eq!(model.model_string, "Some Model");
        assert_eq!(model.designator(), "B738");
        assert_eq!(model.airline_designator(), "DLH");
        assert_eq!(model.model_key(), "SOME MODEL");
    }

    #[test]
    fn test_identity_effective_airline() {
        let mut id = AircraftIdentity::new("DLH4AB");
        assert_eq!(id.effective_airline(), Some("DLH".into()));
        id.airline = "ewg".into();
        assert_eq!(id.effective_airline(), Some("EWG".into()));
        assert_eq!(AircraftIdentity::new("DEABC").effective_airline(), None);
    }

    #[test]
    fn test_identity_to_model() {
        let id = AircraftIdentity {
            callsign: "BAW12".into(),
            designator: "a320".into(),
            airline: "BAW".into(),
            model_string: "FSPX A320 BAW".into(),
            ..Default::default()
        };
        let model = id.to_model();
        assert_eq!(model.designator(), "A320");
        assert_eq!(model.airline_designator(), "BAW");
        assert_eq!(model.model_type, ModelType::QueriedFromNetwork);
        assert_eq!(AircraftIdentity::from_model(&model).airline, "BAW");
    }

    #[test]
    fn test_simulator_platform() {
        assert_eq!(
            SimulatorPlatform::from_sim_type(SimType::P3Dv2),
            SimulatorPlatform::P3d
        );
        assert_eq!(SimulatorPlatform::parse("X-Plane"), Some(SimulatorPlatform::XPlane));
        assert_eq!(SimulatorPlatform::parse("msfs2020"), None);
    }
}
