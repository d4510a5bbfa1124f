//! Enum ↔ wire token codec for FSD protocol fields.
//!
//! Every enumerated field on the FSD wire is a short ASCII token. Encoding is
//! total. Decoding is total as well: a token outside the known set resolves to
//! the type's designated default instead of failing, so callers can feed
//! malformed input straight through.
//!
//! Several mappings are many-to-one and therefore lossy on decode:
//! - every P3D version encodes as `"30"`, which decodes to `P3Dv4`
//! - every "on" transponder mode encodes as `"N"`, which decodes to `ModeC`
//!
//! These collapses are what the live network expects and must not be "fixed".

use serde::{Deserialize, Serialize};

/// Bidirectional mapping between a value and its FSD wire token.
pub trait WireToken: Sized {
    /// Token sent on the wire. Defined for every value.
    fn to_token(&self) -> &'static str;

    /// Parse a wire token. Unknown tokens map to the type's default member.
    fn from_token(token: &str) -> Self;
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

/// Controller rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AtcRating {
    #[default]
    Unknown,
    Observer,
    Student,
    Student2,
    Student3,
    Controller1,
    Controller2,
    Controller3,
    Instructor1,
    Instructor2,
    Instructor3,
    Supervisor,
    Administrator,
}

impl AtcRating {
    pub const ALL: &'static [AtcRating] = &[
        AtcRating::Unknown,
        AtcRating::Observer,
        AtcRating::Student,
        AtcRating::Student2,
        AtcRating::Student3,
        AtcRating::Controller1,
        AtcRating::Controller2,
        AtcRating::Controller3,
        AtcRating::Instructor1,
        AtcRating::Instructor2,
        AtcRating::Instructor3,
        AtcRating::Supervisor,
        AtcRating::Administrator,
    ];
}

impl WireToken for AtcRating {
    fn to_token(&self) -> &'static str {
        match self {
            AtcRating::Unknown => "0",
            AtcRating::Observer => "1",
            AtcRating::Student => "2",
            AtcRating::Student2 => "3",
            AtcRating::Student3 => "4",
            AtcRating::Controller1 => "5",
            AtcRating::Controller2 => "6",
            AtcRating::Controller3 => "7",
            AtcRating::Instructor1 => "8",
            AtcRating::Instructor2 => "9",
            AtcRating::Instructor3 => "10",
            AtcRating::Supervisor => "11",
            AtcRating::Administrator => "12",
        }
    }

    fn from_token(token: &str) -> Self {
        match token {
            "1" => AtcRating::Observer,
            "2" => AtcRating::Student,
            "3" => AtcRating::Student2,
            "4" => AtcRating::Student3,
            "5" => AtcRating::Controller1,
            "6" => AtcRating::Controller2,
            "7" => AtcRating::Controller3,
            "8" => AtcRating::Instructor1,
            "9" => AtcRating::Instructor2,
            "10" => AtcRating::Instructor3,
            "11" => AtcRating::Supervisor,
            "12" => AtcRating::Administrator,
            _ => AtcRating::Unknown,
        }
    }
}

/// Pilot rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PilotRating {
    #[default]
    Unknown,
    Student,
    VFR,
    IFR,
    Instructor,
    Supervisor,
}

impl PilotRating {
    pub const ALL: &'static [PilotRating] = &[
        PilotRating::Unknown,
        PilotRating::Student,
        PilotRating::VFR,
        PilotRating::IFR,
        PilotRating::Instructor,
        PilotRating::Supervisor,
    ];
}

impl WireToken for PilotRating {
    fn to_token(&self) -> &'static str {
        match self {
            PilotRating::Unknown => "0",
            PilotRating::Student => "1",
            PilotRating::VFR => "2",
            PilotRating::IFR => "3",
            PilotRating::Instructor => "4",
            PilotRating::Supervisor => "5",
        }
    }

    fn from_token(token: &str) -> Self {
        match token {
            "1" => PilotRating::Student,
            "2" => PilotRating::VFR,
            "3" => PilotRating::IFR,
            "4" => PilotRating::Instructor,
            "5" => PilotRating::Supervisor,
            _ => PilotRating::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Simulator type
// ---------------------------------------------------------------------------

/// Flight simulator reported in `#AP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SimType {
    #[default]
    Unknown,
    MSFS95,
    MSFS98,
    MSCFS,
    MSFS2000,
    MSCFS2,
    MSFS2002,
    MSCFS3,
    MSFS2004,
    MSFSX,
    XPLANE8,
    XPLANE9,
    XPLANE10,
    XPLANE11,
    FlightGear,
    P3Dv1,
    P3Dv2,
    P3Dv3,
    P3Dv4,
}

impl SimType {
    pub const ALL: &'static [SimType] = &[
        SimType::Unknown,
        SimType::MSFS95,
        SimType::MSFS98,
        SimType::MSCFS,
        SimType::MSFS2000,
        SimType::MSCFS2,
        SimType::MSFS2002,
        SimType::MSCFS3,
        SimType::MSFS2004,
        SimType::MSFSX,
        SimType::XPLANE8,
        SimType::XPLANE9,
        SimType::XPLANE10,
        SimType::XPLANE11,
        SimType::FlightGear,
        SimType::P3Dv1,
        SimType::P3Dv2,
        SimType::P3Dv3,
        SimType::P3Dv4,
    ];

    pub fn is_p3d(&self) -> bool {
        matches!(
            self,
            SimType::P3Dv1 | SimType::P3Dv2 | SimType::P3Dv3 | SimType::P3Dv4
        )
    }
}

impl WireToken for SimType {
    fn to_token(&self) -> &'static str {
        match self {
            SimType::Unknown => "0",
            SimType::MSFS95 => "1",
            SimType::MSFS98 => "2",
            SimType::MSCFS => "3",
            SimType::MSFS2000 => "4",
            SimType::MSCFS2 => "5",
            SimType::MSFS2002 => "6",
            SimType::MSCFS3 => "7",
            SimType::MSFS2004 => "8",
            SimType::MSFSX => "9",
            SimType::XPLANE8 => "12",
            SimType::XPLANE9 => "13",
            SimType::XPLANE10 => "14",
            SimType::XPLANE11 => "16",
            SimType::FlightGear => "25",
            SimType::P3Dv1 | SimType::P3Dv2 | SimType::P3Dv3 | SimType::P3Dv4 => "30",
        }
    }

    fn from_token(token: &str) -> Self {
        match token {
            "1" => SimType::MSFS95,
            "2" => SimType::MSFS98,
            "3" => SimType::MSCFS,
            "4" => SimType::MSFS2000,
            "5" => SimType::MSCFS2,
            "6" => SimType::MSFS2002,
            "7" => SimType::MSCFS3,
            "8" => SimType::MSFS2004,
            "9" => SimType::MSFSX,
            "12" => SimType::XPLANE8,
            "13" => SimType::XPLANE9,
            "14" => SimType::XPLANE10,
            "16" => SimType::XPLANE11,
            "25" => SimType::FlightGear,
            "30" => SimType::P3Dv4,
            _ => SimType::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Facility
// ---------------------------------------------------------------------------

/// ATC facility type reported in `%` updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FacilityType {
    OBS,
    FSS,
    DEL,
    GND,
    TWR,
    APP,
    CTR,
    #[default]
    Unknown,
}

impl FacilityType {
    pub const ALL: &'static [FacilityType] = &[
        FacilityType::OBS,
        FacilityType::FSS,
        FacilityType::DEL,
        FacilityType::GND,
        FacilityType::TWR,
        FacilityType::APP,
        FacilityType::CTR,
        FacilityType::Unknown,
    ];
}

impl WireToken for FacilityType {
    fn to_token(&self) -> &'static str {
        match self {
            FacilityType::OBS => "0",
            FacilityType::FSS => "1",
            FacilityType::DEL => "2",
            FacilityType::GND => "3",
            FacilityType::TWR => "4",
            FacilityType::APP => "5",
            FacilityType::CTR => "6",
            FacilityType::Unknown => "",
        }
    }

    fn from_token(token: &str) -> Self {
        match token {
            "0" => FacilityType::OBS,
            "1" => FacilityType::FSS,
            "2" => FacilityType::DEL,
            "3" => FacilityType::GND,
            "4" => FacilityType::TWR,
            "5" => FacilityType::APP,
            "6" => FacilityType::CTR,
            _ => FacilityType::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Client queries
// ---------------------------------------------------------------------------

/// Query type carried by `$CQ` / `$CR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClientQueryType {
    IsValidATC,
    Capabilities,
    Com1Freq,
    RealName,
    Server,
    ATIS,
    PublicIP,
    INF,
    FP,
    AircraftConfig,
    #[default]
    Unknown,
}

impl ClientQueryType {
    pub const ALL: &'static [ClientQueryType] = &[
        ClientQueryType::IsValidATC,
        ClientQueryType::Capabilities,
        ClientQueryType::Com1Freq,
        ClientQueryType::RealName,
        ClientQueryType::Server,
        ClientQueryType::ATIS,
        ClientQueryType::PublicIP,
        ClientQueryType::INF,
        ClientQueryType::FP,
        ClientQueryType::AircraftConfig,
        ClientQueryType::Unknown,
    ];
}

impl WireToken for ClientQueryType {
    fn to_token(&self) -> &'static str {
        match self {
            ClientQueryType::IsValidATC => "ATC",
            ClientQueryType::Capabilities => "CAPS",
            ClientQueryType::Com1Freq => "C?",
            ClientQueryType::RealName => "RN",
            ClientQueryType::Server => "SV",
            ClientQueryType::ATIS => "ATIS",
            ClientQueryType::PublicIP => "IP",
            ClientQueryType::INF => "INF",
            ClientQueryType::FP => "FP",
            ClientQueryType::AircraftConfig => "ACC",
            ClientQueryType::Unknown => "",
        }
    }

    fn from_token(token: &str) -> Self {
        match token {
            "ATC" => ClientQueryType::IsValidATC,
            "CAPS" => ClientQueryType::Capabilities,
            "C?" => ClientQueryType::Com1Freq,
            "RN" => ClientQueryType::RealName,
            "SV" => ClientQueryType::Server,
            "ATIS" => ClientQueryType::ATIS,
            "IP" => ClientQueryType::PublicIP,
            "INF" => ClientQueryType::INF,
            "FP" => ClientQueryType::FP,
            "ACC" => ClientQueryType::AircraftConfig,
            _ => ClientQueryType::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Flight rules
// ---------------------------------------------------------------------------

/// Flight rules in `$FP`. Unknown tokens are filed as IFR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FlightType {
    #[default]
    IFR,
    VFR,
    SVFR,
    DVFR,
}

impl FlightType {
    pub const ALL: &'static [FlightType] = &[
        FlightType::IFR,
        FlightType::VFR,
        FlightType::SVFR,
        FlightType::DVFR,
    ];
}

impl WireToken for FlightType {
    fn to_token(&self) -> &'static str {
        match self {
            FlightType::IFR => "I",
            FlightType::VFR => "V",
            FlightType::SVFR => "S",
            FlightType::DVFR => "D",
        }
    }

    fn from_token(token: &str) -> Self {
        match token {
            "V" => FlightType::VFR,
            "S" => FlightType::SVFR,
            "D" => FlightType::DVFR,
            _ => FlightType::IFR,
        }
    }
}

// ---------------------------------------------------------------------------
// Transponder
// ---------------------------------------------------------------------------

/// Transponder state in `@` updates.
///
/// The wire only distinguishes standby (`S`), on (`N`) and ident (`Y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransponderMode {
    #[default]
    StateStandby,
    ModeMil1,
    ModeMil2,
    ModeMil3,
    ModeMil4,
    ModeMil5,
    ModeA,
    ModeC,
    ModeS,
    StateIdent,
}

impl TransponderMode {
    pub const ALL: &'static [TransponderMode] = &[
        TransponderMode::StateStandby,
        TransponderMode::ModeMil1,
        TransponderMode::ModeMil2,
        TransponderMode::ModeMil3,
        TransponderMode::ModeMil4,
        TransponderMode::ModeMil5,
        TransponderMode::ModeA,
        TransponderMode::ModeC,
        TransponderMode::ModeS,
        TransponderMode::StateIdent,
    ];
}

impl WireToken for TransponderMode {
    fn to_token(&self) -> &'static str {
        match self {
            TransponderMode::StateStandby => "S",
            TransponderMode::ModeMil1
            | TransponderMode::ModeMil2
            | TransponderMode::ModeMil3
            | TransponderMode::ModeMil4
            | TransponderMode::ModeMil5
            | TransponderMode::ModeA
            | TransponderMode::ModeC
            | TransponderMode::ModeS => "N",
            TransponderMode::StateIdent => "Y",
        }
    }

    fn from_token(token: &str) -> Self {
        match token {
            "N" => TransponderMode::ModeC,
            "Y" => TransponderMode::StateIdent,
            _ => TransponderMode::StateStandby,
        }
    }
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// A single client capability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Capability {
    #[default]
    None,
    AtcInfo,
    SecondaryPos,
    AircraftInfo,
    OngoingCoord,
    InterimPos,
    FastPos,
    Stealth,
    AircraftConfig,
}

impl Capability {
    pub const ALL: &'static [Capability] = &[
        Capability::None,
        Capability::AtcInfo,
        Capability::SecondaryPos,
        Capability::AircraftInfo,
        Capability::OngoingCoord,
        Capability::InterimPos,
        Capability::FastPos,
        Capability::Stealth,
        Capability::AircraftConfig,
    ];

    fn bit(&self) -> u16 {
        match self {
            Capability::None => 0,
            Capability::AtcInfo => 1 << 0,
            Capability::SecondaryPos => 1 << 1,
            Capability::AircraftInfo => 1 << 2,
            Capability::OngoingCoord => 1 << 3,
            Capability::InterimPos => 1 << 4,
            Capability::FastPos => 1 << 5,
            Capability::Stealth => 1 << 6,
            Capability::AircraftConfig => 1 << 7,
        }
    }
}

impl WireToken for Capability {
    fn to_token(&self) -> &'static str {
        match self {
            Capability::None => "",
            Capability::AtcInfo => "ATCINFO",
            Capability::SecondaryPos => "SECPOS",
            Capability::AircraftInfo => "MODELDESC",
            Capability::OngoingCoord => "ONGOINGCOORD",
            Capability::InterimPos => "INTERIMPOS",
            Capability::FastPos => "FASTPOS",
            Capability::Stealth => "STEALTH",
            Capability::AircraftConfig => "ACCONFIG",
        }
    }

    fn from_token(token: &str) -> Self {
        match token {
            "ATCINFO" => Capability::AtcInfo,
            "SECPOS" => Capability::SecondaryPos,
            "MODELDESC" => Capability::AircraftInfo,
            "ONGOINGCOORD" => Capability::OngoingCoord,
            "INTERIMPOS" => Capability::InterimPos,
            "FASTPOS" => Capability::FastPos,
            "STEALTH" => Capability::Stealth,
            "ACCONFIG" => Capability::AircraftConfig,
            _ => Capability::None,
        }
    }
}

/// Set of capability flags, as exchanged in a `CAPS` client response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Capabilities(u16);

impl Capabilities {
    pub fn empty() -> Self {
        Capabilities(0)
    }

    pub fn with(mut self, cap: Capability) -> Self {
        self.insert(cap);
        self
    }

    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap.bit();
    }

    pub fn contains(&self, cap: Capability) -> bool {
        let bit = cap.bit();
        bit != 0 && self.0 & bit == bit
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Flags present in the set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL
            .iter()
            .copied()
            .filter(move |cap| self.contains(*cap))
    }

    /// Parse `KEY=1` fields. Unknown keys and values other than `1` are ignored.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        let mut caps = Capabilities::empty();
        for field in fields {
            if let Some((key, val)) = field.as_ref().split_once('=') {
                if val.trim() == "1" {
                    caps.insert(Capability::from_token(key.trim()));
                }
            }
        }
        caps
    }

    /// Encode as `KEY=1` fields.
    pub fn to_fields(&self) -> Vec<String> {
        self.iter()
            .map(|cap| format!("{}=1", cap.to_token()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ATIS
// ---------------------------------------------------------------------------

/// Line type in an ATIS client response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AtisLineType {
    VoiceRoom,
    ZuluLogoff,
    TextMessage,
    LineCount,
    #[default]
    Unknown,
}

impl AtisLineType {
    pub const ALL: &'static [AtisLineType] = &[
        AtisLineType::VoiceRoom,
        AtisLineType::ZuluLogoff,
        AtisLineType::TextMessage,
        AtisLineType::LineCount,
        AtisLineType::Unknown,
    ];
}

impl WireToken for AtisLineType {
    fn to_token(&self) -> &'static str {
        match self {
            AtisLineType::VoiceRoom => "V",
            AtisLineType::ZuluLogoff => "Z",
            AtisLineType::TextMessage => "T",
            AtisLineType::LineCount => "E",
            AtisLineType::Unknown => "",
        }
    }

    fn from_token(token: &str) -> Self {
        match token {
            "V" => AtisLineType::VoiceRoom,
            "Z" => AtisLineType::ZuluLogoff,
            "T" => AtisLineType::TextMessage,
            "E" => AtisLineType::LineCount,
            _ => AtisLineType::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Server errors
// ---------------------------------------------------------------------------

/// Error number carried by `$ER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServerErrorCode {
    Ok,
    CallsignInUse,
    InvalidCallsign,
    AlreadyRegistered,
    SyntaxError,
    InvalidSrcCallsign,
    InvalidCidPassword,
    NoSuchCallsign,
    NoFlightPlan,
    NoWeatherProfile,
    InvalidRevision,
    RequestedLevelTooHigh,
    ServerFull,
    CidSuspended,
    InvalidCtrl,
    RatingTooLow,
    InvalidClient,
    AuthTimeout,
    #[default]
    Unknown,
}

impl ServerErrorCode {
    /// Errors after which the server drops the connection.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ServerErrorCode::CallsignInUse
                | ServerErrorCode::InvalidCallsign
                | ServerErrorCode::AlreadyRegistered
                | ServerErrorCode::InvalidCidPassword
                | ServerErrorCode::InvalidRevision
                | ServerErrorCode::RequestedLevelTooHigh
                | ServerErrorCode::ServerFull
                | ServerErrorCode::CidSuspended
                | ServerErrorCode::RatingTooLow
                | ServerErrorCode::InvalidClient
                | ServerErrorCode::AuthTimeout
        )
    }
}

impl WireToken for ServerErrorCode {
    fn to_token(&self) -> &'static str {
        match self {
            ServerErrorCode::Ok => "000",
            ServerErrorCode::CallsignInUse => "001",
            ServerErrorCode::InvalidCallsign => "002",
            ServerErrorCode::AlreadyRegistered => "003",
            ServerErrorCode::SyntaxError => "004",
            ServerErrorCode::InvalidSrcCallsign => "005",
            ServerErrorCode::InvalidCidPassword => "006",
            ServerErrorCode::NoSuchCallsign => "007",
            ServerErrorCode::NoFlightPlan => "008",
            ServerErrorCode::NoWeatherProfile => "009",
            ServerErrorCode::InvalidRevision => "010",
            ServerErrorCode::RequestedLevelTooHigh => "011",
            ServerErrorCode::ServerFull => "012",
            ServerErrorCode::CidSuspended => "013",
            ServerErrorCode::InvalidCtrl => "014",
            ServerErrorCode::RatingTooLow => "015",
            ServerErrorCode::InvalidClient => "016",
            ServerErrorCode::AuthTimeout => "017",
            ServerErrorCode::Unknown => "",
        }
    }

    fn from_token(token: &str) -> Self {
        // Servers send both "1" and "001".
        match token.trim().parse::<u16>() {
            Ok(0) => ServerErrorCode::Ok,
            Ok(1) => ServerErrorCode::CallsignInUse,
            Ok(2) => ServerErrorCode::InvalidCallsign,
            Ok(3) => ServerErrorCode::AlreadyRegistered,
            Ok(4) => ServerErrorCode::SyntaxError,
            Ok(5) => ServerErrorCode::InvalidSrcCallsign,
            Ok(6) => ServerErrorCode::InvalidCidPassword,
            Ok(7) => ServerErrorCode::NoSuchCallsign,
            Ok(8) => ServerErrorCode::NoFlightPlan,
            Ok(9) => ServerErrorCode::NoWeatherProfile,
            Ok(10) => ServerErrorCode::InvalidRevision,
            Ok(11) => ServerErrorCode::RequestedLevelTooHigh,
            Ok(12) => ServerErrorCode::ServerFull,
            Ok(13) => ServerErrorCode::CidSuspended,
            Ok(14) => ServerErrorCode::InvalidCtrl,
            Ok(15) => ServerErrorCode::RatingTooLow,
            Ok(16) => ServerErrorCode::InvalidClient,
            Ok(17) => ServerErrorCode::AuthTimeout,
            _ => ServerErrorCode::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_roundtrip<T: WireToken + Copy + PartialEq + std::fmt::Debug>(all: &[T]) {
        for v in all {
            assert_eq!(T::from_token(v.to_token()), *v, "token {:?}", v.to_token());
        }
    }

    #[test]
    fn test_roundtrip_bijective_types() {
        assert_roundtrip(AtcRating::ALL);
        assert_roundtrip(PilotRating::ALL);
        assert_roundtrip(FacilityType::ALL);
        assert_roundtrip(FlightType::ALL);
        assert_roundtrip(AtisLineType::ALL);
        assert_roundtrip(ClientQueryType::ALL);
        assert_roundtrip(Capability::ALL);
    }

    #[test]
    fn test_atc_rating_tokens() {
        assert_eq!(AtcRating::Controller1.to_token(), "5");
        assert_eq!(AtcRating::Administrator.to_token(), "12");
        assert_eq!(AtcRating::from_token("10"), AtcRating::Instructor3);
    }

    #[test]
    fn test_sim_type_p3d_collapses_to_v4() {
        for sim in [SimType::P3Dv1, SimType::P3Dv2, SimType::P3Dv3, SimType::P3Dv4] {
            assert_eq!(sim.to_token(), "30");
            assert_eq!(SimType::from_token(sim.to_token()), SimType::P3Dv4);
        }
    }

    #[test]
    fn test_sim_type_non_p3d_roundtrip() {
        for sim in SimType::ALL.iter().filter(|s| !s.is_p3d()) {
            assert_eq!(SimType::from_token(sim.to_token()), *sim);
        }
        assert_eq!(SimType::XPLANE11.to_token(), "16");
        assert_eq!(SimType::FlightGear.to_token(), "25");
    }

    #[test]
    fn test_transponder_lossy_decode() {
        assert_eq!(TransponderMode::ModeMil3.to_token(), "N");
        assert_eq!(TransponderMode::ModeS.to_token(), "N");
        assert_eq!(TransponderMode::from_token("N"), TransponderMode::ModeC);
        assert_eq!(TransponderMode::from_token("S"), TransponderMode::StateStandby);
        assert_eq!(TransponderMode::from_token("Y"), TransponderMode::StateIdent);
    }

    #[test]
    fn test_unknown_tokens_default() {
        assert_eq!(AtcRating::from_token("nonsense"), AtcRating::Unknown);
        assert_eq!(PilotRating::from_token("nonsense"), PilotRating::Unknown);
        assert_eq!(SimType::from_token("nonsense"), SimType::Unknown);
        assert_eq!(FacilityType::from_token("nonsense"), FacilityType::Unknown);
        assert_eq!(ClientQueryType::from_token("nonsense"), ClientQueryType::Unknown);
        assert_eq!(FlightType::from_token("nonsense"), FlightType::IFR);
        assert_eq!(
            TransponderMode::from_token("nonsense"),
            TransponderMode::StateStandby
        );
        assert_eq!(Capability::from_token("nonsense"), Capability::None);
        assert_eq!(AtisLineType::from_token("nonsense"), AtisLineType::Unknown);
        assert_eq!(ServerErrorCode::from_token("nonsense"), ServerErrorCode::Unknown);
    }

    #[test]
    fn test_empty_token_defaults() {
        assert_eq!(FacilityType::from_token(""), FacilityType::Unknown);
        assert_eq!(FlightType::from_token(""), FlightType::IFR);
        assert_eq!(SimType::from_token(""), SimType::Unknown);
    }

    #[test]
    fn test_server_error_numeric_forms() {
        assert_eq!(ServerErrorCode::from_token("001"), ServerErrorCode::CallsignInUse);
        assert_eq!(ServerErrorCode::from_token("1"), ServerErrorCode::CallsignInUse);
        assert_eq!(ServerErrorCode::AuthTimeout.to_token(), "017");
        assert!(ServerErrorCode::ServerFull.is_fatal());
        assert!(!ServerErrorCode::NoFlightPlan.is_fatal());
    }

    #[test]
    fn test_capabilities_fields() {
        let caps = Capabilities::from_fields(&["ATCINFO=1", "MODELDESC=1", "SECPOS=0", "BOGUS=1"]);
        assert!(caps.contains(Capability::AtcInfo));
        assert!(caps.contains(Capability::AircraftInfo));
        assert!(!caps.contains(Capability::SecondaryPos));
        assert!(!caps.contains(Capability::None));
        assert_eq!(caps.to_fields(), vec!["ATCINFO=1", "MODELDESC=1"]);
    }

    #[test]
    fn test_capabilities_empty() {
        let caps = Capabilities::empty().with(Capability::None);
        assert!(caps.is_empty());
        assert!(caps.to_fields().is_empty());
    }
}
