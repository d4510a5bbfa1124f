//! Reference ICAO aircraft, airline, and livery data for reverse lookup.
//!
//! `ReferenceData` is the seam to whatever database the application uses.
//! `ReferenceDatabase` is an in-memory implementation with a small built-in
//! table, optionally extended from a JSON file.

use std::collections::HashMap;

use serde::Deserialize;

use crate::aircraft::{model_key, AircraftIcaoCode, AircraftModel, AirlineIcaoCode, Livery};
use crate::types::Result;

/// Minimum alias length accepted as a prefix match (`A320` in `A320214`).
const MIN_PREFIX_ALIAS_LEN: usize = 4;

/// Minimum airline name length searched for inside free text.
const MIN_AIRLINE_NAME_LEN: usize = 5;

/// Lookups used by reverse lookup.
pub trait ReferenceData {
    fn aircraft_icao(&self, designator: &str) -> Option<AircraftIcaoCode>;

    fn airline_icao(&self, designator: &str) -> Option<AirlineIcaoCode>;

    fn livery(&self, combined_code: &str) -> Option<Livery>;

    /// A known model record for a model string.
    fn model(&self, model_string: &str) -> Option<AircraftModel>;

    /// Best aircraft type for free text such as a model string.
    fn search_aircraft(&self, text: &str) -> Option<AircraftIcaoCode>;

    /// Best airline for free text such as a model string.
    fn search_airline(&self, text: &str) -> Option<AirlineIcaoCode>;
}

// ---------------------------------------------------------------------------
// Built-in data
// ---------------------------------------------------------------------------

struct BuiltinAircraft {
    designator: &'static str,
    manufacturer: &'static str,
    family: &'static str,
    combined_type: &'static str,
    military: bool,
    aliases: &'static [&'static str],
}

const BUILTIN_AIRCRAFT: &[BuiltinAircraft] = &[
    BuiltinAircraft {
        designator: "A319",
        manufacturer: "Airbus",
        family: "A320",
        combined_type: "L2J",
        military: false,
        aliases: &["A319-100", "A319"],
    },
    BuiltinAircraft {
        designator: "A320",
        manufacturer: "Airbus",
        family: "A320",
        combined_type: "L2J",
        military: false,
        aliases: &["A320-200", "A320"],
    },
    BuiltinAircraft {
        designator: "A321",
        manufacturer: "Airbus",
        family: "A320",
        combined_type: "L2J",
        military: false,
        aliases: &["A321-200", "A321"],
    },
    BuiltinAircraft {
        designator: "A333",
        manufacturer: "Airbus",
        family: "A330",
        combined_type: "L2J",
        military: false,
        aliases: &["A330-300"],
    },
    BuiltinAircraft {
        designator: "A388",
        manufacturer: "Airbus",
        family: "A380",
        combined_type: "L4J",
        military: false,
        aliases: &["A380-800", "A380"],
    },
    BuiltinAircraft {
        designator: "B737",
        manufacturer: "Boeing",
        family: "B737",
        combined_type: "L2J",
        military: false,
        aliases: &["737-700"],
    },
    BuiltinAircraft {
        designator: "B738",
        manufacturer: "Boeing",
        family: "B737",
        combined_type: "L2J",
        military: false,
        aliases: &["737-800"],
    },
    BuiltinAircraft {
        designator: "B744",
        manufacturer: "Boeing",
        family: "B747",
        combined_type: "L4J",
        military: false,
        aliases: &["747-400"],
    },
    BuiltinAircraft {
        designator: "B77W",
        manufacturer: "Boeing",
        family: "B777",
        combined_type: "L2J",
        military: false,
        aliases: &["777-300ER", "777-300"],
    },
    BuiltinAircraft {
        designator: "B789",
        manufacturer: "Boeing",
        family: "B787",
        combined_type: "L2J",
        military: false,
        aliases: &["787-9"],
    },
    BuiltinAircraft {
        designator: "CRJ9",
        manufacturer: "Bombardier",
        family: "CRJ",
        combined_type: "L2J",
        military: false,
        aliases: &["CRJ-900", "CRJ900"],
    },
    BuiltinAircraft {
        designator: "E190",
        manufacturer: "Embraer",
        family: "E190",
        combined_type: "L2J",
        military: false,
        aliases: &["ERJ-190", "E-190"],
    },
    BuiltinAircraft {
        designator: "DH8D",
        manufacturer: "De Havilland Canada",
        family: "DH8",
        combined_type: "L2T",
        military: false,
        aliases: &["Q400", "DASH8-400"],
    },
    BuiltinAircraft {
        designator: "C172",
        manufacturer: "Cessna",
        family: "C172",
        combined_type: "L1P",
        military: false,
        aliases: &["Cessna172", "Skyhawk"],
    },
    BuiltinAircraft {
        designator: "C130",
        manufacturer: "Lockheed",
        family: "C130",
        combined_type: "L4T",
        military: true,
        aliases: &["Hercules"],
    },
    BuiltinAircraft {
        designator: "F16",
        manufacturer: "General Dynamics",
        family: "F16",
        combined_type: "L1J",
        military: true,
        aliases: &["F-16"],
    },
];

/// Airline designator, name, telephony.
const BUILTIN_AIRLINES: &[(&str, &str, &str)] = &[
    ("AAL", "American Airlines", "AMERICAN"),
    ("DAL", "Delta Air Lines", "DELTA"),
    ("UAL", "United Airlines", "UNITED"),
    ("SWA", "Southwest Airlines", "SOUTHWEST"),
    ("JBU", "JetBlue Airways", "JETBLUE"),
    ("ASA", "Alaska Airlines", "ALASKA"),
    ("UPS", "UPS", "UPS"),
    ("FDX", "FedEx", "FEDEX"),
    ("ACA", "Air Canada", "AIR CANADA"),
    ("BAW", "British Airways", "SPEEDBIRD"),
    ("DLH", "Lufthansa", "LUFTHANSA"),
    ("EWG", "Eurowings", "EUROWINGS"),
    ("AFR", "Air France", "AIRFRANS"),
    ("KLM", "KLM Royal Dutch Airlines", "KLM"),
    ("EZY", "easyJet", "EASY"),
    ("RYR", "Ryanair", "RYANAIR"),
    ("SWR", "Swiss", "SWISS"),
    ("AUA", "Austrian Airlines", "AUSTRIAN"),
];

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// Aircraft entry with alternative spellings used in model strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AircraftEntry {
    #[serde(flatten)]
    pub icao: AircraftIcaoCode,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// JSON layout accepted by `ReferenceDatabase::extend_from_json`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReferenceFile {
    pub aircraft: Vec<AircraftEntry>,
    pub airlines: Vec<AirlineIcaoCode>,
    pub liveries: Vec<Livery>,
    pub models: Vec<AircraftModel>,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceDatabase {
    aircraft: Vec<AircraftEntry>,
    airlines: Vec<AirlineIcaoCode>,
    liveries: HashMap<String, Livery>,
    models: HashMap<String, AircraftModel>,
}

impl ReferenceDatabase {
    /// Empty database.
    pub fn new() -> Self {
        ReferenceDatabase::default()
    }

    /// Database seeded with the built-in aircraft and airline tables.
    pub fn builtin() -> Self {
        let mut db = ReferenceDatabase::new();
        for a in BUILTIN_AIRCRAFT {
            db.add_aircraft(AircraftEntry {
                icao: AircraftIcaoCode {
                    designator: a.designator.into(),
                    combined_type: a.combined_type.into(),
                    manufacturer: a.manufacturer.into(),
                    family: a.family.into(),
                    military: a.military,
                },
                aliases: a.aliases.iter().map(|s| s.to_string()).collect(),
            });
        }
        for (designator, name, telephony) in BUILTIN_AIRLINES {
            db.add_airline(AirlineIcaoCode {
                designator: (*designator).into(),
                name: (*name).into(),
                telephony: (*telephony).into(),
                is_virtual: false,
                military: false,
            });
        }
        db
    }

    /// Add entries from a JSON reference file. Later entries replace earlier
    /// ones with the same key.
    pub fn extend_from_json(&mut self, text: &str) -> Result<()> {
        let file: ReferenceFile = serde_json::from_str(text)?;
        for entry in file.aircraft {
            self.add_aircraft(entry);
        }
        for airline in file.airlines {
            self.add_airline(airline);
        }
        for livery in file.liveries {
            self.add_livery(livery);
        }
        for model in file.models {
            self.add_model(model);
        }
        Ok(())
    }

    pub fn add_aircraft(&mut self, mut entry: AircraftEntry) {
        entry.icao.normalize();
        self.aircraft
            .retain(|a| a.icao.designator != entry.icao.designator);
        self.aircraft.push(entry);
    }

    pub fn add_airline(&mut self, mut airline: AirlineIcaoCode) {
        airline.designator = airline.designator.trim().to_ascii_uppercase();
        self.airlines.retain(|a| a.designator != airline.designator);
        self.airlines.push(airline);
    }

    pub fn add_livery(&mut self, mut livery: Livery) {
        livery.normalize();
        self.liveries.insert(livery.combined_code.clone(), livery);
    }

    pub fn add_model(&mut self, model: AircraftModel) {
        let model = model.normalized();
        if model.has_model_string() {
            self.models.insert(model.model_key(), model);
        }
    }

    pub fn aircraft_count(&self) -> usize {
        self.aircraft.len()
    }

    pub fn airline_count(&self) -> usize {
        self.airlines.len()
    }
}

/// Uppercase alphanumeric form used for alias comparison.
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Split free text on anything that is not alphanumeric.
fn word_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_uppercase())
        .collect()
}

/// Split free text on separators but keep dashed designations (`737-800`)
/// together, then normalize.
fn dashed_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric() && c != '-')
        .map(normalize)
        .filter(|t| !t.is_empty())
        .collect()
}

impl ReferenceData for ReferenceDatabase {
    fn aircraft_icao(&self, designator: &str) -> Option<AircraftIcaoCode> {
        let designator = designator.trim().to_ascii_uppercase();
        self.aircraft
            .iter()
            .find(|a| a.icao.designator == designator)
            .map(|a| a.icao.clone())
    }

    fn airline_icao(&self, designator: &str) -> Option<AirlineIcaoCode> {
        let designator = designator.trim().to_ascii_uppercase();
        self.airlines
            .iter()
            .find(|a| a.designator == designator)
            .cloned()
    }

    fn livery(&self, combined_code: &str) -> Option<Livery> {
        self.liveries
            .get(&combined_code.trim().to_ascii_uppercase())
            .cloned()
    }

    fn model(&self, model_string: &str) -> Option<AircraftModel> {
        self.models.get(&model_key(model_string)).cloned()
    }

    fn search_aircraft(&self, text: &str) -> Option<AircraftIcaoCode> {
        // Designator tokens win outright, in text order.
        for token in word_tokens(text) {
            if let Some(icao) = self.aircraft_icao(&token) {
                return Some(icao);
            }
        }

        // Otherwise the longest alias that a token equals or starts with.
        let tokens = dashed_tokens(text);
        let mut best: Option<(usize, &AircraftEntry)> = None;
        for entry in &self.aircraft {
            for alias in &entry.aliases {
                let alias = normalize(alias);
                if alias.is_empty() {
                    continue;
                }
                let hit = tokens.iter().any(|t| {
                    *t == alias || (alias.len() >= MIN_PREFIX_ALIAS_LEN && t.starts_with(&alias))
                });
                if hit && best.map_or(true, |(len, _)| alias.len() > len) {
                    best = Some((alias.len(), entry));
                }
            }
        }
        best.map(|(_, entry)| entry.icao.clone())
    }

    fn search_airline(&self, text: &str) -> Option<AirlineIcaoCode> {
        for token in word_tokens(text) {
            if token.len() == 3 {
                if let Some(airline) = self.airline_icao(&token) {
                    return Some(airline);
                }
            }
        }

        let haystack = normalize(text);
        self.airlines
            .iter()
            .filter(|a| {
                let name = normalize(&a.name);
                name.len() >= MIN_AIRLINE_NAME_LEN && haystack.contains(&name)
            })
            .max_by_key(|a| normalize(&a.name).len())
            .cloned()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
