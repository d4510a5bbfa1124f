//! Matcher setup: algorithm, mode flags, and tie-break strategy.

use serde::{Deserialize, Serialize};

use crate::types::FsdError;

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchingAlgorithm {
    /// Narrow the pool through successive filters
    #[default]
    StepwiseReduce,
    /// Rank the pool by weighted score
    ScoreBased,
}

impl MatchingAlgorithm {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stepwise" | "stepwise_reduce" | "reduce" => Some(MatchingAlgorithm::StepwiseReduce),
            "score" | "score_based" | "scores" => Some(MatchingAlgorithm::ScoreBased),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchingAlgorithm::StepwiseReduce => "stepwise",
            MatchingAlgorithm::ScoreBased => "score",
        }
    }
}

impl std::fmt::Display for MatchingAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Mode flags
// ---------------------------------------------------------------------------

/// Bit set of matching criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MatchingMode(u16);

impl MatchingMode {
    pub const NONE: MatchingMode = MatchingMode(0);
    pub const BY_MODEL_STRING: MatchingMode = MatchingMode(1 << 0);
    pub const BY_COMBINED_TYPE: MatchingMode = MatchingMode(1 << 1);
    pub const BY_ICAO_ORDER_AIRCRAFT_FIRST: MatchingMode = MatchingMode(1 << 2);
    pub const BY_ICAO_ORDER_AIRLINE_FIRST: MatchingMode = MatchingMode(1 << 3);
    pub const BY_LIVERY: MatchingMode = MatchingMode(1 << 4);
    pub const BY_FAMILY: MatchingMode = MatchingMode(1 << 5);
    pub const BY_MILITARY: MatchingMode = MatchingMode(1 << 6);
    pub const SCORE_IGNORE_ZEROS: MatchingMode = MatchingMode(1 << 7);
    pub const SCORE_PREFER_COLOR_LIVERIES: MatchingMode = MatchingMode(1 << 8);

    /// Flag names as used in config files and on the command line.
    pub const NAMES: &'static [(&'static str, MatchingMode)] = &[
        ("model_string", MatchingMode::BY_MODEL_STRING),
        ("combined_type", MatchingMode::BY_COMBINED_TYPE),
        ("icao_aircraft_first", MatchingMode::BY_ICAO_ORDER_AIRCRAFT_FIRST),
        ("icao_airline_first", MatchingMode::BY_ICAO_ORDER_AIRLINE_FIRST),
        ("livery", MatchingMode::BY_LIVERY),
        ("family", MatchingMode::BY_FAMILY),
        ("military", MatchingMode::BY_MILITARY),
        ("score_ignore_zeros", MatchingMode::SCORE_IGNORE_ZEROS),
        ("score_prefer_color_liveries", MatchingMode::SCORE_PREFER_COLOR_LIVERIES),
    ];

    pub fn contains(&self, other: MatchingMode) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Either ICAO ordering flag enables aircraft and airline matching.
    pub fn uses_icao(&self) -> bool {
        self.contains(MatchingMode::BY_ICAO_ORDER_AIRCRAFT_FIRST)
            || self.contains(MatchingMode::BY_ICAO_ORDER_AIRLINE_FIRST)
    }

    /// Airline goes first only when requested and aircraft-first is not set.
    pub fn airline_first(&self) -> bool {
        self.contains(MatchingMode::BY_ICAO_ORDER_AIRLINE_FIRST)
            && !self.contains(MatchingMode::BY_ICAO_ORDER_AIRCRAFT_FIRST)
    }

    /// Parse a comma- or space-separated list of flag names.
    ///
    /// `none` or an empty string yields no flags; `all` yields every flag.
    pub fn parse_list(s: &str) -> Result<Self, FsdError> {
        let mut mode = MatchingMode::NONE;
        for name in s
            .split([',', ' ', '|'])
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            let name = name.to_ascii_lowercase();
            match name.as_str() {
                "none" => {}
                "all" => {
                    for (_, flag) in MatchingMode::NAMES {
                        mode = mode | *flag;
                    }
                }
                _ => {
                    let flag = MatchingMode::NAMES
                        .iter()
                        .find(|(n, _)| *n == name)
                        .map(|(_, f)| *f)
                        .ok_or_else(|| FsdError::Config(format!("unknown matching mode: {name}")))?;
                    mode = mode | flag;
                }
            }
        }
        Ok(mode)
    }

    /// Flag names present in the set.
    pub fn names(&self) -> Vec<&'static str> {
        MatchingMode::NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl std::ops::BitOr for MatchingMode {
    type Output = MatchingMode;

    fn bitor(self, rhs: MatchingMode) -> MatchingMode {
        MatchingMode(self.0 | rhs.0)
    }
}

impl std::ops::Sub for MatchingMode {
    type Output = MatchingMode;

    fn sub(self, rhs: MatchingMode) -> MatchingMode {
        MatchingMode(self.0 & !rhs.0)
    }
}

impl std::fmt::Display for MatchingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        f.write_str(&self.names().join(","))
    }
}

// ---------------------------------------------------------------------------
// Pick strategy
// ---------------------------------------------------------------------------

/// How to choose among equally good candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PickStrategy {
    /// First candidate in pool order (model string order)
    #[default]
    PickFirst,
    /// Candidate supplied earliest in the model set
    PickByOrder,
    /// Uniform choice from the matcher's random source
    PickRandom,
}

impl PickStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "pick_first" => Some(PickStrategy::PickFirst),
            "order" | "by_order" | "pick_by_order" => Some(PickStrategy::PickByOrder),
            "random" | "pick_random" => Some(PickStrategy::PickRandom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PickStrategy::PickFirst => "first",
            PickStrategy::PickByOrder => "order",
            PickStrategy::PickRandom => "random",
        }
    }
}

impl std::fmt::Display for PickStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Immutable matcher configuration, swapped as a whole between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatcherSetup {
    pub algorithm: MatchingAlgorithm,
    pub mode: MatchingMode,
    pub pick: PickStrategy,
}

impl MatcherSetup {
    pub fn new(algorithm: MatchingAlgorithm, mode: MatchingMode, pick: PickStrategy) -> Self {
        MatcherSetup {
            algorithm,
            mode,
            pick,
        }
    }

    pub fn has(&self, mode: MatchingMode) -> bool {
        self.mode.contains(mode)
    }

    /// Default flags: model string, aircraft-first ICAO, livery, family,
    /// combined type.
    pub fn default_mode() -> MatchingMode {
        MatchingMode::BY_MODEL_STRING
            | MatchingMode::BY_ICAO_ORDER_AIRCRAFT_FIRST
            | MatchingMode::BY_LIVERY
            | MatchingMode::BY_FAMILY
            | MatchingMode::BY_COMBINED_TYPE
    }
}

impl Default for MatcherSetup {
    fn default() -> Self {
        MatcherSetup::new(
            MatchingAlgorithm::StepwiseReduce,
            MatcherSetup::default_mode(),
            PickStrategy::PickFirst,
        )
    }
}

impl std::fmt::Display for MatcherSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "algorithm={} modes={} pick={}",
            self.algorithm, self.mode, self.pick
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let mode = MatchingMode::parse_list("model_string, livery|family").unwrap();
        assert!(mode.contains(MatchingMode::BY_MODEL_STRING));
        assert!(mode.contains(MatchingMode::BY_LIVERY));
        assert!(mode.contains(MatchingMode::BY_FAMILY));
        assert!(!mode.contains(MatchingMode::BY_MILITARY));
        assert_eq!(mode.to_string(), "model_string,livery,family");
    }

    #[test]
    fn test_parse_list_none_and_all() {
        assert!(MatchingMode::parse_list("none").unwrap().is_empty());
        assert!(MatchingMode::parse_list("").unwrap().is_empty());
        let all = MatchingMode::parse_list("all").unwrap();
        assert_eq!(all.names().len(), MatchingMode::NAMES.len());
    }

    #[test]
    fn test_parse_list_unknown() {
        assert!(MatchingMode::parse_list("model_string,bogus").is_err());
    }

    #[test]
    fn test_icao_order() {
        let aircraft = MatchingMode::BY_ICAO_ORDER_AIRCRAFT_FIRST;
        let airline = MatchingMode::BY_ICAO_ORDER_AIRLINE_FIRST;
        assert!(aircraft.uses_icao());
        assert!(!aircraft.airline_first());
        assert!(airline.airline_first());
        assert!(!(aircraft | airline).airline_first());
        assert!(!MatchingMode::BY_LIVERY.uses_icao());
    }

    #[test]
    fn test_sub_removes_flag() {
        let mode = MatcherSetup::default_mode() - MatchingMode::BY_MODEL_STRING;
        assert!(!mode.contains(MatchingMode::BY_MODEL_STRING));
        assert!(mode.contains(MatchingMode::BY_LIVERY));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(MatchingAlgorithm::parse("score"), Some(MatchingAlgorithm::ScoreBased));
        assert_eq!(PickStrategy::parse("ORDER"), Some(PickStrategy::PickByOrder));
        assert_eq!(PickStrategy::parse("best"), None);
    }

    #[test]
    fn test_default_setup_display() {
        let setup = MatcherSetup::default();
        assert_eq!(
            setup.to_string(),
            "algorithm=stepwise modes=model_string,combined_type,icao_aircraft_first,livery,family pick=first"
        );
    }
}
