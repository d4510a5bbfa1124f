//! Closest-match search from a remote aircraft identity to an installed model.
//!
//! `ModelMatcher` holds its inputs (model set, default model, setup,
//! optional reference data) as one immutable `MatcherSnapshot`. Setters build
//! a new snapshot and swap it in; a matching pass clones the `Arc` once and
//! never observes a half-updated state.
//!
//! The algorithm itself is the pure function `closest_match`.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::aircraft::{AircraftIdentity, AircraftModel, Livery, ModelType};
use crate::diagnostics::Diagnostics;
use crate::model_set::{Candidate, ModelSet};
use crate::reference::ReferenceData;
use crate::setup::{MatcherSetup, MatchingAlgorithm, MatchingMode, PickStrategy};

// ---------------------------------------------------------------------------
// Score weights
// ---------------------------------------------------------------------------

/// Points for the shared aircraft slot when the designator matches.
pub const SCORE_DESIGNATOR: u32 = 40;
/// Aircraft slot points for a family match (needs `family`).
pub const SCORE_FAMILY: u32 = 25;
/// Aircraft slot points for a combined type match (needs `combined_type`).
pub const SCORE_COMBINED_TYPE: u32 = 15;
pub const SCORE_AIRLINE: u32 = 30;
/// Needs `livery`.
pub const SCORE_LIVERY: u32 = 20;
/// Needs `military`.
pub const SCORE_MILITARY: u32 = 10;
/// Bonus under `score_prefer_color_liveries`.
pub const SCORE_COLOR_BONUS: u32 = 10;

// ---------------------------------------------------------------------------
// Snapshot and result
// ---------------------------------------------------------------------------

/// Everything one matching pass reads.
#[derive(Clone, Default)]
pub struct MatcherSnapshot {
    pub model_set: ModelSet,
    pub default_model: AircraftModel,
    pub setup: MatcherSetup,
    /// Used to fill in the remote's family and combined type
    pub reference: Option<Arc<dyn ReferenceData + Send + Sync>>,
}

impl std::fmt::Debug for MatcherSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherSnapshot")
            .field("models", &self.model_set.len())
            .field("default_model", &self.default_model.model_string)
            .field("setup", &self.setup)
            .field("reference", &self.reference.is_some())
            .finish()
    }
}

/// Chosen model plus the diagnostics explaining the choice.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub model: AircraftModel,
    pub diagnostics: Diagnostics,
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

pub struct ModelMatcher {
    state: RwLock<Arc<MatcherSnapshot>>,
    rng: Mutex<StdRng>,
}

impl Default for ModelMatcher {
    fn default() -> Self {
        ModelMatcher::new()
    }
}

impl ModelMatcher {
    /// Matcher with default setup, an empty model set, and an entropy-seeded
    /// random source.
    pub fn new() -> Self {
        ModelMatcher::with_rng(StdRng::from_entropy())
    }

    /// Matcher whose `PickRandom` choices are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        ModelMatcher::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        ModelMatcher {
            state: RwLock::new(Arc::new(MatcherSnapshot::default())),
            rng: Mutex::new(rng),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<MatcherSnapshot> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, f: impl FnOnce(&mut MatcherSnapshot)) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = MatcherSnapshot::clone(&guard);
        f(&mut next);
        *guard = Arc::new(next);
    }

    pub fn set_model_set(&self, model_set: ModelSet) {
        tracing::info!(count = model_set.len(), "Model set replaced");
        self.update(|s| s.model_set = model_set);
    }

    pub fn set_default_model(&self, model: AircraftModel) {
        self.update(|s| s.default_model = model.normalized());
    }

    pub fn set_setup(&self, setup: MatcherSetup) {
        tracing::info!(%setup, "Matcher setup replaced");
        self.update(|s| s.setup = setup);
    }

    pub fn set_reference_data(&self, reference: Arc<dyn ReferenceData + Send + Sync>) {
        self.update(|s| s.reference = Some(reference));
    }

    /// Find the installed model closest to `remote` using the current setup.
    pub fn get_closest_match(&self, remote: &AircraftIdentity) -> MatchResult {
        let snapshot = self.snapshot();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let result = closest_match(&snapshot, remote, &snapshot.setup, &mut *rng);
        tracing::info!(
            callsign = %remote.callsign,
            model = %result.model.model_string,
            model_type = ?result.model.model_type,
            "Model matched"
        );
        result
    }
}

// ---------------------------------------------------------------------------
// Remote profile
// ---------------------------------------------------------------------------

/// Remote identity normalized and completed for comparison.
#[derive(Debug, Clone, Default)]
struct RemoteProfile {
    designator: String,
    family: String,
    combined_type: String,
    airline: String,
    livery: Livery,
    military: bool,
}

impl RemoteProfile {
    fn build(snapshot: &MatcherSnapshot, remote: &AircraftIdentity) -> Self {
        let model = remote.to_model().normalized();
        let mut profile = RemoteProfile {
            designator: model.aircraft_icao.designator.clone(),
            family: String::new(),
            combined_type: if model.aircraft_icao.has_valid_combined_type() {
                model.aircraft_icao.combined_type.clone()
            } else {
                String::new()
            },
            airline: remote.effective_airline().unwrap_or_default(),
            livery: model.livery.clone(),
            military: remote.military,
        };
        if profile.designator.is_empty() {
            return profile;
        }

        // Installed models with the same designator know its family.
        if let Some(installed) = snapshot.model_set.find_by_designator(&profile.designator).first() {
            profile.family = installed.aircraft_icao.family.clone();
            if profile.combined_type.is_empty() && installed.aircraft_icao.has_valid_combined_type() {
                profile.combined_type = installed.aircraft_icao.combined_type.clone();
            }
        }
        if let Some(icao) = snapshot
            .reference
            .as_ref()
            .and_then(|r| r.aircraft_icao(&profile.designator))
        {
            profile.military |= icao.military;
            if profile.combined_type.is_empty() && icao.has_valid_combined_type() {
                profile.combined_type = icao.combined_type;
            }
            if profile.family.is_empty() {
                profile.family = icao.family;
            }
        }
        profile
    }
}

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

/// Pure matching pass over `snapshot` for `remote` under `setup`.
pub fn closest_match<R: Rng>(
    snapshot: &MatcherSnapshot,
    remote: &AircraftIdentity,
    setup: &MatcherSetup,
    rng: &mut R,
) -> MatchResult {
    let mut diagnostics = Diagnostics::for_context(&remote.callsign);
    let set = &snapshot.model_set;

    if setup.has(MatchingMode::BY_MODEL_STRING) && !remote.model_string.trim().is_empty() {
        if let Some(found) = set.find_by_model_string(&remote.model_string) {
            diagnostics.debug(format!(
                "Exact model string match '{}'",
                found.model.model_string
            ));
            return MatchResult {
                model: annotate(found.model, remote, ModelType::Matched),
                diagnostics,
            };
        }
        diagnostics.debug(format!(
            "No installed model with model string '{}'",
            remote.model_string.trim()
        ));
    }

    let pool = set.candidates();
    if pool.is_empty() {
        diagnostics.info(format!(
            "No installed models, using default model '{}'",
            snapshot.default_model.model_string
        ));
        return MatchResult {
            model: annotate(&snapshot.default_model, remote, ModelType::DefaultFallback),
            diagnostics,
        };
    }

    let profile = RemoteProfile::build(snapshot, remote);
    let best = match setup.algorithm {
        MatchingAlgorithm::StepwiseReduce => stepwise_reduce(pool, &profile, setup, &mut diagnostics),
        MatchingAlgorithm::ScoreBased => score_reduce(pool, &profile, setup, &mut diagnostics),
    };

    let chosen = if best.len() == 1 {
        best[0]
    } else {
        let chosen = pick(&best, setup.pick, rng);
        diagnostics.warning(format!(
            "{} equally good candidates, picked '{}' ({})",
            best.len(),
            chosen.model.model_string,
            setup.pick
        ));
        chosen
    };
    MatchResult {
        model: annotate(chosen.model, remote, ModelType::Matched),
        diagnostics,
    }
}

fn annotate(model: &AircraftModel, remote: &AircraftIdentity, model_type: ModelType) -> AircraftModel {
    let mut model = model.clone();
    model.model_type = model_type;
    model.callsign = remote.callsign.clone();
    model
}

/// Choose one of several equally good candidates. `tied` is never empty.
fn pick<'a, R: Rng>(
    tied: &[Candidate<'a>],
    strategy: PickStrategy,
    rng: &mut R,
) -> Candidate<'a> {
    match strategy {
        PickStrategy::PickFirst => tied[0],
        PickStrategy::PickByOrder => tied
            .iter()
            .copied()
            .min_by_key(|c| c.position)
            .unwrap_or(tied[0]),
        PickStrategy::PickRandom => tied[rng.gen_range(0..tied.len())],
    }
}

// ---------------------------------------------------------------------------
// Stepwise reduction
// ---------------------------------------------------------------------------

/// Keep the candidates matching `keep`, unless that would leave none.
fn reduce<'a>(
    pool: Vec<Candidate<'a>>,
    label: &str,
    value: &str,
    diagnostics: &mut Diagnostics,
    keep: impl Fn(&AircraftModel) -> bool,
) -> Vec<Candidate<'a>> {
    let before = pool.len();
    let reduced: Vec<Candidate<'a>> = pool.iter().copied().filter(|c| keep(c.model)).collect();
    if reduced.is_empty() {
        diagnostics.debug(format!(
            "{label} {value}: no candidates, step skipped ({before} remain)"
        ));
        pool
    } else {
        diagnostics.debug(format!(
            "{label} {value}: {before} -> {} candidates",
            reduced.len()
        ));
        reduced
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Aircraft,
    Airline,
    Livery,
    Family,
    CombinedType,
    Military,
}

impl Step {
    fn label(self) -> &'static str {
        match self {
            Step::Aircraft => "Aircraft designator",
            Step::Airline => "Airline",
            Step::Livery => "Livery",
            Step::Family => "Family",
            Step::CombinedType => "Combined type",
            Step::Military => "Operator",
        }
    }
}

fn stepwise_reduce<'a>(
    mut pool: Vec<Candidate<'a>>,
    remote: &RemoteProfile,
    setup: &MatcherSetup,
    diagnostics: &mut Diagnostics,
) -> Vec<Candidate<'a>> {
    let icao = if setup.mode.airline_first() {
        [Step::Airline, Step::Aircraft]
    } else {
        [Step::Aircraft, Step::Airline]
    };
    let steps = icao.into_iter().chain([
        Step::Livery,
        Step::Family,
        Step::CombinedType,
        Step::Military,
    ]);

    for step in steps {
        if pool.len() <= 1 {
            break;
        }
        pool = match step {
            Step::Aircraft if setup.mode.uses_icao() && !remote.designator.is_empty() => {
                reduce(pool, "Aircraft designator", &remote.designator, diagnostics, |m| {
                    m.designator() == remote.designator
                })
            }
            Step::Airline if setup.mode.uses_icao() && !remote.airline.is_empty() => {
                reduce(pool, "Airline", &remote.airline, diagnostics, |m| {
                    m.airline_designator() == remote.airline
                })
            }
            Step::Livery
                if setup.has(MatchingMode::BY_LIVERY) && remote.livery.has_combined_code() =>
            {
                reduce(pool, "Livery", &remote.livery.combined_code, diagnostics, |m| {
                    m.livery.combined_code == remote.livery.combined_code
                })
            }
            Step::Family if setup.has(MatchingMode::BY_FAMILY) && !remote.family.is_empty() => {
                reduce(pool, "Family", &remote.family, diagnostics, |m| {
                    m.aircraft_icao.family == remote.family
                })
            }
            Step::CombinedType
                if setup.has(MatchingMode::BY_COMBINED_TYPE) && !remote.combined_type.is_empty() =>
            {
                reduce(pool, "Combined type", &remote.combined_type, diagnostics, |m| {
                    m.aircraft_icao.combined_type == remote.combined_type
                })
            }
            Step::Military if setup.has(MatchingMode::BY_MILITARY) => {
                let label = if remote.military { "military" } else { "civil" };
                reduce(pool, "Operator", label, diagnostics, |m| {
                    m.aircraft_icao.military == remote.military
                })
            }
            _ => {
                diagnostics.debug(format!("{}: not applicable", step.label()));
                pool
            }
        };
    }
    pool
}

// ---------------------------------------------------------------------------
// Score-based ranking
// ---------------------------------------------------------------------------

/// Per-mille score of one candidate against the remote.
fn score(model: &AircraftModel, remote: &RemoteProfile, setup: &MatcherSetup) -> u32 {
    let ignore_zeros = setup.has(MatchingMode::SCORE_IGNORE_ZEROS);
    let mut achieved = 0u32;
    let mut possible = 0u32;
    let mut criterion = |points: u32, max: u32, has_data: bool| {
        if has_data || !ignore_zeros {
            possible += max;
            achieved += points;
        }
    };

    // Shared aircraft slot
    let icao = &model.aircraft_icao;
    let remote_has_aircraft = !remote.designator.is_empty() || !remote.combined_type.is_empty();
    let model_has_aircraft = icao.has_designator() || icao.has_valid_combined_type();
    let slot = if icao.has_designator() && icao.designator == remote.designator {
        SCORE_DESIGNATOR
    } else if setup.has(MatchingMode::BY_FAMILY)
        && icao.has_family()
        && icao.family == remote.family
    {
        SCORE_FAMILY
    } else if setup.has(MatchingMode::BY_COMBINED_TYPE)
        && icao.has_valid_combined_type()
        && icao.combined_type == remote.combined_type
    {
        SCORE_COMBINED_TYPE
    } else {
        0
    };
    criterion(slot, SCORE_DESIGNATOR, remote_has_aircraft && model_has_aircraft);

    let model_airline = model.airline_designator();
    let airline = if !model_airline.is_empty() && model_airline == remote.airline {
        SCORE_AIRLINE
    } else {
        0
    };
    criterion(
        airline,
        SCORE_AIRLINE,
        !remote.airline.is_empty() && !model_airline.is_empty(),
    );

    if setup.has(MatchingMode::BY_LIVERY) {
        let has_data = remote.livery.has_combined_code() && model.livery.has_combined_code();
        let livery = if has_data && model.livery.combined_code == remote.livery.combined_code {
            SCORE_LIVERY
        } else {
            0
        };
        criterion(livery, SCORE_LIVERY, has_data);
    }

    if setup.has(MatchingMode::BY_MILITARY) {
        let military = if icao.military == remote.military {
            SCORE_MILITARY
        } else {
            0
        };
        criterion(military, SCORE_MILITARY, true);
    }

    if setup.has(MatchingMode::SCORE_PREFER_COLOR_LIVERIES) {
        let preferred = if remote.airline.is_empty() {
            model.livery.is_color_livery()
        } else {
            model.livery.is_airline_standard() && model_airline == remote.airline
        };
        if preferred {
            achieved += SCORE_COLOR_BONUS;
        }
    }

    if possible == 0 {
        0
    } else {
        achieved * 1000 / possible
    }
}

/// Rank the pool and return the top-scoring candidates in pool order.
fn score_reduce<'a>(
    pool: Vec<Candidate<'a>>,
    remote: &RemoteProfile,
    setup: &MatcherSetup,
    diagnostics: &mut Diagnostics,
) -> Vec<Candidate<'a>> {
    let mut scored: Vec<(u32, Candidate<'a>)> = pool
        .into_iter()
        .map(|c| (score(c.model, remote, setup), c))
        .collect();
    // Stable sort: equal scores keep pool order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let top = scored.first().map(|(s, _)| *s).unwrap_or(0);
    for (s, c) in scored.iter().take(5) {
        diagnostics.debug(format!("Score {s} for '{}'", c.model.model_string));
    }
    scored
        .into_iter()
        .take_while(|(s, _)| *s == top)
        .map(|(_, c)| c)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::SimulatorPlatform;
    use crate::diagnostics::Severity;
    use crate::reference::ReferenceDatabase;

    fn model(model_string: &str, designator: &str, livery: &str) -> AircraftModel {
        AircraftModel::new(model_string, designator, livery)
    }

    fn matcher(models: Vec<AircraftModel>, setup: MatcherSetup) -> ModelMatcher {
        let m = ModelMatcher::with_seed(7);
        m.set_model_set(ModelSet::new(SimulatorPlatform::Fsx, models));
        m.set_default_model(model("Default C172", "C172", ""));
        m.set_setup(setup);
        m
    }

    fn identity(callsign: &str, designator: &str, airline: &str) -> AircraftIdentity {
        AircraftIdentity {
            callsign: callsign.into(),
            designator: designator.into(),
            airline: airline.into(),
            ..Default::default()
        }
    }

    fn stepwise(mode: MatchingMode) -> MatcherSetup {
        MatcherSetup::new(MatchingAlgorithm::StepwiseReduce, mode, PickStrategy::PickFirst)
    }

    fn profile(designator: &str, airline: &str, livery: &str) -> RemoteProfile {
        RemoteProfile {
            designator: designator.into(),
            airline: airline.into(),
            livery: Livery::from_combined_code(livery),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_model_string_short_circuit() {
        let m = matcher(
            vec![
                model("FSPX B738 DLH", "B738", "DLH.STD"),
                model("FSPX A320 DLH", "A320", "DLH.STD"),
            ],
            MatcherSetup::default(),
        );
        let mut remote = identity("DLH123", "A320", "DLH");
        remote.model_string = "fspx b738 dlh".into();
        let result = m.get_closest_match(&remote);
        assert_eq!(result.model.model_string, "FSPX B738 DLH");
        assert_eq!(result.model.model_type, ModelType::Matched);
        assert_eq!(result.model.callsign, "DLH123");
        assert!(result.diagnostics.contains("Exact model string"));
    }

    #[test]
    fn test_model_string_ignored_without_flag() {
        let setup = stepwise(MatchingMode::BY_ICAO_ORDER_AIRCRAFT_FIRST);
        let m = matcher(
            vec![
                model("FSPX B738 DLH", "B738", "DLH.STD"),
                model("FSPX A320 DLH", "A320", "DLH.STD"),
            ],
            setup,
        );
        let mut remote = identity("DLH123", "A320", "DLH");
        remote.model_string = "FSPX B738 DLH".into();
        assert_eq!(m.get_closest_match(&remote).model.model_string, "FSPX A320 DLH");
    }

    #[test]
    fn test_empty_set_falls_back_to_default() {
        let m = matcher(vec![], MatcherSetup::default());
        let result = m.get_closest_match(&identity("DLH123", "B738", "DLH"));
        assert_eq!(result.model.model_string, "Default C172");
        assert_eq!(result.model.model_type, ModelType::DefaultFallback);
        assert_eq!(result.model.callsign, "DLH123");
        assert!(result.diagnostics.has_at_least(Severity::Info));
        assert!(result.diagnostics.contains("default model"));
    }

    #[test]
    fn test_stepwise_aircraft_first() {
        let models = vec![
            model("A", "B738", "DLH.STD"),
            model("B", "A320", "DLH.STD"),
            model("C", "B738", "BAW.STD"),
        ];
        let m = matcher(models, stepwise(MatchingMode::BY_ICAO_ORDER_AIRCRAFT_FIRST));
        let result = m.get_closest_match(&identity("DLH123", "B738", "DLH"));
        assert_eq!(result.model.model_string, "A");
        assert!(result.diagnostics.contains("Aircraft designator B738: 3 -> 2"));
        assert!(result.diagnostics.contains("Airline DLH: 2 -> 1"));
        assert!(!result.diagnostics.has_at_least(Severity::Warning));
    }

    #[test]
    fn test_stepwise_aircraft_first_beats_airline_majority() {
        let models = vec![
            model("X", "B738", "BAW.STD"),
            model("Y", "A320", "DLH.STD"),
            model("Z", "A321", "DLH.STD"),
        ];
        let m = matcher(models, stepwise(MatchingMode::BY_ICAO_ORDER_AIRCRAFT_FIRST));
        let result = m.get_closest_match(&identity("DLH123", "B738", "DLH"));
        assert_eq!(result.model.model_string, "X");
        assert!(result.diagnostics.contains("Aircraft designator B738: 3 -> 1"));
        assert!(!result.diagnostics.contains("Airline DLH"));
    }

    #[test]
    fn test_stepwise_records_inapplicable_steps() {
        let models = vec![model("A", "B738", "DLH.STD"), model("B", "B738", "DLH.STD")];
        let m = matcher(
            models,
            stepwise(MatchingMode::BY_ICAO_ORDER_AIRCRAFT_FIRST | MatchingMode::BY_LIVERY),
        );
        let result = m.get_closest_match(&identity("", "B738", ""));
        assert!(result.diagnostics.contains("Aircraft designator B738: 2 -> 2"));
        assert!(result.diagnostics.contains("Airline: not applicable"));
        assert!(result.diagnostics.contains("Livery: not applicable"));
        assert!(result.diagnostics.contains("Operator: not applicable"));
    }

    #[test]
    fn test_stepwise_airline_first_order() {
        let models = vec![
            model("A", "B738", "DLH.STD"),
            model("B", "A320", "DLH.STD"),
            model("C", "B738", "BAW.STD"),
        ];
        let m = matcher(models, stepwise(MatchingMode::BY_ICAO_ORDER_AIRLINE_FIRST));
        let result = m.get_closest_match(&identity("BAW12", "B738", ""));
        assert_eq!(result.model.model_string, "C");
        assert!(result.diagnostics.contains("Airline BAW: 3 -> 1"));
        assert!(!result.diagnostics.contains("Aircraft designator"));
    }

    #[test]
    fn test_stepwise_skips_step_that_empties_pool() {
        let models = vec![model("A", "B738", "DLH.STD"), model("C", "B738", "BAW.STD")];
        let m = matcher(models, stepwise(MatchingMode::BY_ICAO_ORDER_AIRCRAFT_FIRST));
        let result = m.get_closest_match(&identity("BAW12", "B744", "BAW"));
        assert_eq!(result.model.model_string, "C");
        assert!(result.diagnostics.contains("B744: no candidates, step skipped"));
    }

    #[test]
    fn test_stepwise_family_from_reference() {
        let mut a320 = model("Airbus A320", "A320", "");
        a320.aircraft_icao.family = "A320".into();
        let mut b738 = model("Boeing 737", "B738", "");
        b738.aircraft_icao.family = "B737".into();
        let m = matcher(
            vec![a320, b738],
            stepwise(MatchingMode::BY_ICAO_ORDER_AIRCRAFT_FIRST | MatchingMode::BY_FAMILY),
        );
        m.set_reference_data(Arc::new(ReferenceDatabase::builtin()));
        let result = m.get_closest_match(&identity("EZY1", "A321", ""));
        assert_eq!(result.model.model_string, "Airbus A320");
        assert!(result.diagnostics.contains("Family A320: 2 -> 1"));
    }

    #[test]
    fn test_stepwise_livery_and_military() {
        let mut mil = model("Herc", "C130", "");
        mil.aircraft_icao.military = true;
        let models = vec![
            model("Retro", "B738", "DLH.RETRO"),
            model("Std", "B738", "DLH.STD"),
            mil,
            model("Civil", "C130", ""),
        ];
        let all = MatcherSetup::default_mode() | MatchingMode::BY_MILITARY;
        let m = matcher(models, stepwise(all));

        let mut remote = identity("DLH1", "B738", "DLH");
        remote.livery = "dlh.retro".into();
        assert_eq!(m.get_closest_match(&remote).model.model_string, "Retro");

        let mut remote = identity("RCH01", "C130", "");
        remote.military = true;
        assert_eq!(m.get_closest_match(&remote).model.model_string, "Herc");
    }

    #[test]
    fn test_no_flags_does_not_crash() {
        let models = vec![model("Zulu", "B738", ""), model("Alpha", "A320", "")];
        let m = matcher(models, stepwise(MatchingMode::NONE));
        let result = m.get_closest_match(&AircraftIdentity::default());
        assert_eq!(result.model.model_string, "Alpha");
        assert!(result.diagnostics.has_at_least(Severity::Warning));

        m.set_setup(MatcherSetup::new(
            MatchingAlgorithm::ScoreBased,
            MatchingMode::NONE,
            PickStrategy::PickFirst,
        ));
        assert_eq!(m.get_closest_match(&AircraftIdentity::default()).model.model_string, "Alpha");
    }

    #[test]
    fn test_score_tie_governed_by_pick_strategy() {
        // Supplied order: Beta first, Alpha second. Pool order: Alpha, Beta.
        let models = vec![model("Beta", "B738", "DLH.STD"), model("Alpha", "B738", "DLH.STD")];
        let mut setup = MatcherSetup::new(
            MatchingAlgorithm::ScoreBased,
            MatcherSetup::default_mode(),
            PickStrategy::PickFirst,
        );
        let m = matcher(models, setup);
        let remote = identity("DLH1", "B738", "DLH");

        let first = m.get_closest_match(&remote);
        assert_eq!(first.model.model_string, "Alpha");
        assert!(first.diagnostics.contains("2 equally good candidates"));

        setup.pick = PickStrategy::PickByOrder;
        m.set_setup(setup);
        assert_eq!(m.get_closest_match(&remote).model.model_string, "Beta");
    }

    #[test]
    fn test_pick_random_reproducible_with_seed() {
        let models: Vec<AircraftModel> = (0..6)
            .map(|i| model(&format!("Model {i}"), "B738", ""))
            .collect();
        let setup = MatcherSetup::new(
            MatchingAlgorithm::ScoreBased,
            MatcherSetup::default_mode(),
            PickStrategy::PickRandom,
        );
        let run = |seed: u64| -> Vec<String> {
            let m = ModelMatcher::with_seed(seed);
            m.set_model_set(ModelSet::new(SimulatorPlatform::Fsx, models.clone()));
            m.set_setup(setup);
            (0..10)
                .map(|_| m.get_closest_match(&identity("N1", "B738", "")).model.model_string)
                .collect()
        };
        let a = run(42);
        assert_eq!(a, run(42));
        assert!(a.iter().all(|s| s.starts_with("Model ")));
    }

    #[test]
    fn test_score_ranking() {
        let models = vec![
            model("BAW 738", "B738", "BAW.STD"),
            model("DLH 320", "A320", "DLH.STD"),
            model("DLH 738", "B738", "DLH.STD"),
        ];
        let setup = MatcherSetup::new(
            MatchingAlgorithm::ScoreBased,
            MatcherSetup::default_mode(),
            PickStrategy::PickFirst,
        );
        let m = matcher(models, setup);
        let mut remote = identity("DLH1", "B738", "DLH");
        remote.livery = "DLH.STD".into();
        let result = m.get_closest_match(&remote);
        assert_eq!(result.model.model_string, "DLH 738");
        assert!(result.diagnostics.contains("Score 1000 for 'DLH 738'"));
    }

    #[test]
    fn test_score_weights() {
        let setup = MatcherSetup::new(
            MatchingAlgorithm::ScoreBased,
            MatchingMode::BY_LIVERY,
            PickStrategy::PickFirst,
        );
        let remote = profile("B738", "DLH", "DLH.STD");
        // 40 + 30 + 20 of 90
        assert_eq!(score(&model("x", "B738", "DLH.STD"), &remote, &setup), 1000);
        // 40 of 90
        assert_eq!(score(&model("x", "B738", "BAW.STD"), &remote, &setup), 444);
        // 30 + 20 of 90
        assert_eq!(score(&model("x", "A320", "DLH.STD"), &remote, &setup), 555);
    }

    #[test]
    fn test_score_ignore_zeros() {
        let remote = profile("B738", "", "");
        let candidate = model("x", "B738", "");
        let plain = MatcherSetup::new(
            MatchingAlgorithm::ScoreBased,
            MatchingMode::BY_LIVERY,
            PickStrategy::PickFirst,
        );
        assert_eq!(score(&candidate, &remote, &plain), 444);

        let ignore = MatcherSetup::new(
            MatchingAlgorithm::ScoreBased,
            MatchingMode::BY_LIVERY | MatchingMode::SCORE_IGNORE_ZEROS,
            PickStrategy::PickFirst,
        );
        assert_eq!(score(&candidate, &remote, &ignore), 1000);
    }

    #[test]
    fn test_score_family_and_combined_type_slot() {
        let mut remote = profile("A321", "", "");
        remote.family = "A320".into();
        remote.combined_type = "L2J".into();
        let mut candidate = model("x", "A320", "");
        candidate.aircraft_icao.family = "A320".into();
        candidate.aircraft_icao.combined_type = "L2J".into();

        let mode = MatchingMode::SCORE_IGNORE_ZEROS;
        let setup = |m| MatcherSetup::new(MatchingAlgorithm::ScoreBased, m, PickStrategy::PickFirst);
        assert_eq!(score(&candidate, &remote, &setup(mode)), 0);
        assert_eq!(
            score(&candidate, &remote, &setup(mode | MatchingMode::BY_COMBINED_TYPE)),
            375
        );
        assert_eq!(
            score(
                &candidate,
                &remote,
                &setup(mode | MatchingMode::BY_COMBINED_TYPE | MatchingMode::BY_FAMILY)
            ),
            625
        );
    }

    #[test]
    fn test_score_prefers_color_livery() {
        let models = vec![model("Alpha", "B738", "XYZ.ABC"), model("Beta", "B738", "_CC_FFFFFF_0000FF")];
        let setup = MatcherSetup::new(
            MatchingAlgorithm::ScoreBased,
            MatchingMode::BY_LIVERY | MatchingMode::SCORE_PREFER_COLOR_LIVERIES,
            PickStrategy::PickFirst,
        );
        let m = matcher(models, setup);
        let result = m.get_closest_match(&identity("N123AB", "B738", ""));
        assert_eq!(result.model.model_string, "Beta");
    }

    #[test]
    fn test_score_prefers_airline_standard_livery() {
        let models = vec![model("Alpha", "B738", "DLH.RETRO"), model("Beta", "B738", "DLH.STD")];
        let setup = MatcherSetup::new(
            MatchingAlgorithm::ScoreBased,
            MatchingMode::SCORE_PREFER_COLOR_LIVERIES,
            PickStrategy::PickFirst,
        );
        let m = matcher(models, setup);
        assert_eq!(
            m.get_closest_match(&identity("DLH1", "B738", "DLH")).model.model_string,
            "Beta"
        );
    }

    #[test]
    fn test_setters_swap_snapshot() {
        let m = matcher(vec![model("A", "B738", "")], MatcherSetup::default());
        let before = m.snapshot();
        m.set_model_set(ModelSet::empty(SimulatorPlatform::XPlane));
        let after = m.snapshot();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.model_set.len(), 1);
        assert!(after.model_set.is_empty());
        assert_eq!(after.default_model.model_string, "Default C172");
    }

    #[test]
    fn test_closest_match_pure_with_override_setup() {
        let snapshot = MatcherSnapshot {
            model_set: ModelSet::new(
                SimulatorPlatform::Fsx,
                vec![model("A", "B738", "DLH.STD"), model("B", "A320", "DLH.STD")],
            ),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let setup = stepwise(MatchingMode::BY_ICAO_ORDER_AIRCRAFT_FIRST);
        let result = closest_match(&snapshot, &identity("DLH1", "A320", ""), &setup, &mut rng);
        assert_eq!(result.model.model_string, "B");
    }
}
