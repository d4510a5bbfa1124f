//! Installed model set for one simulator.
//!
//! Keeps models in the order the provider supplied them (that order is the
//! "position" used by `PickByOrder`) and indexes them by model string,
//! aircraft designator, airline, and livery.

use std::collections::{BTreeMap, HashMap};

use crate::aircraft::{model_key, AircraftModel, SimulatorPlatform};
use crate::types::Result;

/// A model together with its position in the supplied model set.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub position: usize,
    pub model: &'a AircraftModel,
}

#[derive(Debug, Clone, Default)]
pub struct ModelSet {
    simulator: SimulatorPlatform,
    models: Vec<AircraftModel>,
    by_key: BTreeMap<String, usize>,
    by_designator: HashMap<String, Vec<usize>>,
    by_airline: HashMap<String, Vec<usize>>,
    by_livery: HashMap<String, Vec<usize>>,
}

impl ModelSet {
    /// Build a set. Models are normalized; models without a model string and
    /// duplicate model strings (case-insensitive) are dropped, first one wins.
    pub fn new<I>(simulator: SimulatorPlatform, models: I) -> Self
    where
        I: IntoIterator<Item = AircraftModel>,
    {
        let mut set = ModelSet {
            simulator,
            ..Default::default()
        };
        for model in models {
            let model = model.normalized();
            if !model.has_model_string() {
                tracing::debug!("Skipping model without model string");
                continue;
            }
            let key = model.model_key();
            if set.by_key.contains_key(&key) {
                tracing::debug!(model = %model.model_string, "Skipping duplicate model string");
                continue;
            }
            let idx = set.models.len();
            set.by_key.insert(key, idx);
            if model.aircraft_icao.has_designator() {
                set.by_designator
                    .entry(model.aircraft_icao.designator.clone())
                    .or_default()
                    .push(idx);
            }
            if model.livery.airline.has_designator() {
                set.by_airline
                    .entry(model.livery.airline.designator.clone())
                    .or_default()
                    .push(idx);
            }
            if model.livery.has_combined_code() {
                set.by_livery
                    .entry(model.livery.combined_code.clone())
                    .or_default()
                    .push(idx);
            }
            set.models.push(model);
        }
        tracing::info!(count = set.models.len(), simulator = %simulator, "Built model set");
        set
    }

    pub fn empty(simulator: SimulatorPlatform) -> Self {
        ModelSet {
            simulator,
            ..Default::default()
        }
    }

    /// Load a JSON array of model records.
    pub fn from_json(simulator: SimulatorPlatform, text: &str) -> Result<Self> {
        let models: Vec<AircraftModel> = serde_json::from_str(text)?;
        Ok(ModelSet::new(simulator, models))
    }

    /// Load a JSON model-set file.
    pub fn from_json_file(simulator: SimulatorPlatform, path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        ModelSet::from_json(simulator, &text)
    }

    pub fn simulator(&self) -> SimulatorPlatform {
        self.simulator
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Models in supplied order.
    pub fn iter(&self) -> impl Iterator<Item = &AircraftModel> {
        self.models.iter()
    }

    /// Candidate pool: every model, in model-string order.
    pub fn candidates(&self) -> Vec<Candidate<'_>> {
        self.by_key
            .values()
            .map(|&position| Candidate {
                position,
                model: &self.models[position],
            })
            .collect()
    }

    /// Exact (case-insensitive) model string lookup.
    pub fn find_by_model_string(&self, model_string: &str) -> Option<Candidate<'_>> {
        self.by_key
            .get(&model_key(model_string))
            .map(|&position| Candidate {
                position,
                model: &self.models[position],
            })
    }

    pub fn find_by_designator(&self, designator: &str) -> Vec<&AircraftModel> {
        self.lookup(&self.by_designator, designator)
    }

    pub fn find_by_airline(&self, airline: &str) -> Vec<&AircraftModel> {
        self.lookup(&self.by_airline, airline)
    }

    pub fn find_by_livery(&self, combined_code: &str) -> Vec<&AircraftModel> {
        self.lookup(&self.by_livery, combined_code)
    }

    /// Distinct aircraft designators with model counts, sorted.
    pub fn designator_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = self
            .by_designator
            .iter()
            .map(|(d, idx)| (d.as_str(), idx.len()))
            .collect();
        counts.sort();
        counts
    }

    fn lookup(&self, index: &HashMap<String, Vec<usize>>, key: &str) -> Vec<&AircraftModel> {
        index
            .get(&key.trim().to_ascii_uppercase())
            .map(|idx| idx.iter().map(|&i| &self.models[i]).collect())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModelSet {
        ModelSet::new(
            SimulatorPlatform::Fsx,
            vec![
                AircraftModel::new("Zulu B738 DLH", "B738", "DLH.STD"),
                AircraftModel::new("Alpha A320 BAW", "A320", "BAW.STD"),
                AircraftModel::new("alpha a320 baw", "A320", "BAW.STD"),
                AircraftModel::new("", "A320", ""),
                AircraftModel::new("Mike A320 DLH", "a320", "dlh.retro"),
            ],
        )
    }

    #[test]
    fn test_dedup_and_skip_empty() {
        let set = sample();
        assert_eq!(set.len(), 3);
        assert_eq!(set.simulator(), SimulatorPlatform::Fsx);
    }

    #[test]
    fn test_candidates_sorted_by_model_string() {
        let set = sample();
        let names: Vec<&str> = set
            .candidates()
            .iter()
            .map(|c| c.model.model_string.as_str())
            .collect();
        assert_eq!(names, vec!["Alpha A320 BAW", "Mike A320 DLH", "Zulu B738 DLH"]);
        let positions: Vec<usize> = set.candidates().iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![1, 2, 0]);
    }

    #[test]
    fn test_find_by_model_string_case_insensitive() {
        let set = sample();
        let c = set.find_by_model_string("ZULU b738 dlh").unwrap();
        assert_eq!(c.position, 0);
        assert!(set.find_by_model_string("nope").is_none());
    }

    #[test]
    fn test_indices() {
        let set = sample();
        assert_eq!(set.find_by_designator("a320").len(), 2);
        assert_eq!(set.find_by_airline("DLH").len(), 2);
        assert_eq!(set.find_by_livery("DLH.RETRO").len(), 1);
        assert_eq!(set.designator_counts(), vec![("A320", 2), ("B738", 1)]);
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"model_string": "Foo", "aircraft_icao": {"designator": "c172"}},
            {"model_string": "Bar", "livery": {"combined_code": "DLH.STD"}}
        ]"#;
        let set = ModelSet::from_json(SimulatorPlatform::XPlane, json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.find_by_designator("C172").len(), 1);
        assert_eq!(set.find_by_airline("DLH").len(), 1);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(ModelSet::from_json(SimulatorPlatform::XPlane, "{not json").is_err());
    }
}
