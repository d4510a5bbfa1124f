//! Reverse lookup: complete a partially known model from reference data.
//!
//! Used for remote models that arrive with only a model string, only a
//! designator, or only a callsign. The input model is never modified; the
//! completed copy is returned with model type `ReverseLookup`.

use crate::aircraft::{
    AircraftIcaoCode, AircraftModel, AirlineIcaoCode, Livery, ModelType, SimulatorPlatform,
};
use crate::diagnostics::Diagnostics;
use crate::reference::ReferenceData;
use crate::types::callsign_airline_prefix;

/// Complete `model` using `reference`.
///
/// `livery_hint` is a livery combined code reported separately from the
/// model (empty when unknown). Every step records what it found or could not
/// resolve in `diagnostics`.
pub fn reverse_lookup_model(
    model: &AircraftModel,
    livery_hint: &str,
    reference: &dyn ReferenceData,
    diagnostics: &mut Diagnostics,
) -> AircraftModel {
    let mut result = model.clone().normalized();
    result.model_type = ModelType::ReverseLookup;

    lookup_known_model(&mut result, reference, diagnostics);
    apply_livery_hint(&mut result, livery_hint, reference, diagnostics);
    resolve_aircraft(&mut result, reference, diagnostics);
    resolve_airline(&mut result, reference, diagnostics);
    complete_livery(&mut result, reference, diagnostics);

    tracing::debug!(
        model = %result.model_string,
        designator = %result.aircraft_icao.designator,
        livery = %result.livery.combined_code,
        "Reverse lookup done"
    );
    result
}

fn lookup_known_model(
    result: &mut AircraftModel,
    reference: &dyn ReferenceData,
    diagnostics: &mut Diagnostics,
) {
    if !result.has_model_string() {
        return;
    }
    let Some(known) = reference.model(&result.model_string) else {
        diagnostics.debug(format!(
            "Model string '{}' not in reference data",
            result.model_string
        ));
        return;
    };
    diagnostics.debug(format!(
        "Model string '{}' found in reference data",
        result.model_string
    ));
    if !result.aircraft_icao.has_designator() {
        result.aircraft_icao = known.aircraft_icao;
    }
    if result.livery.is_empty() {
        result.livery = known.livery;
    }
    if result.simulator == SimulatorPlatform::Unspecified {
        result.simulator = known.simulator;
    }
}

fn apply_livery_hint(
    result: &mut AircraftModel,
    livery_hint: &str,
    reference: &dyn ReferenceData,
    diagnostics: &mut Diagnostics,
) {
    let hint = livery_hint.trim();
    if hint.is_empty() {
        return;
    }
    match reference.livery(hint) {
        Some(livery) => {
            diagnostics.debug(format!("Livery '{}' found", livery.combined_code));
            result.livery = livery;
        }
        None => {
            let livery = Livery::from_combined_code(hint);
            diagnostics.debug(format!(
                "Livery '{}' not in reference data, using it as given",
                livery.combined_code
            ));
            result.livery = livery;
        }
    }
}

/// Fill empty fields of `icao` from `known`.
fn complete_icao(icao: &mut AircraftIcaoCode, known: AircraftIcaoCode) {
    if icao.combined_type.is_empty() {
        icao.combined_type = known.combined_type;
    }
    if icao.manufacturer.is_empty() {
        icao.manufacturer = known.manufacturer;
    }
    if icao.family.is_empty() {
        icao.family = known.family;
    }
    icao.military |= known.military;
}

fn resolve_aircraft(
    result: &mut AircraftModel,
    reference: &dyn ReferenceData,
    diagnostics: &mut Diagnostics,
) {
    if result.aircraft_icao.has_designator() {
        let designator = result.aircraft_icao.designator.clone();
        match reference.aircraft_icao(&designator) {
            Some(known) => {
                complete_icao(&mut result.aircraft_icao, known);
                diagnostics.debug(format!("Aircraft designator {designator} completed"));
            }
            None => diagnostics.info(format!("Aircraft designator {designator} unknown")),
        }
        return;
    }

    if result.has_model_string() {
        if let Some(found) = reference.search_aircraft(&result.model_string) {
            diagnostics.debug(format!(
                "Aircraft designator {} inferred from model string",
                found.designator
            ));
            let mut icao = AircraftIcaoCode::new(&found.designator);
            icao.combined_type = result.aircraft_icao.combined_type.clone();
            icao.manufacturer = result.aircraft_icao.manufacturer.clone();
            icao.family = result.aircraft_icao.family.clone();
            icao.military = result.aircraft_icao.military;
            complete_icao(&mut icao, found);
            result.aircraft_icao = icao;
            return;
        }
    }
    diagnostics.info("Aircraft designator could not be resolved");
}

fn resolve_airline(
    result: &mut AircraftModel,
    reference: &dyn ReferenceData,
    diagnostics: &mut Diagnostics,
) {
    if result.livery.is_color_livery() {
        diagnostics.debug("Colour livery, no airline");
        return;
    }

    let airline = &result.livery.airline;
    if airline.has_designator() {
        let designator = airline.designator.clone();
        match reference.airline_icao(&designator) {
            Some(known) => {
                diagnostics.debug(format!("Airline {designator} completed"));
                result.livery.airline = known;
            }
            None => diagnostics.info(format!("Airline {designator} unknown")),
        }
        return;
    }

    if result.has_model_string() {
        if let Some(found) = reference.search_airline(&result.model_string) {
            diagnostics.debug(format!(
                "Airline {} inferred from model string",
                found.designator
            ));
            result.livery.airline = found;
            return;
        }
    }

    if let Some(prefix) = callsign_airline_prefix(&result.callsign) {
        let airline = reference
            .airline_icao(&prefix)
            .unwrap_or_else(|| AirlineIcaoCode::new(&prefix));
        diagnostics.debug(format!(
            "Airline {prefix} inferred from callsign {}",
            result.callsign
        ));
        result.livery.airline = airline;
        return;
    }
    diagnostics.debug("No airline resolved");
}

fn complete_livery(
    result: &mut AircraftModel,
    reference: &dyn ReferenceData,
    diagnostics: &mut Diagnostics,
) {
    if result.livery.has_combined_code() || !result.livery.airline.has_designator() {
        return;
    }
    let standard = Livery::standard_for(&result.livery.airline);
    let livery = match reference.livery(&standard.combined_code) {
        Some(mut known) => {
            known.airline = result.livery.airline.clone();
            known
        }
        None => standard,
    };
    diagnostics.debug(format!("Using standard livery {}", livery.combined_code));
    result.livery = livery;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceDatabase;

    fn lookup(model: &AircraftModel, hint: &str) -> (AircraftModel, Diagnostics) {
        let db = ReferenceDatabase::builtin();
        let mut diag = Diagnostics::new();
        let result = reverse_lookup_model(model, hint, &db, &mut diag);
        (result, diag)
    }

    #[test]
    fn test_input_unchanged() {
        let model = AircraftModel {
            model_string: "Boeing 737-800 Lufthansa".into(),
            callsign: "DLH123".into(),
            ..Default::default()
        };
        let before = model.clone();
        let (result, _) = lookup(&model, "DLH.RETRO");
        assert_eq!(model, before);
        assert_ne!(result, before);
        assert_eq!(result.model_type, ModelType::ReverseLookup);
    }

    #[test]
    fn test_designator_completed() {
        let model = AircraftModel::new("", "b738", "");
        let (result, diag) = lookup(&model, "");
        assert_eq!(result.aircraft_icao.manufacturer, "Boeing");
        assert_eq!(result.aircraft_icao.family, "B737");
        assert_eq!(result.aircraft_icao.combined_type, "L2J");
        assert!(diag.contains("B738 completed"));
    }

    #[test]
    fn test_designator_inferred_from_model_string() {
        let model = AircraftModel {
            model_string: "PMDG 737-800 Speedbird".into(),
            ..Default::default()
        };
        let (result, diag) = lookup(&model, "");
        assert_eq!(result.designator(), "B738");
        assert!(diag.contains("inferred from model string"));
    }

    #[test]
    fn test_airline_from_model_string_then_standard_livery() {
        let model = AircraftModel {
            model_string: "FSPX_A320_BAW".into(),
            ..Default::default()
        };
        let (result, _) = lookup(&model, "");
        assert_eq!(result.designator(), "A320");
        assert_eq!(result.airline_designator(), "BAW");
        assert_eq!(result.livery.airline.name, "British Airways");
        assert_eq!(result.livery.combined_code, "BAW.STD");
    }

    #[test]
    fn test_airline_from_callsign() {
        let model = AircraftModel {
            model_string: "Generic Jet".into(),
            callsign: "EZY42K".into(),
            ..Default::default()
        };
        let (result, diag) = lookup(&model, "");
        assert_eq!(result.airline_designator(), "EZY");
        assert!(diag.contains("inferred from callsign"));
        assert_eq!(result.livery.combined_code, "EZY.STD");
    }

    #[test]
    fn test_livery_hint_sets_airline() {
        let model = AircraftModel::new("", "A320", "");
        let (result, _) = lookup(&model, "swr.hb-jlt");
        assert_eq!(result.livery.combined_code, "SWR.HB-JLT");
        assert_eq!(result.airline_designator(), "SWR");
        assert_eq!(result.livery.airline.name, "Swiss");
    }

    #[test]
    fn test_color_livery_keeps_no_airline() {
        let model = AircraftModel {
            model_string: "Generic Jet".into(),
            callsign: "DLH1".into(),
            ..Default::default()
        };
        let (result, _) = lookup(&model, "_CC_FFFFFF_0000FF");
        assert!(result.livery.is_color_livery());
        assert_eq!(result.airline_designator(), "");
    }

    #[test]
    fn test_known_model_adopted() {
        let mut db = ReferenceDatabase::builtin();
        db.add_model(AircraftModel::new("My Special 738", "B738", "DLH.RETRO"));
        let mut diag = Diagnostics::new();
        let model = AircraftModel {
            model_string: "my special 738".into(),
            ..Default::default()
        };
        let result = reverse_lookup_model(&model, "", &db, &mut diag);
        assert_eq!(result.designator(), "B738");
        assert_eq!(result.livery.combined_code, "DLH.RETRO");
        assert_eq!(result.livery.airline.name, "Lufthansa");
        assert!(diag.contains("found in reference data"));
    }

    #[test]
    fn test_unresolvable_reports_info() {
        let model = AircraftModel {
            model_string: "Mystery".into(),
            ..Default::default()
        };
        let (result, diag) = lookup(&model, "");
        assert!(!result.aircraft_icao.has_designator());
        assert!(diag.contains("could not be resolved"));
    }
}
