//! Configuration file management for fsd-match.
//!
//! Reads/writes `~/.fsd-match/config.yaml` with the matcher setup, an
//! optional random seed, and the default (fallback) model.

use std::path::PathBuf;

use crate::aircraft::AircraftModel;
use crate::setup::{MatcherSetup, MatchingAlgorithm, MatchingMode, PickStrategy};
use crate::types::FsdError;

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub matcher: MatcherConfig,
    pub default_model: DefaultModelConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    pub setup: MatcherSetup,
    /// Seed for `PickRandom`; entropy when unset
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultModelConfig {
    pub model_string: String,
    pub icao: String,
    pub airline: String,
    pub livery: String,
}

impl DefaultModelConfig {
    /// Model record used as the matcher's fallback.
    pub fn to_model(&self) -> AircraftModel {
        let livery = if self.livery.is_empty() && !self.airline.is_empty() {
            format!("{}.STD", self.airline)
        } else {
            self.livery.clone()
        };
        AircraftModel::new(&self.model_string, &self.icao, &livery)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            matcher: MatcherConfig {
                setup: MatcherSetup::default(),
                seed: None,
            },
            default_model: DefaultModelConfig {
                model_string: "Default Airliner".into(),
                icao: "B738".into(),
                airline: String::new(),
                livery: String::new(),
            },
        }
    }
}

/// Get the config directory path (`~/.fsd-match/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".fsd-match")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.fsd-match/config.yaml`.
///
/// Returns default config if the file doesn't exist or can't be read.
pub fn load_config() -> Config {
    load_config_from(&config_file())
}

/// Load config from an explicit path, defaults on any failure.
pub fn load_config_from(path: &std::path::Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot read config, using defaults");
            return Config::default();
        }
    };
    match parse_config(&text) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
            Config::default()
        }
    }
}

/// Save config to `~/.fsd-match/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf, FsdError> {
    let path = config_file();
    save_config_to(config, &path)?;
    Ok(path)
}

/// Save config to an explicit path, creating parent directories.
pub fn save_config_to(config: &Config, path: &std::path::Path) -> Result<(), FsdError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| FsdError::Config(e.to_string()))?;
    }
    std::fs::write(path, serialize_config(config)).map_err(|e| FsdError::Config(e.to_string()))
}

/// Parse simple YAML-like config text. Unknown keys are ignored; invalid
/// values for known keys are errors.
pub fn parse_config(text: &str) -> Result<Config, FsdError> {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            current_section = if val.is_empty() {
                Some(key.to_string())
            } else {
                None
            };
            continue;
        }
        let Some(section) = current_section.as_deref() else {
            continue;
        };

        match section {
            "matcher" => match key {
                "algorithm" => {
                    if let Some(v) = parse_string_value(val) {
                        config.matcher.setup.algorithm = MatchingAlgorithm::parse(&v)
                            .ok_or_else(|| FsdError::Config(format!("unknown algorithm: {v}")))?;
                    }
                }
                "modes" => {
                    config.matcher.setup.mode =
                        MatchingMode::parse_list(&parse_string_value(val).unwrap_or_default())?;
                }
                "pick" => {
                    if let Some(v) = parse_string_value(val) {
                        config.matcher.setup.pick = PickStrategy::parse(&v)
                            .ok_or_else(|| FsdError::Config(format!("unknown pick strategy: {v}")))?;
                    }
                }
                "seed" => {
                    config.matcher.seed = match parse_string_value(val) {
                        Some(v) => Some(
                            v.parse::<u64>()
                                .map_err(|_| FsdError::Config(format!("invalid seed: {v}")))?,
                        ),
                        None => None,
                    };
                }
                _ => {}
            },
            "default_model" => {
                let v = parse_string_value(val).unwrap_or_default();
                match key {
                    "model_string" => config.default_model.model_string = v,
                    "icao" => config.default_model.icao = v,
                    "airline" => config.default_model.airline = v,
                    "livery" => config.default_model.livery = v,
                    _ => {}
                }
            }
            _ => {}
        }
    }

    Ok(config)
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    if (val.starts_with('"') && val.ends_with('"') && val.len() >= 2)
        || (val.starts_with('\'') && val.ends_with('\'') && val.len() >= 2)
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

/// Serialize config to YAML-like text.
pub fn serialize_config(config: &Config) -> String {
    let mut lines = vec!["# fsd-match configuration".to_string(), String::new()];

    let setup = &config.matcher.setup;
    lines.push("matcher:".into());
    lines.push(format!("  algorithm: {}", setup.algorithm));
    lines.push(format!("  modes: \"{}\"", setup.mode));
    lines.push(format!("  pick: {}", setup.pick));
    match config.matcher.seed {
        Some(seed) => lines.push(format!("  seed: {seed}")),
        None => lines.push("  seed: null".into()),
    }
    lines.push(String::new());

    let model = &config.default_model;
    lines.push("default_model:".into());
    lines.push(format!("  model_string: \"{}\"", model.model_string));
    lines.push(format!("  icao: \"{}\"", model.icao));
    lines.push(format!("  airline: \"{}\"", model.airline));
    lines.push(format!("  livery: \"{}\"", model.livery));

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.matcher.setup, MatcherSetup::default());
        assert!(config.matcher.seed.is_none());
        assert_eq!(config.default_model.icao, "B738");
    }

    #[test]
    fn test_parse_config() {
        let text = r#"
matcher:
  algorithm: score
  modes: "model_string, icao_airline_first, score_ignore_zeros"
  pick: random
  seed: 42

default_model:
  model_string: "Fallback A320"
  icao: A320
  airline: 'DLH'
  livery: ~
"#;
        let config = parse_config(text).unwrap();
        let setup = config.matcher.setup;
        assert_eq!(setup.algorithm, MatchingAlgorithm::ScoreBased);
        assert!(setup.has(MatchingMode::BY_ICAO_ORDER_AIRLINE_FIRST));
        assert!(setup.has(MatchingMode::SCORE_IGNORE_ZEROS));
        assert!(!setup.has(MatchingMode::BY_LIVERY));
        assert_eq!(setup.pick, PickStrategy::PickRandom);
        assert_eq!(config.matcher.seed, Some(42));
        assert_eq!(config.default_model.model_string, "Fallback A320");
        assert_eq!(config.default_model.airline, "DLH");
        assert_eq!(config.default_model.livery, "");

        let model = config.default_model.to_model();
        assert_eq!(model.designator(), "A320");
        assert_eq!(model.livery.combined_code, "DLH.STD");
    }

    #[test]
    fn test_parse_config_invalid_values() {
        assert!(parse_config("matcher:\n  algorithm: fastest\n").is_err());
        assert!(parse_config("matcher:\n  modes: livery,colour\n").is_err());
        assert!(parse_config("matcher:\n  seed: abc\n").is_err());
    }

    #[test]
    fn test_parse_config_ignores_unknown() {
        let config = parse_config("other:\n  key: value\nmatcher:\n  verbose: true\n").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_roundtrip() {
        let mut config = Config::default();
        config.matcher.setup.mode = MatchingMode::BY_LIVERY | MatchingMode::BY_MILITARY;
        config.matcher.setup.pick = PickStrategy::PickByOrder;
        config.matcher.seed = Some(7);
        config.default_model.airline = "BAW".into();
        let parsed = parse_config(&serialize_config(&config)).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_empty_modes_roundtrip() {
        let mut config = Config::default();
        config.matcher.setup.mode = MatchingMode::NONE;
        let parsed = parse_config(&serialize_config(&config)).unwrap();
        assert!(parsed.matcher.setup.mode.is_empty());
    }
}
