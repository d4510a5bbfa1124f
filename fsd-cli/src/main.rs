//! fsd: CLI for FSD capture decoding and simulator model matching.

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};

use fsd_core::config::{self, Config};
use fsd_core::frame::LineFramer;
use fsd_core::traffic::{TrafficEvent, TrafficTracker};
use fsd_core::{
    decode, pdu_name as pdu_kind_name, reverse_lookup_model, AircraftIdentity, Diagnostics,
    FsdError, FsdMessage, MatchResult, MatcherSetup, MatchingAlgorithm, MatchingMode,
    ModelMatcher, ModelSet, PickStrategy, ReferenceDatabase, SimulatorPlatform,
};

mod logging;

#[derive(Parser)]
#[command(name = "fsd", version, about = "FSD decoder and aircraft model matcher")]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Declared remote aircraft.
#[derive(clap::Args, Debug, Default)]
struct IdentityArgs {
    #[arg(long, default_value = "")]
    callsign: String,

    /// ICAO aircraft designator (e.g. B738)
    #[arg(long, default_value = "")]
    icao: String,

    /// ICAO airline designator (e.g. DLH)
    #[arg(long, default_value = "")]
    airline: String,

    /// Livery combined code (e.g. DLH.STD)
    #[arg(long, default_value = "")]
    livery: String,

    /// Remote model string
    #[arg(long, default_value = "")]
    model_string: String,

    /// Combined type (e.g. L2J)
    #[arg(long, default_value = "")]
    combined_type: String,

    #[arg(long)]
    military: bool,
}

impl IdentityArgs {
    fn to_identity(&self) -> AircraftIdentity {
        AircraftIdentity {
            callsign: self.callsign.trim().to_string(),
            designator: self.icao.clone(),
            combined_type: self.combined_type.clone(),
            manufacturer: String::new(),
            airline: self.airline.clone(),
            livery: self.livery.clone(),
            model_string: self.model_string.clone(),
            military: self.military,
        }
    }
}

/// Overrides for the configured matcher setup.
#[derive(clap::Args, Debug, Default)]
struct SetupArgs {
    /// stepwise | score
    #[arg(long)]
    algorithm: Option<String>,

    /// Comma-separated mode flags (model_string, icao_aircraft_first, ...)
    #[arg(long)]
    modes: Option<String>,

    /// first | order | random
    #[arg(long)]
    pick: Option<String>,

    /// Seed for random picks
    #[arg(long, env = "FSD_MATCH_SEED")]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an FSD capture file and print a PDU summary
    Decode {
        /// Capture file with one FSD line per line, or - for stdin
        file: PathBuf,

        /// Print every decoded message instead of the summary
        #[arg(short, long)]
        raw: bool,

        /// With --raw, print messages as JSON
        #[arg(long)]
        json: bool,
    },

    /// Match a remote aircraft against an installed model set
    Match {
        /// JSON array of model records
        #[arg(long)]
        models: PathBuf,

        /// Simulator the model set belongs to
        #[arg(long, default_value = "any")]
        simulator: String,

        /// Extra reference data (JSON) on top of the built-in tables
        #[arg(long)]
        reference: Option<PathBuf>,

        #[command(flatten)]
        identity: IdentityArgs,

        #[command(flatten)]
        setup: SetupArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Complete a partially known model from reference data
    Reverse {
        #[command(flatten)]
        identity: IdentityArgs,

        /// Extra reference data (JSON) on top of the built-in tables
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode a capture, track pilots, and match a model for each
    Feed {
        /// Capture file with one FSD line per line, or - for stdin
        file: PathBuf,

        /// JSON array of model records
        #[arg(long)]
        models: PathBuf,

        #[arg(long, default_value = "any")]
        simulator: String,

        #[command(flatten)]
        setup: SetupArgs,
    },

    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to ~/.fsd-match/config.yaml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Decode { file, raw, json } => cmd_decode(&file, raw, json),
        Commands::Match {
            models,
            simulator,
            reference,
            identity,
            setup,
            json,
        } => cmd_match(&models, &simulator, reference.as_deref(), &identity, &setup, json),
        Commands::Reverse {
            identity,
            reference,
            json,
        } => cmd_reverse(&identity, reference.as_deref(), json),
        Commands::Feed {
            file,
            models,
            simulator,
            setup,
        } => cmd_feed(&file, &models, &simulator, &setup),
        Commands::Config { action } => cmd_config(action),
    }
}

fn exit_with(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("Error {context}: {err}");
    std::process::exit(1);
}

// ---------------------------------------------------------------------------
// Input helpers
// ---------------------------------------------------------------------------

/// Read all complete lines from a file or stdin (`-`) through the line framer.
fn read_lines(file: &Path) -> Result<Vec<String>, FsdError> {
    let mut reader: Box<dyn Read> = if file.to_str() == Some("-") {
        Box::new(io::stdin().lock())
    } else {
        Box::new(std::fs::File::open(file)?)
    };

    let mut framer = LineFramer::new();
    let mut lines = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        lines.extend(framer.push(&buf[..n]));
    }
    // Flush an unterminated last line.
    lines.extend(framer.push(b"\n"));
    Ok(lines)
}

fn parse_simulator(name: &str) -> SimulatorPlatform {
    SimulatorPlatform::parse(name)
        .unwrap_or_else(|| exit_with("parsing --simulator", format!("unknown simulator '{name}'")))
}

fn load_model_set(path: &Path, simulator: SimulatorPlatform) -> ModelSet {
    ModelSet::from_json_file(simulator, path)
        .unwrap_or_else(|e| exit_with(&format!("loading models {}", path.display()), e))
}

fn load_reference(path: Option<&Path>) -> ReferenceDatabase {
    let mut db = ReferenceDatabase::builtin();
    if let Some(path) = path {
        let text = std::fs::read_to_string(path)
            .unwrap_or_else(|e| exit_with(&format!("reading {}", path.display()), e));
        db.extend_from_json(&text)
            .unwrap_or_else(|e| exit_with(&format!("loading reference {}", path.display()), e));
    }
    db
}

/// Apply command-line overrides to the configured setup.
fn build_setup(base: MatcherSetup, args: &SetupArgs) -> Result<MatcherSetup, FsdError> {
    let mut setup = base;
    if let Some(name) = &args.algorithm {
        setup.algorithm = MatchingAlgorithm::parse(name)
            .ok_or_else(|| FsdError::Config(format!("unknown algorithm: {name}")))?;
    }
    if let Some(list) = &args.modes {
        setup.mode = MatchingMode::parse_list(list)?;
    }
    if let Some(name) = &args.pick {
        setup.pick = PickStrategy::parse(name)
            .ok_or_else(|| FsdError::Config(format!("unknown pick strategy: {name}")))?;
    }
    Ok(setup)
}

fn build_matcher(config: &Config, args: &SetupArgs, model_set: ModelSet) -> ModelMatcher {
    let setup = build_setup(config.matcher.setup, args)
        .unwrap_or_else(|e| exit_with("in matcher options", e));
    let matcher = match args.seed.or(config.matcher.seed) {
        Some(seed) => ModelMatcher::with_seed(seed),
        None => ModelMatcher::new(),
    };
    matcher.set_setup(setup);
    matcher.set_default_model(config.default_model.to_model());
    matcher.set_model_set(model_set);
    matcher.set_reference_data(Arc::new(ReferenceDatabase::builtin()));
    matcher
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_decode(file: &Path, raw: bool, json: bool) {
    let lines = read_lines(file).unwrap_or_else(|e| exit_with(&format!("reading {}", file.display()), e));

    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    let mut errors = 0u64;

    for line in &lines {
        match decode(line) {
            Ok(msg) => {
                *counts.entry(pdu_name(&msg)).or_default() += 1;
                if raw && json {
                    match serde_json::to_string(&msg) {
                        Ok(text) => println!("{text}"),
                        Err(e) => eprintln!("Cannot serialize message: {e}"),
                    }
                } else if raw {
                    println!("{msg:?}");
                }
            }
            Err(e) => {
                errors += 1;
                if raw {
                    eprintln!("{e}: {line}");
                }
            }
        }
    }

    if raw {
        return;
    }

    println!();
    println!(
        "Lines: {} read, {} decoded, {errors} errors",
        lines.len(),
        lines.len() as u64 - errors
    );
    println!();
    if counts.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["PDU", "Count"]);
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by_key(|(_, n)| std::cmp::Reverse(*n));
    for (name, count) in sorted {
        table.add_row(vec![Cell::new(name), Cell::new(count)]);
    }
    println!("{table}");
}

fn pdu_name(msg: &FsdMessage) -> &'static str {
    match msg {
        FsdMessage::PlaneInfoRequest(_) => "Plane info request",
        FsdMessage::PlaneInformation(_) => "Plane information",
        FsdMessage::PlaneInfoRequestFsinn(_) => "FSInn plane info request",
        FsdMessage::PlaneInformationFsinn(_) => "FSInn plane information",
        other => pdu_kind_name(other.kind()),
    }
}

fn cmd_match(
    models: &Path,
    simulator: &str,
    reference: Option<&Path>,
    identity: &IdentityArgs,
    setup: &SetupArgs,
    json: bool,
) {
    let config = config::load_config();
    let model_set = load_model_set(models, parse_simulator(simulator));
    let matcher = build_matcher(&config, setup, model_set);
    if reference.is_some() {
        matcher.set_reference_data(Arc::new(load_reference(reference)));
    }

    let remote = identity.to_identity();
    let result = matcher.get_closest_match(&remote);

    if json {
        print_json(&serde_json::json!({
            "model": result.model,
            "diagnostics": result.diagnostics,
        }));
        return;
    }
    print_match(&result);
}

fn print_match(result: &MatchResult) {
    let model = &result.model;
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Model"), Cell::new(&model.model_string)]);
    table.add_row(vec![Cell::new("Type"), Cell::new(format!("{:?}", model.model_type))]);
    table.add_row(vec![Cell::new("Aircraft"), Cell::new(or_dash(model.designator()))]);
    table.add_row(vec![Cell::new("Airline"), Cell::new(or_dash(model.airline_designator()))]);
    table.add_row(vec![
        Cell::new("Livery"),
        Cell::new(or_dash(&model.livery.combined_code)),
    ]);
    table.add_row(vec![Cell::new("Callsign"), Cell::new(or_dash(&model.callsign))]);
    println!("{table}");
    print_diagnostics(&result.diagnostics);
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }
    println!();
    for m in diagnostics.messages() {
        println!("  [{}] {}", m.severity, m.text);
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => exit_with("serializing output", e),
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

fn cmd_reverse(identity: &IdentityArgs, reference: Option<&Path>, json: bool) {
    let db = load_reference(reference);
    let model = identity.to_identity().to_model();
    let mut diagnostics = Diagnostics::for_context(&identity.callsign);
    let result = reverse_lookup_model(&model, &identity.livery, &db, &mut diagnostics);

    if json {
        print_json(&serde_json::json!({
            "model": result,
            "diagnostics": diagnostics,
        }));
        return;
    }

    let icao = &result.aircraft_icao;
    let airline = &result.livery.airline;
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Model"), Cell::new(or_dash(&result.model_string))]);
    table.add_row(vec![Cell::new("Aircraft"), Cell::new(or_dash(&icao.designator))]);
    table.add_row(vec![Cell::new("Manufacturer"), Cell::new(or_dash(&icao.manufacturer))]);
    table.add_row(vec![Cell::new("Family"), Cell::new(or_dash(&icao.family))]);
    table.add_row(vec![Cell::new("Combined type"), Cell::new(or_dash(&icao.combined_type))]);
    table.add_row(vec![Cell::new("Airline"), Cell::new(or_dash(&airline.designator))]);
    table.add_row(vec![Cell::new("Airline name"), Cell::new(or_dash(&airline.name))]);
    table.add_row(vec![
        Cell::new("Livery"),
        Cell::new(or_dash(&result.livery.combined_code)),
    ]);
    println!("{table}");
    print_diagnostics(&diagnostics);
}

fn cmd_feed(file: &Path, models: &Path, simulator: &str, setup: &SetupArgs) {
    let config = config::load_config();
    let model_set = load_model_set(models, parse_simulator(simulator));
    let matcher = build_matcher(&config, setup, model_set);
    let lines = read_lines(file).unwrap_or_else(|e| exit_with(&format!("reading {}", file.display()), e));

    let mut tracker = TrafficTracker::new();
    let mut matches: BTreeMap<String, MatchResult> = BTreeMap::new();
    let mut removed = 0u64;

    // Captures carry no timestamps; one line per tenth of a second.
    for (i, line) in lines.iter().enumerate() {
        let (_msg, events) = tracker.update_line(line, i as f64 * 0.1);
        for event in events {
            match event {
                TrafficEvent::IdentityChanged { callsign, identity } => {
                    let result = matcher.get_closest_match(&identity);
                    matches.insert(callsign, result);
                }
                TrafficEvent::Removed { .. } => removed += 1,
                TrafficEvent::NewAircraft { .. } | TrafficEvent::PositionUpdate { .. } => {}
            }
        }
    }

    println!();
    println!("Feed complete: {}", file.display());
    println!(
        "  Lines: {} total, {} decoded, {} errors",
        tracker.total_lines, tracker.decoded_lines, tracker.decode_errors
    );
    println!(
        "  Pilots: {} tracked, {removed} removed, {} matched",
        tracker.pilots.len(),
        matches.len()
    );
    println!();

    if matches.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Callsign", "Aircraft", "Airline", "Model", "Type", "Notes"]);
    for (callsign, result) in &matches {
        let identity = tracker.pilots.get(callsign).map(|p| &p.identity);
        let warnings = result
            .diagnostics
            .messages()
            .iter()
            .filter(|m| m.severity >= fsd_core::Severity::Info)
            .count();
        table.add_row(vec![
            Cell::new(callsign),
            Cell::new(or_dash(identity.map(|i| i.designator.as_str()).unwrap_or(""))),
            Cell::new(or_dash(identity.map(|i| i.airline.as_str()).unwrap_or(""))),
            Cell::new(&result.model.model_string),
            Cell::new(format!("{:?}", result.model.model_type)),
            Cell::new(warnings),
        ]);
    }
    println!("{table}");
}

fn cmd_config(action: ConfigAction) {
    match action {
        ConfigAction::Show => {
            let path = config::config_file();
            let config = config::load_config();
            println!("# {}", path.display());
            print!("{}", config::serialize_config(&config));
        }
        ConfigAction::Init { force } => {
            let path = config::config_file();
            if path.exists() && !force {
                exit_with(
                    "writing config",
                    format!("{} exists (use --force to overwrite)", path.display()),
                );
            }
            match config::save_config(&Config::default()) {
                Ok(path) => println!("Wrote {}", path.display()),
                Err(e) => exit_with("writing config", e),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
