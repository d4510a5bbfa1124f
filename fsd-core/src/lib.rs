//! fsd-core: Pure FSD codec and aircraft model matching library.
//!
//! No async, no network I/O, just algorithms. Decodes FSD (VATSIM) wire
//! lines into typed messages, tracks remote pilots, and maps their declared
//! aircraft onto installed simulator models. The `fsd-cli` crate wraps it.

pub mod aircraft;
pub mod codec;
pub mod config;
pub mod decode;
pub mod diagnostics;
pub mod frame;
pub mod matcher;
pub mod message;
pub mod model_set;
pub mod reference;
pub mod reverse;
pub mod setup;
pub mod traffic;
pub mod types;

// Re-export commonly used types at crate root
pub use aircraft::{AircraftIdentity, AircraftModel, Livery, ModelType, SimulatorPlatform};
pub use codec::WireToken;
pub use decode::decode;
pub use diagnostics::{Diagnostics, Severity, StatusMessage};
pub use frame::{parse_line, LineFramer, RawPacket};
pub use matcher::{closest_match, MatchResult, MatcherSnapshot, ModelMatcher};
pub use message::FsdMessage;
pub use model_set::ModelSet;
pub use reference::{ReferenceData, ReferenceDatabase};
pub use reverse::reverse_lookup_model;
pub use setup::{MatcherSetup, MatchingAlgorithm, MatchingMode, PickStrategy};
pub use traffic::{TrafficEvent, TrafficTracker};
pub use types::*;
