//! FDM analyzer - flight-phase segmentation and approach stability analysis
//!
//! Reads per-flight recorder telemetry, finds takeoffs, approaches and
//! landings against a reference set of airports and runways, and grades each
//! final approach for stability.

pub mod airports;
pub mod approaches_repo;
pub mod config;
pub mod flight_analyzer;
pub mod geometry;
pub mod log_format;
pub mod quad_tree;
pub mod reference_data;
pub mod risk;
pub mod runner;
pub mod runways;
pub mod telemetry;
pub mod thresholds;

pub use airports::Airport;
pub use approaches_repo::{ApproachRow, ApproachSink, JsonLinesApproachSink, MemoryApproachSink};
pub use flight_analyzer::{ApproachRecord, FlightAnalysis, FlightAnalyzer, LandingType, TakeoffRecord};
pub use reference_data::ReferenceData;
pub use runner::{FlightJob, FlightSource, RunSummary, analyze_flights};
pub use runways::Runway;
pub use telemetry::TelemetrySample;
pub use thresholds::{ThresholdSet, Thresholds};
