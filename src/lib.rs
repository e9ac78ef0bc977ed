//! Core L5K decoding crate.
//! Responsibilities: analyze a Rockwell L5K export (AOI definitions, instances, tags, ladder rungs)
//! and enrich COMOS alarm rows with limits, enable bits and interlocked equipment.
//! Non-goals: HTTP/CLI/file handling and the tabular reader/writer (handled by upper layers).

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod application;

pub use domain::{model, table};
pub use application::service::{EnrichmentReport, EnrichmentService, EnrichmentStats};
pub use ports::analyzer::ExportAnalyzer;
pub use adapters::rockwell::{L5kAnalyzer, L5kConfig};

pub mod profile_config;
pub use profile_config::{EnrichProfile, ProfileError};
