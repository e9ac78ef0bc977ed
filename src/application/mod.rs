pub mod enrichment;
pub mod service;
