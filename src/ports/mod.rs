pub mod analyzer;

pub use analyzer::ExportAnalyzer;
