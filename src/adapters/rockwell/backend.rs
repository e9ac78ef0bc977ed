use anyhow::Result;

use crate::model::ProgramAnalysis;
use crate::ports::analyzer::ExportAnalyzer;

use super::config::L5kConfig;
use super::parser::analyze_program;

/// Rockwell L5K analyzer: turns the export text into a `ProgramAnalysis`.
#[derive(Debug, Clone, Default)]
pub struct L5kAnalyzer {
    config: L5kConfig,
}

impl L5kAnalyzer {
    pub fn new(config: L5kConfig) -> Self {
        Self { config }
    }
}

impl ExportAnalyzer for L5kAnalyzer {
    fn analyze(&self, source: &str) -> Result<ProgramAnalysis> {
        Ok(analyze_program(source, &self.config))
    }

    fn block_types(&self) -> &[String] {
        &self.config.block_types
    }

    fn format_name(&self) -> &'static str {
        "L5K"
    }
}
