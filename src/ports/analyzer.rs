use anyhow::Result;

use crate::model::ProgramAnalysis;

/// PLC export analysis port.
/// The crate only decodes text; reading files and uploads is left to upper layers.
pub trait ExportAnalyzer {
    /// Full-text pass: definitions, instances, global symbols and interlocks.
    fn analyze(&self, source: &str) -> Result<ProgramAnalysis>;
    /// Block types this analyzer looks for (used to match the `Block type` column).
    fn block_types(&self) -> &[String];
    /// Export format handled by the analyzer, e.g. "L5K".
    fn format_name(&self) -> &'static str;
}
