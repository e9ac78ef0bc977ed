use anyhow::{bail, Context, Result};
use log::info;
use serde::Serialize;

use super::enrichment::enrich_rows;
pub use super::enrichment::EnrichmentStats;
use crate::adapters::encoding::decode_export;
use crate::adapters::rockwell::{L5kAnalyzer, L5kConfig};
use crate::model::{LayoutWarning, ProgramAnalysis};
use crate::ports::ExportAnalyzer;
use crate::profile_config::EnrichProfile;
use crate::table::TableRow;

/// Enriched rows plus what the run found along the way.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentReport {
    pub rows: Vec<TableRow>,
    pub stats: EnrichmentStats,
    pub warnings: Vec<LayoutWarning>,
}

/// Application layer use case around an `ExportAnalyzer`.
/// Keeps orchestration (profile checks, two-pass ordering) away from adapters.
#[derive(Debug, Clone)]
pub struct EnrichmentService<A: ExportAnalyzer> {
    analyzer: A,
    profile: EnrichProfile,
}

impl<A: ExportAnalyzer> EnrichmentService<A> {
    pub fn new(analyzer: A, profile: EnrichProfile) -> Self {
        Self { analyzer, profile }
    }

    /// Full-text pass only.
    pub fn analyze(&self, source: &str) -> Result<ProgramAnalysis> {
        self.validate()?;
        self.analyzer
            .analyze(source)
            .with_context(|| format!("failed to analyze {} export", self.analyzer.format_name()))
    }

    /// Analyzes the export once, then enriches every row against the frozen analysis.
    pub fn enrich(&self, source: &str, rows: Vec<TableRow>) -> Result<EnrichmentReport> {
        let analysis = self.analyze(source)?;
        let (rows, stats) = enrich_rows(
            rows,
            &analysis,
            self.analyzer.block_types(),
            &self.profile.interlock_separator,
        );
        info!(
            "enrichment: {} rows, {} matched, {} with interlocks, {} unresolved instances",
            stats.rows_total, stats.rows_matched, stats.rows_with_interlock, stats.instances_unresolved
        );
        Ok(EnrichmentReport {
            rows,
            stats,
            warnings: analysis.warnings,
        })
    }

    /// Same as `enrich`, for the raw bytes of an uploaded export.
    pub fn enrich_bytes(&self, source: &[u8], rows: Vec<TableRow>) -> Result<EnrichmentReport> {
        let text = decode_export(source);
        self.enrich(&text, rows)
    }

    pub fn format_name(&self) -> &'static str {
        self.analyzer.format_name()
    }

    fn validate(&self) -> Result<()> {
        self.profile.validate()?;
        if self.analyzer.block_types().is_empty() {
            bail!("{} analyzer has no block types configured", self.analyzer.format_name());
        }
        Ok(())
    }
}

impl EnrichmentService<L5kAnalyzer> {
    /// L5K service whose analyzer decodes exactly the profile's block types.
    pub fn l5k(profile: EnrichProfile) -> Result<Self> {
        profile.validate().context("invalid enrichment profile")?;
        let analyzer = L5kAnalyzer::new(L5kConfig::from_profile(&profile));
        Ok(Self::new(analyzer, profile))
    }
}
