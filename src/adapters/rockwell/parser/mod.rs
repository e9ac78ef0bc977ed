//! L5K text analysis.
//!
//! Each pass first isolates its blocks (definition, `TAG` section, rung, value vector) with a
//! bracket-aware scanner and only then extracts fields inside the isolated text.

mod scanner;
mod vector;
mod definitions;
mod instances;
mod tags;
mod rungs;

use log::info;

use super::config::L5kConfig;
use crate::model::ProgramAnalysis;

pub use definitions::{limit_layout_warnings, parse_definitions};
pub use instances::parse_instances;
pub use rungs::{resolve_interlocks, scan_rungs, Rung};
pub use tags::collect_global_symbols;
pub use vector::tokenize_vector;

/// Runs every pass over the export once and bundles the immutable results.
pub fn analyze_program(text: &str, config: &L5kConfig) -> ProgramAnalysis {
    let definitions = parse_definitions(text, &config.block_types);
    let instances = parse_instances(text, &config.block_types);
    let symbols = collect_global_symbols(text);
    let rungs = scan_rungs(text);
    let interlocks = resolve_interlocks(&rungs, &instances, &symbols);

    let mut warnings = Vec::new();
    if config.check_limit_layout {
        let mut names: Vec<&String> = definitions.keys().collect();
        names.sort();
        for name in names {
            warnings.extend(limit_layout_warnings(&definitions[name]));
        }
    }

    info!(
        "L5K analysis: {} AOI definitions, {} instances, {} global tags, {} rungs, {} interlock keys",
        definitions.len(),
        instances.len(),
        symbols.len(),
        rungs.len(),
        interlocks.len()
    );

    ProgramAnalysis {
        definitions,
        instances,
        symbols,
        interlocks,
        warnings,
    }
}
