//! Per-row pass: writes `Value`, `Signal` and `Text 0` into matching COMOS rows.
//!
//! Rows only read the shared `ProgramAnalysis`, so they are processed in parallel;
//! the output keeps the input order.

use rayon::prelude::*;
use serde::Serialize;

use crate::model::{AlarmCondition, ProgramAnalysis};
use crate::table::{TableRow, COL_BLOCK, COL_BLOCK_TYPE, COL_IO_NAME, COL_SIGNAL, COL_TEXT0, COL_VALUE};

/// What happened to one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// Not an alarm-condition row of a handled block type.
    PassThrough,
    /// Alarm row whose instance is not declared in this export.
    UnresolvedInstance,
    Enriched { interlocked: bool },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentStats {
    pub rows_total: usize,
    pub rows_matched: usize,
    pub rows_with_interlock: usize,
    pub instances_unresolved: usize,
}

impl EnrichmentStats {
    fn record(&mut self, outcome: RowOutcome) {
        self.rows_total += 1;
        match outcome {
            RowOutcome::PassThrough => {}
            RowOutcome::UnresolvedInstance => self.instances_unresolved += 1,
            RowOutcome::Enriched { interlocked } => {
                self.rows_matched += 1;
                if interlocked {
                    self.rows_with_interlock += 1;
                }
            }
        }
    }
}

/// `Block type` cells carry decorations (`@IHMALMA_2780`), so containment is enough.
pub fn matches_block_type(block_types: &[String], cell: &str) -> bool {
    block_types.iter().any(|t| cell.contains(t.as_str()))
}

/// Enriches one row. Non-matching rows come back untouched apart from trimmed column names.
pub fn enrich_row(
    row: TableRow,
    analysis: &ProgramAnalysis,
    block_types: &[String],
    separator: &str,
) -> (TableRow, RowOutcome) {
    let mut row = row.trim_columns();

    if !matches_block_type(block_types, &row.text(COL_BLOCK_TYPE)) {
        return (row, RowOutcome::PassThrough);
    }
    // Status/In/Out rows of the same block stay as they are.
    let Some(condition) = AlarmCondition::from_member(&row.text(COL_IO_NAME)) else {
        return (row, RowOutcome::PassThrough);
    };
    let block = row.text(COL_BLOCK);
    let Some(instance) = analysis.instance(&block) else {
        return (row, RowOutcome::UnresolvedInstance);
    };

    let value = instance.number_at(condition.limit_index());
    let signal = analysis
        .definition_of(instance)
        .and_then(|def| def.bit_slot(condition.enable_parameter()))
        .map(|slot| instance.packed_bit(slot))
        .unwrap_or(0);

    row.set(COL_VALUE, value);
    row.set(COL_SIGNAL, i64::from(signal));

    let mut interlocked = false;
    if let Some(outputs) = analysis.interlocks.outputs(&block, condition) {
        if !outputs.is_empty() {
            let joined: Vec<&str> = outputs.iter().map(String::as_str).collect();
            row.set(COL_TEXT0, joined.join(separator));
            interlocked = true;
        }
    }

    (row, RowOutcome::Enriched { interlocked })
}

pub fn enrich_rows(
    rows: Vec<TableRow>,
    analysis: &ProgramAnalysis,
    block_types: &[String],
    separator: &str,
) -> (Vec<TableRow>, EnrichmentStats) {
    let processed: Vec<(TableRow, RowOutcome)> = rows
        .into_par_iter()
        .map(|row| enrich_row(row, analysis, block_types, separator))
        .collect();

    let mut stats = EnrichmentStats::default();
    let rows = processed
        .into_iter()
        .map(|(row, outcome)| {
            stats.record(outcome);
            row
        })
        .collect();
    (rows, stats)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::model::{BlockTypeDefinition, InstanceRecord, InterlockKey, Parameter, SourceSpan};
    use crate::table::CellValue;

    fn param(name: &str, data_type: &str) -> Parameter {
        Parameter {
            name: name.to_string(),
            data_type: data_type.to_string(),
        }
    }

    fn analysis(packed_word: &str) -> ProgramAnalysis {
        let definition = BlockTypeDefinition::new(
            "IHMALMA".to_string(),
            vec![
                param("HHEnabled", "BOOL"),
                param("HHLimit", "REAL"),
                param("HLimit", "REAL"),
                param("LLimit", "REAL"),
                param("LLLimit", "REAL"),
                param("HEnabled", "BOOL"),
            ],
            vec!["LEnabled".to_string()],
        );
        let mut instance = InstanceRecord {
            name: "TE1611001_ALM".to_string(),
            block_type: "IHMALMA".to_string(),
            values: ["0", "120.5", "100.0", "10.0", "oops"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            span: SourceSpan { start: 0, end: 0 },
        };
        instance.values[0] = packed_word.to_string();

        let mut result = ProgramAnalysis {
            definitions: HashMap::from([("IHMALMA".to_string(), definition)]),
            instances: HashMap::from([("TE1611001_ALM".to_string(), instance)]),
            ..Default::default()
        };
        let key = InterlockKey::new("TE1611001_ALM", AlarmCondition::TopHigh);
        result.interlocks.add(key.clone(), "E1611BB01M1.Trip");
        result.interlocks.add(key, "E1611AG01M1.Def.7");
        result
    }

    fn block_types() -> Vec<String> {
        vec!["IHMALMA".to_string()]
    }

    fn alarm_row(io_name: &str) -> TableRow {
        TableRow::new()
            .with("Block type", "@IHMALMA")
            .with("Block", "TE1611001_ALM")
            .with("I/O name", io_name)
            .with("Text 0", "original")
    }

    #[test]
    fn top_high_row_gets_limit_enable_and_sorted_interlocks() {
        let (row, outcome) = enrich_row(alarm_row("HHInAlarm"), &analysis("1"), &block_types(), " / ");
        assert_eq!(outcome, RowOutcome::Enriched { interlocked: true });
        assert_eq!(row.get(COL_VALUE), Some(&CellValue::Number(120.5)));
        assert_eq!(row.get(COL_SIGNAL), Some(&CellValue::Integer(1)));
        assert_eq!(row.text(COL_TEXT0), "E1611AG01M1.Def.7 / E1611BB01M1.Trip");
    }

    #[test]
    fn enable_bits_follow_packing_order() {
        // HHEnabled=bit0, HEnabled=bit1, LEnabled=bit2; LLEnabled is not declared.
        let data = analysis("6");
        let signal = |io: &str| {
            let (row, _) = enrich_row(alarm_row(io), &data, &block_types(), " / ");
            row.get(COL_SIGNAL).cloned()
        };
        assert_eq!(signal("HHInAlarm"), Some(CellValue::Integer(0)));
        assert_eq!(signal("HInAlarm"), Some(CellValue::Integer(1)));
        assert_eq!(signal("LInAlarm"), Some(CellValue::Integer(1)));
        assert_eq!(signal("LLInAlarm"), Some(CellValue::Integer(0)));
    }

    #[test]
    fn unparseable_limit_is_nan_and_existing_text_is_kept() {
        let (row, _) = enrich_row(alarm_row("LLInAlarm"), &analysis("0"), &block_types(), " / ");
        assert!(row.get(COL_VALUE).unwrap().is_nan());
        assert_eq!(row.text(COL_TEXT0), "original");
    }

    #[test]
    fn non_packed_word_yields_zero_signal() {
        let (row, _) = enrich_row(alarm_row("HHInAlarm"), &analysis("[1,2]"), &block_types(), " / ");
        assert_eq!(row.get(COL_SIGNAL), Some(&CellValue::Integer(0)));
    }

    #[test]
    fn other_rows_pass_through_untouched() {
        let data = analysis("1");
        for row in [
            alarm_row("Status"),
            alarm_row("HHInAlarm").with("Block type", "IHMDIGA"),
        ] {
            let (out, outcome) = enrich_row(row.clone(), &data, &block_types(), " / ");
            assert_eq!(outcome, RowOutcome::PassThrough);
            assert_eq!(out, row);
        }

        let unknown = alarm_row("HHInAlarm").with("Block", "XX_ALM");
        let (out, outcome) = enrich_row(unknown.clone(), &data, &block_types(), " / ");
        assert_eq!(outcome, RowOutcome::UnresolvedInstance);
        assert_eq!(out, unknown);
    }

    #[test]
    fn padded_headers_are_trimmed_before_matching() {
        let row = TableRow::new()
            .with(" Block type ", "IHMALMA")
            .with("Block ", "TE1611001_ALM")
            .with("I/O name", "HInAlarm");
        let (row, outcome) = enrich_row(row, &analysis("0"), &block_types(), " / ");
        assert_eq!(outcome, RowOutcome::Enriched { interlocked: false });
        assert_eq!(row.get(COL_VALUE), Some(&CellValue::Number(100.0)));
        assert!(row.get(COL_TEXT0).is_none());
    }

    #[test]
    fn batch_keeps_order_and_counts_outcomes() {
        let rows = vec![
            alarm_row("HHInAlarm"),
            alarm_row("Status"),
            alarm_row("HInAlarm").with("Block", "MISSING"),
            alarm_row("LInAlarm"),
        ];
        let (out, stats) = enrich_rows(rows, &analysis("0"), &block_types(), " / ");
        let io: Vec<String> = out.iter().map(|r| r.text(COL_IO_NAME)).collect();
        assert_eq!(io, vec!["HHInAlarm", "Status", "HInAlarm", "LInAlarm"]);
        assert_eq!(
            stats,
            EnrichmentStats {
                rows_total: 4,
                rows_matched: 2,
                rows_with_interlock: 1,
                instances_unresolved: 1,
            }
        );
    }

    #[test]
    fn block_type_match_is_substring_based() {
        let types = vec!["IHMALMA".to_string(), "IHMALMA_2780".to_string()];
        assert!(matches_block_type(&types, "@IHMALMA_2780 (AOI)"));
        assert!(matches_block_type(&types, "IHMALMA"));
        assert!(!matches_block_type(&types, "IHMDIGA"));
    }
}
