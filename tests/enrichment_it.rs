use l5k_core::model::AlarmCondition;
use l5k_core::table::{CellValue, TableRow, COL_SIGNAL, COL_TEXT0, COL_VALUE};
use l5k_core::{EnrichProfile, EnrichmentService, ExportAnalyzer, L5kAnalyzer, L5kConfig};
use serde_json::json;

const RUNG_TOP_HIGH_TRIP: &str = "N: [XIC(TE1611001_ALM.HHInAlarm)](OTU)(E1611AG01M1.Def.7);";
const RUNG_TOP_HIGH_STOP: &str = "N: [XIC(TE1611001_ALM.HHInAlarm) ,XIO(PT1611002_ALM.LLInAlarm)]OTE(E1611BB01M1.Stop);";
const RUNG_LOCAL_OUTPUT: &str = "N: [XIC(TE1611001_ALM.HInAlarm)]OTE(Local_Bit.0);";

/// 33 BOOL parameters: HHEnabled lands in the second packed word.
fn wide_definition() -> String {
    let spares: String = (0..32)
        .map(|i| format!("\t\t\tSpare{:02} : BOOL (Usage := Input, Default := 0);\n", i))
        .collect();
    format!(
        "\tADD_ON_INSTRUCTION_DEFINITION IHMALMA_2780 (Revision := \"2.0\")\n\
         \t\tPARAMETERS\n\
         {spares}\
         \t\t\tHHEnabled : BOOL (Usage := Input, Default := 0);\n\
         \t\t\tHHLimit : REAL (Usage := Input, Default := 0.0);\n\
         \t\t\tHLimit : REAL (Usage := Input, Default := 0.0);\n\
         \t\t\tLLimit : REAL (Usage := Input, Default := 0.0);\n\
         \t\t\tLLLimit : REAL (Usage := Input, Default := 0.0);\n\
         \t\tEND_PARAMETERS\n\
         \tEND_ADD_ON_INSTRUCTION_DEFINITION\n"
    )
}

fn export(packed_word: &str, rungs: &[&str]) -> String {
    let routine: String = rungs.iter().map(|r| format!("\t\t\t\t{}\n", r)).collect();
    format!(
        r#"IE_VER := 2.20;

CONTROLLER Area16 (ProcessorType := "1756-L73")
	DATATYPE MOTOR_DOL (FamilyType := NoFamily)
		DINT Def;
		BOOL Stop;
	END_DATATYPE

	ADD_ON_INSTRUCTION_DEFINITION IHMALMA (Description := "Alarme analogico",
	                                       Revision := "1.0")
		PARAMETERS
			HHEnabled : BOOL (Usage := Input, Default := 0);
			HHLimit : REAL (Usage := Input, Default := 0.0);
			HLimit : REAL (Usage := Input, Default := 0.0);
			LLimit : REAL (Usage := Input, Default := 0.0);
			LLLimit : REAL (Usage := Input, Default := 0.0);
			HEnabled : BOOL (Usage := Input, Default := 0);
		END_PARAMETERS
		LOCAL_TAGS
			Delay : TIMER (Description := "Atraso");
			LEnabled : BOOL (Default := 0);
			LLEnabled : BOOL (Default := 0);
		END_LOCAL_TAGS
		ROUTINE Logic
		END_ROUTINE
	END_ADD_ON_INSTRUCTION_DEFINITION

{wide}
	TAG
		E1611AG01M1 : MOTOR_DOL (Description := "Agitador") := [0,0];
		E1611BB01M1 : MOTOR_DOL (Description := "Bomba") := [0,0];
		TE1611001_ALM : IHMALMA (Description := "Temperatura [C]; mancal",
		                         RADIX := Float) := [{packed_word},120.5,100.0,10.0,5.0];
		PT1611002_ALM : IHMALMA := [12,2.5,2.0,0.5,0.1];
		FT1611003_ALM : IHMALMA_2780 := [0,1,75.0,60.0,20.0,10.0];
	END_TAG

	PROGRAM Area16_Interlocks (MainRoutineName := "Main")
		ROUTINE Main
{routine}		END_ROUTINE
	END_PROGRAM
END_CONTROLLER
"#,
        wide = wide_definition(),
        packed_word = packed_word,
        routine = routine,
    )
}

fn row(block: &str, io_name: &str) -> TableRow {
    serde_json::from_value(json!({
        "Block type": "@IHMALMA",
        "Block": block,
        "I/O name": io_name,
        "Text 0": "",
        "Page": 12
    }))
    .unwrap()
}

fn service() -> EnrichmentService<L5kAnalyzer> {
    EnrichmentService::l5k(EnrichProfile::default()).unwrap()
}

#[test]
fn top_high_limit_without_enable_or_interlock() {
    let report = service()
        .enrich(&export("0", &[]), vec![row("TE1611001_ALM", "HHInAlarm")])
        .unwrap();
    let out = &report.rows[0];
    assert_eq!(out.get(COL_VALUE), Some(&CellValue::Number(120.5)));
    assert_eq!(out.get(COL_SIGNAL), Some(&CellValue::Integer(0)));
    assert_eq!(out.text(COL_TEXT0), "");
    assert_eq!(out.get("Page"), Some(&CellValue::Integer(12)));
}

#[test]
fn enabled_top_high_reports_its_interlocked_output() {
    let report = service()
        .enrich(&export("1", &[RUNG_TOP_HIGH_TRIP]), vec![row("TE1611001_ALM", "HHInAlarm")])
        .unwrap();
    let out = &report.rows[0];
    assert_eq!(out.get(COL_VALUE), Some(&CellValue::Number(120.5)));
    assert_eq!(out.get(COL_SIGNAL), Some(&CellValue::Integer(1)));
    assert_eq!(out.text(COL_TEXT0), "E1611AG01M1.Def.7");
    assert_eq!(report.stats.rows_with_interlock, 1);
}

#[test]
fn several_outputs_are_sorted_and_joined() {
    let source = export("1", &[RUNG_TOP_HIGH_TRIP, RUNG_TOP_HIGH_STOP]);
    let report = service()
        .enrich(
            &source,
            vec![row("TE1611001_ALM", "HHInAlarm"), row("PT1611002_ALM", "LLInAlarm")],
        )
        .unwrap();
    assert_eq!(report.rows[0].text(COL_TEXT0), "E1611AG01M1.Def.7 / E1611BB01M1.Stop");
    assert_eq!(report.rows[1].text(COL_TEXT0), "E1611BB01M1.Stop");
    // PT1611002_ALM packed word 12 = 0b1100: LEnabled (bit 2) and LLEnabled (bit 3) set.
    assert_eq!(report.rows[1].get(COL_SIGNAL), Some(&CellValue::Integer(1)));
    assert_eq!(report.rows[1].get(COL_VALUE), Some(&CellValue::Number(0.1)));
}

#[test]
fn non_global_output_never_becomes_an_interlock() {
    let source = export("0", &[RUNG_LOCAL_OUTPUT]);
    let analysis = service().analyze(&source).unwrap();
    assert!(analysis.interlocks.is_empty());
    assert!(analysis
        .interlocks
        .outputs("TE1611001_ALM", AlarmCondition::High)
        .is_none());

    let report = service()
        .enrich(&source, vec![row("TE1611001_ALM", "HInAlarm")])
        .unwrap();
    assert_eq!(report.rows[0].text(COL_TEXT0), "");
    assert_eq!(report.rows[0].get(COL_VALUE), Some(&CellValue::Number(100.0)));
}

#[test]
fn rung_order_does_not_matter() {
    let rows = || vec![row("TE1611001_ALM", "HHInAlarm"), row("PT1611002_ALM", "LLInAlarm")];
    let forward = service()
        .enrich(&export("1", &[RUNG_TOP_HIGH_TRIP, RUNG_LOCAL_OUTPUT, RUNG_TOP_HIGH_STOP]), rows())
        .unwrap();
    let backward = service()
        .enrich(&export("1", &[RUNG_TOP_HIGH_STOP, RUNG_LOCAL_OUTPUT, RUNG_TOP_HIGH_TRIP]), rows())
        .unwrap();
    assert_eq!(forward.rows, backward.rows);
}

#[test]
fn other_rows_pass_through_and_enrichment_is_idempotent() {
    let source = export("1", &[RUNG_TOP_HIGH_TRIP]);
    let status = row("TE1611001_ALM", "Status");
    let digital = row("XV1611004", "HHInAlarm").with("Block type", "IHMDIGA");
    let unknown = row("TT9999999_ALM", "HHInAlarm");
    let rows = vec![
        status.clone(),
        digital.clone(),
        unknown.clone(),
        row("TE1611001_ALM", "HHInAlarm"),
    ];

    let first = service().enrich(&source, rows).unwrap();
    assert_eq!(first.rows[0], status);
    assert_eq!(first.rows[1], digital);
    assert_eq!(first.rows[2], unknown);
    assert_eq!(first.stats.rows_total, 4);
    assert_eq!(first.stats.rows_matched, 1);
    assert_eq!(first.stats.instances_unresolved, 1);

    let second = service().enrich(&source, first.rows.clone()).unwrap();
    assert_eq!(second.rows, first.rows);
}

#[test]
fn enable_bit_past_the_first_word_reads_the_second_word() {
    let source = export("0", &[]);
    let analysis = service().analyze(&source).unwrap();
    let wide = &analysis.definitions["IHMALMA_2780"];
    assert_eq!(wide.packed_word_count(), 2);

    let slot = wide.bit_slot("HHEnabled").unwrap();
    assert_eq!((slot.slot, slot.bit), (1, 0));

    let report = service()
        .enrich(
            &source,
            vec![row("FT1611003_ALM", "HHInAlarm").with("Block type", "IHMALMA_2780")],
        )
        .unwrap();
    assert_eq!(report.rows[0].get(COL_SIGNAL), Some(&CellValue::Integer(1)));

    // The positional convention still applies, so the layout check flags this AOI.
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].block_type, "IHMALMA_2780");
}

#[test]
fn layout_check_can_be_disabled() {
    let profile = EnrichProfile {
        check_limit_layout: false,
        ..EnrichProfile::default()
    };
    let report = EnrichmentService::l5k(profile)
        .unwrap()
        .enrich(&export("0", &[]), Vec::new())
        .unwrap();
    assert!(report.warnings.is_empty());
    assert_eq!(report.stats.rows_total, 0);
}

#[test]
fn latin1_export_bytes_are_decoded() {
    let text = export("1", &[RUNG_TOP_HIGH_TRIP]).replace("Atraso", "Atraso t\u{E9}rmico \u{E7}");
    let bytes: Vec<u8> = text.chars().map(|c| c as u32 as u8).collect();
    assert!(std::str::from_utf8(&bytes).is_err());

    let report = service()
        .enrich_bytes(&bytes, vec![row("TE1611001_ALM", "HHInAlarm")])
        .unwrap();
    assert_eq!(report.rows[0].get(COL_SIGNAL), Some(&CellValue::Integer(1)));
    assert_eq!(report.rows[0].text(COL_TEXT0), "E1611AG01M1.Def.7");
}

#[test]
fn analyzer_restricted_to_one_block_type_ignores_the_other() {
    let analyzer = L5kAnalyzer::new(L5kConfig::new(vec!["IHMALMA".to_string()]));
    let analysis = analyzer.analyze(&export("0", &[])).unwrap();
    assert_eq!(analysis.definitions.len(), 1);
    assert!(analysis.instance("FT1611003_ALM").is_none());
    assert!(analysis.instance("PT1611002_ALM").is_some());
    assert!(analysis.symbols.contains("E1611BB01M1"));
}

#[test]
fn report_serializes_nan_as_null() {
    let source = export("0", &[]).replace("120.5", "1.#QNAN");
    let report = service()
        .enrich(&source, vec![row("TE1611001_ALM", "HHInAlarm")])
        .unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["rows"][0]["Value"], serde_json::Value::Null);
    assert_eq!(value["stats"]["rowsMatched"], 1);
}
