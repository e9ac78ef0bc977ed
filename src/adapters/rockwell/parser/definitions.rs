use std::collections::HashMap;

use log::{debug, warn};

use super::scanner::{find_keyword, section, typed_declarations, TextScanner};
use crate::adapters::rockwell::protocol::{
    AOI_DEFINITION, AOI_DEFINITION_END, BOOL_TYPE, LOCAL_TAGS, LOCAL_TAGS_END, PARAMETERS, PARAMETERS_END,
};
use crate::model::{AlarmCondition, BlockTypeDefinition, LayoutWarning, Parameter};

/// Decodes the AOI definition of every requested block type.
/// Types without a definition block are simply absent from the result.
pub fn parse_definitions(text: &str, block_types: &[String]) -> HashMap<String, BlockTypeDefinition> {
    let mut definitions = HashMap::new();

    for name in block_types {
        let Some(block) = find_definition_block(text, name) else {
            debug!("AOI definition not found: {}", name);
            continue;
        };

        let parameters: Vec<Parameter> = section(block, PARAMETERS, PARAMETERS_END)
            .map(typed_declarations)
            .unwrap_or_default()
            .into_iter()
            .map(|(name, data_type)| Parameter { name, data_type })
            .collect();

        // Only BOOL locals matter: they share the hidden DINTs with BOOL parameters.
        let local_bools: Vec<String> = section(block, LOCAL_TAGS, LOCAL_TAGS_END)
            .map(typed_declarations)
            .unwrap_or_default()
            .into_iter()
            .filter(|(_, data_type)| data_type == BOOL_TYPE)
            .map(|(name, _)| name)
            .collect();

        let definition = BlockTypeDefinition::new(name.clone(), parameters, local_bools);
        debug!(
            "AOI {}: {} parameters, {} packed BOOLs",
            name,
            definition.parameters.len(),
            definition.bool_count()
        );
        definitions.insert(name.clone(), definition);
    }

    definitions
}

/// Text between `ADD_ON_INSTRUCTION_DEFINITION <name>` and the next end marker.
fn find_definition_block<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let mut scanner = TextScanner::new(text);
    while scanner.find_keyword(AOI_DEFINITION).is_some() {
        if scanner.skip_whitespace() == 0 {
            continue;
        }
        let resume = scanner.position();
        if scanner.read_identifier() != Some(name) {
            scanner.seek_to(resume);
            continue;
        }
        let body_start = scanner.position();
        let end = find_keyword(text, body_start, AOI_DEFINITION_END)?;
        return Some(&text[body_start..end]);
    }
    None
}

/// Checks the positional limit convention against the declared parameters.
///
/// Instance vectors are read as `[packed word, HHLimit, HLimit, LLimit, LLLimit, ...]`.
/// That only holds when all BOOLs fit in one DINT and the first non-BOOL parameters are the
/// four limits in that order.
pub fn limit_layout_warnings(definition: &BlockTypeDefinition) -> Vec<LayoutWarning> {
    let mut warnings = Vec::new();

    let words = definition.packed_word_count();
    if words != 1 {
        warnings.push(LayoutWarning {
            block_type: definition.name.clone(),
            message: format!(
                "{} packed BOOLs need {} DINTs; limit index 1 is not the first limit",
                definition.bool_count(),
                words
            ),
        });
    }

    let expected: Vec<&str> = AlarmCondition::ALL.iter().map(|c| c.limit_parameter()).collect();
    let declared: Vec<&str> = definition
        .parameters
        .iter()
        .filter(|p| !p.is_bool())
        .take(expected.len())
        .map(|p| p.name.as_str())
        .collect();
    if declared != expected {
        warnings.push(LayoutWarning {
            block_type: definition.name.clone(),
            message: format!(
                "leading non-BOOL parameters are [{}], expected [{}]",
                declared.join(", "),
                expected.join(", ")
            ),
        });
    }

    for warning in &warnings {
        warn!("AOI {} layout: {}", warning.block_type, warning.message);
    }
    warnings
}
