use std::collections::HashMap;

use log::debug;

use super::scanner::{identifier_before, TextScanner};
use super::vector::tokenize_vector;
use crate::model::{InstanceRecord, SourceSpan};

/// Finds every `Name : TYPE (attributes) := [values];` declaration of the requested AOIs.
///
/// The vector ends at the first `]` directly followed by `;`, so nested arrays inside the
/// values do not close it early. A repeated instance name keeps the last declaration.
pub fn parse_instances(text: &str, block_types: &[String]) -> HashMap<String, InstanceRecord> {
    let mut instances: HashMap<String, InstanceRecord> = HashMap::new();
    let mut search_from = 0;

    while let Some(rel) = text[search_from..].find(':') {
        let colon = search_from + rel;
        search_from = colon + 1;

        let Some(record) = read_instance(text, colon, block_types) else {
            continue;
        };
        search_from = record.span.end;

        if let Some(previous) = instances.get(&record.name) {
            debug!(
                "instance {} redeclared at {}..{} (previous {}..{}), keeping the last one",
                record.name, record.span.start, record.span.end, previous.span.start, previous.span.end
            );
        }
        instances.insert(record.name.clone(), record);
    }

    instances
}

fn read_instance(text: &str, colon: usize, block_types: &[String]) -> Option<InstanceRecord> {
    let (name_start, name) = identifier_before(text, colon)?;

    let mut scanner = TextScanner::at(text, colon + 1);
    if scanner.peek() == Some(b'=') {
        return None;
    }
    scanner.skip_whitespace();
    let block_type = scanner.read_identifier()?;
    if !block_types.iter().any(|t| t == block_type) {
        return None;
    }

    let open = find_vector_open(text, scanner.position())?;
    let body_start = open + 1;
    let body_len = text[body_start..].find("];")?;
    let body = &text[body_start..body_start + body_len];

    Some(InstanceRecord {
        name: name.to_string(),
        block_type: block_type.to_string(),
        values: tokenize_vector(body),
        span: SourceSpan {
            start: name_start,
            end: body_start + body_len + 2,
        },
    })
}

/// Offset of the `[` opening the value vector. Quoted attribute text is skipped and an
/// unquoted `;` ends the declaration: a tag declared without values has no vector.
/// Inside quotes `$` escapes the next byte (`"2$" valve"`).
fn find_vector_open(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut in_quote = false;
    let mut pos = from;
    while pos < bytes.len() {
        match bytes[pos] {
            b'$' if in_quote => pos += 1,
            b'"' => in_quote = !in_quote,
            b'[' if !in_quote => return Some(pos),
            b';' if !in_quote => return None,
            _ => {}
        }
        pos += 1;
    }
    None
}
