use std::collections::HashMap;

use log::debug;

use super::scanner::{find_keyword, is_ident_byte, TextScanner};
use crate::adapters::rockwell::protocol::{CoilVerb, ContactVerb, MEMBER_SEPARATOR, RUNG_PREFIX};
use crate::model::{AlarmCondition, GlobalSymbolSet, InstanceRecord, InterlockKey, InterlockMap, SourceSpan};

/// A rung of the shape `N: [conditions] VERB(output);`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rung<'a> {
    /// Text between the outer condition brackets.
    pub conditions: &'a str,
    pub verb: CoilVerb,
    pub output: &'a str,
    pub span: SourceSpan,
}

impl<'a> Rung<'a> {
    /// Output tag up to its first member access (`E1611AG01M1.Def.7` -> `E1611AG01M1`).
    pub fn output_base(&self) -> &'a str {
        self.output.split(MEMBER_SEPARATOR).next().unwrap_or(self.output)
    }

    /// `XIC(ref)` / `XIO(ref)` references inside the condition group, in order.
    /// Both polarities gate the output, so the verb itself is not kept.
    pub fn contacts(&self) -> Vec<&'a str> {
        contact_references(self.conditions)
    }
}

/// Scans all rungs with a bracketed condition group and a single coil output.
/// Rungs of any other shape are skipped.
pub fn scan_rungs(text: &str) -> Vec<Rung<'_>> {
    let mut rungs = Vec::new();
    let mut search_from = 0;

    while let Some(start) = find_rung_prefix(text, search_from) {
        match read_rung(text, start) {
            Some(rung) => {
                search_from = rung.span.end;
                rungs.push(rung);
            }
            None => search_from = start + RUNG_PREFIX.len(),
        }
    }

    rungs
}

/// Accumulates `(instance, condition) -> outputs`.
///
/// A rung counts only when its output base is a global tag; each of its contacts counts only
/// when it reads `<known instance>.<alarm member>`. Pure set union, so rung order is irrelevant.
pub fn resolve_interlocks<'r, 'a: 'r>(
    rungs: impl IntoIterator<Item = &'r Rung<'a>>,
    instances: &HashMap<String, InstanceRecord>,
    symbols: &GlobalSymbolSet,
) -> InterlockMap {
    let mut interlocks = InterlockMap::default();

    for rung in rungs {
        let base = rung.output_base();
        if !symbols.contains(base) {
            debug!("rung at {} skipped: output {} is not a global tag", rung.span.start, rung.output);
            continue;
        }

        for reference in rung.contacts() {
            let Some((instance, member)) = reference.split_once(MEMBER_SEPARATOR) else {
                continue;
            };
            if !instances.contains_key(instance) {
                continue;
            }
            let Some(condition) = AlarmCondition::from_member(member) else {
                continue;
            };
            interlocks.add(InterlockKey::new(instance, condition), rung.output);
        }
    }

    interlocks
}

fn find_rung_prefix(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut cursor = from;
    loop {
        let start = cursor + text.get(cursor..)?.find(RUNG_PREFIX)?;
        if start == 0 || !is_ident_byte(bytes[start - 1]) {
            return Some(start);
        }
        cursor = start + 1;
    }
}

fn read_rung(text: &str, start: usize) -> Option<Rung<'_>> {
    let mut scanner = TextScanner::at(text, start + RUNG_PREFIX.len());
    scanner.skip_whitespace();
    if !scanner.eat(b'[') {
        return None;
    }
    let conditions_start = scanner.position();
    let conditions_end = matching_bracket(text, conditions_start)?;
    scanner.seek_to(conditions_end + 1);

    scanner.skip_whitespace();
    let verb = read_coil_verb(&mut scanner)?;
    scanner.skip_whitespace();
    if !scanner.eat(b'(') {
        return None;
    }
    scanner.skip_whitespace();
    let output = scanner.read_reference()?;
    scanner.skip_whitespace();
    if !scanner.eat(b')') {
        return None;
    }
    scanner.skip_whitespace();
    if !scanner.eat(b';') {
        return None;
    }

    Some(Rung {
        conditions: &text[conditions_start..conditions_end],
        verb,
        output,
        span: SourceSpan {
            start,
            end: scanner.position(),
        },
    })
}

/// `OTU` or `(OTU)`.
fn read_coil_verb(scanner: &mut TextScanner<'_>) -> Option<CoilVerb> {
    if scanner.eat(b'(') {
        scanner.skip_whitespace();
        let verb = CoilVerb::parse(scanner.read_identifier()?)?;
        scanner.skip_whitespace();
        return scanner.eat(b')').then_some(verb);
    }
    CoilVerb::parse(scanner.read_identifier()?)
}

/// Offset of the `]` closing the group opened right before `from`.
/// Branches nest freely; a `;` means the rung ended without closing the group.
fn matching_bracket(text: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (offset, b) in text.as_bytes()[from..].iter().enumerate() {
        match *b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + offset);
                }
            }
            b';' => return None,
            _ => {}
        }
    }
    None
}

fn contact_references(conditions: &str) -> Vec<&str> {
    let mut found: Vec<(usize, &str)> = Vec::new();

    for verb in ContactVerb::ALL {
        let mut search_from = 0;
        while let Some(start) = find_keyword(conditions, search_from, verb.mnemonic()) {
            search_from = start + verb.mnemonic().len();
            let mut scanner = TextScanner::at(conditions, search_from);
            if !scanner.eat(b'(') {
                continue;
            }
            let Some(reference) = scanner.read_reference() else {
                continue;
            };
            if scanner.eat(b')') {
                found.push((start, reference));
                search_from = scanner.position();
            }
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, reference)| reference).collect()
}
