use super::scanner::{find_keyword, identifier_before};
use crate::adapters::rockwell::protocol::{TAG, TAG_END};
use crate::model::GlobalSymbolSet;

/// Collects every name declared at the start of a line inside `TAG ... END_TAG` sections
/// (controller and program scope alike). The `:` may follow on a later line.
///
/// Over-inclusive on purpose: attribute lines such as `Description := ...` are picked up too,
/// which is harmless for membership tests.
pub fn collect_global_symbols(text: &str) -> GlobalSymbolSet {
    let mut symbols = GlobalSymbolSet::default();
    let mut search_from = 0;

    while let Some(start) = find_keyword(text, search_from, TAG) {
        let body_start = start + TAG.len();
        let Some(rel_end) = text[body_start..].find(TAG_END) else {
            break;
        };
        let body = &text[body_start..body_start + rel_end];

        for name in declared_names(body) {
            symbols.insert(name);
        }

        search_from = body_start + rel_end + TAG_END.len();
    }

    symbols
}

/// `\n   Name : ...` -> `Name`. Text on the `TAG` line itself is not a declaration.
fn declared_names(body: &str) -> impl Iterator<Item = &str> {
    body.match_indices(':').filter_map(move |(colon, _)| {
        let (start, name) = identifier_before(body, colon)?;
        body[..start]
            .trim_end_matches([' ', '\t', '\r'])
            .ends_with('\n')
            .then_some(name)
    })
}
