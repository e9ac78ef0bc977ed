use std::borrow::Cow;

use encoding_rs::{UTF_8, WINDOWS_1252};
use log::debug;

/// Decodes a raw L5K export.
///
/// Studio 5000 writes exports in Windows-1252 (Latin-1 for every byte used in practice).
/// A UTF-8 BOM switches to UTF-8 so re-saved exports keep their accents.
pub fn decode_export(bytes: &[u8]) -> Cow<'_, str> {
    if let Some(stripped) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        let (cow, had_errors) = UTF_8.decode_without_bom_handling(stripped);
        if had_errors {
            debug!("UTF-8 export contained invalid sequences; replaced");
        }
        return cow;
    }
    let (cow, _, _) = WINDOWS_1252.decode(bytes);
    cow
}
