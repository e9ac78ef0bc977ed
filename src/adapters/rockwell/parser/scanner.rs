/// Byte cursor over L5K text.
///
/// All L5K delimiters are ASCII, so byte offsets found here are always char boundaries
/// and the text can be sliced with them even when descriptions carry Latin-1 accents.
pub struct TextScanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> TextScanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn at(src: &'a str, pos: usize) -> Self {
        Self {
            src,
            pos: pos.min(src.len()),
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn seek_to(&mut self, pos: usize) {
        self.pos = pos.min(self.src.len());
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    pub(crate) fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Returns how many whitespace bytes were skipped.
    pub(crate) fn skip_whitespace(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos - start
    }

    pub(crate) fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            return true;
        }
        false
    }

    /// `[A-Za-z0-9_]+`
    pub(crate) fn read_identifier(&mut self) -> Option<&'a str> {
        self.read_while(is_ident_byte)
    }

    /// `[A-Za-z0-9_.]+`, the tag-reference shape used by ladder instructions.
    pub(crate) fn read_reference(&mut self) -> Option<&'a str> {
        self.read_while(|b| is_ident_byte(b) || b == b'.')
    }

    fn read_while(&mut self, accept: impl Fn(u8) -> bool) -> Option<&'a str> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if accept(b)) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        Some(&self.src[start..self.pos])
    }

    /// Moves past the next word-bounded `keyword`; returns the offset where it starts.
    pub(crate) fn find_keyword(&mut self, keyword: &str) -> Option<usize> {
        let start = find_keyword(self.src, self.pos, keyword)?;
        self.pos = start + keyword.len();
        Some(start)
    }
}

pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Next occurrence of `keyword` at or after `from` that is not glued to other identifier characters.
pub(crate) fn find_keyword(text: &str, from: usize, keyword: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut cursor = from;
    while cursor <= text.len() {
        let rel = text.get(cursor..)?.find(keyword)?;
        let start = cursor + rel;
        let end = start + keyword.len();
        let open_before = start == 0 || !is_ident_byte(bytes[start - 1]);
        let open_after = end >= bytes.len() || !is_ident_byte(bytes[end]);
        if open_before && open_after {
            return Some(start);
        }
        cursor = start + 1;
    }
    None
}

/// Body between a word-bounded `start_marker` and the first `end_marker` after it.
pub(crate) fn section<'a>(text: &'a str, start_marker: &str, end_marker: &str) -> Option<&'a str> {
    let start = find_keyword(text, 0, start_marker)? + start_marker.len();
    let end = start + text[start..].find(end_marker)?;
    Some(&text[start..end])
}

/// Every `ident : TYPE (` declaration in `body`, in order.
/// `TYPE` is upper-case (`[A-Z0-9_]+`), which keeps `Name := value` attributes out.
pub(crate) fn typed_declarations(body: &str) -> Vec<(String, String)> {
    let mut found = Vec::new();
    let mut search_from = 0;

    while let Some(rel) = body[search_from..].find(':') {
        let colon = search_from + rel;
        search_from = colon + 1;

        let Some((_, name)) = identifier_before(body, colon) else {
            continue;
        };

        let mut scanner = TextScanner::at(body, colon + 1);
        scanner.skip_whitespace();
        let type_start = scanner.position();
        while matches!(scanner.peek(), Some(b) if b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_') {
            scanner.bump();
        }
        if scanner.position() == type_start {
            continue;
        }
        let data_type = &body[type_start..scanner.position()];
        scanner.skip_whitespace();
        if !scanner.eat(b'(') {
            continue;
        }
        found.push((name.to_string(), data_type.to_string()));
        search_from = scanner.position();
    }

    found
}

/// Identifier that ends right before `pos`, allowing whitespace in between, with its start offset.
pub(crate) fn identifier_before(text: &str, pos: usize) -> Option<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut end = pos;
    while end > 0 && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    let mut start = end;
    while start > 0 && is_ident_byte(bytes[start - 1]) {
        start -= 1;
    }
    if start == end {
        return None;
    }
    Some((start, &text[start..end]))
}
