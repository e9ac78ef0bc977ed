/// Splits the text between an instance vector's outer brackets into its top-level elements.
///
/// Nested `[...]` groups stay one element. Inside an element, tokens are joined by a single
/// space while brackets are glued to their neighbours, e.g. `[1, 2]` becomes `[ 1 , 2]`.
/// Empty segments (`a,,b`, trailing commas) are dropped.
pub fn tokenize_vector(raw: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut depth: isize = 0;
    let normalized = raw.replace(['\n', '\r', '\t'], " ");

    for token in lex(&normalized) {
        match token {
            Piece::Open => {
                depth += 1;
                current.push('[');
            }
            Piece::Close => {
                depth -= 1;
                current.push(']');
            }
            Piece::Comma if depth == 0 => {
                if !current.is_empty() {
                    values.push(std::mem::take(&mut current));
                }
            }
            Piece::Comma => append_word(&mut current, ","),
            Piece::Word(word) => append_word(&mut current, word),
        }
    }

    if !current.is_empty() {
        values.push(current);
    }
    values
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Open,
    Close,
    Comma,
    Word(&'a str),
}

fn append_word(current: &mut String, word: &str) {
    if !current.is_empty() {
        current.push(' ');
    }
    current.push_str(word);
}

/// Breaks the raw text on `[`, `]` and `,`; words are trimmed and whitespace-only words vanish.
fn lex(raw: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut word_start = 0;

    for (idx, ch) in raw.char_indices() {
        let piece = match ch {
            '[' => Piece::Open,
            ']' => Piece::Close,
            ',' => Piece::Comma,
            _ => continue,
        };
        push_word(&mut pieces, &raw[word_start..idx]);
        pieces.push(piece);
        word_start = idx + 1;
    }
    push_word(&mut pieces, &raw[word_start..]);
    pieces
}

fn push_word<'a>(pieces: &mut Vec<Piece<'a>>, word: &'a str) {
    let word = word.trim();
    if !word.is_empty() {
        pieces.push(Piece::Word(word));
    }
}
