//! Hand-written left-to-right classifiers for one statement segment.
//!
//! Each matcher is anchored at the start of its input slice and returns
//! the byte length of the match. The classifier priority is fixed; the
//! driver in `lexer` tries them in order at each position.

const KEYWORDS: [&str; 22] = [
    "import", "from", "as", "if", "elif", "else", "for", "while", "break", "continue", "pass",
    "def", "class", "return", "yield", "True", "False", "None", "and", "or", "not", "in",
];

/// Built-in names lex as identifiers but never reach the symbol table.
const BUILTINS: [&str; 14] = [
    "print", "input", "lower", "upper", "len", "range", "str", "int", "float", "bool", "list",
    "dict", "set", "tuple",
];

const TWO_CHAR_OPERATORS: [&str; 9] = ["==", "!=", "<=", ">=", "+=", "-=", "*=", "/=", "%="];
const SINGLE_CHAR_OPERATORS: &str = "+-*/%=<>!&|^~";
const DELIMITERS: &str = "(){}[],.:;";

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

pub fn is_builtin(word: &str) -> bool {
    BUILTINS.contains(&word)
}

pub fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\''
}

pub fn is_delimiter(ch: char) -> bool {
    DELIMITERS.contains(ch)
}

/// ASCII identifier: a letter or underscore, then letters, digits,
/// underscores.
pub fn match_identifier(s: &str) -> Option<usize> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, ch)) if ch.is_ascii_alphabetic() || ch == '_' => {}
        _ => return None,
    }
    for (idx, ch) in chars {
        if !(ch.is_ascii_alphanumeric() || ch == '_') {
            return Some(idx);
        }
    }
    Some(s.len())
}

/// `f"..."` / `F'...'`, non-greedy.
pub fn match_formatted_string(s: &str) -> Option<usize> {
    let mut chars = s.chars();
    if !matches!(chars.next(), Some('f') | Some('F')) {
        return None;
    }
    let quote = match chars.next() {
        Some(q) if is_quote(q) => q,
        _ => return None,
    };
    s[2..].find(quote).map(|close| 2 + close + 1)
}

/// Quoted run starting at a quote character; `None` when the quote never
/// closes on the segment (an unterminated literal).
pub fn match_string(s: &str) -> Option<usize> {
    let quote = s.chars().next()?;
    s[1..].find(quote).map(|close| 1 + close + 1)
}

/// Longest-match operator scan. `//=` wins over `//`, which wins over
/// `/`; the two-character comparison and augmented-assignment forms win
/// over their single-character prefixes.
pub fn match_operator(s: &str) -> Option<usize> {
    if s.starts_with("//=") {
        return Some(3);
    }
    if TWO_CHAR_OPERATORS.iter().any(|op| s.starts_with(op)) {
        return Some(2);
    }
    if s.starts_with("//") {
        return Some(2);
    }
    match s.chars().next() {
        Some(ch) if SINGLE_CHAR_OPERATORS.contains(ch) => Some(1),
        _ => None,
    }
}

/// A complete bracketed run: an opening `[` or `(` through the first
/// matching close bracket on the segment. No nesting awareness; a nested
/// run truncates at the first close.
pub fn match_bracket_run(s: &str) -> Option<usize> {
    let close = match s.chars().next()? {
        '[' => ']',
        '(' => ')',
        _ => return None,
    };
    s[1..].find(close).map(|idx| 1 + idx + 1)
}

/// An identifier, whitespace, another identifier, then `=`: an attribute
/// name broken by a space. Only meaningful on segments without a colon.
pub fn match_spaced_attribute(s: &str) -> Option<usize> {
    let first = match_identifier(s)?;
    let gap = horizontal_space(&s[first..]);
    if gap == 0 {
        return None;
    }
    let second_start = first + gap;
    let second = match_identifier(&s[second_start..])?;
    let eq = second_start + second + horizontal_space(&s[second_start + second..]);
    if s[eq..].starts_with('=') {
        Some(eq + 1)
    } else {
        None
    }
}

/// `ident = <end of segment>`: an assignment with nothing on the right.
pub fn match_missing_rhs(segment: &str) -> Option<&str> {
    let head = segment.trim_start();
    let len = match_identifier(head)?;
    let rest = head[len..].trim_start().strip_prefix('=')?;
    if !rest.starts_with('=') && rest.trim().is_empty() {
        Some(&head[..len])
    } else {
        None
    }
}

/// End-of-segment detection for `def <name>(` and `class <name>`.
pub fn match_definition(segment: &str) -> Option<(&str, &'static str)> {
    let head = segment.trim_start();
    if let Some(rest) = head.strip_prefix("def") {
        if horizontal_space(rest) > 0 {
            let name_start = rest.trim_start();
            let len = match_identifier(name_start)?;
            if name_start[len..].trim_start().starts_with('(') {
                return Some((&name_start[..len], "function"));
            }
        }
        return None;
    }
    if let Some(rest) = head.strip_prefix("class") {
        if horizontal_space(rest) > 0 {
            let name_start = rest.trim_start();
            let len = match_identifier(name_start)?;
            return Some((&name_start[..len], "class"));
        }
    }
    None
}

pub enum NumberMatch {
    Literal(usize),
    Malformed(usize),
}

/// Numeric literal starting at an ASCII digit: hex, integer, or float
/// with optional exponent. Malformed shapes (two decimal points, a
/// dangling exponent) are reported as such; a digit run flowing straight
/// into identifier characters is no number at all and falls through to
/// the invalid-character diagnostic.
pub fn match_number(s: &str) -> Option<NumberMatch> {
    let bytes = s.as_bytes();
    if !bytes.first()?.is_ascii_digit() {
        return None;
    }

    if s.starts_with("0x") || s.starts_with("0X") {
        let digits = bytes[2..].iter().take_while(|b| b.is_ascii_hexdigit()).count();
        if digits == 0 || ident_char_at(bytes, 2 + digits) {
            return None;
        }
        return Some(NumberMatch::Literal(2 + digits));
    }

    let run = bytes
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .count();
    let dots = bytes[..run].iter().filter(|b| **b == b'.').count();
    if dots >= 2 {
        return Some(NumberMatch::Malformed(run));
    }

    let mut end = run;
    if matches!(bytes.get(end), Some(&b'e') | Some(&b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(&b'+') | Some(&b'-')) {
            exp += 1;
        }
        let exp_digits = bytes[exp..].iter().take_while(|b| b.is_ascii_digit()).count();
        if exp_digits == 0 {
            return Some(NumberMatch::Malformed(exp));
        }
        end = exp + exp_digits;
    }

    if ident_char_at(bytes, end) {
        return None;
    }
    Some(NumberMatch::Literal(end))
}

fn ident_char_at(bytes: &[u8], index: usize) -> bool {
    matches!(bytes.get(index), Some(b) if b.is_ascii_alphanumeric() || *b == b'_')
}

fn horizontal_space(s: &str) -> usize {
    s.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}
