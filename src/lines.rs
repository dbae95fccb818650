/// A physical source line after comment stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub text: String,
    /// 1-based line number.
    pub number: usize,
    /// Leading whitespace width: 1 per space, 4 per tab.
    pub indent: usize,
}

/// Loads physical lines, strips `#` line comments, and records an
/// indentation width for each line.
///
/// The stripper is not quote-aware: the first hash wins, so a hash
/// inside a string literal truncates the line.
pub fn load_lines(source: &str) -> Vec<SourceLine> {
    source
        .lines()
        .enumerate()
        .map(|(index, raw)| {
            let text = match raw.find('#') {
                Some(hash) => &raw[..hash],
                None => raw,
            };
            SourceLine {
                text: text.to_string(),
                number: index + 1,
                indent: indent_width(text),
            }
        })
        .collect()
}

fn indent_width(text: &str) -> usize {
    let mut width = 0;
    for ch in text.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}
