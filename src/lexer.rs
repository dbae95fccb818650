//! Tokenizer: turns the line stream into a flat token stream, maintains
//! the indentation structure, tracks lexical scope, and opportunistically
//! infers types for assignment targets.
//!
//! Indentation is a hard 4-space step: INDENT/DEDENT are emitted relative
//! to that step and any other width is an error. The symbol table is
//! populated as a side effect; the tokenizer is its sole writer.

pub mod error;
mod infer;
mod scan;

pub use error::{LexError, LexResult};

use crate::lines::{self, SourceLine};
use crate::symbols::SymbolTable;
use crate::token::{Token, TokenKind};

const ASSIGN_OPERATORS: [&str; 7] = ["=", "+=", "-=", "*=", "/=", "%=", "//="];

/// Tokenizer output: the token stream plus the symbol table it built.
#[derive(Debug)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    pub symbols: SymbolTable,
}

pub fn tokenize(source: &str) -> LexResult<Tokenized> {
    let lines = lines::load_lines(source);
    let mut lexer = Lexer::new();
    lexer.run(&lines)?;
    let (tokens, symbols) = lexer.into_parts();
    Ok(Tokenized { tokens, symbols })
}

pub struct Lexer {
    tokens: Vec<Token>,
    symbols: SymbolTable,
    scope_stack: Vec<String>,
    previous_indent: usize,
    expecting_indented_block: bool,
    in_block_comment: bool,
    block_comment_delim: Option<&'static str>,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            symbols: SymbolTable::new(),
            scope_stack: Vec::new(),
            previous_indent: 0,
            expecting_indented_block: false,
            in_block_comment: false,
            block_comment_delim: None,
        }
    }

    pub fn run(&mut self, lines: &[SourceLine]) -> LexResult<()> {
        for line in lines {
            self.consume_line(line)?;
        }
        self.flush_dedents();
        Ok(())
    }

    /// Tokens emitted so far. On failure this still holds the pre-abort
    /// ERROR token recording what triggered the failure.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn into_parts(self) -> (Vec<Token>, SymbolTable) {
        (self.tokens, self.symbols)
    }

    fn current_scope(&self) -> &str {
        self.scope_stack.last().map(String::as_str).unwrap_or("global")
    }

    fn push_token(&mut self, kind: TokenKind, lexeme: impl Into<String>, line: usize) {
        self.tokens.push(Token::new(kind, lexeme, line));
    }

    fn consume_line(&mut self, line: &SourceLine) -> LexResult<()> {
        let text = line.text.as_str();
        if text.trim().is_empty() {
            return Ok(());
        }

        if self.in_block_comment {
            if let Some(delim) = self.block_comment_delim {
                if text.contains(delim) {
                    self.in_block_comment = false;
                    self.block_comment_delim = None;
                }
            }
            return Ok(());
        }
        if let Some(delim) = block_comment_opener(text) {
            // opens and closes on the same line: skipped without tokens
            if !closes_on_same_line(text, delim) {
                self.in_block_comment = true;
                self.block_comment_delim = Some(delim);
            }
            return Ok(());
        }

        if line.indent % 4 != 0
            || (self.current_scope() == "global"
                && line.indent > 0
                && !self.expecting_indented_block)
        {
            self.push_token(TokenKind::Error, "IndentationError", line.number);
            return Err(LexError::Indentation { line: line.number });
        }

        if line.indent > self.previous_indent {
            self.push_token(TokenKind::Indent, line.indent.to_string(), line.number);
            if self.expecting_indented_block {
                let scope = self.current_scope().to_string();
                self.scope_stack.push(scope);
                self.expecting_indented_block = false;
            }
        } else if line.indent < self.previous_indent {
            let steps = (self.previous_indent - line.indent) / 4;
            for step in 1..=steps {
                let width = self.previous_indent - 4 * step;
                self.push_token(TokenKind::Dedent, width.to_string(), line.number);
                self.scope_stack.pop();
            }
        }
        self.previous_indent = line.indent;

        for segment in split_segments(text) {
            if segment.trim().is_empty() {
                continue;
            }
            self.consume_segment(segment, line.number)?;
        }
        self.push_token(TokenKind::Newline, "\n", line.number);
        Ok(())
    }

    fn consume_segment(&mut self, segment: &str, line: usize) -> LexResult<()> {
        if let Some(name) = scan::match_missing_rhs(segment) {
            let name = name.to_string();
            self.push_token(TokenKind::Error, name.as_str(), line);
            return Err(LexError::MissingRhs { name, line });
        }

        let segment_start = self.tokens.len();
        let has_colon = segment.contains(':');
        let mut pos = 0;

        while pos < segment.len() {
            let rest = &segment[pos..];
            let ch = match rest.chars().next() {
                Some(ch) => ch,
                None => break,
            };
            if ch == ' ' || ch == '\t' {
                pos += ch.len_utf8();
                continue;
            }

            if let Some(len) = scan::match_formatted_string(rest) {
                self.push_token(TokenKind::Literal, &rest[..len], line);
                pos += len;
                continue;
            }
            if scan::is_quote(ch) {
                match scan::match_string(rest) {
                    Some(len) => {
                        self.push_token(TokenKind::Literal, &rest[..len], line);
                        pos += len;
                        continue;
                    }
                    None => {
                        self.push_token(TokenKind::Error, rest, line);
                        return Err(LexError::UnterminatedString { line });
                    }
                }
            }
            if !has_colon {
                if let Some(len) = scan::match_spaced_attribute(rest) {
                    self.push_token(TokenKind::Error, &rest[..len], line);
                    return Err(LexError::InvalidAttribute { line });
                }
            }
            if let Some(len) = scan::match_operator(rest) {
                self.push_token(TokenKind::Operator, &rest[..len], line);
                pos += len;
                continue;
            }
            if scan::is_delimiter(ch) {
                // a complete bracketed run right of an assignment operator
                // lexes as one literal; everywhere else brackets are
                // delimiters and the parser's atom grammar takes over
                if (ch == '(' || ch == '[') && self.last_token_is_assign(segment_start) {
                    if let Some(len) = scan::match_bracket_run(rest) {
                        self.push_token(TokenKind::Literal, &rest[..len], line);
                        pos += len;
                        continue;
                    }
                }
                self.push_token(TokenKind::Delimiter, ch, line);
                pos += ch.len_utf8();
                continue;
            }
            if let Some(len) = scan::match_identifier(rest) {
                let word = &rest[..len];
                if scan::is_keyword(word) {
                    let at_statement_head = self.tokens.len() == segment_start;
                    self.consume_keyword(word, &rest[len..], at_statement_head, line)?;
                } else {
                    self.push_token(TokenKind::Identifier, word, line);
                    if !scan::is_builtin(word) {
                        self.record_assignment(word, &rest[len..]);
                    }
                }
                pos += len;
                continue;
            }
            if ch.is_ascii_digit() {
                match scan::match_number(rest) {
                    Some(scan::NumberMatch::Literal(len)) => {
                        self.push_token(TokenKind::Literal, &rest[..len], line);
                        pos += len;
                        continue;
                    }
                    Some(scan::NumberMatch::Malformed(len)) => {
                        let lexeme = rest[..len].to_string();
                        self.push_token(TokenKind::Error, lexeme.as_str(), line);
                        return Err(LexError::MalformedNumber { lexeme, line });
                    }
                    None => {}
                }
            }

            self.push_token(TokenKind::Error, ch, line);
            return Err(LexError::InvalidCharacter { character: ch, line });
        }

        if let Some((name, ty)) = scan::match_definition(segment) {
            self.symbols.declare_callable(name, ty);
            self.scope_stack.push(name.to_string());
            self.expecting_indented_block = true;
        }
        Ok(())
    }

    fn consume_keyword(
        &mut self,
        word: &str,
        rest: &str,
        at_statement_head: bool,
        line: usize,
    ) -> LexResult<()> {
        if matches!(word, "if" | "elif" | "while" | "for") {
            if at_statement_head {
                let after = rest.trim_start();
                if after.is_empty() || after.starts_with(':') {
                    self.push_token(TokenKind::Error, word, line);
                    return Err(LexError::MissingCondition {
                        keyword: word.to_string(),
                        line,
                    });
                }
                if !rest.contains(':') {
                    self.push_token(TokenKind::Error, word, line);
                    return Err(LexError::MissingColon {
                        keyword: word.to_string(),
                        line,
                    });
                }
            }
            self.scope_stack.push(format!("{word} line number {line}"));
        } else if word == "else" {
            self.scope_stack.push(format!("{word} line number {line}"));
        }
        self.push_token(TokenKind::Keyword, word, line);
        Ok(())
    }

    /// Records an assignment target when the identifier is followed on
    /// the segment by a single `=` not adjacent to another `=`. The rest
    /// of the segment after that `=` is the inference input.
    fn record_assignment(&mut self, name: &str, after: &str) {
        let Some(eq) = after.find('=') else {
            return;
        };
        let bytes = after.as_bytes();
        if eq > 0 && bytes[eq - 1] == b'=' {
            return;
        }
        if bytes.get(eq + 1) == Some(&b'=') {
            return;
        }
        let ty = infer::infer_assignment_type(&after[eq + 1..], &self.symbols, self.current_scope());
        let scope = self.current_scope().to_string();
        self.symbols.upsert(name, &ty, &scope);
    }

    fn last_token_is_assign(&self, segment_start: usize) -> bool {
        if self.tokens.len() <= segment_start {
            return false;
        }
        match self.tokens.last() {
            Some(token) => {
                token.kind == TokenKind::Operator
                    && ASSIGN_OPERATORS.contains(&token.lexeme.as_str())
            }
            None => false,
        }
    }

    fn flush_dedents(&mut self) {
        let line = self.tokens.last().map(|token| token.line).unwrap_or(1);
        let steps = self.previous_indent / 4;
        for step in 1..=steps {
            let width = self.previous_indent - 4 * step;
            self.push_token(TokenKind::Dedent, width.to_string(), line);
            self.scope_stack.pop();
        }
        self.previous_indent = 0;
    }
}

fn block_comment_opener(text: &str) -> Option<&'static str> {
    if text.contains("\"\"\"") {
        Some("\"\"\"")
    } else if text.contains("'''") {
        Some("'''")
    } else {
        None
    }
}

fn closes_on_same_line(text: &str, delim: &str) -> bool {
    let quote = if delim == "\"\"\"" { '"' } else { '\'' };
    text.matches(quote).count() >= 6
}

/// Splits a line on unquoted semicolons.
fn split_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    for (idx, ch) in text.char_indices() {
        match quote {
            Some(open) => {
                if ch == open {
                    quote = None;
                }
            }
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                ';' => {
                    segments.push(&text[start..idx]);
                    start = idx + 1;
                }
                _ => {}
            },
        }
    }
    segments.push(&text[start..]);
    segments
}
