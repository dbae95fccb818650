use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("Indentation error on line {line}")]
    Indentation { line: usize },
    #[error("Unterminated string literal on line {line}")]
    UnterminatedString { line: usize },
    #[error("Malformed number literal '{lexeme}' on line {line}")]
    MalformedNumber { lexeme: String, line: usize },
    #[error("Invalid attribute name with space on line {line}")]
    InvalidAttribute { line: usize },
    #[error("Invalid character '{character}' on line {line}")]
    InvalidCharacter { character: char, line: usize },
    #[error("Missing right-hand side for assignment to '{name}' on line {line}")]
    MissingRhs { name: String, line: usize },
    #[error("Expected condition after '{keyword}' on line {line}")]
    MissingCondition { keyword: String, line: usize },
    #[error("Expected ':' after '{keyword}' on line {line}")]
    MissingColon { keyword: String, line: usize },
}

pub type LexResult<T> = Result<T, LexError>;
