//! `pyfront` library crate.
//!
//! High-level layout:
//! - `lines`: physical-line ingestion (comment stripping + indent widths)
//! - frontend: `lexer` + `parser` produce the concrete parse tree (`tree`)
//! - `symbols`: the identifier table the tokenizer populates
//! - `dot`: parse-tree serialization for offline rendering
pub mod dot;
pub mod fixtures;
pub mod lexer;
pub mod lines;
pub mod parser;
pub mod symbols;
pub mod token;
pub mod tree;
