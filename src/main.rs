use std::fs;
use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use pyfront::{dot, lexer, parser};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut dot_path: Option<String> = None;
    let mut show_tokens = true;
    let mut show_symbols = true;
    let mut show_tree = true;
    let mut input_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dot" | "-d" => {
                dot_path = Some(
                    args.next()
                        .ok_or_else(|| anyhow::anyhow!("Missing output path after {arg}"))?,
                );
            }
            "--no-tokens" => show_tokens = false,
            "--no-symbols" => show_symbols = false,
            "--no-tree" => show_tree = false,
            _ => {
                if arg.starts_with('-') {
                    bail!("Unknown option '{arg}'");
                }
                input_path = Some(arg);
                if args.next().is_some() {
                    bail!("Only one input file is supported");
                }
                break;
            }
        }
    }

    let source = if let Some(path) = input_path {
        fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    let analysis = lexer::tokenize(&source)?;

    if show_tokens {
        println!("{:<8}{:<15}{:<20}", "Line", "Kind", "Lexeme");
        println!("{}", "-".repeat(43));
        for token in &analysis.tokens {
            println!(
                "{:<8}{:<15}{:<20}",
                token.line,
                token.kind.name(),
                printable(&token.lexeme)
            );
        }
        println!();
    }

    if show_symbols {
        println!("--- Symbol Table ---");
        println!("{:<6}{:<20}{:<15}{:<15}", "ID", "Name", "Type", "Scope");
        println!("{}", "-".repeat(56));
        for record in analysis.symbols.records() {
            println!(
                "{:<6}{:<20}{:<15}{:<15}",
                record.id, record.name, record.ty, record.scope
            );
        }
        println!();
    }

    let tree = parser::parse_tokens(analysis.tokens)?;

    if show_tree {
        print!("{}", tree.dump());
    }

    if let Some(path) = dot_path {
        fs::write(&path, dot::to_dot(&tree)).with_context(|| format!("Writing {path}"))?;
        println!("Parse tree saved to {path}");
    }

    Ok(())
}

fn printable(lexeme: &str) -> String {
    lexeme.replace('\n', "\\n")
}
