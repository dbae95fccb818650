//! First-pass type inference for assignment targets.
//!
//! The right-hand side of the segment is pattern-matched in a fixed
//! priority order; when nothing matches, the first whitespace token that
//! resolves to a known type wins.

use super::scan;
use crate::symbols::SymbolTable;

pub fn infer_assignment_type(rhs: &str, symbols: &SymbolTable, scope: &str) -> String {
    let rhs = rhs.trim();

    if is_hex_integer(rhs) || is_signed_integer(rhs) {
        return "int".to_string();
    }
    if is_signed_float(rhs) {
        return "float".to_string();
    }
    if is_quoted(rhs) {
        return "string".to_string();
    }
    if rhs == "True" || rhs == "False" {
        return "bool".to_string();
    }
    if let Some(callee) = call_target(rhs) {
        // input() yields a string; any other call is opaque
        let ty = if callee == "input" { "string" } else { "func return" };
        return ty.to_string();
    }
    if scan::match_identifier(rhs) == Some(rhs.len()) {
        return symbols.lookup(rhs, scope).unwrap_or("unknown").to_string();
    }
    if is_integer_arithmetic(rhs) {
        return "int".to_string();
    }
    if is_list_literal(rhs) {
        return "list".to_string();
    }
    if is_tuple_literal(rhs) {
        return "tuple".to_string();
    }

    for word in rhs.split_whitespace() {
        if scan::match_identifier(word) == Some(word.len()) {
            if let Some(ty) = symbols.lookup(word, scope) {
                if ty != "unknown" {
                    return ty.to_string();
                }
            }
        } else if is_signed_integer(word) {
            return "int".to_string();
        } else if is_signed_float(word) {
            return "float".to_string();
        }
    }
    "unknown".to_string()
}

fn strip_sign(s: &str) -> &str {
    s.strip_prefix(['+', '-']).unwrap_or(s)
}

fn is_signed_integer(s: &str) -> bool {
    let digits = strip_sign(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_hex_integer(s: &str) -> bool {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"));
    matches!(digits, Some(d) if !d.is_empty() && d.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn is_signed_float(s: &str) -> bool {
    let s = strip_sign(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
        None => (s, None),
    };
    let Some(dot) = mantissa.find('.') else {
        return false;
    };
    let (int_part, frac_part) = (&mantissa[..dot], &mantissa[dot + 1..]);
    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return false;
    }
    match exponent {
        Some(exp) => {
            let exp = strip_sign(exp);
            !exp.is_empty() && exp.bytes().all(|b| b.is_ascii_digit())
        }
        None => true,
    }
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"'))
            || (s.starts_with('\'') && s.ends_with('\'')))
}

fn call_target(s: &str) -> Option<&str> {
    let len = scan::match_identifier(s)?;
    if s[len..].trim_start().starts_with('(') && s.ends_with(')') {
        Some(&s[..len])
    } else {
        None
    }
}

fn is_integer_arithmetic(s: &str) -> bool {
    let s = strip_sign(s);
    let first = s.bytes().take_while(|b| b.is_ascii_digit()).count();
    if first == 0 {
        return false;
    }
    let rest = s[first..].trim_start();
    let Some(op) = rest.chars().next() else {
        return false;
    };
    if !matches!(op, '+' | '-' | '*' | '/') {
        return false;
    }
    let operand = rest[1..].trim_start();
    !operand.is_empty() && operand.bytes().all(|b| b.is_ascii_digit())
}

fn is_list_literal(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('[') && s.ends_with(']') && !s[1..s.len() - 1].contains(']')
}

fn is_tuple_literal(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('(') && s.ends_with(')') && !s[1..s.len() - 1].contains(')')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(rhs: &str) -> String {
        infer_assignment_type(rhs, &SymbolTable::new(), "global")
    }

    #[test]
    fn literal_shapes() {
        assert_eq!(infer("5"), "int");
        assert_eq!(infer("-12"), "int");
        assert_eq!(infer("0xFF"), "int");
        assert_eq!(infer("3.5"), "float");
        assert_eq!(infer("1.5e-3"), "float");
        assert_eq!(infer("\"hi\""), "string");
        assert_eq!(infer("'hi'"), "string");
        assert_eq!(infer("True"), "bool");
        assert_eq!(infer("[1, 2]"), "list");
        assert_eq!(infer("(1, 2, 3)"), "tuple");
    }

    #[test]
    fn calls() {
        assert_eq!(infer("input(\"name: \")"), "string");
        assert_eq!(infer("compute(1, 2)"), "func return");
    }

    #[test]
    fn integer_arithmetic() {
        assert_eq!(infer("1 + 2"), "int");
        assert_eq!(infer("4*5"), "int");
    }

    #[test]
    fn bare_identifier_uses_the_table() {
        let mut symbols = SymbolTable::new();
        symbols.upsert("y", "float", "global");
        assert_eq!(infer_assignment_type("y", &symbols, "main"), "float");
        assert_eq!(infer_assignment_type("z", &symbols, "main"), "unknown");
    }

    #[test]
    fn fallback_scans_whitespace_tokens() {
        let mut symbols = SymbolTable::new();
        symbols.upsert("total", "float", "global");
        assert_eq!(
            infer_assignment_type("total - offset", &symbols, "global"),
            "float"
        );
        assert_eq!(infer("mystery stuff"), "unknown");
    }
}
