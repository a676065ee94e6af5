//! Operator spacing: `$Price*$Quantity` → `$Price * $Quantity`
//!
//! Works on the token stream, so operators inside string literals and unary
//! signs are left alone. Only inserts whitespace, never removes or reorders,
//! which makes the pass idempotent.

use crate::convert::tokenizer::{Token, TokenKind, Tokenizer};

/// Binary operators that get a space on each side
const SPACED_OPERATORS: &[&str] = &["+", "-", "*", "/", "&", ">", "<", ">=", "<=", "=", "<>"];

/// Format formula text. Text that cannot be tokenized is returned unchanged.
pub fn format_operators(formula: &str) -> String {
    match Tokenizer::new(formula).tokenize() {
        Ok(tokens) => format_tokens(&tokens),
        Err(_) => formula.to_string(),
    }
}

/// Render tokens, inserting single spaces around binary operators that lack them
pub fn format_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev_significant: Option<&Token> = None;

    for (idx, token) in tokens.iter().enumerate() {
        let spaced = token.kind == TokenKind::Operator
            && SPACED_OPERATORS.contains(&token.text.as_str())
            && prev_significant.is_some_and(ends_operand);

        if spaced {
            let has_space_before = idx > 0 && tokens[idx - 1].is_whitespace();
            if !has_space_before {
                out.push(' ');
            }
            out.push_str(&token.text);
            let has_space_after = tokens.get(idx + 1).map_or(true, Token::is_whitespace);
            if !has_space_after {
                out.push(' ');
            }
        } else {
            out.push_str(&token.text);
        }

        if !token.is_whitespace() {
            prev_significant = Some(token);
        }
    }

    out
}

/// Whether an operator following this token is binary
fn ends_operand(token: &Token) -> bool {
    match &token.kind {
        TokenKind::Number
        | TokenKind::String
        | TokenKind::Boolean
        | TokenKind::ErrorLiteral
        | TokenKind::Name
        | TokenKind::CellRef { .. }
        | TokenKind::RangeRef { .. }
        | TokenKind::CloseParen => true,
        // Postfix percent still ends an operand: 50%*A2
        TokenKind::Operator => token.text == "%",
        TokenKind::Other => matches!(token.text.as_str(), "]" | "}"),
        TokenKind::Whitespace | TokenKind::Function | TokenKind::OpenParen | TokenKind::Comma => {
            false
        }
    }
}
