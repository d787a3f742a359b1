//! Tokenizing trace lines.
//!
//! This module holds the tokens that make up one line of a trace file
//! ([`Token`]). The parser consumes these tokens to build [`Directive`]s.
//!
//! [`Directive`]: crate::trace::Directive

use std::num::IntErrorKind;

use logos::{Lexer, Logos};

/// A unit of information in one trace line.
#[derive(Debug, Logos, PartialEq, Eq, Clone)]
#[logos(skip r"[ \t\r]+", error = LexErr)]
pub enum Token {
    // The numeric regex spans over tokens that are technically invalid
    // (e.g., 23abc matches even though it shouldn't).
    // This is intended: the regex collects one discernable unit and
    // the validator function rejects it with a useful error.

    /// An unsigned numeric value (e.g., `5`, `120`).
    #[regex(r"\d\w*", lex_number)]
    Number(u64),

    /// A word: either a directive keyword (e.g., `CPU`, `FORK`) or a
    /// program name (e.g., `program2`, `init`).
    #[regex(r"[A-Za-z_][A-Za-z0-9_.\-]*", |lx| lx.slice().to_string())]
    Word(String),

    /// A comma, which separates the fields of a directive.
    #[token(",")]
    Comma,
}

/// Any errors raised in attempting to tokenize a trace line.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum LexErr {
    /// Numeric field does not fit within the range of a u64.
    DoesNotFitU64,
    /// Numeric field has invalid digits (i.e., not 0-9).
    InvalidNumeric,
    /// Int parsing failed but the reason why is unknown.
    UnknownIntErr,
    /// A symbol was used which does not occur in any trace directive.
    #[default]
    InvalidSymbol,
}
impl std::fmt::Display for LexErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErr::DoesNotFitU64  => f.write_str("numeric field does not fit 64-bit unsigned integer"),
            LexErr::InvalidNumeric => f.write_str("invalid numeric field"),
            LexErr::UnknownIntErr  => f.write_str("could not parse integer"),
            LexErr::InvalidSymbol  => f.write_str("unrecognized symbol"),
        }
    }
}
impl std::error::Error for LexErr {}
impl crate::err::Error for LexErr {
    fn help(&self) -> Option<std::borrow::Cow<'_, str>> {
        match self {
            LexErr::DoesNotFitU64  => Some(format!("the range for a duration is [0, {}]", u64::MAX).into()),
            LexErr::InvalidNumeric => Some("a duration only consists of digits 0-9".into()),
            LexErr::UnknownIntErr  => None,
            LexErr::InvalidSymbol  => Some("trace fields are keywords, program names, or durations, separated by commas".into()),
        }
    }
}

fn lex_number(lx: &Lexer<'_, Token>) -> Result<u64, LexErr> {
    lx.slice().parse::<u64>().map_err(|e| match e.kind() {
        IntErrorKind::InvalidDigit => LexErr::InvalidNumeric,
        IntErrorKind::PosOverflow  => LexErr::DoesNotFitU64,
        _ => LexErr::UnknownIntErr,
    })
}

#[cfg(test)]
mod tests {
    use logos::Logos;

    use super::{LexErr, Token};

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn test_directive_line() {
        let mut tokens = Token::lexer("SYSCALL, 3,");
        assert_eq!(tokens.next(), Some(Ok(word("SYSCALL"))));
        assert_eq!(tokens.next(), Some(Ok(Token::Comma)));
        assert_eq!(tokens.next(), Some(Ok(Token::Number(3))));
        assert_eq!(tokens.next(), Some(Ok(Token::Comma)));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_exec_line() {
        let mut tokens = Token::lexer("EXEC, 0, program-2.v1");
        assert_eq!(tokens.next(), Some(Ok(word("EXEC"))));
        assert_eq!(tokens.next(), Some(Ok(Token::Comma)));
        assert_eq!(tokens.next(), Some(Ok(Token::Number(0))));
        assert_eq!(tokens.next(), Some(Ok(Token::Comma)));
        assert_eq!(tokens.next(), Some(Ok(word("program-2.v1"))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_no_spaces() {
        let mut tokens = Token::lexer("CPU,120,");
        assert_eq!(tokens.next(), Some(Ok(word("CPU"))));
        assert_eq!(tokens.next(), Some(Ok(Token::Comma)));
        assert_eq!(tokens.next(), Some(Ok(Token::Number(120))));
        assert_eq!(tokens.next(), Some(Ok(Token::Comma)));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_numeric_invalid() {
        assert_eq!(Token::lexer("12abc").next(), Some(Err(LexErr::InvalidNumeric)));
        assert_eq!(Token::lexer("99999999999999999999").next(), Some(Err(LexErr::DoesNotFitU64)));
    }

    #[test]
    fn test_invalid_symbol() {
        assert_eq!(Token::lexer("CPU; 5").nth(1), Some(Err(LexErr::InvalidSymbol)));
        assert_eq!(Token::lexer("(4)").next(), Some(Err(LexErr::InvalidSymbol)));
    }
}
