//! Parsing trace files.
//!
//! This module is used to convert the text of a trace file into a
//! sequence of [`Directive`]s that the simulator can interpret.
//!
//! The main function of this module is [`parse_trace`], which parses the
//! entire source of one trace file. Each line holds one directive with
//! comma-separated fields:
//!
//! ```text
//! <kind>[, <duration-or-blank>[, <argument-or-blank>]]
//! ```
//!
//! `CPU`, `SYSCALL`, `END_IO`, and `FORK` require a numeric duration;
//! `EXEC` requires a program-name argument (its duration field is
//! ignored); the branch markers take no fields. Blank lines are skipped.

pub mod lex;

use crate::trace::{Directive, DirectiveKind};
use lex::{LexErr, Token};
use logos::Logos;

/// Parses a whole trace file into its directive sequence.
///
/// # Example
/// ```
/// use kerntrace::parse::parse_trace;
/// use kerntrace::trace::Directive;
///
/// let trace = parse_trace("CPU, 5,\nSYSCALL, 0,\n").unwrap();
/// assert_eq!(trace, vec![Directive::Cpu(5), Directive::Syscall(0)]);
/// ```
pub fn parse_trace(src: &str) -> Result<Vec<Directive>, TraceErr> {
    let mut directives = Vec::new();
    for (n, line) in src.lines().enumerate() {
        let parsed = parse_line(line).map_err(|kind| TraceErr { line: n + 1, kind })?;
        directives.extend(parsed);
    }
    Ok(directives)
}

/// Parses one trace line, returning `None` for a blank line.
fn parse_line(line: &str) -> Result<Option<Directive>, TraceErrKind> {
    let mut tokens = Vec::new();
    for token in Token::lexer(line) {
        tokens.push(token.map_err(TraceErrKind::Lex)?);
    }
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut tokens = tokens.into_iter().peekable();
    let kind = match tokens.next() {
        Some(Token::Word(word)) => word
            .parse::<DirectiveKind>()
            .map_err(|_| TraceErrKind::UnknownDirective(word))?,
        _ => return Err(TraceErrKind::ExpectedDirective),
    };

    // Split the rest of the line into comma-separated fields, each holding
    // at most one value token.
    let mut fields: Vec<Option<Token>> = Vec::new();
    while let Some(token) = tokens.next() {
        match token {
            Token::Comma => match tokens.peek() {
                Some(Token::Comma) | None => fields.push(None),
                Some(_) => fields.push(tokens.next()),
            },
            _ => return Err(TraceErrKind::MissingComma),
        }
    }
    if fields.len() > 2 {
        return Err(TraceErrKind::UnexpectedField(kind));
    }

    let duration = match fields.first() {
        Some(Some(Token::Number(n))) => Some(*n),
        Some(Some(_)) => return Err(TraceErrKind::NonNumericDuration(kind)),
        Some(None) | None => None,
    };

    let directive = match kind {
        DirectiveKind::Cpu | DirectiveKind::Syscall | DirectiveKind::EndIo | DirectiveKind::Fork => {
            let d = duration.ok_or(TraceErrKind::MissingDuration(kind))?;
            match kind {
                DirectiveKind::Cpu     => Directive::Cpu(d),
                DirectiveKind::Syscall => Directive::Syscall(d),
                DirectiveKind::EndIo   => Directive::EndIo(d),
                DirectiveKind::Fork    => Directive::Fork(d),
                _ => unreachable!("checked above"),
            }
        }
        DirectiveKind::Exec => match fields.get(1) {
            Some(Some(Token::Word(name))) => Directive::Exec(name.clone()),
            _ => return Err(TraceErrKind::MissingArgument),
        },
        DirectiveKind::IfChild | DirectiveKind::IfParent | DirectiveKind::EndIf => {
            // Trailing blank commas are tolerated, fields with content are not.
            if fields.iter().any(Option::is_some) {
                return Err(TraceErrKind::UnexpectedField(kind));
            }
            match kind {
                DirectiveKind::IfChild  => Directive::IfChild,
                DirectiveKind::IfParent => Directive::IfParent,
                DirectiveKind::EndIf    => Directive::EndIf,
                _ => unreachable!("checked above"),
            }
        }
    };
    Ok(Some(directive))
}

/// Kinds of errors that can occur from parsing a trace line.
///
/// See [`TraceErr`] for this error type with line information included.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TraceErrKind {
    /// A field failed to tokenize.
    Lex(LexErr),
    /// The line does not start with a directive keyword.
    ExpectedDirective,
    /// The first field is not one of the known directive keywords.
    UnknownDirective(String),
    /// The directive requires a duration and none was given.
    MissingDuration(DirectiveKind),
    /// The duration field is present but not an integer.
    NonNumericDuration(DirectiveKind),
    /// `EXEC` requires a program name and none was given.
    MissingArgument,
    /// Two field values appeared without a comma between them.
    MissingComma,
    /// The directive has more fields than it accepts.
    UnexpectedField(DirectiveKind),
}
impl std::fmt::Display for TraceErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceErrKind::Lex(e)                => e.fmt(f),
            TraceErrKind::ExpectedDirective     => f.write_str("expected a directive keyword"),
            TraceErrKind::UnknownDirective(s)   => write!(f, "unknown directive {s:?}"),
            TraceErrKind::MissingDuration(k)    => write!(f, "{k} requires a numeric duration"),
            TraceErrKind::NonNumericDuration(k) => write!(f, "duration of {k} is not an integer"),
            TraceErrKind::MissingArgument       => f.write_str("EXEC requires a program name"),
            TraceErrKind::MissingComma          => f.write_str("expected a comma between fields"),
            TraceErrKind::UnexpectedField(k)    => write!(f, "too many fields for {k}"),
        }
    }
}
impl std::error::Error for TraceErrKind {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TraceErrKind::Lex(e) => Some(e),
            _ => None,
        }
    }
}
impl crate::err::Error for TraceErrKind {
    fn help(&self) -> Option<std::borrow::Cow<'_, str>> {
        match self {
            TraceErrKind::Lex(e) => e.help(),
            TraceErrKind::ExpectedDirective   => Some("each line starts with CPU, SYSCALL, END_IO, FORK, EXEC, IF_CHILD, IF_PARENT, or ENDIF".into()),
            TraceErrKind::UnknownDirective(_) => Some("directive keywords are case-sensitive".into()),
            TraceErrKind::MissingDuration(_)  => Some("write the duration after the keyword, e.g. `CPU, 50,`".into()),
            TraceErrKind::MissingArgument     => Some("write the program name in the third field, e.g. `EXEC, 0, program1`".into()),
            _ => None,
        }
    }
}

/// An error from parsing a trace file, with the offending line number.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TraceErr {
    /// 1-based line number of the line that failed to parse.
    pub line: usize,
    /// What went wrong on that line.
    pub kind: TraceErrKind,
}
impl std::fmt::Display for TraceErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}
impl std::error::Error for TraceErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
impl crate::err::Error for TraceErr {
    fn help(&self) -> Option<std::borrow::Cow<'_, str>> {
        crate::err::Error::help(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_trace, TraceErrKind};
    use crate::parse::lex::LexErr;
    use crate::trace::{Directive, DirectiveKind};

    fn kind_of_err(src: &str) -> TraceErrKind {
        parse_trace(src).unwrap_err().kind
    }

    #[test]
    fn test_basic_trace() {
        let trace = parse_trace("CPU, 5,\nSYSCALL, 0,\nCPU, 3,\n").unwrap();
        assert_eq!(trace, vec![
            Directive::Cpu(5),
            Directive::Syscall(0),
            Directive::Cpu(3),
        ]);
    }

    #[test]
    fn test_fork_exec_trace() {
        let trace = parse_trace(concat!(
            "FORK, 2,\n",
            "IF_CHILD\n",
            "EXEC, 0, progA\n",
            "IF_PARENT\n",
            "CPU, 4,\n",
            "ENDIF\n",
        )).unwrap();
        assert_eq!(trace, vec![
            Directive::Fork(2),
            Directive::IfChild,
            Directive::Exec("progA".to_string()),
            Directive::IfParent,
            Directive::Cpu(4),
            Directive::EndIf,
        ]);
    }

    #[test]
    fn test_blank_lines_and_whitespace() {
        let trace = parse_trace("\n  CPU , 7 ,  \n\nEND_IO,1,\n\n").unwrap();
        assert_eq!(trace, vec![Directive::Cpu(7), Directive::EndIo(1)]);
    }

    #[test]
    fn test_exec_blank_duration() {
        let trace = parse_trace("EXEC, , program2\n").unwrap();
        assert_eq!(trace, vec![Directive::Exec("program2".to_string())]);
    }

    #[test]
    fn test_marker_trailing_comma() {
        let trace = parse_trace("IF_CHILD,\nENDIF\n").unwrap();
        assert_eq!(trace, vec![Directive::IfChild, Directive::EndIf]);
    }

    #[test]
    fn test_unknown_directive() {
        assert_eq!(kind_of_err("JUMP, 5,"), TraceErrKind::UnknownDirective("JUMP".to_string()));
        // keywords are case-sensitive
        assert_eq!(kind_of_err("cpu, 5,"), TraceErrKind::UnknownDirective("cpu".to_string()));
    }

    #[test]
    fn test_missing_duration() {
        assert_eq!(kind_of_err("CPU"), TraceErrKind::MissingDuration(DirectiveKind::Cpu));
        assert_eq!(kind_of_err("FORK, ,"), TraceErrKind::MissingDuration(DirectiveKind::Fork));
    }

    #[test]
    fn test_non_numeric_duration() {
        assert_eq!(kind_of_err("CPU, five,"), TraceErrKind::NonNumericDuration(DirectiveKind::Cpu));
        assert_eq!(kind_of_err("CPU, 5x,"), TraceErrKind::Lex(LexErr::InvalidNumeric));
    }

    #[test]
    fn test_exec_missing_argument() {
        assert_eq!(kind_of_err("EXEC, 0,"), TraceErrKind::MissingArgument);
        assert_eq!(kind_of_err("EXEC"), TraceErrKind::MissingArgument);
    }

    #[test]
    fn test_marker_with_field() {
        assert_eq!(kind_of_err("ENDIF, 3,"), TraceErrKind::UnexpectedField(DirectiveKind::EndIf));
    }

    #[test]
    fn test_error_line_numbers() {
        let err = parse_trace("CPU, 5,\n\nWAIT, 1,\n").unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_missing_comma() {
        assert_eq!(kind_of_err("CPU 5"), TraceErrKind::MissingComma);
    }
}
