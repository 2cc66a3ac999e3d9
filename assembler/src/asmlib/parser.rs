//! Line-oriented parser.
//!
//! A program is a sequence of lines, each of which holds at most one
//! statement or directive.  Macro bodies are parsed by a recursive
//! call which consumes lines from the same iterator until it sees the
//! matching `.end`.
use tracing::{event, Level};

use super::ast::{Program, ScopeId, Statement, StatementKind, Value};
use super::lexer::tokenize;
use super::symbol::SymbolName;
use super::types::LineNumber;


const INSTRUCTION: &str = "rssb";
const ORIGIN: &str = ".origin";
const OPTION: &str = ".option";
const MACRO: &str = ".macro";
const END: &str = ".end";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub(crate) line: LineNumber,
    pub(crate) msg: String,
}

impl SyntaxError {
    fn new(line: LineNumber, msg: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line,
            msg: msg.into(),
        }
    }
}

/// How parsing of a scope came to an end.
enum Terminator {
    EndOfInput,
    End(LineNumber),
}

/// Parse `lines` into the main program of `prog`.  Calling this more
/// than once appends to the program, which is how several files are
/// combined.
pub(crate) fn parse_source<'a, I>(prog: &mut Program, lines: I) -> Result<(), SyntaxError>
where
    I: IntoIterator<Item = &'a str>,
{
    let first: LineNumber = 1;
    let mut numbered = (first..).zip(lines);
    let root = prog.root();
    match parse_scope(prog, root, &mut numbered)? {
        Terminator::EndOfInput => Ok(()),
        Terminator::End(line) => Err(SyntaxError::new(line, "`.end' outside a macro definition")),
    }
}

fn parse_scope<'a>(
    prog: &mut Program,
    scope: ScopeId,
    lines: &mut dyn Iterator<Item = (LineNumber, &'a str)>,
) -> Result<Terminator, SyntaxError> {
    while let Some((line, text)) = lines.next() {
        let words = tokenize(text).map_err(|e| {
            SyntaxError::new(
                line,
                format!("unterminated double quote at column {}", e.column + 1),
            )
        })?;
        let Some((head, rest)) = words.split_first() else {
            continue;
        };
        let kind: StatementKind = match head.as_str() {
            INSTRUCTION => {
                if rest.len() != 1 {
                    return Err(SyntaxError::new(line, "invalid RSSB syntax"));
                }
                StatementKind::Instruction(single_value(line, rest)?)
            }
            ORIGIN => {
                if rest.len() != 1 {
                    return Err(SyntaxError::new(line, "invalid origin directive"));
                }
                StatementKind::Origin(single_value(line, rest)?)
            }
            OPTION => {
                if rest.len() != 1 {
                    return Err(SyntaxError::new(line, "invalid option directive"));
                }
                prog.add_option(rest[0].clone());
                continue;
            }
            MACRO => {
                parse_macro_definition(prog, scope, line, rest, lines)?;
                continue;
            }
            END => {
                if !rest.is_empty() {
                    return Err(SyntaxError::new(line, "invalid macro end syntax"));
                }
                return Ok(Terminator::End(line));
            }
            label if rest.is_empty() && label.ends_with(':') => {
                let name = &label[..label.len() - 1];
                if name.is_empty() {
                    return Err(SyntaxError::new(line, "label name cannot be empty"));
                }
                StatementKind::Label(SymbolName::from(name))
            }
            name => {
                if name.is_empty() {
                    return Err(SyntaxError::new(line, "macro name cannot be empty"));
                }
                StatementKind::MacroInvocation {
                    name: SymbolName::from(name),
                    args: values(line, rest)?,
                }
            }
        };
        prog.scope_mut(scope).statements.push(Statement { kind, line });
    }
    Ok(Terminator::EndOfInput)
}

fn parse_macro_definition<'a>(
    prog: &mut Program,
    scope: ScopeId,
    line: LineNumber,
    header: &[String],
    lines: &mut dyn Iterator<Item = (LineNumber, &'a str)>,
) -> Result<(), SyntaxError> {
    let Some((name, formal_args)) = header.split_first() else {
        return Err(SyntaxError::new(line, "invalid macro definition syntax"));
    };
    if let Some(pos) = std::iter::once(name)
        .chain(formal_args)
        .position(String::is_empty)
    {
        return Err(SyntaxError::new(
            line,
            if pos == 0 {
                "macro name cannot be empty".to_string()
            } else {
                format!("formal argument #{pos} cannot be empty")
            },
        ));
    }
    let formal_args: Vec<SymbolName> = formal_args
        .iter()
        .map(|arg| SymbolName::from(arg.as_str()))
        .collect();
    event!(
        Level::TRACE,
        "line {line}: defining macro {name} with {} formal arguments",
        formal_args.len()
    );
    let id = prog.define_macro(scope, SymbolName::from(name.as_str()), formal_args);
    let body = prog.macro_def(id).body;
    match parse_scope(prog, body, lines)? {
        Terminator::End(_) => Ok(()),
        Terminator::EndOfInput => Err(SyntaxError::new(
            line,
            format!("definition of macro `{name}' has no matching `.end'"),
        )),
    }
}

fn values(line: LineNumber, args: &[String]) -> Result<Vec<Value>, SyntaxError> {
    args.iter()
        .zip(1..)
        .map(|(arg, n): (&String, usize)| {
            if arg.is_empty() {
                Err(SyntaxError::new(
                    line,
                    format!("symbolic argument #{n} cannot be empty"),
                ))
            } else {
                Ok(Value::from_token(arg))
            }
        })
        .collect()
}

fn single_value(line: LineNumber, args: &[String]) -> Result<Value, SyntaxError> {
    let mut v = values(line, args)?;
    match v.pop() {
        Some(value) if v.is_empty() => Ok(value),
        _ => Err(SyntaxError::new(line, "expected exactly one operand")),
    }
}
