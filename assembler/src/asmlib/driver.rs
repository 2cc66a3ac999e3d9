//! Loading source files and compiling them into an
//! [`AssemblyTarget`].
//!
//! Compilation is a tree walk over the program's scopes.  Each macro
//! invocation compiles the macro's body in place, and both the main
//! program and every expansion are repeated until the number of
//! references to not-yet-assembled labels reaches zero or stops
//! changing.
use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader};

use tracing::{event, Level};

use base::prelude::*;

use super::ast::{MacroId, Program, ScopeId, Statement, StatementKind, Value};
use super::eval::{evaluate, Unresolved};
use super::parser::parse_source;
use super::state::CompileState;
use super::symbol::SymbolName;
use super::types::{AssemblerFailure, CompileFailure, LineNumber, Location};


/// Used when no other pass limit is configured.
pub const DEFAULT_MAX_PASSES: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// The largest number of passes any one fixed-point loop may
    /// make.  Values below 1 are treated as 1.
    pub max_passes: usize,
}

impl Default for AssemblerOptions {
    fn default() -> AssemblerOptions {
        AssemblerOptions {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Parse `source` (which came from `filename`) and append its
/// statements to `prog`.
///
/// # Errors
///
/// Fails with [`AssemblerFailure::SyntaxError`] on the first
/// malformed line.
pub fn load_source(
    prog: &mut Program,
    filename: &OsStr,
    source: &str,
) -> Result<(), AssemblerFailure> {
    parse_source(prog, source.lines()).map_err(|e| AssemblerFailure::SyntaxError {
        filename: filename.to_owned(),
        line: e.line,
        msg: e.msg,
    })
}

/// Read `input_file` and append its statements to `prog`.
///
/// # Errors
///
/// Fails if the file cannot be read, or on the first malformed line.
pub fn load_file(prog: &mut Program, input_file: &OsStr) -> Result<(), AssemblerFailure> {
    let input = OpenOptions::new()
        .read(true)
        .open(input_file)
        .map_err(|e| AssemblerFailure::IoErrorOnInput {
            filename: input_file.to_owned(),
            error: e,
            line_number: None,
        })?;
    let mut source_lines: Vec<String> = Vec::new();
    for (line, input_item) in (1..).zip(BufReader::new(input).lines()) {
        match input_item {
            Err(e) => {
                return Err(AssemblerFailure::IoErrorOnInput {
                    filename: input_file.to_owned(),
                    error: e,
                    line_number: Some(line),
                });
            }
            Ok(source_line) => {
                source_lines.push(source_line);
            }
        }
    }
    event!(
        Level::DEBUG,
        "read {} lines from {}",
        source_lines.len(),
        input_file.to_string_lossy()
    );
    parse_source(prog, source_lines.iter().map(String::as_str)).map_err(|e| {
        AssemblerFailure::SyntaxError {
            filename: input_file.to_owned(),
            line: e.line,
            msg: e.msg,
        }
    })
}

/// Load each of `files` in turn into a single program.
///
/// # Errors
///
/// Stops at the first file which cannot be read or parsed.
pub fn load_files<I, S>(files: I) -> Result<Program, AssemblerFailure>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut prog = Program::new();
    for f in files {
        load_file(&mut prog, f.as_ref())?;
    }
    Ok(prog)
}

/// Compile `prog` into `target`, starting at the target's current
/// cursor.  The target's arithmetic mode is set from the program's
/// options.
///
/// # Errors
///
/// Any [`CompileFailure`].  Nothing useful can be assumed about the
/// contents of `target` after a failure.
pub fn compile<T: AssemblyTarget + ?Sized>(
    prog: &Program,
    target: &mut T,
    options: &AssemblerOptions,
) -> Result<(), CompileFailure> {
    for opt in prog.options() {
        if opt == ArithmeticMode::DUMB_OPTION {
            event!(Level::INFO, "option {opt} selects {} arithmetic", ArithmeticMode::Dumb);
        } else {
            event!(Level::WARN, "ignoring unrecognised option {opt}");
        }
    }
    target.set_arithmetic_mode(prog.arithmetic_mode());

    let start = target.cursor();
    let mut compiler = Compiler {
        prog,
        state: CompileState::new(prog),
        target,
        max_passes: options.max_passes.max(1),
        expanding: Vec::new(),
    };
    let root = prog.root();
    match compiler.iterate_to_fixed_point(root, start)? {
        0 => {
            event!(
                Level::DEBUG,
                "compiled {} statements of the main program, cursor is now {:#x}",
                prog.statement_count(),
                compiler.target.cursor()
            );
            Ok(())
        }
        count => Err(CompileFailure::UnresolvedForwardReferences { count }),
    }
}

/// Load `files`, then compile them into `target`.
///
/// # Errors
///
/// Any load, syntax or compilation failure.
pub fn assemble_files<I, S, T>(
    files: I,
    target: &mut T,
    options: &AssemblerOptions,
) -> Result<Program, AssemblerFailure>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    T: AssemblyTarget + ?Sized,
{
    let prog = load_files(files)?;
    compile(&prog, target, options)?;
    Ok(prog)
}

struct Compiler<'a, T: AssemblyTarget + ?Sized> {
    prog: &'a Program,
    state: CompileState,
    target: &'a mut T,
    max_passes: usize,
    /// The macros whose expansion is in progress, outermost first.
    expanding: Vec<MacroId>,
}

impl<T: AssemblyTarget + ?Sized> Compiler<'_, T> {
    fn location(&self, scope: ScopeId, index: usize, line: LineNumber) -> Location {
        Location {
            context: self.prog.owner_name(scope),
            index,
            line,
        }
    }

    fn evaluate(&mut self, scope: ScopeId, here: Word, value: &Value) -> Result<Word, Unresolved> {
        evaluate(self.prog, &mut self.state, scope, here, value)
    }

    /// Compile `scope` repeatedly from `start` until it stops
    /// producing new forward references.  Returns the number of
    /// forward references seen in the final pass.
    fn iterate_to_fixed_point(&mut self, scope: ScopeId, start: Word) -> Result<usize, CompileFailure> {
        let mut unresolved: usize = 0;
        for pass in 1..=self.max_passes {
            let last_unresolved = unresolved;
            self.target.set_cursor(start);
            self.state.reset_unresolved(scope);
            self.compile_scope(scope)?;
            unresolved = self.state.unresolved(scope);
            if self.prog.owner_name(scope).is_none() {
                event!(
                    Level::DEBUG,
                    "pass {pass} over the main program left {unresolved} forward references"
                );
            }
            if unresolved == 0 || unresolved == last_unresolved {
                return Ok(unresolved);
            }
        }
        Err(CompileFailure::DidNotConverge {
            context: self.prog.owner_name(scope),
            passes: self.max_passes,
        })
    }

    fn compile_scope(&mut self, scope: ScopeId) -> Result<(), CompileFailure> {
        let prog = self.prog;
        for (index, stmt) in prog.scope(scope).statements.iter().enumerate() {
            let here = self.target.cursor();
            self.state.mark_assembled(scope, index, here);
            match &stmt.kind {
                StatementKind::Instruction(operand) => {
                    let word = self.evaluate(scope, here, operand).map_err(|e| {
                        CompileFailure::UnresolvedSymbol {
                            name: e.name,
                            location: self.location(scope, index, stmt.line),
                        }
                    })?;
                    self.target
                        .write_word(word)
                        .map_err(|error| CompileFailure::CapacityExceeded {
                            error,
                            location: self.location(scope, index, stmt.line),
                        })?;
                }
                StatementKind::Origin(Value::Literal(address)) => {
                    self.target.set_cursor(*address);
                }
                StatementKind::Origin(Value::Symbol(_)) => {
                    return Err(CompileFailure::SymbolicOrigin {
                        location: self.location(scope, index, stmt.line),
                    });
                }
                StatementKind::Label(_) => (),
                StatementKind::MacroInvocation { name, args } => {
                    self.expand_macro(scope, index, stmt, name, args)?;
                }
            }
        }
        Ok(())
    }

    fn expand_macro(
        &mut self,
        scope: ScopeId,
        index: usize,
        stmt: &Statement,
        name: &SymbolName,
        args: &[Value],
    ) -> Result<(), CompileFailure> {
        let prog = self.prog;
        let location = self.location(scope, index, stmt.line);
        let Some(id) = prog.find_macro(scope, name) else {
            return Err(CompileFailure::MacroNotDefined {
                name: name.clone(),
                location,
            });
        };
        if self.expanding.contains(&id) {
            return Err(CompileFailure::MacroRecursion {
                name: name.clone(),
                location,
            });
        }
        let definition = prog.macro_def(id);
        if definition.formal_args.len() != args.len() {
            return Err(CompileFailure::WrongArgumentCount {
                name: name.clone(),
                expected: definition.formal_args.len(),
                got: args.len(),
                location,
            });
        }

        let body = definition.body;
        let here = self.state.statement(scope, index).current_value;
        self.state.reset_scope(prog, body);
        self.state.set_caller(body, scope);
        for (slot, arg) in args.iter().enumerate() {
            match self.evaluate(scope, here, arg) {
                Ok(value) => self.state.set_actual_arg(body, slot, value),
                Err(e) => {
                    return Err(CompileFailure::UnresolvedSymbol {
                        name: e.name,
                        location,
                    });
                }
            }
        }

        event!(Level::TRACE, "expanding {name} at {here:#x} from {location}");
        self.expanding.push(id);
        let expansion = self.iterate_to_fixed_point(body, here);
        self.expanding.pop();
        match expansion {
            Ok(_) => Ok(()),
            Err(inner) => Err(CompileFailure::InMacroCall {
                name: name.clone(),
                location,
                inner: Box::new(inner),
            }),
        }
    }
}
