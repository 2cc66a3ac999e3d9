use std::error::Error;
use std::ffi::{OsStr, OsString};
use std::fmt::{self, Display, Formatter};
use std::io::Error as IoError;

use base::prelude::WriteFailed;

use super::symbol::SymbolName;

/// Source line numbers count from 1.
pub type LineNumber = u32;

/// Identifies a statement for diagnostics: the macro whose body
/// holds it (`None` for the main program), its index within that
/// body, and the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub context: Option<SymbolName>,
    pub index: usize,
    pub line: LineNumber,
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match &self.context {
            Some(name) => write!(f, "{name}")?,
            None => f.write_str("<main program>")?,
        }
        write!(f, "+{} (line {})", self.index, self.line)
    }
}

#[derive(Debug)]
pub enum CompileFailure {
    /// The name could not be found in any enclosing scope.
    UnresolvedSymbol { name: String, location: Location },
    MacroNotDefined { name: SymbolName, location: Location },
    WrongArgumentCount {
        name: SymbolName,
        expected: usize,
        got: usize,
        location: Location,
    },
    SymbolicOrigin { location: Location },
    /// The macro is already being expanded, so the expansion would
    /// never end.
    MacroRecursion { name: SymbolName, location: Location },
    CapacityExceeded {
        error: WriteFailed,
        location: Location,
    },
    /// The main program stopped making progress while some labels
    /// were still unassembled.
    UnresolvedForwardReferences { count: usize },
    /// A fixed-point loop hit the pass limit.  `context` is `None`
    /// for the main program.
    DidNotConverge {
        context: Option<SymbolName>,
        passes: usize,
    },
    /// Something went wrong while expanding the macro called at
    /// `location`.
    InMacroCall {
        name: SymbolName,
        location: Location,
        inner: Box<CompileFailure>,
    },
}

impl CompileFailure {
    /// The failure which started the chain of macro calls.
    #[must_use]
    pub fn innermost(&self) -> &CompileFailure {
        match self {
            CompileFailure::InMacroCall { inner, .. } => inner.innermost(),
            other => other,
        }
    }
}

impl Display for CompileFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            CompileFailure::UnresolvedSymbol { name, location } => {
                write!(f, "failed to resolve symbol `{name}' at {location}")
            }
            CompileFailure::MacroNotDefined { name, location } => {
                write!(f, "macro `{name}' not defined at {location}")
            }
            CompileFailure::WrongArgumentCount {
                name,
                expected,
                got,
                location,
            } => write!(
                f,
                "macro `{name}' expects {expected} args, but {got} were passed at {location}"
            ),
            CompileFailure::SymbolicOrigin { location } => {
                write!(f, "origin address cannot be symbolic at {location}")
            }
            CompileFailure::MacroRecursion { name, location } => {
                write!(f, "macro `{name}' invokes itself at {location}")
            }
            CompileFailure::CapacityExceeded { error, location } => {
                write!(f, "{error} at {location}")
            }
            CompileFailure::UnresolvedForwardReferences { count } => {
                write!(f, "{count} forward references remain unresolved")
            }
            CompileFailure::DidNotConverge { context, passes } => {
                f.write_str("compilation of ")?;
                match context {
                    Some(name) => write!(f, "macro `{name}'")?,
                    None => f.write_str("the main program")?,
                }
                write!(f, " did not converge after {passes} passes")
            }
            CompileFailure::InMacroCall {
                name,
                location,
                inner,
            } => write!(f, "{inner}\nwhile calling `{name}' at {location}"),
        }
    }
}

impl Error for CompileFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CompileFailure::CapacityExceeded { error, .. } => Some(error),
            CompileFailure::InMacroCall { inner, .. } => Some(inner.as_ref()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum AssemblerFailure {
    IoErrorOnInput {
        filename: OsString,
        error: IoError,
        line_number: Option<LineNumber>,
    },
    SyntaxError {
        filename: OsString,
        line: LineNumber,
        msg: String,
    },
    CompileError(CompileFailure),
}

fn write_os_string(f: &mut Formatter<'_>, s: &OsStr) -> Result<(), fmt::Error> {
    match s.to_str() {
        Some(unicode_name) => f.write_str(unicode_name),
        None => write!(
            f,
            "{} (some non-Unicode characters changed to make it printable)",
            s.to_string_lossy(),
        ),
    }
}

impl Display for AssemblerFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            AssemblerFailure::IoErrorOnInput {
                filename,
                error,
                line_number,
            } => {
                f.write_str("I/O error reading input file ")?;
                write_os_string(f, filename)?;
                if let Some(n) = line_number {
                    write!(f, " at line {n}")?;
                }
                write!(f, ": {error}")
            }
            AssemblerFailure::SyntaxError {
                filename,
                line,
                msg,
            } => {
                write_os_string(f, filename)?;
                write!(f, ":{line}: syntax error: {msg}")
            }
            AssemblerFailure::CompileError(e) => write!(f, "error: {e}"),
        }
    }
}

impl Error for AssemblerFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AssemblerFailure::IoErrorOnInput { error, .. } => Some(error),
            AssemblerFailure::CompileError(e) => Some(e),
            AssemblerFailure::SyntaxError { .. } => None,
        }
    }
}

impl From<CompileFailure> for AssemblerFailure {
    fn from(e: CompileFailure) -> AssemblerFailure {
        AssemblerFailure::CompileError(e)
    }
}
