//! The parsed program: a tree of scopes holding statements and macro
//! definitions.
//!
//! Scopes and macros live in arenas owned by [`Program`] and refer
//! to each other by index.  Nothing here changes once parsing is
//! complete; the state which varies from pass to pass lives in
//! [`crate::state::CompileState`].
use base::prelude::*;

use super::symbol::SymbolName;
use super::types::LineNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct ScopeId(usize);

impl ScopeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct MacroId(usize);

/// An operand: either known at parse time, or a name (possibly with
/// `-` or `$` prefixes) to be resolved during compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Value {
    Literal(Word),
    Symbol(String),
}

impl Value {
    pub(crate) fn from_token(token: &str) -> Value {
        match scan_integer(token).or_else(|| scan_char_literal(token)) {
            Some(w) => Value::Literal(w),
            None => Value::Symbol(token.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StatementKind {
    Instruction(Value),
    Label(SymbolName),
    MacroInvocation { name: SymbolName, args: Vec<Value> },
    Origin(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Statement {
    pub(crate) kind: StatementKind,
    pub(crate) line: LineNumber,
}

#[derive(Debug)]
pub(crate) struct Macro {
    pub(crate) name: SymbolName,
    pub(crate) formal_args: Vec<SymbolName>,
    pub(crate) body: ScopeId,
}

impl Macro {
    /// The slot in the actual-argument array which holds the value
    /// of the formal argument `name`.
    pub(crate) fn argument_slot(&self, name: &str) -> Option<usize> {
        self.formal_args.iter().position(|arg| arg == name)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Scope {
    pub(crate) parent: Option<ScopeId>,
    /// The macro whose body this is; `None` for the main program.
    pub(crate) owner: Option<MacroId>,
    pub(crate) statements: Vec<Statement>,
    /// Macros defined directly in this scope, in definition order.
    pub(crate) macros: Vec<MacroId>,
}

/// A complete program, possibly loaded from several files.
#[derive(Debug)]
pub struct Program {
    scopes: Vec<Scope>,
    macros: Vec<Macro>,
    options: Vec<String>,
}

impl Default for Program {
    fn default() -> Program {
        Program::new()
    }
}

impl Program {
    #[must_use]
    pub fn new() -> Program {
        Program {
            scopes: vec![Scope::default()],
            macros: Vec::new(),
            options: Vec::new(),
        }
    }

    pub(crate) fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub(crate) fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }

    pub(crate) fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub(crate) fn scope_id(&self, index: usize) -> ScopeId {
        debug_assert!(index < self.scopes.len());
        ScopeId(index)
    }

    pub(crate) fn macro_def(&self, id: MacroId) -> &Macro {
        &self.macros[id.0]
    }

    /// Define a new macro in `parent` and return it.  The macro's
    /// body is initially empty.
    pub(crate) fn define_macro(
        &mut self,
        parent: ScopeId,
        name: SymbolName,
        formal_args: Vec<SymbolName>,
    ) -> MacroId {
        let macro_id = MacroId(self.macros.len());
        let body = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent: Some(parent),
            owner: Some(macro_id),
            ..Scope::default()
        });
        self.macros.push(Macro {
            name,
            formal_args,
            body,
        });
        self.scope_mut(parent).macros.push(macro_id);
        macro_id
    }

    /// The name of the macro owning `scope`, or `None` for the main
    /// program.
    pub(crate) fn owner_name(&self, scope: ScopeId) -> Option<SymbolName> {
        self.scope(scope)
            .owner
            .map(|id| self.macro_def(id).name.clone())
    }

    /// Look `name` up in `scope` and then in each enclosing scope.
    /// Within a scope the earliest definition wins.
    pub(crate) fn find_macro(&self, scope: ScopeId, name: &SymbolName) -> Option<MacroId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id);
            if let Some(found) = s
                .macros
                .iter()
                .copied()
                .find(|m| &self.macro_def(*m).name == name)
            {
                return Some(found);
            }
            current = s.parent;
        }
        None
    }

    pub(crate) fn add_option(&mut self, option: String) {
        self.options.push(option);
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// The arithmetic mode selected by the program's options.
    #[must_use]
    pub fn arithmetic_mode(&self) -> ArithmeticMode {
        ArithmeticMode::from_options(self.options.iter().map(String::as_str))
    }

    /// The number of statements in the main program (not counting
    /// macro bodies).
    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.scope(self.root()).statements.len()
    }
}
