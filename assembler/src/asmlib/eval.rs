//! Symbol resolution.
use tracing::{event, Level};

use base::prelude::*;

use super::ast::{Program, ScopeId, StatementKind, Value};
use super::state::CompileState;

/// The name which could not be found in any enclosing scope.  For a
/// name such as `$-foo` this is the innermost part, `foo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unresolved {
    pub(crate) name: String,
}

pub(crate) fn evaluate(
    prog: &Program,
    state: &mut CompileState,
    scope: ScopeId,
    here: Word,
    value: &Value,
) -> Result<Word, Unresolved> {
    match value {
        Value::Literal(w) => Ok(*w),
        Value::Symbol(name) => resolve_symbol(prog, state, scope, here, name),
    }
}

/// Resolve `name` as it appears in `scope`, in a statement placed at
/// `here`.
///
/// A reference to a label which has not yet been assembled in the
/// current pass succeeds with the label's previous address, but is
/// counted against the scope which defines the label so that the
/// caller knows another pass is needed.
pub(crate) fn resolve_symbol(
    prog: &Program,
    state: &mut CompileState,
    scope: ScopeId,
    here: Word,
    name: &str,
) -> Result<Word, Unresolved> {
    if let Some(value) = scan_integer(name) {
        return Ok(value);
    }
    if let Some(rest) = name.strip_prefix('-') {
        return resolve_symbol(prog, state, scope, here, rest).map(Word::wrapping_neg);
    }
    if let Some(rest) = name.strip_prefix('$') {
        return resolve_symbol(prog, state, scope, here, rest).map(|w| w.wrapping_add(here));
    }
    if let Some(reg) = ReservedAddress::from_register_name(name) {
        return Ok(reg.address());
    }

    let mut current = Some(scope);
    while let Some(id) = current {
        let s = prog.scope(id);
        // The last definition of a label wins, wherever the
        // reference is.
        let label = s.statements.iter().enumerate().rev().find(|(_, stmt)| {
            matches!(&stmt.kind, StatementKind::Label(label) if label == name)
        });
        if let Some((index, _)) = label {
            let st = state.statement(id, index);
            if !st.assembled {
                event!(
                    Level::TRACE,
                    "forward reference to {name}, using previous value {:#x}",
                    st.current_value
                );
                state.note_unresolved(id);
            }
            return Ok(st.current_value);
        }
        if let Some(slot) = s
            .owner
            .and_then(|m| prog.macro_def(m).argument_slot(name))
        {
            return Ok(state.actual_arg(id, slot));
        }
        current = s.parent;
    }
    Err(Unresolved {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;
    use crate::symbol::SymbolName;

    fn label(name: &str, line: u32) -> Statement {
        Statement {
            kind: StatementKind::Label(SymbolName::from(name)),
            line,
        }
    }

    fn instruction(operand: &str, line: u32) -> Statement {
        Statement {
            kind: StatementKind::Instruction(Value::from_token(operand)),
            line,
        }
    }

    /// A main program containing two labels called `dup` and one
    /// macro `m` with formal argument `x` and a label `inner`.
    fn sample() -> (Program, ScopeId) {
        let mut prog = Program::new();
        let root = prog.root();
        prog.scope_mut(root).statements = vec![
            label("dup", 1),
            instruction("1", 2),
            label("dup", 3),
            label("late", 4),
        ];
        let m = prog.define_macro(root, SymbolName::from("m"), vec![SymbolName::from("x")]);
        let body = prog.macro_def(m).body;
        prog.scope_mut(body).statements = vec![label("inner", 6), label("x", 7)];
        (prog, body)
    }

    fn resolve(prog: &Program, state: &mut CompileState, scope: ScopeId, name: &str) -> Word {
        match resolve_symbol(prog, state, scope, 100, name) {
            Ok(w) => w,
            Err(e) => panic!("{name} should resolve, but got {e:?}"),
        }
    }

    #[test]
    fn test_literals_and_registers() {
        let (prog, body) = sample();
        let mut state = CompileState::new(&prog);
        assert_eq!(resolve(&prog, &mut state, body, "0x20"), 32);
        assert_eq!(resolve(&prog, &mut state, body, "ac"), 1);
        assert_eq!(resolve(&prog, &mut state, body, "PC"), 0);
        assert_eq!(resolve(&prog, &mut state, body, "Zero"), 2);
        assert_eq!(resolve(&prog, &mut state, body, "input"), 3);
        assert_eq!(resolve(&prog, &mut state, body, "OUT"), 4);
    }

    #[test]
    fn test_relative_and_negative() {
        let (prog, _) = sample();
        let root = prog.root();
        let mut state = CompileState::new(&prog);
        assert_eq!(resolve(&prog, &mut state, root, "$2"), 102);
        assert_eq!(resolve(&prog, &mut state, root, "$-1"), 99);
        assert_eq!(resolve(&prog, &mut state, root, "-out"), 0u32.wrapping_sub(4));
        // The relative rule comes before the built-in names.
        assert_eq!(resolve(&prog, &mut state, root, "$0"), 100);
    }

    #[test]
    fn test_duplicate_labels_resolve_to_last() {
        let (prog, body) = sample();
        let root = prog.root();
        let mut state = CompileState::new(&prog);
        state.mark_assembled(root, 0, 10);
        state.mark_assembled(root, 2, 11);
        assert_eq!(resolve(&prog, &mut state, root, "dup"), 11);
        // Also when the reference comes from an inner scope.
        assert_eq!(resolve(&prog, &mut state, body, "dup"), 11);
        assert_eq!(state.unresolved(root), 0);
    }

    #[test]
    fn test_forward_reference_is_counted_where_defined() {
        let (prog, body) = sample();
        let root = prog.root();
        let mut state = CompileState::new(&prog);
        assert_eq!(resolve(&prog, &mut state, body, "late"), 0);
        assert_eq!(resolve(&prog, &mut state, body, "inner"), 0);
        assert_eq!(state.unresolved(root), 1);
        assert_eq!(state.unresolved(body), 1);
    }

    #[test]
    fn test_labels_shadow_arguments() {
        let (prog, body) = sample();
        let mut state = CompileState::new(&prog);
        state.set_actual_arg(body, 0, 42);
        state.mark_assembled(body, 1, 7);
        assert_eq!(resolve(&prog, &mut state, body, "x"), 7);
    }

    #[test]
    fn test_arguments() {
        let mut prog = Program::new();
        let root = prog.root();
        let m = prog.define_macro(
            root,
            SymbolName::from("m"),
            vec![SymbolName::from("a1"), SymbolName::from("a2")],
        );
        let body = prog.macro_def(m).body;
        let mut state = CompileState::new(&prog);
        state.set_actual_arg(body, 1, 42);
        assert_eq!(resolve(&prog, &mut state, body, "a2"), 42);
        assert_eq!(resolve(&prog, &mut state, body, "$a2"), 142);
        assert_eq!(
            resolve_symbol(&prog, &mut state, root, 0, "a2"),
            Err(Unresolved {
                name: "a2".to_string()
            })
        );
    }

    #[test]
    fn test_unresolved_reports_innermost_name() {
        let (prog, body) = sample();
        let mut state = CompileState::new(&prog);
        assert_eq!(
            resolve_symbol(&prog, &mut state, body, 0, "$-nowhere"),
            Err(Unresolved {
                name: "nowhere".to_string()
            })
        );
    }
}
