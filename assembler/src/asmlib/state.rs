//! Per-pass compilation state.
//!
//! The parse tree in [`crate::ast`] never changes.  Everything which
//! the compiler updates while it iterates (where each statement was
//! last placed, which macro arguments are bound, how many forward
//! references were seen) is kept here, indexed the same way.
use base::prelude::Word;

use super::ast::{Program, ScopeId, StatementKind};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StatementState {
    /// Set once the statement has been reached in the current
    /// expansion of its scope.
    pub(crate) assembled: bool,
    /// The address at which the statement was most recently placed.
    pub(crate) current_value: Word,
}

#[derive(Debug, Default)]
pub(crate) struct ScopeState {
    /// References to not-yet-assembled labels of this scope seen
    /// during the current pass.
    pub(crate) unresolved: usize,
    pub(crate) actual_args: Vec<Word>,
    /// The scope containing the most recent invocation of this one.
    pub(crate) caller: Option<ScopeId>,
    pub(crate) statements: Vec<StatementState>,
}

#[derive(Debug)]
pub(crate) struct CompileState {
    scopes: Vec<ScopeState>,
}

impl CompileState {
    pub(crate) fn new(prog: &Program) -> CompileState {
        let scopes = (0..prog.scope_count())
            .map(|n| {
                let id = prog.scope_id(n);
                let scope = prog.scope(id);
                ScopeState {
                    unresolved: 0,
                    actual_args: vec![
                        0;
                        scope
                            .owner
                            .map_or(0, |m| prog.macro_def(m).formal_args.len())
                    ],
                    caller: None,
                    statements: vec![StatementState::default(); scope.statements.len()],
                }
            })
            .collect();
        CompileState { scopes }
    }

    pub(crate) fn scope(&self, id: ScopeId) -> &ScopeState {
        &self.scopes[id.index()]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut ScopeState {
        &mut self.scopes[id.index()]
    }

    pub(crate) fn statement(&self, scope: ScopeId, index: usize) -> StatementState {
        self.scope(scope).statements[index]
    }

    pub(crate) fn mark_assembled(&mut self, scope: ScopeId, index: usize, address: Word) {
        self.scope_mut(scope).statements[index] = StatementState {
            assembled: true,
            current_value: address,
        };
    }

    pub(crate) fn note_unresolved(&mut self, scope: ScopeId) {
        self.scope_mut(scope).unresolved += 1;
    }

    pub(crate) fn unresolved(&self, scope: ScopeId) -> usize {
        self.scope(scope).unresolved
    }

    pub(crate) fn reset_unresolved(&mut self, scope: ScopeId) {
        self.scope_mut(scope).unresolved = 0;
    }

    pub(crate) fn set_actual_arg(&mut self, scope: ScopeId, slot: usize, value: Word) {
        self.scope_mut(scope).actual_args[slot] = value;
    }

    pub(crate) fn actual_arg(&self, scope: ScopeId, slot: usize) -> Word {
        self.scope(scope).actual_args[slot]
    }

    pub(crate) fn set_caller(&mut self, scope: ScopeId, caller: ScopeId) {
        self.scope_mut(scope).caller = Some(caller);
    }

    /// Prepare `scope` for a fresh expansion.  Origin statements keep
    /// their state since they move the cursor rather than record an
    /// address.
    pub(crate) fn reset_scope(&mut self, prog: &Program, scope: ScopeId) {
        let state = self.scope_mut(scope);
        state.actual_args.fill(0);
        state.caller = None;
        state.unresolved = 0;
        for (st, stmt) in state
            .statements
            .iter_mut()
            .zip(prog.scope(scope).statements.iter())
        {
            if !matches!(stmt.kind, StatementKind::Origin(_)) {
                *st = StatementState::default();
            }
        }
    }
}
