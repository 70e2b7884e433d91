//! # Scope Manager
//!
//! Stack of lexical scopes mapping a pin to the expression that reads its
//! value. Loop bodies and callback bodies push a scope so their variables
//! vanish once the block is left.

use crate::ast::Expression;
use crate::error::{BpgaError, Result};
use crate::graph::PinRef;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ScopeManager {
    scopes: Vec<HashMap<PinRef, Expression>>,
}

impl Default for ScopeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeManager {
    /// Create a manager holding only the root scope
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the innermost scope. The root scope is never removed.
    pub fn leave_scope(&mut self) -> Result<()> {
        if self.scopes.len() <= 1 {
            return Err(BpgaError::ScopeUnderflow);
        }
        self.scopes.pop();
        Ok(())
    }

    /// Bind a pin in the innermost scope, shadowing outer bindings
    pub fn register_variable(&mut self, pin: PinRef, expression: Expression) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(pin, expression);
        }
    }

    /// Bind a pin in an enclosing scope. Indices past the innermost scope
    /// bind in the innermost one.
    pub fn register_variable_at(&mut self, depth: usize, pin: PinRef, expression: Expression) {
        let index = depth.min(self.scopes.len() - 1);
        self.scopes[index].insert(pin, expression);
    }

    /// Search innermost to outermost
    pub fn lookup_variable(&self, pin: &PinRef) -> Option<&Expression> {
        self.lookup_with_depth(pin).map(|(_, expression)| expression)
    }

    /// Like [`Self::lookup_variable`], also returning the index of the scope
    /// that holds the binding
    pub fn lookup_with_depth(&self, pin: &PinRef) -> Option<(usize, &Expression)> {
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(depth, scope)| scope.get(pin).map(|expression| (depth, expression)))
    }

    pub fn is_visible(&self, pin: &PinRef) -> bool {
        self.lookup_variable(pin).is_some()
    }

    pub fn current_scope_variables(&self) -> Vec<(&PinRef, &Expression)> {
        let mut vars: Vec<_> = self
            .scopes
            .last()
            .map(|scope| scope.iter().collect())
            .unwrap_or_default();
        vars.sort_by(|a, b| a.0.cmp(b.0));
        vars
    }

    /// Number of scopes including the root
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
