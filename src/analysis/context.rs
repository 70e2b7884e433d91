//! Per-traversal analysis state.
//!
//! One [`AnalysisContext`] is created for every entry node, so nothing leaks
//! between independent execution chains.

use super::scope::ScopeManager;
use crate::ast::{DeclarationKind, Expression, SourceLocation, Statement, VariableDeclaration};
use crate::error::{BpgaError, Diagnostic};
use crate::graph::{BlueprintGraph, PinRef};
use crate::options::AnalysisOptions;
use std::collections::{HashMap, HashSet};

/// Declarations waiting to be emitted ahead of the next statement of a block
struct PreludeFrame {
    /// Scope opened by the block
    scope: usize,
    statements: Vec<Statement>,
}

pub struct AnalysisContext<'g> {
    pub graph: &'g BlueprintGraph,
    pub options: &'g AnalysisOptions,
    pub symbol_table: ScopeManager,
    /// Bindings that outlive their block (event parameters, call results),
    /// with the scope that was open when they were made
    pin_ast_map: HashMap<PinRef, (Expression, usize)>,
    /// Computed expressions, one frame per open scope, with the deepest scope
    /// each one reads from
    memoization_cache: Vec<HashMap<PinRef, (Expression, usize)>>,
    pub pin_usage_counts: &'g HashMap<PinRef, usize>,
    scope_prelude: Vec<PreludeFrame>,
    /// Prelude frames below these indices never receive hoisted values
    isolation_floors: Vec<usize>,
    /// Deepest scope read so far, one entry per expression being resolved
    dependency_depths: Vec<usize>,
    /// Output pin where the current chain resumes
    pub pending_continuation_pin: Option<PinRef>,
    path: HashSet<String>,
    resolving: HashSet<PinRef>,
    taken_names: HashSet<String>,
    steps: usize,
    pub(crate) block_depth: usize,
    pub(crate) expression_depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'g> AnalysisContext<'g> {
    pub fn new(
        graph: &'g BlueprintGraph,
        options: &'g AnalysisOptions,
        pin_usage_counts: &'g HashMap<PinRef, usize>,
    ) -> Self {
        Self {
            graph,
            options,
            symbol_table: ScopeManager::new(),
            pin_ast_map: HashMap::new(),
            memoization_cache: vec![HashMap::new()],
            pin_usage_counts,
            scope_prelude: Vec::new(),
            isolation_floors: Vec::new(),
            dependency_depths: Vec::new(),
            pending_continuation_pin: None,
            path: HashSet::new(),
            resolving: HashSet::new(),
            taken_names: HashSet::new(),
            steps: 0,
            block_depth: 0,
            expression_depth: 0,
            diagnostics: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------

    /// Open a lexical scope for bindings and memoized values
    pub fn enter_scope(&mut self) {
        self.symbol_table.enter_scope();
        self.memoization_cache.push(HashMap::new());
    }

    pub fn leave_scope(&mut self) -> Result<(), BpgaError> {
        self.symbol_table.leave_scope()?;
        self.memoization_cache.pop();
        Ok(())
    }

    /// Index of the innermost open scope
    pub fn current_scope(&self) -> usize {
        self.symbol_table.depth() - 1
    }

    pub fn memoized(&self, pin: &PinRef) -> Option<&Expression> {
        self.memoization_cache
            .iter()
            .rev()
            .find_map(|frame| frame.get(pin))
            .map(|(expression, _)| expression)
    }

    /// Cache `expression` in the current scope. `reads_from` is the deepest
    /// scope the expression depends on.
    pub fn memoize(&mut self, pin: PinRef, expression: Expression, reads_from: usize) {
        if let Some(frame) = self.memoization_cache.last_mut() {
            frame.insert(pin, (expression, reads_from));
        }
    }

    pub fn usage_count(&self, pin: &PinRef) -> usize {
        self.pin_usage_counts.get(pin).copied().unwrap_or(0)
    }

    // ------------------------------------------------------------------
    // Bindings
    // ------------------------------------------------------------------

    /// Bind an output pin for the rest of the traversal
    pub fn bind_pin(&mut self, pin: PinRef, expression: Expression) {
        let scope = self.current_scope();
        self.pin_ast_map.insert(pin, (expression, scope));
    }

    /// Known value of `pin` from bindings, the scope stack or the memo cache.
    /// A hit counts as a read for the expression being resolved.
    pub fn lookup_value(&mut self, pin: &PinRef) -> Option<Expression> {
        let (expression, scope) = match self.pin_ast_map.get(pin) {
            Some((expression, scope)) => (expression.clone(), *scope),
            None => match self.symbol_table.lookup_with_depth(pin) {
                Some((scope, expression)) => (expression.clone(), scope),
                None => self
                    .memoization_cache
                    .iter()
                    .rev()
                    .find_map(|frame| frame.get(pin))
                    .map(|(expression, scope)| (expression.clone(), *scope))?,
            },
        };
        self.note_dependency(scope);
        Some(expression)
    }

    /// Start recording which scopes a new expression reads from
    pub(crate) fn begin_dependencies(&mut self) {
        self.dependency_depths.push(0);
    }

    /// Deepest scope read since the matching `begin_dependencies`
    pub(crate) fn end_dependencies(&mut self) -> usize {
        self.dependency_depths.pop().unwrap_or(0)
    }

    pub(crate) fn note_dependency(&mut self, scope: usize) {
        if let Some(depth) = self.dependency_depths.last_mut() {
            *depth = (*depth).max(scope);
        }
    }

    // ------------------------------------------------------------------
    // Prelude
    // ------------------------------------------------------------------

    /// Open the prelude of a block whose bindings live in the current scope
    pub(crate) fn push_prelude_frame(&mut self) {
        let scope = self.current_scope();
        self.scope_prelude.push(PreludeFrame {
            scope,
            statements: Vec::new(),
        });
    }

    pub(crate) fn pop_prelude_frame(&mut self) -> Vec<Statement> {
        self.scope_prelude
            .pop()
            .map(|frame| frame.statements)
            .unwrap_or_default()
    }

    pub(crate) fn drain_prelude(&mut self) -> Vec<Statement> {
        self.scope_prelude
            .last_mut()
            .map(|frame| std::mem::take(&mut frame.statements))
            .unwrap_or_default()
    }

    /// Blocks opened from here on run apart from the enclosing ones (event,
    /// loop and callback bodies), so nothing is hoisted out of them
    pub(crate) fn enter_isolated(&mut self) {
        self.isolation_floors.push(self.scope_prelude.len());
    }

    pub(crate) fn leave_isolated(&mut self) {
        self.isolation_floors.pop();
    }

    /// Queue a declaration ahead of the statement currently being built
    pub fn push_prelude(&mut self, statement: Statement) {
        let scope = self.current_scope();
        match self.scope_prelude.last_mut() {
            Some(frame) => frame.statements.push(statement),
            None => self.scope_prelude.push(PreludeFrame {
                scope,
                statements: vec![statement],
            }),
        }
    }

    /// Declare a hoisted value and bind `pin` to it.
    ///
    /// The declaration goes to the outermost open block whose scope already
    /// sees everything the value reads (`reads_from`), so uses in sibling
    /// blocks share one declaration.
    pub fn declare_temporary(
        &mut self,
        pin: PinRef,
        base_name: &str,
        type_name: Option<String>,
        value: Expression,
        location: Option<SourceLocation>,
        reads_from: usize,
    ) -> Expression {
        let name = self.unique_name(base_name);
        let declaration = Statement::VariableDeclaration(VariableDeclaration {
            name: name.clone(),
            type_name,
            value: Some(value),
            kind: DeclarationKind::Temporary,
            location,
        });

        let floor = self.isolation_floors.last().copied().unwrap_or(0);
        let target = (floor..self.scope_prelude.len())
            .find(|&i| self.scope_prelude[i].scope >= reads_from)
            .or_else(|| self.scope_prelude.len().checked_sub(1));
        let scope = match target {
            Some(index) => {
                let frame = &mut self.scope_prelude[index];
                frame.statements.push(declaration);
                frame.scope
            }
            None => {
                self.push_prelude(declaration);
                self.current_scope()
            }
        };
        tracing::debug!("[ANALYZER] Hoisting shared value into '{}' (scope {})", name, scope);

        let variable = Expression::variable(name, false);
        self.symbol_table.register_variable_at(scope, pin, variable.clone());
        self.note_dependency(scope);
        variable
    }

    /// `base`, then `base_1`, `base_2`, ... within this traversal
    pub fn unique_name(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut suffix = 1;
        while self.taken_names.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        self.taken_names.insert(name.clone());
        name
    }

    // ------------------------------------------------------------------
    // Cycle and budget guards
    // ------------------------------------------------------------------

    pub fn is_on_path(&self, node_guid: &str) -> bool {
        self.path.contains(node_guid)
    }

    pub(crate) fn enter_path(&mut self, node_guid: &str) {
        self.path.insert(node_guid.to_string());
    }

    pub(crate) fn leave_path(&mut self, node_guid: &str) {
        self.path.remove(node_guid);
    }

    pub(crate) fn begin_resolving(&mut self, pin: &PinRef) -> bool {
        self.resolving.insert(pin.clone())
    }

    pub(crate) fn end_resolving(&mut self, pin: &PinRef) {
        self.resolving.remove(pin);
    }

    /// Count a visited node. Returns `false` once the budget is spent.
    pub(crate) fn take_step(&mut self) -> bool {
        if self.steps >= self.options.max_steps {
            return false;
        }
        self.steps += 1;
        true
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
