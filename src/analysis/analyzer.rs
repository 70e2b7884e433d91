//! # Graph Analyzer
//!
//! Walks execution flow from every entry node, dispatches each node to its
//! processor and resolves data inputs on demand.
//!
//! ## Data resolution
//!
//! A connected input is resolved through its source output pin, checking in
//! order: structural bindings, the scope stack, the memo cache, and finally
//! the producing node's processor in expression mode. An unconnected input
//! uses its default literal, or an explicit [`UnsupportedReason::NoValue`]
//! marker when it has none.
//!
//! A computed value read by more than one input is declared once, in the
//! outermost open block that already sees every binding it reads.

use super::context::AnalysisContext;
use super::processors::fallback::FallbackProcessor;
use super::processors::generic::{is_generic_callable, GenericCallProcessor};
use super::processors::{
    clean_member_name, is_target_pin, kind_label, to_snake_case, Continuation, NodeProcessingResult,
    NodeProcessor, ProcessorRegistry,
};
use crate::ast::{
    Argument, Block, BreakNode, CycleBoundary, EventNode, ExitBranch, Expression, LiteralValue,
    Parameter, SourceLocation, Statement, TruncatedNode, UnsupportedReason,
};
use crate::error::Diagnostic;
use crate::graph::{BlueprintGraph, GraphNode, GraphPin, PinRef, EVENT_CLASSES};
use crate::options::AnalysisOptions;
use serde::Serialize;

/// Statements for every entry node plus everything worth reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutput {
    pub graph_name: String,
    pub statements: Vec<Statement>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turns a [`BlueprintGraph`] into statements.
///
/// The analyzer holds no per-graph state, so one instance can analyze any
/// number of graphs, including from several threads at once.
pub struct GraphAnalyzer {
    registry: ProcessorRegistry,
    generic: GenericCallProcessor,
    fallback: FallbackProcessor,
    options: AnalysisOptions,
}

impl Default for GraphAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphAnalyzer {
    pub fn new() -> Self {
        Self::with_options(AnalysisOptions::default())
    }

    pub fn with_options(options: AnalysisOptions) -> Self {
        Self::with_registry(ProcessorRegistry::with_defaults(), options)
    }

    pub fn with_registry(registry: ProcessorRegistry, options: AnalysisOptions) -> Self {
        Self {
            registry,
            generic: GenericCallProcessor,
            fallback: FallbackProcessor,
            options,
        }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn registry(&self) -> &ProcessorRegistry {
        &self.registry
    }

    /// Analyze every entry node of `graph`.
    ///
    /// # Arguments
    ///
    /// * `graph` - Graph produced by [`crate::graph::build_graph`]
    ///
    /// # Returns
    ///
    /// One top-level statement per entry node, in graph order, together with
    /// the builder's diagnostics and those raised during analysis. Analysis
    /// always completes; problems degrade to markers in the tree.
    pub fn analyze(&self, graph: &BlueprintGraph) -> AnalysisOutput {
        tracing::debug!(
            "[ANALYZER] Analyzing '{}' ({} nodes, {} entry points)",
            graph.graph_name,
            graph.len(),
            graph.entry_nodes.len()
        );

        let usage_counts = graph.pin_usage_counts();
        let mut statements = Vec::new();
        let mut diagnostics = graph.diagnostics.clone();

        for guid in &graph.entry_nodes {
            let Some(entry) = graph.node(guid) else {
                continue;
            };
            let mut cx = AnalysisContext::new(graph, &self.options, &usage_counts);
            let block = self.walk_chain(&mut cx, entry, None);

            if EVENT_CLASSES.contains(&entry.short_class()) {
                statements.extend(block);
            } else {
                // Chains without an event still get one root per entry
                statements.push(Statement::Event(EventNode {
                    name: entry.node_name.clone(),
                    parameters: Vec::new(),
                    body: block,
                    location: SourceLocation::of(entry),
                }));
            }

            tracing::debug!("[ANALYZER] Entry '{}' visited {} nodes", entry.node_name, cx.steps());
            diagnostics.extend(cx.take_diagnostics());
        }

        AnalysisOutput {
            graph_name: graph.graph_name.clone(),
            statements,
            diagnostics,
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Run `node` as a statement using the first matching tier
    pub fn process_statement<'g>(
        &self,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        if let Some(processor) = self.registry.lookup(node) {
            tracing::debug!("[ANALYZER] {} -> {}", node.node_name, processor.name());
            return processor.process_statement(self, cx, node);
        }
        if is_generic_callable(node) {
            tracing::debug!("[ANALYZER] {} -> generic call", node.node_name);
            return self.generic.process_statement(self, cx, node);
        }
        tracing::debug!("[ANALYZER] {} -> fallback", node.node_name);
        self.fallback.process_statement(self, cx, node)
    }

    /// Evaluate `output` of `node` as a value using the first matching tier
    pub fn process_expression<'g>(
        &self,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        output: &'g GraphPin,
    ) -> Expression {
        if let Some(processor) = self.registry.lookup(node) {
            return processor.process_expression(self, cx, node, output);
        }
        if node.member_reference().is_some() {
            return self.generic.process_expression(self, cx, node, output);
        }
        self.fallback.process_expression(self, cx, node, output)
    }

    // ========================================================================
    // Execution flow
    // ========================================================================

    /// Walk every chain hanging off an exec output pin
    pub fn walk_exec_output<'g>(&self, cx: &mut AnalysisContext<'g>, pin: &'g GraphPin) -> Block {
        let graph = cx.graph;
        let mut block = Vec::new();
        for target in &pin.linked_to {
            if let Some((node, input)) = graph.pin(target) {
                block.extend(self.walk_chain(cx, node, Some(input)));
            }
        }
        block
    }

    /// Walk an exec output inside a fresh scope holding `bindings`
    pub fn walk_scoped<'g>(
        &self,
        cx: &mut AnalysisContext<'g>,
        pin: &'g GraphPin,
        bindings: Vec<(PinRef, Expression)>,
    ) -> Block {
        cx.enter_scope();
        for (pin_ref, expression) in bindings {
            cx.symbol_table.register_variable(pin_ref, expression);
        }
        let block = self.walk_exec_output(cx, pin);
        if let Err(err) = cx.leave_scope() {
            cx.report(Diagnostic::error(None, err.to_string()));
        }
        block
    }

    /// Walk a body that runs apart from the enclosing block (event, loop and
    /// callback bodies). Shared values it reads are declared inside it.
    pub fn walk_body<'g>(
        &self,
        cx: &mut AnalysisContext<'g>,
        pin: &'g GraphPin,
        bindings: Vec<(PinRef, Expression)>,
    ) -> Block {
        cx.enter_isolated();
        let block = self.walk_scoped(cx, pin, bindings);
        cx.leave_isolated();
        block
    }

    /// Follow a linear chain starting at `start` until it ends, loops back,
    /// or runs out of budget.
    pub fn walk_chain<'g>(
        &self,
        cx: &mut AnalysisContext<'g>,
        start: &'g GraphNode,
        entered_via: Option<&'g GraphPin>,
    ) -> Block {
        let graph = cx.graph;
        let mut block = Vec::new();
        let mut visited: Vec<&'g str> = Vec::new();

        cx.block_depth += 1;
        cx.enter_scope();
        cx.push_prelude_frame();

        let mut next = Some((start, entered_via));
        if cx.block_depth > self.options.max_depth {
            cx.report(Diagnostic::warning(
                Some(&start.node_guid),
                "Maximum block nesting depth reached",
            ));
            block.push(truncated(start, "maximum nesting depth reached"));
            next = None;
        }

        while let Some((node, via)) = next.take() {
            if cx.is_on_path(&node.node_guid) {
                let is_break = via
                    .map(|p| p.pin_name.eq_ignore_ascii_case("Break"))
                    .unwrap_or(false);
                if is_break {
                    block.push(Statement::Break(BreakNode {
                        location: SourceLocation::of(node),
                    }));
                } else {
                    tracing::debug!("[ANALYZER] Cycle back to {}", node.node_name);
                    block.push(Statement::CycleBoundary(CycleBoundary {
                        target: SourceLocation::of(node),
                    }));
                }
                break;
            }

            if !cx.take_step() {
                tracing::warn!("[ANALYZER] Step budget exhausted at {}", node.node_name);
                cx.report(Diagnostic::warning(
                    Some(&node.node_guid),
                    "Traversal step budget exhausted",
                ));
                block.push(truncated(node, "step budget exhausted"));
                break;
            }

            cx.enter_path(&node.node_guid);
            visited.push(&node.node_guid);

            let result = self.process_statement(cx, node);
            block.extend(cx.drain_prelude());
            if let Some(statement) = result.statement {
                block.push(statement);
            }

            cx.pending_continuation_pin = match result.continuation {
                Continuation::Then => node
                    .then_pin()
                    .map(|pin| PinRef::new(&node.node_guid, &pin.pin_id)),
                Continuation::Pin(pin) => Some(pin),
                Continuation::End => None,
            };

            next = match cx.pending_continuation_pin.take() {
                Some(pin_ref) => self.next_in_chain(cx, graph, &pin_ref),
                None => None,
            };
        }

        for guid in visited {
            cx.leave_path(guid);
        }
        block.extend(cx.pop_prelude_frame());
        if let Err(err) = cx.leave_scope() {
            cx.report(Diagnostic::error(None, err.to_string()));
        }
        cx.block_depth -= 1;
        block
    }

    fn next_in_chain<'g>(
        &self,
        cx: &mut AnalysisContext<'g>,
        graph: &'g BlueprintGraph,
        output: &PinRef,
    ) -> Option<(&'g GraphNode, Option<&'g GraphPin>)> {
        let (node, pin) = graph.pin(output)?;
        if pin.linked_to.len() > 1 {
            cx.report(Diagnostic::info(
                Some(&node.node_guid),
                format!("Exec pin '{}' fans out, following its first link", pin.pin_name),
            ));
        }
        let target = pin.linked_to.first()?;
        let (next, input) = graph.pin(target)?;
        Some((next, Some(input)))
    }

    /// Linked exec outputs other than `then` and `skip`, each walked as its own block
    pub fn exit_branches<'g>(
        &self,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        skip: &[&str],
    ) -> Vec<ExitBranch> {
        let then_id = node.then_pin().map(|p| p.pin_id.as_str());
        let pins: Vec<&'g GraphPin> = node
            .exec_outputs()
            .filter(|p| Some(p.pin_id.as_str()) != then_id)
            .filter(|p| !skip.contains(&p.pin_name.as_str()))
            .filter(|p| p.is_linked())
            .collect();

        pins.into_iter()
            .map(|pin| ExitBranch {
                pin_name: pin.pin_name.clone(),
                body: self.walk_exec_output(cx, pin),
            })
            .collect()
    }

    // ========================================================================
    // Data flow
    // ========================================================================

    /// Value of a data input pin
    pub fn resolve_input<'g>(&self, cx: &mut AnalysisContext<'g>, pin: &'g GraphPin) -> Expression {
        let graph = cx.graph;
        if let Some(source) = pin.linked_to.first() {
            return match graph.pin(source) {
                Some((node, output)) => self.resolve_output(cx, node, output),
                None => Expression::unsupported(
                    UnsupportedReason::DanglingLink,
                    format!("input '{}' links to a missing pin", pin.pin_name),
                    None,
                ),
            };
        }

        match &pin.default_value {
            Some(text) => Expression::literal(
                LiteralValue::from_default(text, pin.data_type()),
                pin.data_type().map(|t| t.type_name()),
            ),
            None => Expression::unsupported(
                UnsupportedReason::NoValue,
                format!("input '{}' is not connected", pin.pin_name),
                None,
            ),
        }
    }

    /// Value of a named input on `node`
    pub fn resolve_named_input<'g>(
        &self,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        name: &str,
    ) -> Expression {
        match node.input(name).filter(|p| !p.is_exec()) {
            Some(pin) => self.resolve_input(cx, pin),
            None => Expression::unsupported(
                UnsupportedReason::NoValue,
                format!("{} has no input '{}'", node.node_name, name),
                Some(SourceLocation::of(node)),
            ),
        }
    }

    /// Value produced by `output` of `node`, hoisted into a temporary when
    /// several inputs read it
    pub fn resolve_output<'g>(
        &self,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        output: &'g GraphPin,
    ) -> Expression {
        let key = PinRef::new(&node.node_guid, &output.pin_id);

        if let Some(known) = cx.lookup_value(&key) {
            return known;
        }

        if cx.expression_depth >= self.options.max_depth {
            cx.report(Diagnostic::warning(
                Some(&node.node_guid),
                "Maximum expression depth reached",
            ));
            return Expression::unsupported(
                UnsupportedReason::TooDeep,
                format!("{}.{}", node.node_name, output.pin_name),
                Some(SourceLocation::of(node)),
            );
        }
        if !cx.begin_resolving(&key) {
            cx.report(Diagnostic::warning(
                Some(&node.node_guid),
                format!("Data cycle through '{}.{}'", node.node_name, output.pin_name),
            ));
            return Expression::unsupported(
                UnsupportedReason::DataCycle,
                format!("{}.{}", node.node_name, output.pin_name),
                Some(SourceLocation::of(node)),
            );
        }

        cx.begin_dependencies();
        cx.expression_depth += 1;
        let expression = self.process_expression(cx, node, output);
        cx.expression_depth -= 1;
        let reads_from = cx.end_dependencies();
        cx.end_resolving(&key);

        let shared = cx.usage_count(&key) > 1;
        if self.options.extract_shared_values && shared && expression.is_computed() {
            let base = temporary_base_name(node, &expression);
            return cx.declare_temporary(
                key,
                &base,
                output.data_type().map(|t| t.type_name()),
                expression,
                Some(SourceLocation::of(node)),
                reads_from,
            );
        }

        cx.note_dependency(reads_from);
        if !expression.is_unsupported() {
            cx.memoize(key, expression.clone(), reads_from);
        }
        expression
    }

    /// Visible data inputs except the call target and `skip`, in pin order
    pub fn collect_arguments<'g>(
        &self,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        skip: &[&str],
    ) -> Vec<Argument> {
        let pins: Vec<&'g GraphPin> = node
            .data_inputs()
            .filter(|p| !p.hidden && !is_target_pin(p))
            .filter(|p| !skip.contains(&p.pin_name.as_str()))
            .collect();

        pins.into_iter()
            .map(|pin| Argument::new(pin.pin_name.clone(), self.resolve_input(cx, pin)))
            .collect()
    }

    /// Object the node is called on, when its `self` pin is wired
    pub fn resolve_target<'g>(
        &self,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> Option<Expression> {
        let pin = node.data_inputs().find(|p| is_target_pin(p) && p.is_linked())?;
        Some(self.resolve_input(cx, pin))
    }

    /// Name the linked data outputs of an executed node so later reads see them
    pub fn bind_results<'g>(
        &self,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        function: &str,
    ) -> Vec<Parameter> {
        let mut bindings = Vec::new();
        for pin in node.data_outputs().filter(|p| p.is_linked()) {
            let base = if pin.pin_name == "ReturnValue" {
                format!("{}_result", to_snake_case(clean_member_name(function)))
            } else {
                to_snake_case(&pin.pin_name)
            };
            let name = cx.unique_name(&base);
            cx.bind_pin(
                PinRef::new(&node.node_guid, &pin.pin_id),
                Expression::variable(name.clone(), false),
            );
            bindings.push(Parameter::new(name, Some(pin.type_name())));
        }
        bindings
    }
}

fn truncated(node: &GraphNode, reason: &str) -> Statement {
    Statement::Truncated(TruncatedNode {
        reason: reason.to_string(),
        location: SourceLocation::of(node),
    })
}

/// `temp_get_actor_location`, `temp_as_bp_door`, `temp_get_actor_bounds_origin`, ...
fn temporary_base_name(node: &GraphNode, expression: &Expression) -> String {
    match expression {
        Expression::FunctionCall(call) => {
            format!("temp_{}", to_snake_case(clean_member_name(&call.function)))
        }
        Expression::Cast(cast) => format!("temp_as_{}", to_snake_case(&cast.target_type)),
        Expression::PropertyAccess(access) => format!(
            "{}_{}",
            temporary_base_name(node, &access.base),
            to_snake_case(&access.path)
        ),
        _ => format!("temp_{}", to_snake_case(kind_label(node))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::parser::parse_objects;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_analyzer_is_send_sync() {
        assert_send_sync::<GraphAnalyzer>();
        assert_send_sync::<BlueprintGraph>();
    }

    #[test]
    fn test_empty_graph_produces_nothing() {
        let graph = BlueprintGraph::new("EventGraph");
        let output = GraphAnalyzer::new().analyze(&graph);
        assert!(output.statements.is_empty());
        assert_eq!(output.graph_name, "EventGraph");
    }

    #[test]
    fn test_unconnected_input_without_default_is_marked() {
        let text = r#"Begin Object Class=/Script/BlueprintGraph.K2Node_Event Name="K2Node_Event_0"
   EventReference=(MemberName="ReceiveBeginPlay")
   NodeGuid=EVT
   CustomProperties Pin (PinId=E_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_VariableSet_0 S_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_VariableSet Name="K2Node_VariableSet_0"
   VariableReference=(MemberName="Target",bSelfContext=True)
   NodeGuid=SET
   CustomProperties Pin (PinId=S_EXEC,PinName="execute",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=S_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=S_VAL,PinName="Target",PinType.PinCategory="object")
End Object
"#;
        let graph = build_graph(&parse_objects(text));
        let output = GraphAnalyzer::new().analyze(&graph);
        let Statement::Event(event) = &output.statements[0] else {
            panic!("expected event");
        };
        let Statement::Assignment(assignment) = &event.body[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(
            &assignment.value,
            Expression::Unsupported(u) if u.reason == UnsupportedReason::NoValue
        ));
    }

    #[test]
    fn test_step_budget_truncates() {
        let text = r#"Begin Object Class=/Script/BlueprintGraph.K2Node_Event Name="K2Node_Event_0"
   EventReference=(MemberName="ReceiveTick")
   NodeGuid=EVT
   CustomProperties Pin (PinId=E_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_0 A_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_0"
   FunctionReference=(MemberName="First")
   NodeGuid=A
   CustomProperties Pin (PinId=A_EXEC,PinName="execute",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=A_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_1 B_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_1"
   FunctionReference=(MemberName="Second")
   NodeGuid=B
   CustomProperties Pin (PinId=B_EXEC,PinName="execute",PinType.PinCategory="exec")
End Object
"#;
        let graph = build_graph(&parse_objects(text));
        let options = AnalysisOptions { max_steps: 2, ..Default::default() };
        let output = GraphAnalyzer::with_options(options).analyze(&graph);
        let Statement::Event(event) = &output.statements[0] else {
            panic!("expected event");
        };
        assert_eq!(event.name, "Tick");
        assert!(matches!(event.body[0], Statement::FunctionCall(_)));
        assert!(matches!(event.body[1], Statement::Truncated(_)));
        assert!(output.diagnostics.iter().any(|d| d.message.contains("budget")));
    }

    #[test]
    fn test_data_cycle_is_marked() {
        let text = r#"Begin Object Class=/Script/BlueprintGraph.K2Node_Event Name="K2Node_Event_0"
   EventReference=(MemberName="ReceiveBeginPlay")
   NodeGuid=EVT
   CustomProperties Pin (PinId=E_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_VariableSet_0 S_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_0"
   FunctionReference=(MemberName="Grow")
   NodeGuid=GROW
   CustomProperties Pin (PinId=G_IN,PinName="Value",PinType.PinCategory="float",LinkedTo=(K2Node_CallFunction_1 K_RET,))
   CustomProperties Pin (PinId=G_RET,PinName="ReturnValue",Direction="EGPD_Output",PinType.PinCategory="float",LinkedTo=(K2Node_VariableSet_0 S_VAL,K2Node_CallFunction_1 K_IN,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_1"
   FunctionReference=(MemberName="Shrink")
   NodeGuid=SHRINK
   CustomProperties Pin (PinId=K_IN,PinName="Value",PinType.PinCategory="float")
   CustomProperties Pin (PinId=K_RET,PinName="ReturnValue",Direction="EGPD_Output",PinType.PinCategory="float")
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_VariableSet Name="K2Node_VariableSet_0"
   VariableReference=(MemberName="Size",bSelfContext=True)
   NodeGuid=SET
   CustomProperties Pin (PinId=S_EXEC,PinName="execute",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=S_VAL,PinName="Size",PinType.PinCategory="float")
End Object
"#;
        let graph = build_graph(&parse_objects(text));
        let options = AnalysisOptions {
            extract_shared_values: false,
            ..Default::default()
        };
        let output = GraphAnalyzer::with_options(options).analyze(&graph);
        let Statement::Event(event) = &output.statements[0] else {
            panic!("expected event");
        };
        let Statement::Assignment(assignment) = &event.body[0] else {
            panic!("expected assignment, got {:?}", event.body[0]);
        };

        let Expression::FunctionCall(grow) = &assignment.value else {
            panic!("expected call, got {:?}", assignment.value);
        };
        assert_eq!(grow.function, "Grow");
        let Expression::FunctionCall(shrink) = &grow.arguments[0].value else {
            panic!("expected nested call, got {:?}", grow.arguments[0].value);
        };
        assert_eq!(shrink.function, "Shrink");
        assert!(matches!(
            &shrink.arguments[0].value,
            Expression::Unsupported(u) if u.reason == UnsupportedReason::DataCycle
        ));
        assert!(output.diagnostics.iter().any(|d| d.message.contains("Data cycle")));
    }

    #[test]
    fn test_exec_fan_out_follows_first_link() {
        let text = r#"Begin Object Class=/Script/BlueprintGraph.K2Node_Event Name="K2Node_Event_0"
   EventReference=(MemberName="ReceiveBeginPlay")
   NodeGuid=EVT
   CustomProperties Pin (PinId=E_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_0 A_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_0"
   FunctionReference=(MemberName="Open")
   NodeGuid=A
   CustomProperties Pin (PinId=A_EXEC,PinName="execute",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=A_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_1 B_EXEC,K2Node_CallFunction_2 C_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_1"
   FunctionReference=(MemberName="Announce")
   NodeGuid=B
   CustomProperties Pin (PinId=B_EXEC,PinName="execute",PinType.PinCategory="exec")
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_2"
   FunctionReference=(MemberName="Ignored")
   NodeGuid=C
   CustomProperties Pin (PinId=C_EXEC,PinName="execute",PinType.PinCategory="exec")
End Object
"#;
        let graph = build_graph(&parse_objects(text));
        let output = GraphAnalyzer::new().analyze(&graph);
        let Statement::Event(event) = &output.statements[0] else {
            panic!("expected event");
        };
        let called: Vec<&str> = event
            .body
            .iter()
            .map(|s| match s {
                Statement::FunctionCall(call) => call.function.as_str(),
                other => panic!("expected call, got {:?}", other),
            })
            .collect();
        assert_eq!(called, vec!["Open", "Announce"]);

        let fan_out: Vec<_> = output
            .diagnostics
            .iter()
            .filter(|d| d.message.contains("fans out"))
            .collect();
        assert_eq!(fan_out.len(), 1);
        assert_eq!(fan_out[0].node_guid.as_deref(), Some("A"));
    }
}
