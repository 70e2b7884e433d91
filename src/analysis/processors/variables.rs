//! Variable reads and writes.

use super::{is_target_pin, NodeProcessingResult, NodeProcessor, ProcessorRegistry};
use crate::analysis::analyzer::GraphAnalyzer;
use crate::analysis::context::AnalysisContext;
use crate::ast::{
    AssignmentNode, AssignmentOperator, Expression, PropertyAccessExpression, SourceLocation,
    Statement, UnsupportedReason,
};
use crate::graph::{GraphNode, GraphPin, MemberReference, PinRef};
use std::sync::Arc;

pub fn register(registry: &mut ProcessorRegistry) {
    registry.register(&["K2Node_VariableSet"], Arc::new(VariableSetProcessor));
    registry.register(&["K2Node_VariableGet"], Arc::new(VariableGetProcessor));
}

/// `self.Name`, `other.Name` or a local `Name`
fn variable_expression<'g>(
    analyzer: &GraphAnalyzer,
    cx: &mut AnalysisContext<'g>,
    node: &'g GraphNode,
    reference: &MemberReference,
) -> Expression {
    let owner = node.data_inputs().find(|p| is_target_pin(p) && p.is_linked());
    match owner {
        Some(pin) if !reference.self_context => {
            Expression::PropertyAccess(PropertyAccessExpression {
                base: Box::new(analyzer.resolve_input(cx, pin)),
                path: reference.name.clone(),
            })
        }
        _ => Expression::variable(reference.name.clone(), reference.self_context),
    }
}

fn missing_reference(node: &GraphNode) -> Expression {
    Expression::unsupported(
        UnsupportedReason::Unrecognized,
        format!("{} has no variable reference", node.node_name),
        Some(SourceLocation::of(node)),
    )
}

pub struct VariableSetProcessor;

impl NodeProcessor for VariableSetProcessor {
    fn name(&self) -> &'static str {
        "variable_set"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let Some(reference) = node.member_reference() else {
            return super::fallback::fallback_statement(analyzer, cx, node);
        };

        let target = variable_expression(analyzer, cx, node, &reference);
        let value_pin = node
            .data_inputs()
            .find(|p| p.pin_name == reference.name)
            .or_else(|| node.data_inputs().find(|p| !is_target_pin(p)));
        let value = match value_pin {
            Some(pin) => analyzer.resolve_input(cx, pin),
            None => Expression::unsupported(
                UnsupportedReason::NoValue,
                format!("{} has no value input", node.node_name),
                Some(SourceLocation::of(node)),
            ),
        };

        // The pass-through output reads the freshly assigned variable
        for pin in node.data_outputs() {
            cx.bind_pin(PinRef::new(&node.node_guid, &pin.pin_id), target.clone());
        }

        NodeProcessingResult::then(Statement::Assignment(AssignmentNode {
            target,
            value,
            operator: AssignmentOperator::Assign,
            is_local: reference.scope.is_some(),
            location: SourceLocation::of(node),
        }))
    }

    fn process_expression<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        _output: &'g GraphPin,
    ) -> Expression {
        match node.member_reference() {
            Some(reference) => variable_expression(analyzer, cx, node, &reference),
            None => missing_reference(node),
        }
    }
}

pub struct VariableGetProcessor;

impl NodeProcessor for VariableGetProcessor {
    fn name(&self) -> &'static str {
        "variable_get"
    }

    fn process_expression<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        _output: &'g GraphPin,
    ) -> Expression {
        match node.member_reference() {
            Some(reference) => variable_expression(analyzer, cx, node, &reference),
            None => missing_reference(node),
        }
    }
}
