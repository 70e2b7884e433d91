//! Multicast delegate binding, unbinding and broadcast.

use super::{NodeProcessingResult, NodeProcessor, ProcessorRegistry};
use crate::analysis::analyzer::GraphAnalyzer;
use crate::analysis::context::AnalysisContext;
use crate::ast::{
    EventReferenceExpression, EventSubscriptionNode, Expression, FunctionCallNode,
    PropertyAccessExpression, SourceLocation, Statement, SubscriptionOperator,
};
use crate::graph::{GraphNode, GraphPin};
use std::sync::Arc;

pub fn register(registry: &mut ProcessorRegistry) {
    registry.register(
        &["K2Node_AssignDelegate", "K2Node_AddDelegate"],
        Arc::new(SubscriptionProcessor {
            operator: SubscriptionOperator::Add,
        }),
    );
    registry.register(
        &["K2Node_RemoveDelegate"],
        Arc::new(SubscriptionProcessor {
            operator: SubscriptionOperator::Remove,
        }),
    );
    registry.register(
        &["K2Node_ClearDelegate"],
        Arc::new(SubscriptionProcessor {
            operator: SubscriptionOperator::Clear,
        }),
    );
    registry.register(&["K2Node_CallDelegate"], Arc::new(CallDelegateProcessor));
    registry.register(&["K2Node_CreateDelegate"], Arc::new(CreateDelegateProcessor));
}

/// `Button.OnClicked`, or `OnClicked` on self
fn delegate_expression<'g>(
    analyzer: &GraphAnalyzer,
    cx: &mut AnalysisContext<'g>,
    node: &'g GraphNode,
) -> Expression {
    let name = node
        .member_reference()
        .map(|r| r.name)
        .unwrap_or_else(|| node.node_name.clone());
    match analyzer.resolve_target(cx, node) {
        Some(owner) => Expression::PropertyAccess(PropertyAccessExpression {
            base: Box::new(owner),
            path: name,
        }),
        None => Expression::variable(name, true),
    }
}

pub struct SubscriptionProcessor {
    operator: SubscriptionOperator,
}

impl NodeProcessor for SubscriptionProcessor {
    fn name(&self) -> &'static str {
        "delegate_subscription"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let delegate = delegate_expression(analyzer, cx, node);
        let handler = match self.operator {
            SubscriptionOperator::Clear => None,
            _ => Some(analyzer.resolve_named_input(cx, node, "Delegate")),
        };
        NodeProcessingResult::then(Statement::EventSubscription(EventSubscriptionNode {
            delegate,
            handler,
            operator: self.operator,
            location: SourceLocation::of(node),
        }))
    }
}

/// Broadcast to every bound handler
pub struct CallDelegateProcessor;

impl NodeProcessor for CallDelegateProcessor {
    fn name(&self) -> &'static str {
        "call_delegate"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let delegate = delegate_expression(analyzer, cx, node);
        let arguments = analyzer.collect_arguments(cx, node, &[]);
        NodeProcessingResult::then(Statement::FunctionCall(FunctionCallNode {
            target: Some(delegate),
            function: "Broadcast".to_string(),
            arguments,
            return_bindings: Vec::new(),
            location: SourceLocation::of(node),
        }))
    }
}

/// Delegate bound to a named function
pub struct CreateDelegateProcessor;

impl NodeProcessor for CreateDelegateProcessor {
    fn name(&self) -> &'static str {
        "create_delegate"
    }

    fn process_expression<'g>(
        &self,
        _analyzer: &GraphAnalyzer,
        _cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        _output: &'g GraphPin,
    ) -> Expression {
        let event_name = node
            .property_str("SelectedFunctionName")
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| node.node_name.clone());
        Expression::EventReference(EventReferenceExpression {
            event_name,
            location: SourceLocation::of(node),
        })
    }
}
