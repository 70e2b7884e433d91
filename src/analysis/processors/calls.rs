//! Function calls, object construction and function results.

use super::{clean_member_name, kind_label, NodeProcessingResult, NodeProcessor, ProcessorRegistry};
use crate::analysis::analyzer::GraphAnalyzer;
use crate::analysis::context::AnalysisContext;
use crate::ast::{
    Argument, Expression, FunctionCallExpression, FunctionCallNode, GenericCallNode,
    PropertyAccessExpression, ReturnNode, SourceLocation, Statement, UnsupportedReason,
};
use crate::error::Diagnostic;
use crate::graph::{GraphNode, GraphPin};
use std::sync::Arc;

pub fn register(registry: &mut ProcessorRegistry) {
    registry.register(
        &[
            "K2Node_CallFunction",
            "K2Node_CallParentFunction",
            "K2Node_CallArrayFunction",
            "K2Node_CommutativeAssociativeBinaryOperator",
            "K2Node_PromotableOperator",
            "K2Node_CallMaterialParameterCollectionFunction",
        ],
        Arc::new(CallFunctionProcessor),
    );
    registry.register(
        &[
            "K2Node_SpawnActorFromClass",
            "K2Node_CreateWidget",
            "K2Node_ConstructObjectFromClass",
        ],
        Arc::new(ConstructProcessor),
    );
    registry.register(&["K2Node_FunctionResult"], Arc::new(FunctionResultProcessor));
    registry.register(&["K2Node_MacroInstance"], Arc::new(MacroInstanceProcessor));
}

/// Target, function name and arguments of a call node
pub(crate) fn call_parts<'g>(
    analyzer: &GraphAnalyzer,
    cx: &mut AnalysisContext<'g>,
    node: &'g GraphNode,
) -> (Option<Expression>, String, Vec<Argument>) {
    let function = node
        .member_reference()
        .map(|r| clean_member_name(&r.name).to_string())
        .unwrap_or_else(|| kind_label(node).to_string());

    match node.short_class() {
        "K2Node_CallArrayFunction" => {
            let target = analyzer.resolve_named_input(cx, node, "TargetArray");
            let arguments = analyzer.collect_arguments(cx, node, &["TargetArray"]);
            (Some(target), function, arguments)
        }
        "K2Node_CallParentFunction" => {
            let arguments = analyzer.collect_arguments(cx, node, &[]);
            (Some(Expression::variable("super", false)), function, arguments)
        }
        _ => {
            let target = analyzer.resolve_target(cx, node);
            let arguments = analyzer.collect_arguments(cx, node, &[]);
            (target, function, arguments)
        }
    }
}

/// Value of `output` on a node without execution pins.
///
/// Single-output calls are the call itself; other outputs read a field of it.
pub(crate) fn pure_call_expression<'g>(
    analyzer: &GraphAnalyzer,
    cx: &mut AnalysisContext<'g>,
    node: &'g GraphNode,
    output: &'g GraphPin,
) -> Expression {
    let (target, function, arguments) = call_parts(analyzer, cx, node);
    let call = Expression::FunctionCall(FunctionCallExpression {
        target: target.map(Box::new),
        function,
        arguments,
        location: SourceLocation::of(node),
    });

    if node.data_outputs().count() > 1 && output.pin_name != "ReturnValue" {
        Expression::PropertyAccess(PropertyAccessExpression {
            base: Box::new(call),
            path: output.pin_name.clone(),
        })
    } else {
        call
    }
}

/// Output of an executed node read before the node ran on this path
pub(crate) fn not_yet_evaluated(
    cx: &mut AnalysisContext<'_>,
    node: &GraphNode,
    output: &GraphPin,
) -> Expression {
    cx.report(Diagnostic::warning(
        Some(&node.node_guid),
        format!("'{}.{}' is read before its node executes", node.node_name, output.pin_name),
    ));
    Expression::unsupported(
        UnsupportedReason::NotYetEvaluated,
        format!("{}.{}", node.node_name, output.pin_name),
        Some(SourceLocation::of(node)),
    )
}

pub struct CallFunctionProcessor;

impl NodeProcessor for CallFunctionProcessor {
    fn name(&self) -> &'static str {
        "call_function"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let (target, function, arguments) = call_parts(analyzer, cx, node);
        let return_bindings = analyzer.bind_results(cx, node, &function);
        NodeProcessingResult::then(Statement::FunctionCall(FunctionCallNode {
            target,
            function,
            arguments,
            return_bindings,
            location: SourceLocation::of(node),
        }))
    }

    fn process_expression<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        output: &'g GraphPin,
    ) -> Expression {
        if node.is_pure() {
            pure_call_expression(analyzer, cx, node, output)
        } else {
            not_yet_evaluated(cx, node, output)
        }
    }
}

/// `SpawnActorFromClass`, `CreateWidget`, `ConstructObjectFromClass`
pub struct ConstructProcessor;

impl ConstructProcessor {
    fn function_name(node: &GraphNode) -> &'static str {
        match node.short_class() {
            "K2Node_SpawnActorFromClass" => "SpawnActor",
            "K2Node_CreateWidget" => "CreateWidget",
            _ => "ConstructObject",
        }
    }
}

impl NodeProcessor for ConstructProcessor {
    fn name(&self) -> &'static str {
        "construct"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let function = Self::function_name(node);
        let arguments = analyzer.collect_arguments(cx, node, &[]);
        let return_bindings = analyzer.bind_results(cx, node, function);
        NodeProcessingResult::then(Statement::FunctionCall(FunctionCallNode {
            target: None,
            function: function.to_string(),
            arguments,
            return_bindings,
            location: SourceLocation::of(node),
        }))
    }

    fn process_expression<'g>(
        &self,
        _analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        output: &'g GraphPin,
    ) -> Expression {
        not_yet_evaluated(cx, node, output)
    }
}

pub struct FunctionResultProcessor;

impl NodeProcessor for FunctionResultProcessor {
    fn name(&self) -> &'static str {
        "function_result"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let values = analyzer.collect_arguments(cx, node, &[]);
        NodeProcessingResult::end(Statement::Return(ReturnNode {
            values,
            location: SourceLocation::of(node),
        }))
    }
}

/// Macro instances without a dedicated processor
pub struct MacroInstanceProcessor;

impl NodeProcessor for MacroInstanceProcessor {
    fn name(&self) -> &'static str {
        "macro_instance"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let function = node.macro_name().unwrap_or_else(|| node.node_name.clone());
        let target = analyzer.resolve_target(cx, node);
        let arguments = analyzer.collect_arguments(cx, node, &[]);
        let return_bindings = analyzer.bind_results(cx, node, &function);
        let exits = analyzer.exit_branches(cx, node, &[]);
        NodeProcessingResult::then(Statement::GenericCall(GenericCallNode {
            node_type: kind_label(node).to_string(),
            target,
            function,
            arguments,
            return_bindings,
            exits,
            location: SourceLocation::of(node),
        }))
    }

    fn process_expression<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        output: &'g GraphPin,
    ) -> Expression {
        if !node.is_pure() {
            return not_yet_evaluated(cx, node, output);
        }
        let function = node.macro_name().unwrap_or_else(|| node.node_name.clone());
        let arguments = analyzer.collect_arguments(cx, node, &[]);
        let call = Expression::FunctionCall(FunctionCallExpression {
            target: None,
            function,
            arguments,
            location: SourceLocation::of(node),
        });
        if node.data_outputs().count() > 1 {
            Expression::PropertyAccess(PropertyAccessExpression {
                base: Box::new(call),
                path: output.pin_name.clone(),
            })
        } else {
            call
        }
    }
}
