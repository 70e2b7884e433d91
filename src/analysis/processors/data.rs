//! Pure data nodes: reroutes, `self`, literals, arrays, structs, select and math.

use super::{Continuation, NodeProcessingResult, NodeProcessor, ProcessorRegistry};
use crate::analysis::analyzer::GraphAnalyzer;
use crate::analysis::context::AnalysisContext;
use crate::ast::{
    Argument, Expression, FunctionCallExpression, LiteralValue, PropertyAccessExpression,
    SourceLocation, UnsupportedReason,
};
use crate::graph::{object_display_name, GraphNode, GraphPin, PinRef};
use std::sync::Arc;

pub fn register(registry: &mut ProcessorRegistry) {
    registry.register(&["K2Node_Knot"], Arc::new(KnotProcessor));
    registry.register(&["K2Node_Self"], Arc::new(SelfProcessor));
    registry.register(&["K2Node_Literal"], Arc::new(LiteralProcessor));
    registry.register(&["K2Node_GetArrayItem"], Arc::new(ArrayItemProcessor));
    registry.register(&["K2Node_BreakStruct"], Arc::new(BreakStructProcessor));
    registry.register(
        &["K2Node_MakeArray", "K2Node_MakeStruct", "K2Node_Select", "K2Node_MathExpression"],
        Arc::new(ConstructValueProcessor),
    );
}

fn call(
    node: &GraphNode,
    target: Option<Expression>,
    function: String,
    arguments: Vec<Argument>,
) -> Expression {
    Expression::FunctionCall(FunctionCallExpression {
        target: target.map(Box::new),
        function,
        arguments,
        location: SourceLocation::of(node),
    })
}

/// Reroute node. Invisible in both execution and data flow.
pub struct KnotProcessor;

impl NodeProcessor for KnotProcessor {
    fn name(&self) -> &'static str {
        "knot"
    }

    fn process_statement<'g>(
        &self,
        _analyzer: &GraphAnalyzer,
        _cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        NodeProcessingResult {
            statement: None,
            continuation: match node.exec_outputs().next() {
                Some(pin) => Continuation::Pin(PinRef::new(&node.node_guid, &pin.pin_id)),
                None => Continuation::End,
            },
        }
    }

    fn process_expression<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        _output: &'g GraphPin,
    ) -> Expression {
        match node.data_inputs().next() {
            Some(input) => analyzer.resolve_input(cx, input),
            None => Expression::unsupported(
                UnsupportedReason::NoValue,
                format!("{} has no input", node.node_name),
                Some(SourceLocation::of(node)),
            ),
        }
    }
}

pub struct SelfProcessor;

impl NodeProcessor for SelfProcessor {
    fn name(&self) -> &'static str {
        "self"
    }

    fn process_expression<'g>(
        &self,
        _analyzer: &GraphAnalyzer,
        _cx: &mut AnalysisContext<'g>,
        _node: &'g GraphNode,
        _output: &'g GraphPin,
    ) -> Expression {
        Expression::variable("self", false)
    }
}

/// Object literal placed in a level blueprint
pub struct LiteralProcessor;

impl NodeProcessor for LiteralProcessor {
    fn name(&self) -> &'static str {
        "literal"
    }

    fn process_expression<'g>(
        &self,
        _analyzer: &GraphAnalyzer,
        _cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        output: &'g GraphPin,
    ) -> Expression {
        let value = match node.property_str("ObjectRef") {
            Some(path) if path != "None" => LiteralValue::Object(object_display_name(path)),
            _ => LiteralValue::Raw("None".to_string()),
        };
        Expression::literal(value, Some(output.type_name()))
    }
}

/// `Array[Index]`, rendered as a `Get` call on the array
pub struct ArrayItemProcessor;

impl NodeProcessor for ArrayItemProcessor {
    fn name(&self) -> &'static str {
        "array_item"
    }

    fn process_expression<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        _output: &'g GraphPin,
    ) -> Expression {
        let mut arguments = analyzer.collect_arguments(cx, node, &[]);
        let target = if arguments.is_empty() {
            None
        } else {
            Some(arguments.remove(0).value)
        };
        call(node, target, "Get".to_string(), arguments)
    }
}

/// Reads one field of a struct value
pub struct BreakStructProcessor;

impl NodeProcessor for BreakStructProcessor {
    fn name(&self) -> &'static str {
        "break_struct"
    }

    fn process_expression<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        output: &'g GraphPin,
    ) -> Expression {
        let base = match node.data_inputs().next() {
            Some(input) => analyzer.resolve_input(cx, input),
            None => Expression::unsupported(
                UnsupportedReason::NoValue,
                format!("{} has no struct input", node.node_name),
                Some(SourceLocation::of(node)),
            ),
        };
        Expression::PropertyAccess(PropertyAccessExpression {
            base: Box::new(base),
            path: output.pin_name.clone(),
        })
    }
}

/// Nodes that build a value from their inputs: `MakeArray`, `Make<Struct>`,
/// `Select` and collapsed math expressions
pub struct ConstructValueProcessor;

impl ConstructValueProcessor {
    fn function_name(node: &GraphNode) -> String {
        match node.short_class() {
            "K2Node_MakeStruct" => {
                let struct_type = node
                    .property_str("StructType")
                    .map(object_display_name)
                    .unwrap_or_else(|| "Struct".to_string());
                format!("Make{}", struct_type)
            }
            "K2Node_Select" => "Select".to_string(),
            "K2Node_MathExpression" => "Math".to_string(),
            _ => "MakeArray".to_string(),
        }
    }
}

impl NodeProcessor for ConstructValueProcessor {
    fn name(&self) -> &'static str {
        "construct_value"
    }

    fn process_expression<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        _output: &'g GraphPin,
    ) -> Expression {
        let mut arguments = Vec::new();
        if let Some(formula) = node.property_str("Expression") {
            arguments.push(Argument::new(
                "Expression",
                Expression::literal(LiteralValue::String(formula.to_string()), None),
            ));
        }
        arguments.extend(analyzer.collect_arguments(cx, node, &[]));
        call(node, None, Self::function_name(node), arguments)
    }
}
