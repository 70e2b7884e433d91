//! Second tier: call-shaped nodes nobody registered a processor for.
//!
//! A node qualifies when it has an `execute`-style input or a `then`-style
//! output and names a member it calls. Engine plugins add node kinds all the
//! time; most of them are just function calls with extra exec exits.

use super::calls::{call_parts, not_yet_evaluated, pure_call_expression};
use super::{kind_label, NodeProcessingResult, NodeProcessor};
use crate::analysis::analyzer::GraphAnalyzer;
use crate::analysis::context::AnalysisContext;
use crate::ast::{Expression, GenericCallNode, SourceLocation, Statement};
use crate::graph::{GraphNode, GraphPin};

/// Pin pattern plus member reference
pub fn is_generic_callable(node: &GraphNode) -> bool {
    let has_exec_shape = node.execute_pin().is_some() || node.then_pin().is_some();
    has_exec_shape && node.member_reference().is_some()
}

pub struct GenericCallProcessor;

impl NodeProcessor for GenericCallProcessor {
    fn name(&self) -> &'static str {
        "generic_call"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let (target, function, arguments) = call_parts(analyzer, cx, node);
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
        if node.is_pure() {
            pure_call_expression(analyzer, cx, node, output)
        } else {
            not_yet_evaluated(cx, node, output)
        }
    }
}
