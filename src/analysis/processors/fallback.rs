//! Last tier: keep unknown nodes verbatim instead of dropping them.

use super::{NodeProcessingResult, NodeProcessor};
use crate::analysis::analyzer::GraphAnalyzer;
use crate::analysis::context::AnalysisContext;
use crate::ast::{Expression, FallbackNode, SourceLocation, Statement, UnsupportedReason};
use crate::error::Diagnostic;
use crate::graph::{GraphNode, GraphPin};

pub struct FallbackProcessor;

impl NodeProcessor for FallbackProcessor {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        fallback_statement(analyzer, cx, node)
    }

    fn process_expression<'g>(
        &self,
        _analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        output: &'g GraphPin,
    ) -> Expression {
        tracing::warn!(
            "[ANALYZER] No expression form for {} ({})",
            node.node_name,
            node.class_type
        );
        cx.report(Diagnostic::warning(
            Some(&node.node_guid),
            format!("Unrecognized node '{}' read as a value", node.short_class()),
        ));
        Expression::unsupported(
            UnsupportedReason::Unrecognized,
            format!("{}.{}", node.short_class(), output.pin_name),
            Some(SourceLocation::of(node)),
        )
    }
}

/// Record `node` with every property, its resolved inputs and its exits.
///
/// Traversal continues through the node's `then`-style pin when it has one.
pub fn fallback_statement<'g>(
    analyzer: &GraphAnalyzer,
    cx: &mut AnalysisContext<'g>,
    node: &'g GraphNode,
) -> NodeProcessingResult {
    tracing::warn!("[ANALYZER] Unrecognized node {} ({})", node.node_name, node.class_type);
    cx.report(Diagnostic::warning(
        Some(&node.node_guid),
        format!("No processor for '{}', kept verbatim", node.class_type),
    ));

    let properties = node
        .properties
        .iter()
        .map(|(key, value)| (key.clone(), value.to_source()))
        .collect();
    let inputs = analyzer.collect_arguments(cx, node, &[]);
    let exits = analyzer.exit_branches(cx, node, &[]);

    NodeProcessingResult::then(Statement::Fallback(FallbackNode {
        node_type: node.class_type.clone(),
        node_name: node.node_name.clone(),
        properties,
        inputs,
        exits,
        location: SourceLocation::of(node),
    }))
}

#[cfg(test)]
mod tests {
    use crate::analysis::GraphAnalyzer;
    use crate::ast::{Expression, Statement};
    use crate::graph::build_graph;
    use crate::parser::parse_objects;

    #[test]
    fn test_unknown_node_kept_verbatim() {
        let text = r#"Begin Object Class=/Script/BlueprintGraph.K2Node_Event Name="K2Node_Event_0"
   EventReference=(MemberName="ReceiveBeginPlay")
   NodeGuid=EVT
   CustomProperties Pin (PinId=E_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_Mystery_0 M_IN,))
End Object
Begin Object Class=/Script/MyPlugin.K2Node_Mystery Name="K2Node_Mystery_0"
   Strength=5
   Label="Odd"
   NodeGuid=MYS
   CustomProperties Pin (PinId=M_IN,PinName="In",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=M_OUT,PinName="Out",Direction="EGPD_Output",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=M_AMT,PinName="Amount",PinType.PinCategory="int",DefaultValue="3")
End Object
"#;
        let graph = build_graph(&parse_objects(text));
        let output = GraphAnalyzer::new().analyze(&graph);
        let Statement::Event(event) = &output.statements[0] else {
            panic!("expected event");
        };
        let Statement::Fallback(fallback) = &event.body[0] else {
            panic!("expected fallback, got {:?}", event.body[0]);
        };
        assert_eq!(fallback.node_type, "/Script/MyPlugin.K2Node_Mystery");
        assert!(fallback.properties.contains(&("Strength".to_string(), "5".to_string())));
        assert!(fallback.properties.contains(&("Label".to_string(), "\"Odd\"".to_string())));
        assert_eq!(fallback.inputs.len(), 1);
        assert!(matches!(fallback.inputs[0].value, Expression::Literal(_)));
        assert!(output
            .diagnostics
            .iter()
            .any(|d| d.node_guid.as_deref() == Some("MYS")));
    }
}
