//! Loop macros from the engine's standard macro library.

use super::calls::not_yet_evaluated;
use super::{to_snake_case, NodeProcessingResult, NodeProcessor, ProcessorRegistry};
use crate::analysis::analyzer::GraphAnalyzer;
use crate::analysis::context::AnalysisContext;
use crate::ast::{
    Expression, LoopKind, LoopNode, LoopVariableExpression, Parameter, SourceLocation, Statement,
};
use crate::graph::{GraphNode, GraphPin, PinRef};
use std::sync::Arc;

pub fn register(registry: &mut ProcessorRegistry) {
    let macros: [(&'static str, LoopKind, bool); 6] = [
        ("K2Node_MacroInstance:ForEachLoop", LoopKind::ForEach, false),
        ("K2Node_MacroInstance:ForEachLoopWithBreak", LoopKind::ForEach, true),
        ("K2Node_MacroInstance:ReverseForEachLoop", LoopKind::ReverseForEach, false),
        ("K2Node_MacroInstance:WhileLoop", LoopKind::While, false),
        ("K2Node_MacroInstance:ForLoop", LoopKind::For, false),
        ("K2Node_MacroInstance:ForLoopWithBreak", LoopKind::For, true),
    ];
    for (key, kind, breakable) in macros {
        registry.register(&[key], Arc::new(LoopProcessor { kind, breakable }));
    }
}

pub struct LoopProcessor {
    kind: LoopKind,
    breakable: bool,
}

impl NodeProcessor for LoopProcessor {
    fn name(&self) -> &'static str {
        "loop"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let source = analyzer.collect_arguments(cx, node, &[]);
        let location = SourceLocation::of(node);

        let mut variables = Vec::new();
        let mut bindings = Vec::new();
        for pin in node.data_outputs() {
            let name = cx.unique_name(&to_snake_case(&pin.pin_name));
            bindings.push((
                PinRef::new(&node.node_guid, &pin.pin_id),
                Expression::LoopVariable(LoopVariableExpression {
                    name: name.clone(),
                    loop_location: location.clone(),
                }),
            ));
            variables.push(Parameter::new(name, Some(pin.type_name())));
        }

        let body = match node.output("LoopBody").filter(|p| p.is_exec()) {
            Some(pin) => analyzer.walk_body(cx, pin, bindings),
            None => Vec::new(),
        };

        let completed = node.output("Completed").filter(|p| p.is_exec());
        NodeProcessingResult::resume_at(
            Statement::Loop(LoopNode {
                kind: self.kind,
                source,
                variables,
                body,
                breakable: self.breakable,
                location,
            }),
            node,
            completed,
        )
    }

    fn process_expression<'g>(
        &self,
        _analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        output: &'g GraphPin,
    ) -> Expression {
        // Loop variables only exist inside the loop body
        not_yet_evaluated(cx, node, output)
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::GraphAnalyzer;
    use crate::ast::{Expression, LoopKind, Statement};
    use crate::graph::build_graph;
    use crate::parser::parse_objects;

    const FOR_EACH: &str = r#"Begin Object Class=/Script/BlueprintGraph.K2Node_Event Name="K2Node_Event_0"
   EventReference=(MemberName="ReceiveBeginPlay")
   NodeGuid=EVT
   CustomProperties Pin (PinId=E_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_MacroInstance_0 L_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_MacroInstance Name="K2Node_MacroInstance_0"
   MacroGraphReference=(MacroGraph="/Script/Engine.EdGraph'/Engine/EditorBlueprintResources/StandardMacros.StandardMacros:ForEachLoopWithBreak'")
   NodeGuid=LOOP
   CustomProperties Pin (PinId=L_EXEC,PinName="Exec",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=L_ARR,PinName="Array",PinType.PinCategory="object",PinType.ContainerType=Array)
   CustomProperties Pin (PinId=L_BRK,PinName="Break",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=L_BODY,PinName="LoopBody",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_0 A_EXEC,))
   CustomProperties Pin (PinId=L_ELEM,PinName="Array Element",Direction="EGPD_Output",PinType.PinCategory="object",LinkedTo=(K2Node_CallFunction_0 A_SELF,))
   CustomProperties Pin (PinId=L_IDX,PinName="Array Index",Direction="EGPD_Output",PinType.PinCategory="int")
   CustomProperties Pin (PinId=L_DONE,PinName="Completed",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_1 B_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_0"
   FunctionReference=(MemberName="Open")
   NodeGuid=A
   CustomProperties Pin (PinId=A_EXEC,PinName="execute",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=A_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_MacroInstance_0 L_BRK,))
   CustomProperties Pin (PinId=A_SELF,PinName="self",PinType.PinCategory="object")
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_1"
   FunctionReference=(MemberName="Done")
   NodeGuid=B
   CustomProperties Pin (PinId=B_EXEC,PinName="execute",PinType.PinCategory="exec")
End Object
"#;

    #[test]
    fn test_for_each_with_break() {
        let graph = build_graph(&parse_objects(FOR_EACH));
        let output = GraphAnalyzer::new().analyze(&graph);
        let Statement::Event(event) = &output.statements[0] else {
            panic!("expected event");
        };
        assert_eq!(event.body.len(), 2);

        let Statement::Loop(lp) = &event.body[0] else {
            panic!("expected loop, got {:?}", event.body[0]);
        };
        assert_eq!(lp.kind, LoopKind::ForEach);
        assert!(lp.breakable);
        assert_eq!(lp.source[0].name, "Array");
        let names: Vec<&str> = lp.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["array_element", "array_index"]);

        let Statement::FunctionCall(open) = &lp.body[0] else {
            panic!("expected call");
        };
        assert!(matches!(
            &open.target,
            Some(Expression::LoopVariable(v)) if v.name == "array_element"
        ));
        assert!(matches!(lp.body[1], Statement::Break(_)));

        let Statement::FunctionCall(done) = &event.body[1] else {
            panic!("expected call after loop");
        };
        assert_eq!(done.function, "Done");
    }

    const WHILE_LOOP: &str = r#"Begin Object Class=/Script/BlueprintGraph.K2Node_Event Name="K2Node_Event_0"
   EventReference=(MemberName="ReceiveBeginPlay")
   NodeGuid=EVT
   CustomProperties Pin (PinId=E_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_MacroInstance_0 L_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_VariableGet Name="K2Node_VariableGet_0"
   VariableReference=(MemberName="bRunning",bSelfContext=True)
   NodeGuid=RUNNING
   CustomProperties Pin (PinId=R_OUT,PinName="bRunning",Direction="EGPD_Output",PinType.PinCategory="bool",LinkedTo=(K2Node_MacroInstance_0 L_COND,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_MacroInstance Name="K2Node_MacroInstance_0"
   MacroGraphReference=(MacroGraph="/Script/Engine.EdGraph'/Engine/EditorBlueprintResources/StandardMacros.StandardMacros:WhileLoop'")
   NodeGuid=LOOP
   CustomProperties Pin (PinId=L_EXEC,PinName="Exec",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=L_COND,PinName="Condition",PinType.PinCategory="bool")
   CustomProperties Pin (PinId=L_BODY,PinName="LoopBody",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_0 A_EXEC,))
   CustomProperties Pin (PinId=L_DONE,PinName="Completed",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_1 B_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_0"
   FunctionReference=(MemberName="Step")
   NodeGuid=A
   CustomProperties Pin (PinId=A_EXEC,PinName="execute",PinType.PinCategory="exec")
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_1"
   FunctionReference=(MemberName="Finish")
   NodeGuid=B
   CustomProperties Pin (PinId=B_EXEC,PinName="execute",PinType.PinCategory="exec")
End Object
"#;

    #[test]
    fn test_while_loop_condition_and_completion() {
        let graph = build_graph(&parse_objects(WHILE_LOOP));
        let output = GraphAnalyzer::new().analyze(&graph);
        let Statement::Event(event) = &output.statements[0] else {
            panic!("expected event");
        };
        assert_eq!(event.body.len(), 2);

        let Statement::Loop(lp) = &event.body[0] else {
            panic!("expected loop, got {:?}", event.body[0]);
        };
        assert_eq!(lp.kind, LoopKind::While);
        assert!(!lp.breakable);
        assert!(lp.variables.is_empty());
        assert_eq!(lp.source.len(), 1);
        assert_eq!(lp.source[0].name, "Condition");
        assert_eq!(lp.source[0].value, Expression::variable("bRunning", true));
        assert!(matches!(&lp.body[0], Statement::FunctionCall(c) if c.function == "Step"));
        assert!(matches!(&event.body[1], Statement::FunctionCall(c) if c.function == "Finish"));
    }

    const FOR_LOOP: &str = r#"Begin Object Class=/Script/BlueprintGraph.K2Node_Event Name="K2Node_Event_0"
   EventReference=(MemberName="ReceiveBeginPlay")
   NodeGuid=EVT
   CustomProperties Pin (PinId=E_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_MacroInstance_0 L_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_MacroInstance Name="K2Node_MacroInstance_0"
   MacroGraphReference=(MacroGraph="/Script/Engine.EdGraph'/Engine/EditorBlueprintResources/StandardMacros.StandardMacros:ForLoop'")
   NodeGuid=LOOP
   CustomProperties Pin (PinId=L_EXEC,PinName="Exec",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=L_FIRST,PinName="FirstIndex",PinType.PinCategory="int",DefaultValue="0")
   CustomProperties Pin (PinId=L_LAST,PinName="LastIndex",PinType.PinCategory="int",DefaultValue="9")
   CustomProperties Pin (PinId=L_BODY,PinName="LoopBody",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_0 A_EXEC,))
   CustomProperties Pin (PinId=L_IDX,PinName="Index",Direction="EGPD_Output",PinType.PinCategory="int",LinkedTo=(K2Node_CallFunction_0 A_VAL,))
   CustomProperties Pin (PinId=L_DONE,PinName="Completed",Direction="EGPD_Output",PinType.PinCategory="exec")
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_0"
   FunctionReference=(MemberName="ShowSlot")
   NodeGuid=A
   CustomProperties Pin (PinId=A_EXEC,PinName="execute",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=A_VAL,PinName="Slot",PinType.PinCategory="int")
End Object
"#;

    #[test]
    fn test_for_loop_binds_index() {
        let graph = build_graph(&parse_objects(FOR_LOOP));
        let output = GraphAnalyzer::new().analyze(&graph);
        let Statement::Event(event) = &output.statements[0] else {
            panic!("expected event");
        };
        assert_eq!(event.body.len(), 1);

        let Statement::Loop(lp) = &event.body[0] else {
            panic!("expected loop, got {:?}", event.body[0]);
        };
        assert_eq!(lp.kind, LoopKind::For);
        assert!(!lp.breakable);
        let bounds: Vec<&str> = lp.source.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(bounds, vec!["FirstIndex", "LastIndex"]);
        let names: Vec<&str> = lp.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["index"]);

        let Statement::FunctionCall(show) = &lp.body[0] else {
            panic!("expected call, got {:?}", lp.body[0]);
        };
        assert_eq!(show.arguments[0].name, "Slot");
        assert!(matches!(
            &show.arguments[0].value,
            Expression::LoopVariable(v) if v.name == "index"
        ));
    }
}
