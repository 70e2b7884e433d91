//! Branching flow control: branch, sequence, cast, switch and `IsValid`.

use super::calls::not_yet_evaluated;
use super::{to_snake_case, NodeProcessingResult, NodeProcessor, ProcessorRegistry};
use crate::analysis::analyzer::GraphAnalyzer;
use crate::analysis::context::AnalysisContext;
use crate::ast::{
    Argument, BranchNode, CastExpression, DeclarationKind, ExitBranch, Expression,
    FunctionCallExpression, SequenceNode, SourceLocation, Statement, SwitchCase, SwitchNode,
    VariableDeclaration,
};
use crate::graph::pins::sequence_index;
use crate::graph::{object_display_name, GraphNode, GraphPin, PinRef};
use std::sync::Arc;

pub fn register(registry: &mut ProcessorRegistry) {
    registry.register(&["K2Node_IfThenElse"], Arc::new(BranchProcessor));
    registry.register(&["K2Node_ExecutionSequence"], Arc::new(SequenceProcessor));
    registry.register(&["K2Node_DynamicCast", "K2Node_ClassDynamicCast"], Arc::new(CastProcessor));
    registry.register(
        &[
            "K2Node_SwitchEnum",
            "K2Node_SwitchInteger",
            "K2Node_SwitchString",
            "K2Node_SwitchName",
        ],
        Arc::new(SwitchProcessor),
    );
    registry.register(&["K2Node_MacroInstance:IsValid"], Arc::new(IsValidProcessor));
}

fn walk_optional<'g>(
    analyzer: &GraphAnalyzer,
    cx: &mut AnalysisContext<'g>,
    pin: Option<&'g GraphPin>,
) -> Vec<Statement> {
    match pin {
        Some(pin) => analyzer.walk_exec_output(cx, pin),
        None => Vec::new(),
    }
}

pub struct BranchProcessor;

impl NodeProcessor for BranchProcessor {
    fn name(&self) -> &'static str {
        "branch"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let condition = analyzer.resolve_named_input(cx, node, "Condition");
        let then_branch = walk_optional(analyzer, cx, node.then_pin());
        let else_branch = walk_optional(analyzer, cx, node.else_pin());
        NodeProcessingResult::end(Statement::Branch(BranchNode {
            condition,
            then_branch,
            else_branch,
            location: SourceLocation::of(node),
        }))
    }
}

pub struct SequenceProcessor;

impl NodeProcessor for SequenceProcessor {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let mut outputs: Vec<&'g GraphPin> = node.exec_outputs().collect();
        outputs.sort_by_key(|pin| sequence_index(&pin.pin_name).unwrap_or(u32::MAX));

        let branches = outputs
            .into_iter()
            .filter(|pin| pin.is_linked())
            .map(|pin| ExitBranch {
                pin_name: pin.pin_name.clone(),
                body: analyzer.walk_exec_output(cx, pin),
            })
            .collect();

        NodeProcessingResult::end(Statement::Sequence(SequenceNode {
            branches,
            location: SourceLocation::of(node),
        }))
    }
}

/// Cast to a class. Executed casts branch on success and expose the cast
/// result only inside the success block.
pub struct CastProcessor;

impl CastProcessor {
    fn target_type(node: &GraphNode) -> String {
        node.property("TargetType")
            .and_then(|v| v.as_str())
            .map(object_display_name)
            .unwrap_or_else(|| "Object".to_string())
    }

    fn result_pin(node: &GraphNode) -> Option<&GraphPin> {
        node.data_outputs()
            .find(|p| p.pin_name.starts_with("As"))
            .or_else(|| node.data_outputs().find(|p| p.pin_name != "bSuccess"))
    }

    fn cast_expression<'g>(
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> Expression {
        let value = analyzer.resolve_named_input(cx, node, "Object");
        Expression::Cast(CastExpression {
            target_type: Self::target_type(node),
            value: Box::new(value),
            location: SourceLocation::of(node),
        })
    }
}

impl NodeProcessor for CastProcessor {
    fn name(&self) -> &'static str {
        "dynamic_cast"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let cast = Self::cast_expression(analyzer, cx, node);

        let mut then_branch = Vec::new();
        let mut bindings = Vec::new();
        if let Some(result) = Self::result_pin(node).filter(|p| p.is_linked()) {
            let name = cx.unique_name(&to_snake_case(&result.pin_name));
            then_branch.push(Statement::VariableDeclaration(VariableDeclaration {
                name: name.clone(),
                type_name: Some(result.type_name()),
                value: Some(cast.clone()),
                kind: DeclarationKind::Result,
                location: Some(SourceLocation::of(node)),
            }));
            bindings.push((
                PinRef::new(&node.node_guid, &result.pin_id),
                Expression::variable(name, false),
            ));
        }
        if let Some(then) = node.then_pin() {
            then_branch.extend(analyzer.walk_scoped(cx, then, bindings));
        }

        let failed = node.output("CastFailed").filter(|p| p.is_exec());
        let else_branch = walk_optional(analyzer, cx, failed);

        NodeProcessingResult::end(Statement::Branch(BranchNode {
            condition: cast,
            then_branch,
            else_branch,
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
        let cast = Self::cast_expression(analyzer, cx, node);
        if output.pin_name == "bSuccess" {
            Expression::FunctionCall(FunctionCallExpression {
                target: None,
                function: "IsValid".to_string(),
                arguments: vec![Argument::new("Object", cast)],
                location: SourceLocation::of(node),
            })
        } else {
            cast
        }
    }
}

pub struct SwitchProcessor;

impl NodeProcessor for SwitchProcessor {
    fn name(&self) -> &'static str {
        "switch"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let selector = analyzer.resolve_named_input(cx, node, "Selection");

        let case_pins: Vec<&'g GraphPin> = node
            .exec_outputs()
            .filter(|p| p.pin_name != "Default" && p.is_linked())
            .collect();
        let cases = case_pins
            .into_iter()
            .map(|pin| SwitchCase {
                label: pin.pin_name.clone(),
                body: analyzer.walk_exec_output(cx, pin),
            })
            .collect();
        let default = walk_optional(analyzer, cx, node.output("Default").filter(|p| p.is_exec()));

        NodeProcessingResult::end(Statement::Switch(SwitchNode {
            selector,
            cases,
            default,
            location: SourceLocation::of(node),
        }))
    }
}

/// Standard `IsValid` macro: a branch on object validity
pub struct IsValidProcessor;

impl NodeProcessor for IsValidProcessor {
    fn name(&self) -> &'static str {
        "is_valid"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let arguments = analyzer.collect_arguments(cx, node, &[]);
        let condition = Expression::FunctionCall(FunctionCallExpression {
            target: None,
            function: "IsValid".to_string(),
            arguments,
            location: SourceLocation::of(node),
        });
        let valid = node.output("Is Valid").filter(|p| p.is_exec());
        let not_valid = node.output("Is Not Valid").filter(|p| p.is_exec());
        let then_branch = walk_optional(analyzer, cx, valid);
        let else_branch = walk_optional(analyzer, cx, not_valid);
        NodeProcessingResult::end(Statement::Branch(BranchNode {
            condition,
            then_branch,
            else_branch,
            location: SourceLocation::of(node),
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::GraphAnalyzer;
    use crate::ast::{DeclarationKind, Expression, Statement};
    use crate::graph::build_graph;
    use crate::parser::parse_objects;

    fn first_body(text: &str) -> Vec<Statement> {
        let graph = build_graph(&parse_objects(text));
        let output = GraphAnalyzer::new().analyze(&graph);
        let Some(Statement::Event(event)) = output.statements.into_iter().next() else {
            panic!("expected event");
        };
        event.body
    }

    fn called_function(statement: &Statement) -> &str {
        match statement {
            Statement::FunctionCall(call) => &call.function,
            other => panic!("expected call, got {:?}", other),
        }
    }

    const CAST_GRAPH: &str = r#"Begin Object Class=/Script/BlueprintGraph.K2Node_CustomEvent Name="K2Node_CustomEvent_0"
   CustomFunctionName="OnTouched"
   NodeGuid=EVT
   CustomProperties Pin (PinId=E_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_DynamicCast_0 C_EXEC,))
   CustomProperties Pin (PinId=E_OTHER,PinName="Other",Direction="EGPD_Output",PinType.PinCategory="object",LinkedTo=(K2Node_DynamicCast_0 C_OBJ,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_DynamicCast Name="K2Node_DynamicCast_0"
   TargetType=/Script/Engine.BlueprintGeneratedClass'/Game/BP_Key.BP_Key_C'
   NodeGuid=CAST
   CustomProperties Pin (PinId=C_EXEC,PinName="execute",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=C_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_0 P_EXEC,))
   CustomProperties Pin (PinId=C_FAIL,PinName="CastFailed",Direction="EGPD_Output",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=C_OBJ,PinName="Object",PinType.PinCategory="object")
   CustomProperties Pin (PinId=C_AS,PinName="As BP Key",Direction="EGPD_Output",PinType.PinCategory="object",PinType.PinSubCategoryObject=/Script/Engine.BlueprintGeneratedClass'/Game/BP_Key.BP_Key_C',LinkedTo=(K2Node_CallFunction_0 P_SELF,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_0"
   FunctionReference=(MemberName="Collect")
   NodeGuid=CALL
   CustomProperties Pin (PinId=P_EXEC,PinName="execute",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=P_SELF,PinName="self",PinType.PinCategory="object")
End Object
"#;

    #[test]
    fn test_cast_result_scoped_to_success_block() {
        let graph = build_graph(&parse_objects(CAST_GRAPH));
        let output = GraphAnalyzer::new().analyze(&graph);
        let Statement::Event(event) = &output.statements[0] else {
            panic!("expected event");
        };
        let Statement::Branch(branch) = &event.body[0] else {
            panic!("expected branch, got {:?}", event.body[0]);
        };
        let Expression::Cast(cast) = &branch.condition else {
            panic!("expected cast condition");
        };
        assert_eq!(cast.target_type, "BP_Key");
        assert_eq!(*cast.value, Expression::variable("Other", false));

        let Statement::VariableDeclaration(decl) = &branch.then_branch[0] else {
            panic!("expected declaration");
        };
        assert_eq!(decl.name, "as_bp_key");
        assert_eq!(decl.kind, DeclarationKind::Result);
        assert_eq!(decl.type_name.as_deref(), Some("BP_Key"));

        let Statement::FunctionCall(call) = &branch.then_branch[1] else {
            panic!("expected call");
        };
        assert_eq!(call.target, Some(Expression::variable("as_bp_key", false)));
        assert!(branch.else_branch.is_empty());
    }

    #[test]
    fn test_sequence_orders_outputs() {
        let text = r#"Begin Object Class=/Script/BlueprintGraph.K2Node_Event Name="K2Node_Event_0"
   EventReference=(MemberName="ReceiveBeginPlay")
   NodeGuid=EVT
   CustomProperties Pin (PinId=E_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_ExecutionSequence_0 S_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_ExecutionSequence Name="K2Node_ExecutionSequence_0"
   NodeGuid=SEQ
   CustomProperties Pin (PinId=S_EXEC,PinName="execute",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=S_1,PinName="then_1",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_1 B_EXEC,))
   CustomProperties Pin (PinId=S_0,PinName="then_0",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_0 A_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_0"
   FunctionReference=(MemberName="First")
   NodeGuid=A
   CustomProperties Pin (PinId=A_EXEC,PinName="execute",PinType.PinCategory="exec")
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_1"
   FunctionReference=(MemberName="Second")
   NodeGuid=B
   CustomProperties Pin (PinId=B_EXEC,PinName="execute",PinType.PinCategory="exec")
End Object
"#;
        let graph = build_graph(&parse_objects(text));
        let output = GraphAnalyzer::new().analyze(&graph);
        let Statement::Event(event) = &output.statements[0] else {
            panic!("expected event");
        };
        let Statement::Sequence(sequence) = &event.body[0] else {
            panic!("expected sequence");
        };
        let names: Vec<&str> = sequence.branches.iter().map(|b| b.pin_name.as_str()).collect();
        assert_eq!(names, vec!["then_0", "then_1"]);
        let Statement::FunctionCall(first) = &sequence.branches[0].body[0] else {
            panic!("expected call");
        };
        assert_eq!(first.function, "First");
    }

    const SWITCH_GRAPH: &str = r#"Begin Object Class=/Script/BlueprintGraph.K2Node_Event Name="K2Node_Event_0"
   EventReference=(MemberName="ReceiveBeginPlay")
   NodeGuid=EVT
   CustomProperties Pin (PinId=E_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_SwitchInteger_0 S_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_VariableGet Name="K2Node_VariableGet_0"
   VariableReference=(MemberName="Mode",bSelfContext=True)
   NodeGuid=MODE
   CustomProperties Pin (PinId=M_OUT,PinName="Mode",Direction="EGPD_Output",PinType.PinCategory="int",LinkedTo=(K2Node_SwitchInteger_0 S_SEL,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_SwitchInteger Name="K2Node_SwitchInteger_0"
   NodeGuid=SWITCH
   CustomProperties Pin (PinId=S_EXEC,PinName="execute",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=S_SEL,PinName="Selection",PinType.PinCategory="int")
   CustomProperties Pin (PinId=S_DEF,PinName="Default",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_2 C_EXEC,))
   CustomProperties Pin (PinId=S_0,PinName="0",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_0 A_EXEC,))
   CustomProperties Pin (PinId=S_1,PinName="1",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_1 B_EXEC,))
   CustomProperties Pin (PinId=S_2,PinName="2",Direction="EGPD_Output",PinType.PinCategory="exec")
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_0"
   FunctionReference=(MemberName="Walk")
   NodeGuid=A
   CustomProperties Pin (PinId=A_EXEC,PinName="execute",PinType.PinCategory="exec")
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_1"
   FunctionReference=(MemberName="Run")
   NodeGuid=B
   CustomProperties Pin (PinId=B_EXEC,PinName="execute",PinType.PinCategory="exec")
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_2"
   FunctionReference=(MemberName="Idle")
   NodeGuid=C
   CustomProperties Pin (PinId=C_EXEC,PinName="execute",PinType.PinCategory="exec")
End Object
"#;

    #[test]
    fn test_switch_cases_and_default() {
        let body = first_body(SWITCH_GRAPH);
        let [Statement::Switch(switch)] = body.as_slice() else {
            panic!("expected one switch, got {:?}", body);
        };
        assert_eq!(switch.selector, Expression::variable("Mode", true));

        let labels: Vec<&str> = switch.cases.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["0", "1"]);
        assert_eq!(called_function(&switch.cases[0].body[0]), "Walk");
        assert_eq!(called_function(&switch.cases[1].body[0]), "Run");
        assert_eq!(switch.default.len(), 1);
        assert_eq!(called_function(&switch.default[0]), "Idle");
    }

    const IS_VALID_GRAPH: &str = r#"Begin Object Class=/Script/BlueprintGraph.K2Node_Event Name="K2Node_Event_0"
   EventReference=(MemberName="ReceiveBeginPlay")
   NodeGuid=EVT
   CustomProperties Pin (PinId=E_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_MacroInstance_0 V_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_VariableGet Name="K2Node_VariableGet_0"
   VariableReference=(MemberName="Target",bSelfContext=True)
   NodeGuid=TARGET
   CustomProperties Pin (PinId=T_OUT,PinName="Target",Direction="EGPD_Output",PinType.PinCategory="object",LinkedTo=(K2Node_MacroInstance_0 V_OBJ,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_MacroInstance Name="K2Node_MacroInstance_0"
   MacroGraphReference=(MacroGraph="/Script/Engine.EdGraph'/Engine/EditorBlueprintResources/StandardMacros.StandardMacros:IsValid'")
   NodeGuid=VALID
   CustomProperties Pin (PinId=V_EXEC,PinName="exec",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=V_OBJ,PinName="InputObject",PinType.PinCategory="object")
   CustomProperties Pin (PinId=V_YES,PinName="Is Valid",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_0 A_EXEC,))
   CustomProperties Pin (PinId=V_NO,PinName="Is Not Valid",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_CallFunction_1 B_EXEC,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_0"
   FunctionReference=(MemberName="Activate")
   NodeGuid=A
   CustomProperties Pin (PinId=A_EXEC,PinName="execute",PinType.PinCategory="exec")
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_CallFunction Name="K2Node_CallFunction_1"
   FunctionReference=(MemberName="ReportMissing")
   NodeGuid=B
   CustomProperties Pin (PinId=B_EXEC,PinName="execute",PinType.PinCategory="exec")
End Object
"#;

    #[test]
    fn test_is_valid_macro_is_a_branch() {
        let body = first_body(IS_VALID_GRAPH);
        let [Statement::Branch(branch)] = body.as_slice() else {
            panic!("expected one branch, got {:?}", body);
        };
        let Expression::FunctionCall(condition) = &branch.condition else {
            panic!("expected IsValid call, got {:?}", branch.condition);
        };
        assert_eq!(condition.function, "IsValid");
        assert_eq!(condition.arguments.len(), 1);
        assert_eq!(condition.arguments[0].name, "InputObject");
        assert_eq!(condition.arguments[0].value, Expression::variable("Target", true));

        assert_eq!(called_function(&branch.then_branch[0]), "Activate");
        assert_eq!(called_function(&branch.else_branch[0]), "ReportMissing");
    }

    const PURE_CAST_GRAPH: &str = r#"Begin Object Class=/Script/BlueprintGraph.K2Node_CustomEvent Name="K2Node_CustomEvent_0"
   CustomFunctionName="OnTouched"
   NodeGuid=EVT
   CustomProperties Pin (PinId=E_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_VariableSet_0 K_EXEC,))
   CustomProperties Pin (PinId=E_OTHER,PinName="Other",Direction="EGPD_Output",PinType.PinCategory="object",LinkedTo=(K2Node_DynamicCast_0 C_OBJ,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_DynamicCast Name="K2Node_DynamicCast_0"
   TargetType=/Script/Engine.BlueprintGeneratedClass'/Game/BP_Key.BP_Key_C'
   bIsPureCast=True
   NodeGuid=CAST
   CustomProperties Pin (PinId=C_OBJ,PinName="Object",PinType.PinCategory="object")
   CustomProperties Pin (PinId=C_AS,PinName="As BP Key",Direction="EGPD_Output",PinType.PinCategory="object",LinkedTo=(K2Node_VariableSet_0 K_VAL,))
   CustomProperties Pin (PinId=C_OK,PinName="bSuccess",Direction="EGPD_Output",PinType.PinCategory="bool",LinkedTo=(K2Node_VariableSet_1 H_VAL,))
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_VariableSet Name="K2Node_VariableSet_0"
   VariableReference=(MemberName="HeldKey",bSelfContext=True)
   NodeGuid=SET_KEY
   CustomProperties Pin (PinId=K_EXEC,PinName="execute",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=K_THEN,PinName="then",Direction="EGPD_Output",PinType.PinCategory="exec",LinkedTo=(K2Node_VariableSet_1 H_EXEC,))
   CustomProperties Pin (PinId=K_VAL,PinName="HeldKey",PinType.PinCategory="object")
End Object
Begin Object Class=/Script/BlueprintGraph.K2Node_VariableSet Name="K2Node_VariableSet_1"
   VariableReference=(MemberName="bHasKey",bSelfContext=True)
   NodeGuid=SET_HAS
   CustomProperties Pin (PinId=H_EXEC,PinName="execute",PinType.PinCategory="exec")
   CustomProperties Pin (PinId=H_VAL,PinName="bHasKey",PinType.PinCategory="bool")
End Object
"#;

    #[test]
    fn test_pure_cast_is_an_expression() {
        let body = first_body(PURE_CAST_GRAPH);
        assert_eq!(body.len(), 2, "unexpected body: {:?}", body);

        let Statement::Assignment(held) = &body[0] else {
            panic!("expected assignment, got {:?}", body[0]);
        };
        let Expression::Cast(cast) = &held.value else {
            panic!("expected cast value, got {:?}", held.value);
        };
        assert_eq!(cast.target_type, "BP_Key");
        assert_eq!(*cast.value, Expression::variable("Other", false));

        let Statement::Assignment(has) = &body[1] else {
            panic!("expected assignment, got {:?}", body[1]);
        };
        let Expression::FunctionCall(check) = &has.value else {
            panic!("expected IsValid call, got {:?}", has.value);
        };
        assert_eq!(check.function, "IsValid");
        assert!(matches!(
            &check.arguments[0].value,
            Expression::Cast(c) if c.target_type == "BP_Key"
        ));
    }
}
