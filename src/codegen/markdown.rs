//! # Markdown Generator
//!
//! Renders analyzed event graphs as indented pseudo-code under markdown
//! headings. Unknown nodes and unresolved values are printed as clearly
//! marked comments and placeholders, never dropped.

use crate::analysis::AnalysisOutput;
use crate::ast::*;
use crate::error::Diagnostic;
use crate::options::FormatOptions;

/// Pseudo-code printer for the logical AST
pub struct MarkdownGenerator {
    options: FormatOptions,
    lines: Vec<String>,
    depth: usize,
}

impl Default for MarkdownGenerator {
    fn default() -> Self {
        Self::new(FormatOptions::default())
    }
}

impl MarkdownGenerator {
    pub fn new(options: FormatOptions) -> Self {
        Self {
            options,
            lines: Vec::new(),
            depth: 0,
        }
    }

    /// Render a complete analysis result.
    ///
    /// # Arguments
    ///
    /// * `output` - Statements and diagnostics from the analyzer
    ///
    /// # Returns
    ///
    /// The markdown document. Rendering twice gives the same text.
    pub fn generate(&mut self, output: &AnalysisOutput) -> String {
        self.lines.clear();
        self.depth = 0;

        self.line(format!("## {}", output.graph_name));
        for statement in &output.statements {
            self.lines.push(String::new());
            statement.accept(self);
        }

        if self.options.show_diagnostics && !output.diagnostics.is_empty() {
            self.render_diagnostics(&output.diagnostics);
        }

        tracing::debug!(
            "[CODEGEN] Rendered {} lines for '{}'",
            self.lines.len(),
            output.graph_name
        );

        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Render a single statement and everything below it
    pub fn render_statement(&mut self, statement: &Statement) -> String {
        self.lines.clear();
        self.depth = 0;
        statement.accept(self);
        self.lines.join("\n")
    }

    /// Render a single expression
    pub fn render_expression(&mut self, expression: &Expression) -> String {
        expression.accept(self)
    }

    fn render_diagnostics(&mut self, diagnostics: &[Diagnostic]) {
        self.lines.push(String::new());
        self.line("### Diagnostics");
        self.lines.push(String::new());
        for diagnostic in diagnostics {
            self.line(format!("- {}", diagnostic));
        }
    }

    fn line(&mut self, content: impl AsRef<str>) {
        let indent = " ".repeat(self.options.indent_width * self.depth);
        self.lines.push(format!("{}{}", indent, content.as_ref()));
    }

    fn block(&mut self, block: &[Statement]) {
        self.depth += 1;
        if block.is_empty() {
            self.line("pass");
        }
        for statement in block {
            statement.accept(self);
        }
        self.depth -= 1;
    }

    fn parameter(&self, parameter: &Parameter) -> String {
        match (&parameter.type_name, self.options.show_types) {
            (Some(type_name), true) => format!("{}: {}", parameter.name, type_name),
            _ => parameter.name.clone(),
        }
    }

    fn parameters(&self, parameters: &[Parameter]) -> String {
        parameters
            .iter()
            .map(|p| self.parameter(p))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn arguments(&mut self, arguments: &[Argument]) -> String {
        arguments
            .iter()
            .map(|a| format!("{}: {}", a.name, a.value.accept(self)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn call(
        &mut self,
        target: Option<&Expression>,
        function: &str,
        arguments: &[Argument],
    ) -> String {
        let args = self.arguments(arguments);
        match target {
            Some(target) => format!("{}.{}({})", target.accept(self), function, args),
            None => format!("{}({})", function, args),
        }
    }

    fn bind(&self, bindings: &[Parameter], call: String) -> String {
        match bindings {
            [] => call,
            [single] => format!("let {} = {}", self.parameter(single), call),
            many => format!("let ({}) = {}", self.parameters(many), call),
        }
    }

    fn exits(&mut self, exits: &[ExitBranch]) {
        for exit in exits {
            self.line(format!("// on {}:", exit.pin_name));
            self.block(&exit.body);
        }
    }
}

impl AstVisitor for MarkdownGenerator {
    type StatementOutput = ();
    type ExpressionOutput = String;

    fn visit_event(&mut self, node: &EventNode) {
        let params = self.parameters(&node.parameters);
        self.line(format!("#### Event: {}({})", node.name, params));
        self.block(&node.body);
    }

    fn visit_assignment(&mut self, node: &AssignmentNode) {
        let target = node.target.accept(self);
        let value = node.value.accept(self);
        self.line(format!("{} {} {}", target, node.operator.as_str(), value));
    }

    fn visit_function_call(&mut self, node: &FunctionCallNode) {
        let call = self.call(node.target.as_ref(), &node.function, &node.arguments);
        let text = self.bind(&node.return_bindings, call);
        self.line(text);
    }

    fn visit_generic_call(&mut self, node: &GenericCallNode) {
        let call = self.call(node.target.as_ref(), &node.function, &node.arguments);
        let mut text = self.bind(&node.return_bindings, call);
        if self.options.show_source {
            text.push_str(&format!("  // {}", node.node_type));
        }
        self.line(text);
        self.exits(&node.exits);
    }

    fn visit_branch(&mut self, node: &BranchNode) {
        let condition = node.condition.accept(self);
        self.line(format!("if ({}):", condition));
        self.block(&node.then_branch);
        if !node.else_branch.is_empty() {
            self.line("else:");
            self.block(&node.else_branch);
        }
    }

    fn visit_loop(&mut self, node: &LoopNode) {
        let vars = self.parameters(&node.variables);
        let header = match node.kind {
            LoopKind::ForEach | LoopKind::ReverseForEach => {
                let collection = match node.source.first() {
                    Some(arg) => arg.value.accept(self),
                    None => "<unknown>".to_string(),
                };
                let keyword = if node.kind == LoopKind::ReverseForEach {
                    "for each reversed"
                } else {
                    "for each"
                };
                format!("{} ({}) in {}:", keyword, vars, collection)
            }
            LoopKind::While => {
                let condition = match node.source.first() {
                    Some(arg) => arg.value.accept(self),
                    None => "<unknown>".to_string(),
                };
                format!("while ({}):", condition)
            }
            LoopKind::For => {
                let bounds: Vec<String> =
                    node.source.iter().map(|a| a.value.accept(self)).collect();
                match bounds.as_slice() {
                    [first, last, ..] => format!("for ({}) in {}..={}:", vars, first, last),
                    _ => format!("for ({}):", vars),
                }
            }
        };
        self.line(header);
        self.block(&node.body);
    }

    fn visit_latent_action(&mut self, node: &LatentActionNode) {
        let call = self.call(
            node.call.target.as_deref(),
            &node.call.function,
            &node.call.arguments,
        );
        self.line(format!("await {}", call));
        for callback in &node.callbacks {
            if callback.bindings.is_empty() {
                self.line(format!("// {}:", callback.trigger));
            } else {
                let params = self.parameters(&callback.bindings);
                self.line(format!("// {}({}):", callback.trigger, params));
            }
            self.block(&callback.body);
        }
    }

    fn visit_event_subscription(&mut self, node: &EventSubscriptionNode) {
        let delegate = node.delegate.accept(self);
        match (&node.handler, node.operator) {
            (_, SubscriptionOperator::Clear) => self.line(format!("{}.clear()", delegate)),
            (Some(handler), operator) => {
                let handler = handler.accept(self);
                self.line(format!("{} {} {}", delegate, operator.as_str(), handler));
            }
            (None, operator) => {
                self.line(format!("{} {} <no handler>", delegate, operator.as_str()))
            }
        }
    }

    fn visit_fallback(&mut self, node: &FallbackNode) {
        let mut comment = format!("// Fallback: {}", node.node_type);
        if self.options.show_source {
            comment.push_str(&format!(" ({})", node.node_name));
        }
        if !node.properties.is_empty() {
            let props: Vec<String> = node
                .properties
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            comment.push_str(&format!(" [{}]", props.join(", ")));
        }
        self.line(comment);
        for input in &node.inputs {
            let value = input.value.accept(self);
            self.line(format!("//   {} = {}", input.name, value));
        }
        self.exits(&node.exits);
    }

    fn visit_variable_declaration(&mut self, node: &VariableDeclaration) {
        let name = match (&node.type_name, self.options.show_types) {
            (Some(type_name), true) => format!("{}: {}", node.name, type_name),
            _ => node.name.clone(),
        };
        match &node.value {
            Some(value) => {
                let value = value.accept(self);
                self.line(format!("let {} = {}", name, value));
            }
            None => self.line(format!("let {}", name)),
        }
    }

    fn visit_sequence(&mut self, node: &SequenceNode) {
        for branch in &node.branches {
            self.line(format!("// sequence {}:", branch.pin_name));
            self.block(&branch.body);
        }
    }

    fn visit_switch(&mut self, node: &SwitchNode) {
        let selector = node.selector.accept(self);
        self.line(format!("switch ({}):", selector));
        self.depth += 1;
        for case in &node.cases {
            self.line(format!("case {}:", case.label));
            self.block(&case.body);
        }
        if !node.default.is_empty() {
            self.line("default:");
            self.block(&node.default);
        }
        self.depth -= 1;
    }

    fn visit_return(&mut self, node: &ReturnNode) {
        if node.values.is_empty() {
            self.line("return");
        } else {
            let values = self.arguments(&node.values);
            self.line(format!("return ({})", values));
        }
    }

    fn visit_break(&mut self, _node: &BreakNode) {
        self.line("break");
    }

    fn visit_cycle_boundary(&mut self, node: &CycleBoundary) {
        self.line(format!("// cycle -> {}", node.target.node_name));
    }

    fn visit_truncated(&mut self, node: &TruncatedNode) {
        self.line(format!("// truncated: {}", node.reason));
    }

    fn visit_literal(&mut self, expr: &LiteralExpression) -> String {
        expr.value.to_string()
    }

    fn visit_variable_get(&mut self, expr: &VariableGetExpression) -> String {
        expr.name.clone()
    }

    fn visit_function_call_expression(&mut self, expr: &FunctionCallExpression) -> String {
        self.call(expr.target.as_deref(), &expr.function, &expr.arguments)
    }

    fn visit_property_access(&mut self, expr: &PropertyAccessExpression) -> String {
        format!("{}.{}", expr.base.accept(self), expr.path)
    }

    fn visit_cast(&mut self, expr: &CastExpression) -> String {
        format!("cast({} as {})", expr.value.accept(self), expr.target_type)
    }

    fn visit_event_reference(&mut self, expr: &EventReferenceExpression) -> String {
        expr.event_name.clone()
    }

    fn visit_loop_variable(&mut self, expr: &LoopVariableExpression) -> String {
        expr.name.clone()
    }

    fn visit_unsupported(&mut self, expr: &UnsupportedExpression) -> String {
        if self.options.show_source {
            format!("<unsupported: {} ({})>", expr.reason.as_str(), expr.detail)
        } else {
            format!("<unsupported: {}>", expr.reason.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(name: &str) -> SourceLocation {
        SourceLocation {
            node_guid: format!("{}-GUID", name),
            node_name: name.to_string(),
        }
    }

    #[test]
    fn test_event_with_assignment() {
        let output = AnalysisOutput {
            graph_name: "BP_Door EventGraph".into(),
            statements: vec![Statement::Event(EventNode {
                name: "BeginPlay".into(),
                parameters: Vec::new(),
                body: vec![Statement::Assignment(AssignmentNode {
                    target: Expression::variable("Health", true),
                    value: Expression::literal(LiteralValue::Float(100.0), Some("double".into())),
                    operator: AssignmentOperator::Assign,
                    is_local: false,
                    location: location("K2Node_VariableSet_0"),
                })],
                location: location("K2Node_Event_0"),
            })],
            diagnostics: Vec::new(),
        };

        let text = MarkdownGenerator::default().generate(&output);
        assert_eq!(text, "## BP_Door EventGraph\n\n#### Event: BeginPlay()\n  Health = 100.0\n");
    }

    #[test]
    fn test_markers_for_unknown_content() {
        let fallback = Statement::Fallback(FallbackNode {
            node_type: "/Script/MyPlugin.K2Node_Mystery".into(),
            node_name: "K2Node_Mystery_0".into(),
            properties: vec![("Strength".into(), "5".into())],
            inputs: vec![Argument::new(
                "Amount",
                Expression::unsupported(
                    UnsupportedReason::NoValue,
                    "input 'Amount' is not connected",
                    None,
                ),
            )],
            exits: Vec::new(),
            location: location("K2Node_Mystery_0"),
        });

        let text = MarkdownGenerator::default().render_statement(&fallback);
        assert_eq!(
            text,
            "// Fallback: /Script/MyPlugin.K2Node_Mystery [Strength=5]\n\
             //   Amount = <unsupported: no value>"
        );

        let verbose = MarkdownGenerator::new(FormatOptions::verbose()).render_statement(&fallback);
        assert!(verbose.contains("(K2Node_Mystery_0)"));
        assert!(verbose.contains("input 'Amount' is not connected"));
    }

    #[test]
    fn test_subscription_uses_operator() {
        let statement = Statement::EventSubscription(EventSubscriptionNode {
            delegate: Expression::PropertyAccess(PropertyAccessExpression {
                base: Box::new(Expression::variable("StartButton", true)),
                path: "OnClicked".into(),
            }),
            handler: Some(Expression::EventReference(EventReferenceExpression {
                event_name: "OnStartClicked".into(),
                location: location("K2Node_CustomEvent_0"),
            })),
            operator: SubscriptionOperator::Add,
            location: location("K2Node_AssignDelegate_0"),
        });
        let text = MarkdownGenerator::default().render_statement(&statement);
        assert_eq!(text, "StartButton.OnClicked += OnStartClicked");
    }

    #[test]
    fn test_branch_and_call_bindings() {
        let statement = Statement::Branch(BranchNode {
            condition: Expression::Cast(CastExpression {
                target_type: "BP_Key".into(),
                value: Box::new(Expression::variable("Other", false)),
                location: location("K2Node_DynamicCast_0"),
            }),
            then_branch: vec![Statement::FunctionCall(FunctionCallNode {
                target: None,
                function: "GetRandomNumber".into(),
                arguments: Vec::new(),
                return_bindings: vec![Parameter::new(
                    "get_random_number_result",
                    Some("int".into()),
                )],
                location: location("K2Node_CallFunction_0"),
            })],
            else_branch: Vec::new(),
            location: location("K2Node_DynamicCast_0"),
        });
        let text = MarkdownGenerator::default().render_statement(&statement);
        assert_eq!(
            text,
            "if (cast(Other as BP_Key)):\n  let get_random_number_result = GetRandomNumber()"
        );
    }
}
