//! Visitor interface over the AST.
//!
//! Every statement and expression variant has its own method, so a new
//! variant fails to compile until each output format handles it.

use super::*;

pub trait AstVisitor {
    type StatementOutput;
    type ExpressionOutput;

    fn visit_event(&mut self, node: &EventNode) -> Self::StatementOutput;
    fn visit_assignment(&mut self, node: &AssignmentNode) -> Self::StatementOutput;
    fn visit_function_call(&mut self, node: &FunctionCallNode) -> Self::StatementOutput;
    fn visit_generic_call(&mut self, node: &GenericCallNode) -> Self::StatementOutput;
    fn visit_branch(&mut self, node: &BranchNode) -> Self::StatementOutput;
    fn visit_loop(&mut self, node: &LoopNode) -> Self::StatementOutput;
    fn visit_latent_action(&mut self, node: &LatentActionNode) -> Self::StatementOutput;
    fn visit_event_subscription(&mut self, node: &EventSubscriptionNode) -> Self::StatementOutput;
    fn visit_fallback(&mut self, node: &FallbackNode) -> Self::StatementOutput;
    fn visit_variable_declaration(&mut self, node: &VariableDeclaration) -> Self::StatementOutput;
    fn visit_sequence(&mut self, node: &SequenceNode) -> Self::StatementOutput;
    fn visit_switch(&mut self, node: &SwitchNode) -> Self::StatementOutput;
    fn visit_return(&mut self, node: &ReturnNode) -> Self::StatementOutput;
    fn visit_break(&mut self, node: &BreakNode) -> Self::StatementOutput;
    fn visit_cycle_boundary(&mut self, node: &CycleBoundary) -> Self::StatementOutput;
    fn visit_truncated(&mut self, node: &TruncatedNode) -> Self::StatementOutput;

    fn visit_literal(&mut self, expr: &LiteralExpression) -> Self::ExpressionOutput;
    fn visit_variable_get(&mut self, expr: &VariableGetExpression) -> Self::ExpressionOutput;
    fn visit_function_call_expression(
        &mut self,
        expr: &FunctionCallExpression,
    ) -> Self::ExpressionOutput;
    fn visit_property_access(&mut self, expr: &PropertyAccessExpression) -> Self::ExpressionOutput;
    fn visit_cast(&mut self, expr: &CastExpression) -> Self::ExpressionOutput;
    fn visit_event_reference(&mut self, expr: &EventReferenceExpression) -> Self::ExpressionOutput;
    fn visit_loop_variable(&mut self, expr: &LoopVariableExpression) -> Self::ExpressionOutput;
    fn visit_unsupported(&mut self, expr: &UnsupportedExpression) -> Self::ExpressionOutput;
}
