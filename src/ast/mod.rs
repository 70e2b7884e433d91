//! # Logical AST
//!
//! Owned tree produced by the analyzer. Statements describe execution flow,
//! expressions describe data flow. Nodes point back to the graph only through
//! a [`SourceLocation`] key.

mod literal;
mod visitor;

pub use literal::LiteralValue;
pub use visitor::AstVisitor;

use crate::graph::GraphNode;
use serde::Serialize;

/// Statement list of one block
pub type Block = Vec<Statement>;

/// Originating node of an AST element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub node_guid: String,
    pub node_name: String,
}

impl SourceLocation {
    pub fn of(node: &GraphNode) -> Self {
        Self {
            node_guid: node.node_guid.clone(),
            node_name: node.node_name.clone(),
        }
    }
}

/// Named, optionally typed binding (event parameter, loop variable, callback payload)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: Option<String>) -> Self {
        Self {
            name: name.into(),
            type_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    pub name: String,
    pub value: Expression,
}

impl Argument {
    pub fn new(name: impl Into<String>, value: Expression) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Statement {
    Event(EventNode),
    Assignment(AssignmentNode),
    FunctionCall(FunctionCallNode),
    GenericCall(GenericCallNode),
    Branch(BranchNode),
    Loop(LoopNode),
    LatentAction(LatentActionNode),
    EventSubscription(EventSubscriptionNode),
    Fallback(FallbackNode),
    VariableDeclaration(VariableDeclaration),
    Sequence(SequenceNode),
    Switch(SwitchNode),
    Return(ReturnNode),
    Break(BreakNode),
    CycleBoundary(CycleBoundary),
    Truncated(TruncatedNode),
}

impl Statement {
    pub fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V) -> V::StatementOutput {
        match self {
            Statement::Event(node) => visitor.visit_event(node),
            Statement::Assignment(node) => visitor.visit_assignment(node),
            Statement::FunctionCall(node) => visitor.visit_function_call(node),
            Statement::GenericCall(node) => visitor.visit_generic_call(node),
            Statement::Branch(node) => visitor.visit_branch(node),
            Statement::Loop(node) => visitor.visit_loop(node),
            Statement::LatentAction(node) => visitor.visit_latent_action(node),
            Statement::EventSubscription(node) => visitor.visit_event_subscription(node),
            Statement::Fallback(node) => visitor.visit_fallback(node),
            Statement::VariableDeclaration(node) => visitor.visit_variable_declaration(node),
            Statement::Sequence(node) => visitor.visit_sequence(node),
            Statement::Switch(node) => visitor.visit_switch(node),
            Statement::Return(node) => visitor.visit_return(node),
            Statement::Break(node) => visitor.visit_break(node),
            Statement::CycleBoundary(node) => visitor.visit_cycle_boundary(node),
            Statement::Truncated(node) => visitor.visit_truncated(node),
        }
    }

    /// Node the statement was built from. Temporaries have none.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Statement::Event(n) => Some(&n.location),
            Statement::Assignment(n) => Some(&n.location),
            Statement::FunctionCall(n) => Some(&n.location),
            Statement::GenericCall(n) => Some(&n.location),
            Statement::Branch(n) => Some(&n.location),
            Statement::Loop(n) => Some(&n.location),
            Statement::LatentAction(n) => Some(&n.location),
            Statement::EventSubscription(n) => Some(&n.location),
            Statement::Fallback(n) => Some(&n.location),
            Statement::VariableDeclaration(n) => n.location.as_ref(),
            Statement::Sequence(n) => Some(&n.location),
            Statement::Switch(n) => Some(&n.location),
            Statement::Return(n) => Some(&n.location),
            Statement::Break(n) => Some(&n.location),
            Statement::CycleBoundary(n) => Some(&n.target),
            Statement::Truncated(n) => Some(&n.location),
        }
    }

    /// Child blocks in source order
    pub fn blocks(&self) -> Vec<&Block> {
        match self {
            Statement::Event(n) => vec![&n.body],
            Statement::Branch(n) => vec![&n.then_branch, &n.else_branch],
            Statement::Loop(n) => vec![&n.body],
            Statement::LatentAction(n) => n.callbacks.iter().map(|c| &c.body).collect(),
            Statement::GenericCall(n) => n.exits.iter().map(|e| &e.body).collect(),
            Statement::Fallback(n) => n.exits.iter().map(|e| &e.body).collect(),
            Statement::Sequence(n) => n.branches.iter().map(|e| &e.body).collect(),
            Statement::Switch(n) => n
                .cases
                .iter()
                .map(|c| &c.body)
                .chain(std::iter::once(&n.default))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Entry point of an execution chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventNode {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub body: Block,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignmentOperator {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    AddAssign,
}

impl AssignmentOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::AddAssign => "+=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentNode {
    pub target: Expression,
    pub value: Expression,
    pub operator: AssignmentOperator,
    /// Target is a function-local variable
    pub is_local: bool,
    pub location: SourceLocation,
}

/// Call of a resolved function with an execution pin pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCallNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Expression>,
    pub function: String,
    pub arguments: Vec<Argument>,
    /// Names bound to the call's outputs for later reads
    pub return_bindings: Vec<Parameter>,
    pub location: SourceLocation,
}

/// Named execution exit of a node other than its `then` pin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitBranch {
    pub pin_name: String,
    pub body: Block,
}

/// Call recognized only by its pin pattern and member reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericCallNode {
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Expression>,
    pub function: String,
    pub arguments: Vec<Argument>,
    pub return_bindings: Vec<Parameter>,
    pub exits: Vec<ExitBranch>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchNode {
    pub condition: Expression,
    pub then_branch: Block,
    pub else_branch: Block,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopKind {
    ForEach,
    ReverseForEach,
    While,
    For,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopNode {
    pub kind: LoopKind,
    /// Collection for `ForEach`, condition for `While`, bounds for `For`
    pub source: Vec<Argument>,
    pub variables: Vec<Parameter>,
    pub body: Block,
    /// Loop exposes a `Break` input
    pub breakable: bool,
    pub location: SourceLocation,
}

/// One named completion trigger of a latent action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackBlock {
    pub trigger: String,
    pub bindings: Vec<Parameter>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatentActionNode {
    pub call: FunctionCallExpression,
    pub callbacks: Vec<CallbackBlock>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubscriptionOperator {
    #[serde(rename = "+=")]
    Add,
    #[serde(rename = "-=")]
    Remove,
    #[serde(rename = "clear")]
    Clear,
}

impl SubscriptionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionOperator::Add => "+=",
            SubscriptionOperator::Remove => "-=",
            SubscriptionOperator::Clear => "clear",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSubscriptionNode {
    pub delegate: Expression,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<Expression>,
    pub operator: SubscriptionOperator,
    pub location: SourceLocation,
}

/// Node no processor recognized, kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackNode {
    pub node_type: String,
    pub node_name: String,
    /// Properties rendered back to dump syntax
    pub properties: Vec<(String, String)>,
    /// Resolved data inputs
    pub inputs: Vec<Argument>,
    pub exits: Vec<ExitBranch>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    /// Hoisted shared value
    Temporary,
    /// Output of an impure call or cast
    Result,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDeclaration {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Expression>,
    pub kind: DeclarationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

/// `then_0`, `then_1`, ... run in order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceNode {
    pub branches: Vec<ExitBranch>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    pub label: String,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchNode {
    pub selector: Expression,
    pub cases: Vec<SwitchCase>,
    pub default: Block,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnNode {
    pub values: Vec<Argument>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakNode {
    pub location: SourceLocation,
}

/// Marks an execution edge back to a node already on the current path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleBoundary {
    pub target: SourceLocation,
}

/// Traversal stopped because a budget ran out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TruncatedNode {
    pub reason: String,
    pub location: SourceLocation,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expression {
    Literal(LiteralExpression),
    VariableGet(VariableGetExpression),
    FunctionCall(FunctionCallExpression),
    PropertyAccess(PropertyAccessExpression),
    Cast(CastExpression),
    EventReference(EventReferenceExpression),
    LoopVariable(LoopVariableExpression),
    Unsupported(UnsupportedExpression),
}

impl Expression {
    pub fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V) -> V::ExpressionOutput {
        match self {
            Expression::Literal(e) => visitor.visit_literal(e),
            Expression::VariableGet(e) => visitor.visit_variable_get(e),
            Expression::FunctionCall(e) => visitor.visit_function_call_expression(e),
            Expression::PropertyAccess(e) => visitor.visit_property_access(e),
            Expression::Cast(e) => visitor.visit_cast(e),
            Expression::EventReference(e) => visitor.visit_event_reference(e),
            Expression::LoopVariable(e) => visitor.visit_loop_variable(e),
            Expression::Unsupported(e) => visitor.visit_unsupported(e),
        }
    }

    pub fn literal(value: LiteralValue, type_name: Option<String>) -> Self {
        Expression::Literal(LiteralExpression { value, type_name })
    }

    pub fn variable(name: impl Into<String>, self_context: bool) -> Self {
        Expression::VariableGet(VariableGetExpression {
            name: name.into(),
            self_context,
        })
    }

    pub fn unsupported(
        reason: UnsupportedReason,
        detail: impl Into<String>,
        location: Option<SourceLocation>,
    ) -> Self {
        Expression::Unsupported(UnsupportedExpression {
            reason,
            detail: detail.into(),
            location,
        })
    }

    /// Calls and casts, and fields read off them, are worth hoisting when
    /// read more than once
    pub fn is_computed(&self) -> bool {
        match self {
            Expression::FunctionCall(_) | Expression::Cast(_) => true,
            Expression::PropertyAccess(access) => access.base.is_computed(),
            _ => false,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Expression::Unsupported(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiteralExpression {
    pub value: LiteralValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableGetExpression {
    pub name: String,
    pub self_context: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCallExpression {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Box<Expression>>,
    pub function: String,
    pub arguments: Vec<Argument>,
    pub location: SourceLocation,
}

/// `base.path`, e.g. `Payload.EventMagnitude`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyAccessExpression {
    pub base: Box<Expression>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastExpression {
    pub target_type: String,
    pub value: Box<Expression>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventReferenceExpression {
    pub event_name: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopVariableExpression {
    pub name: String,
    pub loop_location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedReason {
    /// Input has neither a link nor a default
    NoValue,
    /// Link points at a node or pin that does not exist
    DanglingLink,
    /// Value depends on itself
    DataCycle,
    /// Node only participates in execution flow
    NotAnExpression,
    /// Output of an execution node that has not run on this path
    NotYetEvaluated,
    /// No processor recognizes the producing node
    Unrecognized,
    /// Nesting limit reached
    TooDeep,
}

impl UnsupportedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnsupportedReason::NoValue => "no value",
            UnsupportedReason::DanglingLink => "dangling link",
            UnsupportedReason::DataCycle => "data cycle",
            UnsupportedReason::NotAnExpression => "not an expression",
            UnsupportedReason::NotYetEvaluated => "not yet evaluated",
            UnsupportedReason::Unrecognized => "unrecognized node",
            UnsupportedReason::TooDeep => "nesting too deep",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnsupportedExpression {
    pub reason: UnsupportedReason,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}
