//! # Node Processors
//!
//! One processor per node family. A processor turns a node into a statement
//! when it is reached through execution flow, or into an expression when one
//! of its outputs is read as data. Lookup order is strict: exact registry
//! entry, then [`generic::GenericCallProcessor`], then
//! [`fallback::FallbackProcessor`].

pub mod calls;
pub mod data;
pub mod delegates;
pub mod events;
pub mod fallback;
pub mod flow;
pub mod generic;
pub mod latent;
pub mod loops;
pub mod variables;

use super::analyzer::GraphAnalyzer;
use super::context::AnalysisContext;
use crate::ast::{Expression, SourceLocation, Statement, UnsupportedReason};
use crate::error::Diagnostic;
use crate::graph::{GraphNode, GraphPin, PinRef};
use std::collections::HashMap;
use std::sync::Arc;

/// Where traversal continues after a statement
#[derive(Debug, Clone, PartialEq)]
pub enum Continuation {
    /// Follow the node's `then` pin
    Then,
    /// Resume at another output pin of the node (e.g. a loop's `Completed`)
    Pin(PinRef),
    /// The node consumed every outgoing flow itself
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeProcessingResult {
    pub statement: Option<Statement>,
    pub continuation: Continuation,
}

impl NodeProcessingResult {
    pub fn then(statement: Statement) -> Self {
        Self {
            statement: Some(statement),
            continuation: Continuation::Then,
        }
    }

    pub fn end(statement: Statement) -> Self {
        Self {
            statement: Some(statement),
            continuation: Continuation::End,
        }
    }

    /// Continue from `pin` on `node`, or stop if the pin is missing
    pub fn resume_at(statement: Statement, node: &GraphNode, pin: Option<&GraphPin>) -> Self {
        Self {
            statement: Some(statement),
            continuation: match pin {
                Some(pin) => Continuation::Pin(PinRef::new(&node.node_guid, &pin.pin_id)),
                None => Continuation::End,
            },
        }
    }

    /// Emit nothing and keep following `then`
    pub fn pass_through() -> Self {
        Self {
            statement: None,
            continuation: Continuation::Then,
        }
    }
}

/// Handler for one family of node kinds.
///
/// Both methods have defaults so a processor only implements the modes that
/// make sense for its nodes. The defaults never invent values: statement
/// mode falls back to a verbatim node record, expression mode returns an
/// explicit unsupported marker.
pub trait NodeProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        tracing::error!(
            "[ANALYZER] Processor '{}' has no statement form for {}",
            self.name(),
            node.node_name
        );
        cx.report(Diagnostic::error(
            Some(&node.node_guid),
            format!(
                "Processor '{}' cannot run '{}' as a statement",
                self.name(),
                node.node_name
            ),
        ));
        fallback::fallback_statement(analyzer, cx, node)
    }

    fn process_expression<'g>(
        &self,
        _analyzer: &GraphAnalyzer,
        _cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        output: &'g GraphPin,
    ) -> Expression {
        Expression::unsupported(
            UnsupportedReason::NotAnExpression,
            format!("{}.{} is not a value", node.short_class(), output.pin_name),
            Some(SourceLocation::of(node)),
        )
    }
}

/// Exact-kind processor table keyed by short class name.
///
/// Macro instances are keyed as `K2Node_MacroInstance:<MacroName>` first and
/// fall back to the plain class key.
#[derive(Default, Clone)]
pub struct ProcessorRegistry {
    processors: HashMap<&'static str, Arc<dyn NodeProcessor>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in processor
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        events::register(&mut registry);
        variables::register(&mut registry);
        calls::register(&mut registry);
        flow::register(&mut registry);
        loops::register(&mut registry);
        latent::register(&mut registry);
        delegates::register(&mut registry);
        data::register(&mut registry);
        registry
    }

    pub fn register(&mut self, keys: &[&'static str], processor: Arc<dyn NodeProcessor>) {
        for key in keys {
            self.processors.insert(key, processor.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Arc<dyn NodeProcessor>> {
        self.processors.get(key)
    }

    pub fn lookup(&self, node: &GraphNode) -> Option<&Arc<dyn NodeProcessor>> {
        let class = node.short_class();
        if let Some(macro_name) = node.macro_name() {
            let key = format!("{}:{}", class, macro_name);
            if let Some(processor) = self.get(&key) {
                return Some(processor);
            }
        }
        self.get(class)
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

// ============================================================================
// Naming helpers shared by processors
// ============================================================================

/// `K2_GetActorLocation` -> `GetActorLocation`
pub fn clean_member_name(name: &str) -> &str {
    name.strip_prefix("K2_")
        .or_else(|| name.strip_prefix("BP_"))
        .unwrap_or(name)
}

/// `GetActorLocation` -> `get_actor_location`, `Array Element` -> `array_element`
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() {
            let next_is_lower = chars.get(i + 1).map(|n| n.is_lowercase()).unwrap_or(false);
            let starts_word = c.is_uppercase()
                && i > 0
                && (chars[i - 1].is_lowercase()
                    || chars[i - 1].is_ascii_digit()
                    || (chars[i - 1].is_uppercase() && next_is_lower));
            if starts_word && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_end_matches('_');
    if trimmed.is_empty() {
        "value".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Node class without the `K2Node_` prefix
pub fn kind_label(node: &GraphNode) -> &str {
    let class = node.short_class();
    class.strip_prefix("K2Node_").unwrap_or(class)
}

/// Data input that carries the call target
pub fn is_target_pin(pin: &GraphPin) -> bool {
    pin.pin_name == "self"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("GetActorLocation"), "get_actor_location");
        assert_eq!(to_snake_case("Array Element"), "array_element");
        assert_eq!(to_snake_case("HUDWidget"), "hud_widget");
        assert_eq!(to_snake_case("As BP Door"), "as_bp_door");
        assert_eq!(to_snake_case("Vector2D"), "vector2_d");
        assert_eq!(to_snake_case("???"), "value");
    }

    #[test]
    fn test_clean_member_name() {
        assert_eq!(clean_member_name("K2_GetActorLocation"), "GetActorLocation");
        assert_eq!(clean_member_name("BP_OnHit"), "OnHit");
        assert_eq!(clean_member_name("PrintString"), "PrintString");
    }

    #[test]
    fn test_default_registry_covers_core_kinds() {
        let registry = ProcessorRegistry::with_defaults();
        for key in [
            "K2Node_Event",
            "K2Node_CustomEvent",
            "K2Node_VariableSet",
            "K2Node_CallFunction",
            "K2Node_IfThenElse",
            "K2Node_ExecutionSequence",
            "K2Node_DynamicCast",
            "K2Node_MacroInstance:ForEachLoop",
            "K2Node_MacroInstance:WhileLoop",
            "K2Node_MacroInstance",
            "K2Node_LatentAbilityCall",
            "K2Node_AssignDelegate",
            "K2Node_Knot",
        ] {
            assert!(registry.get(key).is_some(), "missing processor for {}", key);
        }
        assert!(registry.get("K2Node_Message").is_none());
    }
}
