//! Entry nodes: engine events, custom events, input events and function entries.

use super::{NodeProcessingResult, NodeProcessor, ProcessorRegistry};
use crate::analysis::analyzer::GraphAnalyzer;
use crate::analysis::context::AnalysisContext;
use crate::ast::{
    EventNode, EventReferenceExpression, Expression, Parameter, SourceLocation, Statement,
};
use crate::graph::{GraphNode, GraphPin, PinRef};
use crate::parser::PropertyValue;
use std::sync::Arc;

pub fn register(registry: &mut ProcessorRegistry) {
    registry.register(
        &[
            "K2Node_Event",
            "K2Node_CustomEvent",
            "K2Node_ComponentBoundEvent",
            "K2Node_InputAction",
            "K2Node_InputKey",
            "K2Node_InputAxisEvent",
            "K2Node_InputAxisKeyEvent",
            "K2Node_InputTouch",
            "K2Node_FunctionEntry",
        ],
        Arc::new(EventProcessor),
    );
}

/// Pin that hands out a reference to the event itself
const DELEGATE_PIN: &str = "OutputDelegate";

/// `ReceiveBeginPlay` -> `BeginPlay`, anything else unchanged
fn strip_receive(name: &str) -> &str {
    match name.strip_prefix("Receive") {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

fn key_name(node: &GraphNode, key: &str) -> String {
    match node.property(key) {
        Some(value @ PropertyValue::Struct(_)) => value
            .get("KeyName")
            .and_then(PropertyValue::as_str)
            .unwrap_or_default()
            .to_string(),
        Some(value) => value.as_str().unwrap_or_default().to_string(),
        None => String::new(),
    }
}

/// Display name of an entry node
pub fn event_name(node: &GraphNode) -> String {
    let member = node.member_reference().map(|r| r.name);
    match node.short_class() {
        "K2Node_Event" => node
            .property("EventReference")
            .and_then(|r| r.get("MemberName"))
            .and_then(PropertyValue::as_str)
            .or_else(|| node.property_str("CustomFunctionName"))
            .map(|name| strip_receive(name).to_string())
            .unwrap_or_else(|| node.node_name.clone()),
        "K2Node_CustomEvent" => node
            .property_str("CustomFunctionName")
            .map(str::to_string)
            .unwrap_or_else(|| node.node_name.clone()),
        "K2Node_ComponentBoundEvent" => {
            let delegate = node.property_str("DelegatePropertyName").unwrap_or("Event");
            match node.property_str("ComponentPropertyName") {
                Some(component) => format!("{} ({})", delegate, component),
                None => delegate.to_string(),
            }
        }
        "K2Node_InputAction" => format!(
            "InputAction {}",
            node.property_str("InputActionName").unwrap_or_default()
        ),
        "K2Node_InputKey" => format!("InputKey {}", key_name(node, "InputKey")),
        "K2Node_InputAxisEvent" => format!(
            "InputAxis {}",
            node.property_str("InputAxisName").unwrap_or_default()
        ),
        "K2Node_InputAxisKeyEvent" => format!("InputAxisKey {}", key_name(node, "AxisKey")),
        "K2Node_InputTouch" => "InputTouch".to_string(),
        _ => member.unwrap_or_else(|| node.node_name.clone()),
    }
}

fn is_parameter(pin: &GraphPin) -> bool {
    !pin.hidden && pin.pin_name != DELEGATE_PIN
}

pub struct EventProcessor;

impl NodeProcessor for EventProcessor {
    fn name(&self) -> &'static str {
        "event"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let name = event_name(node);
        tracing::debug!("[ANALYZER] Event '{}'", name);

        let mut parameters = Vec::new();
        for pin in node.data_outputs().filter(|p| is_parameter(p)) {
            cx.bind_pin(
                PinRef::new(&node.node_guid, &pin.pin_id),
                Expression::variable(pin.pin_name.clone(), false),
            );
            parameters.push(Parameter::new(pin.pin_name.clone(), Some(pin.type_name())));
        }

        let body = match node.then_pin() {
            Some(then) => analyzer.walk_body(cx, then, Vec::new()),
            None => Vec::new(),
        };

        NodeProcessingResult::end(Statement::Event(EventNode {
            name,
            parameters,
            body,
            location: SourceLocation::of(node),
        }))
    }

    fn process_expression<'g>(
        &self,
        _analyzer: &GraphAnalyzer,
        _cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        output: &'g GraphPin,
    ) -> Expression {
        if output.pin_name == DELEGATE_PIN {
            Expression::EventReference(EventReferenceExpression {
                event_name: event_name(node),
                location: SourceLocation::of(node),
            })
        } else {
            Expression::variable(output.pin_name.clone(), false)
        }
    }
}
